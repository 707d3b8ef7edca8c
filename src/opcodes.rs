// SPDX-License-Identifier: CC0-1.0

//! Bitcoin script opcodes.
//!
//! The subset of script opcodes this crate constructs and parses. Opcodes are
//! thin wrappers around their consensus byte value; no execution semantics
//! are attached (script interpretation is out of scope).

use std::fmt;

/// A script opcode.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Opcode {
    code: u8,
}

impl Opcode {
    /// Returns the consensus byte value of the opcode.
    pub fn to_u8(self) -> u8 { self.code }
}

impl From<u8> for Opcode {
    fn from(b: u8) -> Opcode { Opcode { code: b } }
}

impl fmt::Debug for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            all::OP_PUSHDATA1 => write!(f, "OP_PUSHDATA1"),
            all::OP_PUSHDATA2 => write!(f, "OP_PUSHDATA2"),
            all::OP_PUSHDATA4 => write!(f, "OP_PUSHDATA4"),
            all::OP_PUSHNUM_NEG1 => write!(f, "OP_PUSHNUM_NEG1"),
            all::OP_VERIFY => write!(f, "OP_VERIFY"),
            all::OP_EQUAL => write!(f, "OP_EQUAL"),
            all::OP_EQUALVERIFY => write!(f, "OP_EQUALVERIFY"),
            all::OP_NUMEQUAL => write!(f, "OP_NUMEQUAL"),
            all::OP_GREATERTHANOREQUAL => write!(f, "OP_GREATERTHANOREQUAL"),
            all::OP_HASH160 => write!(f, "OP_HASH160"),
            all::OP_CHECKSIG => write!(f, "OP_CHECKSIG"),
            all::OP_CHECKSIGVERIFY => write!(f, "OP_CHECKSIGVERIFY"),
            all::OP_CHECKSIGADD => write!(f, "OP_CHECKSIGADD"),
            Opcode { code } if code == 0x00 => write!(f, "OP_0"),
            Opcode { code } if code <= 0x4b => write!(f, "OP_PUSHBYTES_{}", code),
            Opcode { code } if (0x51..=0x60).contains(&code) =>
                write!(f, "OP_PUSHNUM_{}", code - 0x50),
            Opcode { code } => write!(f, "OP_UNKNOWN_{:#04x}", code),
        }
    }
}

/// Constants associated with the opcodes this crate uses.
pub mod all {
    use super::Opcode;

    /// Push an empty array onto the stack.
    pub const OP_PUSHBYTES_0: Opcode = Opcode { code: 0x00 };
    /// Push the next 32 bytes as an array onto the stack.
    pub const OP_PUSHBYTES_32: Opcode = Opcode { code: 0x20 };
    /// Read the next byte as N; push the next N bytes as an array onto the stack.
    pub const OP_PUSHDATA1: Opcode = Opcode { code: 0x4c };
    /// Read the next 2 bytes as N; push the next N bytes as an array onto the stack.
    pub const OP_PUSHDATA2: Opcode = Opcode { code: 0x4d };
    /// Read the next 4 bytes as N; push the next N bytes as an array onto the stack.
    pub const OP_PUSHDATA4: Opcode = Opcode { code: 0x4e };
    /// Push the array `0x81` onto the stack.
    pub const OP_PUSHNUM_NEG1: Opcode = Opcode { code: 0x4f };
    /// Push the array `0x01` onto the stack.
    pub const OP_PUSHNUM_1: Opcode = Opcode { code: 0x51 };
    /// Push the array `0x02` onto the stack.
    pub const OP_PUSHNUM_2: Opcode = Opcode { code: 0x52 };
    /// Push the array `0x03` onto the stack.
    pub const OP_PUSHNUM_3: Opcode = Opcode { code: 0x53 };
    /// Push the array `0x10` onto the stack.
    pub const OP_PUSHNUM_16: Opcode = Opcode { code: 0x60 };
    /// Fail the script unless the top stack value is true, and remove it.
    pub const OP_VERIFY: Opcode = Opcode { code: 0x69 };
    /// Pop two stack items, push whether they are byte-for-byte equal.
    pub const OP_EQUAL: Opcode = Opcode { code: 0x87 };
    /// Like `OP_EQUAL` but fails the script on inequality instead of pushing.
    pub const OP_EQUALVERIFY: Opcode = Opcode { code: 0x88 };
    /// Pop two stack items, push whether they are numerically equal.
    pub const OP_NUMEQUAL: Opcode = Opcode { code: 0x9c };
    /// Pop two stack items, push whether the second is >= the top.
    pub const OP_GREATERTHANOREQUAL: Opcode = Opcode { code: 0xa2 };
    /// Pop the top stack item, push its RIPEMD160(SHA256) hash.
    pub const OP_HASH160: Opcode = Opcode { code: 0xa9 };
    /// Pop a public key and signature, push whether the signature is valid.
    pub const OP_CHECKSIG: Opcode = Opcode { code: 0xac };
    /// Like `OP_CHECKSIG` but fails the script on an invalid signature.
    pub const OP_CHECKSIGVERIFY: Opcode = Opcode { code: 0xad };
    /// Pop a public key, a number and a signature; push the number incremented
    /// by one if the signature is valid, unchanged if it is empty (BIP-342).
    pub const OP_CHECKSIGADD: Opcode = Opcode { code: 0xba };
}
