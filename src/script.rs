// SPDX-License-Identifier: CC0-1.0

//! Bitcoin script buffers.
//!
//! A compact script type covering what this crate needs: building tapleaf
//! scripts opcode by opcode, parsing them back into instructions, and
//! producing taproot scriptPubKeys. Scripts are treated as opaque byte
//! sequences everywhere else; nothing here executes them.

use std::fmt;

use hashes::hex::FromHex;
use secp256k1::{Secp256k1, Verification, XOnlyPublicKey};

use crate::key::{TapTweak, TweakError, TweakedPublicKey, UntweakedPublicKey};
use crate::opcodes::{all::*, Opcode};
use crate::taproot::TapNodeHash;

/// An owned Bitcoin script.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScriptBuf(Vec<u8>);

impl ScriptBuf {
    /// Creates a new empty script.
    pub fn new() -> Self { ScriptBuf(Vec::new()) }

    /// Creates a script from raw bytes, without any validation.
    pub fn from_bytes(bytes: Vec<u8>) -> Self { ScriptBuf(bytes) }

    /// Creates a script from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, hashes::hex::Error> {
        Ok(ScriptBuf(Vec::<u8>::from_hex(s)?))
    }

    /// Generates P2TR for script spending and key spending.
    pub fn new_v1_p2tr<C: Verification>(
        secp: &Secp256k1<C>,
        internal_key: UntweakedPublicKey,
        merkle_root: Option<TapNodeHash>,
    ) -> Result<ScriptBuf, TweakError> {
        let (output_key, _parity) = internal_key.tap_tweak(secp, merkle_root)?;
        Ok(ScriptBuf::new_v1_p2tr_tweaked(output_key))
    }

    /// Generates P2TR for a key that has already been tweaked.
    pub fn new_v1_p2tr_tweaked(output_key: TweakedPublicKey) -> ScriptBuf {
        Builder::new()
            .push_opcode(OP_PUSHNUM_1)
            .push_slice(&output_key.serialize())
            .into_script()
    }

    /// Returns the script bytes.
    pub fn as_bytes(&self) -> &[u8] { &self.0 }

    /// Converts the script into raw bytes.
    pub fn into_bytes(self) -> Vec<u8> { self.0 }

    /// Returns the length of the script in bytes.
    pub fn len(&self) -> usize { self.0.len() }

    /// Checks whether the script is empty.
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Iterates over the script instructions.
    ///
    /// Each returned item is a nested enum covering opcodes and data pushes.
    /// At most one error is returned after which the iterator ends.
    pub fn instructions(&self) -> Instructions { Instructions { data: &self.0 } }

    /// Adds a single opcode to the end of the script.
    fn push_opcode(&mut self, op: Opcode) { self.0.push(op.to_u8()); }

    /// Adds instructions to push some arbitrary data onto the stack.
    fn push_slice(&mut self, data: &[u8]) {
        // Start with a PUSH opcode
        match data.len() as u64 {
            n if n < OP_PUSHDATA1.to_u8() as u64 => {
                self.0.push(n as u8);
            }
            n if n < 0x100 => {
                self.0.push(OP_PUSHDATA1.to_u8());
                self.0.push(n as u8);
            }
            n if n < 0x10000 => {
                self.0.push(OP_PUSHDATA2.to_u8());
                self.0.extend_from_slice(&(n as u16).to_le_bytes());
            }
            n if n < 0x100000000 => {
                self.0.push(OP_PUSHDATA4.to_u8());
                self.0.extend_from_slice(&(n as u32).to_le_bytes());
            }
            _ => panic!("tried to put a 4bn+ sized object into a script!"),
        }
        // Then push the raw bytes
        self.0.extend_from_slice(data);
    }
}

impl From<Vec<u8>> for ScriptBuf {
    fn from(v: Vec<u8>) -> Self { ScriptBuf(v) }
}

impl From<ScriptBuf> for Vec<u8> {
    fn from(script: ScriptBuf) -> Self { script.0 }
}

impl AsRef<[u8]> for ScriptBuf {
    fn as_ref(&self) -> &[u8] { &self.0 }
}

impl fmt::LowerHex for ScriptBuf {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for byte in self.0.iter() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ScriptBuf {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Script({:x})", self)
    }
}

/// An object which can be used to construct a script piece by piece.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Builder(ScriptBuf, Option<Opcode>);

impl Builder {
    /// Creates a new empty script builder.
    pub fn new() -> Self { Builder(ScriptBuf::new(), None) }

    /// Returns the length in bytes of the script.
    pub fn len(&self) -> usize { self.0.len() }

    /// Checks whether the script is the empty script.
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Adds instructions to push an integer onto the stack.
    ///
    /// Integers are encoded as little-endian signed-magnitude numbers, but
    /// there are dedicated opcodes to push some small integers.
    pub fn push_int(self, data: i64) -> Builder {
        // We can special-case -1, 1-16
        if data == -1 || (1..=16).contains(&data) {
            let opcode = Opcode::from((data - 1 + OP_PUSHNUM_1.to_u8() as i64) as u8);
            self.push_opcode(opcode)
        }
        // We can also special-case zero
        else if data == 0 {
            self.push_opcode(OP_PUSHBYTES_0)
        }
        // Otherwise encode it as data
        else {
            self.push_int_non_minimal(data)
        }
    }

    /// Adds instructions to push an integer onto the stack without
    /// optimization.
    fn push_int_non_minimal(self, data: i64) -> Builder {
        let mut buf = [0u8; 8];
        let len = write_scriptint(&mut buf, data);
        self.push_slice(&buf[..len])
    }

    /// Adds instructions to push some arbitrary data onto the stack.
    pub fn push_slice<T: AsRef<[u8]>>(mut self, data: T) -> Builder {
        self.0.push_slice(data.as_ref());
        self.1 = None;
        self
    }

    /// Adds instructions to push an XOnly public key onto the stack.
    pub fn push_x_only_key(self, x_only_key: &XOnlyPublicKey) -> Builder {
        self.push_slice(x_only_key.serialize())
    }

    /// Adds a single opcode to the script.
    pub fn push_opcode(mut self, data: Opcode) -> Builder {
        self.0.push_opcode(data);
        self.1 = Some(data);
        self
    }

    /// Converts the `Builder` into `ScriptBuf`.
    pub fn into_script(self) -> ScriptBuf { self.0 }

    /// Returns the script bytes.
    pub fn as_bytes(&self) -> &[u8] { self.0.as_bytes() }
}

impl Default for Builder {
    fn default() -> Builder { Builder::new() }
}

/// Encodes an integer in script(minimal CScriptNum) format.
///
/// Writes bytes into the buffer and returns the number of bytes written.
pub fn write_scriptint(out: &mut [u8; 8], n: i64) -> usize {
    let mut len = 0;
    if n == 0 {
        return len;
    }

    let neg = n < 0;

    let mut abs = n.unsigned_abs();
    while abs > 0xFF {
        out[len] = (abs & 0xFF) as u8;
        len += 1;
        abs >>= 8;
    }
    // If the number's value causes the sign bit to be set, we need an extra
    // byte to get the correct value and correct sign bit
    if abs & 0x80 != 0 {
        out[len] = abs as u8;
        len += 1;
        out[len] = if neg { 0x80u8 } else { 0u8 };
        len += 1;
    }
    // Otherwise we just set the sign bit ourselves
    else {
        abs |= if neg { 0x80 } else { 0 };
        out[len] = abs as u8;
        len += 1;
    }
    len
}

/// Decodes an integer in script format, with a maximum of 4 bytes.
pub fn read_scriptint(v: &[u8]) -> Result<i64, Error> {
    if v.is_empty() {
        return Ok(0);
    }
    if v.len() > 4 {
        return Err(Error::NumericOverflow);
    }

    let (mut ret, sh) = v.iter().fold((0i64, 0), |(acc, sh), n| (acc + ((*n as i64) << sh), sh + 8));
    if v[v.len() - 1] & 0x80 != 0 {
        ret &= (1 << (sh - 1)) - 1;
        ret = -ret;
    }
    Ok(ret)
}

/// A "parsed opcode" which allows iterating over a script in a more sensible
/// way.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Instruction<'a> {
    /// Push a bunch of data.
    PushBytes(&'a [u8]),
    /// Some non-push opcode.
    Op(Opcode),
}

impl<'a> Instruction<'a> {
    /// Returns the opcode if the instruction is not a data push.
    pub fn opcode(&self) -> Option<Opcode> {
        match *self {
            Instruction::Op(op) => Some(op),
            Instruction::PushBytes(_) => None,
        }
    }

    /// Returns the pushed bytes if the instruction is a data push.
    pub fn push_bytes(&self) -> Option<&'a [u8]> {
        match *self {
            Instruction::Op(_) => None,
            Instruction::PushBytes(bytes) => Some(bytes),
        }
    }
}

/// Iterator over a script returning parsed opcodes.
#[derive(Debug, Clone)]
pub struct Instructions<'a> {
    data: &'a [u8],
}

impl<'a> Instructions<'a> {
    /// Sets the iterator to end so that it won't iterate any longer.
    fn kill(&mut self) { self.data = &[]; }

    /// Takes a `len` bytes long slice from the iterator, advancing it.
    ///
    /// If the iterator is not long enough [`Error::EarlyEndOfScript`] is
    /// returned and the iterator is killed to avoid returning an infinite
    /// stream of errors.
    fn take_slice_or_kill(&mut self, len: usize) -> Result<&'a [u8], Error> {
        if self.data.len() >= len {
            let (slice, rest) = self.data.split_at(len);
            self.data = rest;
            Ok(slice)
        } else {
            self.kill();
            Err(Error::EarlyEndOfScript)
        }
    }

    /// Reads a little-endian push length of `size` bytes.
    fn take_push_len_or_kill(&mut self, size: usize) -> Result<usize, Error> {
        let bytes = self.take_slice_or_kill(size)?;
        let mut len = 0usize;
        for (i, byte) in bytes.iter().enumerate() {
            len |= (*byte as usize) << (i * 8);
        }
        Ok(len)
    }
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Result<Instruction<'a>, Error>;

    fn next(&mut self) -> Option<Result<Instruction<'a>, Error>> {
        let (&byte, rest) = self.data.split_first()?;
        self.data = rest;

        let len = match byte {
            b if b <= 0x4b => b as usize,
            b if b == OP_PUSHDATA1.to_u8() => match self.take_push_len_or_kill(1) {
                Ok(len) => len,
                Err(e) => return Some(Err(e)),
            },
            b if b == OP_PUSHDATA2.to_u8() => match self.take_push_len_or_kill(2) {
                Ok(len) => len,
                Err(e) => return Some(Err(e)),
            },
            b if b == OP_PUSHDATA4.to_u8() => match self.take_push_len_or_kill(4) {
                Ok(len) => len,
                Err(e) => return Some(Err(e)),
            },
            // Everything else we can push right through
            b => return Some(Ok(Instruction::Op(Opcode::from(b)))),
        };
        Some(self.take_slice_or_kill(len).map(Instruction::PushBytes))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.data.is_empty() {
            (0, Some(0))
        } else {
            // There will not be more instructions than bytes
            (1, Some(self.data.len()))
        }
    }
}

impl<'a> std::iter::FusedIterator for Instructions<'a> {}

/// Ways that a script might fail to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum Error {
    /// Something did a non-minimal push.
    NonMinimalPush,
    /// Some opcode expected a parameter but it was missing or truncated.
    EarlyEndOfScript,
    /// Tried to read an array off the stack as a number when it was more than
    /// 4 bytes.
    NumericOverflow,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let str = match *self {
            Error::NonMinimalPush => "non-minimal datapush",
            Error::EarlyEndOfScript => "unexpected end of script",
            Error::NumericOverflow => "numeric overflow (number on stack larger than 4 bytes)",
        };
        f.write_str(str)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use self::Error::*;

        match self {
            NonMinimalPush | EarlyEndOfScript | NumericOverflow => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_hex::ToHex;

    use super::*;

    #[test]
    fn script_builder() {
        // from txid 3bb5e6434c11fb93f64574af5d116736510717f2c595eb45b52c28e31c9334aa
        let script = Builder::new()
            .push_opcode(OP_HASH160)
            .push_slice(&Vec::<u8>::from_hex("16e1ae70ff0fa102905d4af297f6912bda6cce19").unwrap())
            .push_opcode(OP_EQUAL)
            .into_script();
        assert_eq!(script.as_bytes().to_hex(), "a91416e1ae70ff0fa102905d4af297f6912bda6cce1987");
    }

    #[test]
    fn script_int_pushes() {
        assert_eq!(Builder::new().push_int(0).into_script().as_bytes(), [0x00]);
        assert_eq!(Builder::new().push_int(-1).into_script().as_bytes(), [0x4f]);
        assert_eq!(Builder::new().push_int(1).into_script().as_bytes(), [0x51]);
        assert_eq!(Builder::new().push_int(16).into_script().as_bytes(), [0x60]);
        assert_eq!(Builder::new().push_int(17).into_script().as_bytes(), [0x01, 0x11]);
        assert_eq!(Builder::new().push_int(255).into_script().as_bytes(), [0x02, 0xff, 0x00]);
        assert_eq!(Builder::new().push_int(256).into_script().as_bytes(), [0x02, 0x00, 0x01]);
    }

    #[test]
    fn scriptint_roundtrip() {
        for &n in [0i64, 1, -1, 16, 17, 127, 128, -128, 255, 256, 0x7fffff, -0x7fffff].iter() {
            let mut buf = [0u8; 8];
            let len = write_scriptint(&mut buf, n);
            assert_eq!(read_scriptint(&buf[..len]).unwrap(), n);
        }
        assert_eq!(read_scriptint(&[0xff, 0xff, 0xff, 0xff, 0x7f]), Err(Error::NumericOverflow));
    }

    #[test]
    fn push_slice_encoding() {
        // direct push
        let script = Builder::new().push_slice(&[0xaa; 5][..]).into_script();
        assert_eq!(script.as_bytes()[0], 0x05);
        assert_eq!(script.len(), 6);
        // OP_PUSHDATA1
        let script = Builder::new().push_slice(&[0xaa; 0x4c][..]).into_script();
        assert_eq!(&script.as_bytes()[..2], [0x4c, 0x4c]);
        assert_eq!(script.len(), 2 + 0x4c);
        // OP_PUSHDATA2
        let script = Builder::new().push_slice(&[0xaa; 0x100][..]).into_script();
        assert_eq!(&script.as_bytes()[..3], [0x4d, 0x00, 0x01]);
        assert_eq!(script.len(), 3 + 0x100);
    }

    #[test]
    fn instructions_roundtrip() {
        let key = XOnlyPublicKey::from_slice(
            &Vec::<u8>::from_hex(
                "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798",
            )
            .unwrap(),
        )
        .unwrap();
        let script = Builder::new()
            .push_x_only_key(&key)
            .push_opcode(OP_CHECKSIG)
            .push_int(2)
            .push_opcode(OP_NUMEQUAL)
            .into_script();

        let instructions: Vec<_> = script.instructions().collect::<Result<_, _>>().unwrap();
        assert_eq!(instructions.len(), 4);
        assert_eq!(instructions[0].push_bytes(), Some(&key.serialize()[..]));
        assert_eq!(instructions[1].opcode(), Some(OP_CHECKSIG));
        assert_eq!(instructions[2].opcode(), Some(Opcode::from(0x52)));
        assert_eq!(instructions[3].opcode(), Some(OP_NUMEQUAL));
    }

    #[test]
    fn instructions_truncated_push() {
        let script = ScriptBuf::from_hex("20aabb").unwrap();
        let mut iter = script.instructions();
        assert_eq!(iter.next(), Some(Err(Error::EarlyEndOfScript)));
        assert_eq!(iter.next(), None);
    }
}
