// SPDX-License-Identifier: CC0-1.0

//! Witness stack assembly.
//!
//! The [`Witness`] type holds the stack a spending input reveals, and the
//! assembly helpers turn signatures, leaf scripts and control blocks into a
//! correctly ordered stack. [`MultiA`] covers `OP_CHECKSIGADD` threshold
//! scripts, where item order and the empty-vector convention for absent
//! signers are easy to get wrong by hand.

use std::fmt;
use std::io::{self, Write};

use secp256k1::XOnlyPublicKey;

use crate::consensus::VarInt;
use crate::opcodes::all::*;
use crate::script::{read_scriptint, Builder, Instruction, ScriptBuf};
use crate::taproot::{ControlBlock, Signature};

/// The witness stack of a transaction input.
///
/// Logically an array of byte strings; serialized on the wire as a
/// compact-size element count followed by each element with its own
/// compact-size length prefix.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Witness {
    content: Vec<Vec<u8>>,
}

impl Witness {
    /// Creates a new empty witness.
    pub fn new() -> Self { Witness::default() }

    /// Creates a witness from a list of stack elements.
    pub fn from_slice<T: AsRef<[u8]>>(slice: &[T]) -> Self {
        Witness { content: slice.iter().map(|e| e.as_ref().to_vec()).collect() }
    }

    /// Creates the witness for a key-path spend: a single BIP-340 signature.
    ///
    /// No leaf script or control block is revealed.
    pub fn key_path_spend(signature: &Signature) -> Self {
        let mut witness = Witness::new();
        witness.push(signature.to_vec());
        witness
    }

    /// Creates the witness for a script-path spend.
    ///
    /// `items` are the script-specific stack elements (signatures, preimages,
    /// explicit empty vectors), already in the order the revealed script
    /// expects them on the stack; they are followed by the leaf script bytes
    /// and the serialized control block, in that push order.
    pub fn script_path_spend<I, T>(
        items: I,
        script: &ScriptBuf,
        control_block: &ControlBlock,
    ) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut witness = Witness::new();
        for item in items {
            witness.push(item);
        }
        witness.push(script.as_bytes());
        witness.push(control_block.serialize());
        witness
    }

    /// Appends a new element on the witness, requires an allocation.
    pub fn push<T: AsRef<[u8]>>(&mut self, new_element: T) {
        self.content.push(new_element.as_ref().to_vec());
    }

    /// Returns the number of elements this witness holds.
    pub fn len(&self) -> usize { self.content.len() }

    /// Returns `true` if the witness contains no elements.
    pub fn is_empty(&self) -> bool { self.content.is_empty() }

    /// Returns a struct implementing [`Iterator`] over the stack elements.
    pub fn iter(&self) -> Iter { Iter(self.content.iter()) }

    /// Returns the bytes required when this witness is consensus encoded.
    pub fn serialized_len(&self) -> usize {
        let content: usize = self
            .content
            .iter()
            .map(|e| VarInt(e.len() as u64).len() + e.len())
            .sum();
        VarInt(self.content.len() as u64).len() + content
    }

    /// Encodes the witness to a writer in wire format.
    ///
    /// # Returns
    ///
    /// The number of bytes written to the writer.
    pub fn encode<W: Write>(&self, writer: &mut W) -> io::Result<usize> {
        VarInt(self.content.len() as u64).encode(writer)?;
        for element in self.content.iter() {
            VarInt(element.len() as u64).encode(writer)?;
            writer.write_all(element)?;
        }
        Ok(self.serialized_len())
    }

    /// Serializes the witness in wire format.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.serialized_len());
        self.encode(&mut buf).expect("writers don't error");
        buf
    }

    /// Returns the nth element from the witness, if any.
    pub fn nth(&self, index: usize) -> Option<&[u8]> {
        self.content.get(index).map(|e| e.as_slice())
    }

    /// Returns the last element in the witness, if any.
    pub fn last(&self) -> Option<&[u8]> {
        if self.content.is_empty() {
            None
        } else {
            self.nth(self.content.len() - 1)
        }
    }

    /// Returns the second-to-last element in the witness, if any.
    pub fn second_to_last(&self) -> Option<&[u8]> {
        if self.content.len() < 2 {
            None
        } else {
            self.nth(self.content.len() - 2)
        }
    }

    /// Converts this witness into a list of byte vectors.
    pub fn to_vec(&self) -> Vec<Vec<u8>> { self.content.clone() }
}

impl From<Vec<Vec<u8>>> for Witness {
    fn from(content: Vec<Vec<u8>>) -> Self { Witness { content } }
}

impl<'a> IntoIterator for &'a Witness {
    type IntoIter = Iter<'a>;
    type Item = &'a [u8];

    fn into_iter(self) -> Self::IntoIter { self.iter() }
}

/// An iterator returning individual witness elements.
pub struct Iter<'a>(std::slice::Iter<'a, Vec<u8>>);

impl<'a> Iterator for Iter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> { self.0.next().map(|e| e.as_slice()) }

    fn size_hint(&self) -> (usize, Option<usize>) { self.0.size_hint() }
}

impl<'a> ExactSizeIterator for Iter<'a> {}

/// A `k`-of-`n` threshold condition built from `OP_CHECKSIGADD`.
///
/// The script form is `<key_1> OP_CHECKSIG <key_2> OP_CHECKSIGADD ...
/// <key_n> OP_CHECKSIGADD <k> OP_NUMEQUAL`, the tapscript replacement for
/// pre-taproot `OP_CHECKMULTISIG` (the miniscript `multi_a` fragment).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MultiA {
    threshold: usize,
    keys: Vec<XOnlyPublicKey>,
}

impl MultiA {
    /// Creates a `threshold`-of-`keys.len()` condition.
    ///
    /// # Errors
    ///
    /// [`SatisfyError::InvalidThreshold`] if `threshold` is zero or exceeds
    /// the number of keys.
    pub fn new(threshold: usize, keys: Vec<XOnlyPublicKey>) -> Result<Self, SatisfyError> {
        if threshold == 0 || threshold > keys.len() {
            return Err(SatisfyError::InvalidThreshold { threshold, keys: keys.len() });
        }
        Ok(MultiA { threshold, keys })
    }

    /// Returns the number of signatures required.
    pub fn threshold(&self) -> usize { self.threshold }

    /// Returns the public keys in script declaration order.
    pub fn keys(&self) -> &[XOnlyPublicKey] { &self.keys }

    /// Builds the tapscript for this condition.
    pub fn to_script(&self) -> ScriptBuf {
        let mut builder = Builder::new();
        for (i, key) in self.keys.iter().enumerate() {
            builder = builder.push_x_only_key(key);
            builder = if i == 0 {
                builder.push_opcode(OP_CHECKSIG)
            } else {
                builder.push_opcode(OP_CHECKSIGADD)
            };
        }
        builder.push_int(self.threshold as i64).push_opcode(OP_NUMEQUAL).into_script()
    }

    /// Parses a script of the `multi_a` form back into its threshold and
    /// keys.
    ///
    /// Accepts `OP_NUMEQUAL` as well as `OP_GREATERTHANOREQUAL` as the final
    /// comparison (the latter admits more than `k` valid signatures).
    /// Returns `None` if the script has any other shape.
    pub fn from_script(script: &ScriptBuf) -> Option<MultiA> {
        let insts: Vec<Instruction> = script.instructions().collect::<Result<_, _>>().ok()?;
        if insts.len() < 4 {
            return None;
        }
        let n = insts.len();

        let tail = insts[n - 1].opcode()?;
        if tail != OP_NUMEQUAL && tail != OP_GREATERTHANOREQUAL {
            return None;
        }
        let threshold = match insts[n - 2] {
            Instruction::Op(op) if (0x51..=0x60).contains(&op.to_u8()) =>
                (op.to_u8() - 0x50) as i64,
            Instruction::PushBytes(bytes) => read_scriptint(bytes).ok()?,
            _ => return None,
        };

        let body = &insts[..n - 2];
        if body.len() % 2 != 0 {
            return None;
        }
        let mut keys = Vec::with_capacity(body.len() / 2);
        for (i, chunk) in body.chunks(2).enumerate() {
            let key = XOnlyPublicKey::from_slice(chunk[0].push_bytes()?).ok()?;
            let expected = if i == 0 { OP_CHECKSIG } else { OP_CHECKSIGADD };
            if chunk[1].opcode()? != expected {
                return None;
            }
            keys.push(key);
        }
        if threshold < 1 || threshold as usize > keys.len() {
            return None;
        }
        Some(MultiA { threshold: threshold as usize, keys })
    }

    /// Produces the witness stack items satisfying this condition.
    ///
    /// `sigs` holds one optional signature per key, *in script declaration
    /// order*. The returned items are in stack order: each `OP_CHECKSIG` and
    /// `OP_CHECKSIGADD` consumes the top of the stack and the first key's
    /// opcode executes first, so the item for the last key in the script is
    /// pushed first. A signer who does not participate contributes an
    /// explicit empty vector in their key's position; `OP_CHECKSIGADD`
    /// treats it as a non-contributing input without aborting, unlike an
    /// invalid non-empty signature.
    ///
    /// # Errors
    ///
    /// - [`SatisfyError::SignatureCountMismatch`] if `sigs` does not have
    ///   exactly one entry per key.
    /// - [`SatisfyError::InsufficientSignatures`] if fewer signatures are
    ///   present than the threshold requires.
    pub fn satisfy(&self, sigs: &[Option<Signature>]) -> Result<Vec<Vec<u8>>, SatisfyError> {
        if sigs.len() != self.keys.len() {
            return Err(SatisfyError::SignatureCountMismatch {
                sigs: sigs.len(),
                keys: self.keys.len(),
            });
        }
        let have = sigs.iter().filter(|sig| sig.is_some()).count();
        if have < self.threshold {
            return Err(SatisfyError::InsufficientSignatures { have, need: self.threshold });
        }
        Ok(sigs
            .iter()
            .rev()
            .map(|sig| match sig {
                Some(sig) => sig.to_vec(),
                None => Vec::new(),
            })
            .collect())
    }

    /// Assembles the full script-path witness for this condition.
    ///
    /// Convenience for [`MultiA::satisfy`] followed by
    /// [`Witness::script_path_spend`] with this condition's script.
    pub fn satisfy_to_witness(
        &self,
        sigs: &[Option<Signature>],
        control_block: &ControlBlock,
    ) -> Result<Witness, SatisfyError> {
        let items = self.satisfy(sigs)?;
        Ok(Witness::script_path_spend(items, &self.to_script(), control_block))
    }
}

/// An error assembling the witness items for a threshold script.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SatisfyError {
    /// Fewer signatures supplied than the script's threshold requires.
    InsufficientSignatures {
        /// Number of signatures supplied.
        have: usize,
        /// The script's threshold.
        need: usize,
    },
    /// The number of signature slots does not match the number of keys.
    SignatureCountMismatch {
        /// Number of signature slots supplied.
        sigs: usize,
        /// Number of keys in the script.
        keys: usize,
    },
    /// The threshold is zero or larger than the number of keys.
    InvalidThreshold {
        /// The requested threshold.
        threshold: usize,
        /// Number of keys in the script.
        keys: usize,
    },
}

impl fmt::Display for SatisfyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SatisfyError::InsufficientSignatures { have, need } =>
                write!(f, "insufficient signatures: have {}, need {}", have, need),
            SatisfyError::SignatureCountMismatch { sigs, keys } => write!(
                f,
                "signature count mismatch: {} signature slots for {} keys",
                sigs, keys
            ),
            SatisfyError::InvalidThreshold { threshold, keys } =>
                write!(f, "invalid threshold: {} of {} keys", threshold, keys),
        }
    }
}

impl std::error::Error for SatisfyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use self::SatisfyError::*;

        match self {
            InsufficientSignatures { .. }
            | SignatureCountMismatch { .. }
            | InvalidThreshold { .. } => None,
        }
    }
}
