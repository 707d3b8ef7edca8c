// SPDX-License-Identifier: CC0-1.0

//! Contains `TaprootMerkleBranch` and its associated types.

#[cfg(feature = "serde")]
use std::fmt;
use std::io::{self, Write};

use hashes::Hash;

use super::{
    TapNodeHash, TaprootBuilderError, TaprootError, TAPROOT_CONTROL_MAX_NODE_COUNT,
    TAPROOT_CONTROL_NODE_SIZE,
};

/// The Merkle proof for inclusion of a tree in a taptree hash.
///
/// Sibling hashes from a leaf up to the root, in leaf-to-root order; one hash
/// per tree level the leaf sits below.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TaprootMerkleBranch(pub(super) Vec<TapNodeHash>);

impl TaprootMerkleBranch {
    /// Returns a reference to the inner vector of hashes.
    pub fn as_inner(&self) -> &[TapNodeHash] { &self.0 }

    /// Returns the number of nodes in this Merkle proof.
    pub fn len(&self) -> usize { self.0.len() }

    /// Checks if this Merkle proof is empty.
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Decodes bytes from control block.
    ///
    /// This reads the branch as encoded in the control block: the
    /// concatenated 32B byte chunks - one for each hash.
    ///
    /// # Errors
    ///
    /// The function returns an error if the number of bytes is not an integer
    /// multiple of 32 or if the number of hashes exceeds 128.
    pub fn decode(sl: &[u8]) -> Result<Self, TaprootError> {
        if sl.len() % TAPROOT_CONTROL_NODE_SIZE != 0 {
            Err(TaprootError::InvalidMerkleBranchSize(sl.len()))
        } else if sl.len() > TAPROOT_CONTROL_NODE_SIZE * TAPROOT_CONTROL_MAX_NODE_COUNT {
            Err(TaprootError::InvalidMerkleTreeDepth(sl.len() / TAPROOT_CONTROL_NODE_SIZE))
        } else {
            let inner = sl
                .chunks_exact(TAPROOT_CONTROL_NODE_SIZE)
                .map(|chunk| {
                    TapNodeHash::from_slice(chunk)
                        .expect("chunks_exact always returns the correct size")
                })
                .collect();

            Ok(TaprootMerkleBranch(inner))
        }
    }

    /// Creates a Merkle proof from a list of hashes.
    ///
    /// # Errors
    ///
    /// If the number of hashes is more than
    /// [`TAPROOT_CONTROL_MAX_NODE_COUNT`] (128).
    fn from_collection<T: AsRef<[TapNodeHash]> + Into<Vec<TapNodeHash>>>(
        collection: T,
    ) -> Result<Self, TaprootError> {
        if collection.as_ref().len() > TAPROOT_CONTROL_MAX_NODE_COUNT {
            Err(TaprootError::InvalidMerkleTreeDepth(collection.as_ref().len()))
        } else {
            Ok(TaprootMerkleBranch(collection.into()))
        }
    }

    /// Serializes to a writer.
    ///
    /// # Returns
    ///
    /// The number of bytes written to the writer.
    pub fn encode<W: Write>(&self, writer: &mut W) -> io::Result<usize> {
        for hash in self.0.iter() {
            writer.write_all(hash.as_ref())?;
        }
        Ok(self.0.len() * TapNodeHash::LEN)
    }

    /// Serializes `self` as bytes.
    pub fn serialize(&self) -> Vec<u8> {
        self.0.iter().flat_map(|e| AsRef::<[u8]>::as_ref(e).iter()).copied().collect::<Vec<u8>>()
    }

    /// Appends an element to the proof.
    pub(super) fn push(&mut self, h: TapNodeHash) -> Result<(), TaprootBuilderError> {
        if self.0.len() >= TAPROOT_CONTROL_MAX_NODE_COUNT {
            Err(TaprootBuilderError::InvalidMerkleTreeDepth(self.0.len() + 1))
        } else {
            self.0.push(h);
            Ok(())
        }
    }

    /// Returns the inner list of hashes.
    pub fn into_inner(self) -> Vec<TapNodeHash> { self.0 }
}

macro_rules! impl_try_from {
    ($from:ty) => {
        impl core::convert::TryFrom<$from> for TaprootMerkleBranch {
            type Error = TaprootError;

            /// Creates a Merkle proof from a list of hashes.
            ///
            /// # Errors
            ///
            /// If the number of hashes is more than
            /// [`TAPROOT_CONTROL_MAX_NODE_COUNT`] (128).
            fn try_from(v: $from) -> Result<Self, Self::Error> {
                TaprootMerkleBranch::from_collection(v)
            }
        }
    };
}
impl_try_from!(&[TapNodeHash]);
impl_try_from!(Vec<TapNodeHash>);

impl From<TaprootMerkleBranch> for Vec<TapNodeHash> {
    fn from(branch: TaprootMerkleBranch) -> Self { branch.0 }
}

#[cfg(feature = "serde")]
impl serde::Serialize for TaprootMerkleBranch {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;

        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for hash in self.0.iter() {
            seq.serialize_element(hash)?;
        }
        seq.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for TaprootMerkleBranch {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct SeqVisitor;

        impl<'de> serde::de::Visitor<'de> for SeqVisitor {
            type Value = TaprootMerkleBranch;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a sequence of Merkle branch hashes")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut hashes =
                    Vec::with_capacity(seq.size_hint().unwrap_or(0).min(TAPROOT_CONTROL_MAX_NODE_COUNT));
                while let Some(hash) = seq.next_element::<TapNodeHash>()? {
                    hashes.push(hash);
                }
                TaprootMerkleBranch::from_collection(hashes)
                    .map_err(|e| serde::de::Error::custom(format!("invalid Merkle branch: {}", e)))
            }
        }

        deserializer.deserialize_seq(SeqVisitor)
    }
}
