// SPDX-License-Identifier: CC0-1.0

//! Taproot script trees and spending proofs.
//!
//! Tagged hashing per BIP-340, Merkle tree construction with per-leaf sibling
//! paths per BIP-341, and the control blocks that prove a leaf's inclusion to
//! a verifier. The tree shape is declared by the caller as a [`TapNode`]
//! value; building a [`TaprootSpendInfo`] from it walks the structure once,
//! hashing bottom-up and recording every leaf's path to the root.

mod merkle_branch;
mod signature;

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};
use std::fmt;
use std::io::{self, Write};

use hashes::{sha256t_hash_newtype, Hash, HashEngine};
use secp256k1::{Parity, Scalar, Secp256k1, Verification};

use crate::consensus::VarInt;
use crate::key::{TapTweak, TweakError, TweakedPublicKey, UntweakedPublicKey};
use crate::script::ScriptBuf;

pub use self::merkle_branch::TaprootMerkleBranch;
pub use self::signature::{SigFromSliceError, Signature};

/// The SHA-256 midstate value for the TapLeaf hash.
const MIDSTATE_TAPLEAF: [u8; 32] = [
    156, 224, 228, 230, 124, 17, 108, 57, 56, 179, 202, 242, 195, 15, 80, 137, 211, 243, 147, 108,
    71, 99, 110, 96, 125, 179, 62, 234, 221, 198, 240, 201,
];
// 9ce0e4e67c116c3938b3caf2c30f5089d3f3936c47636e607db33eeaddc6f0c9

/// The SHA-256 midstate value for the TapBranch hash.
const MIDSTATE_TAPBRANCH: [u8; 32] = [
    35, 168, 101, 169, 184, 164, 13, 167, 151, 124, 30, 4, 196, 158, 36, 111, 181, 190, 19, 118,
    157, 36, 201, 183, 181, 131, 181, 212, 168, 210, 38, 210,
];
// 23a865a9b8a40da7977c1e04c49e246fb5be13769d24c9b7b583b5d4a8d226d2

/// The SHA-256 midstate value for the TapTweak hash.
const MIDSTATE_TAPTWEAK: [u8; 32] = [
    209, 41, 162, 243, 112, 28, 101, 93, 101, 131, 182, 195, 185, 65, 151, 39, 149, 244, 226, 50,
    148, 253, 84, 244, 162, 174, 141, 133, 71, 202, 89, 11,
];
// d129a2f3701c655d6583b6c3b941972795f4e23294fd54f4a2ae8d8547ca590b

// Taproot test vectors from BIP-341 state the hashes without any reversing
#[rustfmt::skip]
sha256t_hash_newtype!(TapLeafHash, TapLeafTag, MIDSTATE_TAPLEAF, 64,
    doc="Taproot-tagged hash with tag \"TapLeaf\".

This is used for computing tapscript script spend hash.", forward
);
#[rustfmt::skip]
sha256t_hash_newtype!(TapNodeHash, TapBranchTag, MIDSTATE_TAPBRANCH, 64,
    doc="Tagged hash used in taproot trees; see BIP-340 for tagging rules", forward
);
#[rustfmt::skip]
sha256t_hash_newtype!(TapTweakHash, TapTweakTag, MIDSTATE_TAPTWEAK, 64,
    doc="Taproot-tagged hash with tag \"TapTweak\".

This hash type is used while computing the tweaked public key", forward
);

impl TapTweakHash {
    /// Creates a new BIP-341 [`TapTweakHash`] from the key and the Merkle
    /// root. Produces `H_taptweak(P||R)` where `P` is the internal key and
    /// `R` is the Merkle root; `R` is omitted entirely from the hash input
    /// for a key-path-only output.
    pub fn from_key_and_merkle_root(
        internal_key: UntweakedPublicKey,
        merkle_root: Option<TapNodeHash>,
    ) -> TapTweakHash {
        let mut eng = TapTweakHash::engine();
        // always hash the key
        eng.input(&internal_key.serialize());
        if let Some(h) = merkle_root {
            eng.input(h.as_ref());
        } else {
            // nothing to hash
        }
        TapTweakHash::from_engine(eng)
    }

    /// Converts a `TapTweakHash` into a `Scalar` ready for use with the key
    /// tweaking API.
    pub fn to_scalar(self) -> Scalar {
        // This is statistically extremely unlikely to panic.
        Scalar::from_be_bytes(self.to_byte_array()).expect("hash value greater than curve order")
    }
}

impl TapLeafHash {
    /// Computes the leaf hash from components: the leaf version byte, the
    /// compact-size-prefixed script.
    pub fn from_script(script: &ScriptBuf, ver: LeafVersion) -> TapLeafHash {
        let mut eng = TapLeafHash::engine();
        eng.input(&[ver.to_consensus()]);
        VarInt(script.len() as u64).encode(&mut eng).expect("engines don't error");
        eng.input(script.as_bytes());
        TapLeafHash::from_engine(eng)
    }
}

impl TapNodeHash {
    /// Computes branch hash given two hashes of the nodes underneath it.
    ///
    /// The child hashes are ordered lexicographically before concatenation,
    /// so the result does not depend on which side each child is on.
    pub fn from_node_hashes(a: TapNodeHash, b: TapNodeHash) -> TapNodeHash {
        let mut eng = TapNodeHash::engine();
        if a < b {
            eng.input(a.as_ref());
            eng.input(b.as_ref());
        } else {
            eng.input(b.as_ref());
            eng.input(a.as_ref());
        };
        TapNodeHash::from_engine(eng)
    }

    /// Assumes the given 32 byte array as hidden [`TapNodeHash`].
    ///
    /// Similar to [`TapLeafHash::from_byte_array`], but explicitly conveys
    /// that the hash is constructed from a hidden node. This also has better
    /// ergonomics because it does not require the caller to import the Hash
    /// trait.
    pub fn assume_hidden(hash: [u8; 32]) -> TapNodeHash { TapNodeHash::from_byte_array(hash) }

    /// Computes the [`TapNodeHash`] from a script and a leaf version.
    pub fn from_script(script: &ScriptBuf, ver: LeafVersion) -> TapNodeHash {
        TapNodeHash::from(TapLeafHash::from_script(script, ver))
    }
}

impl From<TapLeafHash> for TapNodeHash {
    fn from(leaf: TapLeafHash) -> TapNodeHash { TapNodeHash::from_byte_array(leaf.to_byte_array()) }
}

/// Maximum depth of a taproot tree script spend path.
pub const TAPROOT_CONTROL_MAX_NODE_COUNT: usize = 128;
/// Size of a taproot control node.
pub const TAPROOT_CONTROL_NODE_SIZE: usize = 32;
/// Tapleaf mask for getting the leaf version from first byte of control block.
pub const TAPROOT_LEAF_MASK: u8 = 0xfe;
/// Tapscript leaf version.
pub const TAPROOT_LEAF_TAPSCRIPT: u8 = 0xc0;
/// Taproot annex prefix.
pub const TAPROOT_ANNEX_PREFIX: u8 = 0x50;
/// Tapscript control base size.
pub const TAPROOT_CONTROL_BASE_SIZE: usize = 33;
/// Tapscript control max size.
pub const TAPROOT_CONTROL_MAX_SIZE: usize =
    TAPROOT_CONTROL_BASE_SIZE + TAPROOT_CONTROL_NODE_SIZE * TAPROOT_CONTROL_MAX_NODE_COUNT;

// type alias for versioned tap script corresponding Merkle proof
type ScriptMerkleProofMap = BTreeMap<(ScriptBuf, LeafVersion), BTreeSet<TaprootMerkleBranch>>;

/// One node of a declared taproot script tree.
///
/// A whole tree is a single `TapNode` acting as the root. The caller controls
/// the shape, e.g. to give likely spend paths shorter proofs; the builder
/// never rebalances. Structurally equal trees commit to the same Merkle root.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TapNode {
    /// A script leaf with its leaf version.
    Leaf(ScriptBuf, LeafVersion),
    /// A pruned subtree, committed to by its hash only. Yields no spendable
    /// paths.
    Hidden(TapNodeHash),
    /// An inner node with two children.
    Branch(Box<TapNode>, Box<TapNode>),
}

impl TapNode {
    /// Creates a leaf node with the default (tapscript) leaf version.
    pub fn leaf(script: ScriptBuf) -> TapNode { TapNode::Leaf(script, LeafVersion::TapScript) }

    /// Creates a leaf node with the given leaf version.
    pub fn leaf_with_ver(script: ScriptBuf, ver: LeafVersion) -> TapNode {
        TapNode::Leaf(script, ver)
    }

    /// Creates a hidden node from the hash of an undisclosed subtree.
    pub fn hidden(hash: TapNodeHash) -> TapNode { TapNode::Hidden(hash) }

    /// Creates a branch node from two subtrees.
    pub fn branch(left: TapNode, right: TapNode) -> TapNode {
        TapNode::Branch(Box::new(left), Box::new(right))
    }

    /// Creates a tree from a list of scripts and weights of satisfaction for
    /// each script.
    ///
    /// The weights represent the probability of each branch being taken. If
    /// probabilities/weights for each condition are known, constructing the
    /// tree as a Huffman tree is the optimal way to minimize average case
    /// satisfaction cost. For example, [(3, S1), (2, S2), (5, S3)] would
    /// construct a tree that has optimal satisfaction weight when the
    /// probability for S1 is 30%, S2 is 20% and S3 is 50%.
    ///
    /// # Errors
    ///
    /// - When the provided list of script weights is empty.
    ///
    /// # Edge Cases
    ///
    /// If the script weight calculations overflow, a sub-optimal tree may be
    /// generated. This should not happen unless you are dealing with billions
    /// of branches with weights close to 2^32.
    pub fn with_huffman_tree<I>(script_weights: I) -> Result<TapNode, TaprootBuilderError>
    where
        I: IntoIterator<Item = (u32, ScriptBuf)>,
    {
        let mut node_weights = BinaryHeap::<(Reverse<u32>, TapNode)>::new();
        for (p, leaf) in script_weights {
            node_weights.push((Reverse(p), TapNode::leaf(leaf)));
        }
        if node_weights.is_empty() {
            return Err(TaprootBuilderError::EmptyTree);
        }
        while node_weights.len() > 1 {
            // Combine the last two elements and insert a new node
            let (p1, s1) = node_weights.pop().expect("len must be at least two");
            let (p2, s2) = node_weights.pop().expect("len must be at least two");
            // Insert the sum of first two in the tree as a new node
            // N.B.: p1 + p2 can not practically saturate as you would need to
            // have 2**32 max u32s from the input to overflow. However,
            // saturating is a reasonable behavior here as Huffman tree
            // construction would treat all such elements as "very likely".
            let p = Reverse(p1.0.saturating_add(p2.0));
            node_weights.push((p, TapNode::branch(s1, s2)));
        }
        // Every iteration of the loop reduces the node_weights.len() by
        // exactly 1. Therefore, the loop will eventually terminate with
        // exactly 1 element.
        debug_assert_eq!(node_weights.len(), 1);
        Ok(node_weights.pop().expect("huffman tree algorithm is broken").1)
    }

    /// Computes the Merkle root committed to by this (sub)tree.
    ///
    /// This is a pure function of the tree contents; it does not check the
    /// depth limit. Use [`TaprootSpendInfo::from_tree`] to obtain spendable
    /// paths with all limits enforced.
    pub fn node_hash(&self) -> TapNodeHash {
        match self {
            TapNode::Leaf(script, ver) => TapNodeHash::from_script(script, *ver),
            TapNode::Hidden(hash) => *hash,
            TapNode::Branch(left, right) =>
                TapNodeHash::from_node_hashes(left.node_hash(), right.node_hash()),
        }
    }

    /// Walks the tree bottom-up, hashing branches and accumulating each
    /// leaf's sibling path.
    fn node_info(&self) -> Result<NodeInfo, TaprootBuilderError> {
        match self {
            TapNode::Leaf(script, ver) => Ok(NodeInfo::new_leaf(script.clone(), *ver)),
            TapNode::Hidden(hash) => Ok(NodeInfo::new_hidden(*hash)),
            TapNode::Branch(left, right) =>
                NodeInfo::combine(left.node_info()?, right.node_info()?),
        }
    }
}

/// Information about a node and all the leaves under it, used during tree
/// construction.
struct NodeInfo {
    /// Merkle hash for this node.
    hash: TapNodeHash,
    /// Known script leaves inside this node with their accumulated sibling
    /// paths.
    leaves: Vec<LeafNode>,
}

/// A script leaf with the sibling path accumulated so far.
struct LeafNode {
    script: ScriptBuf,
    version: LeafVersion,
    merkle_branch: TaprootMerkleBranch,
}

impl NodeInfo {
    fn new_leaf(script: ScriptBuf, ver: LeafVersion) -> Self {
        Self {
            hash: TapNodeHash::from_script(&script, ver),
            leaves: vec![LeafNode {
                script,
                version: ver,
                merkle_branch: TaprootMerkleBranch::default(),
            }],
        }
    }

    fn new_hidden(hash: TapNodeHash) -> Self {
        // We don't store any information about the leaves of hidden nodes.
        Self { hash, leaves: vec![] }
    }

    fn combine(a: Self, b: Self) -> Result<Self, TaprootBuilderError> {
        let mut all_leaves = Vec::with_capacity(a.leaves.len() + b.leaves.len());
        let hash = TapNodeHash::from_node_hashes(a.hash, b.hash);
        for mut a_leaf in a.leaves {
            a_leaf.merkle_branch.push(b.hash)?; // add hashing partner
            all_leaves.push(a_leaf);
        }
        for mut b_leaf in b.leaves {
            b_leaf.merkle_branch.push(a.hash)?; // add hashing partner
            all_leaves.push(b_leaf);
        }
        Ok(Self { hash, leaves: all_leaves })
    }
}

/// Represents taproot spending information.
///
/// A taproot output corresponds to a combination of a single public key
/// condition (the internal key), and zero or more general conditions encoded
/// in scripts organized in the form of a binary tree.
///
/// Taproot can be spent by either:
/// - Spending using the key path i.e., with secret key corresponding to the
///   tweaked `output_key`.
/// - By satisfying any of the scripts in the script spend path. Each script
///   can be satisfied by providing a witness stack consisting of the script's
///   inputs, plus the script itself and the control block.
///
/// If one or more of the spending conditions consist of just a single key
/// (after aggregation), the most likely key should be made the internal key.
/// See [BIP-341](https://github.com/bitcoin/bips/blob/master/bip-0341.mediawiki)
/// for more details on choosing internal keys for a taproot application.
///
/// Note: this library currently does not support
/// [annex](https://github.com/bitcoin/bips/blob/master/bip-0341.mediawiki#cite_note-5).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaprootSpendInfo {
    /// The BIP-341 internal key.
    internal_key: UntweakedPublicKey,
    /// The Merkle root of the script tree (None if there are no scripts).
    merkle_root: Option<TapNodeHash>,
    /// The sign final output pubkey as per BIP 341.
    output_key_parity: Parity,
    /// The tweaked output key.
    output_key: TweakedPublicKey,
    /// Map from (script, leaf_version) to (sets of) [`TaprootMerkleBranch`].
    /// More than one control block for a given script is only possible if it
    /// appears in multiple branches of the tree. In all cases, keeping one
    /// should be enough for spending funds, but we keep all of the paths so
    /// that a full tree can be constructed again from spending data if
    /// required.
    script_map: ScriptMerkleProofMap,
}

impl TaprootSpendInfo {
    /// Creates a new key spend with `internal_key` and `merkle_root`. Provide
    /// [`None`] for the `merkle_root` if there is no script path.
    ///
    /// *Note*: as per BIP341
    ///
    /// When the Merkle root is [`None`], the output key commits to an
    /// unspendable script path instead of having no script path. This is
    /// achieved by computing the output key point as
    /// `Q = P + int(hashTapTweak(bytes(P)))G`. See also
    /// [`TaprootSpendInfo::tap_tweak`].
    ///
    /// Refer to BIP 341 footnote ('Why should the output key always have a
    /// taproot commitment, even if there is no script path?') for more
    /// details.
    pub fn new_key_spend<C: Verification>(
        secp: &Secp256k1<C>,
        internal_key: UntweakedPublicKey,
        merkle_root: Option<TapNodeHash>,
    ) -> Result<Self, TaprootBuilderError> {
        let (output_key, parity) =
            internal_key.tap_tweak(secp, merkle_root).map_err(TaprootBuilderError::InvalidTweak)?;
        Ok(Self {
            internal_key,
            merkle_root,
            output_key_parity: parity,
            output_key,
            script_map: BTreeMap::new(),
        })
    }

    /// Computes the [`TaprootSpendInfo`] from `internal_key` and a declared
    /// tree shape.
    ///
    /// The tree is walked once: branch hashes are computed bottom-up and for
    /// each leaf encountered the list of sibling hashes on its root path is
    /// recorded, in leaf-to-root order.
    ///
    /// # Errors
    ///
    /// - [`TaprootBuilderError::InvalidMerkleTreeDepth`] if any leaf sits
    ///   deeper than 128 levels.
    /// - [`TaprootBuilderError::InvalidTweak`] if tweaking the internal key
    ///   fails (cryptographically unreachable).
    pub fn from_tree<C: Verification>(
        secp: &Secp256k1<C>,
        internal_key: UntweakedPublicKey,
        tree: &TapNode,
    ) -> Result<Self, TaprootBuilderError> {
        let node = tree.node_info()?;
        let mut info = TaprootSpendInfo::new_key_spend(secp, internal_key, Some(node.hash))?;

        for leaf in node.leaves {
            let key = (leaf.script, leaf.version);
            let value = leaf.merkle_branch;
            match info.script_map.get_mut(&key) {
                None => {
                    let mut set = BTreeSet::new();
                    set.insert(value);
                    info.script_map.insert(key, set);
                }
                Some(set) => {
                    set.insert(value);
                }
            }
        }
        Ok(info)
    }

    /// Creates a new [`TaprootSpendInfo`] from a list of scripts (with
    /// default script version) and weights of satisfaction for each script.
    ///
    /// See [`TapNode::with_huffman_tree`] for more detailed documentation.
    pub fn with_huffman_tree<C, I>(
        secp: &Secp256k1<C>,
        internal_key: UntweakedPublicKey,
        script_weights: I,
    ) -> Result<Self, TaprootBuilderError>
    where
        I: IntoIterator<Item = (u32, ScriptBuf)>,
        C: Verification,
    {
        let tree = TapNode::with_huffman_tree(script_weights)?;
        TaprootSpendInfo::from_tree(secp, internal_key, &tree)
    }

    /// Returns the `TapTweakHash` for this [`TaprootSpendInfo`] i.e., the
    /// tweak using `internal_key` and `merkle_root`.
    pub fn tap_tweak(&self) -> TapTweakHash {
        TapTweakHash::from_key_and_merkle_root(self.internal_key, self.merkle_root)
    }

    /// Returns the internal key for this [`TaprootSpendInfo`].
    pub fn internal_key(&self) -> UntweakedPublicKey { self.internal_key }

    /// Returns the Merkle root for this [`TaprootSpendInfo`].
    pub fn merkle_root(&self) -> Option<TapNodeHash> { self.merkle_root }

    /// Returns the output key (the key used in script pubkey) for this
    /// [`TaprootSpendInfo`].
    pub fn output_key(&self) -> TweakedPublicKey { self.output_key }

    /// Returns the parity of the output key. See also
    /// [`TaprootSpendInfo::output_key`].
    pub fn output_key_parity(&self) -> Parity { self.output_key_parity }

    /// Returns the internal script map.
    pub fn as_script_map(&self) -> &ScriptMerkleProofMap { &self.script_map }

    /// Constructs a [`ControlBlock`] for particular script with the given
    /// version.
    ///
    /// # Returns
    ///
    /// - If there are multiple control blocks possible, returns the shortest
    ///   one.
    /// - If the script is not contained in the [`TaprootSpendInfo`], returns
    ///   `None`.
    pub fn control_block(&self, script_ver: &(ScriptBuf, LeafVersion)) -> Option<ControlBlock> {
        let merkle_branch_set = self.script_map.get(script_ver)?;
        // Choose the smallest one amongst the multiple script maps
        let smallest = merkle_branch_set
            .iter()
            .min_by(|x, y| x.len().cmp(&y.len()))
            .expect("invariant: script map key must contain non-empty set value");
        Some(ControlBlock {
            internal_key: self.internal_key,
            output_key_parity: self.output_key_parity,
            leaf_version: script_ver.1,
            merkle_branch: smallest.clone(),
        })
    }
}

impl From<TaprootSpendInfo> for TapTweakHash {
    fn from(spend_info: TaprootSpendInfo) -> TapTweakHash { spend_info.tap_tweak() }
}

impl From<&TaprootSpendInfo> for TapTweakHash {
    fn from(spend_info: &TaprootSpendInfo) -> TapTweakHash { spend_info.tap_tweak() }
}

/// Control block data structure used in Tapscript satisfaction.
///
/// The proof revealed in the witness of a script-path spend: leaf version and
/// output key parity in the first byte, then the internal key, then the
/// leaf-to-root sibling hashes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ControlBlock {
    /// The tapleaf version.
    pub leaf_version: LeafVersion,
    /// The parity of the output key (NOT THE INTERNAL KEY WHICH IS ALWAYS
    /// XONLY).
    pub output_key_parity: Parity,
    /// The internal key.
    pub internal_key: UntweakedPublicKey,
    /// The Merkle proof of a script associated with this leaf.
    pub merkle_branch: TaprootMerkleBranch,
}

impl ControlBlock {
    /// Decodes bytes representing a `ControlBlock`.
    ///
    /// This is an extra witness element that provides the proof that taproot
    /// script pubkey is correctly computed with some specified leaf hash.
    /// This is the last element in taproot witness when spending an output
    /// via script path.
    ///
    /// # Errors
    ///
    /// - [`TaprootError::InvalidControlBlockSize`] if `sl` is not of size
    ///   1 + 32 + 32N for any N >= 0.
    /// - [`TaprootError::InvalidTaprootLeafVersion`] if the leaf version in
    ///   the first byte is invalid.
    /// - [`TaprootError::InvalidInternalKey`] if the internal key is invalid
    ///   (the first 32 bytes after the parity byte).
    /// - [`TaprootError::InvalidMerkleTreeDepth`] if the Merkle tree is too
    ///   deep (more than 128 levels).
    pub fn decode(sl: &[u8]) -> Result<ControlBlock, TaprootError> {
        if sl.len() < TAPROOT_CONTROL_BASE_SIZE
            || (sl.len() - TAPROOT_CONTROL_BASE_SIZE) % TAPROOT_CONTROL_NODE_SIZE != 0
        {
            return Err(TaprootError::InvalidControlBlockSize(sl.len()));
        }
        let output_key_parity =
            Parity::from_i32((sl[0] & 1) as i32).map_err(TaprootError::InvalidParity)?;
        let leaf_version = LeafVersion::from_consensus(sl[0] & TAPROOT_LEAF_MASK)?;
        let internal_key = UntweakedPublicKey::from_slice(&sl[1..TAPROOT_CONTROL_BASE_SIZE])
            .map_err(TaprootError::InvalidInternalKey)?;
        let merkle_branch = TaprootMerkleBranch::decode(&sl[TAPROOT_CONTROL_BASE_SIZE..])?;
        Ok(ControlBlock { leaf_version, output_key_parity, internal_key, merkle_branch })
    }

    /// Returns the size of the control block. Faster and more efficient than
    /// calling `Self::serialize().len()`. Can be handy for fee estimation.
    pub fn size(&self) -> usize {
        TAPROOT_CONTROL_BASE_SIZE + TAPROOT_CONTROL_NODE_SIZE * self.merkle_branch.len()
    }

    /// Serializes to a writer.
    ///
    /// # Returns
    ///
    /// The number of bytes written to the writer.
    pub fn encode<W: Write>(&self, writer: &mut W) -> io::Result<usize> {
        let first_byte: u8 = self.output_key_parity.to_u8() | self.leaf_version.to_consensus();
        writer.write_all(&[first_byte])?;
        writer.write_all(&self.internal_key.serialize())?;
        self.merkle_branch.encode(writer)?;
        Ok(self.size())
    }

    /// Serializes the control block.
    ///
    /// This would be required when using [`ControlBlock`] as a witness
    /// element while spending an output via script path. This serialization
    /// does not include the varint prefix that would be applied when encoding
    /// this element as a witness.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.size());
        self.encode(&mut buf).expect("writers don't error");
        buf
    }

    /// Verifies that a control block is correct proof for a given output key
    /// and script.
    ///
    /// Only checks that script is contained inside the taptree described by
    /// the output key. Full verification must also execute the script with
    /// witness data.
    pub fn verify_taproot_commitment<C: Verification>(
        &self,
        secp: &Secp256k1<C>,
        output_key: secp256k1::XOnlyPublicKey,
        script: &ScriptBuf,
    ) -> bool {
        // compute the script hash
        // Initially the curr_hash is the leaf hash
        let mut curr_hash = TapNodeHash::from_script(script, self.leaf_version);
        // Verify the proof
        for elem in self.merkle_branch.as_inner() {
            // Recalculate the curr hash as parent hash
            curr_hash = TapNodeHash::from_node_hashes(curr_hash, *elem);
        }
        // compute the taptweak
        let tweak =
            TapTweakHash::from_key_and_merkle_root(self.internal_key, Some(curr_hash)).to_scalar();
        self.internal_key.tweak_add_check(secp, &output_key, self.output_key_parity, tweak)
    }
}

/// Inner type representing future (non-tapscript) leaf versions. See
/// [`LeafVersion::Future`].
///
/// NB: NO PUBLIC CONSTRUCTOR!
/// The only way to construct this is by converting `u8` to [`LeafVersion`]
/// and then extracting it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct FutureLeafVersion(u8);

impl FutureLeafVersion {
    pub(self) fn from_consensus(version: u8) -> Result<FutureLeafVersion, TaprootError> {
        match version {
            TAPROOT_LEAF_TAPSCRIPT => unreachable!(
                "FutureLeafVersion::from_consensus should be never called for 0xC0 value"
            ),
            TAPROOT_ANNEX_PREFIX =>
                Err(TaprootError::InvalidTaprootLeafVersion(TAPROOT_ANNEX_PREFIX)),
            odd if odd & 0xFE != odd => Err(TaprootError::InvalidTaprootLeafVersion(odd)),
            even => Ok(FutureLeafVersion(even)),
        }
    }

    /// Returns the consensus representation of this [`FutureLeafVersion`].
    #[inline]
    pub fn to_consensus(self) -> u8 { self.0 }
}

impl fmt::Display for FutureLeafVersion {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { fmt::Display::fmt(&self.0, f) }
}

impl fmt::LowerHex for FutureLeafVersion {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { fmt::LowerHex::fmt(&self.0, f) }
}

/// The leaf version for tapleafs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LeafVersion {
    /// BIP-342 tapscript.
    TapScript,

    /// Future leaf version.
    Future(FutureLeafVersion),
}

impl LeafVersion {
    /// Creates a [`LeafVersion`] from consensus byte representation.
    ///
    /// # Errors
    ///
    /// - If the last bit of the `version` is odd.
    /// - If the `version` is 0x50 ([`TAPROOT_ANNEX_PREFIX`]).
    pub fn from_consensus(version: u8) -> Result<Self, TaprootError> {
        match version {
            TAPROOT_LEAF_TAPSCRIPT => Ok(LeafVersion::TapScript),
            TAPROOT_ANNEX_PREFIX =>
                Err(TaprootError::InvalidTaprootLeafVersion(TAPROOT_ANNEX_PREFIX)),
            future => FutureLeafVersion::from_consensus(future).map(LeafVersion::Future),
        }
    }

    /// Returns the consensus representation of this [`LeafVersion`].
    pub fn to_consensus(self) -> u8 {
        match self {
            LeafVersion::TapScript => TAPROOT_LEAF_TAPSCRIPT,
            LeafVersion::Future(version) => version.to_consensus(),
        }
    }
}

impl fmt::Display for LeafVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self, f.alternate()) {
            (LeafVersion::TapScript, true) => f.write_str("tapscript"),
            (LeafVersion::TapScript, false) => fmt::Display::fmt(&TAPROOT_LEAF_TAPSCRIPT, f),
            (LeafVersion::Future(version), true) =>
                write!(f, "future_script_{:#02x}", version.0),
            (LeafVersion::Future(version), false) => fmt::Display::fmt(version, f),
        }
    }
}

impl fmt::LowerHex for LeafVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::LowerHex::fmt(&self.to_consensus(), f)
    }
}

/// Serializes [`LeafVersion`] as a `u8` using consensus encoding.
#[cfg(feature = "serde")]
impl serde::Serialize for LeafVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.to_consensus())
    }
}

/// Deserializes [`LeafVersion`] as a `u8` using consensus encoding.
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for LeafVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use core::convert::TryFrom;

        struct U8Visitor;
        impl<'de> serde::de::Visitor<'de> for U8Visitor {
            type Value = LeafVersion;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a valid consensus-encoded taproot leaf version")
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                let value = u8::try_from(value).map_err(|_| {
                    E::invalid_value(
                        serde::de::Unexpected::Unsigned(value),
                        &"consensus-encoded leaf version as u8",
                    )
                })?;
                LeafVersion::from_consensus(value).map_err(|_| {
                    E::invalid_value(
                        serde::de::Unexpected::Unsigned(value as u64),
                        &"consensus-encoded leaf version as u8",
                    )
                })
            }
        }

        deserializer.deserialize_u8(U8Visitor)
    }
}

/// Detailed error type for taproot tree building.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TaprootBuilderError {
    /// Merkle tree depth must not be more than 128.
    InvalidMerkleTreeDepth(usize),
    /// Tried to build a script tree out of an empty leaf set.
    EmptyTree,
    /// Tweaking the internal key failed.
    InvalidTweak(TweakError),
}

impl fmt::Display for TaprootBuilderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            TaprootBuilderError::InvalidMerkleTreeDepth(d) => write!(
                f,
                "merkle tree depth({}) must be less than {}",
                d, TAPROOT_CONTROL_MAX_NODE_COUNT
            ),
            TaprootBuilderError::EmptyTree =>
                write!(f, "tried to build a tree out of an empty leaf set"),
            TaprootBuilderError::InvalidTweak(ref e) =>
                write_err!(f, "invalid taproot tweak"; e),
        }
    }
}

impl std::error::Error for TaprootBuilderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use self::TaprootBuilderError::*;

        match self {
            InvalidTweak(e) => Some(e),
            InvalidMerkleTreeDepth(_) | EmptyTree => None,
        }
    }
}

/// Detailed error type for taproot utilities.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TaprootError {
    /// Proof size must be a multiple of 32.
    InvalidMerkleBranchSize(usize),
    /// Merkle tree depth must not be more than 128.
    InvalidMerkleTreeDepth(usize),
    /// The last bit of tapleaf version must be zero.
    InvalidTaprootLeafVersion(u8),
    /// Invalid control block size.
    InvalidControlBlockSize(usize),
    /// Invalid taproot internal key.
    InvalidInternalKey(secp256k1::Error),
    /// Invalid parity for internal key.
    InvalidParity(secp256k1::InvalidParityValue),
}

impl fmt::Display for TaprootError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            TaprootError::InvalidMerkleBranchSize(sz) => write!(
                f,
                "merkle branch size({}) must be a multiple of {}",
                sz, TAPROOT_CONTROL_NODE_SIZE
            ),
            TaprootError::InvalidMerkleTreeDepth(d) => write!(
                f,
                "merkle tree depth({}) must be less than {}",
                d, TAPROOT_CONTROL_MAX_NODE_COUNT
            ),
            TaprootError::InvalidTaprootLeafVersion(v) =>
                write!(f, "leaf version({}) must have the least significant bit 0", v),
            TaprootError::InvalidControlBlockSize(sz) => write!(
                f,
                "control block size({}) must be of the form 33 + 32*m where 0 <= m <= {}",
                sz, TAPROOT_CONTROL_MAX_NODE_COUNT
            ),
            TaprootError::InvalidInternalKey(ref e) => {
                write_err!(f, "invalid internal x-only key"; e)
            }
            TaprootError::InvalidParity(_) => write!(f, "invalid parity value for internal key"),
        }
    }
}

impl std::error::Error for TaprootError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use self::TaprootError::*;

        match self {
            InvalidInternalKey(e) => Some(e),
            InvalidMerkleBranchSize(_)
            | InvalidMerkleTreeDepth(_)
            | InvalidTaprootLeafVersion(_)
            | InvalidControlBlockSize(_)
            | InvalidParity(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use core::str::FromStr;

    use crate::test_hex::ToHex;
    use hashes::hex::FromHex;
    use hashes::{sha256, sha256t::Tag, Hash, HashEngine};
    use secp256k1::{Secp256k1, VerifyOnly, XOnlyPublicKey};

    use super::*;
    use crate::key::TweakedPublicKey;

    fn tag_engine(tag_name: &str) -> sha256::HashEngine {
        let mut engine = sha256::Hash::engine();
        let tag_hash = sha256::Hash::hash(tag_name.as_bytes());
        engine.input(tag_hash.as_ref());
        engine.input(tag_hash.as_ref());
        engine
    }

    #[test]
    fn test_midstates() {
        // check midstate against hard-coded values
        assert_eq!(MIDSTATE_TAPLEAF, tag_engine("TapLeaf").midstate().to_byte_array());
        assert_eq!(MIDSTATE_TAPBRANCH, tag_engine("TapBranch").midstate().to_byte_array());
        assert_eq!(MIDSTATE_TAPTWEAK, tag_engine("TapTweak").midstate().to_byte_array());

        // test that engine creation roundtrips
        assert_eq!(tag_engine("TapLeaf").midstate(), TapLeafTag::engine().midstate());
        assert_eq!(tag_engine("TapBranch").midstate(), TapBranchTag::engine().midstate());
        assert_eq!(tag_engine("TapTweak").midstate(), TapTweakTag::engine().midstate());

        // check that hash creation is the same as building into the same engine
        fn empty_hash(tag_name: &str) -> [u8; 32] {
            let mut e = tag_engine(tag_name);
            e.input(&[]);
            TapNodeHash::from_engine(e).to_byte_array()
        }
        assert_eq!(empty_hash("TapLeaf"), TapLeafHash::hash(&[]).to_byte_array());
        assert_eq!(empty_hash("TapBranch"), TapNodeHash::hash(&[]).to_byte_array());
        assert_eq!(empty_hash("TapTweak"), TapTweakHash::hash(&[]).to_byte_array());
    }

    #[test]
    fn test_vectors_core() {
        //! Test vectors taken from Core

        // uninitialized writers
        //   CHashWriter writer = HasherTapLeaf;
        //   writer.GetSHA256().GetHex()
        assert_eq!(
            TapLeafHash::from_engine(TapLeafTag::engine()).to_string(),
            "5212c288a377d1f8164962a5a13429f9ba6a7b84e59776a52c6637df2106facb"
        );
        assert_eq!(
            TapNodeHash::from_engine(TapBranchTag::engine()).to_string(),
            "53c373ec4d6f3c53c1f5fb2ff506dcefe1a0ed74874f93fa93c8214cbe9ffddf"
        );
        assert_eq!(
            TapTweakHash::from_engine(TapTweakTag::engine()).to_string(),
            "8aa4229474ab0100b2d6f0687f031d1fc9d8eef92a042ad97d279bff456b15e4"
        );

        // 0-byte
        //   CHashWriter writer = HasherTapLeaf;
        //   writer << std::vector<unsigned char>{};
        //   writer.GetSHA256().GetHex()
        // Note that Core writes the 0 length prefix when an empty vector is written.
        assert_eq!(
            TapLeafHash::hash(&[0]).to_string(),
            "ed1382037800c9dd938dd8854f1a8863bcdeb6705069b4b56a66ec22519d5829"
        );
        assert_eq!(
            TapNodeHash::hash(&[0]).to_string(),
            "92534b1960c7e6245af7d5fda2588db04aa6d646abc2b588dab2b69e5645eb1d"
        );
        assert_eq!(
            TapTweakHash::hash(&[0]).to_string(),
            "cd8737b5e6047fc3f16f03e8b9959e3440e1bdf6dd02f7bb899c352ad490ea1e"
        );
    }

    #[test]
    fn leaf_hash_determinism() {
        let script_a = ScriptBuf::from_hex("51").unwrap();
        let script_b = ScriptBuf::from_hex("52").unwrap();

        let hash_a = TapLeafHash::from_script(&script_a, LeafVersion::TapScript);
        assert_eq!(hash_a, TapLeafHash::from_script(&script_a, LeafVersion::TapScript));
        assert_ne!(hash_a, TapLeafHash::from_script(&script_b, LeafVersion::TapScript));

        let future = LeafVersion::from_consensus(0xc2).unwrap();
        assert_ne!(hash_a, TapLeafHash::from_script(&script_a, future));
    }

    #[test]
    fn branch_hash_order_independence() {
        let a = TapNodeHash::from_byte_array([1; 32]);
        let b = TapNodeHash::from_byte_array([2; 32]);
        assert_eq!(TapNodeHash::from_node_hashes(a, b), TapNodeHash::from_node_hashes(b, a));
        assert_ne!(TapNodeHash::from_node_hashes(a, b), TapNodeHash::from_node_hashes(a, a));
    }

    #[test]
    fn single_leaf_degeneracy() {
        let secp = Secp256k1::new();
        let internal_key = XOnlyPublicKey::from_str(
            "93c7378d96518a75448821c4f7c8f4bae7ce60f804d03d1f0628dd5dd0f5de51",
        )
        .unwrap();
        let script = ScriptBuf::from_hex("51").unwrap();

        let tree = TapNode::leaf(script.clone());
        let info = TaprootSpendInfo::from_tree(&secp, internal_key, &tree).unwrap();

        assert_eq!(
            info.merkle_root(),
            Some(TapNodeHash::from_script(&script, LeafVersion::TapScript))
        );
        let ctrl_block = info.control_block(&(script.clone(), LeafVersion::TapScript)).unwrap();
        assert!(ctrl_block.merkle_branch.is_empty());
        assert_eq!(ctrl_block.serialize().len(), TAPROOT_CONTROL_BASE_SIZE);
        assert!(ctrl_block.verify_taproot_commitment(
            &secp,
            info.output_key().to_inner(),
            &script
        ));
    }

    #[test]
    fn two_leaf_tree() {
        let secp = Secp256k1::new();
        let internal_key = XOnlyPublicKey::from_str(
            "93c7378d96518a75448821c4f7c8f4bae7ce60f804d03d1f0628dd5dd0f5de51",
        )
        .unwrap();
        // two pay-to-pubkey leaves
        let l1 = ScriptBuf::from_hex(
            "2079be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798ac",
        )
        .unwrap();
        let l2 = ScriptBuf::from_hex(
            "203455139bf238a3067bd72ed77e0ab8db590330f55ed58dba7366b53bf4734279ac",
        )
        .unwrap();

        let tree = TapNode::branch(TapNode::leaf(l1.clone()), TapNode::leaf(l2.clone()));
        let info = TaprootSpendInfo::from_tree(&secp, internal_key, &tree).unwrap();

        let h1 = TapNodeHash::from_script(&l1, LeafVersion::TapScript);
        let h2 = TapNodeHash::from_script(&l2, LeafVersion::TapScript);
        assert_eq!(info.merkle_root(), Some(TapNodeHash::from_node_hashes(h1, h2)));
        assert_eq!(info.merkle_root(), Some(tree.node_hash()));

        for script in [&l1, &l2].iter() {
            let ctrl_block =
                info.control_block(&((*script).clone(), LeafVersion::TapScript)).unwrap();
            assert_eq!(ctrl_block.merkle_branch.len(), 1);
            assert_eq!(ctrl_block.serialize().len(), 65);
            assert!(ctrl_block.verify_taproot_commitment(
                &secp,
                info.output_key().to_inner(),
                script
            ));
        }
    }

    #[test]
    fn merkle_path_soundness() {
        let secp = Secp256k1::new();
        let internal_key = XOnlyPublicKey::from_str(
            "93c7378d96518a75448821c4f7c8f4bae7ce60f804d03d1f0628dd5dd0f5de51",
        )
        .unwrap();
        let scripts: Vec<ScriptBuf> = ["51", "52", "53", "54", "55"]
            .iter()
            .map(|s| ScriptBuf::from_hex(s).unwrap())
            .collect();

        // A, B, C at depth 2; D, E at depth 3
        let tree = TapNode::branch(
            TapNode::branch(
                TapNode::leaf(scripts[0].clone()),
                TapNode::leaf(scripts[1].clone()),
            ),
            TapNode::branch(
                TapNode::leaf(scripts[2].clone()),
                TapNode::branch(
                    TapNode::leaf(scripts[3].clone()),
                    TapNode::leaf(scripts[4].clone()),
                ),
            ),
        );
        let info = TaprootSpendInfo::from_tree(&secp, internal_key, &tree).unwrap();
        let root = info.merkle_root().unwrap();

        for (i, script) in scripts.iter().enumerate() {
            let ctrl_block = info.control_block(&(script.clone(), LeafVersion::TapScript)).unwrap();
            let expected_depth = if i <= 2 { 2 } else { 3 };
            assert_eq!(ctrl_block.merkle_branch.len(), expected_depth);
            assert_eq!(ctrl_block.size(), 33 + 32 * expected_depth);

            // folding branch hashes up the recorded sibling path must
            // reproduce the root
            let mut curr = TapNodeHash::from_script(script, LeafVersion::TapScript);
            for sibling in ctrl_block.merkle_branch.as_inner() {
                curr = TapNodeHash::from_node_hashes(curr, *sibling);
            }
            assert_eq!(curr, root);

            assert!(ctrl_block.verify_taproot_commitment(
                &secp,
                info.output_key().to_inner(),
                script
            ));
        }
    }

    #[test]
    fn hidden_node_tree() {
        let secp = Secp256k1::new();
        let internal_key = XOnlyPublicKey::from_str(
            "93c7378d96518a75448821c4f7c8f4bae7ce60f804d03d1f0628dd5dd0f5de51",
        )
        .unwrap();
        let script = ScriptBuf::from_hex("51").unwrap();
        let hidden = TapNodeHash::assume_hidden([7; 32]);

        let tree = TapNode::branch(TapNode::leaf(script.clone()), TapNode::hidden(hidden));
        let info = TaprootSpendInfo::from_tree(&secp, internal_key, &tree).unwrap();

        // the revealed leaf is spendable, the hidden side yields no path
        assert_eq!(info.as_script_map().len(), 1);
        let ctrl_block = info.control_block(&(script.clone(), LeafVersion::TapScript)).unwrap();
        assert_eq!(ctrl_block.merkle_branch.as_inner(), [hidden]);
        assert!(ctrl_block.verify_taproot_commitment(
            &secp,
            info.output_key().to_inner(),
            &script
        ));
    }

    #[test]
    fn tree_depth_limit() {
        // a comb of depth 128 is fine, 129 is not
        fn comb(depth: usize) -> TapNode {
            let mut node = TapNode::leaf(ScriptBuf::from_hex("51").unwrap());
            for _ in 0..depth {
                node = TapNode::branch(node, TapNode::leaf(ScriptBuf::from_hex("52").unwrap()));
            }
            node
        }

        let secp = Secp256k1::new();
        let internal_key = XOnlyPublicKey::from_str(
            "93c7378d96518a75448821c4f7c8f4bae7ce60f804d03d1f0628dd5dd0f5de51",
        )
        .unwrap();

        let info = TaprootSpendInfo::from_tree(&secp, internal_key, &comb(128)).unwrap();
        let deep_script = ScriptBuf::from_hex("51").unwrap();
        let ctrl_block =
            info.control_block(&(deep_script.clone(), LeafVersion::TapScript)).unwrap();
        assert_eq!(ctrl_block.merkle_branch.len(), 128);
        assert_eq!(ctrl_block.size(), TAPROOT_CONTROL_MAX_SIZE);
        assert!(ctrl_block.verify_taproot_commitment(
            &secp,
            info.output_key().to_inner(),
            &deep_script
        ));

        assert_eq!(
            TaprootSpendInfo::from_tree(&secp, internal_key, &comb(129)),
            Err(TaprootBuilderError::InvalidMerkleTreeDepth(129))
        );
    }

    #[test]
    fn build_huffman_tree() {
        let secp = Secp256k1::verification_only();
        let internal_key = UntweakedPublicKey::from_str(
            "93c7378d96518a75448821c4f7c8f4bae7ce60f804d03d1f0628dd5dd0f5de51",
        )
        .unwrap();

        let script_weights = vec![
            (10, ScriptBuf::from_hex("51").unwrap()), // semantics of script don't matter for this test
            (20, ScriptBuf::from_hex("52").unwrap()),
            (20, ScriptBuf::from_hex("53").unwrap()),
            (30, ScriptBuf::from_hex("54").unwrap()),
            (19, ScriptBuf::from_hex("55").unwrap()),
        ];
        let tree_info =
            TaprootSpendInfo::with_huffman_tree(&secp, internal_key, script_weights.clone())
                .unwrap();

        /* The resulting tree should put the scripts into a tree similar
         * to the following:
         *
         *   1      __/\__
         *         /      \
         *        /\     / \
         *   2   54 52  53 /\
         *   3            55 51
         */

        for (script, length) in [("51", 3), ("52", 2), ("53", 2), ("54", 2), ("55", 3)].iter() {
            assert_eq!(
                *length,
                tree_info
                    .as_script_map()
                    .get(&(ScriptBuf::from_hex(script).unwrap(), LeafVersion::TapScript))
                    .expect("Present Key")
                    .iter()
                    .next()
                    .expect("Present Path")
                    .len()
            );
        }

        // Obtain the output key
        let output_key = tree_info.output_key();

        // Try to create and verify a control block from each path
        for (_weights, script) in script_weights {
            let ver_script = (script, LeafVersion::TapScript);
            let ctrl_block = tree_info.control_block(&ver_script).unwrap();
            assert!(ctrl_block.verify_taproot_commitment(
                &secp,
                output_key.to_inner(),
                &ver_script.0
            ))
        }

        assert_eq!(
            TapNode::with_huffman_tree(Vec::new()).unwrap_err(),
            TaprootBuilderError::EmptyTree
        );
    }

    fn verify_tap_commitments(
        secp: &Secp256k1<VerifyOnly>,
        out_spk_hex: &str,
        script_hex: &str,
        control_block_hex: &str,
    ) {
        let out_pk = XOnlyPublicKey::from_str(&out_spk_hex[4..]).unwrap();
        let out_pk = TweakedPublicKey::dangerous_assume_tweaked(out_pk);
        let script = ScriptBuf::from_hex(script_hex).unwrap();
        let control_block =
            ControlBlock::decode(&Vec::<u8>::from_hex(control_block_hex).unwrap()).unwrap();
        assert_eq!(control_block_hex, control_block.serialize().to_hex());
        assert!(control_block.verify_taproot_commitment(secp, out_pk.to_inner(), &script));
    }

    #[test]
    fn control_block_verify() {
        let secp = Secp256k1::verification_only();
        // test vectors obtained from printing values in feature_taproot.py from Bitcoin Core
        verify_tap_commitments(&secp, "51205dc8e62b15e0ebdf44751676be35ba32eed2e84608b290d4061bbff136cd7ba9", "6a", "c1a9d6f66cd4b25004f526bfa873e56942f98e8e492bd79ed6532b966104817c2bda584e7d32612381cf88edc1c02e28a296e807c16ad22f591ee113946e48a71e0641e660d1e5392fb79d64838c2b84faf04b7f5f283c9d8bf83e39e177b64372a0cd22eeab7e093873e851e247714eff762d8a30be699ba4456cfe6491b282e193a071350ae099005a5950d74f73ba13077a57bc478007fb0e4d1099ce9cf3d4");
        verify_tap_commitments(&secp, "5120e208c869c40d8827101c5ad3238018de0f3f5183d77a0c53d18ac28ddcbcd8ad", "f4", "c0a0eb12e60a52614986c623cbb6621dcdba3a47e3be6b37e032b7a11c7b98f40090ab1f4890d51115998242ebce636efb9ede1b516d9eb8952dc1068e0335306199aaf103cceb41d9bc37ec231aca89b984b5fd3c65977ce764d51033ac65adb4da14e029b1e154a85bfd9139e7aa2720b6070a4ceba8264ca61d5d3ac27aceb9ef4b54cd43c2d1fd5e11b5c2e93cf29b91ea3dc5b832201f02f7473a28c63246");
        verify_tap_commitments(
            &secp,
            "5120567666e7df90e0450bb608e17c01ed3fbcfa5355a5f8273e34e583bfaa70ce09",
            "203455139bf238a3067bd72ed77e0ab8db590330f55ed58dba7366b53bf4734279ac",
            "c1a0eb12e60a52614986c623cbb6621dcdba3a47e3be6b37e032b7a11c7b98f400",
        );
        verify_tap_commitments(&secp, "5120580a19e47269414a55eb86d5d0c6c9b371455d9fd2154412a57dec840df99fe1", "6a", "bca0eb12e60a52614986c623cbb6621dcdba3a47e3be6b37e032b7a11c7b98f40042ba1bd1c63c03ccff60d4c4d53a653f87909eb3358e7fa45c9d805231fb08c933e1f4e0f9d17f591df1419df7d5b7eb5f744f404c5ef9ecdb1b89b18cafa3a816d8b5dba3205f9a9c05f866d91f40d2793a7586d502cb42f46c7a11f66ad4aa");
        verify_tap_commitments(&secp, "5120228b94a4806254a38d6efa8a134c28ebc89546209559dfe40b2b0493bafacc5b", "6a50", "c0a0eb12e60a52614986c623cbb6621dcdba3a47e3be6b37e032b7a11c7b98f4009c9aed3dfd11ab0e78bf87ef3bf296269dc4b0f7712140386d6980992bab4b45");
        verify_tap_commitments(&secp, "5120b0a79103c31fe51eea61d2873bad8a25a310da319d7e7a85f825fa7a00ea3f85", "203455139bf238a3067bd72ed77e0ab8db590330f55ed58dba7366b53bf4734279ad51", "c1a0eb12e60a52614986c623cbb6621dcdba3a47e3be6b37e032b7a11c7b98f400");
        verify_tap_commitments(&secp, "5120f2f62e854a0012aeba78cd4ba4a0832447a5262d4c6eb4f1c95c7914b536fc6c", "6a86", "c1a0eb12e60a52614986c623cbb6621dcdba3a47e3be6b37e032b7a11c7b98f4009ad3d30479f0689dbdf59a6b840d60ad485b2effbed1825a75ce19a44e460e09056f60ea686d79cfa4fb79f197b2e905ac857a983be4a5a41a4873e865aa950780c0237de279dc063e67deec46ef8e1bc351bf12c4d67a6d568001faf097e797e6ee620f53cfe0f8acaddf2063c39c3577853bb46d61ffcba5a024c3e1216837");
        verify_tap_commitments(&secp, "5120a32b0b8cfafe0f0f8d5870030ba4d19a8725ad345cb3c8420f86ac4e0dff6207", "4c", "e8a0eb12e60a52614986c623cbb6621dcdba3a47e3be6b37e032b7a11c7b98f400615da7ac8d078e5fc7f4690fc2127ba40f0f97cc070ade5b3a7919783d91ef3f13734aab908ae998e57848a01268fe8217d70bc3ee8ea8ceae158ae964a4b5f3af20b50d7019bf47fde210eee5c52f1cfe71cfca78f2d3e7c1fd828c80351525");
        verify_tap_commitments(&secp, "51202a4772070b49bae68b44315032cdbf9c40c7c2f896781b32b931b73dbfb26d7e", "6af8", "c0a0eb12e60a52614986c623cbb6621dcdba3a47e3be6b37e032b7a11c7b98f4006f183944a14618fc7fe9ceade0f58e43a19d3c3b179ea6c43c29616413b6971c99aaf103cceb41d9bc37ec231aca89b984b5fd3c65977ce764d51033ac65adb4c3462adec78cd04f3cc156bdadec50def99feae0dc6a23664e8a2b0d42d6ca9eb968dfdf46c23af642b2688351904e0a0630e71ffac5bcaba33b9b2c8a7495ec");
        verify_tap_commitments(&secp, "5120ee9aecb28f5f35ce1f8b5ec80275ac0f81bca4a21b29b4632fb4bcbef8823e6a", "2021a5981b13be29c9d4ea179ea44a8b773ea8c02d68f6f6eefd98de20d4bd055fac", "c13359c284c196b6e80f0cf1d93b6a397cf7ee722f0427b705bd954b88ada8838bd2622fd0e104fc50aa763b43c6a792d7d117029983abd687223b4344a9402c618bba7f5fc3fa8a57491f6842acde88c1e675ca35caea3b1a69ee2c2d9b10f615");
        verify_tap_commitments(&secp, "5120885274df2252b44764dcef53c21f21154e8488b7e79fafbc96b9ebb22ad0200d", "6a50", "c1a0eb12e60a52614986c623cbb6621dcdba3a47e3be6b37e032b7a11c7b98f4000793597254158918e3369507f2d6fdbef17d18b1028bbb0719450ded0f42c58f");
    }

    #[test]
    fn control_block_decode_errors() {
        assert_eq!(
            ControlBlock::decode(&[0xc0; 32]),
            Err(TaprootError::InvalidControlBlockSize(32))
        );
        assert_eq!(
            ControlBlock::decode(&[0xc0; 34]),
            Err(TaprootError::InvalidControlBlockSize(34))
        );
        // annex prefix is not a valid leaf version
        let mut data = vec![0x50];
        data.extend_from_slice(
            &Vec::<u8>::from_hex(
                "93c7378d96518a75448821c4f7c8f4bae7ce60f804d03d1f0628dd5dd0f5de51",
            )
            .unwrap(),
        );
        assert_eq!(
            ControlBlock::decode(&data),
            Err(TaprootError::InvalidTaprootLeafVersion(0x50))
        );
    }

    #[test]
    fn leaf_version_consensus() {
        assert_eq!(LeafVersion::from_consensus(0xc0).unwrap(), LeafVersion::TapScript);
        assert_eq!(LeafVersion::TapScript.to_consensus(), 0xc0);

        let future = LeafVersion::from_consensus(0x66).unwrap();
        assert_eq!(future.to_consensus(), 0x66);
        assert!(matches!(future, LeafVersion::Future(_)));

        // odd versions and the annex prefix are rejected
        assert_eq!(
            LeafVersion::from_consensus(0xc1),
            Err(TaprootError::InvalidTaprootLeafVersion(0xc1))
        );
        assert_eq!(
            LeafVersion::from_consensus(TAPROOT_ANNEX_PREFIX),
            Err(TaprootError::InvalidTaprootLeafVersion(TAPROOT_ANNEX_PREFIX))
        );
    }

    #[test]
    #[cfg(feature = "serde")]
    fn leaf_version_serde() {
        use serde_test::{assert_tokens, Token};

        let leaf_version = LeafVersion::TapScript;
        assert_tokens(&leaf_version, &[Token::U8(192)]);
    }
}
