// SPDX-License-Identifier: CC0-1.0

//! # Tapkit
//!
//! A library for building Taproot output commitments and the proofs needed to
//! spend them. It covers the script-tree (MAST) side of BIP-341/342: tagged
//! hashing, Merkle tree construction with per-leaf sibling paths, output-key
//! and secret-key tweaking, control block assembly and witness stack
//! finalization, including `OP_CHECKSIGADD` threshold scripts.
//!
//! Transaction construction, signature hashing and broadcast are out of scope;
//! this crate produces the byte buffers (scriptPubKeys, control blocks,
//! witness stacks, addresses) that a transaction layer consumes.
//!
//! ## Available feature flags
//!
//! * `serde` - (dependency), implements `serde`-based serialization and
//!             deserialization for tree and key types.

// Experimental features we need.
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
// Coding conventions.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Rust implementation of cryptographic hash function algorithms.
pub extern crate hashes;

/// Rust wrapper library for Pieter Wuille's libsecp256k1. Implements ECDSA and
/// BIP 340 signatures for the SECG elliptic curve group secp256k1 and related
/// utilities.
pub extern crate secp256k1;

/// Encoding library for bech32 and bech32m address formats.
pub extern crate bech32;

#[macro_use]
mod internal_macros;

mod consensus;

pub mod address;
pub mod key;
pub mod opcodes;
pub mod script;
pub mod sighash;
pub mod taproot;
pub mod witness;


#[rustfmt::skip]                // Keep public re-exports separate.
#[doc(inline)]
pub use crate::{
    address::Address,
    key::{TapTweak, TweakError, TweakedKeyPair, TweakedPublicKey, UntweakedKeyPair, UntweakedPublicKey},
    script::{Builder, ScriptBuf},
    sighash::TapSighashType,
    taproot::{
        ControlBlock, LeafVersion, Signature, TapLeafHash, TapNode, TapNodeHash, TapTweakHash,
        TaprootBuilderError, TaprootError, TaprootMerkleBranch, TaprootSpendInfo,
    },
    witness::{MultiA, SatisfyError, Witness},
};
