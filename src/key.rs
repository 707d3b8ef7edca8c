// SPDX-License-Identifier: CC0-1.0

//! Taproot key tweaking.
//!
//! Untweaked (internal) keys and the tweaked output keys derived from them
//! are separate types so that one cannot be passed where the other is
//! expected. Tweaking itself is the BIP-341 `Q = P + H(P||c)G` equation,
//! delegated to secp256k1 for the curve arithmetic.

use std::fmt;

pub use secp256k1::{KeyPair, Parity, Secp256k1, Verification, XOnlyPublicKey};

use crate::taproot::{TapNodeHash, TapTweakHash};

/// Untweaked BIP-340 X-coordinate public key.
pub type UntweakedPublicKey = XOnlyPublicKey;

/// Untweaked BIP-340 key pair.
pub type UntweakedKeyPair = KeyPair;

/// Tweaked BIP-340 X-coordinate public key.
#[derive(Copy, Clone, PartialEq, Eq, Debug, PartialOrd, Ord, Hash)]
pub struct TweakedPublicKey(XOnlyPublicKey);

/// Tweaked BIP-340 key pair.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct TweakedKeyPair(KeyPair);

/// A trait for tweaking BIP-340 key types (x-only public keys and key pairs).
pub trait TapTweak {
    /// Tweaked key type with optional auxiliary information.
    type TweakedAux;
    /// Tweaked key type.
    type TweakedKey;

    /// Tweaks an untweaked key with the optional script tree Merkle root.
    ///
    /// This is done by using the equation Q = P + H(P|c)G, where
    ///  * Q is the tweaked public key
    ///  * P is the internal public key
    ///  * H is the hash function
    ///  * c is the commitment data
    ///  * G is the generator point
    ///
    /// # Errors
    ///
    /// [`TweakError::InvalidTweak`] if the tweaked key would be the point at
    /// infinity or the tweaked scalar zero or out of range. Both outcomes are
    /// cryptographically unreachable but checked rather than unwrapped.
    fn tap_tweak<C: Verification>(
        self,
        secp: &Secp256k1<C>,
        merkle_root: Option<TapNodeHash>,
    ) -> Result<Self::TweakedAux, TweakError>;

    /// Directly converts an untweaked key to a tweaked one.
    ///
    /// This method is dangerous and can lead to loss of funds if used
    /// incorrectly. Specifically, in multi-party protocols a peer can provide
    /// a value that allows them to steal.
    fn dangerous_assume_tweaked(self) -> Self::TweakedKey;
}

impl TapTweak for UntweakedPublicKey {
    type TweakedAux = (TweakedPublicKey, Parity);
    type TweakedKey = TweakedPublicKey;

    /// Tweaks an untweaked public key with the optional script tree Merkle
    /// root.
    ///
    /// # Returns
    ///
    /// The tweaked key and the parity of its Y coordinate, which the control
    /// block needs.
    fn tap_tweak<C: Verification>(
        self,
        secp: &Secp256k1<C>,
        merkle_root: Option<TapNodeHash>,
    ) -> Result<(TweakedPublicKey, Parity), TweakError> {
        let tweak = TapTweakHash::from_key_and_merkle_root(self, merkle_root).to_scalar();
        let (output_key, parity) =
            self.add_tweak(secp, &tweak).map_err(TweakError::InvalidTweak)?;

        debug_assert!(self.tweak_add_check(secp, &output_key, parity, tweak));
        Ok((TweakedPublicKey(output_key), parity))
    }

    fn dangerous_assume_tweaked(self) -> TweakedPublicKey {
        TweakedPublicKey::dangerous_assume_tweaked(self)
    }
}

impl TapTweak for UntweakedKeyPair {
    type TweakedAux = TweakedKeyPair;
    type TweakedKey = TweakedKeyPair;

    /// Applies a Taproot tweak to both keys within the keypair.
    ///
    /// If the keypair's public key has an odd Y coordinate the secret key is
    /// negated first (mod the curve order), so that the result signs for the
    /// x-only key actually committed to; secp256k1 performs this internally.
    fn tap_tweak<C: Verification>(
        self,
        secp: &Secp256k1<C>,
        merkle_root: Option<TapNodeHash>,
    ) -> Result<TweakedKeyPair, TweakError> {
        let (pubkey, _parity) = XOnlyPublicKey::from_keypair(&self);
        let tweak = TapTweakHash::from_key_and_merkle_root(pubkey, merkle_root).to_scalar();
        let tweaked = self.add_xonly_tweak(secp, &tweak).map_err(TweakError::InvalidTweak)?;
        Ok(TweakedKeyPair(tweaked))
    }

    fn dangerous_assume_tweaked(self) -> TweakedKeyPair {
        TweakedKeyPair::dangerous_assume_tweaked(self)
    }
}

impl TweakedPublicKey {
    /// Creates a new [`TweakedPublicKey`] from an [`XOnlyPublicKey`]. No
    /// tweak is applied, consider calling `tap_tweak` on an
    /// [`UntweakedPublicKey`] instead of using this constructor.
    pub fn dangerous_assume_tweaked(key: XOnlyPublicKey) -> TweakedPublicKey {
        TweakedPublicKey(key)
    }

    /// Returns the underlying public key.
    pub fn to_inner(self) -> XOnlyPublicKey { self.0 }

    /// Serializes the key as a byte-encoded pair of values. In compressed
    /// form the y-coordinate is represented by only a single bit, as x
    /// determines it up to one bit.
    pub fn serialize(&self) -> [u8; 32] { self.0.serialize() }
}

impl TweakedKeyPair {
    /// Creates a new [`TweakedKeyPair`] from a [`KeyPair`]. No tweak is
    /// applied, consider calling `tap_tweak` on an [`UntweakedKeyPair`]
    /// instead of using this constructor.
    pub fn dangerous_assume_tweaked(pair: KeyPair) -> TweakedKeyPair { TweakedKeyPair(pair) }

    /// Returns the underlying key pair.
    pub fn to_inner(self) -> KeyPair { self.0 }

    /// Returns the [`TweakedPublicKey`] and its parity for this keypair.
    pub fn public_parts(&self) -> (TweakedPublicKey, Parity) {
        let (xonly, parity) = XOnlyPublicKey::from_keypair(&self.0);
        (TweakedPublicKey(xonly), parity)
    }
}

impl From<TweakedPublicKey> for XOnlyPublicKey {
    fn from(pair: TweakedPublicKey) -> Self { pair.0 }
}

impl From<TweakedKeyPair> for KeyPair {
    fn from(pair: TweakedKeyPair) -> Self { pair.0 }
}

/// An error tweaking a key.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TweakError {
    /// The tweaked scalar or point was invalid (zero or out of range).
    InvalidTweak(secp256k1::Error),
}

impl fmt::Display for TweakError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            TweakError::InvalidTweak(ref e) => write_err!(f, "invalid tap tweak"; e),
        }
    }
}

impl std::error::Error for TweakError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TweakError::InvalidTweak(e) => Some(e),
        }
    }
}
