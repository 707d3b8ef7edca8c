// SPDX-License-Identifier: CC0-1.0

//! Taproot addresses.
//!
//! A taproot output key rendered as a witness-version-1 bech32m string. The
//! human-readable prefix is caller-supplied network configuration ("bc" for
//! mainnet, "tb" for testnet and signet, "bcrt" for regtest); the crate does
//! not decide networks.

use std::fmt;

use secp256k1::{Secp256k1, Verification};

use crate::key::{TapTweak, TweakError, TweakedPublicKey, UntweakedPublicKey};
use crate::script::ScriptBuf;
use crate::taproot::TapNodeHash;

/// A taproot (pay-to-taproot) address.
///
/// Encodes an output key and the bech32 human-readable prefix it should be
/// rendered with. The string form is produced by the [`fmt::Display`]
/// implementation.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address {
    output_key: TweakedPublicKey,
    hrp: String,
}

impl Address {
    /// Creates a pay-to-taproot address from an untweaked key.
    ///
    /// The key is tweaked with the optional script tree Merkle root before
    /// encoding, as for any taproot output.
    pub fn p2tr<C: Verification>(
        secp: &Secp256k1<C>,
        internal_key: UntweakedPublicKey,
        merkle_root: Option<TapNodeHash>,
        hrp: &str,
    ) -> Result<Address, TweakError> {
        let (output_key, _parity) = internal_key.tap_tweak(secp, merkle_root)?;
        Ok(Address::p2tr_tweaked(output_key, hrp))
    }

    /// Creates a pay-to-taproot address from a pre-tweaked output key.
    ///
    /// This method is not recommended for use, [`Address::p2tr`] should be
    /// used where possible.
    pub fn p2tr_tweaked(output_key: TweakedPublicKey, hrp: &str) -> Address {
        Address { output_key, hrp: hrp.to_owned() }
    }

    /// Returns the output key this address encodes.
    pub fn output_key(&self) -> TweakedPublicKey { self.output_key }

    /// Returns the bech32 human-readable prefix of this address.
    pub fn hrp(&self) -> &str { &self.hrp }

    /// Generates the script pubkey spending to this address.
    pub fn script_pubkey(&self) -> ScriptBuf {
        ScriptBuf::new_v1_p2tr_tweaked(self.output_key)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let program = self.output_key.serialize();
        let mut bech32_writer =
            bech32::Bech32Writer::new(&self.hrp, bech32::Variant::Bech32m, fmt)?;
        bech32::WriteBase32::write_u5(
            &mut bech32_writer,
            bech32::u5::try_from_u8(1).expect("1 is a valid u5"),
        )?;
        bech32::ToBase32::write_base32(&program.as_ref(), &mut bech32_writer)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}
