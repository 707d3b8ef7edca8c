// SPDX-License-Identifier: CC0-1.0

//! Compact-size encoding.
//!
//! The minimal subset of Bitcoin consensus serialization this crate needs:
//! variable-length integers prefixing scripts inside tapleaf hashes and
//! witness stack elements on the wire.

use std::io::{self, Write};

/// A variable-length unsigned integer.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub(crate) struct VarInt(pub u64);

impl VarInt {
    /// Returns the number of bytes this varint occupies when encoded.
    pub fn len(&self) -> usize {
        match self.0 {
            0..=0xFC => 1,
            0xFD..=0xFFFF => 3,
            0x10000..=0xFFFFFFFF => 5,
            _ => 9,
        }
    }

    /// Encodes the varint to `w`, returning the number of bytes written.
    pub fn encode<W: Write>(&self, w: &mut W) -> io::Result<usize> {
        match self.0 {
            0..=0xFC => {
                w.write_all(&[self.0 as u8])?;
                Ok(1)
            }
            0xFD..=0xFFFF => {
                w.write_all(&[0xFD])?;
                w.write_all(&(self.0 as u16).to_le_bytes())?;
                Ok(3)
            }
            0x10000..=0xFFFFFFFF => {
                w.write_all(&[0xFE])?;
                w.write_all(&(self.0 as u32).to_le_bytes())?;
                Ok(5)
            }
            _ => {
                w.write_all(&[0xFF])?;
                w.write_all(&self.0.to_le_bytes())?;
                Ok(9)
            }
        }
    }
}
