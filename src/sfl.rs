//
// Copyright 2024 bej-codec Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! SFL (Sequence-Format-Length) framing: the triple that precedes every
//! encoded BEJ value.

use crate::error::{Error, Result};
use crate::primitives;

/// A decoded Sequence-Format-Length header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sfl {
    /// Sequence number combined with the selector bit: `(sequence << 1) | selector`.
    pub sequence_with_selector: u64,
    /// The format nibble (upper 4 bits of the format/flags byte).
    pub format: u8,
    /// Flags nibble (lower 4 bits); always 0 in this core.
    pub flags: u8,
    /// Length in bytes of the payload that follows.
    pub length: u64,
}

impl Sfl {
    /// Splits `sequence_with_selector` into `(sequence, selector)`.
    pub fn sequence_and_selector(&self) -> (u64, u8) {
        (
            self.sequence_with_selector >> 1,
            (self.sequence_with_selector & 1) as u8,
        )
    }
}

/// Reads an SFL header from the front of `input`, returning it alongside the
/// remaining bytes.
pub fn unpack_sfl(input: &[u8]) -> Result<(Sfl, &[u8])> {
    let (sequence_with_selector, input) = primitives::decode_nnint(input)?;
    let (format_and_flags, input) = input
        .split_first()
        .ok_or_else(|| Error::malformed_stream("truncated SFL format byte"))?;
    let (length, input) = primitives::decode_nnint(input)?;
    Ok((
        Sfl {
            sequence_with_selector,
            format: format_and_flags >> 4,
            flags: format_and_flags & 0x0F,
            length,
        },
        input,
    ))
}

/// Writes an SFL header to `out`.
pub fn pack_sfl(out: &mut Vec<u8>, sequence_with_selector: u64, format: u8, length: u64) {
    primitives::write_nnint(out, sequence_with_selector);
    out.push(format << 4);
    primitives::write_nnint(out, length);
}
