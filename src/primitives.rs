//
// Copyright 2024 bej-codec Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! Byte-level primitives shared by the dictionary and the BEJ wire format:
//! little-endian fixed-width integers and the `nnint` variable-length codec.

use nom::{
    bytes::complete::take,
    number::complete::{be_u8, le_u16, le_u32},
    IResult,
};

use crate::error::{Error, Result};

fn le_u16_field(input: &[u8]) -> IResult<&[u8], u16> {
    le_u16(input)
}

fn le_u32_field(input: &[u8]) -> IResult<&[u8], u32> {
    le_u32(input)
}

/// Reads a little-endian 16-bit integer from the start of `input`.
pub fn read_u16(input: &[u8]) -> Result<u16> {
    le_u16_field(input)
        .map(|(_, value)| value)
        .map_err(|_| Error::malformed_dictionary("truncated 16-bit field"))
}

/// Reads a little-endian 32-bit integer from the start of `input`.
pub fn read_u32(input: &[u8]) -> Result<u32> {
    le_u32_field(input)
        .map(|(_, value)| value)
        .map_err(|_| Error::malformed_dictionary("truncated 32-bit field"))
}

/// Appends a little-endian 16-bit integer to `out`.
pub fn write_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Appends a little-endian 32-bit integer to `out`.
pub fn write_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Parses an `nnint`: one length byte `n` (0..=8) followed by `n` little-endian
/// value bytes, assembled into a `u64`. A zero-length encoding yields 0.
fn nnint_parser(input: &[u8]) -> IResult<&[u8], u64> {
    let (input, n) = be_u8(input)?;
    if n > 8 {
        return Err(nom::Err::Failure((input, nom::error::ErrorKind::TooLarge)));
    }
    let (input, bytes) = take(n as usize)(input)?;
    let value = bytes
        .iter()
        .enumerate()
        .fold(0u64, |acc, (i, b)| acc | ((*b as u64) << (8 * i)));
    Ok((input, value))
}

/// Decodes an `nnint` from the front of `input`, returning the value and the
/// remaining bytes.
pub fn decode_nnint(input: &[u8]) -> Result<(u64, &[u8])> {
    nnint_parser(input)
        .map(|(rest, value)| (value, rest))
        .map_err(|_| Error::malformed_stream("truncated or invalid nnint"))
}

/// Encodes `value` as an `nnint`, appending it to `out`. Zero is always
/// emitted as the two-byte form `01 00`; other values use the minimal byte
/// length, stripping high-order zero bytes.
pub fn write_nnint(out: &mut Vec<u8>, value: u64) {
    if value == 0 {
        out.push(1);
        out.push(0);
        return;
    }
    let bytes = value.to_le_bytes();
    let mut n = 8usize;
    while n > 1 && bytes[n - 1] == 0 {
        n -= 1;
    }
    out.push(n as u8);
    out.extend_from_slice(&bytes[..n]);
}
