//
// Copyright 2024 bej-codec Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! The BEJ → JSON decoder: the dual recursive reader that reconstructs a
//! JSON value tree from a framed BEJ byte stream using the same dictionary
//! the encoder used.

use serde_json::Map;

use crate::dictionary::{DictionaryView, Entry, Format};
use crate::error::{Error, Result};
use crate::primitives;
use crate::sfl;
use crate::Json;

const HEADER_LEN: usize = 7;

/// Decodes a BEJ byte stream into a JSON value, resolving property names and
/// enumerants through `schema` and, for keys beginning with `@`, `annot`.
pub fn decode(input: &[u8], schema: &DictionaryView, annot: Option<&DictionaryView>) -> Result<Json> {
    if input.len() < HEADER_LEN {
        return Err(Error::malformed_stream("input shorter than the 7-byte BEJ header"));
    }
    let body = &input[HEADER_LEN..];
    let (root_sfl, body) = sfl::unpack_sfl(body)?;
    if root_sfl.format != Format::Set.code() {
        return Err(Error::malformed_stream("root SFL is not a SET"));
    }

    let mut root_entry = schema.root_entry()?;
    // Tolerate mislabelled root entries in the dictionary: the root is
    // always a SET regardless of what the dictionary's entry 0 claims.
    root_entry.format = Format::Set;

    let decoder = Decoder { schema, annot };
    let (value, _rest) = decoder.decode_value(&root_entry, root_sfl.length, body)?;
    Ok(value)
}

struct Decoder<'a> {
    schema: &'a DictionaryView<'a>,
    annot: Option<&'a DictionaryView<'a>>,
}

impl<'a> Decoder<'a> {
    fn decode_value<'i>(&self, entry: &Entry<'a>, length: u64, input: &'i [u8]) -> Result<(Json, &'i [u8])> {
        match entry.format {
            Format::Set => self.decode_set(entry, input),
            Format::Array => self.decode_array(entry, input),
            Format::Integer => decode_integer(input),
            Format::String => decode_string(input),
            Format::Boolean => decode_boolean(input),
            Format::Enum => self.decode_enum(entry, input),
            Format::Null => Ok((Json::Null, input)),
            _ => {
                let len = length as usize;
                if input.len() < len {
                    return Err(Error::malformed_stream(
                        "payload shorter than its declared length",
                    ));
                }
                tracing::debug!(
                    format = ?entry.format,
                    "skipping unsupported format during decode; emitting null"
                );
                Ok((Json::Null, &input[len..]))
            }
        }
    }

    fn decode_set<'i>(&self, entry: &Entry<'a>, input: &'i [u8]) -> Result<(Json, &'i [u8])> {
        let (count, mut input) = primitives::decode_nnint(input)?;
        let dict = self.context_for(entry);

        let mut map = Map::with_capacity(count as usize);
        for _ in 0..count {
            let (child_sfl, rest) = sfl::unpack_sfl(input)?;
            input = rest;
            let (sequence_num, selector) = child_sfl.sequence_and_selector();

            let child = self.resolve_by_sequence(dict, entry, sequence_num as u16, selector)?;
            let key = child
                .name
                .ok_or_else(|| Error::malformed_dictionary("property entry has no name"))?
                .to_string();
            tracing::trace!(property = %key, "resolved property");

            let (value, rest) = self.decode_value(&child, child_sfl.length, input)?;
            input = rest;
            map.insert(key, value);
        }
        Ok((Json::Object(map), input))
    }

    fn decode_array<'i>(&self, entry: &Entry<'a>, input: &'i [u8]) -> Result<(Json, &'i [u8])> {
        let (count, mut input) = primitives::decode_nnint(input)?;
        let context = self.context_for(entry);

        let template = match context.iter_subset(entry.child_pointer, entry.child_count).next() {
            Some(template) => template,
            None => return Ok((Json::Array(Vec::new()), input)),
        };

        let mut items = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let (element_sfl, rest) = sfl::unpack_sfl(input)?;
            input = rest;
            let (value, rest) = self.decode_value(&template, element_sfl.length, input)?;
            input = rest;
            items.push(value);
        }
        Ok((Json::Array(items), input))
    }

    fn decode_enum(&self, entry: &Entry<'a>, input: &[u8]) -> Result<(Json, &[u8])> {
        let (_outer_len, input) = primitives::decode_nnint(input)?;
        let (value, input) = primitives::decode_nnint(input)?;
        let context = self.context_for(entry);

        let name = context
            .find_by_sequence(entry.child_pointer, entry.child_count, value as u16)
            .and_then(|e| e.name)
            .ok_or_else(|| Error::schema_mismatch(format!("enum value {} not found", value)))?;
        Ok((Json::String(name.to_string()), input))
    }

    /// Resolves a child's dictionary entry from the sequence number carried
    /// by its SFL. Selector 0 searches `parent`'s own children in `dict`
    /// (the context [`Decoder::context_for`] chose for `parent`); selector 1
    /// always searches the annotation dictionary's full entry set, regardless
    /// of `parent`'s context, per the flat annotation namespace convention.
    fn resolve_by_sequence(
        &self,
        dict: &DictionaryView<'a>,
        parent: &Entry<'a>,
        sequence: u16,
        selector: u8,
    ) -> Result<Entry<'a>> {
        if selector == 0 {
            dict.find_by_sequence(parent.child_pointer, parent.child_count, sequence)
                .ok_or_else(|| {
                    Error::schema_mismatch(format!("no property with sequence {}", sequence))
                })
        } else {
            let annot = self
                .annot
                .ok_or_else(|| Error::schema_mismatch("no annotation dictionary supplied"))?;
            annot.find_root_by_sequence(sequence).ok_or_else(|| {
                Error::schema_mismatch(format!("no annotation with sequence {}", sequence))
            })
        }
    }

    /// The dictionary a SET/ARRAY/ENUM entry's children are searched in: the
    /// annotation dictionary when the entry's own name begins with `@`
    /// (which only arises from an entry already resolved through the
    /// annotation dictionary), the schema dictionary otherwise.
    fn context_for(&self, entry: &Entry<'a>) -> &'a DictionaryView<'a> {
        if entry.is_annotation_property() {
            self.annot
                .expect("annotation-prefixed entries only arise from the annotation dictionary")
        } else {
            self.schema
        }
    }
}

fn decode_integer(input: &[u8]) -> Result<(Json, &[u8])> {
    let (n, input) = primitives::decode_nnint(input)?;
    if n == 0 || n > 8 {
        return Err(Error::malformed_stream("invalid integer payload length"));
    }
    let n = n as usize;
    if input.len() < n {
        return Err(Error::malformed_stream("truncated integer payload"));
    }
    let (bytes, rest) = input.split_at(n);
    let mut value: u64 = 0;
    for (i, b) in bytes.iter().enumerate() {
        value |= (*b as u64) << (8 * i);
    }
    if n < 8 && (bytes[n - 1] & 0x80) != 0 {
        let shift = (8 - n) * 8;
        value = ((value << shift) as i64 >> shift) as u64;
    }
    Ok((Json::Number((value as i64).into()), rest))
}

fn decode_string(input: &[u8]) -> Result<(Json, &[u8])> {
    let (total_len, input) = primitives::decode_nnint(input)?;
    let total_len = total_len as usize;
    if input.len() < total_len {
        return Err(Error::malformed_stream("truncated string payload"));
    }
    let (bytes, rest) = input.split_at(total_len);
    let trimmed = if total_len == 0 { bytes } else { &bytes[..total_len - 1] };
    let s = std::str::from_utf8(trimmed)
        .map_err(|_| Error::malformed_stream("string payload is not valid UTF-8"))?;
    Ok((Json::String(s.to_string()), rest))
}

fn decode_boolean(input: &[u8]) -> Result<(Json, &[u8])> {
    let (len, input) = primitives::decode_nnint(input)?;
    if len != 1 {
        return Err(Error::malformed_stream("boolean payload length must be 1"));
    }
    let (b, rest) = input
        .split_first()
        .ok_or_else(|| Error::malformed_stream("truncated boolean payload"))?;
    Ok((Json::Bool(*b != 0), rest))
}
