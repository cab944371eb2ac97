//
// Copyright 2024 bej-codec Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! The JSON → BEJ encoder: a recursive walker that co-navigates a JSON value
//! tree and a dictionary, emitting fully framed BEJ values.

use serde_json::Map;

use crate::dictionary::{DictionaryView, Entry, Format};
use crate::error::{Error, Result};
use crate::primitives;
use crate::sfl;
use crate::Json;

/// The fixed 7-byte BEJ stream header: 4 magic bytes, 2 flags, 1 schema class.
const HEADER: [u8; 7] = [0x00, 0xF0, 0xF1, 0xF1, 0x00, 0x00, 0x00];

/// Options controlling encoder behavior at the one point the wire format
/// specification leaves to the implementation: what to do with a JSON
/// property that has no matching dictionary entry.
#[derive(Debug, Clone, Copy)]
pub struct EncodeOptions {
    /// When `true` (the default), a property with no matching dictionary
    /// entry aborts the encode with [`Error::SchemaMismatch`]. When `false`,
    /// unresolved properties are silently dropped and excluded from the
    /// emitted property count.
    pub strict: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions { strict: true }
    }
}

/// Encodes `value` (expected to be a JSON object at the root) into a BEJ byte
/// stream, using strict unknown-key handling.
pub fn encode(value: &Json, schema: &DictionaryView, annot: Option<&DictionaryView>) -> Result<Vec<u8>> {
    encode_with_options(value, schema, annot, &EncodeOptions::default())
}

/// Encodes `value` with explicit [`EncodeOptions`].
pub fn encode_with_options(
    value: &Json,
    schema: &DictionaryView,
    annot: Option<&DictionaryView>,
    options: &EncodeOptions,
) -> Result<Vec<u8>> {
    let object = value
        .as_object()
        .ok_or_else(|| Error::schema_mismatch("root value must be a JSON object"))?;
    let root_entry = schema.root_entry()?;

    let encoder = Encoder { schema, annot };
    let payload = encoder.encode_properties(object, &root_entry, options)?;

    let mut out = Vec::with_capacity(HEADER.len() + payload.len() + 8);
    out.extend_from_slice(&HEADER);
    sfl::pack_sfl(&mut out, 0, Format::Set.code(), payload.len() as u64);
    out.extend_from_slice(&payload);
    Ok(out)
}

struct Encoder<'a> {
    schema: &'a DictionaryView<'a>,
    annot: Option<&'a DictionaryView<'a>>,
}

impl<'a> Encoder<'a> {
    /// Resolves a JSON object into the `nnint(count) ++ properties` payload
    /// shared by SET and the root frame.
    fn encode_properties(
        &self,
        object: &Map<String, Json>,
        parent: &Entry<'a>,
        options: &EncodeOptions,
    ) -> Result<Vec<u8>> {
        let dict = self.context_for(parent)?;
        let mut resolved: Vec<(Entry<'a>, u8, &Json)> = Vec::with_capacity(object.len());
        for (key, value) in object {
            match self.resolve_property(parent, dict, key) {
                Some((entry, selector)) => resolved.push((entry, selector, value)),
                None => {
                    if options.strict {
                        return Err(Error::schema_mismatch(format!(
                            "unknown property `{}`",
                            key
                        )));
                    }
                    tracing::debug!(property = %key, "dropping unresolved property (lenient mode)");
                }
            }
        }

        let mut payload = Vec::new();
        primitives::write_nnint(&mut payload, resolved.len() as u64);
        for (entry, selector, value) in &resolved {
            let sequence = entry.sequence as u64;
            let framed = self.encode_value(entry, sequence, *selector, value, options)?;
            payload.extend_from_slice(&framed);
        }
        Ok(payload)
    }

    /// The dictionary `entry`'s own children live in: the annotation
    /// dictionary when `entry`'s name begins with `@` (which only arises for
    /// entries already reached through the annotation dictionary), the
    /// schema dictionary otherwise. `child_pointer`/`child_count` are byte
    /// offsets into whichever blob `entry` was read from, so this must track
    /// the entry's origin, not the selector bit that reached it or the
    /// literal prefix of the JSON key currently being encoded.
    fn context_for(&self, entry: &Entry<'a>) -> Result<&'a DictionaryView<'a>> {
        if entry.is_annotation_property() {
            self.annot
                .ok_or_else(|| Error::schema_mismatch("no annotation dictionary supplied"))
        } else {
            Ok(self.schema)
        }
    }

    /// Finds the dictionary entry and selector bit for `key` under `parent`,
    /// whose children are searched in `dict` (`parent`'s own context, from
    /// [`Encoder::context_for`]). Keys beginning with `@` instead jump to the
    /// annotation dictionary's full entry set (its root context), never a
    /// nested subset, regardless of `parent`'s context.
    fn resolve_property(
        &self,
        parent: &Entry<'a>,
        dict: &DictionaryView<'a>,
        key: &str,
    ) -> Option<(Entry<'a>, u8)> {
        if key.starts_with('@') {
            let annot = self.annot?;
            annot.find_root_by_name(key).map(|entry| (entry, 1))
        } else {
            dict.find_by_name(parent.child_pointer, parent.child_count, key)
                .map(|entry| (entry, 0))
        }
    }

    /// Builds the full `SFL ++ payload` framing for one property or array element.
    fn encode_value(
        &self,
        entry: &Entry<'a>,
        sequence: u64,
        selector: u8,
        value: &Json,
        options: &EncodeOptions,
    ) -> Result<Vec<u8>> {
        let payload = match entry.format {
            Format::Set => {
                let object = value.as_object().ok_or_else(|| {
                    Error::schema_mismatch(format!(
                        "property `{}` must be a JSON object",
                        entry.name.unwrap_or("<unnamed>")
                    ))
                })?;
                self.encode_properties(object, entry, options)?
            }
            Format::Array => self.encode_array_payload(entry, value, options)?,
            Format::Integer => {
                let n = value.as_f64().ok_or_else(|| {
                    Error::schema_mismatch(format!(
                        "property `{}` must be a number",
                        entry.name.unwrap_or("<unnamed>")
                    ))
                })?;
                let mut buf = Vec::new();
                pack_integer_value(&mut buf, n as i64);
                buf
            }
            Format::String => {
                let s = value.as_str().ok_or_else(|| {
                    Error::schema_mismatch(format!(
                        "property `{}` must be a string",
                        entry.name.unwrap_or("<unnamed>")
                    ))
                })?;
                let mut buf = Vec::new();
                pack_string_value(&mut buf, s);
                buf
            }
            Format::Boolean => {
                let b = value.as_bool().ok_or_else(|| {
                    Error::schema_mismatch(format!(
                        "property `{}` must be a boolean",
                        entry.name.unwrap_or("<unnamed>")
                    ))
                })?;
                let mut buf = Vec::new();
                pack_boolean_value(&mut buf, b);
                buf
            }
            Format::Enum => {
                let name = value.as_str().ok_or_else(|| {
                    Error::schema_mismatch(format!(
                        "property `{}` must be a string naming an enumerant",
                        entry.name.unwrap_or("<unnamed>")
                    ))
                })?;
                let dict = self.context_for(entry)?;
                pack_enum_value(dict, entry, name)?
            }
            Format::Null => Vec::new(),
            Format::Real => {
                return Err(Error::unsupported("the REAL format is not implemented"))
            }
            Format::PropertyAnnotation | Format::ResourceLink => {
                return Err(Error::unsupported(
                    "PROPERTY_ANNOTATION and RESOURCE_LINK cannot be encoded as primary formats",
                ))
            }
            Format::Unknown(code) => {
                return Err(Error::unsupported(format!(
                    "unrecognized dictionary format byte {:#x}",
                    code
                )))
            }
        };

        let mut framed = Vec::with_capacity(payload.len() + 8);
        let sequence_with_selector = (sequence << 1) | selector as u64;
        sfl::pack_sfl(&mut framed, sequence_with_selector, entry.format.code(), payload.len() as u64);
        framed.extend_from_slice(&payload);
        Ok(framed)
    }

    fn encode_array_payload(
        &self,
        entry: &Entry<'a>,
        value: &Json,
        options: &EncodeOptions,
    ) -> Result<Vec<u8>> {
        let array = value.as_array().ok_or_else(|| {
            Error::schema_mismatch(format!(
                "property `{}` must be a JSON array",
                entry.name.unwrap_or("<unnamed>")
            ))
        })?;

        let selector = if entry.is_annotation_property() { 1 } else { 0 };
        let dict = self.context_for(entry)?;
        let template = dict
            .iter_subset(entry.child_pointer, entry.child_count)
            .next()
            .ok_or_else(|| Error::schema_mismatch("array has no element template"))?;

        let mut payload = Vec::new();
        primitives::write_nnint(&mut payload, array.len() as u64);
        for (i, element) in array.iter().enumerate() {
            let framed = self.encode_value(&template, i as u64, selector, element, options)?;
            payload.extend_from_slice(&framed);
        }
        Ok(payload)
    }
}

/// Encodes a signed integer as `nnint(n) ++ n little-endian bytes`, where `n`
/// is the minimal two's-complement length that preserves the value's sign.
fn pack_integer_value(buf: &mut Vec<u8>, value: i64) {
    let bytes = (value as u64).to_le_bytes();
    let mut n = 8usize;
    while n > 1 {
        let msb_next = bytes[n - 1];
        let msb = bytes[n - 2];
        let can_shrink = if value >= 0 {
            msb_next == 0x00 && (msb & 0x80) == 0
        } else {
            msb_next == 0xFF && (msb & 0x80) != 0
        };
        if can_shrink {
            n -= 1;
        } else {
            break;
        }
    }
    primitives::write_nnint(buf, n as u64);
    buf.extend_from_slice(&bytes[..n]);
}

/// Encodes a UTF-8 string as `nnint(len + 1) ++ bytes ++ 0x00`.
fn pack_string_value(buf: &mut Vec<u8>, s: &str) {
    let total = s.len() + 1;
    primitives::write_nnint(buf, total as u64);
    buf.extend_from_slice(s.as_bytes());
    buf.push(0);
}

/// Encodes a boolean as `nnint(1) ++ (0x00 | 0x01)`.
fn pack_boolean_value(buf: &mut Vec<u8>, b: bool) {
    primitives::write_nnint(buf, 1);
    buf.push(if b { 1 } else { 0 });
}

/// Encodes an enumerant name as an outer `nnint(len(inner))` followed by the
/// inner `nnint(sequence)` verbatim; `dict` is searched under `entry`'s children.
fn pack_enum_value(dict: &DictionaryView, entry: &Entry, enum_name: &str) -> Result<Vec<u8>> {
    let sequence = dict
        .find_by_name(entry.child_pointer, entry.child_count, enum_name)
        .map(|e| e.sequence)
        .ok_or_else(|| Error::schema_mismatch(format!("enum value `{}` not found", enum_name)))?;

    let mut inner = Vec::new();
    primitives::write_nnint(&mut inner, sequence as u64);

    let mut out = Vec::with_capacity(inner.len() + 2);
    primitives::write_nnint(&mut out, inner.len() as u64);
    out.extend_from_slice(&inner);
    Ok(out)
}
