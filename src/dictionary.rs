//
// Copyright 2024 bej-codec Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! The dictionary blob format: header and entry-table layout, a borrowed
//! view over a loaded blob, and the iteration/lookup protocol entries are
//! addressed through.
//!
//! # References
//!
//! Field offsets and the root/wildcard conventions are load-bearing details
//! recovered from the reference dictionary reader, not merely spec prose:
//! entry index 0 is reached as a one-entry subset (mirroring
//! `bej_dict_stream_init`), and `child_count == 0xFFFF` means "iterate to the
//! end of the blob" (mirroring the `-1`/wildcard sentinel in
//! `bej_dict_stream_init_subset`).

use std::fs;
use std::path::{Path, PathBuf};

use nom::{number::complete::be_u8, sequence::tuple, IResult};

use crate::error::{Error, Result};

/// Size in bytes of the fixed dictionary header.
pub const HEADER_SIZE: usize = 12;
/// Size in bytes of a single fixed-layout entry record.
pub const ENTRY_SIZE: usize = 10;
/// Sentinel `child_count` marking an array-element template entry; iteration
/// over such a subset runs until the blob ends.
pub const CHILD_COUNT_WILDCARD: u16 = 0xFFFF;

/// Bit 0 of an entry's flags nibble: the property's value may be supplied later.
pub const FLAG_DEFERRED: u8 = 1 << 0;
/// Bit 1 of an entry's flags nibble: a top-level annotation nested under a property.
pub const FLAG_NESTED_TOP_LEVEL_ANNOTATION: u8 = 1 << 1;

/// The format carried by the upper nibble of an entry's first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Set,
    Array,
    Null,
    Integer,
    Enum,
    String,
    Real,
    Boolean,
    PropertyAnnotation,
    ResourceLink,
    /// A format nibble this core does not recognize.
    Unknown(u8),
}

impl Format {
    /// Builds a `Format` from a 4-bit nibble value.
    pub fn from_nibble(nibble: u8) -> Format {
        match nibble {
            0x00 => Format::Set,
            0x01 => Format::Array,
            0x02 => Format::Null,
            0x03 => Format::Integer,
            0x04 => Format::Enum,
            0x05 => Format::String,
            0x06 => Format::Real,
            0x07 => Format::Boolean,
            0x0A => Format::PropertyAnnotation,
            0x0E => Format::ResourceLink,
            other => Format::Unknown(other),
        }
    }

    /// The wire nibble for this format.
    pub fn code(&self) -> u8 {
        match *self {
            Format::Set => 0x00,
            Format::Array => 0x01,
            Format::Null => 0x02,
            Format::Integer => 0x03,
            Format::Enum => 0x04,
            Format::String => 0x05,
            Format::Real => 0x06,
            Format::Boolean => 0x07,
            Format::PropertyAnnotation => 0x0A,
            Format::ResourceLink => 0x0E,
            Format::Unknown(code) => code,
        }
    }
}

/// A single dictionary entry, by value. The `name` slice (when present)
/// borrows from the dictionary blob's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry<'a> {
    pub format: Format,
    pub flags: u8,
    pub sequence: u16,
    pub child_pointer: u16,
    pub child_count: u16,
    pub name: Option<&'a str>,
}

impl<'a> Entry<'a> {
    pub fn is_deferred(&self) -> bool {
        self.flags & FLAG_DEFERRED != 0
    }

    pub fn is_nested_top_level_annotation(&self) -> bool {
        self.flags & FLAG_NESTED_TOP_LEVEL_ANNOTATION != 0
    }

    /// True for the convention (spec §4.5/§4.6) that a `@`-prefixed name
    /// routes its children's lookups through the annotation dictionary.
    pub fn is_annotation_property(&self) -> bool {
        self.name.map_or(false, |name| name.starts_with('@'))
    }
}

struct RawEntry {
    format: Format,
    flags: u8,
    sequence: u16,
    child_pointer: u16,
    child_count: u16,
    name_length: u8,
    name_offset: u16,
}

fn raw_header(input: &[u8]) -> IResult<&[u8], (u8, u8, u16, u32)> {
    tuple((
        be_u8,
        be_u8,
        nom::number::complete::le_u16,
        nom::number::complete::le_u32,
    ))(input)
}

fn raw_entry(input: &[u8]) -> IResult<&[u8], RawEntry> {
    let (input, format_flags) = be_u8(input)?;
    let (input, sequence) = nom::number::complete::le_u16(input)?;
    let (input, child_pointer) = nom::number::complete::le_u16(input)?;
    let (input, child_count) = nom::number::complete::le_u16(input)?;
    let (input, name_length) = be_u8(input)?;
    let (input, name_offset) = nom::number::complete::le_u16(input)?;
    Ok((
        input,
        RawEntry {
            format: Format::from_nibble(format_flags >> 4),
            flags: format_flags & 0x0F,
            sequence,
            child_pointer,
            child_count,
            name_length,
            name_offset,
        },
    ))
}

fn read_name(bytes: &[u8], offset: usize) -> Result<&str> {
    if offset >= bytes.len() {
        return Err(Error::malformed_dictionary("name offset out of range"));
    }
    let rest = &bytes[offset..];
    let nul = rest
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| Error::malformed_dictionary("unterminated name"))?;
    std::str::from_utf8(&rest[..nul])
        .map_err(|_| Error::malformed_dictionary("name is not valid UTF-8"))
}

/// An owned dictionary blob, validated at construction time.
pub struct Dictionary {
    bytes: Vec<u8>,
}

impl Dictionary {
    /// Loads a dictionary from `path`, applying the `.map` → sibling `.bin`
    /// convention: a path whose extension is exactly `map` is redirected to
    /// the same base name with extension `bin`; any other path (including an
    /// explicit `.bin`) is opened as given.
    pub fn load(path: impl AsRef<Path>) -> Result<Dictionary> {
        let resolved = resolve_sibling_bin(path.as_ref());
        let bytes = fs::read(&resolved)?;
        Dictionary::from_bytes(bytes)
    }

    /// Wraps an already-loaded blob, validating its header and entry table.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Dictionary> {
        DictionaryView::open(&bytes)?;
        Ok(Dictionary { bytes })
    }

    /// Returns a borrowed view over this dictionary's bytes.
    pub fn view(&self) -> DictionaryView<'_> {
        DictionaryView::open(&self.bytes).expect("bytes validated at construction")
    }
}

fn resolve_sibling_bin(path: &Path) -> PathBuf {
    if path.extension().map_or(false, |ext| ext == "map") {
        path.with_extension("bin")
    } else {
        path.to_path_buf()
    }
}

/// An immutable, borrowed view over a dictionary byte blob.
#[derive(Clone, Copy)]
pub struct DictionaryView<'a> {
    bytes: &'a [u8],
    entry_count: u16,
}

impl<'a> DictionaryView<'a> {
    /// Opens a view over `bytes`, failing when the blob is shorter than the
    /// header or when the entry table would overrun it.
    pub fn open(bytes: &'a [u8]) -> Result<DictionaryView<'a>> {
        if bytes.len() < HEADER_SIZE {
            return Err(Error::malformed_dictionary(
                "blob shorter than the 12-byte dictionary header",
            ));
        }
        let (_, (_version, _flags, entry_count, _dict_size)) = raw_header(bytes)
            .map_err(|_| Error::malformed_dictionary("malformed dictionary header"))?;
        let entries_end = HEADER_SIZE + ENTRY_SIZE * entry_count as usize;
        if entries_end > bytes.len() {
            return Err(Error::malformed_dictionary(
                "entry table overruns the dictionary blob",
            ));
        }
        Ok(DictionaryView { bytes, entry_count })
    }

    /// The number of entries declared in the header.
    pub fn entry_count(&self) -> u16 {
        self.entry_count
    }

    /// The entry at index 0, which every dictionary blob is addressed from.
    pub fn root_entry(&self) -> Result<Entry<'a>> {
        if self.entry_count == 0 {
            return Err(Error::malformed_dictionary("dictionary has no entries"));
        }
        self.entry_at(HEADER_SIZE)
    }

    fn entry_at(&self, offset: usize) -> Result<Entry<'a>> {
        if offset + ENTRY_SIZE > self.bytes.len() {
            return Err(Error::malformed_dictionary("entry offset out of range"));
        }
        let (_, raw) = raw_entry(&self.bytes[offset..offset + ENTRY_SIZE])
            .map_err(|_| Error::malformed_dictionary("malformed dictionary entry"))?;
        let name = if raw.name_length > 0 {
            Some(read_name(self.bytes, raw.name_offset as usize)?)
        } else {
            None
        };
        Ok(Entry {
            format: raw.format,
            flags: raw.flags,
            sequence: raw.sequence,
            child_pointer: raw.child_pointer,
            child_count: raw.child_count,
            name,
        })
    }

    /// A lazy sequence over every entry in the table, starting at offset 12.
    pub fn iter_all(&self) -> EntryIter<'a> {
        EntryIter::new(self.bytes, HEADER_SIZE, Some(self.entry_count))
    }

    /// A lazy sequence of `child_count` entries starting at `child_pointer`.
    /// When `child_count` is the wildcard sentinel, iteration proceeds until
    /// the blob ends instead of counting entries.
    pub fn iter_subset(&self, child_pointer: u16, child_count: u16) -> EntryIter<'a> {
        if child_count == CHILD_COUNT_WILDCARD {
            EntryIter::new(self.bytes, child_pointer as usize, None)
        } else {
            EntryIter::new(self.bytes, child_pointer as usize, Some(child_count))
        }
    }

    /// Linear scan of a subset for the first entry whose name matches exactly.
    pub fn find_by_name(&self, child_pointer: u16, child_count: u16, name: &str) -> Option<Entry<'a>> {
        self.iter_subset(child_pointer, child_count)
            .find(|entry| entry.name == Some(name))
    }

    /// Linear scan of the full top-level entry table for the first entry
    /// whose name matches exactly. Annotation lookups always use this: the
    /// annotation dictionary has no notion of a nested subset, unlike a
    /// schema dictionary's per-SET/ARRAY child ranges.
    pub fn find_root_by_name(&self, name: &str) -> Option<Entry<'a>> {
        self.iter_all().find(|entry| entry.name == Some(name))
    }

    /// Linear scan of the full top-level entry table for the first entry
    /// with the given sequence number. See [`DictionaryView::find_root_by_name`].
    pub fn find_root_by_sequence(&self, sequence: u16) -> Option<Entry<'a>> {
        self.iter_all().find(|entry| entry.sequence == sequence)
    }

    /// Linear scan of a subset for the first entry with the given sequence number.
    pub fn find_by_sequence(&self, child_pointer: u16, child_count: u16, sequence: u16) -> Option<Entry<'a>> {
        self.iter_subset(child_pointer, child_count)
            .find(|entry| entry.sequence == sequence)
    }
}

/// A lazy, finite iterator over a contiguous run of dictionary entries.
pub struct EntryIter<'a> {
    bytes: &'a [u8],
    index: usize,
    remaining: Option<u16>,
}

impl<'a> EntryIter<'a> {
    fn new(bytes: &'a [u8], start: usize, remaining: Option<u16>) -> EntryIter<'a> {
        EntryIter {
            bytes,
            index: start,
            remaining,
        }
    }
}

impl<'a> Iterator for EntryIter<'a> {
    type Item = Entry<'a>;

    fn next(&mut self) -> Option<Entry<'a>> {
        if let Some(0) = self.remaining {
            return None;
        }
        if self.index + ENTRY_SIZE > self.bytes.len() {
            return None;
        }
        let (_, raw) = raw_entry(&self.bytes[self.index..self.index + ENTRY_SIZE]).ok()?;
        let name = if raw.name_length > 0 {
            read_name(self.bytes, raw.name_offset as usize).ok()
        } else {
            None
        };
        self.index += ENTRY_SIZE;
        if let Some(remaining) = self.remaining {
            self.remaining = Some(remaining - 1);
        }
        Some(Entry {
            format: raw.format,
            flags: raw.flags,
            sequence: raw.sequence,
            child_pointer: raw.child_pointer,
            child_count: raw.child_count,
            name,
        })
    }
}
