//
// Copyright 2024 bej-codec Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! No binary dictionary fixture files exist for BEJ in the retrieved corpus,
//! so integration tests build dictionary blobs programmatically from a flat
//! list of entries instead of reading them off disk.

pub const SET: u8 = 0x00;
pub const ARRAY: u8 = 0x01;
pub const NULL: u8 = 0x02;
pub const INTEGER: u8 = 0x03;
pub const ENUM: u8 = 0x04;
pub const STRING: u8 = 0x05;
pub const BOOLEAN: u8 = 0x07;

/// One dictionary entry to be laid out by [`build_dictionary`]. Child
/// pointers are absolute byte offsets computed by the caller via
/// [`offset_of`], matching the layout entries are actually addressed by.
pub struct EntrySpec {
    pub format: u8,
    pub flags: u8,
    pub sequence: u16,
    pub child_pointer: u16,
    pub child_count: u16,
    pub name: Option<&'static str>,
}

/// The absolute byte offset of the entry at `index` in a table that starts
/// at offset 12, as every dictionary's entry table does.
pub fn offset_of(index: usize) -> u16 {
    (12 + 10 * index) as u16
}

/// Serializes `entries` into a complete dictionary blob: a 12-byte header,
/// the fixed 10-byte entry records in order, and a trailing name table of
/// null-terminated strings.
pub fn build_dictionary(entries: &[EntrySpec]) -> Vec<u8> {
    let header_size = 12usize;
    let entries_size = 10 * entries.len();

    let mut name_table = Vec::new();
    let mut name_offsets = Vec::with_capacity(entries.len());
    let mut name_lengths = Vec::with_capacity(entries.len());

    for entry in entries {
        match entry.name {
            Some(name) => {
                name_offsets.push((header_size + entries_size + name_table.len()) as u16);
                name_lengths.push((name.len() + 1) as u8);
                name_table.extend_from_slice(name.as_bytes());
                name_table.push(0);
            }
            None => {
                name_offsets.push(0);
                name_lengths.push(0);
            }
        }
    }

    let mut out = Vec::new();
    out.push(0); // version
    out.push(0); // flags
    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    let dict_size = (header_size + entries_size + name_table.len()) as u32;
    out.extend_from_slice(&dict_size.to_le_bytes());
    out.extend_from_slice(&[0u8; 4]); // reserved

    for (i, entry) in entries.iter().enumerate() {
        out.push((entry.format << 4) | (entry.flags & 0x0F));
        out.extend_from_slice(&entry.sequence.to_le_bytes());
        out.extend_from_slice(&entry.child_pointer.to_le_bytes());
        out.extend_from_slice(&entry.child_count.to_le_bytes());
        out.push(name_lengths[i]);
        out.extend_from_slice(&name_offsets[i].to_le_bytes());
    }

    out.extend_from_slice(&name_table);
    out
}
