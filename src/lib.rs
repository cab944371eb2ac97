//
// Copyright 2024 bej-codec Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! A native Rust encoder and decoder for BEJ (Binary Encoded JSON) streams:
//! the dictionary-driven binary encoding that replaces JSON property names
//! and enumerant tags with numeric sequence identifiers resolved through an
//! external schema dictionary, and annotation keys (those beginning with
//! `@`) through a separate annotation dictionary.
//!
//! The JSON value tree itself is [`serde_json::Value`], re-exported here as
//! [`Json`]; textual JSON parsing and serialization are this crate's
//! collaborators, not its concern.

mod dictionary;
mod encode;
mod decode;
mod error;
mod primitives;
mod sfl;

pub use dictionary::{
    Dictionary, DictionaryView, Entry, EntryIter, Format, CHILD_COUNT_WILDCARD,
    FLAG_DEFERRED, FLAG_NESTED_TOP_LEVEL_ANNOTATION,
};
pub use decode::decode;
pub use encode::{encode, encode_with_options, EncodeOptions};
pub use error::{Error, Result};

/// The JSON value tree this crate encodes from and decodes into.
pub type Json = serde_json::Value;
