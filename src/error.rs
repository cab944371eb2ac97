//
// Copyright 2024 bej-codec Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

use std::fmt::{self, Display};
use std::io;

/// The result type returned by every fallible operation in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the BEJ codec core.
///
/// Every variant but [`Error::Io`] carries a message describing the specific
/// failure; the variant itself identifies which of the five kinds the
/// specification distinguishes.
#[derive(Debug)]
pub enum Error {
    /// Failure opening or reading a dictionary or BEJ file at the driver boundary.
    Io(io::Error),
    /// The dictionary blob's header, entry table, or name table is malformed.
    MalformedDictionary(String),
    /// The BEJ byte stream is truncated, carries an invalid `nnint`, or a
    /// payload over/underruns its declared length.
    MalformedStream(String),
    /// A JSON value did not match the shape the dictionary requires, or a
    /// sequence number / enum name could not be resolved against a dictionary.
    SchemaMismatch(String),
    /// A recognized-but-unimplemented format (`REAL`) or an unrecognized
    /// format byte was required where the operation cannot proceed without it.
    Unsupported(String),
}

impl Error {
    pub(crate) fn malformed_dictionary(msg: impl Into<String>) -> Error {
        Error::MalformedDictionary(msg.into())
    }

    pub(crate) fn malformed_stream(msg: impl Into<String>) -> Error {
        Error::MalformedStream(msg.into())
    }

    pub(crate) fn schema_mismatch(msg: impl Into<String>) -> Error {
        Error::SchemaMismatch(msg.into())
    }

    pub(crate) fn unsupported(msg: impl Into<String>) -> Error {
        Error::Unsupported(msg.into())
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "i/o error: {}", e),
            Error::MalformedDictionary(msg) => write!(f, "malformed dictionary: {}", msg),
            Error::MalformedStream(msg) => write!(f, "malformed BEJ stream: {}", msg),
            Error::SchemaMismatch(msg) => write!(f, "schema mismatch: {}", msg),
            Error::Unsupported(msg) => write!(f, "unsupported: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}
