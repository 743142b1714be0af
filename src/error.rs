//! Error type shared by indexing and lookup.

use std::fmt;

use crate::json::{Position, SyntaxError};

/// Errors produced while building or querying a [`PointerIndex`](crate::PointerIndex).
#[derive(Debug)]
pub enum Error {
    /// The source buffer is not a well-formed JSON document.
    ///
    /// Fatal to the build; no partial index is produced.
    MalformedDocument(SyntaxError),

    /// The document nests containers deeper than
    /// [`IndexConfig::max_depth`](crate::IndexConfig::max_depth).
    ///
    /// The document may still be well-formed; the build is refused anyway.
    DepthLimitExceeded {
        /// The configured limit.
        limit: usize,
        /// Where the first container past the limit was opened.
        position: Position,
    },

    /// The requested path was never registered.
    NotFound {
        /// The path that was looked up.
        path: String,
    },

    /// The addressed value could not be decoded into the requested type.
    ///
    /// The `serde_json` error is passed through unchanged.
    Decode(serde_json::Error),
}

impl Error {
    /// Whether this is a [`Error::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MalformedDocument(err) => write!(f, "malformed JSON document: {}", err),
            Error::DepthLimitExceeded { limit, position } => write!(
                f,
                "nesting depth exceeds limit of {} at {}",
                limit, position
            ),
            Error::NotFound { path } => write!(f, "path {:?} not found", path),
            Error::Decode(err) => write!(f, "failed to decode value: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MalformedDocument(err) => Some(err),
            Error::DepthLimitExceeded { .. } | Error::NotFound { .. } => None,
            Error::Decode(err) => Some(err),
        }
    }
}

impl From<SyntaxError> for Error {
    fn from(err: SyntaxError) -> Self {
        Error::MalformedDocument(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err)
    }
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;
