//! JSON Pointer offset index.
//!
//! A [`PointerIndex`] maps every JSON Pointer path in a document to the byte
//! offset where that path's value begins. It is built by one pass over the
//! source and is read-only afterwards.
//!
//! Only start offsets are stored. Lookups re-decode a single value from the
//! offset with `serde_json`, which stops at the end of that value on its own,
//! so no lookup ever re-scans the document from the start.
//!
//! # Path syntax
//!
//! `""` is the root. Every other path is `/`-joined segments: object keys
//! verbatim (escape-decoded as JSON strings, but with no `~0`/`~1` handling)
//! and array indices in decimal. Paths that were never registered, such as
//! non-numeric segments under an array, yield [`Error::NotFound`].
//!
//! # Example
//!
//! ```
//! use jsonptr_index::PointerIndex;
//! use serde_json::json;
//!
//! let text = br#"{"a": 1, "c": {"d": 3}, "f": [5, "g", {"h": 7}]}"#;
//! let index = PointerIndex::build(text).unwrap();
//!
//! assert_eq!(index.raw_span("/c").unwrap(), br#"{"d": 3}"#);
//! assert_eq!(index.decode::<u32>("/f/2/h").unwrap(), 7);
//! assert_eq!(index.decode::<&str>("/f/1").unwrap(), "g");
//! assert_eq!(index.value("/c").unwrap(), json!({"d": 3}));
//! assert!(index.lookup("/f/3").unwrap_err().is_not_found());
//! ```

mod builder;
mod config;

pub use config::IndexConfig;

use log::{debug, trace};
use serde::de::{self, IgnoredAny};
use serde::Deserialize;

use crate::error::{Error, Result};
use builder::PathMap;

/// Immutable index from JSON Pointer path to value start offset.
///
/// Borrows the source buffer for its whole lifetime. Safe to share across
/// threads; no operation mutates it after [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct PointerIndex<'a> {
    text: &'a [u8],
    offsets: PathMap,
}

impl<'a> PointerIndex<'a> {
    /// Build an index over `text` with the default configuration.
    pub fn build(text: &'a [u8]) -> Result<Self> {
        Self::build_with_config(text, &IndexConfig::default())
    }

    /// Build an index over `text`.
    ///
    /// Fails with [`Error::MalformedDocument`] on the first syntax error, or
    /// [`Error::DepthLimitExceeded`] when nesting passes
    /// [`IndexConfig::max_depth`]. No partial index is returned.
    pub fn build_with_config(text: &'a [u8], config: &IndexConfig) -> Result<Self> {
        match builder::index_document(text, config) {
            Ok(offsets) => {
                debug!(
                    "indexed {} paths over {} bytes",
                    offsets.len(),
                    text.len()
                );
                Ok(Self { text, offsets })
            }
            Err(err) => {
                debug!("indexing failed: {}", err);
                Err(err)
            }
        }
    }

    /// The source buffer this index points into.
    #[inline]
    pub fn text(&self) -> &'a [u8] {
        self.text
    }

    /// Number of registered paths (including the root).
    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Whether no paths are registered. Never true for a successfully built
    /// index, which always holds the root.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Start offset of the value at `path`, if registered.
    #[inline]
    pub fn offset(&self, path: &str) -> Option<usize> {
        self.offsets.get(path).copied()
    }

    /// Whether `path` is registered.
    #[inline]
    pub fn contains(&self, path: &str) -> bool {
        self.offsets.contains_key(path)
    }

    /// Start offset of the value at `path`.
    pub fn lookup(&self, path: &str) -> Result<usize> {
        self.offset(path).ok_or_else(|| {
            trace!("lookup miss: {:?}", path);
            Error::NotFound {
                path: path.to_string(),
            }
        })
    }

    /// Exact source bytes of the value at `path`.
    ///
    /// The end of the span is found by decoding one value from the start
    /// offset, not from stored lengths.
    pub fn raw_span(&self, path: &str) -> Result<&'a [u8]> {
        let start = self.lookup(path)?;
        let text = self.text;
        let rest = &text[start..];

        let mut stream = serde_json::Deserializer::from_slice(rest).into_iter::<IgnoredAny>();
        match stream.next() {
            Some(Ok(_)) => Ok(&rest[..stream.byte_offset()]),
            Some(Err(err)) => Err(Error::Decode(err)),
            None => Err(Error::Decode(de::Error::custom(format!(
                "no JSON value at offset {}",
                start
            )))),
        }
    }

    /// Decode the value at `path` into `T`.
    ///
    /// `T` may borrow from the source buffer (`&'a str`, borrowed structs)
    /// when the value allows it. Decode failures are
    /// returned as [`Error::Decode`] with the `serde_json` error untouched.
    pub fn decode<T>(&self, path: &str) -> Result<T>
    where
        T: Deserialize<'a>,
    {
        let start = self.lookup(path)?;
        let text = self.text;
        let mut de = serde_json::Deserializer::from_slice(&text[start..]);
        T::deserialize(&mut de).map_err(Error::Decode)
    }

    /// Decode the value at `path` into an existing destination.
    ///
    /// On error `dest` is left untouched.
    pub fn decode_into<T>(&self, path: &str, dest: &mut T) -> Result<()>
    where
        T: Deserialize<'a>,
    {
        *dest = self.decode(path)?;
        Ok(())
    }

    /// Decode the value at `path` into a dynamically typed
    /// [`serde_json::Value`]. Object keys keep document order.
    pub fn value(&self, path: &str) -> Result<serde_json::Value> {
        self.decode(path)
    }

    /// Registered paths, in document order.
    pub fn paths(&self) -> impl Iterator<Item = &str> + '_ {
        self.offsets.keys().map(String::as_str)
    }

    /// `(path, offset)` pairs, in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.offsets.iter().map(|(path, &offset)| (path.as_str(), offset))
    }
}
