//! # jsonptr-index
//!
//! Single-pass JSON Pointer offset index.
//!
//! Building a [`PointerIndex`] walks a JSON document once and records, for
//! every value, its JSON Pointer path (RFC 6901 style, without the leading
//! `#`) and the byte offset where the value starts. Later lookups fetch the
//! raw bytes of any value, or decode it straight into a typed destination,
//! without re-scanning the document and without building a tree. When the
//! shape is not known ahead of time, [`PointerIndex::value`] decodes into a
//! [`serde_json::Value`].
//!
//! ## Module Organization
//!
//! - [`json`] - Positioned, strict JSON token stream and validation
//! - [`pointer`] - The path to offset index and its builder
//!
//! ## Quick Start
//!
//! ```
//! use jsonptr_index::PointerIndex;
//!
//! let text = br#"{"a":1,"b":2,"c":{"d":3,"e":4},"f":[5,6,"g",{"h":7},["i",8,9]]}"#;
//! let index = PointerIndex::build(text)?;
//!
//! assert_eq!(index.raw_span("/c")?, br#"{"d":3,"e":4}"#);
//! assert_eq!(index.raw_span("/f/4/0")?, br#""i""#);
//! assert_eq!(index.decode::<u8>("/f/3/h")?, 7);
//! assert!(index.lookup("/g").unwrap_err().is_not_found());
//! # Ok::<(), jsonptr_index::Error>(())
//! ```
//!
//! ## Logging
//!
//! Index builds and lookup misses are reported through the [`log`] facade at
//! `debug` and `trace` level. No logger is installed by this crate.

// =============================================================================
// Modules
// =============================================================================

/// Crate error type.
pub mod error;

/// JSON token stream and validation.
pub mod json;

/// JSON Pointer offset index.
pub mod pointer;

// =============================================================================
// Public re-exports
// =============================================================================

pub use error::{Error, Result};
pub use json::{validate, SyntaxError, SyntaxErrorKind};
pub use pointer::{IndexConfig, PointerIndex};
