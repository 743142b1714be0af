//! Strict whole-document JSON validation.
//!
//! Drains a [`Tokenizer`] to check that the input is a single well-formed
//! RFC 8259 document. Indexing performs the same checks as a side effect;
//! use this when only validity matters.
//!
//! # Example
//!
//! ```
//! use jsonptr_index::json::validate;
//!
//! assert!(validate(br#"{"name": "Alice", "age": 30}"#).is_ok());
//! assert!(validate(br#"{"name": "Alice",}"#).is_err()); // trailing comma
//! ```

use super::token::{SyntaxError, Tokenizer};

/// Validate JSON input.
pub fn validate(input: &[u8]) -> Result<(), SyntaxError> {
    Tokenizer::new(input).finish()
}
