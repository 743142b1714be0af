//! JSON lexing.
//!
//! - [`token`] - Positioned, strict RFC 8259 token stream
//! - [`validate`](mod@validate) - Whole-document validation built on the token stream

pub mod token;
pub mod validate;

pub use token::{Position, SyntaxError, SyntaxErrorKind, Token, Tokenizer};
pub use validate::validate;
