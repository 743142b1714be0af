//! Positioned JSON token stream.
//!
//! [`Tokenizer`] walks a JSON document once and yields structural and scalar
//! tokens while exposing a byte cursor into the source buffer. It performs
//! strict RFC 8259 checking as it goes:
//!
//! - Structural syntax (braces, brackets, colons, commas, no trailing commas)
//! - String escape sequences (including surrogate pairs)
//! - Number format (no leading zeros, no leading plus, etc.)
//! - UTF-8 validity
//! - No trailing content after the root value
//!
//! # Cursor semantics
//!
//! [`Tokenizer::offset`] is the byte just past the last token returned.
//! Whitespace and the separators `,` and `:` are consumed lazily, as part of
//! reading the *next* token. After an object key the cursor therefore sits
//! on the colon (or on whitespace before it), and after an array element it
//! sits on the comma (or on whitespace before it), never on the next value.
//!
//! # Example
//!
//! ```
//! use jsonptr_index::json::token::{Token, Tokenizer};
//!
//! let mut tokens = Tokenizer::new(br#"{"a": [1, true]}"#);
//! assert_eq!(tokens.next_token().unwrap(), Some(Token::BeginObject));
//! assert_eq!(tokens.next_token().unwrap(), Some(Token::String("a".into())));
//! assert_eq!(tokens.offset(), 4); // just past the key, on the ':'
//! assert_eq!(tokens.next_token().unwrap(), Some(Token::BeginArray));
//! assert_eq!(tokens.next_token().unwrap(), Some(Token::Number("1")));
//! assert_eq!(tokens.next_token().unwrap(), Some(Token::Bool(true)));
//! assert_eq!(tokens.next_token().unwrap(), Some(Token::EndArray));
//! assert_eq!(tokens.next_token().unwrap(), Some(Token::EndObject));
//! assert_eq!(tokens.next_token().unwrap(), None);
//! ```

use std::borrow::Cow;
use std::fmt;

/// Position information for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Byte offset (0-indexed).
    pub offset: usize,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed, in bytes not characters).
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {} (offset {})",
            self.line, self.column, self.offset
        )
    }
}

/// Kinds of syntax errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    // Structural errors
    /// Expected a specific character but found something else.
    UnexpectedCharacter { expected: &'static str, found: char },
    /// Unexpected end of input.
    UnexpectedEof { expected: &'static str },
    /// Extra content after the root JSON value.
    TrailingContent,
    /// A well-formed token appeared where the grammar does not allow it.
    UnexpectedToken {
        expected: &'static str,
        found: &'static str,
    },

    // String errors
    /// String was not closed before end of input.
    UnclosedString,
    /// Invalid escape sequence in string.
    InvalidEscape { sequence: char },
    /// Invalid unicode escape sequence.
    InvalidUnicodeEscape { reason: &'static str },
    /// Unpaired surrogate in unicode escape.
    UnpairedSurrogate { codepoint: u16 },
    /// Unescaped control character in string.
    ControlCharacter { byte: u8 },

    // Number errors
    /// Number has leading zero (e.g., 01, 007).
    LeadingZero,
    /// Number has leading plus sign.
    LeadingPlus,
    /// Invalid number format.
    InvalidNumber { reason: &'static str },

    // Other errors
    /// Invalid keyword (not null, true, or false).
    InvalidKeyword { found: String },
    /// Invalid UTF-8 sequence.
    InvalidUtf8,
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedCharacter { expected, found } => {
                write!(f, "expected {}, found {:?}", expected, found)
            }
            Self::UnexpectedEof { expected } => {
                write!(f, "unexpected end of input, expected {}", expected)
            }
            Self::TrailingContent => write!(f, "trailing content after JSON value"),
            Self::UnexpectedToken { expected, found } => {
                write!(f, "expected {}, found {} token", expected, found)
            }
            Self::UnclosedString => write!(f, "unclosed string"),
            Self::InvalidEscape { sequence } => {
                write!(f, "invalid escape sequence '\\{}'", sequence)
            }
            Self::InvalidUnicodeEscape { reason } => {
                write!(f, "invalid unicode escape: {}", reason)
            }
            Self::UnpairedSurrogate { codepoint } => {
                write!(f, "unpaired surrogate \\u{:04X}", codepoint)
            }
            Self::ControlCharacter { byte } => {
                write!(f, "unescaped control character 0x{:02X}", byte)
            }
            Self::LeadingZero => write!(f, "leading zeros not allowed in numbers"),
            Self::LeadingPlus => write!(f, "leading plus sign not allowed in numbers"),
            Self::InvalidNumber { reason } => write!(f, "invalid number: {}", reason),
            Self::InvalidKeyword { found } => {
                write!(
                    f,
                    "invalid keyword '{}' (expected null, true, or false)",
                    found
                )
            }
            Self::InvalidUtf8 => write!(f, "invalid UTF-8 sequence"),
        }
    }
}

/// A JSON syntax error with position information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// The kind of error.
    pub kind: SyntaxErrorKind,
    /// Position where the error occurred.
    pub position: Position,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind, self.position)
    }
}

impl std::error::Error for SyntaxError {}

/// A single JSON token.
///
/// Object keys and string values share the [`Token::String`] variant; the
/// consumer tells them apart by grammar position.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    /// `{`
    BeginObject,
    /// `}`
    EndObject,
    /// `[`
    BeginArray,
    /// `]`
    EndArray,
    /// String literal with escapes decoded. Borrowed when the literal has
    /// no escape sequences.
    String(Cow<'a, str>),
    /// Raw number text, exactly as written.
    Number(&'a str),
    /// `true` or `false`
    Bool(bool),
    /// `null`
    Null,
}

impl Token<'_> {
    /// Short human-readable name of the token kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Token::BeginObject => "'{'",
            Token::EndObject => "'}'",
            Token::BeginArray => "'['",
            Token::EndArray => "']'",
            Token::String(_) => "string",
            Token::Number(_) => "number",
            Token::Bool(_) => "boolean",
            Token::Null => "null",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

/// What the grammar allows next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// The root value.
    Root,
    /// Just after `[`: a value or `]`.
    ArrayFirst,
    /// After an array element: `,` or `]`.
    ArrayNext,
    /// Just after `{`: a key or `}`.
    ObjectFirst,
    /// After an object member: `,` or `}`.
    ObjectNext,
    /// After an object key: `:` then a value.
    Colon,
    /// Root value complete; only whitespace may follow.
    Done,
}

/// Returns true for the four JSON whitespace bytes.
#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// Advance `pos` past any JSON whitespace in `input`.
#[inline]
pub fn skip_whitespace_from(input: &[u8], mut pos: usize) -> usize {
    while pos < input.len() && is_whitespace(input[pos]) {
        pos += 1;
    }
    pos
}

/// A strict, positioned JSON tokenizer.
///
/// Nesting is tracked with an explicit stack, so arbitrarily deep documents
/// never recurse. Once an error is returned, every later call returns the
/// same error.
pub struct Tokenizer<'a> {
    input: &'a [u8],
    offset: usize,
    line: usize,
    column: usize,
    stack: Vec<Container>,
    state: State,
    failed: Option<SyntaxError>,
}

impl<'a> Tokenizer<'a> {
    /// Create a new tokenizer over the given input.
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            offset: 0,
            line: 1,
            column: 1,
            stack: Vec::new(),
            state: State::Root,
            failed: None,
        }
    }

    /// The source buffer.
    #[inline]
    pub fn input(&self) -> &'a [u8] {
        self.input
    }

    /// Byte offset just past the last consumed token.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Current cursor position with line and column.
    pub fn position(&self) -> Position {
        Position {
            offset: self.offset,
            line: self.line,
            column: self.column,
        }
    }

    /// Number of currently open containers.
    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Read the next token.
    ///
    /// Returns `Ok(None)` once the root value is complete and only
    /// whitespace remains.
    pub fn next_token(&mut self) -> Result<Option<Token<'a>>, SyntaxError> {
        if let Some(err) = &self.failed {
            return Err(err.clone());
        }
        match self.step() {
            Ok(token) => Ok(token),
            Err(err) => {
                self.failed = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Consume the rest of the document, requiring it to be well-formed and
    /// free of trailing content.
    pub fn finish(mut self) -> Result<(), SyntaxError> {
        while self.next_token()?.is_some() {}
        Ok(())
    }

    fn step(&mut self) -> Result<Option<Token<'a>>, SyntaxError> {
        self.skip_whitespace();

        let token = match self.state {
            State::Done => {
                if self.is_eof() {
                    return Ok(None);
                }
                return Err(self.error(SyntaxErrorKind::TrailingContent));
            }
            State::Root => self.scan_value()?,
            State::ArrayFirst => {
                if self.peek() == Some(b']') {
                    self.advance();
                    self.close(Token::EndArray)
                } else {
                    self.scan_value()?
                }
            }
            State::ArrayNext => match self.peek() {
                Some(b',') => {
                    self.advance();
                    self.skip_whitespace();
                    self.scan_value()?
                }
                Some(b']') => {
                    self.advance();
                    self.close(Token::EndArray)
                }
                Some(c) => {
                    return Err(self.error(SyntaxErrorKind::UnexpectedCharacter {
                        expected: "',' or ']'",
                        found: c as char,
                    }));
                }
                None => {
                    return Err(self.error(SyntaxErrorKind::UnexpectedEof {
                        expected: "',' or ']'",
                    }));
                }
            },
            State::ObjectFirst => match self.peek() {
                Some(b'}') => {
                    self.advance();
                    self.close(Token::EndObject)
                }
                _ => self.scan_key()?,
            },
            State::ObjectNext => match self.peek() {
                Some(b',') => {
                    self.advance();
                    self.skip_whitespace();
                    // A '}' here is a trailing comma and is rejected by scan_key
                    self.scan_key()?
                }
                Some(b'}') => {
                    self.advance();
                    self.close(Token::EndObject)
                }
                Some(c) => {
                    return Err(self.error(SyntaxErrorKind::UnexpectedCharacter {
                        expected: "',' or '}'",
                        found: c as char,
                    }));
                }
                None => {
                    return Err(self.error(SyntaxErrorKind::UnexpectedEof {
                        expected: "',' or '}'",
                    }));
                }
            },
            State::Colon => match self.peek() {
                Some(b':') => {
                    self.advance();
                    self.skip_whitespace();
                    self.scan_value()?
                }
                Some(c) => {
                    return Err(self.error(SyntaxErrorKind::UnexpectedCharacter {
                        expected: "':'",
                        found: c as char,
                    }));
                }
                None => {
                    return Err(self.error(SyntaxErrorKind::UnexpectedEof { expected: "':'" }));
                }
            },
        };

        Ok(Some(token))
    }

    /// Scan a value (object/array opener or scalar).
    fn scan_value(&mut self) -> Result<Token<'a>, SyntaxError> {
        match self.peek() {
            Some(b'{') => {
                self.advance();
                self.stack.push(Container::Object);
                self.state = State::ObjectFirst;
                Ok(Token::BeginObject)
            }
            Some(b'[') => {
                self.advance();
                self.stack.push(Container::Array);
                self.state = State::ArrayFirst;
                Ok(Token::BeginArray)
            }
            Some(b'"') => {
                let s = self.scan_string()?;
                self.state = self.after_value();
                Ok(Token::String(s))
            }
            Some(b'-') | Some(b'0'..=b'9') => {
                let n = self.scan_number()?;
                self.state = self.after_value();
                Ok(Token::Number(n))
            }
            Some(b't') | Some(b'f') | Some(b'n') => {
                let token = self.scan_keyword()?;
                self.state = self.after_value();
                Ok(token)
            }
            Some(b'+') => Err(self.error(SyntaxErrorKind::LeadingPlus)),
            Some(c) => Err(self.error(SyntaxErrorKind::UnexpectedCharacter {
                expected: "JSON value",
                found: c as char,
            })),
            None => Err(self.error(SyntaxErrorKind::UnexpectedEof {
                expected: "JSON value",
            })),
        }
    }

    /// Scan an object key.
    fn scan_key(&mut self) -> Result<Token<'a>, SyntaxError> {
        match self.peek() {
            Some(b'"') => {
                let key = self.scan_string()?;
                self.state = State::Colon;
                Ok(Token::String(key))
            }
            Some(c) => Err(self.error(SyntaxErrorKind::UnexpectedCharacter {
                expected: "string key",
                found: c as char,
            })),
            None => Err(self.error(SyntaxErrorKind::UnexpectedEof {
                expected: "string key",
            })),
        }
    }

    /// Pop the innermost container and return its closing token.
    fn close(&mut self, token: Token<'a>) -> Token<'a> {
        self.stack.pop();
        self.state = self.after_value();
        token
    }

    fn after_value(&self) -> State {
        match self.stack.last() {
            Some(Container::Array) => State::ArrayNext,
            Some(Container::Object) => State::ObjectNext,
            None => State::Done,
        }
    }

    /// Scan a string literal, decoding escapes.
    fn scan_string(&mut self) -> Result<Cow<'a, str>, SyntaxError> {
        self.advance(); // consume opening quote

        let mut run_start = self.offset;
        let mut decoded: Option<String> = None;

        loop {
            match self.peek() {
                Some(b'"') => {
                    let run = self.utf8_slice(run_start, self.offset)?;
                    self.advance();
                    return Ok(match decoded {
                        Some(mut s) => {
                            s.push_str(run);
                            Cow::Owned(s)
                        }
                        None => Cow::Borrowed(run),
                    });
                }
                Some(b'\\') => {
                    let run = self.utf8_slice(run_start, self.offset)?;
                    let c = self.scan_escape()?;
                    let buf = decoded.get_or_insert_with(String::new);
                    buf.push_str(run);
                    buf.push(c);
                    run_start = self.offset;
                }
                Some(b) if b < 0x20 => {
                    return Err(self.error(SyntaxErrorKind::ControlCharacter { byte: b }));
                }
                Some(b) => {
                    self.scan_utf8_char(b)?;
                }
                None => {
                    return Err(self.error(SyntaxErrorKind::UnclosedString));
                }
            }
        }
    }

    /// View `input[start..end]` as `&str`. The span has already been checked
    /// character by character.
    fn utf8_slice(&self, start: usize, end: usize) -> Result<&'a str, SyntaxError> {
        let input: &'a [u8] = self.input;
        std::str::from_utf8(&input[start..end])
            .map_err(|_| self.error(SyntaxErrorKind::InvalidUtf8))
    }

    /// Validate a single UTF-8 character (may be multi-byte) starting with `b`.
    fn scan_utf8_char(&mut self, b: u8) -> Result<(), SyntaxError> {
        // Single byte ASCII (0x00-0x7F)
        if b < 0x80 {
            self.advance();
            return Ok(());
        }

        let (len, min_cp, max_cp) = if b & 0xE0 == 0xC0 {
            (2, 0x80u32, 0x7FFu32)
        } else if b & 0xF0 == 0xE0 {
            (3, 0x800u32, 0xFFFFu32)
        } else if b & 0xF8 == 0xF0 {
            (4, 0x10000u32, 0x10FFFFu32)
        } else {
            return Err(self.error(SyntaxErrorKind::InvalidUtf8));
        };

        if self.offset + len > self.input.len() {
            return Err(self.error(SyntaxErrorKind::InvalidUtf8));
        }

        let bytes = &self.input[self.offset..self.offset + len];
        if bytes[1..].iter().any(|&cont| cont & 0xC0 != 0x80) {
            return Err(self.error(SyntaxErrorKind::InvalidUtf8));
        }

        let lead = match len {
            2 => b as u32 & 0x1F,
            3 => b as u32 & 0x0F,
            _ => b as u32 & 0x07,
        };
        let cp = bytes[1..]
            .iter()
            .fold(lead, |acc, &cont| (acc << 6) | (cont as u32 & 0x3F));

        // Overlong encodings and UTF-16 surrogates are not valid UTF-8
        if cp < min_cp || cp > max_cp || (0xD800..=0xDFFF).contains(&cp) {
            return Err(self.error(SyntaxErrorKind::InvalidUtf8));
        }

        for _ in 0..len {
            self.advance();
        }

        Ok(())
    }

    /// Decode an escape sequence.
    fn scan_escape(&mut self) -> Result<char, SyntaxError> {
        self.advance(); // consume backslash

        let c = match self.peek() {
            Some(b'"') => '"',
            Some(b'\\') => '\\',
            Some(b'/') => '/',
            Some(b'b') => '\u{08}',
            Some(b'f') => '\u{0C}',
            Some(b'n') => '\n',
            Some(b'r') => '\r',
            Some(b't') => '\t',
            Some(b'u') => {
                self.advance();
                return self.scan_unicode_escape();
            }
            Some(c) => {
                return Err(self.error(SyntaxErrorKind::InvalidEscape {
                    sequence: c as char,
                }));
            }
            None => return Err(self.error(SyntaxErrorKind::UnclosedString)),
        };
        self.advance();
        Ok(c)
    }

    /// Decode the `XXXX` of a `\uXXXX` escape, pairing surrogates.
    fn scan_unicode_escape(&mut self) -> Result<char, SyntaxError> {
        let high = self.scan_hex4()?;

        if (0xD800..=0xDBFF).contains(&high) {
            // High surrogate - must be followed by \uXXXX low surrogate
            if self.peek() != Some(b'\\') {
                return Err(self.error(SyntaxErrorKind::UnpairedSurrogate { codepoint: high }));
            }
            self.advance();
            if self.peek() != Some(b'u') {
                return Err(self.error(SyntaxErrorKind::UnpairedSurrogate { codepoint: high }));
            }
            self.advance();

            let low = self.scan_hex4()?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(self.error(SyntaxErrorKind::UnpairedSurrogate { codepoint: high }));
            }

            let cp = 0x10000 + (((high as u32) - 0xD800) << 10) + ((low as u32) - 0xDC00);
            return char::from_u32(cp).ok_or_else(|| {
                self.error(SyntaxErrorKind::InvalidUnicodeEscape {
                    reason: "invalid code point",
                })
            });
        }

        if (0xDC00..=0xDFFF).contains(&high) {
            return Err(self.error(SyntaxErrorKind::UnpairedSurrogate { codepoint: high }));
        }

        char::from_u32(high as u32).ok_or_else(|| {
            self.error(SyntaxErrorKind::InvalidUnicodeEscape {
                reason: "invalid code point",
            })
        })
    }

    fn scan_hex4(&mut self) -> Result<u16, SyntaxError> {
        let mut value: u16 = 0;

        for _ in 0..4 {
            let digit = match self.peek() {
                Some(b @ b'0'..=b'9') => b - b'0',
                Some(b @ b'a'..=b'f') => b - b'a' + 10,
                Some(b @ b'A'..=b'F') => b - b'A' + 10,
                Some(_) => {
                    return Err(self.error(SyntaxErrorKind::InvalidUnicodeEscape {
                        reason: "expected 4 hex digits",
                    }));
                }
                None => {
                    return Err(self.error(SyntaxErrorKind::InvalidUnicodeEscape {
                        reason: "unexpected end of input",
                    }));
                }
            };
            value = value * 16 + digit as u16;
            self.advance();
        }

        Ok(value)
    }

    /// Scan a JSON number and return its raw text.
    fn scan_number(&mut self) -> Result<&'a str, SyntaxError> {
        let start = self.offset;

        if self.peek() == Some(b'-') {
            self.advance();
        }

        // Integer part
        match self.peek() {
            Some(b'0') => {
                self.advance();
                if matches!(self.peek(), Some(b'0'..=b'9')) {
                    return Err(self.error(SyntaxErrorKind::LeadingZero));
                }
            }
            Some(b'1'..=b'9') => {
                self.advance();
                self.skip_digits();
            }
            Some(_) | None => {
                return Err(self.error(SyntaxErrorKind::InvalidNumber {
                    reason: "expected digit after minus sign",
                }));
            }
        }

        // Fraction
        if self.peek() == Some(b'.') {
            self.advance();
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.error(SyntaxErrorKind::InvalidNumber {
                    reason: "expected digit after decimal point",
                }));
            }
            self.skip_digits();
        }

        // Exponent
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.advance();
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.advance();
            }
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.error(SyntaxErrorKind::InvalidNumber {
                    reason: "expected digit in exponent",
                }));
            }
            self.skip_digits();
        }

        self.utf8_slice(start, self.offset)
    }

    fn skip_digits(&mut self) {
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.advance();
        }
    }

    /// Scan a keyword (null, true, false).
    fn scan_keyword(&mut self) -> Result<Token<'a>, SyntaxError> {
        let start = self.offset;

        while matches!(self.peek(), Some(b'a'..=b'z')) {
            self.advance();
        }

        match &self.input[start..self.offset] {
            b"null" => Ok(Token::Null),
            b"true" => Ok(Token::Bool(true)),
            b"false" => Ok(Token::Bool(false)),
            keyword => {
                let found = String::from_utf8_lossy(keyword).into_owned();
                // Report at the start of the keyword
                let position = Position {
                    offset: start,
                    line: self.line,
                    column: self.column - (self.offset - start),
                };
                Err(SyntaxError {
                    kind: SyntaxErrorKind::InvalidKeyword { found },
                    position,
                })
            }
        }
    }

    /// Skip whitespace characters (space, tab, newline, carriage return).
    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            match b {
                b' ' | b'\t' => {
                    self.offset += 1;
                    self.column += 1;
                }
                b'\n' => {
                    self.offset += 1;
                    self.line += 1;
                    self.column = 1;
                }
                b'\r' => {
                    self.offset += 1;
                    // Handle CRLF
                    if self.peek() == Some(b'\n') {
                        self.offset += 1;
                    }
                    self.line += 1;
                    self.column = 1;
                }
                _ => break,
            }
        }
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.input.get(self.offset).copied()
    }

    #[inline]
    fn advance(&mut self) {
        if self.offset < self.input.len() {
            self.offset += 1;
            self.column += 1;
        }
    }

    #[inline]
    fn is_eof(&self) -> bool {
        self.offset >= self.input.len()
    }

    /// Create an error at the current position.
    pub(crate) fn error(&self, kind: SyntaxErrorKind) -> SyntaxError {
        SyntaxError {
            kind,
            position: self.position(),
        }
    }
}
