//! Single-pass indexing walk.
//!
//! Recursive descent over a [`Tokenizer`], registering the start offset of
//! every value under its JSON Pointer path. The path map is owned by the
//! caller and only handed to a [`PointerIndex`](super::PointerIndex) once the
//! whole walk succeeds.
//!
//! The tokenizer's cursor never lands on a value: after a key it sits on the
//! colon, after an array element on the comma. [`Indexer::value_start`]
//! corrects for that before each value is read.
//!
//! A repeated object key replaces the earlier value along with every path
//! registered beneath it, so the map only ever describes the last value.

use indexmap::IndexMap;

use super::config::IndexConfig;
use crate::error::{Error, Result};
use crate::json::token::{skip_whitespace_from, SyntaxErrorKind, Token, Tokenizer};

/// Path to start-offset mapping, in document order.
pub(crate) type PathMap = IndexMap<String, usize>;

/// Index every value in `text`.
pub(crate) fn index_document(text: &[u8], config: &IndexConfig) -> Result<PathMap> {
    let mut paths = PathMap::with_capacity(config.capacity);
    let mut indexer = Indexer {
        tokens: Tokenizer::new(text),
        max_depth: config.max_depth,
        path: String::new(),
    };

    indexer.visit_value(&mut paths, None)?;

    if !config.allow_trailing_content {
        indexer.tokens.finish()?;
    }

    Ok(paths)
}

struct Indexer<'a> {
    tokens: Tokenizer<'a>,
    max_depth: usize,
    /// Pointer of the value being visited. Segments are pushed before
    /// descending and truncated afterwards.
    path: String,
}

impl<'a> Indexer<'a> {
    /// Read one value whose separator (if any) is `delimiter`.
    fn visit_value(
        &mut self,
        paths: &mut PathMap,
        delimiter: Option<u8>,
    ) -> Result<()> {
        let start = self.value_start(delimiter);
        let token = self.next()?;
        self.visit_token(paths, token, start)
    }

    /// Register the value introduced by `token` and descend into containers.
    fn visit_token(
        &mut self,
        paths: &mut PathMap,
        token: Token<'a>,
        start: usize,
    ) -> Result<()> {
        match token {
            Token::BeginObject => {
                paths.insert(self.path.clone(), start);
                self.check_depth()?;
                self.visit_object(paths)
            }
            Token::BeginArray => {
                paths.insert(self.path.clone(), start);
                self.check_depth()?;
                self.visit_array(paths)
            }
            Token::EndObject | Token::EndArray => Err(self.unexpected("JSON value", &token).into()),
            Token::String(_) | Token::Number(_) | Token::Bool(_) | Token::Null => {
                paths.insert(self.path.clone(), start);
                Ok(())
            }
        }
    }

    fn visit_object(&mut self, paths: &mut PathMap) -> Result<()> {
        loop {
            match self.next()? {
                Token::EndObject => return Ok(()),
                Token::String(key) => {
                    let len = self.path.len();
                    self.path.push('/');
                    self.path.push_str(&key);
                    if paths.contains_key(&self.path) {
                        remove_subtree(paths, &self.path);
                    }
                    self.visit_value(paths, Some(b':'))?;
                    self.path.truncate(len);
                }
                other => return Err(self.unexpected("object key or '}'", &other).into()),
            }
        }
    }

    fn visit_array(&mut self, paths: &mut PathMap) -> Result<()> {
        let mut index = 0usize;
        loop {
            // The first element follows '[' directly; later ones follow a ','
            let delimiter = if index == 0 { None } else { Some(b',') };
            let start = self.value_start(delimiter);

            let token = self.next()?;
            if matches!(token, Token::EndArray) {
                return Ok(());
            }

            let len = self.path.len();
            self.path.push('/');
            self.path.push_str(&index.to_string());
            self.visit_token(paths, token, start)?;
            self.path.truncate(len);

            index += 1;
        }
    }

    /// Offset correction: from the cursor, skip whitespace, then `delimiter`
    /// if it is next, then whitespace again. The result is the first byte of
    /// the upcoming value.
    fn value_start(&self, delimiter: Option<u8>) -> usize {
        let text = self.tokens.input();
        let mut pos = skip_whitespace_from(text, self.tokens.offset());
        if let Some(delimiter) = delimiter {
            if text.get(pos) == Some(&delimiter) {
                pos = skip_whitespace_from(text, pos + 1);
            }
        }
        pos
    }

    fn next(&mut self) -> Result<Token<'a>> {
        match self.tokens.next_token()? {
            Some(token) => Ok(token),
            None => Err(self
                .tokens
                .error(SyntaxErrorKind::UnexpectedEof {
                    expected: "JSON value",
                })
                .into()),
        }
    }

    fn check_depth(&self) -> Result<()> {
        if self.tokens.depth() > self.max_depth {
            return Err(Error::DepthLimitExceeded {
                limit: self.max_depth,
                position: self.tokens.position(),
            });
        }
        Ok(())
    }

    fn unexpected(&self, expected: &'static str, found: &Token<'_>) -> crate::json::SyntaxError {
        self.tokens.error(SyntaxErrorKind::UnexpectedToken {
            expected,
            found: found.kind_name(),
        })
    }
}

/// Drop `path` and everything registered beneath it.
fn remove_subtree(paths: &mut PathMap, path: &str) {
    paths.retain(|p, _| {
        !(p.starts_with(path) && (p.len() == path.len() || p.as_bytes()[path.len()] == b'/'))
    });
}
