//! Errors raised while turning SQL text into a segment tree.
//!
//! Lint findings are never errors: they are [`crate::types::Issue`]s. A
//! [`ParseError`] means there is no tree to lint at all.

use std::fmt;

use sqlparser::tokenizer::TokenizerError;
#[cfg(feature = "tracing")]
use tracing::trace;

use crate::types::Dialect;

/// The source could not be segmented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    /// 1-based location of the offending character, when known.
    pub position: Option<Position>,
    pub dialect: Option<Dialect>,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// Which stage rejected the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The dialect's tokenizer failed (unterminated literal, stray character).
    Tokenizer,
    /// A token came back with a location that does not map into the source.
    Segmenter,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
            dialect: None,
            kind,
        }
    }

    /// Attaches a 1-based line/column location.
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.position = Some(Position { line, column });
        self
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(Position { line, column }) = self.position {
            write!(f, " (line {line}, column {column})")?;
        }
        if let Some(dialect) = self.dialect {
            write!(f, " [{dialect:?} dialect]")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

impl From<TokenizerError> for ParseError {
    fn from(err: TokenizerError) -> Self {
        let error = Self::new(ParseErrorKind::Tokenizer, err.message);

        // sqlparser uses line 0 for "no location".
        if err.location.line == 0 {
            #[cfg(feature = "tracing")]
            trace!(message = %error.message, "tokenizer error without location");
            return error;
        }

        error.at(err.location.line as usize, err.location.column as usize)
    }
}
