//! Parser error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured position of an error, attached once the source is known
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub filename: Option<String>,
    /// 1-based
    pub line: usize,
    /// 1-based, counted in characters
    pub col: usize,
    /// Surrounding lines with a caret under `col`
    pub excerpt: String,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexErrorKind {
    #[default]
    #[error("Unexpected character")]
    UnexpectedCharacter,
    #[error("Unterminated string")]
    UnterminatedString,
    #[error("Unterminated regular expression")]
    UnterminatedRegExp,
    #[error("Unterminated chevron")]
    UnterminatedChevron,
    #[error("Unterminated interpolation")]
    UnterminatedInterpolation,
    #[error("Unterminated block comment")]
    UnterminatedComment,
}

/// Error produced by token callbacks. `offset` is absolute when set; when it
/// is `None` the start of the failing token is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub offset: Option<usize>,
}

impl LexError {
    pub fn new(kind: LexErrorKind, offset: usize) -> Self {
        Self {
            kind,
            offset: Some(offset),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    /// Malformed literal or a character that starts no token
    #[error("{message}")]
    Lex {
        kind: LexErrorKind,
        offset: usize,
        message: String,
        location: Option<Location>,
    },

    /// No derivation of the start symbol. `offset` is the first token the
    /// chart could not consume, `None` when the input ended too early.
    #[error("{message}")]
    Syntax {
        offset: Option<usize>,
        message: String,
        location: Option<Location>,
    },

    #[error("Parsing Ambiguity: {count} parsings found")]
    Ambiguity { count: u64 },

    #[error("Internal grammar error: {0}")]
    Internal(String),
}

impl ParseError {
    pub fn lex(kind: LexErrorKind, offset: usize) -> Self {
        ParseError::Lex {
            kind,
            offset,
            message: kind.to_string(),
            location: None,
        }
    }

    /// Raw "no parse" error for the token at `offset` (or end of input).
    pub fn no_parse(offset: Option<usize>, found: Option<&str>) -> Self {
        let message = match (offset, found) {
            (Some(at), Some(found)) => {
                format!("No possible parsings (@{at}: unexpected `{found}`).")
            }
            _ => "No possible parsings".to_string(),
        };
        ParseError::Syntax {
            offset,
            message,
            location: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ParseError::Internal(message.into())
    }

    /// Byte offset the error points at, if any
    pub fn offset(&self) -> Option<usize> {
        match self {
            ParseError::Lex { offset, .. } => Some(*offset),
            ParseError::Syntax { offset, .. } => *offset,
            _ => None,
        }
    }

    /// Structured `{filename, line, col, excerpt}` once a location is attached
    pub fn location(&self) -> Option<&Location> {
        match self {
            ParseError::Lex { location, .. } | ParseError::Syntax { location, .. } => {
                location.as_ref()
            }
            _ => None,
        }
    }

    pub fn is_ambiguity(&self) -> bool {
        matches!(self, ParseError::Ambiguity { .. })
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
