//! Syntax error types.

use alloc::{
    format,
    string::{String, ToString},
};
use core::fmt;

use nom::{
    error::{ContextError, ErrorKind, FromExternalError, ParseError},
    IResult,
};

/// Error returned when shader text does not match the grammar or violates
/// one of its context-sensitive constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    /// Byte offset into the source.
    pub position: usize,
    /// 1-based line of `position`.
    pub line: usize,
    /// 1-based column of `position`, in characters.
    pub column: usize,
}

impl SyntaxError {
    pub fn new(source: &str, position: usize, message: impl Into<String>) -> Self {
        let position = position.min(source.len());
        let before = &source[..position];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|at| at + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() + 1;
        SyntaxError {
            message: message.into(),
            position,
            line,
            column,
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Syntax error at line {}, column {}: {}",
            self.line, self.column, self.message
        )
    }
}

impl core::error::Error for SyntaxError {}

pub(crate) fn syntax_error(source: &str, remaining: &str, message: &str) -> SyntaxError {
    SyntaxError::new(source, source.len() - remaining.len(), message)
}

/// Error threaded through the nom parsers.
///
/// `message` is set by grammar constraints and by `context`; plain
/// combinator mismatches leave it empty.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GrammarError<'a> {
    pub input: &'a str,
    pub message: Option<String>,
}

impl<'a> GrammarError<'a> {
    pub fn new(input: &'a str, message: impl Into<String>) -> Self {
        GrammarError {
            input,
            message: Some(message.into()),
        }
    }

    pub fn into_syntax_error(self, source: &str) -> SyntaxError {
        let message = match self.message {
            Some(message) => message,
            None => match self.input.chars().next() {
                Some(c) => format!("unexpected '{}'", c),
                None => "unexpected end of input".to_string(),
            },
        };
        syntax_error(source, self.input, &message)
    }
}

impl<'a> ParseError<&'a str> for GrammarError<'a> {
    fn from_error_kind(input: &'a str, _kind: ErrorKind) -> Self {
        GrammarError {
            input,
            message: None,
        }
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }

    /// Keep whichever alternative got further into the input.
    fn or(self, other: Self) -> Self {
        if self.input.len() < other.input.len()
            || (self.input.len() == other.input.len() && other.message.is_none())
        {
            self
        } else {
            other
        }
    }
}

impl<'a> ContextError<&'a str> for GrammarError<'a> {
    fn add_context(_input: &'a str, ctx: &'static str, mut other: Self) -> Self {
        if other.message.is_none() {
            other.message = Some(format!("expected {}", ctx));
        }
        other
    }
}

impl<'a, E> FromExternalError<&'a str, E> for GrammarError<'a> {
    fn from_external_error(input: &'a str, _kind: ErrorKind, _e: E) -> Self {
        GrammarError::new(input, "literal out of range")
    }
}

pub(crate) type PResult<'a, T> = IResult<&'a str, T, GrammarError<'a>>;

/// Abort the parse: a constraint was violated and no alternative may retry.
pub(crate) fn fail<'a, T>(input: &'a str, message: impl Into<String>) -> PResult<'a, T> {
    Err(nom::Err::Failure(GrammarError::new(input, message)))
}

/// Recoverable mismatch with a description of what was expected.
pub(crate) fn expected<'a, T>(input: &'a str, what: &str) -> PResult<'a, T> {
    Err(nom::Err::Error(GrammarError::new(
        input,
        format!("expected {}", what),
    )))
}
