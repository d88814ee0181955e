//! Error types for Python parsing operations.
//!
//! The parser wrapper reports two failure classes: the grammar could not be
//! loaded, or the supplied source is not valid Python.

use thiserror::Error;

use crate::parser::SyntaxErrorInfo;

/// Errors from parsing operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyntaxError {
    /// Failed to initialise the Tree-sitter parser with the Python grammar.
    #[error("failed to initialise Python parser: {message}")]
    ParserInitError {
        /// Description of the failure.
        message: String,
    },

    /// Tree-sitter did not produce a syntax tree at all.
    #[error("failed to parse Python source: {message}")]
    ParseError {
        /// Description of the failure.
        message: String,
    },

    /// The source was parsed but is not syntactically valid Python.
    #[error("invalid Python at line {line}, column {column}: {message} near {context:?}")]
    InvalidSource {
        /// One-based line of the first syntax error.
        line: u32,
        /// One-based column of the first syntax error.
        column: u32,
        /// Snippet of the offending source text.
        context: String,
        /// Human-readable description of the error.
        message: String,
    },
}

impl SyntaxError {
    /// Creates a parser initialisation error.
    #[must_use]
    pub fn parser_init(message: impl Into<String>) -> Self {
        Self::ParserInitError {
            message: message.into(),
        }
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }

    /// Creates an invalid source error from the first reported syntax error.
    #[must_use]
    pub fn invalid_source(info: SyntaxErrorInfo) -> Self {
        Self::InvalidSource {
            line: info.line,
            column: info.column,
            context: info.context,
            message: info.message,
        }
    }
}
