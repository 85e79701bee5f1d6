//! Error types for RTF parsing.

use thiserror::Error;

/// Result type for RTF operations.
pub type RtfResult<T> = Result<T, RtfError>;

/// RTF parsing errors.
#[derive(Debug, Clone, Error)]
pub enum RtfError {
    /// Lexer error during tokenization
    #[error("RTF lexer error: {0}")]
    LexerError(String),
    /// Parser error during document construction
    #[error("RTF parser error: {0}")]
    ParserError(String),
    /// Invalid RTF structure
    #[error("invalid RTF structure: {0}")]
    InvalidStructure(String),
    /// Invalid unicode character
    #[error("invalid unicode: {0}")]
    InvalidUnicode(String),
    /// Unexpected end of input
    #[error("unexpected end of input")]
    UnexpectedEof,
    /// Invalid control word
    #[error("invalid control word: {0}")]
    InvalidControlWord(String),
    /// Malformed document
    #[error("malformed RTF document: {0}")]
    MalformedDocument(String),
}

impl From<std::str::Utf8Error> for RtfError {
    fn from(err: std::str::Utf8Error) -> Self {
        RtfError::InvalidUnicode(err.to_string())
    }
}

impl From<std::num::ParseIntError> for RtfError {
    fn from(err: std::num::ParseIntError) -> Self {
        RtfError::ParserError(format!("Integer parsing error: {}", err))
    }
}
