use thiserror::Error;

use crate::charset::Charset;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("input is malformed for charset {charset} at byte offset {offset}")]
    MalformedInput { charset: Charset, offset: usize },

    #[error("text cannot be encoded as {charset}: unmappable character at byte offset {offset}")]
    Unmappable { charset: Charset, offset: usize },

    #[error("unknown charset: {0}")]
    UnknownCharset(String),
}

/// Convenience alias for type results.
pub type TypeResult<T> = Result<T, TypeError>;
