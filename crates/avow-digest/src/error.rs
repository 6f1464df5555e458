use thiserror::Error;

/// Errors from digest operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DigestError {
    #[error("Unable to find digest implementation for: <{0}>")]
    UnknownAlgorithm(String),

    #[error("invalid hex digest {input:?}: {reason}")]
    InvalidHex { input: String, reason: String },
}

pub type DigestResult<T> = Result<T, DigestError>;
