//! Error types for assertions.

use std::io;

use avow_diff::DiffError;
use avow_digest::DigestError;

use crate::failure::{AssertionInfo, Failure};

/// Everything an assertion can report.
///
/// Only [`AssertError::Failed`] means the subject did not meet the
/// expectation. The other variants mean the assertion could not be carried
/// out at all.
#[derive(Debug, thiserror::Error)]
pub enum AssertError {
    /// A caller-supplied argument was unusable. Raised before any I/O.
    #[error("{0}")]
    InvalidArgument(String),

    /// The subject did not satisfy the assertion.
    #[error("{}{}", .info.prefix(), .failure)]
    Failed { info: AssertionInfo, failure: Failure },

    /// Reading the subject or the expected content failed.
    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// The environment lacks something the assertion needs, such as a
    /// digest algorithm, or the configuration could not be loaded.
    #[error("{0}")]
    Config(String),
}

impl AssertError {
    pub(crate) fn failed(info: &AssertionInfo, failure: Failure) -> Self {
        Self::Failed {
            info: info.clone(),
            failure,
        }
    }

    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Wrap a differ error under an assertion-level context.
    ///
    /// Decoding errors keep their message as the cause, with kind
    /// `InvalidData`.
    pub(crate) fn from_diff(context: impl Into<String>, err: DiffError) -> Self {
        let source = match err {
            DiffError::Io { source, .. } => source,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        };
        Self::io(context, source)
    }

    /// The structured failure, if the subject failed the assertion.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Failed { failure, .. } => Some(failure),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl From<DigestError> for AssertError {
    fn from(err: DigestError) -> Self {
        match err {
            DigestError::UnknownAlgorithm(_) => Self::Config(err.to_string()),
            DigestError::InvalidHex { .. } => Self::InvalidArgument(err.to_string()),
        }
    }
}

/// Convenience alias for assertion results.
pub type AssertResult<T> = Result<T, AssertError>;
