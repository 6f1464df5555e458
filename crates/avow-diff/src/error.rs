//! Error types for the diff crate.

use std::io;

use avow_types::TypeError;

/// Errors that can occur during diff operations.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// Reading one of the inputs failed.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// Input bytes could not be decoded with the requested charset.
    #[error(transparent)]
    Decode(#[from] TypeError),

    /// A patch did not match the sequence it was applied to.
    #[error("patch does not apply at line {line}: {reason}")]
    PatchConflict { line: usize, reason: String },
}

impl DiffError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Returns `true` if the input was not valid text in its charset.
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, Self::Decode(TypeError::MalformedInput { .. }))
    }
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
