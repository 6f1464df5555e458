//! Binary diff: locate the first byte where two byte sources diverge.
//!
//! The scan is strictly sequential from offset 0; inputs are test fixtures,
//! so there is no hashing or block-level shortcut.

use std::fmt;
use std::io::{BufReader, Read};

use avow_types::FileSubject;
use tracing::debug;

use crate::error::{DiffError, DiffResult};

/// A byte at a given offset, or the end of the sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ByteAt {
    Byte(u8),
    /// The sequence ended before this offset.
    Eof,
}

impl From<Option<u8>> for ByteAt {
    fn from(byte: Option<u8>) -> Self {
        byte.map_or(Self::Eof, Self::Byte)
    }
}

impl fmt::Display for ByteAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte(b) => write!(f, "0x{b:02X}"),
            Self::Eof => f.write_str("EOF"),
        }
    }
}

/// The outcome of a binary comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryDiffResult {
    /// Same length, same bytes.
    NoDiff,
    /// The first divergence.
    Diff {
        offset: u64,
        actual: ByteAt,
        expected: ByteAt,
    },
}

impl BinaryDiffResult {
    pub fn has_diff(&self) -> bool {
        matches!(self, Self::Diff { .. })
    }

    pub fn has_no_diff(&self) -> bool {
        !self.has_diff()
    }

    /// Offset of the first differing byte, if any.
    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::Diff { offset, .. } => Some(*offset),
            Self::NoDiff => None,
        }
    }
}

/// Compare two in-memory byte slices.
pub fn diff_bytes(actual: &[u8], expected: &[u8]) -> BinaryDiffResult {
    let offset = match actual.iter().zip(expected).position(|(a, e)| a != e) {
        Some(offset) => offset,
        None if actual.len() == expected.len() => return BinaryDiffResult::NoDiff,
        None => actual.len().min(expected.len()),
    };
    BinaryDiffResult::Diff {
        offset: offset as u64,
        actual: actual.get(offset).copied().into(),
        expected: expected.get(offset).copied().into(),
    }
}

/// Compare two streams byte by byte.
///
/// Reads stop at the first divergence; neither stream is drained further.
pub fn diff_streams<A: Read, E: Read>(actual: A, expected: E) -> std::io::Result<BinaryDiffResult> {
    let mut actual = BufReader::new(actual).bytes();
    let mut expected = BufReader::new(expected).bytes();
    let mut offset = 0u64;
    loop {
        let a = actual.next().transpose()?;
        let e = expected.next().transpose()?;
        match (a, e) {
            (None, None) => return Ok(BinaryDiffResult::NoDiff),
            (a, e) if a == e => offset += 1,
            (a, e) => {
                return Ok(BinaryDiffResult::Diff {
                    offset,
                    actual: a.into(),
                    expected: e.into(),
                })
            }
        }
    }
}

/// Compare a file subject's content with expected bytes.
pub fn diff_subject<A>(actual: &A, expected: &[u8]) -> DiffResult<BinaryDiffResult>
where
    A: FileSubject + ?Sized,
{
    let name = actual.display_name();
    let stream = actual
        .open()
        .map_err(|e| DiffError::io(format!("unable to open {name}"), e))?;
    let result = diff_streams(stream, expected)
        .map_err(|e| DiffError::io(format!("unable to read {name}"), e))?;
    debug!(subject = %name, diff = result.has_diff(), "binary diff computed");
    Ok(result)
}

/// Compare the content of two file subjects.
pub fn diff_subjects<A, E>(actual: &A, expected: &E) -> DiffResult<BinaryDiffResult>
where
    A: FileSubject + ?Sized,
    E: FileSubject + ?Sized,
{
    let actual_name = actual.display_name();
    let expected_name = expected.display_name();
    let actual_stream = actual
        .open()
        .map_err(|e| DiffError::io(format!("unable to open {actual_name}"), e))?;
    let expected_stream = expected
        .open()
        .map_err(|e| DiffError::io(format!("unable to open {expected_name}"), e))?;
    diff_streams(actual_stream, expected_stream).map_err(|e| {
        DiffError::io(
            format!("unable to compare {actual_name} with {expected_name}"),
            e,
        )
    })
}
