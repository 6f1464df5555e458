use std::io::{self, Read};

use tracing::debug;

use crate::hex_codec::to_hex;
use crate::message_digest::MessageDigest;

/// Read buffer size used when streaming content through a digest.
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// The computed and expected digests of a subject, as upper-case hex.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DigestDiff {
    actual: String,
    expected: String,
    algorithm: String,
}

impl DigestDiff {
    pub fn new(
        actual: impl Into<String>,
        expected: impl Into<String>,
        algorithm: impl Into<String>,
    ) -> Self {
        Self {
            actual: actual.into(),
            expected: expected.into(),
            algorithm: algorithm.into(),
        }
    }

    pub fn actual(&self) -> &str {
        &self.actual
    }

    pub fn expected(&self) -> &str {
        &self.expected
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn digests_differ(&self) -> bool {
        self.actual != self.expected
    }
}

/// Stream `reader` to its end through `digest` and compare with `expected`.
///
/// The reader is consumed and dropped before this returns, whether it
/// succeeds or fails. `Interrupted` reads are retried; any other read error
/// is returned after resetting the digest.
pub fn digest_diff<R: Read>(
    mut reader: R,
    digest: &mut MessageDigest,
    expected: &[u8],
    buffer_size: usize,
) -> io::Result<DigestDiff> {
    let mut buffer = vec![0u8; buffer_size.max(1)];
    let mut total = 0u64;
    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => {
                digest.update(&buffer[..n]);
                total += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                digest.reset();
                return Err(e);
            }
        }
    }

    let actual = to_hex(&digest.digest());
    debug!(
        algorithm = digest.algorithm(),
        bytes = total,
        digest = %actual,
        "digest computed"
    );
    Ok(DigestDiff::new(actual, to_hex(expected), digest.algorithm()))
}
