//! Assertions on byte streams.
//!
//! Streams are taken by value and dropped before each assertion returns.
//! Text comparisons decode both sides as UTF-8.

use std::io::Read;

use avow_diff::{diff_readers, diff_streams};
use avow_digest::{digest_diff, from_hex, MessageDigest};
use avow_types::Charset;
use tracing::debug;

use crate::config::AssertConfig;
use crate::error::{AssertError, AssertResult};
use crate::failure::{AssertionInfo, Failure};
use crate::files::{check_algorithm_name, lookup_digest, report_deltas};

const SUBJECT: &str = "InputStream";

/// Reusable stream assertions, parameterised by an [`AssertConfig`].
#[derive(Clone, Debug, Default)]
pub struct Streams {
    config: AssertConfig,
}

impl Streams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AssertConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AssertConfig {
        &self.config
    }

    fn not_null<R>(info: &AssertionInfo, actual: Option<R>) -> AssertResult<R> {
        actual.ok_or_else(|| AssertError::failed(info, Failure::ActualIsNull))
    }

    /// Assert that two streams hold the same lines.
    pub fn assert_same_content_as<A: Read, E: Read>(
        &self,
        info: &AssertionInfo,
        actual: Option<A>,
        expected: E,
    ) -> AssertResult<()> {
        let actual = Self::not_null(info, actual)?;
        let patch = diff_readers(actual, expected)
            .map_err(|e| AssertError::from_diff("Unable to compare contents of InputStreams", e))?;
        if patch.is_empty() {
            return Ok(());
        }
        let (deltas, omitted) = report_deltas(&self.config, patch.into_deltas());
        Err(AssertError::failed(
            info,
            Failure::ShouldHaveSameStreamContent { deltas, omitted },
        ))
    }

    pub fn assert_has_content<R: Read>(
        &self,
        info: &AssertionInfo,
        actual: Option<R>,
        expected: &str,
    ) -> AssertResult<()> {
        let actual = Self::not_null(info, actual)?;
        let patch = diff_readers(actual, expected.as_bytes())
            .map_err(|e| AssertError::from_diff("Unable to verify text contents of InputStream", e))?;
        if patch.is_empty() {
            return Ok(());
        }
        let (deltas, omitted) = report_deltas(&self.config, patch.into_deltas());
        Err(AssertError::failed(
            info,
            Failure::ShouldHaveContent {
                subject: SUBJECT.to_string(),
                charset: Charset::Utf8,
                deltas,
                omitted,
            },
        ))
    }

    pub fn assert_has_binary_content<R: Read>(
        &self,
        info: &AssertionInfo,
        actual: Option<R>,
        expected: &[u8],
    ) -> AssertResult<()> {
        let actual = Self::not_null(info, actual)?;
        let result = diff_streams(actual, expected)
            .map_err(|e| AssertError::io("Unable to verify binary contents of InputStream", e))?;
        match Failure::binary_content(SUBJECT, &result) {
            Some(failure) => Err(AssertError::failed(info, failure)),
            None => Ok(()),
        }
    }

    pub fn assert_is_empty<R: Read>(&self, info: &AssertionInfo, actual: Option<R>) -> AssertResult<()> {
        if self.first_byte(info, actual)?.is_some() {
            return Err(AssertError::failed(
                info,
                Failure::ShouldBeEmpty {
                    subject: SUBJECT.to_string(),
                },
            ));
        }
        Ok(())
    }

    pub fn assert_is_not_empty<R: Read>(
        &self,
        info: &AssertionInfo,
        actual: Option<R>,
    ) -> AssertResult<()> {
        if self.first_byte(info, actual)?.is_none() {
            return Err(AssertError::failed(
                info,
                Failure::ShouldNotBeEmpty {
                    subject: SUBJECT.to_string(),
                },
            ));
        }
        Ok(())
    }

    fn first_byte<R: Read>(&self, info: &AssertionInfo, actual: Option<R>) -> AssertResult<Option<u8>> {
        let actual = Self::not_null(info, actual)?;
        actual
            .bytes()
            .next()
            .transpose()
            .map_err(|e| AssertError::io("Unable to read InputStream", e))
    }

    /// Assert that the stream's content hashes to `expected` under `digest`.
    pub fn assert_has_digest<R: Read>(
        &self,
        info: &AssertionInfo,
        actual: Option<R>,
        digest: &mut MessageDigest,
        expected: &[u8],
    ) -> AssertResult<()> {
        let actual = Self::not_null(info, actual)?;
        let diff = digest_diff(actual, digest, expected, self.config.read_buffer_size)
            .map_err(|e| AssertError::io("Unable to calculate digest of InputStream", e))?;
        if diff.digests_differ() {
            return Err(AssertError::failed(
                info,
                Failure::ShouldHaveDigest {
                    subject: SUBJECT.to_string(),
                    diff,
                },
            ));
        }
        debug!(algorithm = digest.algorithm(), "stream digest matches");
        Ok(())
    }

    pub fn assert_has_digest_hex<R: Read>(
        &self,
        info: &AssertionInfo,
        actual: Option<R>,
        digest: &mut MessageDigest,
        expected: &str,
    ) -> AssertResult<()> {
        let expected = from_hex(expected)?;
        self.assert_has_digest(info, actual, digest, &expected)
    }

    pub fn assert_has_digest_by_name<R: Read>(
        &self,
        info: &AssertionInfo,
        actual: Option<R>,
        algorithm: &str,
        expected: &[u8],
    ) -> AssertResult<()> {
        let mut digest = lookup_digest(algorithm)?;
        self.assert_has_digest(info, actual, &mut digest, expected)
    }

    pub fn assert_has_digest_by_name_hex<R: Read>(
        &self,
        info: &AssertionInfo,
        actual: Option<R>,
        algorithm: &str,
        expected: &str,
    ) -> AssertResult<()> {
        check_algorithm_name(algorithm)?;
        let expected = from_hex(expected)?;
        self.assert_has_digest_by_name(info, actual, algorithm, &expected)
    }
}
