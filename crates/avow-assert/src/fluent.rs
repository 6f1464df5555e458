//! Fluent entry points.
//!
//! Every check panics with the rendered error when it does not hold, and
//! reports the caller's location. Use [`Files`] and [`Streams`] directly to
//! get an [`AssertResult`] instead.

use std::cmp::Ordering;
use std::fmt;
use std::io::Read;
use std::path::Path;

use avow_digest::MessageDigest;
use avow_types::{Charset, ComparatorStrategy, ComparisonStrategy, FileSubject, StandardComparisonStrategy};

use crate::config::AssertConfig;
use crate::error::{AssertError, AssertResult};
use crate::failure::{AssertionInfo, Failure};
use crate::files::Files;
use crate::streams::Streams;

#[track_caller]
fn verify(result: AssertResult<()>) {
    if let Err(err) = result {
        panic!("{err}");
    }
}

// ---- Files ----

/// Start an assertion on a path.
pub fn assert_that_file(path: impl AsRef<Path>) -> FileAssert<'static> {
    FileAssert::new(Some(Box::new(path.as_ref().to_path_buf())))
}

/// Start an assertion on a path that may be absent.
pub fn assert_that_optional_file<P: AsRef<Path>>(path: Option<P>) -> FileAssert<'static> {
    FileAssert::new(path.map(|p| Box::new(p.as_ref().to_path_buf()) as Box<dyn FileSubject>))
}

/// Start an assertion on any [`FileSubject`].
pub fn assert_that_subject<'a, S: FileSubject + ?Sized>(subject: &'a S) -> FileAssert<'a> {
    FileAssert::new(Some(Box::new(subject)))
}

/// Chainable checks on a file subject.
pub struct FileAssert<'a> {
    actual: Option<Box<dyn FileSubject + 'a>>,
    info: AssertionInfo,
    files: Files,
    charset: Charset,
}

impl<'a> FileAssert<'a> {
    fn new(actual: Option<Box<dyn FileSubject + 'a>>) -> Self {
        let files = Files::new();
        let charset = files.config().default_charset;
        Self {
            actual,
            info: AssertionInfo::new(),
            files,
            charset,
        }
    }

    pub fn described_as(mut self, description: impl Into<String>) -> Self {
        self.info = self.info.described_as(description);
        self
    }

    /// Replace the configuration. The charset resets to the new default.
    pub fn with_config(mut self, config: AssertConfig) -> Self {
        self.charset = config.default_charset;
        self.files = Files::with_config(config);
        self
    }

    /// Charset used to decode the subject in text checks.
    pub fn using_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    fn actual(&self) -> Option<&(dyn FileSubject + 'a)> {
        self.actual.as_deref()
    }

    #[track_caller]
    pub fn exists(&self) -> &Self {
        verify(self.files.assert_exists(&self.info, self.actual()).map(|_| ()));
        self
    }

    #[track_caller]
    pub fn is_file(&self) -> &Self {
        verify(self.files.assert_is_file(&self.info, self.actual()).map(|_| ()));
        self
    }

    #[track_caller]
    pub fn can_read(&self) -> &Self {
        verify(self.files.assert_can_read(&self.info, self.actual()).map(|_| ()));
        self
    }

    /// The expected file is decoded with the configured default charset.
    #[track_caller]
    pub fn has_same_content_as(&self, expected: impl AsRef<Path>) -> &Self {
        let expected_charset = self.files.config().default_charset;
        self.has_same_content_as_with(expected, expected_charset)
    }

    #[track_caller]
    pub fn has_same_content_as_with(&self, expected: impl AsRef<Path>, expected_charset: Charset) -> &Self {
        verify(self.files.assert_same_content_as(
            &self.info,
            self.actual(),
            self.charset,
            expected.as_ref(),
            expected_charset,
        ));
        self
    }

    #[track_caller]
    pub fn has_content(&self, expected: &str) -> &Self {
        verify(
            self.files
                .assert_has_content(&self.info, self.actual(), expected, self.charset),
        );
        self
    }

    #[track_caller]
    pub fn has_binary_content(&self, expected: &[u8]) -> &Self {
        verify(
            self.files
                .assert_has_binary_content(&self.info, self.actual(), expected),
        );
        self
    }

    /// Check the digest under a named algorithm against a hex value.
    #[track_caller]
    pub fn has_digest(&self, algorithm: &str, expected: &str) -> &Self {
        verify(
            self.files
                .assert_has_digest_by_name_hex(&self.info, self.actual(), algorithm, expected),
        );
        self
    }

    #[track_caller]
    pub fn has_digest_bytes(&self, algorithm: &str, expected: &[u8]) -> &Self {
        verify(
            self.files
                .assert_has_digest_by_name(&self.info, self.actual(), algorithm, expected),
        );
        self
    }

    #[track_caller]
    pub fn has_digest_with(&self, digest: &mut MessageDigest, expected: &str) -> &Self {
        verify(
            self.files
                .assert_has_digest_hex(&self.info, self.actual(), digest, expected),
        );
        self
    }
}

// ---- Streams ----

/// Start an assertion on a reader. Each check consumes the reader.
pub fn assert_that_reader<R: Read>(reader: R) -> ReaderAssert<R> {
    assert_that_optional_reader(Some(reader))
}

pub fn assert_that_optional_reader<R: Read>(reader: Option<R>) -> ReaderAssert<R> {
    ReaderAssert {
        actual: reader,
        info: AssertionInfo::new(),
        streams: Streams::new(),
    }
}

/// A single check on a reader; the check consumes it.
pub struct ReaderAssert<R> {
    actual: Option<R>,
    info: AssertionInfo,
    streams: Streams,
}

impl<R: Read> ReaderAssert<R> {
    pub fn described_as(mut self, description: impl Into<String>) -> Self {
        self.info = self.info.described_as(description);
        self
    }

    pub fn with_config(mut self, config: AssertConfig) -> Self {
        self.streams = Streams::with_config(config);
        self
    }

    #[track_caller]
    pub fn has_same_content_as<E: Read>(self, expected: E) {
        self.check(|streams, info, actual| streams.assert_same_content_as(info, actual, expected))
    }

    #[track_caller]
    pub fn has_content(self, expected: &str) {
        self.check(|streams, info, actual| streams.assert_has_content(info, actual, expected))
    }

    #[track_caller]
    pub fn has_binary_content(self, expected: &[u8]) {
        self.check(|streams, info, actual| streams.assert_has_binary_content(info, actual, expected))
    }

    #[track_caller]
    pub fn is_empty(self) {
        self.check(|streams, info, actual| streams.assert_is_empty(info, actual))
    }

    #[track_caller]
    pub fn is_not_empty(self) {
        self.check(|streams, info, actual| streams.assert_is_not_empty(info, actual))
    }

    #[track_caller]
    pub fn has_digest(self, algorithm: &str, expected: &str) {
        self.check(|streams, info, actual| {
            streams.assert_has_digest_by_name_hex(info, actual, algorithm, expected)
        })
    }

    #[track_caller]
    pub fn has_digest_with(self, digest: &mut MessageDigest, expected: &str) {
        self.check(|streams, info, actual| streams.assert_has_digest_hex(info, actual, digest, expected))
    }

    #[track_caller]
    fn check<F>(self, f: F)
    where
        F: FnOnce(&Streams, &AssertionInfo, Option<R>) -> AssertResult<()>,
    {
        verify(f(&self.streams, &self.info, self.actual));
    }
}

// ---- Values ----

/// Start an assertion on a value, compared by its natural order.
pub fn assert_that<'a, T>(actual: T) -> ValueAssert<'a, T>
where
    T: fmt::Debug + PartialOrd + 'a,
{
    ValueAssert {
        actual,
        info: AssertionInfo::new(),
        strategy: Box::new(StandardComparisonStrategy),
    }
}

/// Chainable comparisons under a pluggable [`ComparisonStrategy`].
pub struct ValueAssert<'a, T> {
    actual: T,
    info: AssertionInfo,
    strategy: Box<dyn ComparisonStrategy<T> + 'a>,
}

impl<'a, T: fmt::Debug + 'a> ValueAssert<'a, T> {
    pub fn described_as(mut self, description: impl Into<String>) -> Self {
        self.info = self.info.described_as(description);
        self
    }

    pub fn using_comparison(mut self, strategy: impl ComparisonStrategy<T> + 'a) -> Self {
        self.strategy = Box::new(strategy);
        self
    }

    pub fn using_comparator<F>(self, name: impl Into<String>, comparator: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + 'a,
    {
        self.using_comparison(ComparatorStrategy::new(name, comparator))
    }

    pub fn using_default_comparison(self) -> Self
    where
        T: PartialOrd,
    {
        self.using_comparison(StandardComparisonStrategy)
    }

    fn fail(&self, failure: Failure) -> AssertResult<()> {
        Err(AssertError::failed(&self.info, failure))
    }

    fn render(value: &T) -> String {
        format!("{value:?}")
    }

    pub fn try_is_equal_to(&self, expected: &T) -> AssertResult<()> {
        if self.strategy.are_equal(&self.actual, expected) {
            return Ok(());
        }
        self.fail(Failure::ShouldBeEqual {
            actual: Self::render(&self.actual),
            expected: Self::render(expected),
            comparison: self.strategy.description(),
        })
    }

    pub fn try_is_not_equal_to(&self, other: &T) -> AssertResult<()> {
        if !self.strategy.are_equal(&self.actual, other) {
            return Ok(());
        }
        self.fail(Failure::ShouldNotBeEqual {
            actual: Self::render(&self.actual),
            other: Self::render(other),
            comparison: self.strategy.description(),
        })
    }

    pub fn try_is_before(&self, other: &T) -> AssertResult<()> {
        if self.strategy.is_less_than(&self.actual, other) {
            return Ok(());
        }
        self.fail(Failure::ShouldBeBefore {
            actual: Self::render(&self.actual),
            other: Self::render(other),
            comparison: self.strategy.description(),
        })
    }

    pub fn try_is_after(&self, other: &T) -> AssertResult<()> {
        if self.strategy.is_greater_than(&self.actual, other) {
            return Ok(());
        }
        self.fail(Failure::ShouldBeAfter {
            actual: Self::render(&self.actual),
            other: Self::render(other),
            comparison: self.strategy.description(),
        })
    }

    pub fn try_is_in(&self, values: &[T]) -> AssertResult<()> {
        if self.strategy.contains(values, &self.actual) {
            return Ok(());
        }
        self.fail(Failure::ShouldBeIn {
            actual: Self::render(&self.actual),
            values: format!("{values:?}"),
            comparison: self.strategy.description(),
        })
    }

    #[track_caller]
    pub fn is_equal_to(&self, expected: T) -> &Self {
        verify(self.try_is_equal_to(&expected));
        self
    }

    #[track_caller]
    pub fn is_not_equal_to(&self, other: T) -> &Self {
        verify(self.try_is_not_equal_to(&other));
        self
    }

    #[track_caller]
    pub fn is_before(&self, other: T) -> &Self {
        verify(self.try_is_before(&other));
        self
    }

    #[track_caller]
    pub fn is_after(&self, other: T) -> &Self {
        verify(self.try_is_after(&other));
        self
    }

    #[track_caller]
    pub fn is_in(&self, values: &[T]) -> &Self {
        verify(self.try_is_in(values));
        self
    }
}
