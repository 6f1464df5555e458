//! Assertions on file subjects.
//!
//! Every check that reads content first verifies its preconditions in a
//! fixed order: not null, exists, is a regular file, is readable. No stream
//! is opened until all of them pass, and every stream that is opened is an
//! owned local dropped on return.

use avow_diff::{binary_diff, line_diff, Delta};
use avow_digest::{digest_diff, from_hex, MessageDigest};
use avow_types::{Charset, FileSubject};
use tracing::debug;

use crate::config::AssertConfig;
use crate::error::{AssertError, AssertResult};
use crate::failure::{AssertionInfo, Failure};

/// Reusable file assertions, parameterised by an [`AssertConfig`].
#[derive(Clone, Debug, Default)]
pub struct Files {
    config: AssertConfig,
}

pub(crate) fn file_label<S: FileSubject + ?Sized>(subject: &S) -> String {
    format!("File <{}>", subject.display_name())
}

/// Cap `deltas` at the configured maximum, returning how many were dropped.
pub(crate) fn report_deltas(config: &AssertConfig, mut deltas: Vec<Delta>) -> (Vec<Delta>, usize) {
    match config.max_reported_deltas {
        Some(max) if deltas.len() > max => {
            let omitted = deltas.len() - max;
            deltas.truncate(max);
            (deltas, omitted)
        }
        _ => (deltas, 0),
    }
}

impl Files {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AssertConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AssertConfig {
        &self.config
    }

    // ---- Preconditions ----

    pub fn assert_not_null<'s, S: ?Sized>(
        &self,
        info: &AssertionInfo,
        actual: Option<&'s S>,
    ) -> AssertResult<&'s S> {
        actual.ok_or_else(|| AssertError::failed(info, Failure::ActualIsNull))
    }

    pub fn assert_exists<'s, S: FileSubject + ?Sized>(
        &self,
        info: &AssertionInfo,
        actual: Option<&'s S>,
    ) -> AssertResult<&'s S> {
        let actual = self.assert_not_null(info, actual)?;
        if actual.exists() {
            return Ok(actual);
        }
        Err(AssertError::failed(
            info,
            Failure::ShouldExist {
                actual: actual.display_name(),
            },
        ))
    }

    pub fn assert_is_file<'s, S: FileSubject + ?Sized>(
        &self,
        info: &AssertionInfo,
        actual: Option<&'s S>,
    ) -> AssertResult<&'s S> {
        let actual = self.assert_not_null(info, actual)?;
        if actual.is_file() {
            return Ok(actual);
        }
        Err(AssertError::failed(
            info,
            Failure::ShouldBeFile {
                actual: actual.display_name(),
            },
        ))
    }

    pub fn assert_can_read<'s, S: FileSubject + ?Sized>(
        &self,
        info: &AssertionInfo,
        actual: Option<&'s S>,
    ) -> AssertResult<&'s S> {
        let actual = self.assert_not_null(info, actual)?;
        if actual.is_readable() {
            return Ok(actual);
        }
        Err(AssertError::failed(
            info,
            Failure::ShouldBeReadable {
                actual: actual.display_name(),
            },
        ))
    }

    // ---- Content ----

    /// Assert that two files hold the same lines, each decoded with its own
    /// charset.
    ///
    /// If either side is not valid text in its charset and binary fallback is
    /// enabled, the raw bytes are compared instead. When the bytes turn out to
    /// be identical the decoding error is returned.
    pub fn assert_same_content_as<A, E>(
        &self,
        info: &AssertionInfo,
        actual: Option<&A>,
        actual_charset: Charset,
        expected: &E,
        expected_charset: Charset,
    ) -> AssertResult<()>
    where
        A: FileSubject + ?Sized,
        E: FileSubject + ?Sized,
    {
        if !expected.is_file() {
            return Err(AssertError::InvalidArgument(format!(
                "Expected file:<'{}'> should be an existing file",
                expected.display_name()
            )));
        }
        let actual = self.assert_is_file(info, actual)?;
        let context = || {
            format!(
                "Unable to compare contents of files:<{}> and:<{}>",
                actual.display_name(),
                expected.display_name()
            )
        };

        match line_diff::diff_subjects(actual, actual_charset, expected, expected_charset) {
            Ok(patch) if patch.is_empty() => Ok(()),
            Ok(patch) => {
                let (deltas, omitted) = report_deltas(&self.config, patch.into_deltas());
                Err(AssertError::failed(
                    info,
                    Failure::ShouldHaveSameContent {
                        subject: file_label(actual),
                        expected: file_label(expected),
                        deltas,
                        omitted,
                    },
                ))
            }
            Err(err) if err.is_malformed_input() && self.config.binary_fallback_on_malformed => {
                debug!(
                    actual = %actual.display_name(),
                    expected = %expected.display_name(),
                    error = %err,
                    "text decoding failed, comparing bytes"
                );
                let result = binary_diff::diff_subjects(actual, expected)
                    .map_err(|e| AssertError::from_diff(context(), e))?;
                match Failure::binary_content(file_label(actual), &result) {
                    Some(failure) => Err(AssertError::failed(info, failure)),
                    None => Err(AssertError::from_diff(context(), err)),
                }
            }
            Err(err) => Err(AssertError::from_diff(context(), err)),
        }
    }

    /// Assert that a file, decoded with `charset`, holds exactly `expected`.
    pub fn assert_has_content<S: FileSubject + ?Sized>(
        &self,
        info: &AssertionInfo,
        actual: Option<&S>,
        expected: &str,
        charset: Charset,
    ) -> AssertResult<()> {
        let actual = self.assert_is_file(info, actual)?;
        let patch = line_diff::diff_subject_and_text(actual, expected, charset).map_err(|e| {
            AssertError::from_diff(
                format!("Unable to verify text contents of file:<{}>", actual.display_name()),
                e,
            )
        })?;
        if patch.is_empty() {
            return Ok(());
        }
        let (deltas, omitted) = report_deltas(&self.config, patch.into_deltas());
        Err(AssertError::failed(
            info,
            Failure::ShouldHaveContent {
                subject: file_label(actual),
                charset,
                deltas,
                omitted,
            },
        ))
    }

    pub fn assert_has_binary_content<S: FileSubject + ?Sized>(
        &self,
        info: &AssertionInfo,
        actual: Option<&S>,
        expected: &[u8],
    ) -> AssertResult<()> {
        let actual = self.assert_is_file(info, actual)?;
        let result = binary_diff::diff_subject(actual, expected).map_err(|e| {
            AssertError::from_diff(
                format!("Unable to verify binary contents of file:<{}>", actual.display_name()),
                e,
            )
        })?;
        match Failure::binary_content(file_label(actual), &result) {
            Some(failure) => Err(AssertError::failed(info, failure)),
            None => Ok(()),
        }
    }

    // ---- Digests ----

    /// Assert that the file's content hashes to `expected` under `digest`.
    pub fn assert_has_digest<S: FileSubject + ?Sized>(
        &self,
        info: &AssertionInfo,
        actual: Option<&S>,
        digest: &mut MessageDigest,
        expected: &[u8],
    ) -> AssertResult<()> {
        let actual = self.assert_exists(info, actual)?;
        let actual = self.assert_is_file(info, Some(actual))?;
        let actual = self.assert_can_read(info, Some(actual))?;

        let name = actual.display_name();
        let context = || format!("Unable to calculate digest of path:<{name}>");
        let stream = actual.open().map_err(|e| AssertError::io(context(), e))?;
        let diff = digest_diff(stream, digest, expected, self.config.read_buffer_size)
            .map_err(|e| AssertError::io(context(), e))?;

        if diff.digests_differ() {
            return Err(AssertError::failed(
                info,
                Failure::ShouldHaveDigest {
                    subject: format!("File <{name}>"),
                    diff,
                },
            ));
        }
        debug!(subject = %name, algorithm = digest.algorithm(), "digest matches");
        Ok(())
    }

    /// Like [`assert_has_digest`](Self::assert_has_digest) with a hex
    /// expected value, parsed before anything is read.
    pub fn assert_has_digest_hex<S: FileSubject + ?Sized>(
        &self,
        info: &AssertionInfo,
        actual: Option<&S>,
        digest: &mut MessageDigest,
        expected: &str,
    ) -> AssertResult<()> {
        let expected = from_hex(expected)?;
        self.assert_has_digest(info, actual, digest, &expected)
    }

    /// Like [`assert_has_digest`](Self::assert_has_digest) with the algorithm
    /// looked up by name. An unknown name is a [`AssertError::Config`] error.
    pub fn assert_has_digest_by_name<S: FileSubject + ?Sized>(
        &self,
        info: &AssertionInfo,
        actual: Option<&S>,
        algorithm: &str,
        expected: &[u8],
    ) -> AssertResult<()> {
        let mut digest = lookup_digest(algorithm)?;
        self.assert_has_digest(info, actual, &mut digest, expected)
    }

    pub fn assert_has_digest_by_name_hex<S: FileSubject + ?Sized>(
        &self,
        info: &AssertionInfo,
        actual: Option<&S>,
        algorithm: &str,
        expected: &str,
    ) -> AssertResult<()> {
        check_algorithm_name(algorithm)?;
        let expected = from_hex(expected)?;
        self.assert_has_digest_by_name(info, actual, algorithm, &expected)
    }
}

pub(crate) fn check_algorithm_name(algorithm: &str) -> AssertResult<()> {
    if algorithm.trim().is_empty() {
        return Err(AssertError::InvalidArgument(
            "The message digest algorithm should not be empty".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn lookup_digest(algorithm: &str) -> AssertResult<MessageDigest> {
    check_algorithm_name(algorithm)?;
    Ok(MessageDigest::get_instance(algorithm)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use avow_diff::ByteAt;
    use avow_types::MemoryFile;
    use std::io;
    use std::path::PathBuf;

    const CONTENT_MD5: &str = "F15C1CAE7882448B3FB0404682E17E61";

    fn info() -> AssertionInfo {
        AssertionInfo::new()
    }

    fn write(dir: &tempfile::TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn failure_of(result: AssertResult<()>) -> Failure {
        match result {
            Err(AssertError::Failed { failure, .. }) => failure,
            other => panic!("expected an assertion failure, got {other:?}"),
        }
    }

    // ---- Preconditions ----

    #[test]
    fn null_actual_fails_first() {
        let files = Files::new();
        let result = files.assert_has_digest_by_name(&info(), None::<&MemoryFile>, "MD5", &[]);
        assert_eq!(failure_of(result), Failure::ActualIsNull);
    }

    #[test]
    fn missing_file_fails_exists() {
        let file = MemoryFile::missing("gone.txt");
        let result = Files::new().assert_has_digest_by_name(&info(), Some(&file), "MD5", &[]);
        assert_eq!(
            failure_of(result),
            Failure::ShouldExist {
                actual: "gone.txt".into()
            }
        );
    }

    #[test]
    fn directory_fails_is_file() {
        let dir = MemoryFile::directory("dir");
        let result = Files::new().assert_has_digest_by_name(&info(), Some(&dir), "MD5", &[]);
        assert!(matches!(failure_of(result), Failure::ShouldBeFile { .. }));
    }

    #[test]
    fn unreadable_file_fails_before_opening() {
        let file = MemoryFile::new("secret.txt", "Content").unreadable();
        let expected = from_hex(CONTENT_MD5).unwrap();
        let result = Files::new().assert_has_digest_by_name(&info(), Some(&file), "MD5", &expected);
        let failure = failure_of(result);
        assert_eq!(
            failure.to_string(),
            "\nExpecting actual:\n  <secret.txt>\nto be readable."
        );
        assert_eq!(file.open_count(), 0);
        assert_eq!(file.bytes_served(), 0);
    }

    #[test]
    fn precondition_messages_differ() {
        let messages = [
            Failure::ShouldExist { actual: "a".into() }.to_string(),
            Failure::ShouldBeFile { actual: "a".into() }.to_string(),
            Failure::ShouldBeReadable { actual: "a".into() }.to_string(),
        ];
        assert_ne!(messages[0], messages[1]);
        assert_ne!(messages[1], messages[2]);
        assert_ne!(messages[0], messages[2]);
    }

    #[test]
    fn real_file_preconditions() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "a.txt", b"Content");
        let files = Files::new();
        assert!(files.assert_exists(&info(), Some(&path)).is_ok());
        assert!(files.assert_is_file(&info(), Some(&path)).is_ok());
        assert!(files.assert_can_read(&info(), Some(&path)).is_ok());

        let result = files.assert_is_file(&info(), Some(dir.path())).map(|_| ());
        assert!(matches!(failure_of(result), Failure::ShouldBeFile { .. }));
    }

    // ---- Digests ----

    #[test]
    fn md5_of_content_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "a.txt", b"Content");
        Files::new()
            .assert_has_digest_by_name_hex(&info(), Some(&path), "MD5", CONTENT_MD5)
            .unwrap();
    }

    #[test]
    fn lower_case_hex_is_accepted() {
        let file = MemoryFile::new("a.txt", "Content");
        Files::new()
            .assert_has_digest_by_name_hex(
                &info(),
                Some(&file),
                "md5",
                &CONTENT_MD5.to_ascii_lowercase(),
            )
            .unwrap();
    }

    #[test]
    fn digest_mismatch_reports_both_values() {
        let file = MemoryFile::new("a.txt", "Content");
        let mut sha1 = MessageDigest::get_instance("SHA-1").unwrap();
        let result = Files::new().assert_has_digest(&info(), Some(&file), &mut sha1, &[0u8; 20]);
        let failure = failure_of(result);
        assert_eq!(
            failure.to_string(),
            "\nExpecting File <a.txt> SHA-1 digest to be:\n  \
             <0000000000000000000000000000000000000000>\nbut was:\n  \
             <4F9BE057F0EA5D2BA72FD2C810E8D7B9AA98B469>"
        );
        assert_eq!(file.open_count(), 1);
        assert_eq!(file.open_streams(), 0);
    }

    #[test]
    fn stream_closed_after_success() {
        let file = MemoryFile::new("a.txt", "Content");
        Files::new()
            .assert_has_digest_by_name_hex(&info(), Some(&file), "MD5", CONTENT_MD5)
            .unwrap();
        assert_eq!(file.open_count(), 1);
        assert_eq!(file.close_count(), 1);
    }

    #[test]
    fn read_failure_is_io_and_closes_stream() {
        let file = MemoryFile::new("flaky.txt", "Content").failing_after(2);
        let config = AssertConfig {
            read_buffer_size: 1,
            ..AssertConfig::default()
        };
        let err = Files::with_config(config)
            .assert_has_digest_by_name_hex(&info(), Some(&file), "MD5", CONTENT_MD5)
            .unwrap_err();
        match err {
            AssertError::Io { context, source } => {
                assert_eq!(context, "Unable to calculate digest of path:<flaky.txt>");
                assert_eq!(source.kind(), io::ErrorKind::Other);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(file.open_streams(), 0);
    }

    #[test]
    fn unknown_algorithm_is_config_and_never_opens() {
        let file = MemoryFile::new("a.txt", "Content");
        let err = Files::new()
            .assert_has_digest_by_name(&info(), Some(&file), "FOO", &[])
            .unwrap_err();
        assert!(matches!(err, AssertError::Config(_)));
        assert_eq!(err.to_string(), "Unable to find digest implementation for: <FOO>");
        assert_eq!(file.open_count(), 0);
    }

    #[test]
    fn empty_algorithm_is_invalid_argument() {
        let file = MemoryFile::new("a.txt", "Content");
        let err = Files::new()
            .assert_has_digest_by_name(&info(), Some(&file), " ", &[])
            .unwrap_err();
        assert!(matches!(err, AssertError::InvalidArgument(_)));
    }

    #[test]
    fn bad_hex_is_invalid_argument_and_never_opens() {
        let file = MemoryFile::new("a.txt", "Content");
        let err = Files::new()
            .assert_has_digest_by_name_hex(&info(), Some(&file), "MD5", "not hex")
            .unwrap_err();
        assert!(matches!(err, AssertError::InvalidArgument(_)));
        assert_eq!(file.open_count(), 0);
    }

    #[test]
    fn description_prefixes_digest_failure() {
        let file = MemoryFile::new("a.txt", "Content");
        let info = AssertionInfo::new().described_as("checksum");
        let err = Files::new()
            .assert_has_digest_by_name(&info, Some(&file), "MD5", &[0u8; 16])
            .unwrap_err();
        assert!(err.to_string().starts_with("[checksum] \nExpecting File <a.txt> MD5"));
    }

    // ---- Content ----

    #[test]
    fn same_content_passes() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(&dir, "a.txt", b"line1\nline2\n");
        let b = write(&dir, "b.txt", b"line1\nline2");
        Files::new()
            .assert_same_content_as(&info(), Some(&a), Charset::Utf8, &b, Charset::Utf8)
            .unwrap();
    }

    #[test]
    fn same_content_across_charsets() {
        let dir = tempfile::tempdir().unwrap();
        let latin1 = write(&dir, "latin1.txt", &[0x63, 0x61, 0x66, 0xE9]);
        let utf8 = write(&dir, "utf8.txt", "café".as_bytes());
        Files::new()
            .assert_same_content_as(&info(), Some(&latin1), Charset::Latin1, &utf8, Charset::Utf8)
            .unwrap();
    }

    #[test]
    fn different_content_lists_deltas() {
        let actual = MemoryFile::new("actual.txt", "line1\nlineX\nline3\n");
        let expected = MemoryFile::new("expected.txt", "line1\nline2\nline3\n");
        let result = Files::new().assert_same_content_as(
            &info(),
            Some(&actual),
            Charset::Utf8,
            &expected,
            Charset::Utf8,
        );
        match failure_of(result) {
            Failure::ShouldHaveSameContent {
                subject,
                expected,
                deltas,
                omitted,
            } => {
                assert_eq!(subject, "File <actual.txt>");
                assert_eq!(expected, "File <expected.txt>");
                assert_eq!(deltas.len(), 1);
                assert_eq!(deltas[0].line_number(), 2);
                assert_eq!(omitted, 0);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(actual.open_streams(), 0);
        assert_eq!(expected.open_streams(), 0);
    }

    #[test]
    fn missing_expected_file_is_invalid_argument() {
        let actual = MemoryFile::new("actual.txt", "x");
        let expected = MemoryFile::missing("nowhere.txt");
        let err = Files::new()
            .assert_same_content_as(&info(), Some(&actual), Charset::Utf8, &expected, Charset::Utf8)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected file:<'nowhere.txt'> should be an existing file"
        );
        assert_eq!(actual.open_count(), 0);
    }

    #[test]
    fn malformed_input_falls_back_to_binary_diff() {
        let actual = MemoryFile::new("actual.bin", &b"\xFFabc"[..]);
        let expected = MemoryFile::new("expected.bin", &b"\xFEabc"[..]);
        let result = Files::new().assert_same_content_as(
            &info(),
            Some(&actual),
            Charset::Utf8,
            &expected,
            Charset::Utf8,
        );
        assert_eq!(
            failure_of(result),
            Failure::ShouldHaveBinaryContent {
                subject: "File <actual.bin>".into(),
                offset: 0,
                actual: ByteAt::Byte(0xFF),
                expected: ByteAt::Byte(0xFE),
            }
        );
        assert_eq!(actual.open_streams(), 0);
        assert_eq!(expected.open_streams(), 0);
    }

    #[test]
    fn malformed_but_identical_bytes_surface_decoding_error() {
        let actual = MemoryFile::new("actual.bin", &b"\xFFabc"[..]);
        let expected = MemoryFile::new("expected.bin", &b"\xFFabc"[..]);
        let err = Files::new()
            .assert_same_content_as(&info(), Some(&actual), Charset::Utf8, &expected, Charset::Utf8)
            .unwrap_err();
        match err {
            AssertError::Io { context, source } => {
                assert_eq!(
                    context,
                    "Unable to compare contents of files:<actual.bin> and:<expected.bin>"
                );
                assert_eq!(source.kind(), io::ErrorKind::InvalidData);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn malformed_input_without_fallback_is_io() {
        let actual = MemoryFile::new("actual.bin", &b"\xFFabc"[..]);
        let expected = MemoryFile::new("expected.bin", &b"\xFEabc"[..]);
        let config = AssertConfig {
            binary_fallback_on_malformed: false,
            ..AssertConfig::default()
        };
        let err = Files::with_config(config)
            .assert_same_content_as(&info(), Some(&actual), Charset::Utf8, &expected, Charset::Utf8)
            .unwrap_err();
        assert!(matches!(err, AssertError::Io { .. }));
    }

    #[test]
    fn has_content_passes_and_fails() {
        let file = MemoryFile::new("a.txt", "line1\nline2\n");
        let files = Files::new();
        files
            .assert_has_content(&info(), Some(&file), "line1\nline2", Charset::Utf8)
            .unwrap();

        let result = files.assert_has_content(&info(), Some(&file), "line1\nother\n", Charset::Utf8);
        let message = failure_of(result).to_string();
        assert!(message.contains("read with charset <UTF-8>"));
        assert!(message.contains("Changed content at line 2:"));
        assert_eq!(file.open_streams(), 0);
    }

    #[test]
    fn reported_deltas_are_capped() {
        let file = MemoryFile::new("a.txt", "a\nX\nc\nY\ne\nZ\n");
        let config = AssertConfig {
            max_reported_deltas: Some(1),
            ..AssertConfig::default()
        };
        let result = Files::with_config(config).assert_has_content(
            &info(),
            Some(&file),
            "a\nb\nc\nd\ne\nf\n",
            Charset::Utf8,
        );
        match failure_of(result) {
            Failure::ShouldHaveContent { deltas, omitted, .. } => {
                assert_eq!(deltas.len(), 1);
                assert_eq!(omitted, 2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn has_content_read_error_is_io() {
        let file = MemoryFile::new("flaky.txt", "Content").failing_after(1);
        let err = Files::new()
            .assert_has_content(&info(), Some(&file), "Content", Charset::Utf8)
            .unwrap_err();
        assert_eq!(err.to_string(), "Unable to verify text contents of file:<flaky.txt>");
        assert_eq!(file.open_streams(), 0);
    }

    #[test]
    fn binary_content() {
        let file = MemoryFile::new("a.bin", "test");
        let files = Files::new();
        files.assert_has_binary_content(&info(), Some(&file), b"test").unwrap();

        let result = files.assert_has_binary_content(&info(), Some(&file), b"fest");
        assert_eq!(
            failure_of(result),
            Failure::ShouldHaveBinaryContent {
                subject: "File <a.bin>".into(),
                offset: 0,
                actual: ByteAt::Byte(b't'),
                expected: ByteAt::Byte(b'f'),
            }
        );

        let result = files.assert_has_binary_content(&info(), Some(&file), b"tests");
        assert!(matches!(
            failure_of(result),
            Failure::ShouldHaveBinaryContent {
                offset: 4,
                actual: ByteAt::Eof,
                ..
            }
        ));
    }
}
