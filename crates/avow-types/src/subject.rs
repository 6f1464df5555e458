//! File-like subjects: metadata queries plus a byte stream.
//!
//! Assertions never touch `std::fs` directly; they go through [`FileSubject`]
//! so that tests can substitute a [`MemoryFile`] for conditions that are hard
//! to produce on a real filesystem (unreadable files, failing reads).

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Something with file metadata and readable content.
///
/// Implementations must hand out a fresh stream from every call to
/// [`open`](FileSubject::open); dropping the stream releases the underlying
/// handle.
pub trait FileSubject {
    /// Human-readable name used in failure messages.
    fn display_name(&self) -> String;

    /// Whether the subject exists at all (file or directory).
    fn exists(&self) -> bool;

    /// Whether the subject is an existing regular file.
    fn is_file(&self) -> bool;

    /// Whether the subject can be opened for reading.
    fn is_readable(&self) -> bool;

    /// Open a new stream over the subject's bytes.
    fn open(&self) -> io::Result<Box<dyn Read + '_>>;

    /// Read the subject's whole content.
    fn read_all(&self) -> io::Result<Vec<u8>> {
        let mut stream = self.open()?;
        let mut content = Vec::new();
        stream.read_to_end(&mut content)?;
        Ok(content)
    }
}

impl<T: FileSubject + ?Sized> FileSubject for &T {
    fn display_name(&self) -> String {
        (**self).display_name()
    }

    fn exists(&self) -> bool {
        (**self).exists()
    }

    fn is_file(&self) -> bool {
        (**self).is_file()
    }

    fn is_readable(&self) -> bool {
        (**self).is_readable()
    }

    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        (**self).open()
    }
}

impl FileSubject for Path {
    fn display_name(&self) -> String {
        self.display().to_string()
    }

    fn exists(&self) -> bool {
        Path::exists(self)
    }

    fn is_file(&self) -> bool {
        Path::is_file(self)
    }

    fn is_readable(&self) -> bool {
        File::open(self).is_ok()
    }

    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(File::open(self)?))
    }
}

impl FileSubject for PathBuf {
    fn display_name(&self) -> String {
        self.as_path().display_name()
    }

    fn exists(&self) -> bool {
        FileSubject::exists(self.as_path())
    }

    fn is_file(&self) -> bool {
        FileSubject::is_file(self.as_path())
    }

    fn is_readable(&self) -> bool {
        self.as_path().is_readable()
    }

    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        self.as_path().open()
    }
}

/// What a [`MemoryFile`] pretends to be.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MemoryKind {
    Missing,
    Regular,
    Directory,
}

/// In-memory [`FileSubject`] for tests.
///
/// Counts how many streams were opened and how many were dropped, so tests can
/// check that every exit path releases its handle.
#[derive(Debug)]
pub struct MemoryFile {
    name: String,
    content: Vec<u8>,
    kind: MemoryKind,
    readable: bool,
    fail_after: Option<usize>,
    opened: AtomicUsize,
    closed: AtomicUsize,
    bytes_served: AtomicUsize,
}

impl MemoryFile {
    /// An existing, readable regular file with the given content.
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            kind: MemoryKind::Regular,
            readable: true,
            fail_after: None,
            opened: AtomicUsize::new(0),
            closed: AtomicUsize::new(0),
            bytes_served: AtomicUsize::new(0),
        }
    }

    /// A subject that does not exist.
    pub fn missing(name: impl Into<String>) -> Self {
        Self {
            kind: MemoryKind::Missing,
            readable: false,
            ..Self::new(name, Vec::new())
        }
    }

    /// An existing directory.
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            kind: MemoryKind::Directory,
            ..Self::new(name, Vec::new())
        }
    }

    /// Mark the file as unreadable; [`open`](FileSubject::open) then fails
    /// with `PermissionDenied`.
    pub fn unreadable(mut self) -> Self {
        self.readable = false;
        self
    }

    /// Make every stream fail with an I/O error once `bytes` bytes were served.
    pub fn failing_after(mut self, bytes: usize) -> Self {
        self.fail_after = Some(bytes);
        self
    }

    /// Number of streams opened so far.
    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Number of streams dropped so far.
    pub fn close_count(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Streams opened but not yet dropped.
    pub fn open_streams(&self) -> usize {
        self.open_count() - self.close_count()
    }

    /// Total bytes handed out by all streams.
    pub fn bytes_served(&self) -> usize {
        self.bytes_served.load(Ordering::SeqCst)
    }
}

impl FileSubject for MemoryFile {
    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn exists(&self) -> bool {
        self.kind != MemoryKind::Missing
    }

    fn is_file(&self) -> bool {
        self.kind == MemoryKind::Regular
    }

    fn is_readable(&self) -> bool {
        self.exists() && self.readable
    }

    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        match self.kind {
            MemoryKind::Missing => {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} does not exist", self.name),
                ))
            }
            MemoryKind::Directory => {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!("{} is a directory", self.name),
                ))
            }
            MemoryKind::Regular => {}
        }
        if !self.readable {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} is not readable", self.name),
            ));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryStream {
            file: self,
            position: 0,
        }))
    }
}

struct MemoryStream<'a> {
    file: &'a MemoryFile,
    position: usize,
}

impl Read for MemoryStream<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let end = match self.file.fail_after {
            Some(limit) if self.position >= limit => {
                return Err(io::Error::new(io::ErrorKind::Other, "injected read failure"));
            }
            Some(limit) => limit.min(self.file.content.len()),
            None => self.file.content.len(),
        };
        let remaining = &self.file.content[self.position.min(end)..end];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.position += n;
        self.file.bytes_served.fetch_add(n, Ordering::SeqCst);
        Ok(n)
    }
}

impl Drop for MemoryStream<'_> {
    fn drop(&mut self) {
        self.file.closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn real_file_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content.txt");
        File::create(&path).unwrap().write_all(b"Content").unwrap();

        assert!(FileSubject::exists(path.as_path()));
        assert!(FileSubject::is_file(path.as_path()));
        assert!(path.is_readable());
        assert_eq!(path.read_all().unwrap(), b"Content");
        assert_eq!(path.display_name(), path.display().to_string());
    }

    #[test]
    fn real_directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FileSubject::exists(dir.path()));
        assert!(!FileSubject::is_file(dir.path()));
    }

    #[test]
    fn real_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope");
        assert!(!FileSubject::exists(path.as_path()));
        assert!(!path.is_readable());
        assert_eq!(path.open().err().unwrap().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn memory_file_reads_content_and_tracks_streams() {
        let file = MemoryFile::new("mem.txt", "hello");
        {
            let content = file.read_all().unwrap();
            assert_eq!(content, b"hello");
            assert_eq!(file.open_count(), 1);
        }
        assert_eq!(file.close_count(), 1);
        assert_eq!(file.open_streams(), 0);
        assert_eq!(file.bytes_served(), 5);
    }

    #[test]
    fn memory_file_kinds() {
        let missing = MemoryFile::missing("gone");
        assert!(!missing.exists());
        assert!(!missing.is_file());
        assert!(missing.open().is_err());

        let dir = MemoryFile::directory("dir");
        assert!(dir.exists());
        assert!(!dir.is_file());
        assert!(dir.open().is_err());
    }

    #[test]
    fn unreadable_memory_file_refuses_to_open() {
        let file = MemoryFile::new("secret", "x").unreadable();
        assert!(file.exists());
        assert!(file.is_file());
        assert!(!file.is_readable());
        let err = file.open().err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert_eq!(file.open_count(), 0);
    }

    #[test]
    fn failing_stream_serves_prefix_then_errors() {
        let file = MemoryFile::new("flaky", "abcdef").failing_after(3);
        let mut stream = file.open().unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(stream.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b"abc");
        assert!(stream.read(&mut buf).is_err());
        drop(stream);
        assert_eq!(file.open_streams(), 0);
    }
}
