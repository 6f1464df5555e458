//! File, stream and value assertions.
//!
//! The [`Files`] and [`Streams`] cores check a subject and return an
//! [`AssertResult`]; the fluent functions in [`fluent`] wrap them and panic
//! with the rendered message, the way test assertions are expected to.
//!
//! ```no_run
//! use avow_assert::assert_that_file;
//!
//! assert_that_file("target/report.txt")
//!     .exists()
//!     .has_digest("MD5", "F15C1CAE7882448B3FB0404682E17E61");
//! ```

pub mod config;
pub mod error;
pub mod failure;
pub mod files;
pub mod fluent;
pub mod streams;

pub use config::AssertConfig;
pub use error::{AssertError, AssertResult};
pub use failure::{AssertionInfo, Failure};
pub use files::Files;
pub use fluent::{
    assert_that, assert_that_file, assert_that_optional_file, assert_that_optional_reader,
    assert_that_reader, assert_that_subject, FileAssert, ReaderAssert, ValueAssert,
};
pub use streams::Streams;

// Re-export the types callers need to drive assertions.
pub use avow_digest::{DigestAlgorithm, DigestEngine, MessageDigest};
pub use avow_types::{
    Charset, ComparatorStrategy, ComparisonStrategy, DateTruncation, FileSubject, MemoryFile,
    StandardComparisonStrategy,
};
