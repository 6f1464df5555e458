//! Foundation types for Avow.
//!
//! This crate provides the inputs every comparison in Avow works on: file-like
//! subjects, text charsets and line splitting, and the pluggable comparison
//! strategies used by value assertions. Every other Avow crate depends on
//! `avow-types`.
//!
//! # Key Types
//!
//! - [`FileSubject`]: Metadata queries plus a byte stream; implemented for real paths
//! - [`MemoryFile`]: In-memory subject for tests, with open/close accounting
//! - [`Charset`]: Text encodings used to decode file content into lines
//! - [`ComparisonStrategy`]: Equality/ordering policy substituted for natural comparison
//! - [`DateTruncation`]: Strategy comparing dates at year, month, or day precision

pub mod charset;
pub mod compare;
pub mod error;
pub mod subject;

pub use charset::{split_lines, Charset};
pub use compare::{
    ComparatorStrategy, ComparisonStrategy, DateTruncation, StandardComparisonStrategy,
    Truncatable,
};
pub use error::{TypeError, TypeResult};
pub use subject::{FileSubject, MemoryFile};
