//! Diff engine for Avow.
//!
//! Computes the differences that content assertions report: line-level deltas
//! between two texts, and the first divergent byte between two byte sources.
//! Both differs are stateless; each call reads its inputs once and closes
//! every stream it opens before returning.
//!
//! # Key Types
//!
//! - [`Patch`] / [`Delta`] / [`Chunk`] -- Line-level diff (changed/missing/extra runs)
//! - [`BinaryDiffResult`] / [`ByteAt`] -- First byte-level divergence, or none

pub mod binary_diff;
pub mod error;
pub mod line_diff;

pub use binary_diff::{diff_bytes, diff_streams, BinaryDiffResult, ByteAt};
pub use error::{DiffError, DiffResult};
pub use line_diff::{
    diff_lines, diff_readers, diff_subject_and_text, diff_subjects, diff_texts, Chunk, Delta,
    DeltaKind, Patch,
};
