//! Digest comparison for Avow.
//!
//! Resolves message digest algorithms by name, streams content through them,
//! and compares the result against an expected digest as upper-case hex.
//!
//! All digest operations wrap established libraries (RustCrypto hashes and
//! BLAKE3) and add no cryptography of their own.

pub mod diff;
pub mod error;
pub mod hex_codec;
pub mod message_digest;

pub use diff::{digest_diff, DigestDiff, DEFAULT_BUFFER_SIZE};
pub use error::{DigestError, DigestResult};
pub use hex_codec::{from_hex, to_hex};
pub use message_digest::{DigestAlgorithm, DigestEngine, MessageDigest};
