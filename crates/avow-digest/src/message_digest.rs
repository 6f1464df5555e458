use std::fmt;

use crate::error::{DigestError, DigestResult};

/// Incremental hash state behind a [`MessageDigest`].
///
/// Implement this to plug in an algorithm that is not built in.
pub trait DigestEngine: Send {
    /// Feed more input.
    fn update(&mut self, data: &[u8]);

    /// Produce the digest of everything fed so far and reset the state.
    fn finalize_reset(&mut self) -> Vec<u8>;

    /// Discard all input fed so far.
    fn reset(&mut self);

    /// Digest length in bytes.
    fn output_size(&self) -> usize;
}

/// Adapter for any RustCrypto hash.
struct RustCrypto<D>(D);

impl<D: digest::DynDigest + Send> DigestEngine for RustCrypto<D> {
    fn update(&mut self, data: &[u8]) {
        digest::DynDigest::update(&mut self.0, data);
    }

    fn finalize_reset(&mut self) -> Vec<u8> {
        digest::DynDigest::finalize_reset(&mut self.0).into_vec()
    }

    fn reset(&mut self) {
        digest::DynDigest::reset(&mut self.0);
    }

    fn output_size(&self) -> usize {
        digest::DynDigest::output_size(&self.0)
    }
}

struct Blake3(blake3::Hasher);

impl DigestEngine for Blake3 {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize_reset(&mut self) -> Vec<u8> {
        let out = self.0.finalize().as_bytes().to_vec();
        self.0.reset();
        out
    }

    fn reset(&mut self) {
        self.0.reset();
    }

    fn output_size(&self) -> usize {
        blake3::OUT_LEN
    }
}

/// Built-in digest algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Blake3,
}

impl DigestAlgorithm {
    pub const ALL: [Self; 7] = [
        Self::Md5,
        Self::Sha1,
        Self::Sha224,
        Self::Sha256,
        Self::Sha384,
        Self::Sha512,
        Self::Blake3,
    ];

    /// Resolve an algorithm by name.
    ///
    /// Case is ignored, and `-`/`_` separators are optional, so `sha256`,
    /// `SHA-256` and `Sha_256` all resolve to [`DigestAlgorithm::Sha256`].
    pub fn from_name(name: &str) -> DigestResult<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .map(|c| c.to_ascii_uppercase())
            .collect();
        match normalized.as_str() {
            "MD5" => Ok(Self::Md5),
            "SHA1" | "SHA" => Ok(Self::Sha1),
            "SHA224" => Ok(Self::Sha224),
            "SHA256" => Ok(Self::Sha256),
            "SHA384" => Ok(Self::Sha384),
            "SHA512" => Ok(Self::Sha512),
            "BLAKE3" => Ok(Self::Blake3),
            _ => Err(DigestError::UnknownAlgorithm(name.to_string())),
        }
    }

    /// Canonical algorithm name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Sha1 => "SHA-1",
            Self::Sha224 => "SHA-224",
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
            Self::Blake3 => "BLAKE3",
        }
    }

    fn engine(&self) -> Box<dyn DigestEngine> {
        match self {
            Self::Md5 => Box::new(RustCrypto(md5::Md5::default())),
            Self::Sha1 => Box::new(RustCrypto(sha1::Sha1::default())),
            Self::Sha224 => Box::new(RustCrypto(sha2::Sha224::default())),
            Self::Sha256 => Box::new(RustCrypto(sha2::Sha256::default())),
            Self::Sha384 => Box::new(RustCrypto(sha2::Sha384::default())),
            Self::Sha512 => Box::new(RustCrypto(sha2::Sha512::default())),
            Self::Blake3 => Box::new(Blake3(blake3::Hasher::new())),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named, reusable digest.
///
/// Each call to [`digest`](MessageDigest::digest) finalises and resets the
/// state, so one instance can hash many inputs in turn.
pub struct MessageDigest {
    algorithm: String,
    engine: Box<dyn DigestEngine>,
}

impl MessageDigest {
    /// Look up a built-in algorithm by name.
    pub fn get_instance(algorithm: &str) -> DigestResult<Self> {
        DigestAlgorithm::from_name(algorithm).map(Self::from)
    }

    /// Wrap a custom engine under the given algorithm name.
    pub fn new(algorithm: impl Into<String>, engine: impl DigestEngine + 'static) -> Self {
        Self {
            algorithm: algorithm.into(),
            engine: Box::new(engine),
        }
    }

    /// The algorithm name, as shown in failure messages.
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn update(&mut self, data: &[u8]) {
        self.engine.update(data);
    }

    /// Finish the digest and reset for reuse.
    pub fn digest(&mut self) -> Vec<u8> {
        self.engine.finalize_reset()
    }

    pub fn reset(&mut self) {
        self.engine.reset();
    }

    pub fn output_size(&self) -> usize {
        self.engine.output_size()
    }

    /// Digest a complete byte slice in one go.
    pub fn digest_of(&mut self, data: &[u8]) -> Vec<u8> {
        self.reset();
        self.update(data);
        self.digest()
    }
}

impl From<DigestAlgorithm> for MessageDigest {
    fn from(algorithm: DigestAlgorithm) -> Self {
        Self {
            algorithm: algorithm.name().to_string(),
            engine: algorithm.engine(),
        }
    }
}

impl fmt::Debug for MessageDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageDigest")
            .field("algorithm", &self.algorithm)
            .field("output_size", &self.output_size())
            .finish()
    }
}
