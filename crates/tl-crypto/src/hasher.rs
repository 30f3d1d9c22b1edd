use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use tl_types::Digest;

/// Hash function used for record digests.
///
/// Both produce 256-bit output. A ledger picks one at creation and keeps it
/// for its whole lifetime; digests from different algorithms never compare
/// equal in practice, so mixing them breaks the chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Blake3,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Blake3 => "blake3",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = HasherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "blake3" => Ok(Self::Blake3),
            _ => Err(HasherError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Computes record digests over the plain concatenation of canonical parts.
///
/// No domain tag or length prefix is mixed in: the digest of a record is
/// exactly `H(timestamp || payload || previous_digest)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecordHasher {
    algorithm: HashAlgorithm,
}

impl RecordHasher {
    pub const SHA256: Self = Self::new(HashAlgorithm::Sha256);
    pub const BLAKE3: Self = Self::new(HashAlgorithm::Blake3);

    pub const fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Hash the concatenation of `parts`.
    pub fn hash_parts(&self, parts: &[&[u8]]) -> Digest {
        match self.algorithm {
            HashAlgorithm::Sha256 => {
                let mut hasher = Sha256::new();
                for part in parts {
                    hasher.update(part);
                }
                Digest::from_hash(hasher.finalize().into())
            }
            HashAlgorithm::Blake3 => {
                let mut hasher = blake3::Hasher::new();
                for part in parts {
                    hasher.update(part);
                }
                Digest::from_hash(*hasher.finalize().as_bytes())
            }
        }
    }

    /// Hash a single byte string.
    pub fn hash(&self, data: &[u8]) -> Digest {
        self.hash_parts(&[data])
    }

    /// Verify that data produces the expected digest.
    pub fn verify(&self, data: &[u8], expected: &Digest) -> bool {
        self.hash(data) == *expected
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }
}

impl From<HashAlgorithm> for RecordHasher {
    fn from(algorithm: HashAlgorithm) -> Self {
        Self::new(algorithm)
    }
}

/// Errors from hasher configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("unknown hash algorithm: {0} (expected sha256 or blake3)")]
    UnknownAlgorithm(String),
}
