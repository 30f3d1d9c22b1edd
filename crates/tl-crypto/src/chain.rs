use tl_types::{Digest, PreviousDigest};

use crate::hasher::RecordHasher;

/// Trait for objects that participate in a hash chain.
pub trait ChainLinked {
    /// The stored digest.
    fn digest(&self) -> Digest;
    /// The stored link to the predecessor.
    fn previous_digest(&self) -> PreviousDigest;
    /// Canonical pre-image bytes for digest recomputation.
    fn canonical_bytes(&self) -> Vec<u8>;
}

/// Hash chain integrity verifier.
///
/// Walks a sequence from index 1 to the end. For every element it checks,
/// in order, that the stored digest equals a fresh recomputation and that the
/// link equals the predecessor's digest. The element at index 0 (genesis) is
/// trusted as-is: its own digest is never recomputed.
pub struct HashChainVerifier;

impl HashChainVerifier {
    /// Verify a chain, stopping at the first violation.
    pub fn verify_chain<T: ChainLinked>(
        hasher: &RecordHasher,
        links: &[T],
    ) -> Result<(), ChainError> {
        for index in 1..links.len() {
            Self::check_link(hasher, &links[index - 1], &links[index], index)?;
        }
        Ok(())
    }

    /// Verify a chain, collecting every violation instead of stopping.
    ///
    /// A record can contribute both a hash mismatch and a broken link.
    pub fn violations<T: ChainLinked>(hasher: &RecordHasher, links: &[T]) -> Vec<ChainError> {
        let mut found = Vec::new();
        for index in 1..links.len() {
            let current = &links[index];
            if !Self::digest_matches(hasher, current) {
                found.push(ChainError::HashMismatch { index });
            }
            if !Self::links_to(current, &links[index - 1]) {
                found.push(ChainError::BrokenLink { index });
            }
        }
        found
    }

    /// Check a single element against its predecessor.
    pub fn check_link<T: ChainLinked>(
        hasher: &RecordHasher,
        previous: &T,
        current: &T,
        index: usize,
    ) -> Result<(), ChainError> {
        if !Self::digest_matches(hasher, current) {
            return Err(ChainError::HashMismatch { index });
        }
        if !Self::links_to(current, previous) {
            return Err(ChainError::BrokenLink { index });
        }
        Ok(())
    }

    /// Recompute the digest of an element from its canonical bytes.
    pub fn compute_digest<T: ChainLinked>(hasher: &RecordHasher, link: &T) -> Digest {
        hasher.hash(&link.canonical_bytes())
    }

    fn digest_matches<T: ChainLinked>(hasher: &RecordHasher, link: &T) -> bool {
        Self::compute_digest(hasher, link) == link.digest()
    }

    fn links_to<T: ChainLinked>(current: &T, previous: &T) -> bool {
        current.previous_digest() == PreviousDigest::Digest(previous.digest())
    }
}

/// Errors from chain verification.
#[derive(Clone, Copy, Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("hash mismatch at index {index}: computed digest differs from stored")]
    HashMismatch { index: usize },

    #[error("broken link at index {index}: previous digest does not match")]
    BrokenLink { index: usize },
}

impl ChainError {
    /// Index of the offending element.
    pub fn index(&self) -> usize {
        match self {
            Self::HashMismatch { index } | Self::BrokenLink { index } => *index,
        }
    }
}
