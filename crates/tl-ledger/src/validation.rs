use serde::Serialize;
use tl_crypto::{ChainError, HashAlgorithm, HashChainVerifier};

use crate::traits::LedgerReader;

/// Result of a full chain walk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub algorithm: HashAlgorithm,
    pub record_count: usize,
    pub valid: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// The violation a short-circuiting walk would have stopped at.
    pub fn first_violation(&self) -> Option<&Violation> {
        self.violations.first()
    }
}

/// A specific integrity violation detected during validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub index: usize,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Stored digest differs from the recomputed one.
    HashMismatch,
    /// Previous digest does not match the predecessor's digest.
    BrokenLink,
}

impl From<ChainError> for Violation {
    fn from(err: ChainError) -> Self {
        let kind = match err {
            ChainError::HashMismatch { .. } => ViolationKind::HashMismatch,
            ChainError::BrokenLink { .. } => ViolationKind::BrokenLink,
        };
        Self {
            index: err.index(),
            kind,
            description: err.to_string(),
        }
    }
}

/// Chain validator that keeps going after the first violation.
pub struct StreamValidator;

impl StreamValidator {
    /// Walk every record after genesis and collect all violations.
    pub fn validate<R: LedgerReader + ?Sized>(reader: &R) -> ValidationReport {
        let records = reader.records();
        let violations: Vec<Violation> = HashChainVerifier::violations(reader.hasher(), records)
            .into_iter()
            .map(Violation::from)
            .collect();

        for violation in &violations {
            tracing::warn!(
                index = violation.index,
                kind = ?violation.kind,
                "chain violation"
            );
        }

        ValidationReport {
            algorithm: reader.hasher().algorithm(),
            record_count: records.len(),
            valid: violations.is_empty(),
            violations,
        }
    }
}
