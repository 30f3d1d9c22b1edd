use tl_crypto::{ChainError, HashAlgorithm, HashChainVerifier, RecordHasher};
use tl_types::{Payload, PreviousDigest, Timestamp};

use crate::error::LedgerError;
use crate::record::Record;
use crate::traits::LedgerReader;
use crate::validation::{StreamValidator, ValidationReport};

/// Append-only, hash-linked sequence of records.
///
/// A ledger always holds at least its genesis record. It is a plain owned
/// value with no interior locking: `append` takes `&mut self`, so callers
/// that share a ledger between tasks put it behind their own mutex.
#[derive(Clone, Debug)]
pub struct Ledger {
    hasher: RecordHasher,
    records: Vec<Record>,
}

impl Ledger {
    /// Create a SHA-256 ledger holding a fresh genesis record.
    pub fn new() -> Self {
        Self::with_algorithm(HashAlgorithm::default())
    }

    /// Create a ledger using the given hash algorithm.
    pub fn with_algorithm(algorithm: HashAlgorithm) -> Self {
        let hasher = RecordHasher::new(algorithm);
        let genesis = Record::genesis(Timestamp::now(), &hasher);
        tracing::debug!(
            digest = %genesis.digest().short_hex(),
            %algorithm,
            "created genesis record"
        );
        Self {
            hasher,
            records: vec![genesis],
        }
    }

    /// Rebuild a ledger from records produced elsewhere (e.g. an exported
    /// chain). The records are taken as-is; call [`Ledger::validate`] to
    /// find out whether they are intact.
    pub fn from_records(
        records: Vec<Record>,
        algorithm: HashAlgorithm,
    ) -> Result<Self, LedgerError> {
        if records.is_empty() {
            return Err(LedgerError::EmptyChain);
        }
        Ok(Self {
            hasher: RecordHasher::new(algorithm),
            records,
        })
    }

    /// Parse an exported JSON array of records.
    pub fn from_json(json: &str, algorithm: HashAlgorithm) -> Result<Self, LedgerError> {
        let records: Vec<Record> =
            serde_json::from_str(json).map_err(|e| LedgerError::Serialization(e.to_string()))?;
        Self::from_records(records, algorithm)
    }

    /// Render the chain as a pretty JSON array of records.
    pub fn to_json(&self) -> Result<String, LedgerError> {
        serde_json::to_string_pretty(&self.records)
            .map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    /// Append a payload as the new tail, linked to the current tail.
    pub fn append(&mut self, payload: impl Into<Payload>) -> &Record {
        let previous = PreviousDigest::Digest(self.head().digest());
        let record = Record::new(Timestamp::now(), payload.into(), previous, &self.hasher);
        tracing::debug!(
            index = self.records.len(),
            digest = %record.digest().short_hex(),
            previous = %previous,
            "appended record"
        );
        self.records.push(record);
        self.head()
    }

    /// `true` iff every record after genesis has an intact digest and links
    /// to its predecessor. Stops at the first violation.
    ///
    /// The genesis record itself is trusted and never re-hashed.
    pub fn validate(&self) -> bool {
        match self.verify() {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(index = err.index(), error = %err, "ledger validation failed");
                false
            }
        }
    }

    /// Like [`Ledger::validate`], but names the first failing record.
    pub fn verify(&self) -> Result<(), ChainError> {
        HashChainVerifier::verify_chain(&self.hasher, &self.records)
    }

    /// Full diagnostic walk that reports every violation.
    pub fn report(&self) -> ValidationReport {
        StreamValidator::validate(self)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Number of records, genesis included.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always `false`: a ledger holds at least its genesis record.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn genesis(&self) -> &Record {
        &self.records[0]
    }

    /// The current tail.
    pub fn head(&self) -> &Record {
        &self.records[self.records.len() - 1]
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.hasher.algorithm()
    }

    pub fn hasher(&self) -> &RecordHasher {
        &self.hasher
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerReader for Ledger {
    fn records(&self) -> &[Record] {
        &self.records
    }

    fn hasher(&self) -> &RecordHasher {
        &self.hasher
    }
}
