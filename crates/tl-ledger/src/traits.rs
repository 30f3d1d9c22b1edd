use tl_crypto::RecordHasher;

use crate::record::Record;

/// Read boundary for validators and projections.
pub trait LedgerReader {
    /// All records in chain order, genesis first.
    fn records(&self) -> &[Record];

    /// The hasher the records were built with.
    fn hasher(&self) -> &RecordHasher;

    fn record_count(&self) -> usize {
        self.records().len()
    }

    fn get(&self, index: usize) -> Option<&Record> {
        self.records().get(index)
    }
}
