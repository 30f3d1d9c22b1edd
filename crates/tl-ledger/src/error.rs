/// Errors produced by ledger operations.
///
/// Validation failure is not an error: it is reported through
/// [`crate::Ledger::validate`] and [`crate::ValidationReport`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("a ledger needs at least a genesis record")]
    EmptyChain,

    #[error("serialization error: {0}")]
    Serialization(String),
}
