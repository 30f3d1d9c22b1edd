//! Append-only, tamper-evident event ledger for Trackline.
//!
//! This crate is the heart of Trackline. It provides:
//! - [`Record`]: an immutable entry bound to its predecessor by digest
//! - [`Ledger`]: genesis creation, `append`, and `validate`
//! - [`StreamValidator`]: a non-short-circuiting diagnostic walk
//! - [`TrackingProjection`]: per-package status history
//!
//! The genesis record is trusted by validation: its own digest is never
//! recomputed. Tampering with it is only visible through record 1's link.

pub mod error;
pub mod ledger;
pub mod projection;
pub mod record;
pub mod traits;
pub mod validation;

pub use error::LedgerError;
pub use ledger::Ledger;
pub use projection::{PackageEvent, PackageHistory, TrackingProjection};
pub use record::Record;
pub use tl_crypto::{ChainError, HashAlgorithm};
pub use traits::LedgerReader;
pub use validation::{StreamValidator, ValidationReport, Violation, ViolationKind};
