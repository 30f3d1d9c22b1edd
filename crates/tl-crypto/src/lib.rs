//! Cryptographic primitives for Trackline.
//!
//! Provides the record hasher (SHA-256 by default, BLAKE3 selectable) and
//! hash chain verification over anything implementing [`ChainLinked`].
//!
//! All crypto operations wrap established libraries; no custom cryptography.

pub mod chain;
pub mod hasher;

pub use chain::{ChainError, ChainLinked, HashChainVerifier};
pub use hasher::{HashAlgorithm, HasherError, RecordHasher};
