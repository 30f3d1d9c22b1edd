//! Foundation types for Trackline.
//!
//! Every other Trackline crate depends on `tl-types`. The types here own
//! their canonical byte forms, which is what makes a record hash
//! re-derivable from stored fields alone.
//!
//! # Key Types
//!
//! - [`Digest`]: 256-bit record hash, rendered as lowercase hex
//! - [`PreviousDigest`]: link to the preceding record, or the `"0"` sentinel
//! - [`Timestamp`]: UTC instant with a fixed RFC 3339 rendering
//! - [`Payload`]: genesis marker, tracking event, or any JSON value

pub mod digest;
pub mod error;
pub mod payload;
pub mod timestamp;

pub use digest::{Digest, PreviousDigest};
pub use error::TypeError;
pub use payload::{Payload, TrackingEvent, GENESIS_MARKER};
pub use timestamp::Timestamp;
