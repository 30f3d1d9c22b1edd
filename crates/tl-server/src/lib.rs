//! HTTP server for Trackline.
//!
//! The presentation side of the ledger: each session owns one ledger, the
//! event endpoint performs one append per submitted form followed by one
//! re-render, and every render carries the chain's validation signal.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handler;
pub mod router;
pub mod server;
pub mod session;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::{ChainView, EventForm, RecordView};
pub use router::{build_router, AppState};
pub use server::TracklineServer;
pub use session::{SessionId, SessionStore, SharedLedger};
