//! # CLI Module
//!
//! Command implementations for the ingestion binary. Each command loads what it needs
//! through the management layer, talks to Spotify through the spotify layer, and reports
//! progress with the crate's output macros.
//!
//! ## Commands
//!
//! - [`ingest`] - Runs the three-phase ingestion (discover, tracks, artists)
//! - [`auth`] - Obtains or reuses a client-credentials access token
//! - [`status`] - Shows ledger and record counts of both datasets
//! - [`reconcile`] - Realigns the track ledger with the track record file
//!
//! ## Architecture Design
//!
//! ```text
//! CLI Layer (commands, orchestration)
//!     ↓
//! Management Layer (token store, ledgers, record files)
//!     ↓
//! API Layer (Spotify integration)
//!     ↓
//! Network Layer (HTTP requests)
//! ```
//!
//! Commands return errors instead of exiting; the binary decides how to report them.

mod auth;
mod ingest;
mod reconcile;
mod status;

pub use auth::auth;
pub use ingest::IngestSummary;
pub use ingest::ingest;
pub use ingest::run_ingest;
pub use reconcile::reconcile;
pub use status::dataset_status;
pub use status::status;
