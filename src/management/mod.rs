mod auth;
pub mod ledger;
pub mod reconcile;
pub mod records;

pub use auth::TokenManager;
pub use ledger::Ledger;
pub use reconcile::{ReconcileReport, reconcile_track_ledger};
pub use records::RecordFile;
