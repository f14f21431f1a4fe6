//! Spotify Dataset Ingestion Library
//!
//! This library crawls a fixed list of Spotify playlists, harvests track and artist ids,
//! fetches batched track metadata, audio features and artist metadata, and appends them to
//! CSV datasets that grow across runs without duplicates.
//!
//! # Modules
//!
//! - `cli` - Command implementations, including the ingestion orchestrator
//! - `config` - Configuration management and environment variables
//! - `error` - The crate error type
//! - `management` - Credential store, id ledgers and record files
//! - `spotify` - Spotify Web API client: transport, pacing, retries, batch collectors
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use spotify_ingest::{cli, config};
//!
//! #[tokio::main]
//! async fn main() -> spotify_ingest::Res<()> {
//!     config::load_env().await?;
//!     let settings = config::Settings::from_env()?;
//!     cli::ingest(&settings).await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod spotify;
pub mod types;
pub mod utils;

pub use error::IngestError;

#[doc(hidden)]
pub use colored as __colored;
#[doc(hidden)]
pub use tracing as __tracing;

/// Result alias used throughout the crate.
///
/// # Example
///
/// ```
/// use spotify_ingest::Res;
///
/// async fn fetch_data() -> Res<String> {
///     Ok("data".to_string())
/// }
/// ```
pub type Res<T> = std::result::Result<T, IngestError>;

/// Prints an informational message with a blue bullet point.
///
/// The message is also recorded as a `tracing` INFO event, so it ends up in the run log
/// file when a subscriber is installed.
///
/// # Example
///
/// ```
/// info!("Starting Spotify API data ingest");
/// info!("Found {} playlists", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use $crate::__colored::Colorize;
    let message = std::format!($($arg)*);
    println!("[{}] {}", "o".blue().bold(), message);
    $crate::__tracing::info!("{}", message);
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Data ingest complete.");
/// success!("Added {} tracks", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use $crate::__colored::Colorize;
    let message = std::format!($($arg)*);
    println!("[{}] {}", "✓".green().bold(), message);
    $crate::__tracing::info!("{}", message);
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only the binary uses this macro. Library code returns an [`IngestError`] instead and
/// leaves the decision to terminate to its caller.
///
/// # Example
///
/// ```
/// error!("Failed to load configuration");
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use $crate::__colored::Colorize;
    let message = std::format!($($arg)*);
    println!("[{}] {}", "!".red().bold(), message);
    $crate::__tracing::error!("{}", message);
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for every recoverable condition: skipped batches, rejected requests, abandoned
/// playlist listings.
///
/// # Example
///
/// ```
/// warning!("Entity not found accessing {} for id {}", endpoint, id);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use $crate::__colored::Colorize;
    let message = std::format!($($arg)*);
    println!("[{}] {}", "!".yellow().bold(), message);
    $crate::__tracing::warn!("{}", message);
  })
}

/// Records a diagnostic message in the run log only.
#[macro_export]
macro_rules! debug {
  ($($arg:tt)*) => ({
    $crate::__tracing::debug!($($arg)*);
  })
}
