//! Configuration management for the Spotify dataset ingestion.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. Everything the pipeline needs at runtime is collected into a
//! [`Settings`] value once at startup, so the rest of the crate never touches the
//! environment directly.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the working directory
//! 3. `.env` file in the local data directory
//! 4. Application defaults (where applicable)

use std::{env, path::PathBuf, time::Duration};

use crate::{IngestError, Res};

/// Upper bound imposed by the Spotify batch endpoints.
pub const MAX_BATCH_SIZE: usize = 50;

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_DATASET_SIZE_THRESHOLD: usize = 50_000;

/// Minimum spacing between two outbound API calls.
pub const DEFAULT_PACING: Duration = Duration::from_secs(1);

/// Retries allowed per logical request, shared by the 429 and 401 paths.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Loads environment variables from `.env` files.
///
/// Variables that are already present in the process environment are never overridden.
/// The working directory is consulted first, then the platform-specific local data
/// directory:
/// - Linux: `~/.local/share/spotify-ingest/.env`
/// - macOS: `~/Library/Application Support/spotify-ingest/.env`
/// - Windows: `%LOCALAPPDATA%/spotify-ingest/.env`
///
/// Missing files are fine; only an unreadable or malformed file is an error.
pub async fn load_env() -> Res<()> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotify-ingest/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    match dotenv::dotenv() {
        Ok(_) => {}
        Err(e) if e.not_found() => {}
        Err(e) => return Err(IngestError::Config(e.to_string())),
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| IngestError::Config(e.to_string()))?;
    }

    Ok(())
}

/// Returns the Spotify API client ID from `SPOTIFY_API_AUTH_CLIENT_ID`.
pub fn spotify_client_id() -> Res<String> {
    required("SPOTIFY_API_AUTH_CLIENT_ID")
}

/// Returns the Spotify API client secret from `SPOTIFY_API_AUTH_CLIENT_SECRET`.
///
/// # Security Note
///
/// The client secret should be kept confidential and never exposed in logs
/// or version control.
pub fn spotify_client_secret() -> Res<String> {
    required("SPOTIFY_API_AUTH_CLIENT_SECRET")
}

/// Returns the Spotify Web API base URL, e.g. `https://api.spotify.com/v1`.
pub fn spotify_apiurl() -> String {
    optional("SPOTIFY_API_URL")
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
        .trim_end_matches('/')
        .to_string()
}

/// Returns the client-credentials token exchange URL.
pub fn spotify_apitoken_url() -> String {
    optional("SPOTIFY_API_TOKEN_URL").unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string())
}

/// Returns the storage root (`PROJECT_ROOT`), defaulting to the working directory.
pub fn project_root() -> PathBuf {
    optional("PROJECT_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns the dataset-size ceiling (`DATASET_SIZE_THRESHOLD`).
pub fn dataset_size_threshold() -> Res<usize> {
    parsed("DATASET_SIZE_THRESHOLD", DEFAULT_DATASET_SIZE_THRESHOLD)
}

/// Returns the batch size (`BATCH_SIZE`), which must lie in `1..=50`.
pub fn batch_size() -> Res<usize> {
    let size = parsed("BATCH_SIZE", MAX_BATCH_SIZE)?;
    if size == 0 || size > MAX_BATCH_SIZE {
        return Err(IngestError::Config(format!(
            "BATCH_SIZE must be between 1 and {MAX_BATCH_SIZE}, got {size}"
        )));
    }
    Ok(size)
}

/// Resolved runtime configuration for one ingestion run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub client_id: String,
    pub client_secret: String,
    pub api_url: String,
    pub token_url: String,
    pub storage_root: PathBuf,
    pub dataset_size_threshold: usize,
    pub batch_size: usize,
    pub pacing: Duration,
    pub max_retries: u32,
}

impl Settings {
    /// Builds settings from the process environment.
    pub fn from_env() -> Res<Self> {
        Ok(Self {
            client_id: spotify_client_id()?,
            client_secret: spotify_client_secret()?,
            api_url: spotify_apiurl(),
            token_url: spotify_apitoken_url(),
            storage_root: project_root(),
            dataset_size_threshold: dataset_size_threshold()?,
            batch_size: batch_size()?,
            pacing: DEFAULT_PACING,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Settings rooted at `storage_root` with default endpoints and limits.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        storage_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            api_url: DEFAULT_API_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            storage_root: storage_root.into(),
            dataset_size_threshold: DEFAULT_DATASET_SIZE_THRESHOLD,
            batch_size: MAX_BATCH_SIZE,
            pacing: DEFAULT_PACING,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn token_path(&self) -> PathBuf {
        self.storage_root.join("spotify_token.json")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.storage_root.join("data")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.storage_root.join("logs")
    }

    pub fn playlist_ids_path(&self) -> PathBuf {
        self.data_dir().join("spotify_ingest_playlist_ids.csv")
    }

    pub fn track_ids_path(&self) -> PathBuf {
        self.data_dir().join("spotify_track_ids.csv")
    }

    pub fn artist_ids_path(&self) -> PathBuf {
        self.data_dir().join("spotify_artist_ids.csv")
    }

    pub fn track_features_path(&self) -> PathBuf {
        self.data_dir().join("spotify_track_features.csv")
    }

    pub fn artist_features_path(&self) -> PathBuf {
        self.data_dir().join("spotify_artist_features.csv")
    }
}

fn required(key: &str) -> Res<String> {
    optional(key).ok_or_else(|| IngestError::Config(format!("{key} must be set")))
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed(key: &str, default: usize) -> Res<usize> {
    match optional(key) {
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .map_err(|e| IngestError::Config(format!("{key} is not a valid number: {e}"))),
        None => Ok(default),
    }
}
