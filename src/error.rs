use std::{io, path::PathBuf};

use reqwest::StatusCode;
use thiserror::Error;

/// Every failure the ingestion pipeline can report to its caller.
///
/// Recoverable conditions (rate limiting, expired tokens, rejected batches) never show up
/// here; the endpoint caller and the batch collectors absorb them and log a warning.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("credential exchange rejected with status {status}: {body}")]
    TokenExchange { status: StatusCode, body: String },

    #[error("no playlist ids found at path: {}", .0.display())]
    PlaylistFileMissing(PathBuf),

    #[error("no tracks found for the playlists in {}", .0.display())]
    NoTracks(PathBuf),

    #[error(
        "attempting to add {requested} tracks to {known} known tracks, which will exceed threshold of {threshold}"
    )]
    DatasetCeiling {
        requested: usize,
        known: usize,
        threshold: usize,
    },
}
