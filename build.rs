//! Build script for the Spotify dataset ingestion CLI.
//!
//! Copies the `.env.example` configuration template into the user's local data directory,
//! next to the `.env` file that [`load_env`](src/config.rs) reads at startup.

use std::{env, fs, path::PathBuf};

/// Copies `.env.example` from the crate root to the platform-specific data directory:
/// - Linux: `~/.local/share/spotify-ingest/.env.example`
/// - macOS: `~/Library/Application Support/spotify-ingest/.env.example`
/// - Windows: `%LOCALAPPDATA%/spotify-ingest/.env.example`
///
/// A missing template only produces a cargo warning. Directory or write failures fail the
/// build.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=.env.example");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let template = manifest_dir.join(".env.example");

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push("spotify-ingest");
    fs::create_dir_all(&out_dir)?;

    if template.is_file() {
        fs::copy(&template, out_dir.join(".env.example"))?;
    } else {
        println!(
            "cargo:warning=.env.example not found at {}",
            template.display()
        );
    }

    Ok(())
}
