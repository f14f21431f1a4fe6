use std::{fs::File, path::PathBuf, sync::Mutex};

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

use spotify_ingest::{Res, cli, config, error, utils};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Crawl the configured playlists and append new tracks and artists
    Ingest,

    /// Obtain or reuse a client-credentials access token
    Auth,

    /// Show ledger and record counts of the datasets
    Status,

    /// Realign the track ledger with the track record file
    Reconcile,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let settings = match config::Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => error!("Invalid configuration. Err: {}", e),
    };

    if let Err(e) = init_run_log(settings.log_dir()) {
        error!("Cannot create run log. Err: {}", e);
    }

    let result = match cli.command {
        Command::Ingest => cli::ingest(&settings).await.map(|_| ()),
        Command::Auth => cli::auth(&settings).await.map(|_| ()),
        Command::Status => cli::status(&settings).await.map(|_| ()),
        Command::Reconcile => cli::reconcile(&settings).await.map(|_| ()),
        Command::Completions(_) => Ok(()),
    };

    if let Err(e) = result {
        error!("{}", e);
    }
}

/// Sends every diagnostic of this run to `logs/spotify_ingest_<timestamp>.log`.
fn init_run_log(log_dir: PathBuf) -> Res<PathBuf> {
    std::fs::create_dir_all(&log_dir)?;
    let path = log_dir.join(format!(
        "spotify_ingest_{}.log",
        utils::log_file_timestamp()
    ));
    let file = File::create(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .init();

    Ok(path)
}
