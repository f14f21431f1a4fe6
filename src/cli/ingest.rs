use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    IngestError, Res,
    config::{MAX_BATCH_SIZE, Settings},
    debug, info,
    management::{Ledger, RecordFile, TokenManager, ledger::load_playlist_ids},
    spotify::{
        artists::collect_artist_batch,
        client::EndpointCaller,
        playlists::get_track_ids,
        tracks::collect_track_batch,
        transport::{ReqwestTransport, Transport},
    },
    success,
    types::{ArtistRecord, TrackRecord},
    utils,
};

/// Counters of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub playlists: usize,
    pub discovered_tracks: usize,
    pub new_tracks: usize,
    pub tracks_added: usize,
    pub track_batches_skipped: usize,
    pub artists_discovered: usize,
    pub artists_added: usize,
    pub artist_batches_skipped: usize,
}

struct TrackPhase {
    added: usize,
    skipped: usize,
    new_artist_ids: Vec<String>,
}

struct ArtistPhase {
    added: usize,
    skipped: usize,
}

/// Runs the full ingestion against the live Spotify Web API.
pub async fn ingest(settings: &Settings) -> Res<IngestSummary> {
    let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new());
    let tokens = Arc::new(TokenManager::new(settings, Arc::clone(&transport)));
    let caller = EndpointCaller::new(settings, transport, tokens);

    run_ingest(settings, &caller).await
}

/// Discovers playlist tracks, ingests the new ones in batches, then enriches the artists
/// first seen in this run.
///
/// # Phases
///
/// 1. **Discover**: acquire a credential, read the playlist ids, walk every playlist.
/// 2. **Tracks**: drop ids already in the track ledger, check the dataset ceiling, then
///    fetch and append one batch at a time together with the ids of newly seen artists.
/// 3. **Artists**: fetch and append metadata for the artists discovered in phase 2.
///
/// # Errors
///
/// Fatal conditions end the run before any dataset file is touched:
/// - credential exchange failure
/// - [`IngestError::PlaylistFileMissing`]
/// - [`IngestError::NoTracks`]
/// - [`IngestError::DatasetCeiling`]
///
/// Rejected requests and malformed batches are skipped with a warning instead.
pub async fn run_ingest(settings: &Settings, caller: &EndpointCaller) -> Res<IngestSummary> {
    info!("Starting Spotify API data ingest");
    caller.credentials().current().await?;

    let playlist_path = settings.playlist_ids_path();
    let playlist_ids = load_playlist_ids(&playlist_path).await?;
    let track_ids = get_track_ids(caller, &playlist_ids).await?;
    if track_ids.is_empty() {
        return Err(IngestError::NoTracks(playlist_path));
    }

    let mut track_ledger = Ledger::load(settings.track_ids_path()).await?;
    let mut artist_ledger = Ledger::load(settings.artist_ids_path()).await?;
    let known_tracks = track_ledger.len();
    if track_ledger.is_empty() {
        info!(
            "No track ledger entries at {}. Starting a new dataset.",
            track_ledger.path().display()
        );
    }
    let new_track_ids = track_ledger.filter_new(&track_ids);

    if new_track_ids.len() + known_tracks >= settings.dataset_size_threshold {
        return Err(IngestError::DatasetCeiling {
            requested: new_track_ids.len(),
            known: known_tracks,
            threshold: settings.dataset_size_threshold,
        });
    }

    info!(
        "Attempting to get {} new tracks. There are {} in the existing data files.",
        new_track_ids.len(),
        known_tracks
    );

    let tracks = ingest_tracks(
        settings,
        caller,
        &new_track_ids,
        &mut track_ledger,
        &mut artist_ledger,
    )
    .await?;

    info!(
        "Successfully added {} new tracks to dataset. Found {} new artists. Populating artist data...",
        tracks.added,
        tracks.new_artist_ids.len()
    );

    let artists = ingest_artists(settings, caller, &tracks.new_artist_ids).await?;

    let summary = IngestSummary {
        playlists: playlist_ids.len(),
        discovered_tracks: track_ids.len(),
        new_tracks: new_track_ids.len(),
        tracks_added: tracks.added,
        track_batches_skipped: tracks.skipped,
        artists_discovered: tracks.new_artist_ids.len(),
        artists_added: artists.added,
        artist_batches_skipped: artists.skipped,
    };

    success!(
        "Data ingest complete. Added {} tracks and {} artists.",
        summary.tracks_added,
        summary.artists_added
    );
    Ok(summary)
}

async fn ingest_tracks(
    settings: &Settings,
    caller: &EndpointCaller,
    new_track_ids: &[String],
    track_ledger: &mut Ledger,
    artist_ledger: &mut Ledger,
) -> Res<TrackPhase> {
    let mut phase = TrackPhase {
        added: 0,
        skipped: 0,
        new_artist_ids: Vec::new(),
    };
    if new_track_ids.is_empty() {
        return Ok(phase);
    }

    let mut track_file: RecordFile<TrackRecord> =
        RecordFile::open(settings.track_features_path())?;
    track_ledger.open()?;
    artist_ledger.open()?;

    let batch_size = settings.batch_size.clamp(1, MAX_BATCH_SIZE);
    let pb = progress_bar(
        utils::batch_count(new_track_ids.len(), batch_size),
        "Fetching tracks",
    );

    for batch in new_track_ids.chunks(batch_size) {
        let Some(collected) = collect_track_batch(caller, batch).await? else {
            phase.skipped += 1;
            pb.inc(1);
            continue;
        };

        let mut fresh = Vec::with_capacity(collected.records.len());
        for record in &collected.records {
            if track_ledger.contains(&record.track_id)
                || fresh.contains(&record.track_id.as_str())
            {
                debug!(
                    "Track {} already recorded, not writing it again",
                    record.track_id
                );
                continue;
            }
            track_file.write(record)?;
            fresh.push(record.track_id.as_str());
        }
        track_file.flush()?;

        for track_id in fresh {
            track_ledger.append(track_id)?;
            phase.added += 1;
        }
        track_ledger.flush()?;

        for artist_id in &collected.artist_ids {
            if artist_ledger.append(artist_id)? {
                phase.new_artist_ids.push(artist_id.clone());
            }
        }
        artist_ledger.flush()?;

        pb.set_message(format!("Fetched {} tracks", phase.added));
        pb.inc(1);
    }

    pb.finish_and_clear();
    debug!(
        "Wrote {} track rows to {}; ledger {} holds {} ids",
        track_file.written(),
        track_file.path().display(),
        track_ledger.path().display(),
        track_ledger.len()
    );
    Ok(phase)
}

async fn ingest_artists(
    settings: &Settings,
    caller: &EndpointCaller,
    artist_ids: &[String],
) -> Res<ArtistPhase> {
    let mut phase = ArtistPhase {
        added: 0,
        skipped: 0,
    };
    if artist_ids.is_empty() {
        return Ok(phase);
    }

    let mut artist_file: RecordFile<ArtistRecord> =
        RecordFile::open(settings.artist_features_path())?;

    let batch_size = settings.batch_size.clamp(1, MAX_BATCH_SIZE);
    let pb = progress_bar(
        utils::batch_count(artist_ids.len(), batch_size),
        "Fetching artists",
    );

    for batch in artist_ids.chunks(batch_size) {
        match collect_artist_batch(caller, batch).await? {
            Some(records) => {
                for record in &records {
                    artist_file.write(record)?;
                }
                artist_file.flush()?;
                phase.added += records.len();
            }
            None => phase.skipped += 1,
        }

        pb.set_message(format!("Fetched {} artists", phase.added));
        pb.inc(1);
    }

    pb.finish_and_clear();
    debug!(
        "Wrote {} artist rows to {}",
        artist_file.written(),
        artist_file.path().display()
    );
    Ok(phase)
}

fn progress_bar(batches: usize, message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new(batches as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} [{bar:30.cyan/blue}] {pos}/{len} batches {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
