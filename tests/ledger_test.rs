mod common;

use std::collections::HashSet;

use common::{read_lines, track_record, write_lines};
use spotify_ingest::{
    IngestError,
    management::{
        Ledger, RecordFile,
        ledger::{load_known_ids, load_playlist_ids, parse_id_rows},
        records::{read_records, read_track_record_ids},
    },
    types::{ArtistRecord, TrackRecord},
    utils::{batch_count, dedup_preserving_order, filter_new},
};
use tempfile::tempdir;

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn set(values: &[&str]) -> HashSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn test_filter_new_keeps_input_order_and_drops_known() {
    let result = filter_new(&ids(&["T5", "T1", "T4", "T2"]), &set(&["T1", "T2"]));
    assert_eq!(result, ids(&["T5", "T4"]));
}

#[test]
fn test_filter_new_collapses_repeated_candidates() {
    let result = filter_new(&ids(&["T3", "T1", "T3", "T4", "T1"]), &set(&["T4"]));
    assert_eq!(result, ids(&["T3", "T1"]));
}

#[test]
fn test_filter_new_covers_candidates_and_is_idempotent() {
    let candidates = ids(&["A", "B", "C", "B", "D"]);
    let known = set(&["B", "Z"]);

    let new = filter_new(&candidates, &known);
    assert!(new.iter().all(|id| !known.contains(id)));

    let mut covered: HashSet<String> = known.clone();
    covered.extend(new.iter().cloned());
    let mut expected: HashSet<String> = known.clone();
    expected.extend(candidates.iter().cloned());
    assert_eq!(covered, expected);

    assert!(filter_new(&new, &covered).is_empty());
}

#[test]
fn test_filter_new_with_empty_inputs() {
    assert!(filter_new(&[], &set(&["T1"])).is_empty());
    assert_eq!(filter_new(&ids(&["T1"]), &HashSet::new()), ids(&["T1"]));
}

#[test]
fn test_dedup_preserving_order() {
    assert_eq!(
        dedup_preserving_order(ids(&["P2", "P1", "P2", "P3", "P1"])),
        ids(&["P2", "P1", "P3"])
    );
}

#[test]
fn test_batch_count() {
    assert_eq!(batch_count(0, 50), 0);
    assert_eq!(batch_count(50, 50), 1);
    assert_eq!(batch_count(51, 50), 2);
    assert_eq!(batch_count(3, 2), 2);
}

#[test]
fn test_parse_id_rows_takes_first_column_and_skips_blanks() {
    let rows = parse_id_rows("\u{feff}P1\n\n  P2  ,comment\nP3\n").unwrap();
    assert_eq!(rows, ids(&["P1", "P2", "P3"]));
}

#[tokio::test]
async fn test_load_known_ids_missing_file_is_empty() {
    let dir = tempdir().unwrap();
    let known = load_known_ids(&dir.path().join("absent.csv")).await.unwrap();
    assert!(known.is_empty());
}

#[tokio::test]
async fn test_load_known_ids_reads_every_row() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("spotify_track_ids.csv");
    write_lines(&path, &["T1", "T2", "T1"]);

    let known = load_known_ids(&path).await.unwrap();
    assert_eq!(known, set(&["T1", "T2"]));
}

#[tokio::test]
async fn test_load_playlist_ids_missing_file_is_fatal() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data/spotify_ingest_playlist_ids.csv");

    let err = load_playlist_ids(&path).await.unwrap_err();
    assert!(matches!(err, IngestError::PlaylistFileMissing(p) if p == path));
}

#[tokio::test]
async fn test_load_playlist_ids_dedups_in_file_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("playlists.csv");
    std::fs::write(&path, "\u{feff}P2\nP1\n\nP2\n").unwrap();

    let playlists = load_playlist_ids(&path).await.unwrap();
    assert_eq!(playlists, ids(&["P2", "P1"]));
}

#[tokio::test]
async fn test_ledger_append_skips_known_ids() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data/spotify_track_ids.csv");
    write_lines(&path, &["T1"]);

    let mut ledger = Ledger::load(&path).await.unwrap();
    assert!(ledger.contains("T1"));
    assert!(!ledger.append("T1").unwrap());
    assert!(ledger.append("T2").unwrap());
    assert!(!ledger.append("T2").unwrap());
    ledger.flush().unwrap();
    drop(ledger);

    assert_eq!(read_lines(&path), ids(&["T1", "T2"]));

    let reloaded = Ledger::load(&path).await.unwrap();
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded.filter_new(&ids(&["T2", "T3"])), ids(&["T3"]));
}

#[tokio::test]
async fn test_record_file_writes_header_once() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data/spotify_track_features.csv");

    {
        let mut file: RecordFile<TrackRecord> = RecordFile::open(&path).unwrap();
        file.write(&track_record("T1")).unwrap();
        file.flush().unwrap();
        assert_eq!(file.written(), 1);
    }
    {
        let mut file: RecordFile<TrackRecord> = RecordFile::open(&path).unwrap();
        file.write(&track_record("T2")).unwrap();
        file.flush().unwrap();
    }

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("track_id,duration_ms,track_name,track_popularity,artist_ids,"));
    assert_eq!(lines.iter().filter(|l| l.starts_with("track_id")).count(), 1);

    let rows: Vec<TrackRecord> = read_records(&path).await.unwrap();
    assert_eq!(rows, vec![track_record("T1"), track_record("T2")]);
    assert_eq!(read_track_record_ids(&path).await.unwrap(), ids(&["T1", "T2"]));
}

#[tokio::test]
async fn test_artist_record_columns_and_genre_list() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("spotify_artist_features.csv");
    let record = ArtistRecord {
        artist_id: "A1".to_string(),
        artist_name: Some("Artist A1".to_string()),
        artist_genres: ids(&["indie", "pop"]),
        artist_popularity: Some(42),
        artist_followers: 0,
    };

    let mut file: RecordFile<ArtistRecord> = RecordFile::open(&path).unwrap();
    file.write(&record).unwrap();
    file.flush().unwrap();

    let lines = read_lines(&path);
    assert_eq!(
        lines[0],
        "artist_id,artist_name,artist_genres,artist_popularity,artist_followers"
    );
    assert_eq!(lines[1], r#"A1,Artist A1,"[""indie"",""pop""]",42,0"#);

    let rows: Vec<ArtistRecord> = read_records(&path).await.unwrap();
    assert_eq!(rows, vec![record]);
}

#[tokio::test]
async fn test_ledger_append_after_unterminated_last_row() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data/spotify_track_ids.csv");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "T1").unwrap();

    let mut ledger = Ledger::load(&path).await.unwrap();
    assert!(ledger.append("T2").unwrap());
    ledger.flush().unwrap();
    drop(ledger);

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "T1\nT2\n");
    let reloaded = Ledger::load(&path).await.unwrap();
    assert_eq!(reloaded.known(), &set(&["T1", "T2"]));
}

#[tokio::test]
async fn test_record_file_append_after_unterminated_last_row() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("spotify_track_features.csv");
    {
        let mut file: RecordFile<TrackRecord> = RecordFile::open(&path).unwrap();
        file.write(&track_record("T1")).unwrap();
        file.flush().unwrap();
    }
    let content = std::fs::read_to_string(&path).unwrap();
    std::fs::write(&path, content.trim_end_matches('\n')).unwrap();

    let mut file: RecordFile<TrackRecord> = RecordFile::open(&path).unwrap();
    assert_eq!(file.path(), path.as_path());
    file.write(&track_record("T2")).unwrap();
    file.flush().unwrap();

    assert_eq!(read_track_record_ids(&path).await.unwrap(), ids(&["T1", "T2"]));
}

#[tokio::test]
async fn test_ledger_reports_path_and_emptiness() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("spotify_artist_ids.csv");

    let mut ledger = Ledger::load(&path).await.unwrap();
    assert!(ledger.is_empty());
    assert_eq!(ledger.path(), path.as_path());

    ledger.append("A1").unwrap();
    assert!(!ledger.is_empty());
    assert_eq!(ledger.len(), 1);
}
