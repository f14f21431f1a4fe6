use std::collections::HashSet;

use tabled::Table;

use crate::{
    Res,
    config::Settings,
    info,
    management::{
        ledger::read_ids,
        records::{read_artist_record_ids, read_track_record_ids},
    },
    types::DatasetTableRow,
    utils,
};

/// Prints ledger and record counts for both datasets.
///
/// For artists, `ledger_without_record` counts the artists that were discovered but never
/// enriched, typically because their batch was skipped.
pub async fn status(settings: &Settings) -> Res<Vec<DatasetTableRow>> {
    let rows = dataset_status(settings).await?;

    info!("Storage root: {}", settings.storage_root.display());
    println!("{}", Table::new(rows.iter().cloned()));
    Ok(rows)
}

pub async fn dataset_status(settings: &Settings) -> Res<Vec<DatasetTableRow>> {
    let track_ledger = utils::dedup_preserving_order(read_ids(&settings.track_ids_path()).await?);
    let track_records = read_track_record_ids(&settings.track_features_path()).await?;
    let artist_ledger =
        utils::dedup_preserving_order(read_ids(&settings.artist_ids_path()).await?);
    let artist_records = read_artist_record_ids(&settings.artist_features_path()).await?;

    Ok(vec![
        row("tracks", &track_ledger, &track_records),
        row("artists", &artist_ledger, &artist_records),
    ])
}

fn row(dataset: &str, ledger: &[String], records: &[String]) -> DatasetTableRow {
    let recorded: HashSet<&String> = records.iter().collect();
    DatasetTableRow {
        dataset: dataset.to_string(),
        ledger_ids: ledger.len(),
        records: records.len(),
        ledger_without_record: ledger.iter().filter(|id| !recorded.contains(id)).count(),
    }
}
