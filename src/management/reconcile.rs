use std::{collections::HashSet, io::Write};

use tempfile::NamedTempFile;

use crate::{
    IngestError, Res,
    config::Settings,
    management::{ledger::read_ids, records::read_track_record_ids},
    utils,
};

/// What a reconciliation pass changed in the track ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Ledger ids without a track record; they will be fetched again by the next run.
    pub removed_from_ledger: Vec<String>,
    /// Track record ids the ledger did not list.
    pub added_to_ledger: Vec<String>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.removed_from_ledger.is_empty() && self.added_to_ledger.is_empty()
    }
}

/// Makes the track ledger agree with the track record file.
///
/// A crash between writing a record and appending its id leaves the two files out of
/// step. This pass rewrites the ledger so that it lists exactly the ids that have a
/// record: ledger order is kept, orphan ids are dropped, unlisted record ids are
/// appended. The rewrite goes through a temporary file in the same directory and replaces
/// the ledger atomically. Nothing is written when the files already agree.
pub async fn reconcile_track_ledger(settings: &Settings) -> Res<ReconcileReport> {
    let ledger_path = settings.track_ids_path();
    let ledger_ids = utils::dedup_preserving_order(read_ids(&ledger_path).await?);
    let record_ids = utils::dedup_preserving_order(
        read_track_record_ids(&settings.track_features_path()).await?,
    );

    let recorded: HashSet<&String> = record_ids.iter().collect();
    let listed: HashSet<&String> = ledger_ids.iter().collect();

    let report = ReconcileReport {
        removed_from_ledger: ledger_ids
            .iter()
            .filter(|id| !recorded.contains(id))
            .cloned()
            .collect(),
        added_to_ledger: record_ids
            .iter()
            .filter(|id| !listed.contains(id))
            .cloned()
            .collect(),
    };

    if report.is_clean() {
        return Ok(report);
    }

    let dir = settings.data_dir();
    async_fs::create_dir_all(&dir).await?;
    let mut staged = NamedTempFile::new_in(&dir)?;
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(staged.as_file_mut());
        for id in ledger_ids
            .iter()
            .filter(|id| recorded.contains(id))
            .chain(report.added_to_ledger.iter())
        {
            writer.write_record([id])?;
        }
        writer.flush()?;
    }
    staged.as_file_mut().flush()?;
    staged
        .persist(&ledger_path)
        .map_err(|e| IngestError::Io(e.error))?;

    Ok(report)
}
