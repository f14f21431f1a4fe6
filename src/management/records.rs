use std::{
    fs::File,
    marker::PhantomData,
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    Res,
    management::ledger::open_append,
    types::{ArtistIdRow, TrackIdRow},
};

/// A growing CSV dataset of one row type, held open in append mode for a phase.
///
/// The header row is written only when the file was empty at the time it was opened.
pub struct RecordFile<R> {
    path: PathBuf,
    writer: csv::Writer<File>,
    written: usize,
    _row: PhantomData<R>,
}

impl<R: Serialize> RecordFile<R> {
    pub fn open(path: impl Into<PathBuf>) -> Res<Self> {
        let path = path.into();
        let file = open_append(&path)?;
        let was_empty = file.metadata()?.len() == 0;
        let writer = csv::WriterBuilder::new()
            .has_headers(was_empty)
            .from_writer(file);

        Ok(Self {
            path,
            writer,
            written: 0,
            _row: PhantomData,
        })
    }

    pub fn write(&mut self, record: &R) -> Res<()> {
        self.writer.serialize(record)?;
        self.written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Res<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Rows written through this handle.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Reads all rows of a record file; a missing file has no rows.
pub async fn read_records<R: DeserializeOwned>(path: &Path) -> Res<Vec<R>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = async_fs::read_to_string(path).await?;
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

pub async fn read_track_record_ids(path: &Path) -> Res<Vec<String>> {
    Ok(read_records::<TrackIdRow>(path)
        .await?
        .into_iter()
        .map(|row| row.track_id)
        .collect())
}

pub async fn read_artist_record_ids(path: &Path) -> Res<Vec<String>> {
    Ok(read_records::<ArtistIdRow>(path)
        .await?
        .into_iter()
        .map(|row| row.artist_id)
        .collect())
}
