use std::{
    collections::HashSet,
    fs::{File, OpenOptions},
    io::{Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use crate::{IngestError, Res, utils};

/// Append-only record of the ids of one kind that earlier runs already ingested.
///
/// The file holds one id per row. It is read fully when a phase starts and then only
/// appended to; an id is never written twice.
pub struct Ledger {
    path: PathBuf,
    known: HashSet<String>,
    writer: Option<csv::Writer<File>>,
}

impl Ledger {
    /// Reads the ledger at `path`. A missing file is an empty ledger.
    pub async fn load(path: impl Into<PathBuf>) -> Res<Self> {
        let path = path.into();
        let known = load_known_ids(&path).await?;
        Ok(Self {
            path,
            known,
            writer: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn known(&self) -> &HashSet<String> {
        &self.known
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.known.contains(id)
    }

    pub fn filter_new(&self, candidates: &[String]) -> Vec<String> {
        utils::filter_new(candidates, &self.known)
    }

    /// Opens the ledger file for appending. The handle stays open until the ledger is
    /// dropped.
    pub fn open(&mut self) -> Res<()> {
        if self.writer.is_none() {
            let file = open_append(&self.path)?;
            self.writer = Some(
                csv::WriterBuilder::new()
                    .has_headers(false)
                    .from_writer(file),
            );
        }
        Ok(())
    }

    /// Appends `id` unless it is already known. Returns whether a row was written.
    pub fn append(&mut self, id: &str) -> Res<bool> {
        if self.known.contains(id) {
            return Ok(false);
        }
        self.open()?;
        if let Some(writer) = self.writer.as_mut() {
            writer.write_record([id])?;
        }
        self.known.insert(id.to_string());
        Ok(true)
    }

    pub fn flush(&mut self) -> Res<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}

/// Reads the set of known ids from a ledger file; empty when the file does not exist.
pub async fn load_known_ids(path: &Path) -> Res<HashSet<String>> {
    Ok(read_ids(path).await?.into_iter().collect())
}

/// Reads the ids of a one-id-per-row file in file order. A missing file reads as empty.
pub async fn read_ids(path: &Path) -> Res<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = async_fs::read_to_string(path).await?;
    parse_id_rows(&content)
}

/// Reads the playlist ids to crawl, deduplicated in file order.
///
/// # Errors
///
/// [`IngestError::PlaylistFileMissing`] when the input file does not exist.
pub async fn load_playlist_ids(path: &Path) -> Res<Vec<String>> {
    if !path.exists() {
        return Err(IngestError::PlaylistFileMissing(path.to_path_buf()));
    }
    let content = async_fs::read_to_string(path).await?;
    Ok(utils::dedup_preserving_order(parse_id_rows(&content)?))
}

/// Takes the first column of every non-blank row. A leading byte order mark is ignored.
pub fn parse_id_rows(content: &str) -> Res<Vec<String>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut ids = Vec::new();
    for row in reader.records() {
        let row = row?;
        if let Some(id) = row.get(0).map(str::trim).filter(|id| !id.is_empty()) {
            ids.push(id.to_string());
        }
    }
    Ok(ids)
}

/// Opens `path` for appending rows. A non-empty file whose last row lacks its line
/// terminator gets one first, so the next row never merges into it.
pub(crate) fn open_append(path: &Path) -> Res<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)?;

    if file.metadata()?.len() > 0 {
        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1))?;
        file.read_exact(&mut last)?;
        if last[0] != b'\n' {
            file.write_all(b"\n")?;
        }
    }
    Ok(file)
}
