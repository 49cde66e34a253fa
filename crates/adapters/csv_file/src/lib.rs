//! # cardtrail-adapter-csv
//!
//! CSV file output. Implements both [`MovementLog`] (read back the identity
//! keys already written) and [`MovementSink`] (append new rows).
//!
//! The file starts with the four-column header row and is only ever
//! appended to. File I/O runs on the blocking pool.

mod error;

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use cardtrail_app::ports::{MovementLog, MovementSink};
use cardtrail_domain::error::TrackerError;
use cardtrail_domain::movement::{HEADER, IdentityKey, MovementRecord};

pub use error::CsvError;

/// Default output file name.
pub const DEFAULT_PATH: &str = "card_movements.csv";

/// Movement records stored in one CSV file.
#[derive(Debug, Clone)]
pub struct CsvMovementFile {
    path: PathBuf,
}

impl CsvMovementFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_keys(path: &Path) -> Result<Option<HashSet<IdentityKey>>, CsvError> {
    if !path.exists() {
        return Ok(None);
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;

    let mut keys = HashSet::new();
    for record in reader.records() {
        let record = record?;
        match (record.get(0), record.get(3)) {
            (Some(card_name), Some(timestamp)) => {
                keys.insert(IdentityKey::from_persisted(card_name, timestamp));
            }
            _ => {
                return Err(CsvError::ShortRow {
                    line: record.position().map_or(0, csv::Position::line),
                    found: record.len(),
                });
            }
        }
    }
    Ok(Some(keys))
}

fn append_rows(path: &Path, records: &[MovementRecord]) -> Result<(), CsvError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let needs_header = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    if needs_header {
        writer.write_record(HEADER)?;
    }
    for record in records {
        writer.write_record(record.to_row())?;
    }
    writer.flush()?;
    Ok(())
}

impl MovementLog for CsvMovementFile {
    async fn existing_keys(&self) -> Result<Option<HashSet<IdentityKey>>, TrackerError> {
        let path = self.path.clone();
        let keys = tokio::task::spawn_blocking(move || read_keys(&path))
            .await
            .map_err(CsvError::from)??;
        if let Some(keys) = &keys {
            tracing::debug!(path = %self.path.display(), count = keys.len(), "read existing rows");
        }
        Ok(keys)
    }
}

impl MovementSink for CsvMovementFile {
    async fn append(&self, records: &[MovementRecord]) -> Result<(), TrackerError> {
        if records.is_empty() {
            return Ok(());
        }
        let path = self.path.clone();
        let rows = records.to_vec();
        tokio::task::spawn_blocking(move || append_rows(&path, &rows))
            .await
            .map_err(CsvError::from)??;
        tracing::info!(path = %self.path.display(), count = records.len(), "appended rows to CSV");
        Ok(())
    }
}
