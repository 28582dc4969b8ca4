//! CSV-backed record store.
//!
//! One row per cleaned record, headers written when the file is created.
//! History reads re-open the file on every call so imputation always sees
//! the latest ingested data; concurrent readers need no locking.

use anyhow::Result;
use chrono::Utc;
use csv::WriterBuilder;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{MAX_PASSENGER, MIN_PASSENGER};
use crate::impute::PassengerHistory;
use crate::record::{CanonicalRecord, StoredRecord};

pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a cleaned record, assigning the next sequential id and a
    /// UTC creation timestamp. Headers are written only when the file does
    /// not exist yet.
    pub fn append(&self, record: &CanonicalRecord) -> Result<StoredRecord> {
        let next_id = self.load_all()?.len() as u64 + 1;
        let stored = StoredRecord::from_canonical(next_id, record, Utc::now().naive_utc());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file_exists = self.path.exists();
        debug!(path = %self.path.display(), file_exists, "Appending record row");

        let file = OpenOptions::new().append(true).create(true).open(&self.path)?;
        let mut writer = WriterBuilder::new()
            .has_headers(!file_exists) // IMPORTANT when appending
            .from_writer(file);
        writer.serialize(&stored)?;
        writer.flush()?;

        Ok(stored)
    }

    /// Reads every stored record. A missing file is an empty store.
    pub fn load_all(&self) -> Result<Vec<StoredRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let mut reader = csv::Reader::from_reader(file);
        let mut rows = Vec::new();
        for result in reader.deserialize() {
            let record: StoredRecord = result?;
            rows.push(record);
        }
        Ok(rows)
    }

    /// Lists stored records with offset/limit pagination.
    pub fn list(&self, limit: usize, offset: usize) -> Result<Vec<StoredRecord>> {
        let rows = self.load_all()?;
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }
}

impl PassengerHistory for CsvStore {
    fn valid_passenger_counts(&self) -> Result<Vec<i64>> {
        let counts = self
            .load_all()?
            .into_iter()
            .map(|r| r.passenger_count)
            .filter(|c| (MIN_PASSENGER..=MAX_PASSENGER).contains(c))
            .collect();
        Ok(counts)
    }
}
