//! Append-only label log
//!
//! Confirmed labels land in one flat CSV file: a fixed 7-column header
//! written exactly once when the log is first created, then one row per
//! label. Rows are never rewritten or deleted, so the log doubles as an
//! audit trail of the review session.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use earmark_common::time::{now, round3};
use earmark_common::{Error, Result};

/// One persisted label row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelRecord {
    pub record_id: String,
    pub audio_file: String,
    pub error_phrase: String,
    pub start_time: f64,
    pub end_time: f64,
    /// `end_time - start_time`, rounded like the times themselves
    pub duration: f64,
    pub labeled_at: DateTime<Utc>,
}

impl LabelRecord {
    /// Build a record with the rounding and timestamping the log applies
    pub fn new(
        record_id: String,
        audio_file: String,
        error_phrase: String,
        start_time: f64,
        end_time: f64,
    ) -> Self {
        Self {
            record_id,
            audio_file,
            error_phrase,
            start_time: round3(start_time),
            end_time: round3(end_time),
            duration: round3(end_time - start_time),
            labeled_at: now(),
        }
    }
}

/// Append-only CSV-backed label log
#[derive(Debug, Clone)]
pub struct LabelStore {
    path: PathBuf,
}

impl LabelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, writing the header first when the log is new
    pub fn append(&self, record: &LabelRecord) -> Result<()> {
        let existed = self.path.exists();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(!existed)
            .from_writer(file);

        writer
            .serialize(record)
            .map_err(|e| Error::Internal(format!("Failed to write label: {}", e)))?;
        writer
            .flush()
            .map_err(|e| Error::Internal(format!("Failed to flush label log: {}", e)))?;

        debug!(
            "Appended label for record {} to {}",
            record.record_id,
            self.path.display()
        );

        Ok(())
    }

    /// Read every record in file order; an absent log reads as empty
    pub fn read_all(&self) -> Result<Vec<LabelRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)
            .map_err(|e| Error::Internal(format!("Failed to open label log: {}", e)))?;

        let mut records = Vec::new();
        for row in reader.deserialize() {
            let record: LabelRecord =
                row.map_err(|e| Error::Internal(format!("Malformed label row: {}", e)))?;
            records.push(record);
        }

        Ok(records)
    }
}
