//! Append-only JSONL store
//!
//! One post per line. The file is only ever opened in append mode, so a run
//! can never damage what earlier runs wrote.

use crate::post::PostRecord;
use crate::storage::traits::{RecordSink, StorageError, StorageResult};
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// JSONL file holding every post harvested from one board
#[derive(Debug, Clone)]
pub struct JsonlStore {
    path: PathBuf,
}

impl JsonlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl RecordSink for JsonlStore {
    fn append_batch(&mut self, records: &[PostRecord]) -> StorageResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        let mut writer = BufWriter::new(file);

        for record in records {
            serde_json::to_writer(&mut writer, record).map_err(|source| {
                StorageError::Serialization {
                    post_id: record.post_id,
                    source,
                }
            })?;
            writer.write_all(b"\n").map_err(|e| self.io_error(e))?;
        }

        writer.flush().map_err(|e| self.io_error(e))?;
        tracing::info!("Saved {} posts to {}", records.len(), self.path.display());
        Ok(())
    }
}
