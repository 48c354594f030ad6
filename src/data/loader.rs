//! Line-delimited JSON log ingestion

use crate::data::{Dataset, LogRecord};
use crate::error::{Result, SentinelError};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::warn;

/// Strictness towards malformed records during ingest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IngestMode {
    /// Abort the whole ingest on the first malformed record
    #[default]
    Strict,
    /// Skip malformed records, keep the rest
    Lenient,
}

/// Reader for JSONL log files, one record per line
#[derive(Debug, Clone, Default)]
pub struct JsonlReader {
    mode: IngestMode,
}

impl JsonlReader {
    /// Create a strict reader
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ingest mode
    pub fn with_mode(mut self, mode: IngestMode) -> Self {
        self.mode = mode;
        self
    }

    /// Read a dataset from a file path
    pub fn read_path(&self, path: impl AsRef<Path>) -> Result<Dataset> {
        let file = File::open(path)?;
        self.read(file)
    }

    /// Read a dataset from any byte source
    pub fn read(&self, source: impl Read) -> Result<Dataset> {
        let mut records = Vec::new();
        let mut dropped = 0usize;

        for (idx, line) in BufReader::new(source).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<LogRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => match self.mode {
                    IngestMode::Strict => {
                        return Err(SentinelError::SchemaMismatch {
                            record: idx + 1,
                            reason: e.to_string(),
                        });
                    }
                    IngestMode::Lenient => {
                        dropped += 1;
                        warn!(line = idx + 1, error = %e, "skipping malformed record");
                    }
                },
            }
        }

        if dropped > 0 {
            warn!(dropped, kept = records.len(), "ingest dropped malformed records");
        }

        Ok(Dataset::from_records(records))
    }
}
