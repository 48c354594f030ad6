//! Log record data model and ingestion
//!
//! Records carry a fixed numeric feature schema plus an opaque timestamp.
//! The timestamp is not a model feature; it is carried through untouched
//! for reporting.

mod loader;
mod synthetic;

pub use loader::{IngestMode, JsonlReader};
pub use synthetic::TrafficGenerator;

use crate::error::{Result, SentinelError};
use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Numeric features consumed by the detector, in matrix column order
pub const FEATURE_NAMES: [&str; 4] = ["payload_size", "port", "response_time", "status_code"];

/// One structured log observation. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub payload_size: u64,
    pub port: u16,
    pub response_time: f64,
    pub status_code: u16,
}

impl LogRecord {
    /// Feature vector in [`FEATURE_NAMES`] order
    pub fn features(&self) -> [f64; 4] {
        [
            self.payload_size as f64,
            f64::from(self.port),
            self.response_time,
            f64::from(self.status_code),
        ]
    }
}

/// Ordered collection of records sharing the fixed feature schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<LogRecord>,
}

impl Dataset {
    /// Create an empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dataset from existing records
    pub fn from_records(records: Vec<LogRecord>) -> Self {
        Self { records }
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the dataset holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append a record
    pub fn push(&mut self, record: LogRecord) {
        self.records.push(record);
    }

    /// All records, in ingestion order
    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    /// Build the N x 4 feature matrix over [`FEATURE_NAMES`]
    pub fn to_matrix(&self) -> Result<Array2<f64>> {
        if self.records.is_empty() {
            return Err(SentinelError::EmptyDataset);
        }

        let mut matrix = Array2::zeros((self.len(), FEATURE_NAMES.len()));
        for (i, record) in self.records.iter().enumerate() {
            for (j, value) in record.features().into_iter().enumerate() {
                matrix[[i, j]] = value;
            }
        }

        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_record() -> LogRecord {
        LogRecord {
            timestamp: Utc.with_ymd_and_hms(2026, 8, 6, 10, 30, 0).unwrap(),
            payload_size: 1500,
            port: 443,
            response_time: 0.25,
            status_code: 200,
        }
    }

    #[test]
    fn test_feature_vector_order() {
        let record = sample_record();
        assert_eq!(record.features(), [1500.0, 443.0, 0.25, 200.0]);
    }

    #[test]
    fn test_to_matrix_shape() {
        let dataset = Dataset::from_records(vec![sample_record(), sample_record()]);
        let matrix = dataset.to_matrix().unwrap();
        assert_eq!(matrix.dim(), (2, 4));
        assert_eq!(matrix[[0, 0]], 1500.0);
        assert_eq!(matrix[[1, 3]], 200.0);
    }

    #[test]
    fn test_to_matrix_rejects_empty() {
        let err = Dataset::new().to_matrix().unwrap_err();
        assert!(matches!(err, SentinelError::EmptyDataset));
    }
}
