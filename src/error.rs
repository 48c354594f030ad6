//! Error types for the threat sentinel engine

use std::fmt;
use thiserror::Error;

/// Result type alias for sentinel operations
pub type Result<T> = std::result::Result<T, SentinelError>;

/// Pipeline stage in which a failure occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ingest,
    Normalize,
    Score,
    Report,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Ingest => "ingest",
            Stage::Normalize => "normalize",
            Stage::Score => "score",
            Stage::Report => "report",
        };
        f.write_str(name)
    }
}

/// Main error type for the sentinel engine
#[derive(Error, Debug)]
pub enum SentinelError {
    #[error("empty dataset: no records to process")]
    EmptyDataset,

    #[error("schema mismatch at record {record}: {reason}")]
    SchemaMismatch { record: usize, reason: String },

    #[error("model not fitted")]
    ModelNotFitted,

    #[error("invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("{stage} stage failed with {records} records: {source}")]
    Pipeline {
        stage: Stage,
        records: usize,
        #[source]
        source: Box<SentinelError>,
    },
}

impl From<serde_json::Error> for SentinelError {
    fn from(err: serde_json::Error) -> Self {
        SentinelError::Serialization(err.to_string())
    }
}

impl From<ndarray::ShapeError> for SentinelError {
    fn from(err: ndarray::ShapeError) -> Self {
        SentinelError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
