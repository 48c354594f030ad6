//! Report construction and emission

mod emitter;

pub use emitter::{ReportEmitter, ReportHandle};

use crate::anomaly::AnomalyResult;
use crate::data::{Dataset, LogRecord};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Timestamp rendering used in report artifacts
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// A record paired with its anomaly score and classification.
///
/// Derived from a [`LogRecord`] and a detection result; timestamps are
/// rendered as text for the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub timestamp: String,
    pub payload_size: u64,
    pub port: u16,
    pub response_time: f64,
    pub status_code: u16,
    pub anomaly_score: f64,
    pub is_anomaly: bool,
}

impl ScoredRecord {
    fn new(record: &LogRecord, anomaly_score: f64, is_anomaly: bool) -> Self {
        Self {
            timestamp: record.timestamp.format(TIME_FORMAT).to_string(),
            payload_size: record.payload_size,
            port: record.port,
            response_time: record.response_time,
            status_code: record.status_code,
            anomaly_score,
            is_anomaly,
        }
    }

    /// Pair every record in `dataset` with its detection result, in order
    pub fn from_result(dataset: &Dataset, result: &AnomalyResult) -> Vec<ScoredRecord> {
        dataset
            .records()
            .iter()
            .zip(result.scores.iter().zip(result.labels.iter()))
            .map(|(record, (&score, &label))| Self::new(record, score, label == -1))
            .collect()
    }
}

/// Write-once snapshot of one detection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Scan timestamp, rendered as text
    pub scan_time: String,
    /// Total records scanned
    pub total_scanned: usize,
    /// Number of records classified anomalous
    pub threats_detected: usize,
    /// Anomalous records, in original record order
    pub threat_details: Vec<ScoredRecord>,
}

impl Report {
    /// Build a report from the scored records of a run, keeping only the
    /// anomalous subset in `threat_details`
    pub fn new(total_scanned: usize, scored: Vec<ScoredRecord>) -> Self {
        let threat_details: Vec<ScoredRecord> =
            scored.into_iter().filter(|r| r.is_anomaly).collect();

        Self {
            scan_time: Utc::now().format(TIME_FORMAT).to_string(),
            total_scanned,
            threats_detected: threat_details.len(),
            threat_details,
        }
    }

    /// True when no record was classified anomalous
    pub fn is_secure(&self) -> bool {
        self.threats_detected == 0
    }
}
