//! Report artifact emission

use super::Report;
use crate::error::Result;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome of emitting a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportHandle {
    /// No anomalies detected; nothing was written
    Secure,
    /// Report written to the given path
    Written(PathBuf),
}

impl ReportHandle {
    /// Path of the written artifact, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            ReportHandle::Secure => None,
            ReportHandle::Written(path) => Some(path),
        }
    }
}

/// Writes reports as uniquely named JSON artifacts.
///
/// Emission is append-only: a prior report is never overwritten or mutated.
/// Artifact names embed the scan timestamp to second precision; collisions
/// within the same second are accepted.
#[derive(Debug, Clone)]
pub struct ReportEmitter {
    output_dir: PathBuf,
}

impl ReportEmitter {
    /// Create an emitter writing into `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Serialize `report` to a timestamped JSON file.
    ///
    /// A report with zero threats performs no write and reports secure
    /// status instead.
    pub fn emit(&self, report: &Report) -> Result<ReportHandle> {
        if report.is_secure() {
            info!(
                scanned = report.total_scanned,
                "no anomalies detected in the current batch"
            );
            return Ok(ReportHandle::Secure);
        }

        warn!(
            threats = report.threats_detected,
            scanned = report.total_scanned,
            "detected potential threats"
        );

        fs::create_dir_all(&self.output_dir)?;
        let filename = format!("security_report_{}.json", Utc::now().format("%Y%m%d_%H%M%S"));
        let path = self.output_dir.join(filename);

        let json = serde_json::to_string_pretty(report)?;
        fs::write(&path, json)?;

        info!(path = %path.display(), "detailed report saved");
        Ok(ReportHandle::Written(path))
    }
}

impl Default for ReportEmitter {
    fn default() -> Self {
        Self::new(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ScoredRecord;

    fn flagged_report() -> Report {
        Report::new(
            5,
            vec![ScoredRecord {
                timestamp: "2026-08-06 09:00:01.000000".to_string(),
                payload_size: 12_000,
                port: 3389,
                response_time: 0.1,
                status_code: 500,
                anomaly_score: 0.81,
                is_anomaly: true,
            }],
        )
    }

    #[test]
    fn test_secure_report_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let emitter = ReportEmitter::new(dir.path());

        let handle = emitter.emit(&Report::new(5, Vec::new())).unwrap();

        assert_eq!(handle, ReportHandle::Secure);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_flagged_report_writes_parseable_json() {
        let dir = tempfile::tempdir().unwrap();
        let emitter = ReportEmitter::new(dir.path());

        let handle = emitter.emit(&flagged_report()).unwrap();
        let path = handle.path().expect("artifact path").to_path_buf();

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("security_report_"));
        assert!(name.ends_with(".json"));

        let parsed: Report = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.threats_detected, 1);
        assert_eq!(parsed.threat_details[0].port, 3389);
    }

    #[test]
    fn test_creates_missing_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("reports").join("daily");
        let emitter = ReportEmitter::new(&nested);

        let handle = emitter.emit(&flagged_report()).unwrap();
        assert!(handle.path().unwrap().starts_with(&nested));
    }
}
