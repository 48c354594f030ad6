//! Threat Sentinel - local, privacy-focused log anomaly detection
//!
//! Detects anomalous events in a batch of structured log records using an
//! unsupervised isolation forest, entirely on local compute, and emits a
//! machine-readable report of flagged events. No data leaves the machine.
//!
//! # Modules
//!
//! - [`data`] - Log record model, JSONL ingestion, synthetic traffic
//! - [`preprocessing`] - Feature standardization
//! - [`anomaly`] - Isolation forest outlier scoring
//! - [`detection`] - End-to-end pipeline orchestration
//! - [`report`] - Report construction and JSON artifact emission
//!
//! # Example
//!
//! ```no_run
//! use threat_sentinel::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let dataset = TrafficGenerator::new().with_seed(42).generate(2000);
//!
//! let config = SentinelConfig::new()
//!     .with_contamination_level(0.04)
//!     .with_random_seed(42);
//!
//! let mut sentinel = Sentinel::new(config)?;
//! let outcome = sentinel.run(&dataset)?;
//!
//! println!("threats: {}", outcome.report.threats_detected);
//! # Ok(())
//! # }
//! ```

pub mod error;

pub mod data;
pub mod preprocessing;
pub mod anomaly;
pub mod detection;
pub mod report;

pub use error::{Result, SentinelError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{Result, SentinelError, Stage};

    pub use crate::data::{Dataset, IngestMode, JsonlReader, LogRecord, TrafficGenerator};

    pub use crate::preprocessing::{NormalizationStats, StandardScaler};

    pub use crate::anomaly::{AnomalyDetector, AnomalyResult, IsolationForest};

    pub use crate::detection::{RunOutcome, Sentinel, SentinelConfig};

    pub use crate::report::{Report, ReportEmitter, ReportHandle, ScoredRecord};
}
