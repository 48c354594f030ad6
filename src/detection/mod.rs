//! Detection orchestration
//!
//! Owns the end-to-end run: ingest a dataset, normalize its features, fit
//! and score the isolation forest, classify, and dispatch the report. The
//! pipeline is strictly linear with no branching back and no retries.

use crate::anomaly::{AnomalyDetector, IsolationForest};
use crate::data::Dataset;
use crate::error::{Result, SentinelError, Stage};
use crate::preprocessing::StandardScaler;
use crate::report::{Report, ReportEmitter, ReportHandle, ScoredRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Configuration for a detection run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentinelConfig {
    /// Target fraction of the dataset classified anomalous
    pub contamination_level: f64,
    /// Number of isolation trees
    pub ensemble_size: usize,
    /// Records sampled per tree
    pub sub_sample_size: usize,
    /// Seed for reproducible runs; entropy when unset
    pub random_seed: Option<u64>,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            contamination_level: 0.04,
            ensemble_size: 100,
            sub_sample_size: 256,
            random_seed: None,
        }
    }
}

impl SentinelConfig {
    /// Create a config with default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target anomaly fraction
    pub fn with_contamination_level(mut self, level: f64) -> Self {
        self.contamination_level = level;
        self
    }

    /// Set the number of trees
    pub fn with_ensemble_size(mut self, n: usize) -> Self {
        self.ensemble_size = n;
        self
    }

    /// Set the records sampled per tree
    pub fn with_sub_sample_size(mut self, n: usize) -> Self {
        self.sub_sample_size = n;
        self
    }

    /// Set the random seed
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Reject out-of-range values before a run starts
    pub fn validate(&self) -> Result<()> {
        if !(self.contamination_level > 0.0 && self.contamination_level < 1.0) {
            return Err(SentinelError::InvalidParameter {
                name: "contamination_level".to_string(),
                value: self.contamination_level.to_string(),
                reason: "must lie in (0, 1)".to_string(),
            });
        }
        if self.ensemble_size == 0 {
            return Err(SentinelError::InvalidParameter {
                name: "ensemble_size".to_string(),
                value: "0".to_string(),
                reason: "at least one tree is required".to_string(),
            });
        }
        if self.sub_sample_size == 0 {
            return Err(SentinelError::InvalidParameter {
                name: "sub_sample_size".to_string(),
                value: "0".to_string(),
                reason: "at least one record per tree is required".to_string(),
            });
        }
        Ok(())
    }

    fn build_detector(&self) -> IsolationForest {
        let mut forest = IsolationForest::new()
            .with_ensemble_size(self.ensemble_size)
            .with_sub_sample_size(self.sub_sample_size)
            .with_contamination(self.contamination_level);
        if let Some(seed) = self.random_seed {
            forest = forest.with_seed(seed);
        }
        forest
    }
}

/// Pipeline state; transitions are strictly linear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Idle,
    Ingested,
    Normalized,
    Scored,
    Reported,
}

/// Result of one detection run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// The report built from this run
    pub report: Report,
    /// Where (and whether) the report was written
    pub handle: ReportHandle,
}

/// End-to-end detection pipeline
pub struct Sentinel {
    config: SentinelConfig,
    emitter: ReportEmitter,
    state: State,
}

impl Sentinel {
    /// Create a pipeline with a validated configuration
    pub fn new(config: SentinelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            emitter: ReportEmitter::default(),
            state: State::Idle,
        })
    }

    /// Replace the report emitter
    pub fn with_emitter(mut self, emitter: ReportEmitter) -> Self {
        self.emitter = emitter;
        self
    }

    /// The active configuration
    pub fn config(&self) -> &SentinelConfig {
        &self.config
    }

    /// Run the full pipeline over `dataset`.
    ///
    /// Fit and score happen on the same data; there is no train/test split.
    /// Any failure aborts the run, resets the pipeline to idle, and surfaces
    /// the failing stage with the record count at failure. Intermediate
    /// scored records are discarded once the report is built.
    pub fn run(&mut self, dataset: &Dataset) -> Result<RunOutcome> {
        debug_assert_eq!(self.state, State::Idle, "runs never overlap");

        let total = dataset.len();
        info!(records = total, "starting detection run");

        let matrix = self.stage(Stage::Ingest, total, dataset.to_matrix())?;
        self.state = State::Ingested;
        debug!(rows = matrix.nrows(), cols = matrix.ncols(), "dataset ingested");

        let scaler = StandardScaler::new();
        let normalized = self.stage(
            Stage::Normalize,
            total,
            scaler.fit_transform(&matrix).map(|(_, m)| m),
        )?;
        self.state = State::Normalized;

        let mut detector = self.config.build_detector();
        let fitted = detector.fit(&normalized);
        let result = self.stage(
            Stage::Score,
            total,
            fitted.and_then(|()| detector.detect(&normalized)),
        )?;
        self.state = State::Scored;
        debug!(anomalies = result.n_anomalies, "scoring complete");

        let scored = ScoredRecord::from_result(dataset, &result);
        let report = Report::new(total, scored);
        let handle = self.stage(Stage::Report, total, self.emitter.emit(&report))?;
        self.state = State::Reported;

        info!(
            threats = report.threats_detected,
            scanned = report.total_scanned,
            "detection run complete"
        );

        self.state = State::Idle;
        Ok(RunOutcome { report, handle })
    }

    /// Wrap a stage result with failure context and reset on error
    fn stage<T>(&mut self, stage: Stage, records: usize, result: Result<T>) -> Result<T> {
        result.map_err(|e| {
            self.state = State::Idle;
            SentinelError::Pipeline {
                stage,
                records,
                source: Box::new(e),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SentinelConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_contamination_of_one() {
        let config = SentinelConfig::new().with_contamination_level(1.0);
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            SentinelError::InvalidParameter { name, .. } if name == "contamination_level"
        ));
    }

    #[test]
    fn test_rejects_zero_ensemble() {
        let config = SentinelConfig::new().with_ensemble_size(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_constructor_validates() {
        let config = SentinelConfig::new().with_contamination_level(-0.1);
        assert!(Sentinel::new(config).is_err());
    }
}
