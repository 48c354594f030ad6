//! Anomaly detection module
//!
//! Unsupervised outlier scoring over standardized feature matrices. The only
//! detector is an isolation forest; scores live in (0, 1] with higher meaning
//! more anomalous.

mod isolation_forest;

pub use isolation_forest::{IsolationForest, IsolationTree};

use crate::error::Result;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Anomaly detection result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyResult {
    /// Anomaly scores (higher = more anomalous)
    pub scores: Array1<f64>,
    /// Binary labels (-1 = anomaly, 1 = normal)
    pub labels: Array1<i32>,
    /// Score threshold separating the flagged subset
    pub threshold: f64,
    /// Number of anomalies detected
    pub n_anomalies: usize,
}

/// Trait for anomaly detectors
pub trait AnomalyDetector: Send + Sync {
    /// Fit the detector on training data
    fn fit(&mut self, x: &Array2<f64>) -> Result<()>;

    /// Compute anomaly scores for data
    fn score_samples(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Predict labels (-1 = anomaly, 1 = normal)
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<i32>>;

    /// Fit and predict in one step
    fn fit_predict(&mut self, x: &Array2<f64>) -> Result<Array1<i32>> {
        self.fit(x)?;
        self.predict(x)
    }

    /// Get detection results with scores and labels
    fn detect(&self, x: &Array2<f64>) -> Result<AnomalyResult> {
        let scores = self.score_samples(x)?;
        let labels = self.predict(x)?;
        let n_anomalies = labels.iter().filter(|&&l| l == -1).count();

        Ok(AnomalyResult {
            scores,
            labels,
            threshold: self.threshold(),
            n_anomalies,
        })
    }

    /// Get the decision threshold
    fn threshold(&self) -> f64;
}
