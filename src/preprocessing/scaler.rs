//! Standard (z-score) feature scaling

use crate::error::{Result, SentinelError};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Per-feature mean and standard deviation computed by [`StandardScaler::fit`].
///
/// Fit once per run and immutable afterward; never persisted across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationStats {
    mean: Array1<f64>,
    std: Array1<f64>,
}

impl NormalizationStats {
    /// Per-feature means
    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    /// Per-feature standard deviations
    pub fn std(&self) -> &Array1<f64> {
        &self.std
    }

    /// Number of features these stats were fitted on
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }
}

/// Zero-mean, unit-variance feature scaler.
///
/// `fit` and `transform` are pure: stats are returned to the caller rather
/// than stored, and no input is mutated.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardScaler;

impl StandardScaler {
    /// Create a new scaler
    pub fn new() -> Self {
        Self
    }

    /// Compute per-feature mean and population standard deviation
    pub fn fit(&self, x: &Array2<f64>) -> Result<NormalizationStats> {
        if x.nrows() == 0 {
            return Err(SentinelError::EmptyDataset);
        }

        let n = x.nrows() as f64;
        let mut mean = Array1::zeros(x.ncols());
        let mut std = Array1::zeros(x.ncols());

        for j in 0..x.ncols() {
            let column = x.column(j);
            let m = column.sum() / n;
            let var = column.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n;

            mean[j] = m;
            std[j] = var.sqrt();

            if std[j] == 0.0 {
                warn!(feature = j, "zero-variance feature; scaled values pinned to 0.0");
            }
        }

        Ok(NormalizationStats { mean, std })
    }

    /// Standardize `x` using previously fitted stats.
    ///
    /// A zero-variance feature maps to exactly 0.0 for every record instead
    /// of dividing by zero.
    pub fn transform(&self, x: &Array2<f64>, stats: &NormalizationStats) -> Result<Array2<f64>> {
        if x.ncols() != stats.n_features() {
            return Err(SentinelError::ShapeError {
                expected: format!("{} features", stats.n_features()),
                actual: format!("{} features", x.ncols()),
            });
        }

        let mut out = x.clone();
        for j in 0..out.ncols() {
            let (mean, std) = (stats.mean[j], stats.std[j]);
            for i in 0..out.nrows() {
                out[[i, j]] = if std == 0.0 {
                    0.0
                } else {
                    (out[[i, j]] - mean) / std
                };
            }
        }

        Ok(out)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&self, x: &Array2<f64>) -> Result<(NormalizationStats, Array2<f64>)> {
        let stats = self.fit(x)?;
        let transformed = self.transform(x, &stats)?;
        Ok((stats, transformed))
    }
}
