//! Feature normalization
//!
//! Standardizes raw numeric features to zero mean and unit variance so the
//! detector treats every dimension at comparable scale.

mod scaler;

pub use scaler::{NormalizationStats, StandardScaler};
