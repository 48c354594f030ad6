//! Isolation Forest anomaly detection
//!
//! Ensemble of randomized partitioning trees; a record's anomaly score is
//! derived from how quickly the trees isolate it. Trees are flat node arenas
//! indexed by integer id for cache-friendly traversal.

use crate::anomaly::{AnomalyDetector, AnomalyResult};
use crate::error::{Result, SentinelError};
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Euler-Mascheroni constant, used in the path length correction
const EULER_GAMMA: f64 = 0.577_215_664_9;

/// Child id marking a leaf node
const NIL: u32 = u32::MAX;

/// Two scores closer than this carry no distinguishing signal
const SCORE_EPS: f64 = 1e-12;

/// Splits narrower than this are treated as a constant feature range
const RANGE_EPS: f64 = 1e-10;

/// One arena node. Leaves have `left == NIL`; `size` is the residual subset
/// size at truncation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Node {
    feature: u32,
    split: f64,
    left: u32,
    right: u32,
    size: u32,
}

/// A single isolation tree over a sub-sample, stored as a flat node arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    /// Recursively partition the records at `indices` into a new tree
    pub fn build(x: &Array2<f64>, indices: &[usize], max_height: usize, rng: &mut impl Rng) -> Self {
        let mut nodes = Vec::new();
        build_node(x, indices, 0, max_height, rng, &mut nodes);
        Self { nodes }
    }

    /// Path length for a sample: depth reached plus the residual subset
    /// correction at the terminal node
    pub fn path_length(&self, sample: &[f64]) -> f64 {
        let mut id = 0usize;
        let mut depth = 0.0;

        loop {
            let node = self.nodes[id];
            if node.left == NIL {
                return depth + average_path_length(node.size as usize);
            }
            id = if sample[node.feature as usize] < node.split {
                node.left as usize
            } else {
                node.right as usize
            };
            depth += 1.0;
        }
    }

    /// Number of arena nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Push the subtree for `indices` into the arena and return its node id
fn build_node(
    x: &Array2<f64>,
    indices: &[usize],
    height: usize,
    max_height: usize,
    rng: &mut impl Rng,
    nodes: &mut Vec<Node>,
) -> u32 {
    let id = nodes.len() as u32;
    nodes.push(Node {
        feature: 0,
        split: 0.0,
        left: NIL,
        right: NIL,
        size: indices.len() as u32,
    });

    if height >= max_height || indices.len() <= 1 {
        return id;
    }

    // Candidate features: non-degenerate range within the current subset
    let mut candidates = Vec::with_capacity(x.ncols());
    for feature in 0..x.ncols() {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &i in indices {
            let v = x[[i, feature]];
            min = min.min(v);
            max = max.max(v);
        }
        if max - min > RANGE_EPS {
            candidates.push((feature, min, max));
        }
    }
    if candidates.is_empty() {
        return id;
    }

    let (feature, min, max) = candidates[rng.gen_range(0..candidates.len())];
    let split = rng.gen_range(min..max);

    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) =
        indices.iter().partition(|&&i| x[[i, feature]] < split);

    // A split landing exactly on the subset minimum isolates nothing
    if left_indices.is_empty() || right_indices.is_empty() {
        return id;
    }

    let left = build_node(x, &left_indices, height + 1, max_height, rng, nodes);
    let right = build_node(x, &right_indices, height + 1, max_height, rng, nodes);

    let node = &mut nodes[id as usize];
    node.feature = feature as u32;
    node.split = split;
    node.left = left;
    node.right = right;

    id
}

/// Average path length of an unsuccessful search in a binary search tree
/// over `n` points: c(n) = 2 * H(n-1) - 2(n-1)/n
fn average_path_length(n: usize) -> f64 {
    if n <= 1 {
        0.0
    } else if n == 2 {
        1.0
    } else {
        let n = n as f64;
        2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
    }
}

/// Isolation Forest anomaly detector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationForest {
    /// Number of trees
    ensemble_size: usize,
    /// Records sampled per tree, without replacement
    sub_sample_size: usize,
    /// Target fraction of the dataset labeled anomalous
    contamination_level: f64,
    /// Random seed
    seed: Option<u64>,
    /// Fitted trees
    trees: Option<Vec<IsolationTree>>,
    /// Sub-sample size actually used during fit
    psi: Option<usize>,
    /// Score of the weakest flagged record on the fitted data
    threshold: Option<f64>,
}

impl IsolationForest {
    /// Create a forest with default parameters
    pub fn new() -> Self {
        Self {
            ensemble_size: 100,
            sub_sample_size: 256,
            contamination_level: 0.04,
            seed: None,
            trees: None,
            psi: None,
            threshold: None,
        }
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

    /// Set the target anomaly fraction
    pub fn with_contamination(mut self, level: f64) -> Self {
        self.contamination_level = level;
        self
    }

    /// Set the random seed for reproducible fits
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn validate(&self) -> Result<()> {
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

    /// Number of records flagged for `n` scores at the configured level
    fn anomaly_count(&self, n: usize) -> usize {
        ((self.contamination_level * n as f64).round() as usize).min(n)
    }

    fn compute_scores(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let trees = self.trees.as_ref().ok_or(SentinelError::ModelNotFitted)?;
        let psi = self.psi.ok_or(SentinelError::ModelNotFitted)?;

        // psi = 1 collapses every tree to a single leaf; clamp the
        // normalizer to keep the score finite
        let c_psi = average_path_length(psi).max(1.0);

        let scores: Vec<f64> = x
            .rows()
            .into_iter()
            .map(|row| {
                let sample: Vec<f64> = row.iter().copied().collect();

                let avg_path_length: f64 = trees
                    .iter()
                    .map(|tree| tree.path_length(&sample))
                    .sum::<f64>()
                    / trees.len() as f64;

                // s(x, psi) = 2^(-E[h(x)] / c(psi))
                2.0_f64.powf(-avg_path_length / c_psi)
            })
            .collect();

        Ok(Array1::from_vec(scores))
    }

    /// Label the top `contamination_level * N` scores anomalous.
    ///
    /// Descending sort with stable ties: equal scores keep original record
    /// order. When every score is identical there is no distinguishing
    /// signal and nothing is flagged.
    fn label_scores(&self, scores: &Array1<f64>) -> Array1<i32> {
        let n = scores.len();
        let mut labels = Array1::from_elem(n, 1i32);

        let k = self.anomaly_count(n);
        if k == 0 {
            return labels;
        }

        let min = scores.fold(f64::INFINITY, |a, &b| a.min(b));
        let max = scores.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        if max - min < SCORE_EPS {
            return labels;
        }

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        for &i in order.iter().take(k) {
            labels[i] = -1;
        }

        labels
    }
}

impl Default for IsolationForest {
    fn default() -> Self {
        Self::new()
    }
}

impl AnomalyDetector for IsolationForest {
    fn fit(&mut self, x: &Array2<f64>) -> Result<()> {
        self.validate()?;

        let n_samples = x.nrows();
        if n_samples == 0 {
            return Err(SentinelError::EmptyDataset);
        }

        let psi = self.sub_sample_size.min(n_samples);
        let max_height = (psi as f64).log2().ceil() as usize;
        let base_seed = self.seed.unwrap_or_else(|| thread_rng().gen());

        // Each tree draws from its own deterministic sub-stream of the seed,
        // so results are identical regardless of thread scheduling
        let trees: Vec<IsolationTree> = (0..self.ensemble_size)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(tree_idx as u64));
                let indices = rand::seq::index::sample(&mut rng, n_samples, psi).into_vec();
                IsolationTree::build(x, &indices, max_height, &mut rng)
            })
            .collect();

        self.trees = Some(trees);
        self.psi = Some(psi);

        // Threshold on the fitted data: score of the weakest flagged record
        let scores = self.compute_scores(x)?;
        let labels = self.label_scores(&scores);
        self.threshold = Some(
            scores
                .iter()
                .zip(labels.iter())
                .filter(|(_, &l)| l == -1)
                .map(|(&s, _)| s)
                .fold(f64::INFINITY, f64::min)
                .min(1.0),
        );

        Ok(())
    }

    fn score_samples(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.compute_scores(x)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<i32>> {
        let scores = self.compute_scores(x)?;
        Ok(self.label_scores(&scores))
    }

    fn detect(&self, x: &Array2<f64>) -> Result<AnomalyResult> {
        let scores = self.compute_scores(x)?;
        let labels = self.label_scores(&scores);
        let n_anomalies = labels.iter().filter(|&&l| l == -1).count();

        Ok(AnomalyResult {
            scores,
            labels,
            threshold: self.threshold(),
            n_anomalies,
        })
    }

    fn threshold(&self) -> f64 {
        self.threshold.unwrap_or(1.0)
    }
}
