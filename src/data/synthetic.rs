//! Synthetic traffic generation
//!
//! Demonstration collaborator standing in for a production log source. The
//! detection engine itself never depends on where a dataset came from.

use crate::data::{Dataset, LogRecord};
use chrono::{Duration, Utc};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

const NORMAL_PORTS: [u16; 3] = [80, 443, 8080];
const SENSITIVE_PORTS: [u16; 4] = [22, 23, 445, 3389];
const ATTACK_STATUS_CODES: [u16; 3] = [401, 403, 500];

/// Generates synthetic server logs mixing normal and attack traffic
#[derive(Debug, Clone)]
pub struct TrafficGenerator {
    attack_ratio: f64,
    seed: Option<u64>,
}

impl TrafficGenerator {
    /// Create a generator with a 5% attack mix
    pub fn new() -> Self {
        Self {
            attack_ratio: 0.05,
            seed: None,
        }
    }

    /// Set the fraction of attack traffic
    pub fn with_attack_ratio(mut self, ratio: f64) -> Self {
        self.attack_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Set the random seed for reproducible datasets
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Generate `num_records` log entries scattered over the trailing 24h
    pub fn generate(&self, num_records: usize) -> Dataset {
        let mut rng = match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let base_time = Utc::now();
        let mut records = Vec::with_capacity(num_records);

        for _ in 0..num_records {
            let timestamp = base_time - Duration::seconds(rng.gen_range(0..86_400));
            let is_attack = rng.gen::<f64>() < self.attack_ratio;

            let record = if is_attack {
                // Attack pattern: oversized payloads against sensitive ports
                LogRecord {
                    timestamp,
                    payload_size: rng.gen_range(5_000..=15_000),
                    port: SENSITIVE_PORTS[rng.gen_range(0..SENSITIVE_PORTS.len())],
                    response_time: rng.gen_range(0.1..0.5),
                    status_code: ATTACK_STATUS_CODES[rng.gen_range(0..ATTACK_STATUS_CODES.len())],
                }
            } else {
                LogRecord {
                    timestamp,
                    payload_size: rng.gen_range(100..=2_000),
                    port: NORMAL_PORTS[rng.gen_range(0..NORMAL_PORTS.len())],
                    response_time: rng.gen_range(0.05..1.2),
                    status_code: 200,
                }
            };

            records.push(record);
        }

        Dataset::from_records(records)
    }
}

impl Default for TrafficGenerator {
    fn default() -> Self {
        Self::new()
    }
}
