//! Threat Sentinel - entry point
//!
//! Demonstration wrapper around the detection engine: generates (or ingests)
//! a batch of logs and runs one detection pass. The engine itself is
//! agnostic to where the dataset came from.

use clap::Parser;
use std::path::PathBuf;
use threat_sentinel::prelude::*;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "threat-sentinel",
    about = "Local log anomaly detection with an isolation forest",
    version
)]
struct Cli {
    /// Number of synthetic records to generate when no input is given
    #[arg(long, default_value_t = 2000)]
    records: usize,

    /// Expected proportion of outliers in the batch
    #[arg(long, default_value_t = 0.04)]
    contamination: f64,

    /// Number of isolation trees in the ensemble
    #[arg(long, default_value_t = 100)]
    ensemble_size: usize,

    /// Records sampled per tree
    #[arg(long, default_value_t = 256)]
    sub_sample_size: usize,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// JSONL log file to analyze instead of synthetic traffic
    #[arg(long)]
    input: Option<PathBuf>,

    /// Skip malformed input records instead of aborting
    #[arg(long)]
    lenient: bool,

    /// Directory for report artifacts
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "threat_sentinel=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let dataset = match &cli.input {
        Some(path) => {
            info!(path = %path.display(), "ingesting log file");
            let mode = if cli.lenient {
                IngestMode::Lenient
            } else {
                IngestMode::Strict
            };
            JsonlReader::new().with_mode(mode).read_path(path)?
        }
        None => {
            info!(records = cli.records, "generating synthetic log entries");
            let mut generator = TrafficGenerator::new();
            if let Some(seed) = cli.seed {
                generator = generator.with_seed(seed);
            }
            generator.generate(cli.records)
        }
    };

    let mut config = SentinelConfig::new()
        .with_contamination_level(cli.contamination)
        .with_ensemble_size(cli.ensemble_size)
        .with_sub_sample_size(cli.sub_sample_size);
    if let Some(seed) = cli.seed {
        config = config.with_random_seed(seed);
    }

    let mut sentinel =
        Sentinel::new(config)?.with_emitter(ReportEmitter::new(&cli.output_dir));
    let outcome = sentinel.run(&dataset)?;

    match &outcome.handle {
        ReportHandle::Secure => info!("batch is clean"),
        ReportHandle::Written(path) => info!(
            threats = outcome.report.threats_detected,
            report = %path.display(),
            "threats flagged"
        ),
    }

    Ok(())
}
