//! Integration tests: full detection pipeline (ingest → normalize → score → report)

use chrono::{TimeZone, Utc};
use threat_sentinel::prelude::*;

fn record(payload_size: u64, port: u16, response_time: f64, status_code: u16) -> LogRecord {
    LogRecord {
        timestamp: Utc.with_ymd_and_hms(2026, 8, 6, 12, 0, 0).unwrap(),
        payload_size,
        port,
        response_time,
        status_code,
    }
}

/// 19 records of ordinary web traffic plus one blatant outlier
fn baseline_with_outlier() -> Dataset {
    let mut records: Vec<LogRecord> = (0..19)
        .map(|i| {
            record(
                100 + i * 100,
                if i % 2 == 0 { 80 } else { 443 },
                0.1 + i as f64 * 0.05,
                200,
            )
        })
        .collect();

    records.push(record(12_000, 3389, 0.2, 500));
    Dataset::from_records(records)
}

#[test]
fn test_flags_the_single_outlier() {
    let dataset = baseline_with_outlier();
    let dir = tempfile::tempdir().unwrap();

    let config = SentinelConfig::new()
        .with_contamination_level(0.05)
        .with_random_seed(42);
    let mut sentinel = Sentinel::new(config)
        .unwrap()
        .with_emitter(ReportEmitter::new(dir.path()));

    let outcome = sentinel.run(&dataset).unwrap();

    assert_eq!(outcome.report.total_scanned, 20);
    assert_eq!(outcome.report.threats_detected, 1);

    let threat = &outcome.report.threat_details[0];
    assert_eq!(threat.payload_size, 12_000);
    assert_eq!(threat.port, 3389);
    assert!(threat.is_anomaly);

    // the artifact exists and parses back
    let path = match &outcome.handle {
        ReportHandle::Written(path) => path.clone(),
        ReportHandle::Secure => panic!("expected a written report"),
    };
    let parsed: Report =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(parsed.threats_detected, 1);
    assert_eq!(parsed.threat_details[0].port, 3389);
}

#[test]
fn test_outlier_scores_above_every_normal_record() {
    let dataset = baseline_with_outlier();
    let matrix = dataset.to_matrix().unwrap();
    let (_, normalized) = StandardScaler::new().fit_transform(&matrix).unwrap();

    let mut forest = IsolationForest::new()
        .with_contamination(0.05)
        .with_seed(42);
    forest.fit(&normalized).unwrap();
    let scores = forest.score_samples(&normalized).unwrap();

    let outlier_score = scores[19];
    for i in 0..19 {
        assert!(
            outlier_score > scores[i],
            "outlier score {outlier_score} not above record {i} ({})",
            scores[i]
        );
    }
}

#[test]
fn test_empty_dataset_aborts_without_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let mut sentinel = Sentinel::new(SentinelConfig::default())
        .unwrap()
        .with_emitter(ReportEmitter::new(dir.path()));

    let err = sentinel.run(&Dataset::new()).unwrap_err();
    match err {
        SentinelError::Pipeline {
            stage: Stage::Ingest,
            records,
            source,
        } => {
            assert_eq!(records, 0);
            assert!(matches!(*source, SentinelError::EmptyDataset));
        }
        other => panic!("expected ingest failure, got {other}"),
    }

    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_identical_records_report_secure() {
    let dataset = Dataset::from_records(vec![record(500, 80, 0.3, 200); 50]);
    let dir = tempfile::tempdir().unwrap();

    let config = SentinelConfig::new()
        .with_contamination_level(0.1)
        .with_random_seed(7);
    let mut sentinel = Sentinel::new(config)
        .unwrap()
        .with_emitter(ReportEmitter::new(dir.path()));

    let outcome = sentinel.run(&dataset).unwrap();

    assert_eq!(outcome.report.threats_detected, 0);
    assert_eq!(outcome.handle, ReportHandle::Secure);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let dataset = TrafficGenerator::new().with_seed(11).generate(300);
    let dir = tempfile::tempdir().unwrap();

    let config = SentinelConfig::new()
        .with_contamination_level(0.05)
        .with_random_seed(99);

    let mut first = Sentinel::new(config.clone())
        .unwrap()
        .with_emitter(ReportEmitter::new(dir.path()));
    let mut second = Sentinel::new(config)
        .unwrap()
        .with_emitter(ReportEmitter::new(dir.path()));

    let a = first.run(&dataset).unwrap();
    let b = second.run(&dataset).unwrap();

    assert_eq!(a.report.threats_detected, b.report.threats_detected);
    assert_eq!(a.report.threat_details, b.report.threat_details);
}

#[test]
fn test_anomaly_count_matches_contamination_level() {
    let dataset = TrafficGenerator::new().with_seed(11).generate(200);
    let matrix = dataset.to_matrix().unwrap();
    let (_, normalized) = StandardScaler::new().fit_transform(&matrix).unwrap();

    let mut forest = IsolationForest::new()
        .with_contamination(0.04)
        .with_seed(5);
    forest.fit(&normalized).unwrap();
    let result = forest.detect(&normalized).unwrap();

    // round(0.04 * 200) = 8
    assert_eq!(result.n_anomalies, 8);
    assert_eq!(result.labels.iter().filter(|&&l| l == -1).count(), 8);
}

#[test]
fn test_single_record_run_completes() {
    let dataset = Dataset::from_records(vec![record(1500, 443, 0.25, 200)]);
    let dir = tempfile::tempdir().unwrap();

    let config = SentinelConfig::new().with_random_seed(3);
    let mut sentinel = Sentinel::new(config)
        .unwrap()
        .with_emitter(ReportEmitter::new(dir.path()));

    let outcome = sentinel.run(&dataset).unwrap();

    // round(0.04 * 1) = 0 flagged records
    assert_eq!(outcome.report.total_scanned, 1);
    assert_eq!(outcome.report.threats_detected, 0);
    assert_eq!(outcome.handle, ReportHandle::Secure);
}

#[test]
fn test_synthetic_attack_traffic_is_flagged() {
    // a heavier run in the shape of the demo binary
    let dataset = TrafficGenerator::new()
        .with_attack_ratio(0.05)
        .with_seed(2026)
        .generate(1000);
    let dir = tempfile::tempdir().unwrap();

    let config = SentinelConfig::new()
        .with_contamination_level(0.05)
        .with_random_seed(2026);
    let mut sentinel = Sentinel::new(config)
        .unwrap()
        .with_emitter(ReportEmitter::new(dir.path()));

    let outcome = sentinel.run(&dataset).unwrap();

    assert_eq!(outcome.report.threats_detected, 50);

    // flagged traffic should skew heavily towards the attack profile
    let attack_like = outcome
        .report
        .threat_details
        .iter()
        .filter(|t| t.payload_size >= 5_000)
        .count();
    assert!(
        attack_like * 2 > outcome.report.threats_detected,
        "only {attack_like} of {} flagged records look like attacks",
        outcome.report.threats_detected
    );
}
