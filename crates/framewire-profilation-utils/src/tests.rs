use std::{thread, time::Duration};

use crate::{loggers::csv::CsvSessionLogger, ImageRecord, SessionRole, SessionStats};

fn record(label: &str, message_bytes: usize, elapsed_ms: f64) -> ImageRecord {
    ImageRecord {
        label: label.to_string(),
        message_bytes,
        elapsed_ms,
    }
}

#[test]
fn empty_session_summary_test() {
    let summary = SessionStats::new(SessionRole::Server).summary();

    assert_eq!(summary.images, 0);
    assert_eq!(summary.average_ms, 0.0);
    assert_eq!(summary.total_bytes, 0);
}

#[test]
fn session_summary_test() {
    let mut stats = SessionStats::new(SessionRole::Client);

    stats.register_bytes(1024 * 1024);
    stats.register_image(record("a.jpg", 1024 * 1024, 10.0));
    stats.register_bytes(1024 * 1024);
    stats.register_image(record("b.jpg", 1024 * 1024, 30.0));

    thread::sleep(Duration::from_millis(5));
    let summary = stats.summary();

    assert_eq!(summary.images, 2);
    assert_eq!(summary.total_megabytes(), 2.0);
    assert_eq!(summary.average_ms, 20.0);
    assert!(summary.total_time_s > 0.0);
    assert!((summary.throughput - 2.0 / summary.total_time_s).abs() < 1e-9);
    assert!((summary.bandwidth - 2.0 / summary.total_time_s).abs() < 1e-9);
}

#[test]
fn summary_block_test() {
    let mut stats = SessionStats::new(SessionRole::Client);
    stats.register_bytes(512);
    stats.register_image(record("a.jpg", 512, 4.0));

    let block = stats.summary().to_string();
    let labels: Vec<&str> = block
        .lines()
        .map(|line| line.split(':').next().unwrap())
        .collect();

    assert_eq!(
        labels,
        vec![
            "Total images sent",
            "Total data sent",
            "Average transmission time",
            "Total time",
            "Throughput",
            "Bandwidth"
        ]
    );
    assert!(block.starts_with("Total images sent: 1\n"));
    assert!(block.contains("Average transmission time: 4.00 ms"));
}

#[test]
fn metrics_share_labels_with_block_test() {
    let summary = SessionStats::new(SessionRole::Server).summary();
    let metrics = summary.to_metrics();

    assert_eq!(metrics.len(), 6);
    assert!(metrics.contains_key("Total images processed"));
    assert!(metrics.contains_key("Average processing time"));
}

#[test]
fn csv_logger_test() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.csv");

    let mut stats =
        SessionStats::new(SessionRole::Server).logger(CsvSessionLogger::new(&path).unwrap());
    stats.register_image(record("first", 100, 1.5));
    stats.register_image(record("second", 200, 2.5));
    stats.finish();

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();

    assert_eq!(lines[0], "label,message_bytes,elapsed_ms");
    assert_eq!(lines[1], "first,100,1.5");
    assert_eq!(lines.len(), 3);
}
