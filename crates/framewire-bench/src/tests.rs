use std::{
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use framewire_core::{
    error::{Result, WireError},
    strategy::Strategy,
};
use framewire_profilation_utils::{SessionRole, SessionSummary};

use crate::{
    metrics::{extract_metrics, metrics_from_summary, MetricValue},
    BenchmarkConfiguration, BenchmarkResult, Orchestrator, PeerLauncher, PeerProcess,
    ProcessLauncher,
};

const CLIENT_OUTPUT: &str = "Found 3 images for the benchmark

Benchmark Stream Summary:
Total images sent: 6
Total data sent: 1.25 MB
Average transmission time: 12.50 ms
Total time: 0.80 s
Throughput: 7.50 img/s
Bandwidth: 1.56 MB/s
";

#[derive(Default)]
struct Journal {
    started: Vec<Strategy>,
    stopped: Vec<Strategy>,
}

struct FakeServer {
    strategy: Strategy,
    journal: Arc<Mutex<Journal>>,
}

#[async_trait]
impl PeerProcess for FakeServer {
    async fn await_ready(&mut self, _warmup: Duration) -> Result<()> {
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        self.journal.lock().unwrap().stopped.push(self.strategy);
        Ok(())
    }
}

struct FakeLauncher {
    failing: Vec<Strategy>,
    journal: Arc<Mutex<Journal>>,
}

impl FakeLauncher {
    fn failing(failing: Vec<Strategy>) -> Self {
        Self {
            failing,
            journal: Arc::new(Mutex::new(Journal::default())),
        }
    }
}

#[async_trait]
impl PeerLauncher for FakeLauncher {
    async fn start_server(&self, strategy: Strategy) -> Result<Box<dyn PeerProcess>> {
        self.journal.lock().unwrap().started.push(strategy);

        Ok(Box::new(FakeServer {
            strategy,
            journal: self.journal.clone(),
        }))
    }

    async fn run_client(
        &self,
        strategy: Strategy,
        _image_dir: &Path,
        _iterations: usize,
    ) -> Result<BenchmarkResult> {
        if self.failing.contains(&strategy) {
            return Err(WireError::Process(format!("Client {} failed", strategy)));
        }

        let output = CLIENT_OUTPUT.replace("Stream", strategy.title());
        Ok(BenchmarkResult {
            metrics: extract_metrics(&output),
            output,
        })
    }
}

fn fast_config() -> BenchmarkConfiguration {
    let mut config = BenchmarkConfiguration::new("images");
    config.warmup = Duration::ZERO;
    config
}

#[test]
fn extract_metrics_test() {
    let metrics = extract_metrics(CLIENT_OUTPUT);

    assert_eq!(metrics.len(), 6);
    assert_eq!(metrics["Total images sent"], MetricValue::Number(6.0));
    assert_eq!(metrics["Total data sent"], MetricValue::Number(1.25));
    assert_eq!(metrics["Average transmission time"], MetricValue::Number(12.5));
    assert_eq!(metrics["Total time"], MetricValue::Number(0.8));
    assert_eq!(metrics["Throughput"], MetricValue::Number(7.5));
    assert_eq!(metrics["Bandwidth"], MetricValue::Number(1.56));
}

#[test]
fn extract_metrics_lenient_test() {
    let output = "Sending image: a.png\nBenchmark Matrix Summary:\nTotal time: n/a\nThroughput: 3 frames\n";
    let metrics = extract_metrics(output);

    assert!(!metrics.contains_key("Sending image"));
    assert_eq!(metrics["Total time"], MetricValue::Text("n/a".to_string()));
    assert_eq!(
        metrics["Throughput"],
        MetricValue::Text("3 frames".to_string())
    );
    assert_eq!(metrics["Throughput"].as_number(), Some(3.0));
    assert_eq!(metrics["Total time"].as_number(), None);
}

#[test]
fn extract_metrics_without_summary_test() {
    assert!(extract_metrics("Could not process any image correctly\n").is_empty());
}

#[test]
fn metrics_from_summary_test() {
    let summary = SessionSummary {
        role: SessionRole::Client,
        images: 4,
        total_bytes: 2 * 1024 * 1024,
        average_ms: 10.0,
        total_time_s: 2.0,
        throughput: 2.0,
        bandwidth: 1.0,
    };

    let metrics = metrics_from_summary(&summary);

    assert_eq!(metrics["Total images sent"], MetricValue::Number(4.0));
    assert_eq!(metrics["Total data sent"], MetricValue::Number(2.0));
    assert_eq!(metrics["Throughput"], MetricValue::Number(2.0));
}

#[tokio::test]
async fn failing_client_excluded_test() {
    let launcher = FakeLauncher::failing(vec![Strategy::RawBinary]);
    let journal = launcher.journal.clone();

    let report = Orchestrator::new(fast_config(), launcher).run().await;

    assert!(!report.interrupted);
    assert_eq!(
        report.results.keys().copied().collect::<Vec<_>>(),
        vec![
            Strategy::TextEnvelope,
            Strategy::StructuredMatrix,
            Strategy::FragmentedStream
        ]
    );

    let table = report.table();
    assert!(table.contains("base64"));
    assert!(table.contains("stream"));
    assert!(!table.contains("binary"));

    let dir = tempfile::tempdir().unwrap();
    let results_path = dir.path().join("benchmark_results.json");
    report.write_results(&results_path).unwrap();

    let dumped: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&results_path).unwrap()).unwrap();
    assert!(dumped.get("binary").is_none());
    assert_eq!(dumped["matrix"]["metrics"]["Throughput"], 7.5);

    let journal = journal.lock().unwrap();
    assert_eq!(journal.started, Strategy::all().to_vec());
    assert_eq!(journal.stopped, Strategy::all().to_vec());
}

#[tokio::test]
async fn selected_strategies_test() {
    let mut config = fast_config();
    config.strategies = vec![Strategy::FragmentedStream];

    let report = Orchestrator::new(config, FakeLauncher::failing(vec![]))
        .run()
        .await;

    assert_eq!(report.results.len(), 1);
    assert!(report.results.contains_key(&Strategy::FragmentedStream));
}

#[tokio::test]
async fn missing_executables_test() {
    let bin_dir = tempfile::tempdir().unwrap();
    let launcher = ProcessLauncher::new(bin_dir.path()).unwrap();

    let report = Orchestrator::new(fast_config(), launcher).run().await;

    assert!(report.is_empty());
}

#[test]
fn table_missing_metric_test() {
    let mut report = crate::BenchmarkReport::default();
    report.results.insert(
        Strategy::RawBinary,
        BenchmarkResult {
            output: String::new(),
            metrics: extract_metrics("Benchmark Binary Summary:\nThroughput: 4.00 img/s\n"),
        },
    );

    let table = report.table();
    let row = table.lines().find(|line| line.starts_with("binary")).unwrap();

    assert!(row.contains('4'));
    assert!(row.contains("N/A"));
}

#[test]
fn draw_chart_test() {
    let mut report = crate::BenchmarkReport::default();
    for strategy in [Strategy::TextEnvelope, Strategy::RawBinary] {
        report.results.insert(
            strategy,
            BenchmarkResult {
                output: String::new(),
                metrics: extract_metrics(CLIENT_OUTPUT),
            },
        );
    }

    let dir = tempfile::tempdir().unwrap();
    let chart_path = dir.path().join("benchmark_comparison.png");
    report.draw_chart(&chart_path).unwrap();

    let chart = image::open(&chart_path).unwrap();
    assert_eq!((chart.width(), chart.height()), (1500, 1000));
}

#[test]
fn table_rounds_summary_metrics_test() {
    let summary = SessionSummary {
        role: SessionRole::Client,
        images: 3,
        total_bytes: 1024,
        average_ms: 12.345678901234,
        total_time_s: 0.399999,
        throughput: 7.512345678901234,
        bandwidth: 0.00244140625,
    };

    let mut report = crate::BenchmarkReport::default();
    report.results.insert(
        Strategy::FragmentedStream,
        BenchmarkResult {
            output: String::new(),
            metrics: metrics_from_summary(&summary),
        },
    );

    let table = report.table();
    let row = table.lines().find(|line| line.starts_with("stream")).unwrap();

    assert_eq!(
        row.split_whitespace().collect::<Vec<_>>(),
        vec!["stream", "7.51", "12.35", "0.00", "0.40"]
    );
}

#[cfg(unix)]
mod peer_processes {
    use std::{fs, os::unix::fs::PermissionsExt, path::Path, time::Duration};

    use framewire_core::strategy::Strategy;

    use crate::{
        metrics::MetricValue,
        process::{CLIENT_EXECUTABLE, SERVER_EXECUTABLE},
        BenchmarkConfiguration, Orchestrator, PeerLauncher, PeerProcess, ProcessLauncher,
    };

    const SERVER_SCRIPT: &str = r#"#!/bin/sh
trap 'exit 0' TERM
while true; do sleep 0.05; done
"#;

    // Arguments: <image_dir> --strategy <name> --iterations <n> --summary-file <path>
    const CLIENT_SCRIPT: &str = r#"#!/bin/sh
strategy="$3"
summary_file="$7"
case "$strategy" in
    binary)
        echo "connection refused" >&2
        exit 1
        ;;
    base64)
        printf '{"role":"client","images":2,"total_bytes":1048576,"average_ms":12.5,"total_time_s":2.0,"throughput":1.0,"bandwidth":0.5}' > "$summary_file"
        ;;
esac
echo ""
echo "Benchmark Matrix Summary:"
echo "Total images sent: 6"
echo "Average transmission time: 3.25 ms"
echo "Throughput: 9.99 img/s"
"#;

    fn install_script(bin_dir: &Path, name: &str, content: &str) {
        let path = bin_dir.join(name);
        fs::write(&path, content).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn scripted_bin_dir() -> tempfile::TempDir {
        let bin_dir = tempfile::tempdir().unwrap();
        install_script(bin_dir.path(), SERVER_EXECUTABLE, SERVER_SCRIPT);
        install_script(bin_dir.path(), CLIENT_EXECUTABLE, CLIENT_SCRIPT);
        bin_dir
    }

    #[tokio::test]
    async fn failing_client_process_excluded_test() {
        let bin_dir = scripted_bin_dir();
        let launcher = ProcessLauncher::new(bin_dir.path()).unwrap();

        let mut config = BenchmarkConfiguration::new("images");
        config.warmup = Duration::from_millis(100);
        config.strategies = vec![
            Strategy::TextEnvelope,
            Strategy::RawBinary,
            Strategy::StructuredMatrix,
        ];

        let report = Orchestrator::new(config, launcher).run().await;

        assert_eq!(
            report.results.keys().copied().collect::<Vec<_>>(),
            vec![Strategy::TextEnvelope, Strategy::StructuredMatrix]
        );

        // The summary file wins over the printed block
        let base64 = &report.results[&Strategy::TextEnvelope].metrics;
        assert_eq!(base64["Throughput"], MetricValue::Number(1.0));
        assert_eq!(base64["Total images sent"], MetricValue::Number(2.0));

        // Without a summary file the printed block is scanned
        let matrix = &report.results[&Strategy::StructuredMatrix];
        assert!(matrix.output.contains("Benchmark Matrix Summary:"));
        assert_eq!(matrix.metrics["Throughput"], MetricValue::Number(9.99));
        assert_eq!(
            matrix.metrics["Average transmission time"],
            MetricValue::Number(3.25)
        );
    }

    #[tokio::test]
    async fn server_process_stops_on_terminate_test() {
        let bin_dir = scripted_bin_dir();
        let launcher = ProcessLauncher::new(bin_dir.path()).unwrap();

        let mut server = launcher.start_server(Strategy::RawBinary).await.unwrap();
        server.await_ready(Duration::from_millis(100)).await.unwrap();

        let stopped = tokio::time::timeout(Duration::from_secs(5), server.stop()).await;
        assert!(matches!(stopped, Ok(Ok(()))));

        // Stopping an exited server is a no-op
        server.stop().await.unwrap();
    }
}
