use std::{collections::BTreeMap, path::PathBuf, time::Duration};

use framewire_core::{error::Result, strategy::Strategy};
use log::{error, info, warn};

use crate::process::{BenchmarkResult, PeerLauncher, PeerProcess};

#[derive(Debug, Clone)]
pub struct BenchmarkConfiguration {
    pub image_dir: PathBuf,
    pub iterations: usize,
    pub strategies: Vec<Strategy>,

    /// Delay between starting a server and starting its client
    pub warmup: Duration,

    pub results_path: PathBuf,
    pub chart_path: PathBuf,
}

impl BenchmarkConfiguration {
    pub fn new(image_dir: impl Into<PathBuf>) -> Self {
        Self {
            image_dir: image_dir.into(),
            iterations: 3,
            strategies: Strategy::all().to_vec(),
            warmup: Duration::from_secs(2),
            results_path: PathBuf::from("benchmark_results.json"),
            chart_path: PathBuf::from("benchmark_comparison.png"),
        }
    }
}

/// Results of the strategies whose client completed successfully.
#[derive(Debug, Default)]
pub struct BenchmarkReport {
    pub results: BTreeMap<Strategy, BenchmarkResult>,
    pub interrupted: bool,
}

pub struct Orchestrator<L: PeerLauncher> {
    config: BenchmarkConfiguration,
    launcher: L,
}

impl<L: PeerLauncher> Orchestrator<L> {
    pub fn new(config: BenchmarkConfiguration, launcher: L) -> Self {
        Self { config, launcher }
    }

    pub fn config(&self) -> &BenchmarkConfiguration {
        &self.config
    }

    /// Benchmarks the configured strategies one after the other. A failing
    /// strategy is left out of the report; an interrupt stops the loop after
    /// the running server has been stopped.
    pub async fn run(&self) -> BenchmarkReport {
        let mut report = BenchmarkReport::default();

        for &strategy in &self.config.strategies {
            match self.run_strategy(strategy).await {
                Ok(Some(result)) => {
                    info!("Benchmark {} completed successfully!", strategy);
                    report.results.insert(strategy, result);
                }
                Ok(None) => {
                    warn!("Benchmark interrupted by user");
                    report.interrupted = true;
                    break;
                }
                Err(e) => error!("Benchmark {} failed: {}", strategy, e),
            }
        }

        report
    }

    /// `None` when interrupted.
    async fn run_strategy(&self, strategy: Strategy) -> Result<Option<BenchmarkResult>> {
        info!("Starting server {}...", strategy);
        let mut server = self.launcher.start_server(strategy).await?;

        let outcome = tokio::select! {
            outcome = self.benchmark(strategy, server.as_mut()) => outcome.map(Some),
            _ = tokio::signal::ctrl_c() => Ok(None),
        };

        if let Err(e) = server.stop().await {
            warn!("Unable to stop server {}: {}", strategy, e);
        }

        outcome
    }

    async fn benchmark(
        &self,
        strategy: Strategy,
        server: &mut dyn PeerProcess,
    ) -> Result<BenchmarkResult> {
        server.await_ready(self.config.warmup).await?;

        self.launcher
            .run_client(strategy, &self.config.image_dir, self.config.iterations)
            .await
    }
}
