use std::{
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use async_trait::async_trait;
use framewire_core::{
    error::{Result, WireError},
    strategy::Strategy,
};
use framewire_profilation_utils::SessionSummary;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use tokio::process::{Child, Command};

use crate::metrics::{extract_metrics, metrics_from_summary, Metrics};

pub const SERVER_EXECUTABLE: &str = "framewire-server";
pub const CLIENT_EXECUTABLE: &str = "framewire-client";

/// Outcome of one successful client run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BenchmarkResult {
    pub output: String,
    pub metrics: Metrics,
}

/// A peer running outside the orchestrator.
#[async_trait]
pub trait PeerProcess: Send {
    async fn await_ready(&mut self, warmup: Duration) -> Result<()>;

    /// Requests termination and waits for the process to exit.
    async fn stop(&mut self) -> Result<()>;
}

#[async_trait]
pub trait PeerLauncher: Send + Sync {
    async fn start_server(&self, strategy: Strategy) -> Result<Box<dyn PeerProcess>>;

    async fn run_client(
        &self,
        strategy: Strategy,
        image_dir: &Path,
        iterations: usize,
    ) -> Result<BenchmarkResult>;
}

pub struct ServerProcess {
    strategy: Strategy,
    child: Child,
}

impl ServerProcess {
    pub fn new(strategy: Strategy, child: Child) -> Self {
        Self { strategy, child }
    }

    fn has_exited(&mut self) -> Result<bool> {
        Ok(self.child.try_wait()?.is_some())
    }

    #[cfg(unix)]
    fn request_termination(&mut self) -> Result<()> {
        use nix::{
            sys::signal::{kill, Signal},
            unistd::Pid,
        };

        let Some(pid) = self.child.id() else {
            return Ok(());
        };

        kill(Pid::from_raw(pid as i32), Signal::SIGTERM)
            .map_err(|e| WireError::Process(format!("Unable to signal server: {}", e)))
    }

    #[cfg(not(unix))]
    fn request_termination(&mut self) -> Result<()> {
        Ok(self.child.start_kill()?)
    }
}

#[async_trait]
impl PeerProcess for ServerProcess {
    async fn await_ready(&mut self, warmup: Duration) -> Result<()> {
        tokio::time::sleep(warmup).await;

        match self.child.try_wait()? {
            Some(status) => Err(WireError::Process(format!(
                "Server {} exited during warm-up ({})",
                self.strategy, status
            ))),
            None => Ok(()),
        }
    }

    async fn stop(&mut self) -> Result<()> {
        if self.has_exited()? {
            return Ok(());
        }

        debug!("Stopping server {}", self.strategy);

        if let Err(e) = self.request_termination() {
            warn!("{}, killing it", e);
            self.child.kill().await?;
        }

        let status = self.child.wait().await?;
        debug!("Server {} exited ({})", self.strategy, status);

        Ok(())
    }
}

/// Runs the peer executables found in `bin_dir`.
pub struct ProcessLauncher {
    bin_dir: PathBuf,
    workspace: TempDir,
}

impl ProcessLauncher {
    pub fn new(bin_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            bin_dir: bin_dir.into(),
            workspace: tempfile::tempdir()?,
        })
    }

    /// Looks for the peers next to the running executable.
    pub fn beside_current_exe() -> Result<Self> {
        let current_exe = std::env::current_exe()?;
        let bin_dir = current_exe
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Self::new(bin_dir)
    }

    pub fn executable(&self, name: &str) -> PathBuf {
        self.bin_dir
            .join(format!("{}{}", name, std::env::consts::EXE_SUFFIX))
    }

    fn summary_path(&self, strategy: Strategy) -> PathBuf {
        self.workspace
            .path()
            .join(format!("{}-summary.json", strategy))
    }
}

#[async_trait]
impl PeerLauncher for ProcessLauncher {
    async fn start_server(&self, strategy: Strategy) -> Result<Box<dyn PeerProcess>> {
        let executable = self.executable(SERVER_EXECUTABLE);

        let child = Command::new(&executable)
            .arg("--strategy")
            .arg(strategy.name())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                WireError::Process(format!(
                    "Unable to start {}: {}",
                    executable.display(),
                    e
                ))
            })?;

        Ok(Box::new(ServerProcess::new(strategy, child)))
    }

    async fn run_client(
        &self,
        strategy: Strategy,
        image_dir: &Path,
        iterations: usize,
    ) -> Result<BenchmarkResult> {
        info!("Running client {}...", strategy);

        let executable = self.executable(CLIENT_EXECUTABLE);
        let summary_path = self.summary_path(strategy);

        if summary_path.exists() {
            std::fs::remove_file(&summary_path)?;
        }

        let output = Command::new(&executable)
            .arg(image_dir)
            .arg("--strategy")
            .arg(strategy.name())
            .arg("--iterations")
            .arg(iterations.to_string())
            .arg("--summary-file")
            .arg(&summary_path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                WireError::Process(format!(
                    "Unable to start {}: {}",
                    executable.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            error!(
                "Error executing client {}:\n{}",
                strategy,
                String::from_utf8_lossy(&output.stderr)
            );

            return Err(WireError::Process(format!(
                "Client {} failed ({})",
                strategy, output.status
            )));
        }

        let output = String::from_utf8_lossy(&output.stdout).into_owned();
        let metrics = match read_summary(&summary_path) {
            Some(summary) => metrics_from_summary(&summary),
            None => extract_metrics(&output),
        };

        Ok(BenchmarkResult { output, metrics })
    }
}

fn read_summary(path: &Path) -> Option<SessionSummary> {
    let content = std::fs::read_to_string(path).ok()?;

    match serde_json::from_str(&content) {
        Ok(summary) => Some(summary),
        Err(e) => {
            warn!(
                "Unreadable summary file {}, scanning the output instead: {}",
                path.display(),
                e
            );
            None
        }
    }
}
