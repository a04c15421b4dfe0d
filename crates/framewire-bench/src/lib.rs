pub mod metrics;
pub mod orchestrator;
pub mod process;
pub mod report;

pub use orchestrator::{BenchmarkConfiguration, BenchmarkReport, Orchestrator};
pub use process::{BenchmarkResult, PeerLauncher, PeerProcess, ProcessLauncher};

#[cfg(test)]
mod tests;
