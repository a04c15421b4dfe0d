use std::{path::PathBuf, str::FromStr, time::Duration};

use clap::Parser;
use framewire::{
    bench::{BenchmarkConfiguration, Orchestrator, ProcessLauncher},
    error::WireError,
    strategy::Strategy,
};
use itertools::Itertools;

#[derive(Parser)]
#[clap(version = "0.1.0", about = "Benchmark runner for image transmission over websockets")]
struct Options {
    /// Directory containing the images for the benchmark
    image_dir: PathBuf,

    /// Number of times each image is sent
    #[clap(long, default_value = "3")]
    iterations: usize,

    /// Strategies to benchmark, or "all"
    #[clap(long, multiple_values = true, default_value = "all")]
    methods: Vec<String>,

    #[clap(long, default_value = "2000")]
    warmup_ms: u64,

    /// Where the peer executables live, defaults to this executable's directory
    #[clap(long)]
    bin_dir: Option<PathBuf>,

    #[clap(long, default_value = "benchmark_results.json")]
    results: PathBuf,

    #[clap(long, default_value = "benchmark_comparison.png")]
    chart: PathBuf,
}

fn parse_methods(methods: &[String]) -> Result<Vec<Strategy>, WireError> {
    if methods.iter().any(|method| method.eq_ignore_ascii_case("all")) {
        return Ok(Strategy::all().to_vec());
    }

    let strategies = methods
        .iter()
        .map(|method| Strategy::from_str(method))
        .collect::<Result<Vec<Strategy>, WireError>>()?;

    Ok(strategies.into_iter().unique().collect())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let options = Options::parse();

    let mut config = BenchmarkConfiguration::new(options.image_dir);
    config.iterations = options.iterations;
    config.strategies = parse_methods(&options.methods)?;
    config.warmup = Duration::from_millis(options.warmup_ms);
    config.results_path = options.results;
    config.chart_path = options.chart;

    println!(
        "Running benchmarks for methods: {}",
        config.strategies.iter().join(", ")
    );
    println!("Image directory: {}", config.image_dir.display());
    println!("Iterations per image: {}", config.iterations);

    let launcher = match options.bin_dir {
        Some(bin_dir) => ProcessLauncher::new(bin_dir)?,
        None => ProcessLauncher::beside_current_exe()?,
    };

    let orchestrator = Orchestrator::new(config, launcher);
    let report = orchestrator.run().await;

    if report.interrupted {
        println!("\nBenchmark interrupted by user.");
    }

    if report.is_empty() {
        println!("No results to generate the report.");
        return Ok(());
    }

    report.print_table();
    report.write_results(&orchestrator.config().results_path)?;
    report.draw_chart(&orchestrator.config().chart_path)?;

    Ok(())
}
