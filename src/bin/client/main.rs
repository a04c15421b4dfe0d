use std::path::PathBuf;

use clap::Parser;
use framewire::{
    codecs::StrategyConfiguration,
    error::WireError,
    strategy::Strategy,
    traits::SizeBudget,
    transmission::{
        client::{ClientConfiguration, ClientPeer},
        network::enumerate_images,
    },
};
use log::info;

#[derive(Parser)]
#[clap(version = "0.1.0", about = "Sends a directory of images to a framewire server")]
struct Options {
    /// Directory containing the images (jpg, jpeg, png)
    image_dir: PathBuf,

    #[clap(short, long, default_value = "base64")]
    strategy: Strategy,

    /// Number of times each image is sent
    #[clap(short, long, default_value = "1")]
    iterations: usize,

    /// Defaults to ws://localhost on the strategy's port
    #[clap(short = 'u', long)]
    server_url: Option<String>,

    #[clap(long, default_value = "0.5")]
    max_size_mb: f64,

    #[clap(long, default_value = "1024")]
    max_dimension: u32,

    /// Stream payload bytes per fragment, 0 sends each image whole
    #[clap(long, default_value = "0")]
    fragment_size: usize,

    /// Also write the summary as JSON to this file
    #[clap(long)]
    summary_file: Option<PathBuf>,

    #[clap(long)]
    csv_log: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let options = Options::parse();

    let images = enumerate_images(&options.image_dir)?;
    if images.is_empty() {
        return Err(WireError::Process(format!(
            "No images found in {}",
            options.image_dir.display()
        ))
        .into());
    }

    info!("Found {} images for the benchmark", images.len());

    let mut config = ClientConfiguration::for_strategy(options.strategy);
    if let Some(server_url) = options.server_url {
        config.server_url = server_url;
    }
    config.iterations = options.iterations;
    config.budget = SizeBudget::new(options.max_size_mb, options.max_dimension);
    config.codec = StrategyConfiguration {
        fragment_size: options.fragment_size,
        ..StrategyConfiguration::default()
    };
    config.csv_log = options.csv_log;

    let client = ClientPeer::connect(config).await?;
    let report = client.run(&images).await?;

    if report.summary.images == 0 {
        println!("Could not process any image correctly");
        return Ok(());
    }

    println!("\n{}", options.strategy.summary_header());
    print!("{}", report.summary);

    if let Some(summary_file) = options.summary_file {
        std::fs::write(summary_file, serde_json::to_string_pretty(&report.summary)?)?;
    }

    Ok(())
}
