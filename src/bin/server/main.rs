use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;
use framewire::{
    strategy::Strategy,
    transmission::{
        network::shutdown_signal,
        server::{ServerConfiguration, ServerPeer},
    },
};
use log::info;

#[derive(Parser)]
#[clap(version = "0.1.0", about = "Receives images with one wire strategy and replies with their metadata")]
struct Options {
    #[clap(short, long, default_value = "base64")]
    strategy: Strategy,

    /// Defaults to 127.0.0.1 on the strategy's port
    #[clap(short, long)]
    bind_address: Option<SocketAddr>,

    /// Largest accepted message, in bytes
    #[clap(long)]
    transport_ceiling: Option<usize>,

    #[clap(long)]
    csv_log: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let options = Options::parse();

    let mut config = ServerConfiguration::for_strategy(options.strategy);
    if let Some(bind_address) = options.bind_address {
        config.bind_address = bind_address;
    }
    if let Some(transport_ceiling) = options.transport_ceiling {
        config.transport_ceiling = transport_ceiling;
    }
    config.csv_log = options.csv_log;

    let server = ServerPeer::bind(config).await?;
    let shutdown = shutdown_signal()?;

    tokio::select! {
        result = server.run() => result?,
        _ = shutdown => info!("Server stopped"),
    }

    Ok(())
}
