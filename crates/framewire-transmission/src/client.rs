use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use framewire_codecs::{encoder_for, StrategyConfiguration};
use framewire_core::{
    error::{Result, WireError},
    frame::Frame,
    reply::ServerReply,
    strategy::Strategy,
    traits::{FrameEncoder, SizeBudget},
};
use framewire_profilation_utils::{
    loggers::{console::ConsoleSessionLogger, csv::CsvSessionLogger},
    ImageRecord, SessionRole, SessionStats, SessionSummary,
};
use futures::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use tokio::net::TcpStream;
use tokio_tungstenite::{tungstenite::Message, MaybeTlsStream, WebSocketStream};

use crate::network::{connection_error, to_ws_message};

type ClientSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone)]
pub struct ClientConfiguration {
    pub strategy: Strategy,
    pub server_url: String,
    pub iterations: usize,

    pub budget: SizeBudget,
    pub codec: StrategyConfiguration,

    pub csv_log: Option<PathBuf>,
}

impl ClientConfiguration {
    pub fn for_strategy(strategy: Strategy) -> Self {
        Self {
            strategy,
            server_url: format!("ws://localhost:{}", strategy.port()),
            iterations: 1,
            budget: SizeBudget::default(),
            codec: StrategyConfiguration::default(),
            csv_log: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransmissionRecord {
    pub filename: String,
    pub message_bytes: usize,
    pub quality: u8,
    pub elapsed: Duration,

    /// Intermediate `fragment_received` replies seen before the final one
    pub acknowledgements: u32,
    pub reply: ServerReply,
}

#[derive(Debug, Clone)]
pub struct ClientReport {
    pub summary: SessionSummary,
    pub records: Vec<TransmissionRecord>,
}

pub struct ClientPeer {
    config: ClientConfiguration,
    socket: ClientSocket,
    encoder: Box<dyn FrameEncoder + Send>,
    stats: SessionStats,
}

impl ClientPeer {
    pub async fn connect(config: ClientConfiguration) -> Result<Self> {
        let (socket, _) = tokio_tungstenite::connect_async(config.server_url.as_str())
            .await
            .map_err(connection_error)?;

        info!("Connected to {}", config.server_url);

        let encoder = encoder_for(config.strategy, &config.codec);

        let mut stats = SessionStats::new(SessionRole::Client).logger(ConsoleSessionLogger::new());
        if let Some(path) = &config.csv_log {
            stats = stats.logger(CsvSessionLogger::new(path).map_err(std::io::Error::from)?);
        }

        Ok(Self {
            config,
            socket,
            encoder,
            stats,
        })
    }

    /// Sends every image `iterations` times. Failed images are logged and
    /// skipped; a lost connection ends the run early.
    pub async fn run(mut self, images: &[PathBuf]) -> Result<ClientReport> {
        let mut records = Vec::new();
        self.stats.restart();

        'iterations: for iteration in 0..self.config.iterations {
            debug!("Iteration {}/{}", iteration + 1, self.config.iterations);

            for image_path in images {
                info!("Sending image: {}", image_path.display());

                match self.transmit(image_path).await {
                    Ok(record) => records.push(record),
                    Err(e @ WireError::Connection(_)) => {
                        error!("Connection lost while sending {}: {}", image_path.display(), e);
                        break 'iterations;
                    }
                    Err(e) => {
                        warn!("Error processing image {}: {}", image_path.display(), e);
                    }
                }
            }
        }

        let summary = self.stats.finish();

        if let Err(e) = self.socket.close(None).await {
            debug!("Error while closing the connection: {}", e);
        }

        Ok(ClientReport { summary, records })
    }

    /// Encodes one image, sends it and waits for the replies to all its messages.
    pub async fn transmit(&mut self, image_path: &Path) -> Result<TransmissionRecord> {
        let started = Instant::now();

        let frame = Frame::load(image_path)?;
        let encoded = self.encoder.encode(&frame, &self.config.budget)?;
        let message_bytes = encoded.wire_size();

        self.stats.register_bytes(message_bytes);

        let expected_replies = encoded.messages.len();
        for message in encoded.messages {
            self.socket
                .send(to_ws_message(message))
                .await
                .map_err(connection_error)?;
        }

        let (reply, acknowledgements) = self.await_replies(expected_replies).await?;
        let elapsed = started.elapsed();

        info!("Image: {}", frame.filename());
        info!("Message size: {:.2} KB", message_bytes as f64 / 1024.0);
        info!("Transmission time: {:.2} ms", elapsed.as_secs_f64() * 1000.0);
        info!("Response: {:?}", reply);

        if let ServerReply::Error { message } = &reply {
            return Err(WireError::Protocol(format!(
                "Server rejected {}: {}",
                frame.filename(),
                message
            )));
        }

        self.stats.register_image(ImageRecord {
            label: frame.filename().to_string(),
            message_bytes,
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
        });

        Ok(TransmissionRecord {
            filename: frame.filename().to_string(),
            message_bytes,
            quality: encoded.quality,
            elapsed,
            acknowledgements,
            reply,
        })
    }

    /// Reads one reply per sent message. The first `error` among them answers
    /// the image, otherwise the last terminal reply does.
    async fn await_replies(&mut self, expected: usize) -> Result<(ServerReply, u32)> {
        let mut acknowledgements = 0;
        let mut outcome: Option<ServerReply> = None;

        for _ in 0..expected {
            match self.next_reply().await? {
                ServerReply::FragmentReceived { fragments } => {
                    acknowledgements += 1;
                    debug!("Server acknowledged fragment #{}", fragments);
                }
                reply => {
                    if !matches!(outcome, Some(ServerReply::Error { .. })) {
                        outcome = Some(reply);
                    }
                }
            }
        }

        let reply = outcome.ok_or_else(|| {
            WireError::Protocol("No final reply received for the image".to_string())
        })?;

        Ok((reply, acknowledgements))
    }

    async fn next_reply(&mut self) -> Result<ServerReply> {
        loop {
            let message = self
                .socket
                .next()
                .await
                .ok_or_else(|| WireError::Connection("Connection closed by server".to_string()))?
                .map_err(connection_error)?;

            match message {
                Message::Text(text) => return Ok(serde_json::from_str(text.as_str())?),
                Message::Close(_) => {
                    return Err(WireError::Connection(
                        "Connection closed by server".to_string(),
                    ))
                }
                _ => continue,
            }
        }
    }
}
