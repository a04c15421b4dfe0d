use std::{
    net::{Ipv4Addr, SocketAddr},
    path::PathBuf,
};

use framewire_codecs::decoder_for;
use framewire_core::{
    error::{Result, WireError},
    frame::WireMessage,
    reply::ServerReply,
    strategy::Strategy,
    traits::{DecodeOutcome, FrameDecoder},
};
use framewire_profilation_utils::{
    loggers::{console::ConsoleSessionLogger, csv::CsvSessionLogger},
    ImageRecord, SessionRole, SessionStats, SessionSummary,
};
use futures::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpListener,
};
use tokio_tungstenite::{tungstenite::Message, WebSocketStream};

use crate::network::{bind_listener, from_ws_message, to_ws_message};

#[derive(Debug, Clone)]
pub struct ServerConfiguration {
    pub strategy: Strategy,
    pub bind_address: SocketAddr,

    /// Messages above this size are answered with an error reply
    pub transport_ceiling: usize,

    pub csv_log: Option<PathBuf>,
}

impl ServerConfiguration {
    pub fn for_strategy(strategy: Strategy) -> Self {
        Self {
            strategy,
            bind_address: SocketAddr::from((Ipv4Addr::LOCALHOST, strategy.port())),
            transport_ceiling: strategy.default_transport_ceiling(),
            csv_log: None,
        }
    }
}

pub struct ServerPeer {
    config: ServerConfiguration,
    listener: TcpListener,
}

impl ServerPeer {
    pub async fn bind(config: ServerConfiguration) -> Result<Self> {
        let listener = bind_listener(config.bind_address)?;

        info!(
            "{} websocket server started on ws://{}",
            config.strategy.title(),
            listener.local_addr()?
        );

        Ok(Self { config, listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves connections one after the other, forever.
    pub async fn run(&self) -> Result<()> {
        loop {
            if let Err(e) = self.accept_one().await {
                error!("Connection failed: {}", e);
            }
        }
    }

    pub async fn accept_one(&self) -> Result<SessionSummary> {
        info!("Waiting for client connection...");
        let (stream, client_address) = self.listener.accept().await?;
        stream.set_nodelay(true)?;

        let socket = tokio_tungstenite::accept_async(stream)
            .await
            .map_err(|e| WireError::Connection(e.to_string()))?;

        info!("Client connected from {}", client_address);

        self.serve_connection(socket).await
    }

    /// Replies to every message of the connection until it closes, then
    /// returns the session summary.
    pub async fn serve_connection<S>(
        &self,
        mut socket: WebSocketStream<S>,
    ) -> Result<SessionSummary>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut decoder = decoder_for(self.config.strategy);
        let mut stats = self.setup_session_stats()?;

        while let Some(received) = socket.next().await {
            let message = match received {
                Ok(Message::Close(_)) => {
                    info!("Connection closed");
                    break;
                }
                Ok(message) => message,
                Err(e) => {
                    warn!("Connection error: {}", e);
                    break;
                }
            };

            let Some(message) = from_ws_message(message) else {
                continue;
            };

            let reply = match self.handle_message(&mut *decoder, &mut stats, message) {
                Ok(reply) => reply,
                Err(e) => {
                    error!("Closing session: {}", e);
                    break;
                }
            };

            let reply = WireMessage::Text(serde_json::to_string(&reply)?);
            if let Err(e) = socket.send(to_ws_message(reply)).await {
                warn!("Unable to send reply: {}", e);
                break;
            }

            decoder.on_reply_sent();
        }

        Ok(stats.finish())
    }

    fn handle_message(
        &self,
        decoder: &mut dyn FrameDecoder,
        stats: &mut SessionStats,
        message: WireMessage,
    ) -> Result<ServerReply> {
        let message_bytes = message.len();
        stats.register_bytes(message_bytes);

        debug!("Received {} message of {} bytes", message.kind(), message_bytes);

        if message_bytes > self.config.transport_ceiling {
            let e = WireError::SizeLimit {
                size: message_bytes,
                limit: self.config.transport_ceiling,
            };
            warn!("{}", e);
            return Ok(ServerReply::error(&e.reply_message()));
        }

        match decoder.decode(message) {
            Ok(DecodeOutcome::Complete(image_info)) => {
                let label = match image_info.image_id {
                    Some(image_id) => format!("image {}", image_id),
                    None => format!("image #{}", stats.images() + 1),
                };

                stats.register_image(ImageRecord {
                    label,
                    message_bytes,
                    elapsed_ms: image_info.process_time_ms,
                });

                Ok(ServerReply::processed(image_info))
            }
            Ok(outcome) => Ok(outcome.into()),
            Err(e) if e.is_message_level() => {
                warn!("Error processing message: {}", e);
                Ok(ServerReply::error(&e.reply_message()))
            }
            Err(e) => Err(e),
        }
    }

    fn setup_session_stats(&self) -> Result<SessionStats> {
        let header = format!("{} performance metrics:", self.config.strategy.title());
        let stats = SessionStats::new(SessionRole::Server)
            .logger(ConsoleSessionLogger::new().header(&header));

        match &self.config.csv_log {
            Some(path) => {
                let logger = CsvSessionLogger::new(path).map_err(std::io::Error::from)?;
                Ok(stats.logger(logger))
            }
            None => Ok(stats),
        }
    }
}
