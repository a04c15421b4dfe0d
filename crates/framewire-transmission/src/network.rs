use std::{
    future::Future,
    net::SocketAddr,
    path::{Path, PathBuf},
};

use framewire_core::{
    error::{Result, WireError},
    frame::WireMessage,
    Bytes,
};
use itertools::Itertools;
use socket2::{Domain, Socket, Type};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::{self, Message};

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Listening socket with address reuse, so a fixed port can be bound again
/// right after the previous server on it went away.
pub fn bind_listener(address: SocketAddr) -> std::io::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(address), Type::STREAM, None)?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&address.into())?;
    socket.listen(128)?;

    TcpListener::from_std(socket.into())
}

pub fn to_ws_message(message: WireMessage) -> Message {
    match message {
        WireMessage::Text(text) => Message::Text(text.into()),
        WireMessage::Binary(bytes) => Message::Binary(bytes.into()),
    }
}

/// `None` for control messages, which carry no payload for the peers.
pub fn from_ws_message(message: Message) -> Option<WireMessage> {
    match message {
        Message::Text(text) => Some(WireMessage::Text(text.as_str().to_owned())),
        Message::Binary(bytes) => Some(WireMessage::Binary(Bytes::from(bytes))),
        _ => None,
    }
}

pub fn connection_error(error: tungstenite::Error) -> WireError {
    WireError::Connection(error.to_string())
}

/// Images (`jpg`, `jpeg`, `png`) directly inside `directory`, sorted by path.
pub fn enumerate_images(directory: &Path) -> Result<Vec<PathBuf>> {
    let images = std::fs::read_dir(directory)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_file() && has_image_extension(path))
        .sorted()
        .collect();

    Ok(images)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| extension.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Resolves on Ctrl-C, or on SIGTERM where available. Handlers are installed
/// before this returns, so signals sent right after the call are not lost.
pub fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    #[cfg(unix)]
    let mut terminate =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    Ok(async move {
        #[cfg(unix)]
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = terminate.recv() => {}
        }

        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
        }
    })
}
