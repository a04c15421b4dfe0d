pub mod client;
pub mod network;
pub mod server;

pub use tokio_tungstenite::tungstenite::Message;
