use thiserror::Error;

#[derive(Error, Debug)]
pub enum WireError {
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Message of {size} bytes exceeds the transport ceiling of {limit} bytes")]
    SizeLimit { size: usize, limit: usize },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Process error: {0}")]
    Process(String),

    #[error("Unknown strategy '{0}'")]
    UnknownStrategy(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl WireError {
    /// Errors tied to a single message. The server answers them with an
    /// `error` envelope and keeps the connection open.
    pub fn is_message_level(&self) -> bool {
        matches!(
            self,
            WireError::Decode(_)
                | WireError::Protocol(_)
                | WireError::SizeLimit { .. }
                | WireError::Json(_)
                | WireError::Image(_)
        )
    }

    /// Text of the `error` reply sent back for this error.
    pub fn reply_message(&self) -> String {
        match self {
            WireError::Decode(message) | WireError::Protocol(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WireError>;
