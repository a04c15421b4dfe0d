use serde::{Deserialize, Serialize};

use crate::{frame::ImageInfo, traits::DecodeOutcome};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ServerReply {
    Processed { image_info: ImageInfo },
    FragmentReceived { fragments: u32 },
    Error { message: String },
}

impl ServerReply {
    pub fn processed(image_info: ImageInfo) -> Self {
        Self::Processed { image_info }
    }

    pub fn fragment_received(fragments: u32) -> Self {
        Self::FragmentReceived { fragments }
    }

    pub fn error(message: &str) -> Self {
        Self::Error {
            message: message.to_string(),
        }
    }

    /// Whether this reply closes the exchange for the image it answers.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::FragmentReceived { .. })
    }
}

impl From<DecodeOutcome> for ServerReply {
    fn from(outcome: DecodeOutcome) -> Self {
        match outcome {
            DecodeOutcome::Complete(image_info) => Self::processed(image_info),
            DecodeOutcome::Partial { fragments } => Self::fragment_received(fragments),
        }
    }
}
