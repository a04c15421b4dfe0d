use std::time::Instant;

use base64::{engine::general_purpose::STANDARD, Engine};
use framewire_core::{
    error::{Result, WireError},
    frame::{Frame, WireMessage},
    traits::{DecodeOutcome, EncodedFrame, FrameDecoder, FrameEncoder, SizeBudget},
};
use serde::{Deserialize, Serialize};

use crate::{
    compress::{compress_frame, QualityLadder},
    expect_text,
    probe::probe_image,
};

#[derive(Serialize, Deserialize, Debug)]
pub struct TextEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub timestamp: f64,
    #[serde(default)]
    pub filename: String,
}

pub struct TextEnvelopeStrategy {
    ladder: QualityLadder,
}

impl TextEnvelopeStrategy {
    pub fn new(ladder: QualityLadder) -> Self {
        Self { ladder }
    }
}

impl FrameEncoder for TextEnvelopeStrategy {
    fn encode(&mut self, frame: &Frame, budget: &SizeBudget) -> Result<EncodedFrame> {
        let compressed = compress_frame(frame, budget, &self.ladder)?;

        let envelope = TextEnvelope {
            image: Some(STANDARD.encode(&compressed.bytes)),
            timestamp: frame.timestamp(),
            filename: frame.filename().to_string(),
        };

        Ok(EncodedFrame {
            messages: vec![WireMessage::Text(serde_json::to_string(&envelope)?)],
            quality: compressed.quality,
            width: compressed.width,
            height: compressed.height,
            attempts: 1,
        })
    }
}

impl FrameDecoder for TextEnvelopeStrategy {
    fn decode(&mut self, message: WireMessage) -> Result<DecodeOutcome> {
        let started = Instant::now();

        let envelope: TextEnvelope = serde_json::from_str(&expect_text(message)?)?;
        let encoded_image = envelope.image.ok_or_else(|| {
            WireError::Protocol("No 'image' field found in the message".to_string())
        })?;

        let image_bytes = STANDARD
            .decode(encoded_image)
            .map_err(|e| WireError::Decode(format!("Invalid base64 image data: {}", e)))?;

        Ok(DecodeOutcome::Complete(probe_image(&image_bytes, started)?))
    }
}
