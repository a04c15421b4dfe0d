use std::time::Instant;

use framewire_core::{
    error::Result,
    frame::{Frame, WireMessage},
    traits::{DecodeOutcome, EncodedFrame, FrameDecoder, FrameEncoder, SizeBudget},
    Bytes,
};

use crate::{
    compress::{compress_frame, QualityLadder},
    expect_binary,
    probe::probe_image,
};

/// Compressed bytes as a single binary message. Filename and timestamp do not
/// travel with the payload.
pub struct RawBinaryStrategy {
    ladder: QualityLadder,
}

impl RawBinaryStrategy {
    pub fn new(ladder: QualityLadder) -> Self {
        Self { ladder }
    }
}

impl FrameEncoder for RawBinaryStrategy {
    fn encode(&mut self, frame: &Frame, budget: &SizeBudget) -> Result<EncodedFrame> {
        let compressed = compress_frame(frame, budget, &self.ladder)?;

        Ok(EncodedFrame {
            messages: vec![WireMessage::Binary(Bytes::from(compressed.bytes))],
            quality: compressed.quality,
            width: compressed.width,
            height: compressed.height,
            attempts: 1,
        })
    }
}

impl FrameDecoder for RawBinaryStrategy {
    fn decode(&mut self, message: WireMessage) -> Result<DecodeOutcome> {
        let started = Instant::now();
        let image_bytes = expect_binary(message)?;

        Ok(DecodeOutcome::Complete(probe_image(&image_bytes, started)?))
    }
}
