use std::time::Instant;

use framewire_core::{
    error::{Result, WireError},
    frame::{Frame, WireMessage},
    traits::{DecodeOutcome, EncodedFrame, FrameDecoder, FrameEncoder, SizeBudget},
};
use image::{DynamicImage, GenericImageView, ImageBuffer, ImageFormat};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    compress::{compress_frame, QualityLadder},
    expect_text,
    probe::image_info,
};

pub const MATRIX_MESSAGE_CEILING: usize = 900 * 1024;

#[derive(Serialize, Deserialize, Debug)]
pub struct MatrixEnvelope {
    pub height: u32,
    pub width: u32,
    pub channels: u8,
    pub data: Vec<u8>,

    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub timestamp: f64,
}

pub struct StructuredMatrixStrategy {
    ladder: QualityLadder,
    ceiling: usize,
    fallback: SizeBudget,
}

impl StructuredMatrixStrategy {
    pub fn new(ladder: QualityLadder) -> Self {
        Self {
            ladder,
            ceiling: MATRIX_MESSAGE_CEILING,
            fallback: SizeBudget::fallback(),
        }
    }

    pub fn ceiling(mut self, ceiling: usize) -> Self {
        self.ceiling = ceiling;
        self
    }

    fn encode_attempt(&self, frame: &Frame, budget: &SizeBudget) -> Result<EncodedFrame> {
        let compressed = compress_frame(frame, budget, &self.ladder)?;

        // The matrix carries what the peer would see after decoding the JPEG
        let decoded = image::load_from_memory_with_format(&compressed.bytes, ImageFormat::Jpeg)?;
        let (width, height) = decoded.dimensions();
        let channels = decoded.color().channel_count();

        let envelope = MatrixEnvelope {
            height,
            width,
            channels,
            data: decoded.into_bytes(),
            filename: frame.filename().to_string(),
            timestamp: frame.timestamp(),
        };

        Ok(EncodedFrame {
            messages: vec![WireMessage::Text(serde_json::to_string(&envelope)?)],
            quality: compressed.quality,
            width,
            height,
            attempts: 1,
        })
    }
}

impl FrameEncoder for StructuredMatrixStrategy {
    fn encode(&mut self, frame: &Frame, budget: &SizeBudget) -> Result<EncodedFrame> {
        let first_attempt = self.encode_attempt(frame, budget)?;
        let message_size = first_attempt.wire_size();

        if message_size <= self.ceiling {
            return Ok(first_attempt);
        }

        warn!(
            "Message too large ({:.2} KB), compressing {} further",
            message_size as f64 / 1024.0,
            frame.filename()
        );

        // Single retry, the second attempt is sent whatever its size
        let mut second_attempt = self.encode_attempt(frame, &self.fallback)?;
        second_attempt.attempts = 2;

        debug!(
            "Second attempt for {}: {} bytes",
            frame.filename(),
            second_attempt.wire_size()
        );

        Ok(second_attempt)
    }
}

impl FrameDecoder for StructuredMatrixStrategy {
    fn decode(&mut self, message: WireMessage) -> Result<DecodeOutcome> {
        let started = Instant::now();

        let envelope: MatrixEnvelope = serde_json::from_str(&expect_text(message)?)?;
        let image = rebuild_image(envelope)?;
        let (width, height) = image.dimensions();

        Ok(DecodeOutcome::Complete(image_info(
            width,
            height,
            None,
            image.color(),
            started,
        )))
    }
}

fn rebuild_image(envelope: MatrixEnvelope) -> Result<DynamicImage> {
    let MatrixEnvelope {
        height,
        width,
        channels,
        data,
        ..
    } = envelope;

    let expected_len = height as usize * width as usize * channels as usize;
    if data.len() != expected_len {
        return Err(WireError::Protocol(format!(
            "Matrix of {}x{}x{} needs {} values, got {}",
            height,
            width,
            channels,
            expected_len,
            data.len()
        )));
    }

    let image = match channels {
        1 => ImageBuffer::from_raw(width, height, data).map(DynamicImage::ImageLuma8),
        2 => ImageBuffer::from_raw(width, height, data).map(DynamicImage::ImageLumaA8),
        3 => ImageBuffer::from_raw(width, height, data).map(DynamicImage::ImageRgb8),
        4 => ImageBuffer::from_raw(width, height, data).map(DynamicImage::ImageRgba8),
        _ => None,
    };

    image.ok_or_else(|| {
        WireError::Protocol(format!("Unsupported channel count: {}", channels))
    })
}
