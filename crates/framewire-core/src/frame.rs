use std::path::Path;

use bytes::Bytes;
use chrono::Utc;
use image::ImageFormat;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// An image captured for transmission. Fields are private so a frame cannot
/// be altered between capture and encoding.
#[derive(Debug, Clone)]
pub struct Frame {
    bytes: Bytes,
    format: Option<ImageFormat>,
    filename: String,
    timestamp: f64,
}

impl Frame {
    pub fn new(bytes: impl Into<Bytes>, filename: &str) -> Self {
        let bytes = bytes.into();
        let format = image::guess_format(&bytes).ok();

        Self {
            bytes,
            format,
            filename: filename.to_string(),
            timestamp: now_seconds(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self::new(bytes, &filename))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }
}

/// Seconds since the epoch, with microsecond resolution.
pub fn now_seconds() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

#[derive(Debug, Clone, PartialEq)]
pub enum WireMessage {
    Text(String),
    Binary(Bytes),
}

impl WireMessage {
    pub fn len(&self) -> usize {
        match self {
            WireMessage::Text(text) => text.len(),
            WireMessage::Binary(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> &'static str {
        match self {
            WireMessage::Text(_) => "text",
            WireMessage::Binary(_) => "binary",
        }
    }
}

/// Metadata a peer reports back after decoding an image.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub mode: String,
    pub channels: u8,

    pub process_time_ms: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fragments_received: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<u64>,
}
