use crate::{
    error::Result,
    frame::{Frame, ImageInfo, WireMessage},
};

const MEGABYTE: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeBudget {
    pub max_bytes: usize,
    pub max_dimension: u32,
}

impl SizeBudget {
    pub fn new(max_size_mb: f64, max_dimension: u32) -> Self {
        Self {
            max_bytes: (max_size_mb * MEGABYTE) as usize,
            max_dimension,
        }
    }

    /// Budget used when a first encoding attempt overshoots the message ceiling.
    pub fn fallback() -> Self {
        Self::new(0.2, 128)
    }
}

impl Default for SizeBudget {
    fn default() -> Self {
        Self::new(0.5, 1024)
    }
}

#[derive(Debug, Clone)]
pub struct EncodedFrame {
    pub messages: Vec<WireMessage>,

    pub quality: u8,
    pub width: u32,
    pub height: u32,

    /// Encoding attempts made, above 1 when the first one overshot a ceiling.
    pub attempts: u8,
}

impl EncodedFrame {
    pub fn wire_size(&self) -> usize {
        self.messages.iter().map(WireMessage::len).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    Complete(ImageInfo),
    Partial { fragments: u32 },
}

pub trait FrameEncoder {
    fn encode(&mut self, frame: &Frame, budget: &SizeBudget) -> Result<EncodedFrame>;
}

pub trait FrameDecoder {
    fn decode(&mut self, message: WireMessage) -> Result<DecodeOutcome>;

    /// Invoked once the reply for the last decoded message has been sent.
    fn on_reply_sent(&mut self) {}
}
