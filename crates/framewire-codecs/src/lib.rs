use framewire_core::{
    error::{Result, WireError},
    frame::WireMessage,
    strategy::Strategy,
    traits::{FrameDecoder, FrameEncoder},
    Bytes,
};

pub mod binary;
pub mod compress;
pub mod matrix;
pub mod probe;
pub mod stream;
pub mod text;

use self::{
    binary::RawBinaryStrategy, compress::QualityLadder, matrix::StructuredMatrixStrategy,
    stream::FragmentedStreamStrategy, text::TextEnvelopeStrategy,
};


#[derive(Debug, Clone, Copy)]
pub struct StrategyConfiguration {
    pub ladder: QualityLadder,

    /// Payload bytes per stream fragment, 0 sends each image as one fragment.
    pub fragment_size: usize,
}

impl Default for StrategyConfiguration {
    fn default() -> Self {
        Self {
            ladder: QualityLadder::default(),
            fragment_size: 0,
        }
    }
}

pub fn encoder_for(
    strategy: Strategy,
    config: &StrategyConfiguration,
) -> Box<dyn FrameEncoder + Send> {
    match strategy {
        Strategy::TextEnvelope => Box::new(TextEnvelopeStrategy::new(config.ladder)),
        Strategy::RawBinary => Box::new(RawBinaryStrategy::new(config.ladder)),
        Strategy::StructuredMatrix => Box::new(StructuredMatrixStrategy::new(config.ladder)),
        Strategy::FragmentedStream => Box::new(
            FragmentedStreamStrategy::new(config.ladder).fragment_size(config.fragment_size),
        ),
    }
}

pub fn decoder_for(strategy: Strategy) -> Box<dyn FrameDecoder + Send> {
    let ladder = QualityLadder::default();

    match strategy {
        Strategy::TextEnvelope => Box::new(TextEnvelopeStrategy::new(ladder)),
        Strategy::RawBinary => Box::new(RawBinaryStrategy::new(ladder)),
        Strategy::StructuredMatrix => Box::new(StructuredMatrixStrategy::new(ladder)),
        Strategy::FragmentedStream => Box::new(FragmentedStreamStrategy::new(ladder)),
    }
}

pub(crate) fn expect_text(message: WireMessage) -> Result<String> {
    match message {
        WireMessage::Text(text) => Ok(text),
        WireMessage::Binary(_) => Err(WireError::Protocol(
            "Expected a text message".to_string(),
        )),
    }
}

pub(crate) fn expect_binary(message: WireMessage) -> Result<Bytes> {
    match message {
        WireMessage::Binary(bytes) => Ok(bytes),
        WireMessage::Text(_) => Err(WireError::Protocol(
            "Expected a binary message".to_string(),
        )),
    }
}
