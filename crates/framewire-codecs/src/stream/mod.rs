#[cfg(test)]
mod tests;

mod header;
mod reassembly;

pub use self::{
    header::{StreamHeader, STREAM_HEADER_LEN},
    reassembly::{ReassembledImage, Reassembler, ReassemblyState},
};

use std::time::Instant;

use bytes::{BufMut, Bytes, BytesMut};
use framewire_core::{
    error::{Result, WireError},
    frame::{Frame, WireMessage},
    traits::{DecodeOutcome, EncodedFrame, FrameDecoder, FrameEncoder, SizeBudget},
};
use log::debug;

use crate::{
    compress::{compress_frame, QualityLadder},
    expect_binary,
    probe::probe_image,
};

pub struct FragmentedStreamStrategy {
    ladder: QualityLadder,
    fragment_size: usize,
    reassembler: Reassembler,
}

impl FragmentedStreamStrategy {
    pub fn new(ladder: QualityLadder) -> Self {
        Self {
            ladder,
            fragment_size: 0,
            reassembler: Reassembler::new(),
        }
    }

    pub fn fragment_size(mut self, fragment_size: usize) -> Self {
        self.fragment_size = fragment_size;
        self
    }

    pub fn reassembler(&self) -> &Reassembler {
        &self.reassembler
    }
}

/// Splits `payload` into fragments of at most `fragment_size` payload bytes,
/// the first one prefixed with `header`. A zero size yields a single fragment.
pub fn fragment_payload(
    header: StreamHeader,
    payload: &[u8],
    fragment_size: usize,
) -> Vec<WireMessage> {
    let chunk_size = if fragment_size == 0 {
        payload.len().max(1)
    } else {
        fragment_size
    };

    let mut chunks = payload.chunks(chunk_size);

    let mut first_fragment = BytesMut::with_capacity(STREAM_HEADER_LEN + chunk_size);
    header.write(&mut first_fragment);
    if let Some(first_chunk) = chunks.next() {
        first_fragment.put_slice(first_chunk);
    }

    let mut fragments = vec![WireMessage::Binary(first_fragment.freeze())];
    fragments.extend(chunks.map(|chunk| WireMessage::Binary(Bytes::copy_from_slice(chunk))));

    fragments
}

impl FrameEncoder for FragmentedStreamStrategy {
    fn encode(&mut self, frame: &Frame, budget: &SizeBudget) -> Result<EncodedFrame> {
        let compressed = compress_frame(frame, budget, &self.ladder)?;

        let declared_length = u32::try_from(compressed.bytes.len()).map_err(|_| {
            WireError::SizeLimit {
                size: compressed.bytes.len(),
                limit: u32::MAX as usize,
            }
        })?;

        let header = StreamHeader {
            image_id: rand::random(),
            declared_length,
        };

        let messages = fragment_payload(header, &compressed.bytes, self.fragment_size);

        debug!(
            "Image {} ({}) split into {} fragments",
            header.image_id,
            frame.filename(),
            messages.len()
        );

        Ok(EncodedFrame {
            messages,
            quality: compressed.quality,
            width: compressed.width,
            height: compressed.height,
            attempts: 1,
        })
    }
}

impl FrameDecoder for FragmentedStreamStrategy {
    fn decode(&mut self, message: WireMessage) -> Result<DecodeOutcome> {
        let fragment = expect_binary(message)?;

        if !self.reassembler.push(&fragment) {
            return Ok(DecodeOutcome::Partial {
                fragments: self.reassembler.fragments_received(),
            });
        }

        let image = self
            .reassembler
            .extract()
            .ok_or_else(|| WireError::Protocol("Incomplete stream session".to_string()))?;

        let mut image_info = probe_image(&image.bytes, Instant::now())?;
        image_info.fragments_received = Some(image.fragments_received);
        image_info.image_id = Some(image.image_id);

        Ok(DecodeOutcome::Complete(image_info))
    }

    fn on_reply_sent(&mut self) {
        if self.reassembler.is_complete() {
            self.reassembler.reset();
        }
    }
}
