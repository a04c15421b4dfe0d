use std::fmt::Debug;

use bytes::{Bytes, BytesMut};
use log::debug;

use super::header::{StreamHeader, STREAM_HEADER_LEN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReassemblyState {
    Empty,
    Accumulating,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReassembledImage {
    pub bytes: Bytes,
    pub image_id: u64,
    pub fragments_received: u32,
}

/// Rebuilds one image at a time from an ordered sequence of fragments.
///
/// The header is parsed from the first fragment holding at least 12 bytes;
/// shorter fragments seen before it are kept as payload. Once the buffer
/// reaches the declared length the session is complete and stays so until
/// [`Reassembler::reset`] is called.
#[derive(Default)]
pub struct Reassembler {
    buffer: BytesMut,
    header: Option<StreamHeader>,
    fragments_received: u32,
}

impl Debug for Reassembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let progress = match self.header {
            Some(header) => format!("{}/{}", self.buffer.len(), header.declared_length),
            None => format!("{}/?", self.buffer.len()),
        };

        f.debug_struct("Reassembler")
            .field("state", &self.state())
            .field("progress", &progress)
            .field("fragments_received", &self.fragments_received)
            .finish()
    }
}

impl Reassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fragment and tells whether the session is now complete.
    pub fn push(&mut self, fragment: &[u8]) -> bool {
        match self.header {
            None => match StreamHeader::parse(fragment) {
                Some(header) => {
                    debug!("Stream header: {:?}", header);
                    self.header = Some(header);
                    self.buffer.extend_from_slice(&fragment[STREAM_HEADER_LEN..]);
                }
                None => self.buffer.extend_from_slice(fragment),
            },
            Some(_) => self.buffer.extend_from_slice(fragment),
        }

        self.fragments_received += 1;

        debug!("Fragment #{} registered: {:?}", self.fragments_received, self);

        self.is_complete()
    }

    pub fn state(&self) -> ReassemblyState {
        match self.header {
            None => ReassemblyState::Empty,
            Some(_) if self.is_complete() => ReassemblyState::Complete,
            Some(_) => ReassemblyState::Accumulating,
        }
    }

    pub fn is_complete(&self) -> bool {
        match self.header {
            Some(header) => self.buffer.len() >= header.declared_length as usize,
            None => false,
        }
    }

    /// Exactly the first `declared_length` bytes of the buffer, once complete.
    /// Leaves the session untouched.
    pub fn extract(&self) -> Option<ReassembledImage> {
        let header = self.header.filter(|_| self.is_complete())?;

        Some(ReassembledImage {
            bytes: Bytes::copy_from_slice(&self.buffer[..header.declared_length as usize]),
            image_id: header.image_id,
            fragments_received: self.fragments_received,
        })
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.header = None;
        self.fragments_received = 0;
    }

    pub fn fragments_received(&self) -> u32 {
        self.fragments_received
    }

    pub fn image_id(&self) -> Option<u64> {
        self.header.map(|header| header.image_id)
    }

    pub fn declared_length(&self) -> Option<u32> {
        self.header.map(|header| header.declared_length)
    }

    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }
}
