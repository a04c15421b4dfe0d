use bytes::{Buf, BufMut};

pub const STREAM_HEADER_LEN: usize = 12;

/// Prefix of the first fragment of every image: big-endian image id (8 bytes)
/// followed by the big-endian payload length (4 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamHeader {
    pub image_id: u64,
    pub declared_length: u32,
}

impl StreamHeader {
    pub fn parse(fragment: &[u8]) -> Option<Self> {
        if fragment.len() < STREAM_HEADER_LEN {
            return None;
        }

        let mut header = &fragment[..STREAM_HEADER_LEN];

        Some(Self {
            image_id: header.get_u64(),
            declared_length: header.get_u32(),
        })
    }

    pub fn write<B: BufMut>(&self, buffer: &mut B) {
        buffer.put_u64(self.image_id);
        buffer.put_u32(self.declared_length);
    }
}
