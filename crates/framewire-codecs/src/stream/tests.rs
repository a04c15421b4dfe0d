use bytes::{BufMut, BytesMut};
use framewire_core::frame::WireMessage;
use rand::Rng;

use super::{fragment_payload, Reassembler, ReassemblyState, StreamHeader, STREAM_HEADER_LEN};

fn stream_bytes(image_id: u64, payload: &[u8]) -> Vec<u8> {
    let mut buffer = BytesMut::new();
    StreamHeader {
        image_id,
        declared_length: payload.len() as u32,
    }
    .write(&mut buffer);
    buffer.put_slice(payload);
    buffer.to_vec()
}

fn random_payload(len: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| rng.gen::<u8>()).collect()
}

/// Splits `stream` at random points, keeping the whole header in the first piece.
fn random_split(stream: &[u8]) -> Vec<&[u8]> {
    let mut rng = rand::thread_rng();
    let mut fragments = Vec::new();

    let first_end = rng.gen_range(STREAM_HEADER_LEN..=stream.len());
    fragments.push(&stream[..first_end]);

    let mut offset = first_end;
    while offset < stream.len() {
        let end = rng.gen_range(offset + 1..=stream.len());
        fragments.push(&stream[offset..end]);
        offset = end;
    }

    fragments
}

#[test]
fn header_layout_test() {
    let mut buffer = BytesMut::new();
    StreamHeader {
        image_id: 0x0102030405060708,
        declared_length: 0x0A0B0C0D,
    }
    .write(&mut buffer);

    assert_eq!(
        buffer.to_vec(),
        vec![1, 2, 3, 4, 5, 6, 7, 8, 0x0A, 0x0B, 0x0C, 0x0D]
    );
    assert_eq!(StreamHeader::parse(&buffer[..11]), None);
}

#[test]
fn single_fragment_session_test() {
    let payload = random_payload(64);
    let mut reassembler = Reassembler::new();

    assert_eq!(reassembler.state(), ReassemblyState::Empty);
    assert!(reassembler.push(&stream_bytes(42, &payload)));
    assert_eq!(reassembler.state(), ReassemblyState::Complete);

    let image = reassembler.extract().unwrap();
    assert_eq!(image.bytes.to_vec(), payload);
    assert_eq!(image.image_id, 42);
    assert_eq!(image.fragments_received, 1);
}

#[test]
fn accumulating_session_test() {
    let payload = random_payload(30);
    let stream = stream_bytes(7, &payload);
    let mut reassembler = Reassembler::new();

    assert!(!reassembler.push(&stream[..20]));
    assert_eq!(reassembler.state(), ReassemblyState::Accumulating);
    assert_eq!(reassembler.declared_length(), Some(30));
    assert!(reassembler.extract().is_none());

    assert!(!reassembler.push(&stream[20..30]));
    assert!(reassembler.push(&stream[30..]));

    let image = reassembler.extract().unwrap();
    assert_eq!(image.bytes.to_vec(), payload);
    assert_eq!(image.fragments_received, 3);
}

#[test]
fn reassemble_random_splits_test() {
    for _ in 0..50 {
        let payload = random_payload(rand::thread_rng().gen_range(1..512));
        let stream = stream_bytes(99, &payload);
        let fragments = random_split(&stream);

        let mut reassembler = Reassembler::new();
        let mut previous_len = 0;

        for (idx, fragment) in fragments.iter().enumerate() {
            let complete = reassembler.push(fragment);
            assert!(reassembler.buffered_len() >= previous_len);
            previous_len = reassembler.buffered_len();
            assert_eq!(complete, idx == fragments.len() - 1);
        }

        let image = reassembler.extract().unwrap();
        assert_eq!(image.bytes.to_vec(), payload);
        assert_eq!(image.fragments_received as usize, fragments.len());
    }
}

#[test]
fn excess_bytes_truncated_test() {
    let payload = random_payload(16);
    let mut stream = stream_bytes(1, &payload);
    stream.extend_from_slice(&[0xFF; 8]);

    let mut reassembler = Reassembler::new();
    assert!(reassembler.push(&stream));

    assert_eq!(reassembler.buffered_len(), 24);
    assert_eq!(reassembler.extract().unwrap().bytes.to_vec(), payload);
}

#[test]
fn short_fragment_before_header_test() {
    let mut reassembler = Reassembler::new();

    assert!(!reassembler.push(&[1, 2, 3]));
    assert_eq!(reassembler.state(), ReassemblyState::Empty);
    assert_eq!(reassembler.buffered_len(), 3);
    assert_eq!(reassembler.fragments_received(), 1);
}

#[test]
fn extraction_does_not_reset_test() {
    let payload = random_payload(10);
    let mut reassembler = Reassembler::new();
    reassembler.push(&stream_bytes(5, &payload));

    let first = reassembler.extract().unwrap();
    let second = reassembler.extract().unwrap();
    assert_eq!(first, second);

    reassembler.reset();
    assert_eq!(reassembler.state(), ReassemblyState::Empty);
    assert_eq!(reassembler.fragments_received(), 0);
    assert_eq!(reassembler.image_id(), None);
}

#[test]
fn fragment_payload_test() {
    let payload = random_payload(25);
    let header = StreamHeader {
        image_id: 3,
        declared_length: 25,
    };

    let single = fragment_payload(header, &payload, 0);
    assert_eq!(single.len(), 1);
    assert_eq!(single[0].len(), STREAM_HEADER_LEN + 25);

    let split = fragment_payload(header, &payload, 10);
    let sizes: Vec<usize> = split.iter().map(WireMessage::len).collect();
    assert_eq!(sizes, vec![STREAM_HEADER_LEN + 10, 10, 5]);

    let mut reassembler = Reassembler::new();
    for fragment in &split {
        if let WireMessage::Binary(bytes) = fragment {
            reassembler.push(bytes);
        }
    }
    assert_eq!(reassembler.extract().unwrap().bytes.to_vec(), payload);
}
