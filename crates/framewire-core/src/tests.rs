use std::{collections::HashSet, str::FromStr};

use crate::{
    error::WireError,
    frame::{Frame, ImageInfo},
    reply::ServerReply,
    strategy::Strategy,
};

fn sample_info() -> ImageInfo {
    ImageInfo {
        width: 640,
        height: 480,
        format: Some("JPEG".to_string()),
        mode: "RGB".to_string(),
        channels: 3,
        process_time_ms: 1.5,
        fragments_received: None,
        image_id: None,
    }
}

#[test]
fn processed_reply_envelope_test() {
    let reply = ServerReply::processed(sample_info());
    let value = serde_json::to_value(&reply).unwrap();

    assert_eq!(value["status"], "processed");
    assert_eq!(value["image_info"]["width"], 640);
    assert_eq!(value["image_info"]["mode"], "RGB");
    assert!(value["image_info"].get("image_id").is_none());
}

#[test]
fn fragment_and_error_envelopes_test() {
    let ack = serde_json::to_string(&ServerReply::fragment_received(3)).unwrap();
    assert_eq!(ack, r#"{"status":"fragment_received","fragments":3}"#);

    let error: ServerReply =
        serde_json::from_str(r#"{"status": "error", "message": "Expected a binary message"}"#)
            .unwrap();
    assert_eq!(error, ServerReply::error("Expected a binary message"));
    assert!(error.is_terminal());
    assert!(!ServerReply::fragment_received(1).is_terminal());
}

#[test]
fn strategy_ports_are_distinct_test() {
    let ports: HashSet<u16> = Strategy::all().iter().map(Strategy::port).collect();
    assert_eq!(ports.len(), 4);
}

#[test]
fn strategy_aliases_test() {
    assert_eq!(Strategy::from_str("base64").unwrap(), Strategy::TextEnvelope);
    assert_eq!(Strategy::from_str("Raw-Binary").unwrap(), Strategy::RawBinary);
    assert_eq!(
        Strategy::from_str("structured-matrix").unwrap(),
        Strategy::StructuredMatrix
    );
    assert_eq!(Strategy::from_str("stream").unwrap(), Strategy::FragmentedStream);
    assert!(matches!(
        Strategy::from_str("carrier-pigeon"),
        Err(WireError::UnknownStrategy(_))
    ));
}

#[test]
fn message_level_errors_test() {
    assert!(WireError::Decode("bad base64".to_string()).is_message_level());
    assert!(WireError::SizeLimit { size: 10, limit: 5 }.is_message_level());
    assert!(!WireError::Connection("reset".to_string()).is_message_level());
    assert!(!WireError::Process("exit 1".to_string()).is_message_level());
}

#[test]
fn frame_load_test() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pixel.png");
    image::RgbImage::new(4, 2).save(&path).unwrap();

    let frame = Frame::load(&path).unwrap();

    assert_eq!(frame.filename(), "pixel.png");
    assert_eq!(frame.format(), Some(image::ImageFormat::Png));
    assert!(frame.timestamp() > 0.0);
}

#[test]
fn vec_avg_test() {
    let empty: Vec<f64> = Vec::new();
    assert_eq!(crate::vec_avg!(empty, f64), 0.0);

    let values = vec![1.0, 2.0, 6.0];
    assert_eq!(crate::vec_avg!(values, f64), 3.0);
}

#[test]
fn reply_message_test() {
    let missing_image = WireError::Protocol("No 'image' field found in the message".to_string());
    assert_eq!(
        missing_image.reply_message(),
        "No 'image' field found in the message"
    );

    let bad_base64 = WireError::Decode("Invalid base64 image data: bad".to_string());
    assert_eq!(bad_base64.reply_message(), "Invalid base64 image data: bad");

    let oversized = WireError::SizeLimit { size: 10, limit: 5 };
    assert_eq!(oversized.reply_message(), oversized.to_string());
}
