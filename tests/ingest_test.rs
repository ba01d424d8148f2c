use marker_pose_viewer::error::{DecodeError, DrawError};
use marker_pose_viewer::frame_queue::frame_queue;
use marker_pose_viewer::ingest::{Ingest, IngestStats};
use marker_pose_viewer::marker::{MarkerFrame, MarkerRecord, decode_payload, encode_payload};
use serde_json::json;

#[test]
fn test_single_marker_payload() {
    let payload =
        br#"{"markers": {"m1": {"position":[0,0,0],"rotation":[0,0,0],"origin": true}}}"#;
    let frame = decode_payload(payload, "markers").unwrap();
    assert_eq!(frame.len(), 1);
    let records = frame.records().unwrap();
    let (id, m1) = &records[0];
    assert_eq!(id, "m1");
    assert!(m1.origin);
    assert_eq!(m1.position, [0.0, 0.0, 0.0]);
    assert_eq!(m1.rotation, [0.0, 0.0, 0.0]);
}

#[test]
fn test_missing_markers_is_empty_frame() {
    for payload in [&br#"{}"#[..], br#"{"markers": {}}"#, br#"{"other": 1}"#] {
        let frame = decode_payload(payload, "markers").unwrap();
        assert!(frame.is_empty());
        assert!(frame.records().unwrap().is_empty());
    }
}

#[test]
fn test_odd_marker_mapping_is_left_for_the_renderer() {
    // only the encoding is checked on ingest
    let null = decode_payload(br#"{"markers": null}"#, "markers").unwrap();
    assert_eq!(null.raw(), &json!(null));
    assert!(matches!(null.records(), Err(DrawError::InvalidMarkers(_))));

    let short = decode_payload(
        br#"{"markers": {"m": {"position":[0,0],"rotation":[0,0,0]}}}"#,
        "markers",
    )
    .unwrap();
    assert_eq!(short.len(), 1);
    assert!(matches!(
        short.records(),
        Err(DrawError::InvalidMarker { ref id, .. }) if id == "m"
    ));

    let list = decode_payload(br#"{"markers": [1]}"#, "markers").unwrap();
    assert!(list.is_empty());
    assert!(list.records().is_err());
}

#[test]
fn test_custom_field_name() {
    let payload = br#"{"tags": {"a": {"position":[1,2,3],"rotation":[0.1,0,0]}}}"#;
    let records = decode_payload(payload, "tags").unwrap().records().unwrap();
    assert_eq!(records[0].1.position, [1.0, 2.0, 3.0]);
    assert!(!records[0].1.origin);
    assert!(decode_payload(payload, "markers").unwrap().is_empty());
}

#[test]
fn test_malformed_payloads() {
    assert!(matches!(
        decode_payload(b"{\"markers\": ", "markers"),
        Err(DecodeError::Json(_))
    ));
    assert!(matches!(
        decode_payload(b"[1, 2, 3]", "markers"),
        Err(DecodeError::NotAnObject)
    ));
    assert!(decode_payload(&[0xff, 0xfe, 0x00], "markers").is_err());
    assert!(decode_payload(b"\"markers\"", "markers").is_err());
}

#[test]
fn test_encode_then_decode_keeps_frame() {
    let frame: MarkerFrame = [
        (
            "0".to_string(),
            MarkerRecord::new([0.0, 0.0, 0.0], [0.0, 0.0, 0.0]).with_origin(true),
        ),
        ("1".to_string(), MarkerRecord::new([0.1, -0.05, 0.02], [0.0, 0.3, 0.0])),
    ]
    .into_iter()
    .collect();
    let payload = encode_payload(&frame, "markers").unwrap();
    assert_eq!(decode_payload(&payload, "markers").unwrap(), frame);
}

#[test]
fn test_one_push_per_decoded_message() {
    let (producer, consumer) = frame_queue();
    let ingest = Ingest::new(producer, "markers");

    ingest
        .on_message(br#"{"markers": {"m1": {"position":[0,0,0],"rotation":[0,0,0]}}}"#)
        .unwrap();
    ingest.on_message(br#"{"markers": {}}"#).unwrap();
    assert_eq!(consumer.len(), 2);

    assert_eq!(consumer.pop_blocking().unwrap().len(), 1);
    assert!(consumer.pop_blocking().unwrap().is_empty());
}

#[test]
fn test_malformed_record_is_still_pushed() {
    let (producer, consumer) = frame_queue();
    let ingest = Ingest::new(producer, "markers");
    ingest
        .on_message(br#"{"markers": {"m": {"position":[0,0],"rotation":[0,0,0]}}}"#)
        .unwrap();
    ingest.on_message(br#"{"markers": null}"#).unwrap();
    assert_eq!(consumer.len(), 2);
    assert_eq!(ingest.stats().accepted, 2);
}

#[test]
fn test_malformed_message_pushes_nothing() {
    let (producer, consumer) = frame_queue();
    let ingest = Ingest::new(producer, "markers");

    let result = ingest.on_message(b"not json");
    assert!(matches!(result, Err(DecodeError::Json(_))));
    assert!(consumer.is_empty());

    ingest.on_message(br#"{"markers": {}}"#).unwrap();
    assert_eq!(
        ingest.stats(),
        IngestStats {
            accepted: 1,
            rejected: 1
        }
    );
    assert_eq!(consumer.len(), 1);
}
