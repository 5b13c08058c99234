//! Codec round-trip, size ceiling and integrity tests

use batchline_codec::{decode, encode, Codec, CodecConfig, Encoding};
use batchline_common::{BatchlineError, ErrorKind, MAX_PAYLOAD_BYTES};
use proptest::prelude::*;
use serde_json::{json, Value};

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        ".{0,24}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
            prop::collection::btree_map("[a-z_]{1,8}", inner, 0..8)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn round_trip_preserves_any_json_value(value in arb_json(), compress in any::<bool>()) {
        let payload = encode(&value, compress).unwrap();
        prop_assert!(payload.len() <= MAX_PAYLOAD_BYTES);
        prop_assert_eq!(payload.encoding(), Encoding::from_flag(compress));

        let decoded: Value = decode(payload.as_bytes(), compress).unwrap();
        prop_assert_eq!(decoded, value);
    }
}

#[test]
fn plain_encoding_is_utf8_json() {
    let payload = encode(&json!({"event": "scan", "count": 3}), false).unwrap();
    let text = std::str::from_utf8(payload.as_bytes()).unwrap();
    assert_eq!(text, r#"{"count":3,"event":"scan"}"#);
    assert_eq!(payload.original_size(), payload.len());
}

#[test]
fn compressed_encoding_is_base64_text() {
    let value = json!({"readings": vec!["sensor-0001"; 500]});
    let payload = encode(&value, true).unwrap();

    assert!(payload
        .as_bytes()
        .iter()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'=')));
    assert!(payload.len() < payload.original_size());
}

#[test]
fn oversize_plain_payload_is_rejected_with_actual_size() {
    let value = Value::String("x".repeat(MAX_PAYLOAD_BYTES));
    let err = encode(&value, false).unwrap_err();
    // Two bytes of JSON quoting around the string
    assert_eq!(
        err,
        BatchlineError::PayloadTooLarge {
            size: MAX_PAYLOAD_BYTES + 2,
            limit: MAX_PAYLOAD_BYTES
        }
    );
}

#[test]
fn size_check_applies_after_compression() {
    // Highly repetitive data far over the limit compresses well under it
    let value = Value::String("a".repeat(MAX_PAYLOAD_BYTES * 2));
    assert!(encode(&value, false).is_err());
    let payload = encode(&value, true).unwrap();
    assert!(payload.len() <= MAX_PAYLOAD_BYTES);
}

#[test]
fn configured_ceiling_is_enforced() {
    let codec = Codec::new(CodecConfig {
        max_payload_bytes: 16,
        ..CodecConfig::default()
    });
    assert!(codec.encode(&json!([1, 2, 3]), false).is_ok());
    let err = codec
        .encode(&json!({"too": "long for sixteen bytes"}), false)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PayloadTooLarge);
}

#[test]
fn corrupt_payloads_fail_with_decode_error() {
    let not_base64 = decode::<Value>(b"%%% not base64 %%%", true).unwrap_err();
    assert_eq!(not_base64.kind(), ErrorKind::PayloadDecode);

    // Valid base64 of bytes that are not a gzip stream
    let not_gzip = decode::<Value>(b"aGVsbG8gd29ybGQ=", true).unwrap_err();
    assert_eq!(not_gzip.kind(), ErrorKind::PayloadDecode);

    let not_json = decode::<Value>(b"{\"open\": ", false).unwrap_err();
    assert_eq!(not_json.kind(), ErrorKind::PayloadDecode);
    assert!(!not_json.is_transient());
}

#[test]
fn compressed_payload_tolerates_trailing_newline() {
    let value = json!({"id": 7});
    let mut bytes = encode(&value, true).unwrap().into_bytes();
    bytes.push(b'\n');
    let decoded: Value = decode(&bytes, true).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn decoding_without_the_compression_flag_does_not_guess() {
    let payload = encode(&json!({"id": 7}), true).unwrap();
    let err = decode::<Value>(payload.as_bytes(), false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PayloadDecode);
}

#[test]
fn bytes_after_the_gzip_stream_are_rejected() {
    use base64::{engine::general_purpose, Engine as _};

    let mut framed = batchline_codec::gzip::compress(br#"{"a":"b"}"#, 6).unwrap();
    assert_eq!(
        batchline_codec::gzip::decompress(&framed).unwrap(),
        br#"{"a":"b"}"#
    );

    framed.extend_from_slice(b"GARBAGE-TRAILING-BYTES");
    let text = general_purpose::STANDARD.encode(&framed);
    let err = decode::<Value>(text.as_bytes(), true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PayloadDecode);
}

#[test]
fn incompressible_value_over_the_ceiling_fails_after_compression() {
    let noise = xorshift_hex(2 * MAX_PAYLOAD_BYTES);

    let err = encode(&noise, true).unwrap_err();

    let BatchlineError::PayloadTooLarge { size, limit } = err else {
        panic!("expected PayloadTooLarge");
    };
    assert_eq!(limit, MAX_PAYLOAD_BYTES);
    assert!(size > MAX_PAYLOAD_BYTES);
}

fn xorshift_hex(len: usize) -> String {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut out = String::with_capacity(len);
    while out.len() < len {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        out.push_str(&format!("{state:016x}"));
    }
    out.truncate(len);
    out
}
