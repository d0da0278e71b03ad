//! End-to-end tests for the decode/encode pipeline
//!
//! These exercise the full stack: prefix detection, base64, the compression
//! containers, and both serialization formats.

use flate2::read::DeflateEncoder;
use flate2::Compression;
use std::io::Read;

use wastring_core::{
    base64, decode, encode, encode_legacy, CodecError, LuaMapKey, LuaValue, Map,
    BINARY_PREFIX, LEGACY_PREFIX, MAX_PAYLOAD_SIZE,
};

fn sample_aura() -> LuaValue {
    let mut trigger = Map::new();
    trigger.insert(
        LuaMapKey::from_value(LuaValue::String("event".into())).unwrap(),
        LuaValue::String("Health".into()),
    );
    trigger.insert(
        LuaMapKey::from_value(LuaValue::String("threshold".into())).unwrap(),
        LuaValue::Number(0.35),
    );

    let mut aura = Map::new();
    aura.insert(
        LuaMapKey::from_value(LuaValue::String("id".into())).unwrap(),
        LuaValue::String("Low Health Glow".into()),
    );
    aura.insert(
        LuaMapKey::from_value(LuaValue::String("trigger".into())).unwrap(),
        LuaValue::Map(trigger),
    );
    aura.insert(
        LuaMapKey::from_value(LuaValue::String("loaded".into())).unwrap(),
        LuaValue::Boolean(true),
    );
    aura.insert(
        LuaMapKey::from_value(LuaValue::String("iconScale".into())).unwrap(),
        LuaValue::Number(2.0),
    );
    LuaValue::Map(aura)
}

#[test]
fn binary_generation_round_trips() {
    let original = sample_aura();
    let encoded = encode(&original).unwrap();

    assert!(encoded.starts_with(BINARY_PREFIX));
    assert_eq!(decode(&encoded).unwrap(), vec![original]);
}

#[test]
fn legacy_generation_round_trips() {
    let original = sample_aura();
    let encoded = encode_legacy(&original).unwrap();

    assert!(encoded.starts_with(LEGACY_PREFIX));
    assert!(!encoded.starts_with(BINARY_PREFIX));
    assert_eq!(decode(&encoded).unwrap(), vec![original]);
}

#[test]
fn huffman_generation_decodes() {
    // Oldest format: no prefix, LibCompress container around AceSerializer
    // text. A stored (uncompressed) container is enough to drive the path.
    let mut payload = vec![1u8];
    payload.extend_from_slice(b"^1^T^Sname^Sgrim^t^^");
    let encoded = base64::encode(&payload).unwrap();

    let values = decode(&encoded).unwrap();
    assert_eq!(values.len(), 1);

    let LuaValue::Map(map) = &values[0] else {
        panic!("expected a map");
    };
    assert_eq!(
        map.get(&LuaMapKey::from_value(LuaValue::String("name".into())).unwrap()),
        Some(&LuaValue::String("grim".into()))
    );
}

#[test]
fn trailing_whitespace_is_tolerated() {
    let encoded = format!("{}\r\n  ", encode(&LuaValue::Number(7.0)).unwrap());
    assert_eq!(decode(&encoded).unwrap(), vec![LuaValue::Number(7.0)]);
}

#[test]
fn garbage_base64_is_rejected() {
    assert!(matches!(
        decode("!WA:2!not*valid*base64").unwrap_err(),
        CodecError::InvalidBase64Symbol(_)
    ));
}

#[test]
fn garbage_deflate_stream_is_rejected() {
    // Valid base64 over a DEFLATE block with the reserved BTYPE.
    let encoded = base64::encode_with_prefix(&[0x07; 4], BINARY_PREFIX).unwrap();
    assert_eq!(decode(&encoded).unwrap_err(), CodecError::Inflate);
}

#[test]
fn oversized_payload_is_rejected() {
    // One byte over the cap; zeros compress small enough to carry.
    let payload = vec![0u8; MAX_PAYLOAD_SIZE + 1];
    let mut compressed = Vec::new();
    DeflateEncoder::new(payload.as_slice(), Compression::fast())
        .read_to_end(&mut compressed)
        .unwrap();

    let encoded = base64::encode_with_prefix(&compressed, BINARY_PREFIX).unwrap();
    assert_eq!(
        decode(&encoded).unwrap_err(),
        CodecError::PayloadTooLarge(MAX_PAYLOAD_SIZE)
    );
}

#[test]
fn unknown_huffman_codec_is_rejected() {
    let encoded = base64::encode(&[7, 0, 0, 0, 0, 0]).unwrap();
    assert_eq!(
        decode(&encoded).unwrap_err(),
        CodecError::UnknownCompressionCodec(7)
    );
}

#[test]
fn scalar_roots_round_trip() {
    for value in [
        LuaValue::Null,
        LuaValue::Boolean(true),
        LuaValue::Number(-1234.5),
        LuaValue::String("über-aura ~^~".into()),
    ] {
        let encoded = encode(&value).unwrap();
        assert_eq!(decode(&encoded).unwrap(), vec![value.clone()], "binary");

        let encoded = encode_legacy(&value).unwrap();
        assert_eq!(decode(&encoded).unwrap(), vec![value], "legacy");
    }
}

#[test]
fn json_conversion_survives_the_pipeline() {
    let json: serde_json::Value = serde_json::from_str(
        r#"{"name": "test", "tags": ["a", "b"], "depth": 3, "active": false}"#,
    )
    .unwrap();
    let value = LuaValue::from_json(&json);

    let encoded = encode(&value).unwrap();
    let decoded = decode(&encoded).unwrap();
    assert_eq!(decoded, vec![value]);

    // And back out to JSON.
    let out = serde_json::to_value(&decoded[0]).unwrap();
    assert_eq!(out["name"], "test");
    assert_eq!(out["tags"]["1"], "a");
    assert_eq!(out["active"], false);
}
