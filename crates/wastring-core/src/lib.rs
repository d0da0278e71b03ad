//! WAstring Core Codec
//!
//! This crate decodes and encodes WeakAuras import strings. Three string
//! generations exist in the wild, distinguished by their prefix:
//!
//! * no prefix: base64 over a LibCompress Huffman container, payload in the
//!   AceSerializer text format.
//! * `!`: base64 over raw DEFLATE, payload in the AceSerializer text format.
//! * `!WA:2!`: base64 over raw DEFLATE, payload in the binary format.
//!
//! [`decode`] handles all three; [`encode`] produces the current `!WA:2!`
//! generation and [`encode_legacy`] the `!` generation.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod ace;
pub mod base64;
pub mod binary;
mod error;
pub mod huffman;
mod value;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use error::{CodecError, Result};
pub use value::{LuaMapKey, LuaValue, Map};

use flate2::read::{DeflateDecoder, DeflateEncoder};
use flate2::Compression;
use std::borrow::Cow;
use std::io::Read;

/// Decompressed payloads are capped at 16 MiB.
pub const MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

/// Prefix of the current (binary serialization) string generation
pub const BINARY_PREFIX: &str = "!WA:2!";

/// Prefix of the deflate/AceSerializer string generation
pub const LEGACY_PREFIX: &str = "!";

#[derive(Clone, Copy, PartialEq, Eq)]
enum StringVersion {
    Huffman,             // base64
    Deflate,             // ! + base64
    BinarySerialization, // !WA:2! + base64
}

/// Takes a string encoded by WeakAuras and returns a Vec of [`LuaValue`]s.
pub fn decode(data: &str) -> Result<Vec<LuaValue>> {
    let mut data = data.trim_ascii_end();

    let version = if let Some(rest) = data.strip_prefix(BINARY_PREFIX) {
        data = rest;
        StringVersion::BinarySerialization
    } else if let Some(rest) = data.strip_prefix(LEGACY_PREFIX) {
        data = rest;
        StringVersion::Deflate
    } else {
        StringVersion::Huffman
    };

    let data = base64::decode(data)?;
    let decoded = if version == StringVersion::Huffman {
        huffman::decompress(&data)?
    } else {
        Cow::from(inflate(&data)?)
    };

    if version == StringVersion::BinarySerialization {
        binary::Deserializer::from_slice(&decoded).deserialize()
    } else {
        ace::Deserializer::from_str(&String::from_utf8_lossy(&decoded)).deserialize()
    }
}

/// Takes a [`LuaValue`] and returns a string in the current generation
/// (`!WA:2!`, binary serialization over DEFLATE).
pub fn encode(value: &LuaValue) -> Result<String> {
    let serialized = binary::Serializer::serialize(value, None)?;
    let compressed = deflate(&serialized)?;
    base64::encode_with_prefix(&compressed, BINARY_PREFIX)
}

/// Takes a [`LuaValue`] and returns a string in the legacy `!` generation
/// (AceSerializer over DEFLATE).
pub fn encode_legacy(value: &LuaValue) -> Result<String> {
    let serialized = ace::Serializer::serialize(value)?;
    let compressed = deflate(serialized.as_bytes())?;
    base64::encode_with_prefix(&compressed, LEGACY_PREFIX)
}

fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut result = Vec::new();
    let mut inflater = DeflateDecoder::new(data).take(MAX_PAYLOAD_SIZE as u64);

    inflater
        .read_to_end(&mut result)
        .map_err(|_| CodecError::Inflate)?;

    if result.len() == MAX_PAYLOAD_SIZE {
        // The cap was hit; anything left in the stream means the payload
        // was larger than allowed.
        let mut probe = [0u8; 1];
        let mut inner = inflater.into_inner();
        if inner.read(&mut probe).map_err(|_| CodecError::Inflate)? > 0 {
            return Err(CodecError::PayloadTooLarge(MAX_PAYLOAD_SIZE));
        }
    }

    Ok(result)
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut result = Vec::new();
    DeflateEncoder::new(data, Compression::best())
        .read_to_end(&mut result)
        .map_err(|_| CodecError::Deflate)?;
    Ok(result)
}
