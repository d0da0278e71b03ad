//! WeakAuras-flavoured base64
//!
//! The in-game encoder uses its own alphabet (`a-z A-Z 0-9 ( )`) and packs
//! six-bit groups little-endian: the first character of a quartet carries the
//! lowest six bits of the first byte. There is no padding; a trailing group
//! of two or three characters carries one or two bytes.

use crate::{CodecError, Result};

const ALPHABET: &[u8; 64] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789()";

const INVALID: u8 = 0xFF;

static DECODE_MAP: [u8; 256] = build_decode_map();

const fn build_decode_map() -> [u8; 256] {
    let mut map = [INVALID; 256];
    let mut i = 0;
    while i < ALPHABET.len() {
        map[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    map
}

/// Decode a WeakAuras base64 string.
///
/// Any byte outside the alphabet is an error, as is a length of `4k + 1`
/// (a lone trailing character cannot carry a whole byte).
pub fn decode(s: &str) -> Result<Vec<u8>> {
    if s.len() % 4 == 1 {
        return Err(CodecError::InvalidBase64Length);
    }

    let mut result = Vec::with_capacity(s.len() / 4 * 3 + 2);
    let mut word = 0u32;
    let mut word_bitlen = 0u32;

    for (offset, &byte) in s.as_bytes().iter().enumerate() {
        let sextet = DECODE_MAP[byte as usize];
        if sextet == INVALID {
            return Err(CodecError::InvalidBase64Symbol(offset));
        }

        word |= u32::from(sextet) << word_bitlen;
        word_bitlen += 6;

        if word_bitlen == 24 {
            result.push(word as u8);
            result.push((word >> 8) as u8);
            result.push((word >> 16) as u8);
            word = 0;
            word_bitlen = 0;
        }
    }

    while word_bitlen >= 8 {
        result.push(word as u8);
        word >>= 8;
        word_bitlen -= 8;
    }

    Ok(result)
}

/// Encode bytes as a WeakAuras base64 string.
pub fn encode(data: &[u8]) -> Result<String> {
    encode_with_prefix(data, "")
}

/// Encode bytes as a WeakAuras base64 string preceded by a format prefix.
pub fn encode_with_prefix(data: &[u8], prefix: &str) -> Result<String> {
    let capacity = data
        .len()
        .checked_mul(4)
        .and_then(|len| len.checked_add(2))
        .map(|len| len / 3)
        .and_then(|len| len.checked_add(prefix.len()))
        .ok_or(CodecError::InputTooLarge)?;

    let mut result = String::with_capacity(capacity);
    result.push_str(prefix);

    let mut chunks = data.chunks_exact(3);
    for chunk in chunks.by_ref() {
        let word =
            u32::from(chunk[0]) | u32::from(chunk[1]) << 8 | u32::from(chunk[2]) << 16;

        result.push(ALPHABET[(word & 0x3F) as usize] as char);
        result.push(ALPHABET[(word >> 6 & 0x3F) as usize] as char);
        result.push(ALPHABET[(word >> 12 & 0x3F) as usize] as char);
        result.push(ALPHABET[(word >> 18 & 0x3F) as usize] as char);
    }

    let mut word = 0u32;
    let mut word_bitlen = 0u32;
    for &byte in chunks.remainder() {
        word |= u32::from(byte) << word_bitlen;
        word_bitlen += 8;
    }
    while word_bitlen > 0 {
        result.push(ALPHABET[(word & 0x3F) as usize] as char);
        word >>= 6;
        word_bitlen = word_bitlen.saturating_sub(6);
    }

    Ok(result)
}
