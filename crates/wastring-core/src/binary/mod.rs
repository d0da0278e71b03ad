//! Binary serialization format (`!WA:2!` payloads)
//!
//! Values are self-describing. The low bits of each type byte select one of
//! four layouts:
//!
//! * `NNNNNNN1`: a seven-bit non-negative integer.
//! * `CCCCTT10`: an embedded string/array/map. `TT` picks the kind
//!   (0 = string, 1 = array, 2 = map, 3 = reserved) and `CCCC` is the byte,
//!   element, or pair count.
//! * `NNNNS100`: a twelve-bit signed integer. The low nibble lives in the
//!   type byte, the sign in bit 3, and the upper eight bits in the following
//!   byte.
//! * `TTTTT000`: extended tags (nil, false, true, int16/32/64, float64,
//!   str16/32, array16/32, map16/32). Multi-byte scalars are big-endian.
//!
//! Root values are concatenated with no global header; deserialization reads
//! until the input is exhausted. Arrays deserialize into maps with 1-based
//! numeric keys, matching the Lua sequence convention.

mod de;
mod ser;

pub use de::Deserializer;
pub use ser::Serializer;

// Extended tags (the `TTTTT` of `TTTTT000`)
pub(crate) const TAG_NULL: u8 = 0;
pub(crate) const TAG_FALSE: u8 = 1;
pub(crate) const TAG_TRUE: u8 = 2;
pub(crate) const TAG_INT16: u8 = 3;
pub(crate) const TAG_INT32: u8 = 4;
pub(crate) const TAG_INT64: u8 = 5;
pub(crate) const TAG_FLOAT64: u8 = 6;
pub(crate) const TAG_STR16: u8 = 7;
pub(crate) const TAG_STR32: u8 = 8;
pub(crate) const TAG_ARRAY16: u8 = 9;
pub(crate) const TAG_ARRAY32: u8 = 10;
pub(crate) const TAG_MAP16: u8 = 11;
pub(crate) const TAG_MAP32: u8 = 12;

// Embedded kinds (the `TT` of `CCCCTT10`)
pub(crate) const EMBED_STRING: u8 = 0;
pub(crate) const EMBED_ARRAY: u8 = 1;
pub(crate) const EMBED_MAP: u8 = 2;

/// Largest count an embedded container can carry
pub(crate) const EMBED_MAX: usize = 15;
