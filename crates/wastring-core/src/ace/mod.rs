//! AceSerializer text format (rev 1)
//!
//! The legacy serialization used by WeakAuras before the binary format: a
//! `^1` revision marker followed by control pairs (`^S` string, `^N` number,
//! `^F`/`^f` mantissa/exponent, `^B`/`^b` booleans, `^Z` nil, `^T`…`^t`
//! tables, `^^` end of stream).

mod de;
mod reader;
mod ser;

pub use de::Deserializer;
pub use ser::Serializer;

/// AceSerializer stream revision marker
pub(crate) const REVISION: &str = "^1";

/// End-of-stream marker
pub(crate) const STREAM_END: &str = "^^";
