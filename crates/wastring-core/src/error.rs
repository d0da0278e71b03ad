//! Error types for the WAstring codec
//!
//! Every failure the pipeline can produce is collected in [`CodecError`] so
//! that callers get one error type whether the problem was in the base64
//! layer, a compression container, or one of the serialization formats.

use thiserror::Error;

/// Errors produced while decoding or encoding a WeakAuras string
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    // base64 layer
    #[error("invalid base64 length")]
    InvalidBase64Length,

    #[error("invalid base64 symbol at offset {0}")]
    InvalidBase64Symbol(usize),

    #[error("input is too large to encode")]
    InputTooLarge,

    // compression containers
    #[error("unknown compression codec: {0:#04x}")]
    UnknownCompressionCodec(u8),

    #[error("unexpected end of input")]
    TruncatedInput,

    #[error("huffman data is malformed")]
    MalformedHuffman,

    #[error("decompressed payload exceeds the {0} byte limit")]
    PayloadTooLarge(usize),

    #[error("failed to inflate compressed data")]
    Inflate,

    #[error("failed to deflate payload")]
    Deflate,

    // AceSerializer text format
    #[error("input is not AceSerializer data (rev 1)")]
    BadSerializationRevision,

    #[error("unknown control sequence: {0}")]
    UnknownControl(String),

    #[error("invalid string escape")]
    InvalidEscape,

    #[error("failed to parse a number: {0}")]
    BadNumber(String),

    #[error("missing exponent after mantissa")]
    MissingExponent,

    #[error("unexpected end of a table")]
    UnexpectedTableEnd,

    // binary format
    #[error("unknown type tag: {0:#04x}")]
    UnknownTypeTag(u8),

    // shared by both serialization formats
    #[error("map keys cannot be null")]
    NullMapKey,

    #[error("recursion limit exceeded")]
    RecursionLimitExceeded,
}

/// Result type for codec operations
pub type Result<T> = core::result::Result<T, CodecError>;
