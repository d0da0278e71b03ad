//! Error types for the relay

use thiserror::Error;

/// Errors that are fatal to a relay instance.
///
/// Request-level failures (bad input, codec errors) are never fatal; they
/// are reported to the caller as `failure` responses instead.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("codec error: {0}")]
    Codec(#[from] wastring_core::CodecError),

    #[error("JSON conversion error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("codec capability failed to load: {0}")]
    LoadFailed(String),

    #[error("response channel closed")]
    ChannelClosed,
}

/// Result type for relay operations
pub type Result<T> = core::result::Result<T, RelayError>;
