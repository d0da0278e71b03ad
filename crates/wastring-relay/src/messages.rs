//! Wire shapes for the relay protocol
//!
//! Inbound payloads are untyped JSON objects carrying an `action` field;
//! outbound messages are tagged with a `message` field. Both shapes mirror
//! the worker protocol this relay replaces.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ----------------------------------------------------------------------------
// Outbound
// ----------------------------------------------------------------------------

/// A message posted on the response channel.
///
/// Serializes as `{"message": "...", "data": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "message", content = "data", rename_all = "lowercase")]
pub enum Response {
    /// The codec capability finished loading. Sent exactly once, before any
    /// request outcome.
    Initialized(()),
    /// A request completed; `data` carries the result.
    Completed(serde_json::Value),
    /// A request could not be served; `data` carries a diagnostic.
    Failure(String),
}

// ----------------------------------------------------------------------------
// Inbound
// ----------------------------------------------------------------------------

/// A recognized, well-formed request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Request {
    /// Decode an import string into a JSON value.
    Decode { data: String },
    /// Encode a JSON value into an import string.
    Encode { data: serde_json::Value },
}

/// Why an inbound payload could not be turned into a [`Request`]
#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("missing action field")]
    MissingAction,

    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("malformed {0} request: {1}")]
    Malformed(&'static str, String),
}

impl Request {
    /// Classifies an untyped inbound payload.
    ///
    /// Unknown and missing actions are distinguished from malformed requests
    /// for a known action so the relay can apply different reply policies.
    pub fn classify(payload: &serde_json::Value) -> core::result::Result<Request, RequestError> {
        let action = payload.get("action").and_then(|a| a.as_str());

        match action {
            Some("decode") => match payload.get("data").and_then(|d| d.as_str()) {
                Some(data) => Ok(Request::Decode { data: data.to_owned() }),
                None => Err(RequestError::Malformed(
                    "decode",
                    "the data field must be a string".to_owned(),
                )),
            },
            Some("encode") => Ok(Request::Encode {
                data: payload.get("data").cloned().unwrap_or(serde_json::Value::Null),
            }),
            Some(other) => Err(RequestError::UnknownAction(other.to_owned())),
            None => Err(RequestError::MissingAction),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
