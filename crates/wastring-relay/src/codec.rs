//! Codec capability behind the relay
//!
//! The relay is generic over [`CodecProvider`] so tests can substitute a
//! provider that fails to load or a codec with canned behavior.

use async_trait::async_trait;

use crate::error::Result;
use wastring_core::LuaValue;

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// A loaded codec capability.
pub trait Codec: Send + Sync {
    /// Decodes an import string into a JSON value.
    fn decode(&self, data: &str) -> Result<serde_json::Value>;

    /// Encodes a JSON value into an import string.
    fn encode(&self, data: &serde_json::Value) -> Result<String>;
}

/// Produces a [`Codec`] once, asynchronously, at relay startup.
#[async_trait]
pub trait CodecProvider: Send {
    async fn load(&mut self) -> Result<Box<dyn Codec>>;
}

// ----------------------------------------------------------------------------
// WAstring Implementation
// ----------------------------------------------------------------------------

/// The standard codec, backed by `wastring-core`.
pub struct WaCodec;

impl Codec for WaCodec {
    fn decode(&self, data: &str) -> Result<serde_json::Value> {
        let mut values = wastring_core::decode(data)?;

        // Import strings carry a single root value; if more are present,
        // surface all of them as an array rather than dropping any.
        if values.len() == 1 {
            Ok(serde_json::to_value(values.remove(0))?)
        } else {
            Ok(serde_json::to_value(values)?)
        }
    }

    fn encode(&self, data: &serde_json::Value) -> Result<String> {
        let value = LuaValue::from_json(data);
        Ok(wastring_core::encode(&value)?)
    }
}

/// Provider for the standard codec.
#[derive(Default)]
pub struct WaCodecProvider;

#[async_trait]
impl CodecProvider for WaCodecProvider {
    async fn load(&mut self) -> Result<Box<dyn Codec>> {
        Ok(Box::new(WaCodec))
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn codec_round_trips_json() {
        let codec = WaCodec;
        let original = json!({"id": "Glow", "priority": 3, "loaded": true});

        let encoded = codec.encode(&original).unwrap();
        let decoded = codec.decode(&encoded).unwrap();

        assert_eq!(decoded["id"], "Glow");
        assert_eq!(decoded["priority"], 3.0);
        assert_eq!(decoded["loaded"], true);
    }

    #[test]
    fn decode_propagates_codec_errors() {
        assert!(WaCodec.decode("!WA:2!*****").is_err());
    }
}
