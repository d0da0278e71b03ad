//! WAstring CLI configuration management
//!
//! Configuration is read from a TOML file when one is given on the command
//! line; every field has a default so a partial (or absent) file works.

use serde::{Deserialize, Serialize};

use wastring_relay::RelayConfig;

use crate::error::{CliError, Result};

/// Complete configuration for the CLI application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Relay behavior for the `serve` command
    pub relay: RelayConfig,
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            CliError::Config(format!(
                "Failed to read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Ok(toml::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wastring_relay::ReplyPolicy;

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [relay]
            encode_replies = "diagnostic_only"
            request_buffer_size = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.relay.encode_replies, ReplyPolicy::DiagnosticOnly);
        assert_eq!(config.relay.request_buffer_size, 8);
        assert_eq!(config.relay.unknown_action_replies, ReplyPolicy::Respond);
    }

    #[test]
    fn empty_toml_is_the_default() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.relay.response_buffer_size, 64);
    }
}
