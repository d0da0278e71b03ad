//! Relay configuration

use serde::{Deserialize, Serialize};

/// Whether an outcome is answered on the response channel or only logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyPolicy {
    /// Post the outcome on the response channel.
    #[default]
    Respond,
    /// Log the outcome; nothing is posted on the channel.
    DiagnosticOnly,
}

/// Configuration for a [`Relay`](crate::Relay) instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Capacity of the inbound request channel
    pub request_buffer_size: usize,
    /// Capacity of the outbound response channel
    pub response_buffer_size: usize,
    /// How encode outcomes are reported
    pub encode_replies: ReplyPolicy,
    /// How unknown or missing actions are reported
    pub unknown_action_replies: ReplyPolicy,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            request_buffer_size: 64,
            response_buffer_size: 64,
            encode_replies: ReplyPolicy::default(),
            unknown_action_replies: ReplyPolicy::default(),
        }
    }
}
