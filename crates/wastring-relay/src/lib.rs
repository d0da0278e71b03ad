//! WAstring Relay
//!
//! This crate bridges the synchronous WAstring codec to a message-based
//! request/response protocol: requests arrive on an inbound channel as
//! untyped JSON payloads, are dispatched to the codec capability, and the
//! outcome is posted on an outbound channel. The wire shapes match the
//! original worker protocol (`{action, data}` in, `{message, data}` out).
//!
//! The relay announces readiness with a single `initialized` message before
//! any request is handled, and handles requests strictly sequentially.
//! Whether encode results and unknown-action notices are answered on the
//! channel or only logged is a [`RelayConfig`] policy decision.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod codec;
pub mod config;
mod error;
pub mod messages;
mod relay;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use codec::{Codec, CodecProvider, WaCodec, WaCodecProvider};
pub use config::{RelayConfig, ReplyPolicy};
pub use error::{RelayError, Result};
pub use messages::{Request, RequestError, Response};
pub use relay::{
    create_request_channel, create_response_channel, Relay, RequestReceiver, RequestSender,
    ResponseReceiver, ResponseSender,
};
