//! The relay event loop
//!
//! A [`Relay`] owns the inbound request receiver and the outbound response
//! sender. Its lifecycle is: load the codec capability, announce
//! `initialized`, then serve requests one at a time until the request
//! channel closes. Request failures are reported on the channel (or logged,
//! per policy) and never terminate the loop.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::codec::{Codec, CodecProvider};
use crate::config::{RelayConfig, ReplyPolicy};
use crate::error::{RelayError, Result};
use crate::messages::{Request, RequestError, Response};

// ----------------------------------------------------------------------------
// Channels
// ----------------------------------------------------------------------------

pub type RequestSender = mpsc::Sender<serde_json::Value>;
pub type RequestReceiver = mpsc::Receiver<serde_json::Value>;
pub type ResponseSender = mpsc::Sender<Response>;
pub type ResponseReceiver = mpsc::Receiver<Response>;

/// Creates the inbound request channel.
pub fn create_request_channel(config: &RelayConfig) -> (RequestSender, RequestReceiver) {
    mpsc::channel(config.request_buffer_size)
}

/// Creates the outbound response channel.
pub fn create_response_channel(config: &RelayConfig) -> (ResponseSender, ResponseReceiver) {
    mpsc::channel(config.response_buffer_size)
}

// ----------------------------------------------------------------------------
// Relay
// ----------------------------------------------------------------------------

enum CodecState {
    NotReady,
    Ready(Box<dyn Codec>),
}

pub struct Relay<P: CodecProvider> {
    provider: P,
    state: CodecState,
    config: RelayConfig,
    requests: RequestReceiver,
    responses: ResponseSender,
}

impl<P: CodecProvider> Relay<P> {
    pub fn new(
        provider: P,
        config: RelayConfig,
        requests: RequestReceiver,
        responses: ResponseSender,
    ) -> Self {
        Self {
            provider,
            state: CodecState::NotReady,
            config,
            requests,
            responses,
        }
    }

    /// Runs the relay until the request channel closes.
    ///
    /// Returns an error only if the codec capability fails to load or the
    /// response channel is dropped.
    pub async fn run(mut self) -> Result<()> {
        let codec = self.provider.load().await?;
        self.state = CodecState::Ready(codec);
        self.send(Response::Initialized(())).await?;
        info!("Codec capability loaded, relay ready");

        while let Some(request) = self.requests.recv().await {
            self.handle(request).await?;
        }

        debug!("Request channel closed, relay shutting down");
        Ok(())
    }

    /// Handles a single inbound payload.
    ///
    /// Exposed so callers that own their own loop can drive the relay
    /// directly. Before [`run`](Self::run) has loaded the codec every
    /// request is answered with a failure.
    pub async fn handle(&mut self, request: serde_json::Value) -> Result<()> {
        let codec = match &self.state {
            CodecState::Ready(codec) => codec,
            CodecState::NotReady => {
                warn!("Request received before the codec capability loaded");
                return self
                    .send(Response::Failure("codec capability is not ready".to_owned()))
                    .await;
            }
        };

        match Request::classify(&request) {
            Ok(Request::Decode { data }) => {
                let response = match codec.decode(&data) {
                    Ok(value) => Response::Completed(value),
                    Err(error) => {
                        warn!("Decode failed: {error}");
                        Response::Failure(error.to_string())
                    }
                };
                self.send(response).await
            }
            Ok(Request::Encode { data }) => {
                let outcome = codec.encode(&data);
                match self.config.encode_replies {
                    ReplyPolicy::Respond => {
                        let response = match outcome {
                            Ok(encoded) => Response::Completed(serde_json::Value::String(encoded)),
                            Err(error) => {
                                warn!("Encode failed: {error}");
                                Response::Failure(error.to_string())
                            }
                        };
                        self.send(response).await
                    }
                    ReplyPolicy::DiagnosticOnly => {
                        match outcome {
                            Ok(encoded) => info!("Encoded {} characters", encoded.len()),
                            Err(error) => warn!("Encode failed: {error}"),
                        }
                        Ok(())
                    }
                }
            }
            Err(error @ (RequestError::UnknownAction(_) | RequestError::MissingAction)) => {
                match self.config.unknown_action_replies {
                    ReplyPolicy::Respond => self.send(Response::Failure(error.to_string())).await,
                    ReplyPolicy::DiagnosticOnly => {
                        warn!("Ignoring request: {error}");
                        Ok(())
                    }
                }
            }
            Err(error) => {
                // Malformed requests for a known action always get an answer.
                warn!("Rejecting request: {error}");
                self.send(Response::Failure(error.to_string())).await
            }
        }
    }

    async fn send(&self, response: Response) -> Result<()> {
        self.responses
            .send(response)
            .await
            .map_err(|_| RelayError::ChannelClosed)
    }
}
