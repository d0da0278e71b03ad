//! Integration tests for the relay lifecycle and dispatch

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::time::timeout;

use wastring_relay::{
    create_request_channel, create_response_channel, Codec, CodecProvider, Relay, RelayConfig,
    RelayError, ReplyPolicy, Response, ResponseReceiver, WaCodecProvider,
};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

async fn recv(responses: &mut ResponseReceiver) -> Response {
    timeout(RECV_TIMEOUT, responses.recv())
        .await
        .expect("timed out waiting for a response")
        .expect("response channel closed")
}

fn spawn_relay(
    config: RelayConfig,
) -> (
    wastring_relay::RequestSender,
    ResponseReceiver,
    tokio::task::JoinHandle<wastring_relay::Result<()>>,
) {
    let (request_tx, request_rx) = create_request_channel(&config);
    let (response_tx, response_rx) = create_response_channel(&config);
    let relay = Relay::new(WaCodecProvider, config, request_rx, response_tx);
    let handle = tokio::spawn(relay.run());
    (request_tx, response_rx, handle)
}

fn sample_string() -> String {
    let value = wastring_core::LuaValue::from_json(&json!({"id": "Glow", "loaded": true}));
    wastring_core::encode(&value).unwrap()
}

// ----------------------------------------------------------------------------
// Lifecycle
// ----------------------------------------------------------------------------

#[tokio::test]
async fn initialized_is_sent_before_any_outcome() {
    let (request_tx, mut response_rx, _handle) = spawn_relay(RelayConfig::default());

    request_tx
        .send(json!({"action": "decode", "data": "garbage"}))
        .await
        .unwrap();

    assert_eq!(recv(&mut response_rx).await, Response::Initialized(()));
    assert!(matches!(recv(&mut response_rx).await, Response::Failure(_)));
}

#[tokio::test]
async fn relay_shuts_down_when_requests_close() {
    let (request_tx, mut response_rx, handle) = spawn_relay(RelayConfig::default());

    assert_eq!(recv(&mut response_rx).await, Response::Initialized(()));
    drop(request_tx);

    timeout(RECV_TIMEOUT, handle)
        .await
        .expect("relay did not shut down")
        .expect("relay task panicked")
        .expect("relay returned an error");
}

struct BrokenProvider;

#[async_trait]
impl CodecProvider for BrokenProvider {
    async fn load(&mut self) -> wastring_relay::Result<Box<dyn Codec>> {
        Err(RelayError::LoadFailed("no capability available".to_owned()))
    }
}

#[tokio::test]
async fn failed_load_is_fatal_and_silent() {
    let config = RelayConfig::default();
    let (_request_tx, request_rx) = create_request_channel(&config);
    let (response_tx, mut response_rx) = create_response_channel(&config);

    let result = Relay::new(BrokenProvider, config, request_rx, response_tx)
        .run()
        .await;

    assert!(matches!(result, Err(RelayError::LoadFailed(_))));
    assert!(response_rx.recv().await.is_none());
}

#[tokio::test]
async fn requests_before_load_are_answered_with_a_failure() {
    let config = RelayConfig::default();
    let (_request_tx, request_rx) = create_request_channel(&config);
    let (response_tx, mut response_rx) = create_response_channel(&config);
    let mut relay = Relay::new(WaCodecProvider, config, request_rx, response_tx);

    relay
        .handle(json!({"action": "decode", "data": sample_string()}))
        .await
        .unwrap();

    let Response::Failure(text) = recv(&mut response_rx).await else {
        panic!("expected a failure");
    };
    assert!(text.contains("not ready"));
}

// ----------------------------------------------------------------------------
// Dispatch
// ----------------------------------------------------------------------------

#[tokio::test]
async fn decode_request_completes_with_the_payload() {
    let (request_tx, mut response_rx, _handle) = spawn_relay(RelayConfig::default());
    assert_eq!(recv(&mut response_rx).await, Response::Initialized(()));

    request_tx
        .send(json!({"action": "decode", "data": sample_string()}))
        .await
        .unwrap();

    let Response::Completed(value) = recv(&mut response_rx).await else {
        panic!("expected completion");
    };
    assert_eq!(value["id"], "Glow");
    assert_eq!(value["loaded"], true);
}

#[tokio::test]
async fn decode_failure_reports_a_diagnostic() {
    let (request_tx, mut response_rx, _handle) = spawn_relay(RelayConfig::default());
    assert_eq!(recv(&mut response_rx).await, Response::Initialized(()));

    request_tx
        .send(json!({"action": "decode", "data": "!WA:2!*bad*"}))
        .await
        .unwrap();

    let Response::Failure(text) = recv(&mut response_rx).await else {
        panic!("expected a failure");
    };
    assert!(!text.is_empty());
}

#[tokio::test]
async fn encode_request_completes_with_a_decodable_string() {
    let (request_tx, mut response_rx, _handle) = spawn_relay(RelayConfig::default());
    assert_eq!(recv(&mut response_rx).await, Response::Initialized(()));

    request_tx
        .send(json!({"action": "encode", "data": {"id": "Glow"}}))
        .await
        .unwrap();

    let Response::Completed(serde_json::Value::String(encoded)) = recv(&mut response_rx).await
    else {
        panic!("expected an encoded string");
    };
    let decoded = wastring_core::decode(&encoded).unwrap();
    assert_eq!(decoded.len(), 1);
}

#[tokio::test]
async fn diagnostic_only_encode_produces_no_response() {
    let config = RelayConfig {
        encode_replies: ReplyPolicy::DiagnosticOnly,
        ..RelayConfig::default()
    };
    let (request_tx, mut response_rx, _handle) = spawn_relay(config);
    assert_eq!(recv(&mut response_rx).await, Response::Initialized(()));

    request_tx
        .send(json!({"action": "encode", "data": {"id": "Glow"}}))
        .await
        .unwrap();
    request_tx
        .send(json!({"action": "decode", "data": sample_string()}))
        .await
        .unwrap();

    // Requests are handled in order, so the next response belongs to the
    // decode if the encode produced none.
    assert!(matches!(
        recv(&mut response_rx).await,
        Response::Completed(_)
    ));
}

#[tokio::test]
async fn unknown_action_is_answered_by_default() {
    let (request_tx, mut response_rx, _handle) = spawn_relay(RelayConfig::default());
    assert_eq!(recv(&mut response_rx).await, Response::Initialized(()));

    request_tx
        .send(json!({"action": "transmogrify"}))
        .await
        .unwrap();

    let Response::Failure(text) = recv(&mut response_rx).await else {
        panic!("expected a failure");
    };
    assert!(text.contains("transmogrify"));
}

#[tokio::test]
async fn unknown_action_can_be_demoted_to_a_log_line() {
    let config = RelayConfig {
        unknown_action_replies: ReplyPolicy::DiagnosticOnly,
        ..RelayConfig::default()
    };
    let (request_tx, mut response_rx, _handle) = spawn_relay(config);
    assert_eq!(recv(&mut response_rx).await, Response::Initialized(()));

    request_tx.send(json!({"nonsense": true})).await.unwrap();
    request_tx
        .send(json!({"action": "decode", "data": sample_string()}))
        .await
        .unwrap();

    assert!(matches!(
        recv(&mut response_rx).await,
        Response::Completed(_)
    ));
}

#[tokio::test]
async fn malformed_known_action_is_always_answered() {
    let config = RelayConfig {
        unknown_action_replies: ReplyPolicy::DiagnosticOnly,
        ..RelayConfig::default()
    };
    let (request_tx, mut response_rx, _handle) = spawn_relay(config);
    assert_eq!(recv(&mut response_rx).await, Response::Initialized(()));

    request_tx
        .send(json!({"action": "decode", "data": 12}))
        .await
        .unwrap();

    assert!(matches!(recv(&mut response_rx).await, Response::Failure(_)));
}

#[tokio::test]
async fn every_request_gets_exactly_one_response() {
    let (request_tx, mut response_rx, _handle) = spawn_relay(RelayConfig::default());
    assert_eq!(recv(&mut response_rx).await, Response::Initialized(()));

    let encoded = sample_string();
    for _ in 0..10 {
        request_tx
            .send(json!({"action": "decode", "data": encoded}))
            .await
            .unwrap();
    }
    drop(request_tx);

    let mut completions = 0;
    while let Some(response) = response_rx.recv().await {
        assert!(matches!(response, Response::Completed(_)));
        completions += 1;
    }
    assert_eq!(completions, 10);
}
