//! HTTP-level tests of the oracle adapter: parsing, fallback behavior,
//! and connection verification.

mod common;

use mender::domain::models::{ErrorCategory, OracleConfig};
use mender::domain::ports::Oracle;
use mender::infrastructure::oracle::OracleClient;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn oracle(base_url: &str) -> OracleClient {
    OracleClient::new(&OracleConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
        ..OracleConfig::default()
    })
    .expect("oracle client should build")
}

fn sample_run() -> mender::domain::models::WorkflowRun {
    serde_json::from_value(common::run_json(42, 7, "failure")).unwrap()
}

fn chat_reply(content: &str) -> serde_json::Value {
    json!({
        "model": "qwen2.5-coder:3b",
        "message": { "role": "assistant", "content": content },
        "done": true
    })
}

#[tokio::test]
async fn test_classify_parses_and_stamps_provenance() {
    let server = MockServer::start().await;
    let content = r#"{
        "error_category": "network_error",
        "error_type": "dns_failure",
        "severity": "medium",
        "root_cause": "Registry unreachable during dependency download",
        "affected_components": ["ci"],
        "is_flaky": true,
        "confidence_score": 0.8,
        "suggested_fix": "Re-run the workflow",
        "reasoning": "Transient DNS errors in the log"
    }"#;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        // Determinism: temperature pinned to zero, streaming off.
        .and(body_partial_json(
            json!({"stream": false, "options": {"temperature": 0.0}}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(content)))
        .expect(1)
        .mount(&server)
        .await;

    let result = oracle(&server.uri()).classify(&sample_run(), "log text").await;
    assert_eq!(result.error_category, ErrorCategory::NetworkError);
    assert!(result.is_flaky);
    assert!(result.is_successful());
    assert_eq!(result.run_id, 42);
    assert_eq!(result.run_number, 7);
    assert_eq!(result.model, "qwen2.5-coder:3b");
}

#[tokio::test]
async fn test_classify_handles_fenced_response() {
    let server = MockServer::start().await;
    let content = "Sure! Here is the classification:\n```json\n{\"error_category\": \"timeout_error\", \"confidence_score\": 0.7}\n```";
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(content)))
        .mount(&server)
        .await;

    let result = oracle(&server.uri()).classify(&sample_run(), "log text").await;
    assert_eq!(result.error_category, ErrorCategory::TimeoutError);
    assert!(!result.parse_error);
}

#[tokio::test]
async fn test_malformed_response_yields_parse_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_reply("the failure is probably flaky, retry it")),
        )
        .mount(&server)
        .await;

    let result = oracle(&server.uri()).classify(&sample_run(), "log text").await;
    assert!(result.parse_error);
    assert_eq!(result.error_category, ErrorCategory::Unknown);
    assert!((result.confidence_score - 0.0).abs() < f64::EPSILON);
    // Provenance is stamped even on the fallback path.
    assert_eq!(result.run_id, 42);
}

#[tokio::test]
async fn test_transport_failure_yields_oracle_error_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
        .mount(&server)
        .await;

    let result = oracle(&server.uri()).classify(&sample_run(), "log text").await;
    assert!(!result.parse_error);
    assert!(result.oracle_error.is_some());
    assert!(!result.is_successful());
    assert_eq!(result.error_category, ErrorCategory::Unknown);
    assert!((result.confidence_score - 0.0).abs() < f64::EPSILON);
    // The raw error message lands in the reasoning for humans.
    assert!(result.reasoning.contains("500"));
}

#[tokio::test]
async fn test_verify_connection_checks_model_presence() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [
                { "name": "qwen2.5-coder:3b" },
                { "name": "llama3:8b" }
            ]
        })))
        .mount(&server)
        .await;

    oracle(&server.uri()).verify_connection().await.unwrap();
}

#[tokio::test]
async fn test_verify_connection_rejects_missing_model() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "models": [{ "name": "llama3:8b" }] })),
        )
        .mount(&server)
        .await;

    let err = oracle(&server.uri()).verify_connection().await.unwrap_err();
    assert!(err.to_string().contains("qwen2.5-coder:3b"));
}
