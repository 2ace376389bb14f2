//! Gemini adapter against a local stand-in for `generateContent`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tb_domain::config::{LlmConfig, NetworkConfig, SecretConfig};
use tb_domain::error::Error;
use tb_providers::{create_provider, ChatRequest};

#[derive(Clone)]
struct Stub {
    calls: Arc<AtomicUsize>,
    status: StatusCode,
    reply: Value,
}

async fn generate(
    State(stub): State<Stub>,
    Path(call): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    stub.calls.fetch_add(1, Ordering::SeqCst);
    assert_eq!(call, "gemini-2.5-flash:generateContent");
    assert_eq!(query.get("key").map(String::as_str), Some("stub-key"));
    assert!(body["contents"][0]["parts"][0]["text"].is_string());
    (stub.status, Json(stub.reply.clone()))
}

async fn serve(stub: Stub) -> String {
    let app = Router::new()
        .route("/v1beta/models/:call", post(generate))
        .with_state(stub);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn config(base_url: String) -> LlmConfig {
    LlmConfig {
        base_url,
        api_key: SecretConfig {
            key: Some("stub-key".into()),
            ..Default::default()
        },
        timeout_ms: 5_000,
        ..Default::default()
    }
}

fn network() -> NetworkConfig {
    NetworkConfig {
        proxy: None,
        proxy_env: "TB_TEST_GEMINI_PROXY_UNSET".into(),
    }
}

#[tokio::test]
async fn successful_generation_returns_text() {
    let calls = Arc::new(AtomicUsize::new(0));
    let base = serve(Stub {
        calls: calls.clone(),
        status: StatusCode::OK,
        reply: json!({
            "candidates": [{"content": {"parts": [{"text": "537 records."}]}, "finishReason": "STOP"}]
        }),
    })
    .await;

    let provider = create_provider(&config(base), &network()).unwrap();
    let resp = provider
        .chat(&ChatRequest::from_prompt("how many?"))
        .await
        .unwrap();

    assert_eq!(resp.content, "537 records.");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn quota_error_is_reported_once_without_retry() {
    let calls = Arc::new(AtomicUsize::new(0));
    let base = serve(Stub {
        calls: calls.clone(),
        status: StatusCode::TOO_MANY_REQUESTS,
        reply: json!({"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}),
    })
    .await;

    let provider = create_provider(&config(base), &network()).unwrap();
    let err = provider
        .chat(&ChatRequest::from_prompt("how many?"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Provider { .. }));
    assert!(err.to_string().contains("RESOURCE_EXHAUSTED"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn rejected_key_is_an_auth_error() {
    let base = serve(Stub {
        calls: Arc::new(AtomicUsize::new(0)),
        status: StatusCode::FORBIDDEN,
        reply: json!({"error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}}),
    })
    .await;

    let provider = create_provider(&config(base), &network()).unwrap();
    let err = provider
        .chat(&ChatRequest::from_prompt("q"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Auth(_)));
    assert!(!err.to_string().contains("stub-key"));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error_without_the_key() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let provider = create_provider(&config(format!("http://{addr}")), &network()).unwrap();
    let err = provider
        .chat(&ChatRequest::from_prompt("q"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Http(_) | Error::Timeout(_)));
    assert!(!err.to_string().contains("stub-key"));
}
