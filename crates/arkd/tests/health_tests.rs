//! Diagnostics endpoint auth and payload tests.

use ark_common::HealthResponse;
use arkd::resilience::Resilience;
use arkd::server::{router, DiagState};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceExt;

fn diag_state(token: &str) -> Arc<DiagState> {
    Arc::new(DiagState {
        start_time: Instant::now(),
        token: token.to_string(),
        ollama_url: "http://localhost:11434/api/generate".to_string(),
        ollama_model: "llama3.1:8b".to_string(),
        resilience: Arc::new(Resilience::new(3, 120)),
    })
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn missing_token_is_rejected() {
    let app = router(diag_state("s3cret"));
    let (status, body) = get(app, "/health").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn wrong_token_is_rejected() {
    let app = router(diag_state("s3cret"));
    let (status, _) = get(app, "/health?token=guess").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn empty_configured_token_rejects_everything() {
    // An unset token must not mean "open endpoint"
    let app = router(diag_state(""));
    let (status, _) = get(app, "/health?token=").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn valid_token_returns_snapshot() {
    let state = diag_state("s3cret");
    state.resilience.record_failure_at(1000);
    let app = router(state);

    let (status, body) = get(app, "/health?token=s3cret").await;
    assert_eq!(status, StatusCode::OK);

    let health: HealthResponse = serde_json::from_value(body).unwrap();
    assert!(health.ok);
    assert_eq!(health.pid, std::process::id());
    assert_eq!(health.ollama.model, "llama3.1:8b");
    assert_eq!(health.ollama.resilience.fail_count, 1);
    assert!(!health.ollama.resilience.last_ok);
}

#[tokio::test]
async fn unknown_path_is_json_not_found() {
    let app = router(diag_state("s3cret"));
    let (status, body) = get(app, "/metrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}
