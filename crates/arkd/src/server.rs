//! Local diagnostics endpoint - token-gated health snapshot.
//!
//! Read-only: reports uptime and the resilience state, nothing more. Requests
//! without the configured token get a 401, not just a log line.

use crate::resilience::Resilience;
use anyhow::Result;
use ark_common::{HealthResponse, OllamaHealth};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Read-only state exposed by the endpoint.
pub struct DiagState {
    pub start_time: Instant,
    pub token: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub resilience: Arc<Resilience>,
}

#[derive(Deserialize)]
struct HealthQuery {
    #[serde(default)]
    token: String,
}

pub fn router(state: Arc<DiagState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .fallback(not_found)
        .with_state(state)
}

async fn health(
    State(state): State<Arc<DiagState>>,
    Query(query): Query<HealthQuery>,
) -> Response {
    if state.token.is_empty() || query.token != state.token {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"ok": false, "error": "unauthorized"})),
        )
            .into_response();
    }

    let response = HealthResponse {
        ok: true,
        pid: std::process::id(),
        uptime_sec: state.start_time.elapsed().as_secs(),
        ollama: OllamaHealth {
            url: state.ollama_url.clone(),
            model: state.ollama_model.clone(),
            resilience: state.resilience.snapshot(),
        },
    };
    Json(response).into_response()
}

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"ok": false, "error": "not_found"})),
    )
        .into_response()
}

/// Serve the endpoint on the configured loopback bind.
pub async fn run(state: Arc<DiagState>, bind: &str, port: u16) -> Result<()> {
    let addr = format!("{}:{}", bind, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Diagnostics endpoint on http://{}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
