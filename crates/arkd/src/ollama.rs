//! Grounded rewriter - one-shot Ollama calls constrained to supplied sources.
//!
//! Every call goes through the circuit breaker: while the cooldown window is
//! open no network request is attempted at all. A failure is reported once;
//! the cooldown is the only retry strategy across calls.

use crate::audit::AuditHandle;
use crate::config::Config;
use crate::prompts;
use crate::resilience::Resilience;
use anyhow::Result;
use ark_common::SystemRecord;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a generation call failed. Callers only ever see an empty rewrite;
/// the variant goes to the audit trail.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned status {0}")]
    Status(reqwest::StatusCode),
}

pub struct Rewriter {
    client: reqwest::Client,
    url: String,
    model: String,
    resilience: Arc<Resilience>,
    audit: AuditHandle,
}

impl Rewriter {
    pub fn new(config: &Config, resilience: Arc<Resilience>, audit: AuditHandle) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.read_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: config.ollama_url.clone(),
            model: config.ollama_model.clone(),
            resilience,
            audit,
        })
    }

    /// Rewrite `message` using only `sources`. Empty return signals fallback:
    /// circuit open, backend failure, or an empty model response.
    pub async fn rewrite(
        &self,
        message: &str,
        sources: &[String],
        system_prompt: &str,
        trace_id: &str,
    ) -> String {
        if !self.resilience.permit() {
            debug!("generation backend in cooldown, skipping call");
            return String::new();
        }

        let prompt = prompts::build_rewrite_prompt(system_prompt, sources, message);

        match self.generate(&prompt).await {
            Ok(text) => {
                self.resilience.record_success();
                self.audit.record_event(
                    SystemRecord::new("ollama_ok")
                        .with_trace(trace_id)
                        .with("model", json!(self.model))
                        .with("len_out", json!(text.len())),
                );
                text
            }
            Err(e) => {
                let (fail_count, disabled_until) = self.resilience.record_failure();
                warn!("ollama call failed (consecutive: {}): {}", fail_count, e);
                self.audit.record_event(
                    SystemRecord::new("ollama_error")
                        .with_trace(trace_id)
                        .with("error", json!(e.to_string()))
                        .with("fail_count", json!(fail_count))
                        .with("disabled_until", json!(disabled_until)),
                );
                String::new()
            }
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false
        });

        let response = self.client.post(&self.url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(BackendError::Status(response.status()));
        }

        let payload: serde_json::Value = response.json().await?;
        let text = payload
            .get("response")
            .and_then(|r| r.as_str())
            .unwrap_or("")
            .trim()
            .to_string();

        Ok(text)
    }
}
