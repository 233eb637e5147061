//! arkd - ARK support triage daemon.
//!
//! Answers customer messages from the curated FAQ, from KB-grounded Ollama
//! rewrites, or escalates to a human, with a durable audit trail.

use anyhow::Result;
use ark_common::SystemRecord;
use arkd::audit::AuditPipeline;
use arkd::config::Config;
use arkd::resilience::Resilience;
use arkd::lock;
use arkd::server::{self, DiagState};
use arkd::telegram::Transport;
use arkd::triage::Triage;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load();
    info!("arkd v{} starting", env!("CARGO_PKG_VERSION"));

    let audit = AuditPipeline::start(&config.log_dir).await?;
    let handle = audit.handle();

    let _instance_lock = match lock::acquire(&config.lock_path)? {
        Some(lock) => lock,
        None => {
            warn!("another instance holds {}; exiting", config.lock_path);
            drop(handle);
            audit.shutdown().await;
            return Ok(());
        }
    };

    handle.record_event(
        SystemRecord::new("boot")
            .with("pid", json!(std::process::id()))
            .with("token_len", json!(config.telegram_token.len())),
    );

    if config.telegram_token.is_empty() {
        error!("TELEGRAM_TOKEN is not set");
        handle.record_event(
            SystemRecord::new("fatal").with("reason", json!("missing_telegram_token")),
        );
        drop(handle);
        audit.shutdown().await;
        anyhow::bail!("missing TELEGRAM_TOKEN");
    }

    let resilience = Arc::new(Resilience::new(
        config.fails_before_cooldown,
        config.cooldown_seconds,
    ));

    // Diagnostics endpoint only runs when a token guards it
    let health_task = if config.health_token.is_empty() {
        handle.record_event(
            SystemRecord::new("health_disabled").with("reason", json!("HEALTH_TOKEN missing")),
        );
        None
    } else {
        let state = Arc::new(DiagState {
            start_time: Instant::now(),
            token: config.health_token.clone(),
            ollama_url: config.ollama_url.clone(),
            ollama_model: config.ollama_model.clone(),
            resilience: resilience.clone(),
        });
        let bind = config.health_bind.clone();
        let port = config.health_port;
        handle.record_event(
            SystemRecord::new("health_started")
                .with("bind", json!(bind))
                .with("port", json!(port)),
        );
        Some(tokio::spawn(async move {
            if let Err(e) = server::run(state, &bind, port).await {
                error!("diagnostics endpoint failed: {}", e);
            }
        }))
    };

    let triage = Arc::new(Triage::new(&config, resilience, handle.clone())?);
    let transport = Transport::new(&config.telegram_token)?;

    handle.record_event(SystemRecord::new("transport_start"));
    info!("arkd polling for messages");

    let transport_task = tokio::spawn({
        let triage = triage.clone();
        async move {
            if let Err(e) = transport.run(triage).await {
                error!("transport loop ended: {}", e);
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    handle.record_event(SystemRecord::new("shutdown").with("reason", json!("signal")));

    // Stop producers before draining the audit mailbox
    transport_task.abort();
    let _ = transport_task.await;
    if let Some(task) = health_task {
        task.abort();
        let _ = task.await;
    }
    drop(triage);
    drop(handle);
    audit.shutdown().await;

    info!("arkd stopped");
    Ok(())
}
