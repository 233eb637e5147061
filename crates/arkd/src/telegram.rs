//! Telegram transport - long-poll loop feeding the triage pipeline.
//!
//! Deliberately thin: fetch updates, hand text messages to the orchestrator,
//! send the reply back. A failed poll cycle is logged and retried after a
//! short pause; it never takes the daemon down.

use crate::triage::Triage;
use anyhow::{anyhow, Result};
use ark_common::InboundMessage;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const API_BASE: &str = "https://api.telegram.org";
const POLL_TIMEOUT_SECS: u64 = 30;
const RETRY_PAUSE_SECS: u64 = 3;

#[derive(Debug, Deserialize)]
struct UpdatesResponse {
    ok: bool,
    #[serde(default)]
    result: Vec<Update>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    message_id: i64,
    text: Option<String>,
    from: Option<User>,
    chat: Chat,
}

#[derive(Debug, Deserialize)]
struct User {
    id: i64,
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

pub struct Transport {
    client: reqwest::Client,
    base: String,
}

impl Transport {
    pub fn new(token: &str) -> Result<Self> {
        // Long poll plus margin
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 20))
            .build()?;
        Ok(Self {
            client,
            base: format!("{}/bot{}", API_BASE, token),
        })
    }

    /// Poll forever, dispatching each text message through the orchestrator.
    pub async fn run(&self, triage: Arc<Triage>) -> Result<()> {
        let mut offset: i64 = 0;
        loop {
            match self.get_updates(offset).await {
                Ok(updates) => {
                    for update in updates {
                        offset = offset.max(update.update_id + 1);
                        self.dispatch(update, &triage).await;
                    }
                }
                Err(e) => {
                    warn!("poll failed: {}", e);
                    tokio::time::sleep(Duration::from_secs(RETRY_PAUSE_SECS)).await;
                }
            }
        }
    }

    async fn dispatch(&self, update: Update, triage: &Triage) {
        let Some(message) = update.message else {
            return;
        };
        let Some(text) = message.text else {
            debug!("skipping non-text update {}", update.update_id);
            return;
        };
        // Commands are not part of the support flow
        if text.starts_with('/') {
            return;
        }

        let inbound = InboundMessage {
            text,
            user_id: message.from.as_ref().map(|u| u.id),
            username: message.from.as_ref().and_then(|u| u.username.clone()),
            chat_id: Some(message.chat.id),
            message_id: Some(message.message_id),
        };

        let reply = triage.handle(&inbound).await;
        if let Err(e) = self.send_message(message.chat.id, &reply).await {
            warn!("sendMessage failed for chat {}: {}", message.chat.id, e);
        }
    }

    async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let url = format!(
            "{}/getUpdates?timeout={}&offset={}",
            self.base, POLL_TIMEOUT_SECS, offset
        );
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("getUpdates returned {}", response.status()));
        }
        let payload: UpdatesResponse = response.json().await?;
        if !payload.ok {
            return Err(anyhow!("getUpdates responded ok=false"));
        }
        Ok(payload.result)
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/sendMessage", self.base))
            .json(&json!({"chat_id": chat_id, "text": text}))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(anyhow!("sendMessage returned {}", response.status()));
        }
        Ok(())
    }
}
