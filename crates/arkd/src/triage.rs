//! Triage orchestrator - FAQ first, then KB + grounded rewrite, else escalate.
//!
//! `handle` is the error boundary for the whole pipeline: every internal
//! failure degrades to a concrete customer-facing string and nothing below it
//! ever reaches the transport as an error.

use crate::audit::AuditHandle;
use crate::config::Config;
use crate::faq;
use crate::kb;
use crate::ollama::Rewriter;
use crate::prompts;
use crate::resilience::Resilience;
use crate::sources::SourceStore;
use crate::unanswered::UnansweredLog;
use anyhow::Result;
use ark_common::{new_trace_id, InboundMessage, MessageRecord, ReplyMode};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

pub struct Triage {
    faq_threshold: f64,
    kb_max_snips: usize,
    sources: SourceStore,
    rewriter: Rewriter,
    audit: AuditHandle,
    unanswered: UnansweredLog,
}

impl Triage {
    pub fn new(config: &Config, resilience: Arc<Resilience>, audit: AuditHandle) -> Result<Self> {
        Ok(Self {
            faq_threshold: config.faq_threshold,
            kb_max_snips: config.kb_max_snips,
            sources: SourceStore::new(config),
            rewriter: Rewriter::new(config, resilience, audit.clone())?,
            audit: audit.clone(),
            unanswered: UnansweredLog::new(config.unanswered_path()),
        })
    }

    /// Decide the reply for one inbound message. Safe to call concurrently;
    /// the only shared state is the resilience counters and the audit mailbox.
    pub async fn handle(&self, inbound: &InboundMessage) -> String {
        let trace_id = new_trace_id();
        let text = inbound.text.trim();

        self.audit
            .record_message(MessageRecord::incoming(&trace_id, inbound, text));

        if text.is_empty() {
            return prompts::GREETING.to_string();
        }

        // 1) FAQ is the truth source - never overridden by KB/LLM content
        let entries = self.sources.faq_entries();
        if let Some(answer) = faq::resolve(text, &entries, self.faq_threshold) {
            let reply = format!("{}\n\n{}", answer.trim(), prompts::CLOSING_QUESTION);
            info!(%trace_id, mode = "faq", "answered from FAQ");
            self.audit.record_message(MessageRecord::outgoing(
                &trace_id,
                inbound,
                ReplyMode::Faq,
                &reply,
            ));
            return reply;
        }

        // 2) KB snippets ground a constrained rewrite
        let snippets = kb::retrieve(text, &self.sources.kb_paragraphs(), self.kb_max_snips);
        if !snippets.is_empty() {
            let system_prompt = self.sources.system_prompt();
            let mut reply = self
                .rewriter
                .rewrite(text, &snippets, &system_prompt, &trace_id)
                .await;
            let ollama_ok = !reply.is_empty() && !reply.contains(prompts::FALLBACK_MARKER);
            if reply.is_empty() {
                reply = prompts::KB_FALLBACK_REPLY.to_string();
            }
            info!(%trace_id, mode = "kb_llm", ollama_ok, snips = snippets.len(), "answered from KB rewrite");
            self.audit.record_message(
                MessageRecord::outgoing(&trace_id, inbound, ReplyMode::KbLlm, &reply)
                    .with_snips(snippets.len())
                    .with_ollama_ok(ollama_ok),
            );
            return reply;
        }

        // 3) No sources at all - escalate and queue for human follow-up
        info!(%trace_id, mode = "escalate", "no sources, escalating");
        let meta = json!({
            "trace_id": trace_id,
            "user_id": inbound.user_id,
            "username": inbound.username,
            "chat_id": inbound.chat_id,
            "message_id": inbound.message_id,
            "reason": "no_sources",
        });
        self.unanswered.record(text, &meta).await;

        self.audit.record_message(MessageRecord::outgoing(
            &trace_id,
            inbound,
            ReplyMode::Escalate,
            prompts::ESCALATION_MESSAGE,
        ));
        prompts::ESCALATION_MESSAGE.to_string()
    }
}
