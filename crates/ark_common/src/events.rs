//! Audit record schemas and the inbound message envelope.
//!
//! Every record carries a trace id so one customer message can be followed
//! across the message log, the event log, and the unanswered log without
//! correlating on content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Generate a fresh per-message correlation id.
pub fn new_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// An inbound text message as delivered by the transport collaborator.
#[derive(Debug, Clone, Default)]
pub struct InboundMessage {
    pub text: String,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub chat_id: Option<i64>,
    pub message_id: Option<i64>,
}

/// Message direction, serialized as the record's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Incoming,
    Outgoing,
}

/// How an outgoing reply was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyMode {
    Faq,
    KbLlm,
    Escalate,
}

/// One line of the message log (incoming or outgoing).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub ts: DateTime<Utc>,
    pub trace_id: String,
    #[serde(rename = "type")]
    pub direction: Direction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<ReplyMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snips: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ollama_ok: Option<bool>,
    pub text: String,
}

impl MessageRecord {
    /// Record an inbound message as received.
    pub fn incoming(trace_id: &str, inbound: &InboundMessage, text: &str) -> Self {
        Self {
            ts: Utc::now(),
            trace_id: trace_id.to_string(),
            direction: Direction::Incoming,
            mode: None,
            user_id: inbound.user_id,
            username: inbound.username.clone(),
            chat_id: inbound.chat_id,
            message_id: inbound.message_id,
            snips: None,
            ollama_ok: None,
            text: text.to_string(),
        }
    }

    /// Record the reply sent back for an inbound message.
    pub fn outgoing(trace_id: &str, inbound: &InboundMessage, mode: ReplyMode, text: &str) -> Self {
        Self {
            ts: Utc::now(),
            trace_id: trace_id.to_string(),
            direction: Direction::Outgoing,
            mode: Some(mode),
            user_id: inbound.user_id,
            username: None,
            chat_id: inbound.chat_id,
            message_id: inbound.message_id,
            snips: None,
            ollama_ok: None,
            text: text.to_string(),
        }
    }

    pub fn with_snips(mut self, snips: usize) -> Self {
        self.snips = Some(snips);
        self
    }

    pub fn with_ollama_ok(mut self, ok: bool) -> Self {
        self.ollama_ok = Some(ok);
        self
    }
}

/// One line of the event log: a category plus arbitrary structured fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemRecord {
    pub ts: DateTime<Utc>,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, Value>,
}

impl SystemRecord {
    pub fn new(event_type: &str) -> Self {
        Self {
            ts: Utc::now(),
            event_type: event_type.to_string(),
            trace_id: None,
            fields: serde_json::Map::new(),
        }
    }

    pub fn with_trace(mut self, trace_id: &str) -> Self {
        self.trace_id = Some(trace_id.to_string());
        self
    }

    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }
}

/// A record queued on the audit pipeline, routed to a sink by variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuditEvent {
    Message(MessageRecord),
    System(SystemRecord),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_ids_unique() {
        assert_ne!(new_trace_id(), new_trace_id());
    }

    #[test]
    fn test_incoming_record_shape() {
        let inbound = InboundMessage {
            text: "hello".to_string(),
            user_id: Some(7),
            username: Some("sara".to_string()),
            chat_id: Some(42),
            message_id: Some(1),
        };
        let record = MessageRecord::incoming("t-1", &inbound, "hello");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "incoming");
        assert_eq!(json["trace_id"], "t-1");
        assert_eq!(json["username"], "sara");
        assert!(json.get("mode").is_none());
    }

    #[test]
    fn test_outgoing_record_drops_username() {
        let inbound = InboundMessage {
            username: Some("sara".to_string()),
            ..Default::default()
        };
        let record = MessageRecord::outgoing("t-1", &inbound, ReplyMode::KbLlm, "reply")
            .with_snips(2)
            .with_ollama_ok(true);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "outgoing");
        assert_eq!(json["mode"], "kb_llm");
        assert_eq!(json["snips"], 2);
        assert_eq!(json["ollama_ok"], true);
        assert!(json.get("username").is_none());
    }

    #[test]
    fn test_system_record_flattens_fields() {
        let record = SystemRecord::new("ollama_error")
            .with_trace("t-9")
            .with("fail_count", serde_json::json!(2));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "ollama_error");
        assert_eq!(json["trace_id"], "t-9");
        assert_eq!(json["fail_count"], 2);
    }
}
