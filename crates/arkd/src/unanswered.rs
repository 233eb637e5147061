//! Durable log of messages the pipeline could not answer.
//!
//! Separate from the audit pipeline: this file is the follow-up queue humans
//! actually read, so it is written synchronously on the escalation path,
//! best-effort. One line per message: `[<iso8601>Z] {json-meta} :: <text>`.

use chrono::Utc;
use serde_json::Value;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

pub struct UnansweredLog {
    path: PathBuf,
}

impl UnansweredLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Append one unanswered record. Failures are logged, never propagated.
    pub async fn record(&self, text: &str, meta: &Value) {
        let ts = Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f");
        let line = format!("[{}Z] {} :: {}\n", ts, meta, text);
        if let Err(e) = self.append(&line).await {
            warn!("unanswered log write failed: {}", e);
        }
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_record_appends_readable_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("unanswered.txt");
        let log = UnansweredLog::new(path.clone());

        let meta = json!({"trace_id": "t-1", "reason": "no_sources"});
        log.record("وين فرعكم الجديد؟", &meta).await;
        log.record("second question", &meta).await;

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].contains("Z] "));
        assert!(lines[0].contains("\"trace_id\":\"t-1\""));
        assert!(lines[0].ends_with(":: وين فرعكم الجديد؟"));
    }

    #[tokio::test]
    async fn test_write_failure_is_swallowed() {
        let log = UnansweredLog::new(PathBuf::from("/proc/nonwritable/unanswered.txt"));
        log.record("msg", &json!({})).await;
    }
}
