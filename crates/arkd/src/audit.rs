//! Audit pipeline - bounded mailbox with a background JSONL writer.
//!
//! `record` never blocks the request path: it attempts a non-blocking insert
//! and drops the event when the mailbox is full. One worker drains the
//! mailbox in arrival order and appends each record to messages.jsonl or
//! events.jsonl by category. A failed write is swallowed; the worker keeps
//! draining.

use anyhow::{Context, Result};
use ark_common::{AuditEvent, MessageRecord, SystemRecord};
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Events buffered before producers start losing records.
pub const MAILBOX_CAPACITY: usize = 5000;

const MESSAGES_FILE: &str = "messages.jsonl";
const EVENTS_FILE: &str = "events.jsonl";

/// Cheap producer handle; clone one per component.
#[derive(Clone)]
pub struct AuditHandle {
    tx: mpsc::Sender<AuditEvent>,
}

impl AuditHandle {
    /// Fire-and-forget enqueue. Lossy under pressure: a full mailbox drops
    /// the event rather than stalling message handling.
    pub fn record(&self, event: AuditEvent) {
        if let Err(e) = self.tx.try_send(event) {
            debug!("audit event dropped: {}", e);
        }
    }

    pub fn record_message(&self, record: MessageRecord) {
        self.record(AuditEvent::Message(record));
    }

    pub fn record_event(&self, record: SystemRecord) {
        self.record(AuditEvent::System(record));
    }

    #[cfg(test)]
    pub(crate) fn for_test() -> (Self, mpsc::Receiver<AuditEvent>) {
        let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);
        (Self { tx }, rx)
    }
}

/// The running pipeline: the mailbox sender plus its drain worker.
pub struct AuditPipeline {
    handle: AuditHandle,
    worker: JoinHandle<()>,
}

impl AuditPipeline {
    pub async fn start(log_dir: &Path) -> Result<Self> {
        Self::start_with_capacity(log_dir, MAILBOX_CAPACITY).await
    }

    pub async fn start_with_capacity(log_dir: &Path, capacity: usize) -> Result<Self> {
        tokio::fs::create_dir_all(log_dir)
            .await
            .context("Failed to create audit log directory")?;

        let (tx, rx) = mpsc::channel(capacity);
        let messages_path = log_dir.join(MESSAGES_FILE);
        let events_path = log_dir.join(EVENTS_FILE);

        info!("Audit pipeline started: {}", log_dir.display());
        let worker = tokio::spawn(drain(rx, messages_path, events_path));

        Ok(Self {
            handle: AuditHandle { tx },
            worker,
        })
    }

    pub fn handle(&self) -> AuditHandle {
        self.handle.clone()
    }

    /// Close the mailbox and wait for the worker to drain what was accepted.
    /// All other handles must be dropped first or this waits on them too.
    pub async fn shutdown(self) {
        let Self { handle, worker } = self;
        drop(handle);
        if let Err(e) = worker.await {
            warn!("audit worker did not stop cleanly: {}", e);
        }
    }
}

async fn drain(
    mut rx: mpsc::Receiver<AuditEvent>,
    messages_path: PathBuf,
    events_path: PathBuf,
) {
    // Channel closure is the stop signal; recv drains buffered events first.
    while let Some(event) = rx.recv().await {
        let (path, line) = match &event {
            AuditEvent::Message(record) => (&messages_path, serde_json::to_string(record)),
            AuditEvent::System(record) => (&events_path, serde_json::to_string(record)),
        };
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                debug!("audit serialization failed: {}", e);
                continue;
            }
        };
        if let Err(e) = append_line(path, &line).await {
            debug!("audit write failed: {}", e);
        }
    }
    info!("Audit pipeline drained");
}

async fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(line.as_bytes()).await?;
    file.write_all(b"\n").await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_routes_by_category_and_drains_on_shutdown() {
        let dir = TempDir::new().unwrap();
        let pipeline = AuditPipeline::start(dir.path()).await.unwrap();
        let handle = pipeline.handle();

        let inbound = ark_common::InboundMessage {
            text: "hi".to_string(),
            ..Default::default()
        };
        handle.record_message(MessageRecord::incoming("t-1", &inbound, "hi"));
        handle.record_event(SystemRecord::new("boot"));
        handle.record_event(SystemRecord::new("shutdown"));

        drop(handle);
        pipeline.shutdown().await;

        let messages = std::fs::read_to_string(dir.path().join(MESSAGES_FILE)).unwrap();
        let events = std::fs::read_to_string(dir.path().join(EVENTS_FILE)).unwrap();
        assert_eq!(messages.lines().count(), 1);
        assert_eq!(events.lines().count(), 2);
        assert!(messages.contains("\"trace_id\":\"t-1\""));
        assert!(events.lines().next().unwrap().contains("\"type\":\"boot\""));
    }

    #[tokio::test]
    async fn test_record_drops_on_full_mailbox_without_blocking() {
        // No worker attached: the mailbox can only fill up.
        let (handle, mut rx) = AuditHandle::for_test();
        for _ in 0..MAILBOX_CAPACITY {
            handle.record_event(SystemRecord::new("filler"));
        }

        // One more does not block and does not panic
        handle.record_event(SystemRecord::new("overflow"));

        // Exactly the accepted events are still deliverable, in order
        let mut received = 0;
        while rx.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, MAILBOX_CAPACITY);
    }

    #[tokio::test]
    async fn test_record_on_stopped_pipeline_is_silently_dropped() {
        let (handle, rx) = AuditHandle::for_test();
        drop(rx);
        // Closed channel: no panic, no error surfaced
        handle.record_event(SystemRecord::new("late"));
    }
}
