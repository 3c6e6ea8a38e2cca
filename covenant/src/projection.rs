//! One-way change records for external mirrors.
//!
//! Every committed mutation produces a [`ChangeRecord`] that is pushed
//! onto an unbounded queue after the state change lands. A spawned
//! delivery task drains the queue into a [`ProjectionSink`]. Delivery is
//! fire-and-forget: a full or closed channel, a failed serialization or
//! a failed write never rolls back or blocks the mutation that produced
//! the record.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

use crate::types::DaoId;

/// Kind of state change a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// A dao registered its policies
    DaoRegistered,
    /// A payer's payment slot was overwritten
    PaymentRecorded,
    /// A proposal was created
    ProposalCreated,
    /// A proposal was approved or rejected
    ProposalResolved,
    /// A dao's deal-health state was overwritten
    DealHealthUpdated,
}

/// A record of one committed mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Unique record ID
    pub id: String,
    /// What changed
    pub kind: ChangeKind,
    /// Dao the change belongs to
    pub dao: DaoId,
    /// Logical time of the mutation
    pub logical_time: u64,
    /// Wall time the record was emitted
    pub emitted_at: DateTime<Utc>,
    /// Kind-specific payload
    pub payload: serde_json::Value,
}

impl ChangeRecord {
    /// Create a new change record.
    pub fn new(kind: ChangeKind, dao: impl Into<DaoId>, logical_time: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            dao: dao.into(),
            logical_time,
            emitted_at: Utc::now(),
            payload: serde_json::Value::Null,
        }
    }

    /// Attach a payload.
    pub fn with_payload(mut self, payload: impl Serialize) -> Self {
        self.payload = serde_json::to_value(payload).unwrap_or_default();
        self
    }

    /// Convert to JSONL line.
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Receives change records for external mirroring.
///
/// Sinks are one-way: the core never reads anything back from them and
/// never observes delivery failures.
#[async_trait]
pub trait ProjectionSink: Send + Sync {
    async fn deliver(&self, record: ChangeRecord);
}

/// Sending half of the projection queue, held by the core.
#[derive(Clone)]
pub struct ProjectionQueue {
    tx: mpsc::UnboundedSender<ChangeRecord>,
}

impl ProjectionQueue {
    /// Create a queue and its receiving half.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ChangeRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Push a record. Never fails: a closed channel drops the record.
    pub fn push(&self, record: ChangeRecord) {
        if self.tx.send(record).is_err() {
            warn!("Projection channel closed, dropping change record");
        }
    }
}

/// Spawn the task that drains the queue into a sink.
pub fn spawn_delivery_task(
    mut rx: mpsc::UnboundedReceiver<ChangeRecord>,
    sink: Arc<dyn ProjectionSink>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(record) = rx.recv().await {
            sink.deliver(record).await;
        }
        debug!("Projection delivery task stopped");
    })
}

/// Sink that logs each record through tracing.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl ProjectionSink for LogSink {
    async fn deliver(&self, record: ChangeRecord) {
        info!(
            kind = ?record.kind,
            dao = %record.dao,
            logical_time = record.logical_time,
            "Change record"
        );
    }
}

/// Sink that collects records in memory, for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<ChangeRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything delivered so far.
    pub async fn records(&self) -> Vec<ChangeRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl ProjectionSink for MemorySink {
    async fn deliver(&self, record: ChangeRecord) {
        self.records.lock().await.push(record);
    }
}

/// Sink that appends records to a JSONL file.
pub struct JsonlSink {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlSink {
    /// Open the file for appending, creating it if missing.
    pub fn new(path: PathBuf) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        info!("Projection mirror writing to {}", path.display());
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path,
        })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl ProjectionSink for JsonlSink {
    async fn deliver(&self, record: ChangeRecord) {
        let jsonl = match record.to_jsonl() {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to serialize change record: {}", e);
                return;
            }
        };

        let mut writer = self.writer.lock().await;
        if let Err(e) = writeln!(writer, "{}", jsonl) {
            error!("Failed to write change record: {}", e);
        }
        // Flush per record for durability
        if let Err(e) = writer.flush() {
            error!("Failed to flush projection mirror: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serialization() {
        let record = ChangeRecord::new(ChangeKind::PaymentRecorded, "dao-1", 42)
            .with_payload(serde_json::json!({ "payer": "alice", "amount": 100 }));

        let jsonl = record.to_jsonl().unwrap();
        assert!(jsonl.contains("payment_recorded"));
        assert!(jsonl.contains("dao-1"));
        assert!(jsonl.contains("alice"));
    }

    #[tokio::test]
    async fn test_memory_sink_collects() {
        let sink = MemorySink::new();

        sink.deliver(ChangeRecord::new(ChangeKind::DaoRegistered, "dao-1", 0))
            .await;
        sink.deliver(ChangeRecord::new(ChangeKind::ProposalCreated, "dao-1", 1))
            .await;

        let records = sink.records().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, ChangeKind::DaoRegistered);
        assert_eq!(records[1].kind, ChangeKind::ProposalCreated);
    }

    #[tokio::test]
    async fn test_queue_delivers_through_task() {
        let (queue, rx) = ProjectionQueue::new();
        let sink = Arc::new(MemorySink::new());
        let handle = spawn_delivery_task(rx, sink.clone());

        queue.push(ChangeRecord::new(ChangeKind::DealHealthUpdated, "dao-1", 7));
        drop(queue);

        handle.await.unwrap();
        let records = sink.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].logical_time, 7);
    }

    #[tokio::test]
    async fn test_push_after_close_is_dropped() {
        let (queue, rx) = ProjectionQueue::new();
        drop(rx);

        // Must not panic or error back to the caller
        queue.push(ChangeRecord::new(ChangeKind::DaoRegistered, "dao-1", 0));
    }
}
