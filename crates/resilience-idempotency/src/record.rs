//! The record type stored in the idempotency ledger.

use std::collections::HashMap;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
 Pending,
 InProgress,
 Completed,
 Failed,
 RolledBack,
}

/// The kind of change made to one file as part of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOp {
 Create,
 Modify,
 Delete,
 Rename,
}

#[derive(Debug, Clone)]
pub struct FileChange {
 pub path: String,
 pub op: FileOp,
 pub before_hash: Option<String>,
 pub after_hash: Option<String>,
 pub applied: bool,
}

#[derive(Debug, Clone)]
pub struct IdempotencyRecord {
 pub key: String,
 pub request_fingerprint: String,
 pub status: RecordStatus,
 pub attempt_number: u32,
 pub started_at: Instant,
 pub completed_at: Option<Instant>,
 pub result: Option<Vec<u8>>,
 pub error: Option<String>,
 pub file_changes: Vec<FileChange>,
 pub metadata: HashMap<String, String>,
}

impl IdempotencyRecord {
 pub(crate) fn new(key: String, request_fingerprint: String) -> Self {
 Self {
 key,
 request_fingerprint,
 status: RecordStatus::InProgress,
 attempt_number: 1,
 started_at: Instant::now(),
 completed_at: None,
 result: None,
 error: None,
 file_changes: Vec::new(),
 metadata: HashMap::new(),
 }
 }

 pub(crate) fn is_expired(&self, now: Instant, ttl: std::time::Duration) -> bool {
 now.saturating_duration_since(self.started_at) >= ttl
 }
}
