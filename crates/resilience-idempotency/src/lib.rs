//! Registry keyed by request fingerprint that prevents duplicate side
//! effects on retry.

mod config;
mod events;
mod fingerprint;
mod record;

pub use config::{IdempotencyConfig, IdempotencyConfigBuilder};
pub use events::IdempotencyEvent;
pub use fingerprint::{fingerprint_request, generate};
pub use record::{FileChange, FileOp, IdempotencyRecord, RecordStatus};

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Outcome of [`IdempotencyLedger::check`].
#[derive(Debug, Clone)]
pub struct CheckResult {
 pub should_proceed: bool,
 pub is_duplicate: bool,
 pub existing: Option<IdempotencyRecord>,
 pub reason: &'static str,
}

/// The idempotency ledger.
pub struct IdempotencyLedger {
 config: Arc<IdempotencyConfig>,
 records: Arc<Mutex<HashMap<String, IdempotencyRecord>>>,
}

impl Clone for IdempotencyLedger {
 fn clone(&self) -> Self {
 Self {
 config: Arc::clone(&self.config),
 records: Arc::clone(&self.records),
 }
 }
}

impl IdempotencyLedger {
 pub fn new(config: IdempotencyConfig) -> Self {
 Self {
 config: Arc::new(config),
 records: Arc::new(Mutex::new(HashMap::new())),
 }
 }

 /// Evaluates whether an operation keyed by `key` should proceed.
 /// `request_data` is fingerprinted internally and compared against any
 /// stored fingerprint.
 pub fn check(&self, key: &str, request_data: &[u8]) -> CheckResult {
 let now = Instant::now();
 let fingerprint = fingerprint_request(request_data);
 let records = self.records.lock();

 let existing = match records.get(key) {
 Some(record) if !record.is_expired(now, self.config.ttl) => record.clone(),
 _ => {
 return CheckResult {
 should_proceed: true,
 is_duplicate: false,
 existing: None,
 reason: "no active record",
 }
 }
 };
 drop(records);

 if existing.request_fingerprint != fingerprint {
 return CheckResult {
 should_proceed: true,
 is_duplicate: false,
 existing: Some(existing),
 reason: "fingerprint differs, starting fresh",
 };
 }

 match existing.status {
 RecordStatus::Completed | RecordStatus::InProgress => {
 #[cfg(feature = "tracing")]
 tracing::debug!(key, "idempotency duplicate detected");
 #[cfg(feature = "metrics")]
 metrics::counter!("idempotency_duplicates_total").increment(1);

 self.config.event_listeners.emit(&IdempotencyEvent::DuplicateDetected {
 timestamp: now,
 key: key.to_string(),
 });
 CheckResult {
 should_proceed: false,
 is_duplicate: true,
 existing: Some(existing),
 reason: "equal fingerprint already completed or in progress",
 }
 }
 RecordStatus::Failed | RecordStatus::RolledBack => CheckResult {
 should_proceed: true,
 is_duplicate: true,
 existing: Some(existing),
 reason: "retrying a previously failed attempt",
 },
 RecordStatus::Pending => CheckResult {
 should_proceed: true,
 is_duplicate: false,
 existing: Some(existing),
 reason: "record pending, not yet started",
 },
 }
 }

 /// Creates or refreshes a record in `in_progress`, incrementing
 /// `attempt_number` on refresh.
 pub fn start(&self, key: &str, request_data: &[u8]) -> IdempotencyRecord {
 let fingerprint = fingerprint_request(request_data);
 let mut records = self.records.lock();
 let record = records
.entry(key.to_string())
.and_modify(|r| {
 r.request_fingerprint = fingerprint.clone();
 r.status = RecordStatus::InProgress;
 r.attempt_number += 1;
 r.completed_at = None;
 })
.or_insert_with(|| IdempotencyRecord::new(key.to_string(), fingerprint));
 let snapshot = record.clone();
 drop(records);

 self.config.event_listeners.emit(&IdempotencyEvent::RecordStarted {
 timestamp: Instant::now(),
 key: key.to_string(),
 });
 snapshot
 }

 /// Finalizes a record as `completed` or `failed`.
 pub fn complete(
 &self,
 key: &str,
 success: bool,
 result: Option<Vec<u8>>,
 error: Option<String>,
 ) -> Option<IdempotencyRecord> {
 let now = Instant::now();
 let snapshot = {
 let mut records = self.records.lock();
 let record = records.get_mut(key)?;
 record.status = if success {
 RecordStatus::Completed
 } else {
 RecordStatus::Failed
 };
 record.completed_at = Some(now);
 record.result = result;
 record.error = error;
 record.clone()
 };

 self.config.event_listeners.emit(&IdempotencyEvent::RecordCompleted {
 timestamp: now,
 key: key.to_string(),
 success,
 });
 Some(snapshot)
 }

 /// Marks a record as rolled back.
 pub fn roll_back(&self, key: &str) -> Option<IdempotencyRecord> {
 let mut records = self.records.lock();
 let record = records.get_mut(key)?;
 record.status = RecordStatus::RolledBack;
 record.completed_at = Some(Instant::now());
 Some(record.clone())
 }

 /// Appends a file-change entry to a record's history.
 pub fn record_file_change(&self, key: &str, change: FileChange) -> bool {
 let mut records = self.records.lock();
 match records.get_mut(key) {
 Some(record) => {
 record.file_changes.push(change);
 true
 }
 None => false,
 }
 }

 /// Marks the most recent file-change entry for `path` as applied.
 pub fn mark_applied(&self, key: &str, path: &str) -> bool {
 let mut records = self.records.lock();
 let Some(record) = records.get_mut(key) else {
 return false;
 };
 match record
.file_changes
.iter_mut()
.rev()
.find(|change| change.path == path)
 {
 Some(change) => {
 change.applied = true;
 true
 }
 None => false,
 }
 }

 /// File changes for `key` that have been applied.
 pub fn applied_changes(&self, key: &str) -> Vec<FileChange> {
 self.records
.lock()
.get(key)
.map(|r| r.file_changes.iter().filter(|c| c.applied).cloned().collect())
.unwrap_or_default()
 }

 /// File changes for `key` that are still pending application.
 pub fn pending_changes(&self, key: &str) -> Vec<FileChange> {
 self.records
.lock()
.get(key)
.map(|r| r.file_changes.iter().filter(|c| !c.applied).cloned().collect())
.unwrap_or_default()
 }

 pub fn get(&self, key: &str) -> Option<IdempotencyRecord> {
 self.records.lock().get(key).cloned()
 }
}

#[cfg(test)]
mod tests {
 use super::*;

 fn ledger() -> IdempotencyLedger {
 IdempotencyLedger::new(IdempotencyConfig::default())
 }

 #[test]
 fn check_with_no_record_proceeds() {
 let ledger = ledger();
 let result = ledger.check("key-1", b"payload");
 assert!(result.should_proceed);
 assert!(!result.is_duplicate);
 }

 #[test]
 fn check_blocks_in_progress_with_equal_fingerprint() {
 let ledger = ledger();
 ledger.start("key-1", b"payload");
 let result = ledger.check("key-1", b"payload");
 assert!(!result.should_proceed);
 assert!(result.is_duplicate);
 }

 #[test]
 fn check_blocks_completed_with_equal_fingerprint() {
 let ledger = ledger();
 ledger.start("key-1", b"payload");
 ledger.complete("key-1", true, Some(b"result".to_vec()), None);
 let result = ledger.check("key-1", b"payload");
 assert!(!result.should_proceed);
 assert!(result.is_duplicate);
 }

 #[test]
 fn check_proceeds_fresh_on_fingerprint_mismatch() {
 let ledger = ledger();
 ledger.start("key-1", b"payload-a");
 let result = ledger.check("key-1", b"payload-b");
 assert!(result.should_proceed);
 assert!(!result.is_duplicate);
 }

 #[test]
 fn check_allows_retry_after_failure() {
 let ledger = ledger();
 ledger.start("key-1", b"payload");
 ledger.complete("key-1", false, None, Some("boom".into()));
 let result = ledger.check("key-1", b"payload");
 assert!(result.should_proceed);
 assert!(result.is_duplicate);
 }

 #[test]
 fn check_allows_retry_after_rollback() {
 let ledger = ledger();
 ledger.start("key-1", b"payload");
 ledger.roll_back("key-1");
 let result = ledger.check("key-1", b"payload");
 assert!(result.should_proceed);
 assert!(result.is_duplicate);
 }

 #[test]
 fn expired_record_treated_as_absent() {
 let ledger = IdempotencyLedger::new(
 IdempotencyConfig::builder()
.ttl(std::time::Duration::from_nanos(1))
.build(),
 );
 ledger.start("key-1", b"payload");
 std::thread::sleep(std::time::Duration::from_millis(5));
 let result = ledger.check("key-1", b"payload");
 assert!(result.should_proceed);
 assert!(!result.is_duplicate);
 }

 #[test]
 fn start_increments_attempt_number_on_refresh() {
 let ledger = ledger();
 let first = ledger.start("key-1", b"payload");
 assert_eq!(first.attempt_number, 1);
 let second = ledger.start("key-1", b"payload");
 assert_eq!(second.attempt_number, 2);
 }

 #[test]
 fn file_change_tracking_splits_applied_and_pending() {
 let ledger = ledger();
 ledger.start("key-1", b"payload");
 ledger.record_file_change(
 "key-1",
 FileChange {
 path: "a.rs".into(),
 op: FileOp::Modify,
 before_hash: None,
 after_hash: None,
 applied: false,
 },
 );
 ledger.record_file_change(
 "key-1",
 FileChange {
 path: "b.rs".into(),
 op: FileOp::Create,
 before_hash: None,
 after_hash: None,
 applied: false,
 },
 );
 ledger.mark_applied("key-1", "a.rs");

 assert_eq!(ledger.applied_changes("key-1").len(), 1);
 assert_eq!(ledger.pending_changes("key-1").len(), 1);
 assert_eq!(ledger.applied_changes("key-1")[0].path, "a.rs");
 }
}
