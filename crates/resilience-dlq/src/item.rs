//! The item type stored in the dead-letter queue.

use resilience_core::FailureKind;
use std::time::{Duration, Instant};

/// Lifecycle state of a [`DlqItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DlqStatus {
 /// Sitting in the queue with no scheduled retry.
 Pending,
 /// Auto-retry is scheduled for `next_retry_at`.
 Scheduled,
 /// A retry attempt is currently in flight.
 Processing,
 /// Terminated successfully, either by auto-retry or an explicit resolution.
 Resolved,
 /// Explicitly discarded by a caller.
 Discarded,
 /// `expires_at` passed while the item was still pending.
 Expired,
}

/// One entry in an item's `failure_history`.
#[derive(Debug, Clone)]
pub struct FailureRecord {
 pub timestamp: Instant,
 pub kind: FailureKind,
 pub message: String,
 pub http_code: Option<u16>,
}

/// A failed operation parked for inspection and possible auto-retry.
#[derive(Debug, Clone)]
pub struct DlqItem {
 pub id: String,
 pub created_at: Instant,
 pub updated_at: Instant,
 pub operation_type: String,
 pub provider: String,
 pub model: String,
 pub plan_id: Option<String>,
 /// Opaque, caller-owned payload needed to replay the operation.
 pub request_data: Vec<u8>,
 pub failure_kind: FailureKind,
 pub last_error: String,
 pub http_code: Option<u16>,
 pub total_attempts: u32,
 pub failure_history: Vec<FailureRecord>,
 pub status: DlqStatus,
 pub retry_count: u32,
 pub next_retry_at: Option<Instant>,
 pub expires_at: Option<Instant>,
 pub resolved_at: Option<Instant>,
 pub resolution: Option<String>,
 pub resolved_by: Option<String>,
}

impl DlqItem {
 pub(crate) fn new(
 id: String,
 now: Instant,
 operation_type: String,
 provider: String,
 model: String,
 plan_id: Option<String>,
 request_data: Vec<u8>,
 failure: FailureRecord,
 total_attempts: u32,
 status: DlqStatus,
 next_retry_at: Option<Instant>,
 expires_at: Option<Instant>,
 ) -> Self {
 let failure_kind = failure.kind;
 let last_error = failure.message.clone();
 let http_code = failure.http_code;
 Self {
 id,
 created_at: now,
 updated_at: now,
 operation_type,
 provider,
 model,
 plan_id,
 request_data,
 failure_kind,
 last_error,
 http_code,
 total_attempts,
 failure_history: vec![failure],
 status,
 retry_count: 0,
 next_retry_at,
 expires_at,
 resolved_at: None,
 resolution: None,
 resolved_by: None,
 }
 }

 /// Whether this item is in a terminal state (no further retries or edits expected).
 pub fn is_terminal(&self) -> bool {
 matches!(
 self.status,
 DlqStatus::Resolved | DlqStatus::Discarded | DlqStatus::Expired
 )
 }

 pub(crate) fn is_expired(&self, now: Instant) -> bool {
 matches!(self.expires_at, Some(t) if now >= t)
 }

 pub(crate) fn age(&self, now: Instant) -> Duration {
 now.saturating_duration_since(self.created_at)
 }
}
