//! Events emitted by the idempotency ledger.

use resilience_core::ResilienceEvent;
use std::time::Instant;

#[derive(Debug, Clone)]
pub enum IdempotencyEvent {
 /// A fresh or refreshed record entered `in_progress`.
 RecordStarted { timestamp: Instant, key: String },
 /// A record reached a terminal status.
 RecordCompleted {
 timestamp: Instant,
 key: String,
 success: bool,
 },
 /// `check` found an equal-fingerprint record that blocks proceeding.
 DuplicateDetected { timestamp: Instant, key: String },
}

impl ResilienceEvent for IdempotencyEvent {
 fn event_type(&self) -> &'static str {
 match self {
 IdempotencyEvent::RecordStarted { .. } => "record_started",
 IdempotencyEvent::RecordCompleted { .. } => "record_completed",
 IdempotencyEvent::DuplicateDetected { .. } => "duplicate_detected",
 }
 }

 fn timestamp(&self) -> Instant {
 match self {
 IdempotencyEvent::RecordStarted { timestamp, .. }
 | IdempotencyEvent::RecordCompleted { timestamp, .. }
 | IdempotencyEvent::DuplicateDetected { timestamp, .. } => *timestamp,
 }
 }

 fn pattern_name(&self) -> &str {
 match self {
 IdempotencyEvent::RecordStarted { key, .. }
 | IdempotencyEvent::RecordCompleted { key, .. }
 | IdempotencyEvent::DuplicateDetected { key, .. } => key,
 }
 }
}
