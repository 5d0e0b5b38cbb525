//! Events emitted by the dead-letter queue.

use resilience_core::{FailureKind, ResilienceEvent};
use std::time::Instant;

/// Events describing dead-letter-queue admission and lifecycle activity.
#[derive(Debug, Clone)]
pub enum DlqEvent {
 /// A new item was admitted to the queue.
 ItemAdded {
 timestamp: Instant,
 id: String,
 provider: String,
 failure_kind: FailureKind,
 },
 /// An item was evicted to make room for a new one (queue at capacity).
 ItemEvicted { timestamp: Instant, id: String },
 /// A scheduled or pending item's retry was attempted.
 ItemRetried {
 timestamp: Instant,
 id: String,
 success: bool,
 },
 /// An item was explicitly resolved or discarded.
 ItemResolved {
 timestamp: Instant,
 id: String,
 resolution: String,
 },
 /// An item's `expires_at` passed while still pending.
 ItemExpired { timestamp: Instant, id: String },
}

impl ResilienceEvent for DlqEvent {
 fn event_type(&self) -> &'static str {
 match self {
 DlqEvent::ItemAdded { .. } => "item_added",
 DlqEvent::ItemEvicted { .. } => "item_evicted",
 DlqEvent::ItemRetried { .. } => "item_retried",
 DlqEvent::ItemResolved { .. } => "item_resolved",
 DlqEvent::ItemExpired { .. } => "item_expired",
 }
 }

 fn timestamp(&self) -> Instant {
 match self {
 DlqEvent::ItemAdded { timestamp, .. }
 | DlqEvent::ItemEvicted { timestamp, .. }
 | DlqEvent::ItemRetried { timestamp, .. }
 | DlqEvent::ItemResolved { timestamp, .. }
 | DlqEvent::ItemExpired { timestamp, .. } => *timestamp,
 }
 }

 fn pattern_name(&self) -> &str {
 match self {
 DlqEvent::ItemAdded { id, .. }
 | DlqEvent::ItemEvicted { id, .. }
 | DlqEvent::ItemRetried { id, .. }
 | DlqEvent::ItemResolved { id, .. }
 | DlqEvent::ItemExpired { id, .. } => id,
 }
 }
}
