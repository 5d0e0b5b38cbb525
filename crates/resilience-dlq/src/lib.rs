//! Durable-in-memory dead-letter queue for failed provider operations.
//! Failed operations that exhaust their retry budget are parked here instead
//! of being dropped. Items can be auto-retried on a schedule, listed and
//! filtered for inspection, and explicitly resolved or discarded. A
//! background task periodically expires stale `pending` items and removes
//! old terminal ones.

mod config;
mod error;
mod events;
mod filter;
mod item;

pub use config::{DlqConfig, DlqConfigBuilder};
pub use error::DlqError;
pub use events::DlqEvent;
pub use filter::ListFilter;
pub use item::{DlqItem, DlqStatus, FailureRecord};

use parking_lot::Mutex;
use resilience_core::{CancellationToken, FailureKind};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

struct State {
 items: HashMap<String, DlqItem>,
 /// Insertion order, oldest first, used to find the oldest non-processing
 /// item when the queue is at capacity.
 order: Vec<String>,
}

/// The dead-letter queue manager.
/// Cheaply cloneable: internal state lives behind an `Arc` and a single
/// `parking_lot::Mutex`.
pub struct DeadLetterQueue {
 config: Arc<DlqConfig>,
 state: Arc<Mutex<State>>,
 stop: CancellationToken,
}

impl Clone for DeadLetterQueue {
 fn clone(&self) -> Self {
 Self {
 config: Arc::clone(&self.config),
 state: Arc::clone(&self.state),
 stop: self.stop.clone(),
 }
 }
}

impl DeadLetterQueue {
 pub fn new(config: DlqConfig) -> Self {
 Self {
 config: Arc::new(config),
 state: Arc::new(Mutex::new(State {
 items: HashMap::new(),
 order: Vec::new(),
 })),
 stop: CancellationToken::new(),
 }
 }

 /// Spawns the background cleanup sweep. The returned handle is cancelled when `stop` is
 /// called; calling `stop` again is a no-op.
 pub fn spawn_cleanup_worker(&self) -> tokio::task::JoinHandle<()> {
 let queue = self.clone();
 let interval = self.config.cleanup_interval;
 tokio::spawn(async move {
 let mut ticker = tokio::time::interval(interval);
 loop {
 let tick = ticker.tick();
 tokio::select! {
 biased;
 _ = queue.stop.cancelled() => break,
 _ = tick => queue.run_cleanup(),
 }
 }
 })
 }

 /// Idempotently stops the background cleanup worker, if spawned.
 pub fn stop(&self) {
 self.stop.cancel();
 }

 fn run_cleanup(&self) {
 let now = Instant::now();
 let mut state = self.state.lock();
 let mut expired = Vec::new();
 for (id, item) in state.items.iter_mut() {
 if item.status == DlqStatus::Pending && item.is_expired(now) {
 item.status = DlqStatus::Expired;
 item.updated_at = now;
 expired.push(id.clone());
 }
 }
 let keep_resolved = self.config.keep_resolved;
 let removable: Vec<String> = state
.items
.iter()
.filter(|(_, item)| {
 item.is_terminal()
 && item
.resolved_at
.map(|t| now.saturating_duration_since(t) >= keep_resolved)
.unwrap_or(false)
 })
.map(|(id, _)| id.clone())
.collect();
 for id in &removable {
 state.items.remove(id);
 state.order.retain(|existing| existing != id);
 }
 drop(state);
 for id in expired {
 self.config
.event_listeners
.emit(&DlqEvent::ItemExpired { timestamp: now, id });
 }
 }

 /// Admits a failed operation.
 #[allow(clippy::too_many_arguments)]
 pub fn add(
 &self,
 operation_type: impl Into<String>,
 provider: impl Into<String>,
 model: impl Into<String>,
 plan_id: Option<String>,
 request_data: Vec<u8>,
 failure_kind: FailureKind,
 error_message: impl Into<String>,
 http_code: Option<u16>,
 total_attempts: u32,
 ) -> DlqItem {
 let now = Instant::now();
 let id = Uuid::new_v4().to_string();
 let provider = provider.into();
 let failure = FailureRecord {
 timestamp: now,
 kind: failure_kind,
 message: error_message.into(),
 http_code,
 };

 let (status, next_retry_at) = if self.config.auto_retry_enabled {
 (DlqStatus::Scheduled, Some(now + self.config.auto_retry_delay))
 } else {
 (DlqStatus::Pending, None)
 };
 let expires_at = self.config.default_ttl.map(|ttl| now + ttl);

 let item = DlqItem::new(
 id.clone(),
 now,
 operation_type.into(),
 provider.clone(),
 model.into(),
 plan_id,
 request_data,
 failure,
 total_attempts,
 status,
 next_retry_at,
 expires_at,
 );

 let evicted = {
 let mut state = self.state.lock();
 let evicted = if state.items.len() >= self.config.capacity {
 self.evict_oldest_non_processing(&mut state)
 } else {
 None
 };
 state.order.push(id.clone());
 state.items.insert(id.clone(), item.clone());
 evicted
 };

 if let Some(evicted_id) = evicted {
 self.config.event_listeners.emit(&DlqEvent::ItemEvicted {
 timestamp: now,
 id: evicted_id,
 });
 }
 #[cfg(feature = "tracing")]
 tracing::warn!(provider = %item.provider, kind = failure_kind.name(), id = %item.id, "dead-lettering operation");
 #[cfg(feature = "metrics")]
 metrics::counter!(
 "dlq_items_added_total",
 "provider" => item.provider.clone(),
 "failure_kind" => failure_kind.name(),
 )
.increment(1);

 self.config.event_listeners.emit(&DlqEvent::ItemAdded {
 timestamp: now,
 id,
 provider,
 failure_kind,
 });

 item
 }

 /// Evicts the oldest item whose status is not `processing`. Returns its id
 /// if one was evicted.
 fn evict_oldest_non_processing(&self, state: &mut State) -> Option<String> {
 let victim = state.order.iter().find(|id| {
 state
.items
.get(*id)
.map(|item| item.status != DlqStatus::Processing)
.unwrap_or(true)
 })?.clone();
 state.items.remove(&victim);
 state.order.retain(|id| *id != victim);
 Some(victim)
 }

 pub fn get(&self, id: &str) -> Option<DlqItem> {
 self.state.lock().items.get(id).cloned()
 }

 /// Lists items matching `filter`, most-recently-created first.
 pub fn list(&self, filter: &ListFilter) -> Vec<DlqItem> {
 let now = Instant::now();
 let state = self.state.lock();
 let mut matched: Vec<DlqItem> = state
.order
.iter()
.rev()
.filter_map(|id| state.items.get(id))
.filter(|item| {
 filter.status.map(|s| s == item.status).unwrap_or(true)
 && filter
.provider
.as_deref()
.map(|p| p == item.provider)
.unwrap_or(true)
 && filter
.op_type
.as_deref()
.map(|t| t == item.operation_type)
.unwrap_or(true)
 && filter
.failure_kind
.map(|k| k == item.failure_kind)
.unwrap_or(true)
 && filter
.plan_id
.as_deref()
.map(|p| item.plan_id.as_deref() == Some(p))
.unwrap_or(true)
 && filter
.min_age
.map(|min| item.age(now) >= min)
.unwrap_or(true)
 && filter
.max_age
.map(|max| item.age(now) <= max)
.unwrap_or(true)
 })
.cloned()
.collect();
 if let Some(limit) = filter.limit {
 matched.truncate(limit);
 }
 matched
 }

 /// Items whose `scheduled` retry is due.
 pub fn items_due_for_retry(&self) -> Vec<DlqItem> {
 let now = Instant::now();
 self.state
.lock()
.items
.values()
.filter(|item| {
 item.status == DlqStatus::Scheduled
 && item.next_retry_at.map(|t| t <= now).unwrap_or(false)
 })
.cloned()
.collect()
 }

 /// Explicitly (re)schedules an item for auto-retry.
 pub fn mark_for_retry(&self, id: &str, delay: Duration) -> Result<(), DlqError> {
 let now = Instant::now();
 let mut state = self.state.lock();
 let item = state
.items
.get_mut(id)
.ok_or_else(|| DlqError::ItemNotFound(id.to_string()))?;
 item.status = DlqStatus::Scheduled;
 item.next_retry_at = Some(now + delay);
 item.updated_at = now;
 Ok(())
 }

 /// Transitions `scheduled|pending -> processing` and returns a snapshot
 /// to act on.
 pub fn start_retry(&self, id: &str) -> Result<DlqItem, DlqError> {
 let now = Instant::now();
 let mut state = self.state.lock();
 let item = state
.items
.get_mut(id)
.ok_or_else(|| DlqError::ItemNotFound(id.to_string()))?;
 if !matches!(item.status, DlqStatus::Scheduled | DlqStatus::Pending) {
 return Err(DlqError::InvalidTransition {
 id: id.to_string(),
 from: status_name(item.status),
 action: "start_retry",
 });
 }
 item.status = DlqStatus::Processing;
 item.retry_count += 1;
 item.updated_at = now;
 Ok(item.clone())
 }

 /// Records the outcome of a retry attempt.
 pub fn complete_retry(
 &self,
 id: &str,
 success: bool,
 error: Option<(FailureKind, String, Option<u16>)>,
 ) -> Result<(), DlqError> {
 let now = Instant::now();
 {
 let mut state = self.state.lock();
 let item = state
.items
.get_mut(id)
.ok_or_else(|| DlqError::ItemNotFound(id.to_string()))?;

 if success {
 item.status = DlqStatus::Resolved;
 item.resolved_at = Some(now);
 item.resolution = Some("retried_success".to_string());
 item.resolved_by = Some("auto".to_string());
 } else {
 if let Some((kind, message, http_code)) = error {
 item.failure_history.push(FailureRecord {
 timestamp: now,
 kind,
 message: message.clone(),
 http_code,
 });
 item.failure_kind = kind;
 item.last_error = message;
 item.http_code = http_code;
 }
 item.total_attempts += 1;
 if item.retry_count >= self.config.auto_retry_max_count {
 item.status = DlqStatus::Pending;
 item.next_retry_at = None;
 } else {
 item.status = DlqStatus::Scheduled;
 item.next_retry_at =
 Some(now + self.config.auto_retry_delay * (item.retry_count + 1));
 }
 }
 item.updated_at = now;
 }
 #[cfg(feature = "tracing")]
 tracing::info!(id, success, "dlq item retry completed");
 #[cfg(feature = "metrics")]
 metrics::counter!(
 "dlq_retries_total",
 "outcome" => if success { "success" } else { "failure" },
 )
.increment(1);

 self.config.event_listeners.emit(&DlqEvent::ItemRetried {
 timestamp: now,
 id: id.to_string(),
 success,
 });
 Ok(())
 }

 /// Explicitly resolves an item.
 pub fn resolve(
 &self,
 id: &str,
 reason: impl Into<String>,
 by: impl Into<String>,
 ) -> Result<(), DlqError> {
 let now = Instant::now();
 let reason = reason.into();
 {
 let mut state = self.state.lock();
 let item = state
.items
.get_mut(id)
.ok_or_else(|| DlqError::ItemNotFound(id.to_string()))?;
 item.status = DlqStatus::Resolved;
 item.resolved_at = Some(now);
 item.resolution = Some(reason.clone());
 item.resolved_by = Some(by.into());
 item.updated_at = now;
 }
 self.config.event_listeners.emit(&DlqEvent::ItemResolved {
 timestamp: now,
 id: id.to_string(),
 resolution: reason,
 });
 Ok(())
 }

 /// Explicitly discards an item.
 pub fn discard(&self, id: &str, reason: impl Into<String>) -> Result<(), DlqError> {
 let now = Instant::now();
 let reason = reason.into();
 {
 let mut state = self.state.lock();
 let item = state
.items
.get_mut(id)
.ok_or_else(|| DlqError::ItemNotFound(id.to_string()))?;
 item.status = DlqStatus::Discarded;
 item.resolved_at = Some(now);
 item.resolution = Some(reason.clone());
 item.updated_at = now;
 }
 self.config.event_listeners.emit(&DlqEvent::ItemResolved {
 timestamp: now,
 id: id.to_string(),
 resolution: reason,
 });
 Ok(())
 }

 pub fn len(&self) -> usize {
 self.state.lock().items.len()
 }

 pub fn is_empty(&self) -> bool {
 self.len() == 0
 }
}

fn status_name(status: DlqStatus) -> &'static str {
 match status {
 DlqStatus::Pending => "pending",
 DlqStatus::Scheduled => "scheduled",
 DlqStatus::Processing => "processing",
 DlqStatus::Resolved => "resolved",
 DlqStatus::Discarded => "discarded",
 DlqStatus::Expired => "expired",
 }
}

#[cfg(test)]
mod tests {
 use super::*;

 fn dlq(capacity: usize, auto_retry: bool) -> DeadLetterQueue {
 DeadLetterQueue::new(
 DlqConfig::builder()
.capacity(capacity)
.auto_retry_enabled(auto_retry)
.auto_retry_max_count(2)
.auto_retry_delay(Duration::from_millis(1))
.build(),
 )
 }

 fn add_item(queue: &DeadLetterQueue, provider: &str) -> DlqItem {
 queue.add(
 "chat_completion",
 provider,
 "gpt-4",
 None,
 Vec::new(),
 FailureKind::ServerError,
 "boom",
 Some(500),
 3,
 )
 }

 #[test]
 fn add_schedules_when_auto_retry_enabled() {
 let queue = dlq(10, true);
 let item = add_item(&queue, "openai");
 assert_eq!(item.status, DlqStatus::Scheduled);
 assert!(item.next_retry_at.is_some());
 }

 #[test]
 fn add_pending_when_auto_retry_disabled() {
 let queue = dlq(10, false);
 let item = add_item(&queue, "openai");
 assert_eq!(item.status, DlqStatus::Pending);
 assert!(item.next_retry_at.is_none());
 }

 #[test]
 fn capacity_evicts_oldest_non_processing() {
 let queue = dlq(2, false);
 let first = add_item(&queue, "openai");
 add_item(&queue, "anthropic");
 add_item(&queue, "mistral");
 assert!(queue.get(&first.id).is_none());
 assert_eq!(queue.len(), 2);
 }

 #[test]
 fn capacity_eviction_skips_processing_items() {
 let queue = dlq(2, false);
 let first = add_item(&queue, "openai");
 queue.start_retry(&first.id).unwrap();
 add_item(&queue, "anthropic");
 add_item(&queue, "mistral");
 // first is processing, so it survives; one of the others is evicted instead
 assert!(queue.get(&first.id).is_some());
 assert_eq!(queue.len(), 2);
 }

 #[test]
 fn start_retry_then_success_resolves() {
 let queue = dlq(10, true);
 let item = add_item(&queue, "openai");
 let processing = queue.start_retry(&item.id).unwrap();
 assert_eq!(processing.status, DlqStatus::Processing);
 assert_eq!(processing.retry_count, 1);

 queue.complete_retry(&item.id, true, None).unwrap();
 let resolved = queue.get(&item.id).unwrap();
 assert_eq!(resolved.status, DlqStatus::Resolved);
 assert_eq!(resolved.resolution.as_deref(), Some("retried_success"));
 }

 #[test]
 fn repeated_failures_settle_to_pending_after_cap() {
 let queue = dlq(10, true);
 let item = add_item(&queue, "openai");

 for _ in 0..2 {
 queue.start_retry(&item.id).unwrap();
 queue
.complete_retry(
 &item.id,
 false,
 Some((FailureKind::ServerError, "still down".into(), Some(500))),
 )
.unwrap();
 }

 let final_item = queue.get(&item.id).unwrap();
 assert_eq!(final_item.status, DlqStatus::Pending);
 assert!(final_item.next_retry_at.is_none());
 assert_eq!(final_item.retry_count, 2);
 }

 #[test]
 fn items_due_for_retry_respects_next_retry_at() {
 let queue = dlq(10, true);
 let item = add_item(&queue, "openai");
 // next_retry_at is 1ms out; not due yet in practice, but mark_for_retry
 // with a zero delay makes it due immediately.
 queue.mark_for_retry(&item.id, Duration::from_secs(0)).unwrap();
 let due = queue.items_due_for_retry();
 assert_eq!(due.len(), 1);
 assert_eq!(due[0].id, item.id);
 }

 #[test]
 fn resolve_and_discard_set_terminal_status() {
 let queue = dlq(10, false);
 let a = add_item(&queue, "openai");
 let b = add_item(&queue, "openai");

 queue.resolve(&a.id, "manually fixed", "operator").unwrap();
 queue.discard(&b.id, "no longer relevant").unwrap();

 assert_eq!(queue.get(&a.id).unwrap().status, DlqStatus::Resolved);
 assert_eq!(queue.get(&b.id).unwrap().status, DlqStatus::Discarded);
 }

 #[test]
 fn list_filters_by_provider_and_status() {
 let queue = dlq(10, true);
 add_item(&queue, "openai");
 let anthropic_item = add_item(&queue, "anthropic");
 queue.resolve(&anthropic_item.id, "done", "operator").unwrap();

 let scheduled_openai = queue.list(
 &ListFilter::new()
.provider("openai")
.status(DlqStatus::Scheduled),
 );
 assert_eq!(scheduled_openai.len(), 1);

 let resolved = queue.list(&ListFilter::new().status(DlqStatus::Resolved));
 assert_eq!(resolved.len(), 1);
 assert_eq!(resolved[0].provider, "anthropic");
 }

 #[test]
 fn start_retry_on_resolved_item_is_rejected() {
 let queue = dlq(10, false);
 let item = add_item(&queue, "openai");
 queue.resolve(&item.id, "done", "operator").unwrap();
 let err = queue.start_retry(&item.id).unwrap_err();
 assert!(matches!(err, DlqError::InvalidTransition { .. }));
 }

 #[test]
 fn unknown_id_returns_not_found() {
 let queue = dlq(10, false);
 let err = queue.start_retry("missing").unwrap_err();
 assert!(matches!(err, DlqError::ItemNotFound(_)));
 }
}
