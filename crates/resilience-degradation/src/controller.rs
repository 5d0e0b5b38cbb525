use crate::active::{ActiveDegradation, Scope};
use crate::config::DegradationConfig;
use crate::events::DegradationEvent;
use crate::level::DegradationLevel;
use crate::modifications::RequestModifications;
use crate::strategy::{strategy_for, Strategy};
use parking_lot::Mutex;
use resilience_core::EventListeners;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Tracks every active degradation and synthesizes per-request
/// modifications from the effective level.
pub struct DegradationController {
 config: DegradationConfig,
 active: Mutex<HashMap<u64, ActiveDegradation>>,
 next_id: AtomicU64,
 event_listeners: EventListeners<DegradationEvent>,
}

impl DegradationController {
 pub fn new(config: DegradationConfig) -> Self {
 Self {
 config,
 active: Mutex::new(HashMap::new()),
 next_id: AtomicU64::new(1),
 event_listeners: EventListeners::new(),
 }
 }

 pub fn with_listeners(config: DegradationConfig, listeners: EventListeners<DegradationEvent>) -> Self {
 Self {
 config,
 active: Mutex::new(HashMap::new()),
 next_id: AtomicU64::new(1),
 event_listeners: listeners,
 }
 }

 /// Manually triggers a degradation, returning its id for later recovery.
 pub fn trigger(
 &self,
 level: DegradationLevel,
 reason: impl Into<String>,
 scope: Scope,
 duration: Option<Duration>,
 ) -> u64 {
 let id = self.next_id.fetch_add(1, Ordering::Relaxed);
 let reason = reason.into();
 let record = ActiveDegradation {
 id,
 level,
 reason: reason.clone(),
 scope,
 started_at: Instant::now(),
 expires_at: duration.map(|d| Instant::now() + d),
 auto_recover: duration.is_some(),
 };
 self.active.lock().insert(id, record);

 #[cfg(feature = "tracing")]
 tracing::warn!(id, level = level.name(), reason = %reason, "degradation triggered");
 #[cfg(feature = "metrics")]
 metrics::counter!("degradation_triggered_total", "level" => level.name()).increment(1);

 self.event_listeners.emit(&DegradationEvent::Triggered {
 timestamp: Instant::now(),
 id,
 level,
 reason,
 });
 id
 }

 pub fn recover(&self, id: u64) {
 if self.active.lock().remove(&id).is_some() {
 self.event_listeners.emit(&DegradationEvent::Recovered {
 timestamp: Instant::now(),
 id,
 });
 }
 }

 pub fn recover_scope(&self, provider: &str) {
 let ids: Vec<u64> = self
.active
.lock()
.iter()
.filter(|(_, d)| matches!(&d.scope, Scope::Provider(p) if p == provider))
.map(|(id, _)| *id)
.collect();
 for id in ids {
 self.recover(id);
 }
 }

 pub fn recover_all(&self) {
 let ids: Vec<u64> = self.active.lock().keys().copied().collect();
 for id in ids {
 self.recover(id);
 }
 }

 fn prune_expired(&self) {
 self.active.lock().retain(|_, d| !d.is_expired());
 }

 /// The lattice-max over every unexpired degradation matching `provider`.
 pub fn effective_level(&self, provider: &str) -> DegradationLevel {
 self.prune_expired();
 self.active
.lock()
.values()
.filter(|d| d.scope.matches(provider))
.map(|d| d.level)
.fold(DegradationLevel::None, DegradationLevel::max)
 }

 pub fn strategy(&self, provider: &str) -> Strategy {
 strategy_for(self.effective_level(provider))
 }

 /// Synthesizes concrete modifications for one request: context cut then
 /// token cap, timeout scaling, retry cap only when reducing, queueing only
 /// for non-urgent requests, and the model hint.
 pub fn modifications(
 &self,
 provider: &str,
 original_max_tokens: u32,
 original_timeout_ms: u64,
 is_urgent: bool,
 ) -> RequestModifications {
 let strategy = self.strategy(provider);

 let cut = (original_max_tokens as f64
 * (1.0 - strategy.context_reduction_pct as f64 / 100.0))
.round() as u32;
 let max_tokens = match strategy.max_context_tokens {
 Some(cap) => cut.min(cap),
 None => cut,
 };

 let timeout_ms = (original_timeout_ms as f64 * strategy.timeout_multiplier).round() as u64;

 let max_retries = if strategy.reduce_retries {
 strategy.max_retries
 } else {
 None
 };

 let should_queue = strategy.queue_non_urgent && !is_urgent;

 RequestModifications {
 max_tokens,
 timeout_ms,
 max_retries,
 should_queue,
 prefer_faster_model: strategy.prefer_faster_model,
 prefer_cheaper_model: strategy.prefer_cheaper_model,
 disabled_features: strategy.disabled_features.to_vec(),
 }
 }

 /// Automatically triggers a global degradation from an observed
 /// error-rate percentage. No-op below
 /// `LightThreshold`.
 pub fn observe_error_rate(&self, error_rate_pct: f64) -> Option<u64> {
 let (level, duration) = if error_rate_pct >= self.config.critical_threshold {
 (DegradationLevel::Critical, self.config.max_degradation_duration)
 } else if error_rate_pct >= self.config.heavy_threshold {
 (DegradationLevel::Heavy, Duration::from_secs(15 * 60))
 } else if error_rate_pct >= self.config.moderate_threshold {
 (DegradationLevel::Moderate, Duration::from_secs(10 * 60))
 } else if error_rate_pct >= self.config.light_threshold {
 (DegradationLevel::Light, Duration::from_secs(5 * 60))
 } else {
 return None;
 };

 Some(self.trigger(
 level,
 format!("observed error rate {error_rate_pct:.1}%"),
 Scope::Global,
 Some(duration),
 ))
 }
}

#[cfg(test)]
mod tests {
 use super::*;

 fn controller() -> DegradationController {
 DegradationController::new(DegradationConfig::default())
 }

 #[test]
 fn no_active_degradation_is_level_none() {
 let c = controller();
 assert_eq!(c.effective_level("openai"), DegradationLevel::None);
 }

 #[test]
 fn global_degradation_applies_to_every_provider() {
 let c = controller();
 c.trigger(DegradationLevel::Heavy, "test", Scope::Global, None);
 assert_eq!(c.effective_level("openai"), DegradationLevel::Heavy);
 assert_eq!(c.effective_level("anthropic"), DegradationLevel::Heavy);
 }

 #[test]
 fn provider_scoped_degradation_is_isolated() {
 let c = controller();
 c.trigger(
 DegradationLevel::Critical,
 "test",
 Scope::Provider("openai".into()),
 None,
 );
 assert_eq!(c.effective_level("openai"), DegradationLevel::Critical);
 assert_eq!(c.effective_level("anthropic"), DegradationLevel::None);
 }

 #[test]
 fn effective_level_is_lattice_max_of_global_and_scoped() {
 let c = controller();
 c.trigger(DegradationLevel::Light, "global", Scope::Global, None);
 c.trigger(
 DegradationLevel::Heavy,
 "scoped",
 Scope::Provider("openai".into()),
 None,
 );
 assert_eq!(c.effective_level("openai"), DegradationLevel::Heavy);
 assert_eq!(c.effective_level("anthropic"), DegradationLevel::Light);
 }

 #[test]
 fn expired_degradation_is_excluded() {
 let c = controller();
 c.trigger(
 DegradationLevel::Critical,
 "test",
 Scope::Global,
 Some(Duration::from_millis(1)),
 );
 std::thread::sleep(Duration::from_millis(5));
 assert_eq!(c.effective_level("openai"), DegradationLevel::None);
 }

 #[test]
 fn recover_removes_the_record() {
 let c = controller();
 let id = c.trigger(DegradationLevel::Heavy, "test", Scope::Global, None);
 c.recover(id);
 assert_eq!(c.effective_level("openai"), DegradationLevel::None);
 }

 #[test]
 fn recover_scope_only_clears_that_providers_records() {
 let c = controller();
 c.trigger(
 DegradationLevel::Heavy,
 "test",
 Scope::Provider("openai".into()),
 None,
 );
 c.trigger(
 DegradationLevel::Heavy,
 "test",
 Scope::Provider("anthropic".into()),
 None,
 );
 c.recover_scope("openai");
 assert_eq!(c.effective_level("openai"), DegradationLevel::None);
 assert_eq!(c.effective_level("anthropic"), DegradationLevel::Heavy);
 }

 #[test]
 fn modifications_apply_context_cut_then_token_cap() {
 let c = controller();
 c.trigger(DegradationLevel::Critical, "test", Scope::Global, None);
 let m = c.modifications("openai", 8_000, 30_000, false);
 assert_eq!(m.max_tokens, 4_000);
 assert_eq!(m.timeout_ms, 150_000);
 assert_eq!(m.max_retries, Some(1));
 assert!(m.should_queue);
 }

 #[test]
 fn urgent_requests_are_never_queued() {
 let c = controller();
 c.trigger(DegradationLevel::Heavy, "test", Scope::Global, None);
 let m = c.modifications("openai", 8_000, 30_000, true);
 assert!(!m.should_queue);
 }

 #[test]
 fn automatic_triggering_maps_error_rate_to_level() {
 let c = controller();
 assert!(c.observe_error_rate(2.0).is_none());
 c.observe_error_rate(60.0);
 assert_eq!(c.effective_level("openai"), DegradationLevel::Critical);
 }
}
