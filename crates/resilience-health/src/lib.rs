//! Rolling per-provider health scoring.
//! A provider-name-keyed scorer rather than a generic pluggable selection
//! strategy over arbitrary resources: the retry driver and degradation
//! controller both need "is this specific provider currently healthy", not
//! a generic `Selector<T>`.

mod config;
mod events;
mod provider;
mod status;

pub use config::{HealthScorerConfig, HealthScorerConfigBuilder};
pub use events::HealthEvent;
pub use provider::ProviderHealth;
pub use status::HealthStatus;

use parking_lot::Mutex;
use resilience_core::EventListeners;
use std::collections::HashMap;
use std::time::Instant;

/// Registry of per-provider health state, shared across the retry driver.
pub struct HealthRegistry {
 config: HealthScorerConfig,
 providers: Mutex<HashMap<String, ProviderHealth>>,
 event_listeners: EventListeners<HealthEvent>,
}

impl HealthRegistry {
 pub fn new(config: HealthScorerConfig) -> Self {
 Self {
 config,
 providers: Mutex::new(HashMap::new()),
 event_listeners: EventListeners::new(),
 }
 }

 pub fn with_listeners(config: HealthScorerConfig, listeners: EventListeners<HealthEvent>) -> Self {
 Self {
 config,
 providers: Mutex::new(HashMap::new()),
 event_listeners: listeners,
 }
 }

 /// Records a request outcome and latency sample, recomputing the score.
 pub fn record_request(&self, provider: &str, success: bool, latency_ms: u64) {
 let mut providers = self.providers.lock();
 let entry = providers
.entry(provider.to_string())
.or_insert_with(|| ProviderHealth::new(&self.config));
 entry.record_latency(latency_ms);

 #[cfg(feature = "metrics")]
 metrics::counter!(
 "health_requests_total",
 "provider" => provider.to_string(),
 "outcome" => if success { "success" } else { "failure" },
 )
.increment(1);
 #[cfg(feature = "metrics")]
 metrics::histogram!("health_latency_ms", "provider" => provider.to_string()).record(latency_ms as f64);

 if let Some((from, to)) = entry.record_request(success, &self.config) {
 let score = entry.score();

 #[cfg(feature = "tracing")]
 tracing::info!(provider, from = ?from, to = ?to, score, "provider health status changed");
 #[cfg(feature = "metrics")]
 metrics::gauge!("health_score", "provider" => provider.to_string()).set(score as f64);

 self.event_listeners.emit(&HealthEvent::StatusChanged {
 provider: provider.to_string(),
 timestamp: Instant::now(),
 from,
 to,
 score,
 });
 }
 }

 /// Records a latency sample without affecting the success/failure tally.
 pub fn record_latency(&self, provider: &str, latency_ms: u64) {
 let mut providers = self.providers.lock();
 let entry = providers
.entry(provider.to_string())
.or_insert_with(|| ProviderHealth::new(&self.config));
 entry.record_latency(latency_ms);
 entry.recompute_score(&self.config);
 }

 /// Current score for `provider`. Unknown providers score 50.
 pub fn score(&self, provider: &str) -> u32 {
 self.providers
.lock()
.get(provider)
.map(ProviderHealth::score)
.unwrap_or(50)
 }

 /// Current status band for `provider`. A provider the registry has never
 /// recorded a request for reports [`HealthStatus::Unknown`], distinct from a recorded provider whose
 /// score happens to fall in the `degraded` band.
 pub fn status(&self, provider: &str) -> HealthStatus {
 self.providers
.lock()
.get(provider)
.map(ProviderHealth::status)
.unwrap_or(HealthStatus::Unknown)
 }

 /// Returns the highest-scoring of `candidates`. Ties resolve to the
 /// earliest candidate in the slice.
 pub fn best<'a>(&self, candidates: &[&'a str]) -> Option<&'a str> {
 candidates
.iter()
.copied()
.max_by_key(|provider| self.score(provider))
 }
}

#[cfg(test)]
mod tests {
 use super::*;

 fn registry() -> HealthRegistry {
 HealthRegistry::new(HealthScorerConfig::default())
 }

 #[test]
 fn unknown_provider_scores_fifty() {
 let reg = registry();
 assert_eq!(reg.score("openai"), 50);
 }

 #[test]
 fn best_picks_highest_scoring_candidate() {
 let reg = registry();
 for _ in 0..20 {
 reg.record_request("openai", true, 100);
 }
 for _ in 0..20 {
 reg.record_request("anthropic", false, 6_000);
 }
 assert_eq!(reg.best(&["openai", "anthropic"]), Some("openai"));
 }

 #[test]
 fn consecutive_failures_penalize_score() {
 let reg = registry();
 for _ in 0..5 {
 reg.record_request("openai", false, 100);
 }
 assert!(reg.score("openai") < 50);
 assert_eq!(reg.status("openai"), HealthStatus::Unhealthy);
 }

 #[test]
 fn consecutive_successes_bonus_applies_at_ten() {
 let reg = registry();
 for _ in 0..10 {
 reg.record_request("openai", true, 50);
 }
 // healthy success rate + low latency + streak bonus, clamped at 100.
 assert_eq!(reg.score("openai"), 100);
 assert_eq!(reg.status("openai"), HealthStatus::Healthy);
 }

 #[test]
 fn percentile_is_nearest_rank_over_samples() {
 let reg = registry();
 for ms in [10, 20, 30, 40, 50, 60, 70, 80, 90, 100] {
 reg.record_request("openai", true, ms);
 }
 let providers = reg.providers.lock();
 let health = providers.get("openai").unwrap();
 assert_eq!(health.p95(), Some(100));
 assert_eq!(health.percentile(50.0), Some(50));
 }
}
