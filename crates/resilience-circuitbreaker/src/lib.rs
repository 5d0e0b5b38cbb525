//! Per-provider circuit breaker.
//! Keyed by provider name rather than wrapping a single `tower::Service`:
//! the retry driver calls into one shared [`CircuitBreakerRegistry`] for
//! whichever provider it is currently trying. Unknown providers are always
//! closed.

mod circuit;
mod config;
mod events;

pub use circuit::{CircuitSnapshot, CircuitState};
pub use config::{CircuitBreakerConfig, CircuitBreakerConfigBuilder};
pub use events::CircuitBreakerEvent;

use circuit::Circuit;
use parking_lot::Mutex;
use resilience_core::FailureKind;
use std::collections::HashMap;

/// A registry of per-provider breakers sharing one [`CircuitBreakerConfig`].
pub struct CircuitBreakerRegistry {
 config: CircuitBreakerConfig,
 circuits: Mutex<HashMap<String, Circuit>>,
}

impl CircuitBreakerRegistry {
 pub fn new(config: CircuitBreakerConfig) -> Self {
 Self {
 config,
 circuits: Mutex::new(HashMap::new()),
 }
 }

 /// `true` if calls to `provider` should currently be rejected. Unknown
 /// providers are always closed.
 pub fn is_open(&self, provider: &str) -> bool {
 let mut circuits = self.circuits.lock();
 circuits
.entry(provider.to_string())
.or_insert_with(Circuit::new)
.is_open(provider, &self.config)
 }

 pub fn record_success(&self, provider: &str) {
 let mut circuits = self.circuits.lock();
 circuits
.entry(provider.to_string())
.or_insert_with(Circuit::new)
.record_success(provider, &self.config);
 }

 /// Records a failure. Returns `false` if `kind` is on the exclusion list
 /// and the record was a no-op.
 pub fn record_failure(&self, provider: &str, kind: FailureKind) -> bool {
 let mut circuits = self.circuits.lock();
 circuits
.entry(provider.to_string())
.or_insert_with(Circuit::new)
.record_failure(provider, kind, &self.config)
 }

 pub fn snapshot(&self, provider: &str) -> Option<CircuitSnapshot> {
 self.circuits.lock().get(provider).map(Circuit::snapshot)
 }

 /// Names of every provider this registry has ever seen a call for.
 pub fn known_providers(&self) -> Vec<String> {
 self.circuits.lock().keys().cloned().collect()
 }
}

#[cfg(test)]
mod tests {
 use super::*;
 use std::time::Duration;

 fn registry(failure_threshold: u32, open_duration: Duration) -> CircuitBreakerRegistry {
 CircuitBreakerRegistry::new(
 CircuitBreakerConfig::builder()
.failure_threshold(failure_threshold)
.failure_window_max(100)
.open_duration(open_duration)
.success_threshold(2)
.build(),
 )
 }

 #[test]
 fn unknown_provider_is_closed() {
 let reg = registry(3, Duration::from_secs(30));
 assert!(!reg.is_open("openai"));
 }

 #[test]
 fn opens_after_consecutive_failure_threshold() {
 let reg = registry(3, Duration::from_secs(30));
 for _ in 0..3 {
 reg.record_failure("openai", FailureKind::ServerError);
 }
 assert!(reg.is_open("openai"));
 }

 #[test]
 fn success_resets_consecutive_failures() {
 let reg = registry(3, Duration::from_secs(30));
 reg.record_failure("openai", FailureKind::ServerError);
 reg.record_failure("openai", FailureKind::ServerError);
 reg.record_success("openai");
 reg.record_failure("openai", FailureKind::ServerError);
 assert!(!reg.is_open("openai"), "consecutive count should have reset");
 }

 #[test]
 fn excluded_kind_does_not_open_circuit() {
 let reg = registry(2, Duration::from_secs(30));
 assert!(!reg.record_failure("openai", FailureKind::ContextTooLong));
 assert!(!reg.record_failure("openai", FailureKind::AuthInvalid));
 assert!(!reg.is_open("openai"));
 }

 #[test]
 fn half_open_failure_reopens_immediately() {
 let reg = registry(1, Duration::from_millis(1));
 reg.record_failure("openai", FailureKind::ServerError);
 assert!(reg.is_open("openai"));
 std::thread::sleep(Duration::from_millis(5));
 // Observing is_open() after open_duration elapses transitions to half_open.
 assert!(!reg.is_open("openai"));
 reg.record_failure("openai", FailureKind::ServerError);
 assert!(reg.is_open("openai"));
 }

 #[test]
 fn half_open_closes_after_success_threshold() {
 let reg = registry(1, Duration::from_millis(1));
 reg.record_failure("openai", FailureKind::ServerError);
 std::thread::sleep(Duration::from_millis(5));
 assert!(!reg.is_open("openai")); // transitions to half_open
 reg.record_success("openai");
 reg.record_success("openai");
 assert!(!reg.is_open("openai"));
 }

 #[test]
 fn half_open_rejects_once_probe_quota_is_spent() {
 let reg = CircuitBreakerRegistry::new(
 CircuitBreakerConfig::builder()
.failure_threshold(1)
.open_duration(Duration::from_millis(1))
.success_threshold(5)
.half_open_max_requests(2)
.build(),
 );
 reg.record_failure("openai", FailureKind::ServerError);
 std::thread::sleep(Duration::from_millis(5));

 assert!(!reg.is_open("openai"), "first probe should be admitted");
 assert!(!reg.is_open("openai"), "second probe should be admitted");
 assert!(
 reg.is_open("openai"),
 "third probe should be rejected once the quota of 2 is spent"
 );
 }

 #[test]
 fn providers_are_independent() {
 let reg = registry(1, Duration::from_secs(30));
 reg.record_failure("openai", FailureKind::ServerError);
 assert!(reg.is_open("openai"));
 assert!(!reg.is_open("anthropic"));
 }

 #[test]
 fn window_max_opens_even_without_consecutive_run() {
 let reg = CircuitBreakerRegistry::new(
 CircuitBreakerConfig::builder()
.failure_threshold(100)
.failure_window_max(3)
.open_duration(Duration::from_secs(30))
.build(),
 );
 reg.record_failure("openai", FailureKind::ServerError);
 reg.record_success("openai");
 reg.record_failure("openai", FailureKind::ServerError);
 reg.record_success("openai");
 reg.record_failure("openai", FailureKind::ServerError);
 assert!(reg.is_open("openai"));
 }
}
