//! Configuration for the retry driver.

use crate::events::RetryEvent;
use resilience_classifier::ClassifierConfig;
use resilience_core::{EventListeners, FailureKind, FnListener, RetryPolicyTable};
use std::time::Duration;

/// A provider/model pair the driver can switch to.
#[derive(Debug, Clone)]
pub struct FallbackTarget {
 pub provider: String,
 pub model: String,
}

impl FallbackTarget {
 pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
 Self {
 provider: provider.into(),
 model: model.into(),
 }
 }
}

pub struct RetryDriverConfig {
 pub(crate) retry_policy_table: RetryPolicyTable,
 pub(crate) classifier_config: ClassifierConfig,
 pub(crate) max_retries_without_fallback: u32,
 pub(crate) max_additional_retries_with_fallback: u32,
 pub(crate) retry_after_multiplier: f64,
 pub(crate) unknown_kind_base_delay: Duration,
 pub(crate) unknown_kind_max_delay: Duration,
 pub(crate) unknown_kind_jitter: Duration,
 pub(crate) provider_fallback: Option<FallbackTarget>,
 pub(crate) large_context_fallback: Option<FallbackTarget>,
 pub(crate) error_fallback: Option<FallbackTarget>,
 pub(crate) event_listeners: EventListeners<RetryEvent>,
}

pub struct RetryDriverConfigBuilder {
 retry_policy_table: RetryPolicyTable,
 classifier_config: ClassifierConfig,
 max_retries_without_fallback: u32,
 max_additional_retries_with_fallback: u32,
 retry_after_multiplier: f64,
 unknown_kind_base_delay: Duration,
 unknown_kind_max_delay: Duration,
 unknown_kind_jitter: Duration,
 provider_fallback: Option<FallbackTarget>,
 large_context_fallback: Option<FallbackTarget>,
 error_fallback: Option<FallbackTarget>,
 event_listeners: EventListeners<RetryEvent>,
}

impl RetryDriverConfigBuilder {
 pub fn new() -> Self {
 Self {
 retry_policy_table: RetryPolicyTable::default(),
 classifier_config: ClassifierConfig::default(),
 max_retries_without_fallback: 6,
 max_additional_retries_with_fallback: 3,
 retry_after_multiplier: 1.1,
 unknown_kind_base_delay: Duration::from_secs(1),
 unknown_kind_max_delay: Duration::from_secs(30),
 unknown_kind_jitter: Duration::from_millis(100),
 provider_fallback: None,
 large_context_fallback: None,
 error_fallback: None,
 event_listeners: EventListeners::new(),
 }
 }

 pub fn retry_policy_table(mut self, table: RetryPolicyTable) -> Self {
 self.retry_policy_table = table;
 self
 }

 pub fn classifier_config(mut self, config: ClassifierConfig) -> Self {
 self.classifier_config = config;
 self
 }

 /// Attempt cap while the call has not yet switched to a provider
 /// fallback. Chosen to match the retryable policy table's highest
 /// per-kind `max_attempts` (5) plus headroom for a kind change mid-call.
 pub fn max_retries_without_fallback(mut self, n: u32) -> Self {
 self.max_retries_without_fallback = n;
 self
 }

 /// Additional attempt cap granted after switching to a fallback target,
 /// counted from the switch.
 pub fn max_additional_retries_with_fallback(mut self, n: u32) -> Self {
 self.max_additional_retries_with_fallback = n;
 self
 }

 /// Multiplier applied to a provider-declared retry-after hint. Default: 1.1.
 pub fn retry_after_multiplier(mut self, multiplier: f64) -> Self {
 self.retry_after_multiplier = multiplier;
 self
 }

 /// Base delay for the "unknown kind" backoff fallback. Default: 1s.
 pub fn unknown_kind_base_delay(mut self, delay: Duration) -> Self {
 self.unknown_kind_base_delay = delay;
 self
 }

 /// Ceiling for the "unknown kind" backoff fallback. Default: 30s.
 pub fn unknown_kind_max_delay(mut self, delay: Duration) -> Self {
 self.unknown_kind_max_delay = delay;
 self
 }

 /// Jitter window for the "unknown kind" backoff fallback. Default: 100ms.
 pub fn unknown_kind_jitter(mut self, jitter: Duration) -> Self {
 self.unknown_kind_jitter = jitter;
 self
 }

 /// Target to switch to when the current provider's circuit is open.
 pub fn provider_fallback(mut self, target: FallbackTarget) -> Self {
 self.provider_fallback = Some(target);
 self
 }

 /// Target to switch to on a `context_too_long` failure.
 pub fn large_context_fallback(mut self, target: FallbackTarget) -> Self {
 self.large_context_fallback = Some(target);
 self
 }

 /// Target to switch to on any other non-retryable, fallback-eligible failure.
 pub fn error_fallback(mut self, target: FallbackTarget) -> Self {
 self.error_fallback = Some(target);
 self
 }

 pub fn on_retry_attempt<F>(mut self, f: F) -> Self
 where
 F: Fn(u32, FailureKind, u64, bool, bool, &str, &str, Option<u16>, &str)
 + Send
 + Sync
 + 'static,
 {
 self.event_listeners.add(FnListener::new(move |event| {
 if let RetryEvent::Attempt {
 attempt_number,
 kind,
 delay_ms,
 will_retry,
 retryable,
 provider,
 model,
 http_code,
 error_message,
 ..
 } = event
 {
 f(
 *attempt_number,
 *kind,
 *delay_ms,
 *will_retry,
 *retryable,
 provider,
 model,
 *http_code,
 error_message,
 );
 }
 }));
 self
 }

 pub fn on_retry_exhaust<F>(mut self, f: F) -> Self
 where
 F: Fn(u32, u64, &[FailureKind], &str, &str) + Send + Sync + 'static,
 {
 self.event_listeners.add(FnListener::new(move |event| {
 if let RetryEvent::Exhaust {
 total_attempts,
 total_duration_ms,
 kinds_seen,
 final_error,
 resolution,
 ..
 } = event
 {
 f(
 *total_attempts,
 *total_duration_ms,
 kinds_seen,
 final_error,
 resolution,
 );
 }
 }));
 self
 }

 pub fn on_circuit_event<F>(mut self, f: F) -> Self
 where
 F: Fn(&str, &str, &str, &str) + Send + Sync + 'static,
 {
 self.event_listeners.add(FnListener::new(move |event| {
 if let RetryEvent::CircuitEvent {
 pattern_name,
 old_state,
 new_state,
 reason,
 ..
 } = event
 {
 f(pattern_name, old_state, new_state, reason);
 }
 }));
 self
 }

 pub fn on_fallback_event<F>(mut self, f: F) -> Self
 where
 F: Fn(&str, &str, &str, &str, &str, &str) + Send + Sync + 'static,
 {
 self.event_listeners.add(FnListener::new(move |event| {
 if let RetryEvent::FallbackEvent {
 from_provider,
 to_provider,
 from_model,
 to_model,
 fallback_type,
 reason,
 ..
 } = event
 {
 f(
 from_provider,
 to_provider,
 from_model,
 to_model,
 fallback_type,
 reason,
 );
 }
 }));
 self
 }

 pub fn build(self) -> RetryDriverConfig {
 RetryDriverConfig {
 retry_policy_table: self.retry_policy_table,
 classifier_config: self.classifier_config,
 max_retries_without_fallback: self.max_retries_without_fallback,
 max_additional_retries_with_fallback: self.max_additional_retries_with_fallback,
 retry_after_multiplier: self.retry_after_multiplier,
 unknown_kind_base_delay: self.unknown_kind_base_delay,
 unknown_kind_max_delay: self.unknown_kind_max_delay,
 unknown_kind_jitter: self.unknown_kind_jitter,
 provider_fallback: self.provider_fallback,
 large_context_fallback: self.large_context_fallback,
 error_fallback: self.error_fallback,
 event_listeners: self.event_listeners,
 }
 }
}

impl Default for RetryDriverConfigBuilder {
 fn default() -> Self {
 Self::new()
 }
}

impl RetryDriverConfig {
 pub fn builder() -> RetryDriverConfigBuilder {
 RetryDriverConfigBuilder::new()
 }
}

impl Default for RetryDriverConfig {
 fn default() -> Self {
 RetryDriverConfigBuilder::new().build()
 }
}

#[cfg(test)]
mod tests {
 use super::*;

 #[test]
 fn defaults_match_chosen_caps() {
 let config = RetryDriverConfig::default();
 assert_eq!(config.max_retries_without_fallback, 6);
 assert_eq!(config.max_additional_retries_with_fallback, 3);
 assert!((config.retry_after_multiplier - 1.1).abs() < f64::EPSILON);
 }

 #[test]
 fn builder_overrides_take_effect() {
 let config = RetryDriverConfig::builder()
.max_retries_without_fallback(2)
.provider_fallback(FallbackTarget::new("anthropic", "claude"))
.build();
 assert_eq!(config.max_retries_without_fallback, 2);
 assert_eq!(config.provider_fallback.unwrap().provider, "anthropic");
 }
}
