//! Retry driver: orchestrates classification, circuit breaking,
//! health scoring, provider/model fallback, and dead-lettering around a
//! single streaming provider call.
//! The driver is transport-agnostic: callers supply an `operation` closure
//! that performs the actual call and reports failures as a [`RawFailure`]
//! plus a human-readable message and the raw request bytes (kept around only
//! in case the call is ultimately dead-lettered).

mod config;
mod error;
mod events;

pub use config::{FallbackTarget, RetryDriverConfig, RetryDriverConfigBuilder};
pub use error::DriverError;
pub use events::RetryEvent;

use rand::Rng;
use resilience_circuitbreaker::CircuitBreakerRegistry;
use resilience_classifier::{classify, Classification, ClassifierInput, Headers};
use resilience_core::{CancellationToken, FailureKind};
use resilience_dlq::DeadLetterQueue;
use resilience_health::HealthRegistry;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A raw failure as reported by the caller's transport, before classification.
#[derive(Debug, Clone, Default)]
pub struct RawFailure {
 pub http_status: Option<u16>,
 pub headers: Vec<(String, String)>,
 pub body: String,
 pub is_subscription: bool,
}

/// The provider/model/attempt-number in effect for one invocation of the
/// caller's operation.
#[derive(Debug, Clone)]
pub struct AttemptContext {
 pub provider: String,
 pub model: String,
 pub attempt_number: u32,
}

/// Composes a circuit breaker, health scorer, and dead-letter queue around
/// the outer retry loop.
pub struct RetryDriver {
 config: Arc<RetryDriverConfig>,
 circuit_breakers: Arc<CircuitBreakerRegistry>,
 health: Arc<HealthRegistry>,
 dlq: Arc<DeadLetterQueue>,
}

impl Clone for RetryDriver {
 fn clone(&self) -> Self {
 Self {
 config: Arc::clone(&self.config),
 circuit_breakers: Arc::clone(&self.circuit_breakers),
 health: Arc::clone(&self.health),
 dlq: Arc::clone(&self.dlq),
 }
 }
}

impl RetryDriver {
 pub fn new(
 config: RetryDriverConfig,
 circuit_breakers: Arc<CircuitBreakerRegistry>,
 health: Arc<HealthRegistry>,
 dlq: Arc<DeadLetterQueue>,
 ) -> Self {
 Self {
 config: Arc::new(config),
 circuit_breakers,
 health,
 dlq,
 }
 }

 /// Drives `operation` through the retry loop: invoke, classify failures,
 /// back off, switch to a fallback target when the current one is
 /// exhausted or its circuit is open, and dead-letter the call once no
 /// budget remains.
 pub async fn with_retries<T, F, Fut>(
 &self,
 plan_id: Option<String>,
 operation_type: &str,
 provider: impl Into<String>,
 model: impl Into<String>,
 cancel: &CancellationToken,
 mut operation: F,
 ) -> Result<T, DriverError>
 where
 F: FnMut(AttemptContext) -> Fut,
 Fut: std::future::Future<Output = Result<T, (RawFailure, String, Vec<u8>)>>,
 {
 let pattern_name = operation_type.to_string();
 let start_time = Instant::now();
 let mut current_provider = provider.into();
 let mut current_model = model.into();
 let mut total_attempts: u32 = 0;
 let mut fallback_attempts: u32 = 0;
 let mut using_fallback = false;
 let mut kinds_seen: Vec<FailureKind> = Vec::new();

 loop {
 if cancel.is_cancelled() {
 return Err(DriverError::Cancelled);
 }

 let attempt_number = total_attempts + fallback_attempts + 1;
 let ctx = AttemptContext {
 provider: current_provider.clone(),
 model: current_model.clone(),
 attempt_number,
 };
 let call_started = Instant::now();
 let outcome = operation(ctx).await;
 let latency_ms = call_started.elapsed().as_millis() as u64;

 let (raw, message, request_data) = match outcome {
 Ok(value) => {
 self.circuit_breakers.record_success(&current_provider);
 self.health
.record_request(&current_provider, true, latency_ms);

 #[cfg(feature = "tracing")]
 tracing::debug!(
 pattern = %pattern_name,
 provider = %current_provider,
 attempt = attempt_number,
 latency_ms,
 "operation succeeded"
 );
 #[cfg(feature = "metrics")]
 metrics::counter!(
 "retry_attempts_total",
 "operation" => pattern_name.clone(),
 "provider" => current_provider.clone(),
 "outcome" => "success",
 )
.increment(1);

 return Ok(value);
 }
 Err(failure) => failure,
 };

 let headers = Headers::from_iter(raw.headers.clone());
 let classification = classify(
 &self.config.classifier_config,
 &ClassifierInput {
 http_status: raw.http_status,
 headers: Some(&headers),
 body: &raw.body,
 is_subscription: raw.is_subscription,
 },
 );
 kinds_seen.push(classification.kind);
 self.health
.record_request(&current_provider, false, latency_ms);
 self.circuit_breakers
.record_failure(&current_provider, classification.kind);

 if !classification.retryable {
 let large_context = classification.kind.is_fallback_eligible();
 let fallback = if large_context {
 self.config.large_context_fallback.as_ref()
 } else {
 self.config.error_fallback.as_ref()
 };

 if let Some(target) = fallback {
 let fallback_type = if large_context { "large_context" } else { "error" };
 self.switch_to(
 &pattern_name,
 &mut current_provider,
 &mut current_model,
 target,
 fallback_type,
 &message,
 );
 using_fallback = true;
 fallback_attempts = 0;
 total_attempts += 1;
 continue;
 }

 self.dead_letter(
 operation_type,
 &current_provider,
 &current_model,
 plan_id,
 request_data,
 classification.kind,
 &message,
 raw.http_status,
 attempt_number,
 );
 return Err(DriverError::Classified(classification));
 }

 // Retryable. If the provider's circuit just tripped, prefer
 // switching to a configured fallback over burning the remaining
 // budget against a provider that will keep rejecting calls.
 if self.circuit_breakers.is_open(&current_provider) {
 if let Some(target) = self.config.provider_fallback.clone() {
 self.emit_circuit_event(&pattern_name, &current_provider);
 self.switch_to(
 &pattern_name,
 &mut current_provider,
 &mut current_model,
 &target,
 "circuit_open",
 &message,
 );
 using_fallback = true;
 fallback_attempts = 0;
 total_attempts += 1;
 continue;
 }
 }

 let cap = if using_fallback {
 self.config.max_additional_retries_with_fallback
 } else {
 self.config.max_retries_without_fallback
 };
 let attempts_so_far = if using_fallback {
 fallback_attempts
 } else {
 total_attempts
 };

 if attempts_so_far + 1 >= cap {
 let total_duration_ms = start_time.elapsed().as_millis() as u64;
 self.dead_letter(
 operation_type,
 &current_provider,
 &current_model,
 plan_id,
 request_data,
 classification.kind,
 &message,
 raw.http_status,
 attempt_number,
 );
 self.emit_attempt(
 &pattern_name,
 attempt_number,
 classification,
 0,
 false,
 &current_provider,
 &current_model,
 raw.http_status,
 &message,
 );
 self.emit_exhaust(
 &pattern_name,
 attempt_number,
 total_duration_ms,
 &kinds_seen,
 &message,
 "dead_lettered",
 );
 return Err(DriverError::Exhausted {
 total_attempts: attempt_number,
 total_duration_ms,
 });
 }

 let delay = self.compute_backoff(&classification, attempts_so_far);

 self.emit_attempt(
 &pattern_name,
 attempt_number,
 classification,
 delay.as_millis() as u64,
 true,
 &current_provider,
 &current_model,
 raw.http_status,
 &message,
 );

 if cancel.race(tokio::time::sleep(delay)).await.is_err() {
 return Err(DriverError::Cancelled);
 }

 if using_fallback {
 fallback_attempts += 1;
 } else {
 total_attempts += 1;
 }
 }
 }

 fn switch_to(
 &self,
 pattern_name: &str,
 current_provider: &mut String,
 current_model: &mut String,
 target: &FallbackTarget,
 fallback_type: &'static str,
 reason: &str,
 ) {
 #[cfg(feature = "tracing")]
 tracing::warn!(
 pattern = %pattern_name,
 from_provider = %current_provider,
 to_provider = %target.provider,
 fallback_type,
 reason,
 "switching to fallback target"
 );
 #[cfg(feature = "metrics")]
 metrics::counter!(
 "retry_fallback_switches_total",
 "operation" => pattern_name.to_string(),
 "fallback_type" => fallback_type,
 )
.increment(1);

 self.config.event_listeners.emit(&RetryEvent::FallbackEvent {
 timestamp: Instant::now(),
 pattern_name: pattern_name.to_string(),
 from_provider: current_provider.clone(),
 to_provider: target.provider.clone(),
 from_model: current_model.clone(),
 to_model: target.model.clone(),
 fallback_type,
 reason: reason.to_string(),
 });
 *current_provider = target.provider.clone();
 *current_model = target.model.clone();
 }

 /// Backoff computation. `attempt_index` is the 0-based count of
 /// attempts already made along the current provider/fallback path, and
 /// feeds the per-kind policy's `initial_delay * multiplier^attempt_index`
 /// schedule.
 fn compute_backoff(&self, classification: &Classification, attempt_index: u32) -> Duration {
 let policy = self.config.retry_policy_table.lookup(classification.kind);

 if let Some(hint) = classification.retry_after {
 let scaled = hint.as_secs_f64() * self.config.retry_after_multiplier;
 let ceiling = policy.max_delay().as_secs_f64();
 return Duration::from_secs_f64(scaled.min(ceiling));
 }

 if policy.max_attempts() > 1 {
 return jittered_relative(policy.base_delay(attempt_index), policy.jitter_fraction());
 }

 // Reaching here means a kind with no multi-attempt policy slipped
 // past the retryable check (should not happen given the table is
 // total over `FailureKind::ALL` and only the six retryable kinds get
 // `max_attempts > 1`), so fall back to a generic schedule rather
 // than panicking.
 jittered_absolute(self.config.unknown_kind_base_delay, self.config.unknown_kind_jitter)
.min(self.config.unknown_kind_max_delay)
 }

 #[allow(clippy::too_many_arguments)]
 fn dead_letter(
 &self,
 operation_type: &str,
 provider: &str,
 model: &str,
 plan_id: Option<String>,
 request_data: Vec<u8>,
 kind: FailureKind,
 message: &str,
 http_code: Option<u16>,
 total_attempts: u32,
 ) {
 self.dlq.add(
 operation_type,
 provider,
 model,
 plan_id,
 request_data,
 kind,
 message,
 http_code,
 total_attempts,
 );
 }

 #[allow(clippy::too_many_arguments)]
 fn emit_attempt(
 &self,
 pattern_name: &str,
 attempt_number: u32,
 classification: Classification,
 delay_ms: u64,
 will_retry: bool,
 provider: &str,
 model: &str,
 http_code: Option<u16>,
 error_message: &str,
 ) {
 self.config.event_listeners.emit(&RetryEvent::Attempt {
 timestamp: Instant::now(),
 pattern_name: pattern_name.to_string(),
 attempt_number,
 kind: classification.kind,
 delay_ms,
 will_retry,
 retryable: classification.retryable,
 provider: provider.to_string(),
 model: model.to_string(),
 http_code,
 error_message: error_message.to_string(),
 });
 }

 fn emit_exhaust(
 &self,
 pattern_name: &str,
 total_attempts: u32,
 total_duration_ms: u64,
 kinds_seen: &[FailureKind],
 final_error: &str,
 resolution: &str,
 ) {
 #[cfg(feature = "tracing")]
 tracing::warn!(
 pattern = %pattern_name,
 total_attempts,
 total_duration_ms,
 resolution,
 final_error,
 "retry budget exhausted"
 );
 #[cfg(feature = "metrics")]
 metrics::counter!(
 "retry_exhausted_total",
 "operation" => pattern_name.to_string(),
 "resolution" => resolution.to_string(),
 )
.increment(1);

 self.config.event_listeners.emit(&RetryEvent::Exhaust {
 timestamp: Instant::now(),
 pattern_name: pattern_name.to_string(),
 total_attempts,
 total_duration_ms,
 kinds_seen: kinds_seen.to_vec(),
 final_error: final_error.to_string(),
 resolution: resolution.to_string(),
 });
 }

 /// Emitted when the driver itself observes an open circuit (distinct
 /// from [`resilience_circuitbreaker`]'s own `StateTransition` event,
 /// which the caller can subscribe to directly on the breaker registry).
 fn emit_circuit_event(&self, pattern_name: &str, provider: &str) {
 #[cfg(feature = "tracing")]
 tracing::info!(pattern = %pattern_name, provider, "circuit open, diverting to fallback");
 #[cfg(feature = "metrics")]
 metrics::counter!(
 "retry_circuit_diversions_total",
 "operation" => pattern_name.to_string(),
 "provider" => provider.to_string(),
 )
.increment(1);

 self.config.event_listeners.emit(&RetryEvent::CircuitEvent {
 timestamp: Instant::now(),
 pattern_name: pattern_name.to_string(),
 old_state: "closed",
 new_state: "open",
 reason: format!("{provider} circuit open, switching to fallback"),
 });
 }
}

fn jittered_relative(base: Duration, jitter_fraction: f64) -> Duration {
 if jitter_fraction <= 0.0 {
 return base;
 }
 let factor = rand::rng().random_range(-jitter_fraction..=jitter_fraction);
 Duration::from_secs_f64((base.as_secs_f64() * (1.0 + factor)).max(0.0))
}

fn jittered_absolute(base: Duration, jitter: Duration) -> Duration {
 if jitter.is_zero() {
 return base;
 }
 let jitter_ms = jitter.as_millis() as i64;
 let offset_ms = rand::rng().random_range(-jitter_ms..=jitter_ms);
 let total_ms = (base.as_millis() as i64 + offset_ms).max(0);
 Duration::from_millis(total_ms as u64)
}
