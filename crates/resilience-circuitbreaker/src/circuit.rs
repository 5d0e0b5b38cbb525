use crate::config::CircuitBreakerConfig;
use crate::events::CircuitBreakerEvent;
use resilience_core::FailureKind;
#[cfg(feature = "metrics")]
use metrics::{counter, gauge};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// State of a single provider's breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
 Closed,
 Open,
 HalfOpen,
}

/// Per-provider call accounting and state machine.
pub(crate) struct Circuit {
 state: CircuitState,
 opened_at: Option<Instant>,
 last_transition: Instant,
 consecutive_failures: u32,
 recent_failures: VecDeque<Instant>,
 half_open_successes: u32,
 half_open_requests: u32,
}

impl Circuit {
 pub(crate) fn new() -> Self {
 Self {
 state: CircuitState::Closed,
 opened_at: None,
 last_transition: Instant::now(),
 consecutive_failures: 0,
 recent_failures: VecDeque::new(),
 half_open_successes: 0,
 half_open_requests: 0,
 }
 }

 pub(crate) fn state(&self) -> CircuitState {
 self.state
 }

 /// Drops entries older than `FailureWindowDuration`.
 fn prune_window(&mut self, window: Duration) {
 let now = Instant::now();
 while let Some(&oldest) = self.recent_failures.front() {
 if now.duration_since(oldest) > window {
 self.recent_failures.pop_front();
 } else {
 break;
 }
 }
 }

 /// The gate contract. A half-open breaker admits only
 /// `config.half_open_max_requests` probes before it starts rejecting
 /// again; admission is what `is_open` itself grants, so every call that
 /// returns `false` while half-open counts against the quota.
 pub(crate) fn is_open(&mut self, provider: &str, config: &CircuitBreakerConfig) -> bool {
 if self.state == CircuitState::Open {
 if self
.opened_at
.map(|t| t.elapsed() > config.open_duration)
.unwrap_or(false)
 {
 self.transition_to(provider, CircuitState::HalfOpen, config);
 } else {
 return true;
 }
 }

 match self.state {
 CircuitState::Closed => false,
 CircuitState::Open => unreachable!("handled above"),
 CircuitState::HalfOpen => {
 if self.half_open_requests >= config.half_open_max_requests {
 true
 } else {
 self.half_open_requests += 1;
 false
 }
 }
 }
 }

 pub(crate) fn record_success(&mut self, provider: &str, config: &CircuitBreakerConfig) {
 self.consecutive_failures = 0;

 config
.event_listeners
.emit(&CircuitBreakerEvent::SuccessRecorded {
 provider: provider.to_string(),
 timestamp: Instant::now(),
 state: self.state,
 });
 #[cfg(feature = "metrics")]
 counter!("circuitbreaker_calls_total", "provider" => provider.to_string(), "outcome" => "success")
.increment(1);

 if self.state == CircuitState::HalfOpen {
 self.half_open_successes += 1;
 if self.half_open_successes >= config.success_threshold {
 self.transition_to(provider, CircuitState::Closed, config);
 }
 }
 }

 /// Returns `false` if the failure kind is excluded and the record was a
 /// no-op.
 pub(crate) fn record_failure(
 &mut self,
 provider: &str,
 kind: FailureKind,
 config: &CircuitBreakerConfig,
 ) -> bool {
 if config.is_excluded(kind) {
 config
.event_listeners
.emit(&CircuitBreakerEvent::FailureExcluded {
 provider: provider.to_string(),
 timestamp: Instant::now(),
 kind,
 });
 return false;
 }

 self.prune_window(config.failure_window_duration);

 if self.state == CircuitState::HalfOpen {
 self.transition_to(provider, CircuitState::Open, config);
 config
.event_listeners
.emit(&CircuitBreakerEvent::FailureRecorded {
 provider: provider.to_string(),
 timestamp: Instant::now(),
 state: self.state,
 });
 return true;
 }

 self.consecutive_failures += 1;
 self.recent_failures.push_back(Instant::now());

 config
.event_listeners
.emit(&CircuitBreakerEvent::FailureRecorded {
 provider: provider.to_string(),
 timestamp: Instant::now(),
 state: self.state,
 });
 #[cfg(feature = "metrics")]
 counter!("circuitbreaker_calls_total", "provider" => provider.to_string(), "outcome" => "failure")
.increment(1);

 if self.consecutive_failures >= config.failure_threshold
 || self.recent_failures.len() >= config.failure_window_max
 {
 self.transition_to(provider, CircuitState::Open, config);
 }

 true
 }

 fn transition_to(&mut self, provider: &str, to: CircuitState, config: &CircuitBreakerConfig) {
 if self.state == to {
 return;
 }
 let from = self.state;

 config
.event_listeners
.emit(&CircuitBreakerEvent::StateTransition {
 provider: provider.to_string(),
 timestamp: Instant::now(),
 from_state: from,
 to_state: to,
 });

 #[cfg(feature = "tracing")]
 tracing::info!(provider, from = ?from, to = ?to, "circuit breaker state transition");

 #[cfg(feature = "metrics")]
 gauge!("circuitbreaker_state", "provider" => provider.to_string()).set(match to {
 CircuitState::Closed => 0.0,
 CircuitState::Open => 1.0,
 CircuitState::HalfOpen => 2.0,
 });

 self.state = to;
 self.last_transition = Instant::now();
 match to {
 CircuitState::Open => {
 self.opened_at = Some(Instant::now());
 }
 CircuitState::Closed => {
 self.opened_at = None;
 self.consecutive_failures = 0;
 self.recent_failures.clear();
 self.half_open_successes = 0;
 self.half_open_requests = 0;
 }
 CircuitState::HalfOpen => {
 self.half_open_successes = 0;
 self.half_open_requests = 0;
 }
 }
 }

 pub(crate) fn snapshot(&self) -> CircuitSnapshot {
 CircuitSnapshot {
 state: self.state,
 consecutive_failures: self.consecutive_failures,
 recent_failure_count: self.recent_failures.len(),
 half_open_requests: self.half_open_requests,
 time_since_transition: self.last_transition.elapsed(),
 }
 }
}

/// Point-in-time view of a provider's breaker, for observability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircuitSnapshot {
 pub state: CircuitState,
 pub consecutive_failures: u32,
 pub recent_failure_count: usize,
 pub half_open_requests: u32,
 pub time_since_transition: Duration,
}
