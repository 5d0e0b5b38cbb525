use crate::events::CircuitBreakerEvent;
use resilience_core::{EventListeners, FailureKind, FnListener};
use std::collections::HashSet;
use std::time::Duration;

use crate::CircuitState;

/// Tuning knobs for a single provider's breaker.
/// Shared by every provider tracked in a [`crate::CircuitBreakerRegistry`];
/// there are no per-provider overrides, so one config applies to the whole
/// registry.
pub struct CircuitBreakerConfig {
 pub(crate) failure_threshold: u32,
 pub(crate) failure_window_max: usize,
 pub(crate) failure_window_duration: Duration,
 pub(crate) open_duration: Duration,
 pub(crate) success_threshold: u32,
 pub(crate) half_open_max_requests: u32,
 pub(crate) excluded_kinds: HashSet<FailureKind>,
 pub(crate) event_listeners: EventListeners<CircuitBreakerEvent>,
}

impl CircuitBreakerConfig {
 pub fn builder() -> CircuitBreakerConfigBuilder {
 CircuitBreakerConfigBuilder::new()
 }

 pub fn is_excluded(&self, kind: FailureKind) -> bool {
 self.excluded_kinds.contains(&kind)
 }
}

/// Default exclusion list: caller-side problems that say nothing about
/// provider instability.
fn default_excluded_kinds() -> HashSet<FailureKind> {
 [
 FailureKind::ContextTooLong,
 FailureKind::InvalidRequest,
 FailureKind::ContentPolicy,
 FailureKind::AuthInvalid,
 FailureKind::PermissionDenied,
 ]
.into_iter()
.collect()
}

pub struct CircuitBreakerConfigBuilder {
 failure_threshold: u32,
 failure_window_max: usize,
 failure_window_duration: Duration,
 open_duration: Duration,
 success_threshold: u32,
 half_open_max_requests: u32,
 excluded_kinds: HashSet<FailureKind>,
 event_listeners: EventListeners<CircuitBreakerEvent>,
}

impl CircuitBreakerConfigBuilder {
 pub fn new() -> Self {
 Self {
 failure_threshold: 5,
 failure_window_max: 10,
 failure_window_duration: Duration::from_secs(60),
 open_duration: Duration::from_secs(30),
 success_threshold: 2,
 half_open_max_requests: 1,
 excluded_kinds: default_excluded_kinds(),
 event_listeners: EventListeners::new(),
 }
 }

 /// Consecutive failures required to open the circuit. Default: 5.
 pub fn failure_threshold(mut self, n: u32) -> Self {
 self.failure_threshold = n;
 self
 }

 /// Failures within the window required to open the circuit, independent
 /// of consecutiveness. Default: 10.
 pub fn failure_window_max(mut self, n: usize) -> Self {
 self.failure_window_max = n;
 self
 }

 /// How long a failure stays counted in the window. Default: 60s.
 pub fn failure_window_duration(mut self, d: Duration) -> Self {
 self.failure_window_duration = d;
 self
 }

 /// How long the circuit stays open before probing half-open. Default: 30s.
 pub fn open_duration(mut self, d: Duration) -> Self {
 self.open_duration = d;
 self
 }

 /// Half-open successes required to close the circuit. Default: 2.
 pub fn success_threshold(mut self, n: u32) -> Self {
 self.success_threshold = n;
 self
 }

 /// Concurrent probes admitted while half-open before `is_open` starts
 /// rejecting again. Default: 1.
 pub fn half_open_max_requests(mut self, n: u32) -> Self {
 self.half_open_max_requests = n;
 self
 }

 /// Replaces the default failure-kind exclusion list.
 pub fn excluded_kinds(mut self, kinds: impl IntoIterator<Item = FailureKind>) -> Self {
 self.excluded_kinds = kinds.into_iter().collect();
 self
 }

 pub fn on_state_transition<F>(mut self, f: F) -> Self
 where
 F: Fn(&str, CircuitState, CircuitState) + Send + Sync + 'static,
 {
 self.event_listeners
.add(FnListener::new(move |event: &CircuitBreakerEvent| {
 if let CircuitBreakerEvent::StateTransition {
 provider,
 from_state,
 to_state,
 ..
 } = event
 {
 f(provider, *from_state, *to_state);
 }
 }));
 self
 }

 pub fn on_call_rejected<F>(mut self, f: F) -> Self
 where
 F: Fn(&str) + Send + Sync + 'static,
 {
 self.event_listeners
.add(FnListener::new(move |event: &CircuitBreakerEvent| {
 if let CircuitBreakerEvent::CallRejected { provider, .. } = event {
 f(provider);
 }
 }));
 self
 }

 pub fn build(self) -> CircuitBreakerConfig {
 CircuitBreakerConfig {
 failure_threshold: self.failure_threshold,
 failure_window_max: self.failure_window_max,
 failure_window_duration: self.failure_window_duration,
 open_duration: self.open_duration,
 success_threshold: self.success_threshold,
 half_open_max_requests: self.half_open_max_requests,
 excluded_kinds: self.excluded_kinds,
 event_listeners: self.event_listeners,
 }
 }
}

impl Default for CircuitBreakerConfigBuilder {
 fn default() -> Self {
 Self::new()
 }
}
