//! Events emitted by the circuit breaker registry.

use crate::CircuitState;
use resilience_core::ResilienceEvent;
use std::time::Instant;

/// Events describing circuit breaker activity, scoped per provider.
#[derive(Debug, Clone)]
pub enum CircuitBreakerEvent {
 /// The breaker for `provider` transitioned states.
 StateTransition {
 provider: String,
 timestamp: Instant,
 from_state: CircuitState,
 to_state: CircuitState,
 },
 /// A call was permitted through the breaker.
 CallPermitted {
 provider: String,
 timestamp: Instant,
 state: CircuitState,
 },
 /// A call was rejected because the breaker is open.
 CallRejected {
 provider: String,
 timestamp: Instant,
 },
 /// A success was recorded against the breaker.
 SuccessRecorded {
 provider: String,
 timestamp: Instant,
 state: CircuitState,
 },
 /// A failure was recorded against the breaker.
 FailureRecorded {
 provider: String,
 timestamp: Instant,
 state: CircuitState,
 },
 /// A failure was observed but excluded from the breaker's accounting
 /// because its kind is on the exclusion list.
 FailureExcluded {
 provider: String,
 timestamp: Instant,
 kind: resilience_core::FailureKind,
 },
}

impl ResilienceEvent for CircuitBreakerEvent {
 fn event_type(&self) -> &'static str {
 match self {
 CircuitBreakerEvent::StateTransition { .. } => "state_transition",
 CircuitBreakerEvent::CallPermitted { .. } => "call_permitted",
 CircuitBreakerEvent::CallRejected { .. } => "call_rejected",
 CircuitBreakerEvent::SuccessRecorded { .. } => "success_recorded",
 CircuitBreakerEvent::FailureRecorded { .. } => "failure_recorded",
 CircuitBreakerEvent::FailureExcluded { .. } => "failure_excluded",
 }
 }

 fn timestamp(&self) -> Instant {
 match self {
 CircuitBreakerEvent::StateTransition { timestamp, .. }
 | CircuitBreakerEvent::CallPermitted { timestamp, .. }
 | CircuitBreakerEvent::CallRejected { timestamp, .. }
 | CircuitBreakerEvent::SuccessRecorded { timestamp, .. }
 | CircuitBreakerEvent::FailureRecorded { timestamp, .. }
 | CircuitBreakerEvent::FailureExcluded { timestamp, .. } => *timestamp,
 }
 }

 fn pattern_name(&self) -> &str {
 match self {
 CircuitBreakerEvent::StateTransition { provider, .. }
 | CircuitBreakerEvent::CallPermitted { provider, .. }
 | CircuitBreakerEvent::CallRejected { provider, .. }
 | CircuitBreakerEvent::SuccessRecorded { provider, .. }
 | CircuitBreakerEvent::FailureRecorded { provider, .. }
 | CircuitBreakerEvent::FailureExcluded { provider, .. } => provider,
 }
 }
}
