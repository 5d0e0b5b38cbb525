//! Events emitted by the retry driver.

use resilience_core::{FailureKind, ResilienceEvent};
use std::time::Instant;

#[derive(Debug, Clone)]
pub enum RetryEvent {
 /// An attempt was made (or is about to back off before another one).
 Attempt {
 timestamp: Instant,
 pattern_name: String,
 attempt_number: u32,
 kind: FailureKind,
 delay_ms: u64,
 will_retry: bool,
 retryable: bool,
 provider: String,
 model: String,
 http_code: Option<u16>,
 error_message: String,
 },
 /// The retry budget for this call was exhausted.
 Exhaust {
 timestamp: Instant,
 pattern_name: String,
 total_attempts: u32,
 total_duration_ms: u64,
 kinds_seen: Vec<FailureKind>,
 final_error: String,
 resolution: String,
 },
 /// A circuit transitioned state as observed by the driver.
 CircuitEvent {
 timestamp: Instant,
 pattern_name: String,
 old_state: &'static str,
 new_state: &'static str,
 reason: String,
 },
 /// The driver switched provider or model.
 FallbackEvent {
 timestamp: Instant,
 pattern_name: String,
 from_provider: String,
 to_provider: String,
 from_model: String,
 to_model: String,
 fallback_type: &'static str,
 reason: String,
 },
}

impl ResilienceEvent for RetryEvent {
 fn event_type(&self) -> &'static str {
 match self {
 RetryEvent::Attempt { .. } => "attempt",
 RetryEvent::Exhaust { .. } => "exhaust",
 RetryEvent::CircuitEvent { .. } => "circuit_event",
 RetryEvent::FallbackEvent { .. } => "fallback_event",
 }
 }

 fn timestamp(&self) -> Instant {
 match self {
 RetryEvent::Attempt { timestamp, .. }
 | RetryEvent::Exhaust { timestamp, .. }
 | RetryEvent::CircuitEvent { timestamp, .. }
 | RetryEvent::FallbackEvent { timestamp, .. } => *timestamp,
 }
 }

 fn pattern_name(&self) -> &str {
 match self {
 RetryEvent::Attempt { pattern_name, .. }
 | RetryEvent::Exhaust { pattern_name, .. }
 | RetryEvent::CircuitEvent { pattern_name, .. }
 | RetryEvent::FallbackEvent { pattern_name, .. } => pattern_name,
 }
 }
}
