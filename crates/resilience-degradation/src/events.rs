use crate::level::DegradationLevel;
use resilience_core::ResilienceEvent;
use std::time::Instant;

#[derive(Debug, Clone)]
pub enum DegradationEvent {
 Triggered {
 timestamp: Instant,
 id: u64,
 level: DegradationLevel,
 reason: String,
 },
 Recovered {
 timestamp: Instant,
 id: u64,
 },
}

impl ResilienceEvent for DegradationEvent {
 fn event_type(&self) -> &'static str {
 match self {
 DegradationEvent::Triggered { .. } => "triggered",
 DegradationEvent::Recovered { .. } => "recovered",
 }
 }

 fn timestamp(&self) -> Instant {
 match self {
 DegradationEvent::Triggered { timestamp, .. }
 | DegradationEvent::Recovered { timestamp, .. } => *timestamp,
 }
 }

 fn pattern_name(&self) -> &str {
 "degradation"
 }
}
