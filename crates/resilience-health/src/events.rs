use crate::status::HealthStatus;
use resilience_core::ResilienceEvent;
use std::time::Instant;

/// Events emitted by the health registry.
#[derive(Debug, Clone)]
pub enum HealthEvent {
 /// A provider's status band changed.
 StatusChanged {
 provider: String,
 timestamp: Instant,
 from: HealthStatus,
 to: HealthStatus,
 score: u32,
 },
}

impl ResilienceEvent for HealthEvent {
 fn event_type(&self) -> &'static str {
 "status_changed"
 }

 fn timestamp(&self) -> Instant {
 match self {
 HealthEvent::StatusChanged { timestamp, .. } => *timestamp,
 }
 }

 fn pattern_name(&self) -> &str {
 match self {
 HealthEvent::StatusChanged { provider, .. } => provider,
 }
 }
}
