use crate::session::StreamStatus;
use resilience_core::ResilienceEvent;
use std::time::Instant;

#[derive(Debug, Clone)]
pub enum StreamEvent {
 SessionEnded {
 timestamp: Instant,
 session_id: String,
 status: StreamStatus,
 reason: Option<String>,
 },
 SessionEvicted {
 timestamp: Instant,
 session_id: String,
 },
}

impl ResilienceEvent for StreamEvent {
 fn event_type(&self) -> &'static str {
 match self {
 StreamEvent::SessionEnded { .. } => "session_ended",
 StreamEvent::SessionEvicted { .. } => "session_evicted",
 }
 }

 fn timestamp(&self) -> Instant {
 match self {
 StreamEvent::SessionEnded { timestamp, .. }
 | StreamEvent::SessionEvicted { timestamp, .. } => *timestamp,
 }
 }

 fn pattern_name(&self) -> &str {
 match self {
 StreamEvent::SessionEnded { session_id, .. }
 | StreamEvent::SessionEvicted { session_id, .. } => session_id,
 }
 }
}
