//! Per-session accumulator of partial streamed content and checkpoints.
//! Tracks in-flight streaming calls to external model providers so that
//! partial output survives a mid-stream failure for inspection, even though
//! it is never replayed upstream.

mod config;
mod events;
mod hash;
mod session;

pub use config::{StreamConfig, StreamConfigBuilder};
pub use events::StreamEvent;
pub use hash::checkpoint_hash;
pub use session::{Checkpoint, StreamSession, StreamStatus};

use parking_lot::Mutex;
use resilience_core::{CancellationToken, EventListeners};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

struct State {
 sessions: HashMap<String, StreamSession>,
 order: Vec<String>,
}

/// Manages the lifecycle of streaming sessions.
pub struct StreamRecoveryManager {
 config: StreamConfig,
 state: Arc<Mutex<State>>,
 event_listeners: Arc<EventListeners<StreamEvent>>,
 stop: CancellationToken,
}

impl Clone for StreamRecoveryManager {
 fn clone(&self) -> Self {
 Self {
 config: self.config.clone(),
 state: Arc::clone(&self.state),
 event_listeners: Arc::clone(&self.event_listeners),
 stop: self.stop.clone(),
 }
 }
}

impl StreamRecoveryManager {
 pub fn new(config: StreamConfig) -> Self {
 Self::with_listeners(config, EventListeners::new())
 }

 pub fn with_listeners(config: StreamConfig, event_listeners: EventListeners<StreamEvent>) -> Self {
 Self {
 config,
 state: Arc::new(Mutex::new(State {
 sessions: HashMap::new(),
 order: Vec::new(),
 })),
 event_listeners: Arc::new(event_listeners),
 stop: CancellationToken::new(),
 }
 }

 /// Spawns the minute-interval timeout sweep. Idempotent shutdown via [`Self::stop`].
 pub fn spawn_timeout_sweep(&self) -> tokio::task::JoinHandle<()> {
 let manager = self.clone();
 tokio::spawn(async move {
 let mut ticker = tokio::time::interval(std::time::Duration::from_secs(60));
 loop {
 let tick = ticker.tick();
 tokio::select! {
 biased;
 _ = manager.stop.cancelled() => break,
 _ = tick => manager.sweep_timed_out_sessions(),
 }
 }
 })
 }

 pub fn stop(&self) {
 self.stop.cancel();
 }

 fn sweep_timed_out_sessions(&self) {
 let now = Instant::now();
 let timeout = self.config.session_timeout;
 let mut timed_out = Vec::new();
 {
 let mut state = self.state.lock();
 for session in state.sessions.values_mut() {
 if session.is_active() && now.saturating_duration_since(session.last_chunk_at) >= timeout
 {
 session.status = StreamStatus::TimedOut;
 session.ended_at = Some(now);
 session.end_reason = Some("timeout".to_string());
 timed_out.push(session.clone());
 }
 }
 }
 for session in timed_out {
 self.event_listeners.emit(&StreamEvent::SessionEnded {
 timestamp: now,
 session_id: session.id.clone(),
 status: session.status,
 reason: session.end_reason.clone(),
 });
 }
 }

 /// Starts tracking a new session, evicting the oldest inactive session if
 /// the manager is at capacity.
 pub fn start(
 &self,
 id: impl Into<String>,
 provider: impl Into<String>,
 model: impl Into<String>,
 ) -> StreamSession {
 let id = id.into();
 let session = StreamSession::new(id.clone(), provider.into(), model.into());

 let evicted = {
 let mut state = self.state.lock();
 let evicted = if state.sessions.len() >= self.config.capacity {
 self.evict_oldest_inactive(&mut state)
 } else {
 None
 };
 state.order.push(id.clone());
 state.sessions.insert(id, session.clone());
 evicted
 };

 if let Some(evicted_id) = evicted {
 self.event_listeners.emit(&StreamEvent::SessionEvicted {
 timestamp: Instant::now(),
 session_id: evicted_id,
 });
 }

 session
 }

 fn evict_oldest_inactive(&self, state: &mut State) -> Option<String> {
 let victim = state
.order
.iter()
.find(|id| {
 state
.sessions
.get(*id)
.map(|s| !s.is_active())
.unwrap_or(true)
 })?
.clone();
 state.sessions.remove(&victim);
 state.order.retain(|id| *id != victim);
 Some(victim)
 }

 /// Appends a chunk to a session's content buffer, checkpointing when
 /// enough new tokens have arrived.
 pub fn record_chunk(&self, session_id: &str, content: &str, tokens: u32) -> Option<()> {
 let mut state = self.state.lock();
 let session = state.sessions.get_mut(session_id)?;
 session.content_buffer.push_str(content);
 session.tokens_received += tokens;
 session.chunks_received += 1;
 session.last_chunk_at = Instant::now();
 session.last_chunk_seq += 1;
 if session.should_checkpoint(self.config.checkpoint_interval_tokens) {
 session.push_checkpoint(self.config.max_checkpoints);
 }
 Some(())
 }

 /// Terminates a session, ensuring a final checkpoint exists when content
 /// was accumulated, and removes it from the active map.
 pub fn end(
 &self,
 session_id: &str,
 status: StreamStatus,
 reason: Option<String>,
 ) -> Option<StreamSession> {
 let now = Instant::now();
 let session = {
 let mut state = self.state.lock();
 let mut session = state.sessions.remove(session_id)?;
 state.order.retain(|id| id != session_id);
 session.status = status;
 session.ended_at = Some(now);
 session.end_reason = reason.clone();
 if !session.content_buffer.is_empty()
 && session
.checkpoints
.last()
.map(|c| c.token_count != session.tokens_received)
.unwrap_or(true)
 {
 session.push_checkpoint(self.config.max_checkpoints);
 }
 session
 };

 #[cfg(feature = "tracing")]
 tracing::debug!(session_id, status = ?status, "stream session ended");
 #[cfg(feature = "metrics")]
 metrics::counter!("stream_sessions_ended_total", "status" => format!("{status:?}")).increment(1);

 self.event_listeners.emit(&StreamEvent::SessionEnded {
 timestamp: now,
 session_id: session_id.to_string(),
 status,
 reason,
 });

 Some(session)
 }

 pub fn get(&self, session_id: &str) -> Option<StreamSession> {
 self.state.lock().sessions.get(session_id).cloned()
 }

 pub fn active_count(&self) -> usize {
 self.state.lock().sessions.len()
 }
}

#[cfg(test)]
mod tests {
 use super::*;

 fn manager(capacity: usize) -> StreamRecoveryManager {
 StreamRecoveryManager::new(
 StreamConfig::builder()
.capacity(capacity)
.checkpoint_interval_tokens(10)
.max_checkpoints(3)
.build(),
 )
 }

 #[test]
 fn start_creates_active_session() {
 let manager = manager(10);
 let session = manager.start("s1", "openai", "gpt-4");
 assert_eq!(session.status, StreamStatus::Active);
 assert_eq!(manager.active_count(), 1);
 }

 #[test]
 fn record_chunk_accumulates_and_checkpoints() {
 let manager = manager(10);
 manager.start("s1", "openai", "gpt-4");
 manager.record_chunk("s1", "hello ", 5).unwrap();
 manager.record_chunk("s1", "world", 6).unwrap();

 let session = manager.get("s1").unwrap();
 assert_eq!(session.content_buffer, "hello world");
 assert_eq!(session.tokens_received, 11);
 assert_eq!(session.chunks_received, 2);
 assert_eq!(session.checkpoints.len(), 1);
 }

 #[test]
 fn checkpoints_truncate_to_max() {
 let manager = manager(10);
 manager.start("s1", "openai", "gpt-4");
 for _ in 0..5 {
 manager.record_chunk("s1", "x", 10).unwrap();
 }
 let session = manager.get("s1").unwrap();
 assert!(session.checkpoints.len() <= 3);
 // monotonically non-decreasing token_count across retained checkpoints
 let counts: Vec<u32> = session.checkpoints.iter().map(|c| c.token_count).collect();
 assert!(counts.windows(2).all(|w| w[0] <= w[1]));
 }

 #[test]
 fn end_adds_final_checkpoint_and_removes_from_active() {
 let manager = manager(10);
 manager.start("s1", "openai", "gpt-4");
 manager.record_chunk("s1", "partial", 3).unwrap();

 let ended = manager.end("s1", StreamStatus::Completed, Some("done".into())).unwrap();
 assert_eq!(ended.status, StreamStatus::Completed);
 assert!(!ended.checkpoints.is_empty());
 assert_eq!(manager.active_count(), 0);
 assert!(manager.get("s1").is_none());
 }

 #[test]
 fn end_on_empty_content_skips_checkpoint() {
 let manager = manager(10);
 manager.start("s1", "openai", "gpt-4");
 let ended = manager.end("s1", StreamStatus::Failed, None).unwrap();
 assert!(ended.checkpoints.is_empty());
 }

 #[test]
 fn capacity_evicts_oldest_inactive_session() {
 let manager = manager(2);
 let first = manager.start("s1", "openai", "gpt-4");
 manager.end(&first.id, StreamStatus::Completed, None);
 manager.start("s2", "openai", "gpt-4");
 manager.start("s3", "openai", "gpt-4");
 assert_eq!(manager.active_count(), 2);
 }

 #[tokio::test(start_paused = true)]
 async fn timeout_sweep_marks_stale_sessions() {
 let manager = StreamRecoveryManager::new(
 StreamConfig::builder()
.session_timeout(std::time::Duration::from_secs(1))
.build(),
 );
 manager.start("s1", "openai", "gpt-4");
 tokio::time::advance(std::time::Duration::from_secs(2)).await;
 manager.sweep_timed_out_sessions();
 let session = manager.get("s1").unwrap();
 assert_eq!(session.status, StreamStatus::TimedOut);
 assert_eq!(session.end_reason.as_deref(), Some("timeout"));
 }
}
