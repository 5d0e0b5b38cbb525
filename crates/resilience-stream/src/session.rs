use std::time::Instant;

/// Terminal/active state of a streaming session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
 Active,
 Completed,
 Interrupted,
 Failed,
 TimedOut,
}

/// A recorded snapshot of a session's content state at a token boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
 pub seq: u64,
 pub content_length: usize,
 pub token_count: u32,
 pub content_hash: String,
 pub timestamp: Instant,
 pub chunk_seq: u64,
}

/// One in-flight or completed streaming session.
#[derive(Debug, Clone)]
pub struct StreamSession {
 pub id: String,
 pub started_at: Instant,
 pub provider: String,
 pub model: String,
 pub content_buffer: String,
 pub tokens_received: u32,
 pub chunks_received: u64,
 pub last_chunk_at: Instant,
 pub last_chunk_seq: u64,
 pub checkpoints: Vec<Checkpoint>,
 pub status: StreamStatus,
 pub ended_at: Option<Instant>,
 pub end_reason: Option<String>,
 pub final_error: Option<String>,
 pub idempotency_key: Option<String>,
}

impl StreamSession {
 pub(crate) fn new(id: String, provider: String, model: String) -> Self {
 let now = Instant::now();
 Self {
 id,
 started_at: now,
 provider,
 model,
 content_buffer: String::new(),
 tokens_received: 0,
 chunks_received: 0,
 last_chunk_at: now,
 last_chunk_seq: 0,
 checkpoints: Vec::new(),
 status: StreamStatus::Active,
 ended_at: None,
 end_reason: None,
 final_error: None,
 idempotency_key: None,
 }
 }

 pub(crate) fn is_active(&self) -> bool {
 self.status == StreamStatus::Active
 }

 fn last_checkpoint_tokens(&self) -> u32 {
 self.checkpoints.last().map(|c| c.token_count).unwrap_or(0)
 }

 pub(crate) fn push_checkpoint(&mut self, max_checkpoints: usize) {
 let seq = self.checkpoints.last().map(|c| c.seq + 1).unwrap_or(0);
 self.checkpoints.push(Checkpoint {
 seq,
 content_length: self.content_buffer.len(),
 token_count: self.tokens_received,
 content_hash: crate::hash::checkpoint_hash(&self.content_buffer),
 timestamp: Instant::now(),
 chunk_seq: self.last_chunk_seq,
 });
 while self.checkpoints.len() > max_checkpoints {
 self.checkpoints.remove(0);
 }
 }

 pub(crate) fn should_checkpoint(&self, checkpoint_interval: u32) -> bool {
 self.tokens_received.saturating_sub(self.last_checkpoint_tokens()) >= checkpoint_interval
 }
}
