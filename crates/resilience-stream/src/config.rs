use std::time::Duration;

/// Tuning knobs for the stream recovery buffer.
#[derive(Debug, Clone)]
pub struct StreamConfig {
 pub(crate) capacity: usize,
 pub(crate) checkpoint_interval_tokens: u32,
 pub(crate) max_checkpoints: usize,
 pub(crate) session_timeout: Duration,
}

impl StreamConfig {
 pub fn builder() -> StreamConfigBuilder {
 StreamConfigBuilder::new()
 }
}

impl Default for StreamConfig {
 fn default() -> Self {
 StreamConfigBuilder::new().build()
 }
}

pub struct StreamConfigBuilder {
 capacity: usize,
 checkpoint_interval_tokens: u32,
 max_checkpoints: usize,
 session_timeout: Duration,
}

impl StreamConfigBuilder {
 pub fn new() -> Self {
 Self {
 capacity: 1_000,
 checkpoint_interval_tokens: 100,
 max_checkpoints: 20,
 session_timeout: Duration::from_secs(120),
 }
 }

 pub fn capacity(mut self, n: usize) -> Self {
 self.capacity = n;
 self
 }

 pub fn checkpoint_interval_tokens(mut self, n: u32) -> Self {
 self.checkpoint_interval_tokens = n;
 self
 }

 pub fn max_checkpoints(mut self, n: usize) -> Self {
 self.max_checkpoints = n;
 self
 }

 pub fn session_timeout(mut self, d: Duration) -> Self {
 self.session_timeout = d;
 self
 }

 pub fn build(self) -> StreamConfig {
 StreamConfig {
 capacity: self.capacity,
 checkpoint_interval_tokens: self.checkpoint_interval_tokens,
 max_checkpoints: self.max_checkpoints,
 session_timeout: self.session_timeout,
 }
 }
}

impl Default for StreamConfigBuilder {
 fn default() -> Self {
 Self::new()
 }
}
