//! Translates the retry driver's stream-message sequence into phase/step
//! progress for a UI collaborator.

mod config;
mod message;
mod step;

pub use config::{ProgressConfig, ProgressConfigBuilder};
pub use message::StreamMessage;
pub use step::{Confidence, Phase, ProgressStep, StepStatus};

use parking_lot::RwLock;
use resilience_core::CancellationToken;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// A read-only view of adapter state, safe to build under a shared lock.
#[derive(Debug, Clone)]
pub struct ProgressSnapshot {
 pub steps: Vec<ProgressStep>,
 pub active_phase: Option<Phase>,
 pub finished: bool,
 pub error: Option<String>,
}

struct Inner {
 steps: Vec<ProgressStep>,
 /// Index into `steps` for each build path seen so far.
 build_index: HashMap<String, usize>,
 model_index: Option<usize>,
 context_index: Option<usize>,
 active_phase: Option<Phase>,
 finished: bool,
 error: Option<String>,
 shutdown: bool,
 last_message_at: Instant,
}

impl Inner {
 fn new() -> Self {
 let connect = ProgressStep::seeded(Phase::Connect, "connect");
 Self {
 steps: vec![connect],
 build_index: HashMap::new(),
 model_index: None,
 context_index: None,
 active_phase: Some(Phase::Connect),
 finished: false,
 error: None,
 shutdown: false,
 last_message_at: Instant::now(),
 }
 }

 fn connect_index(&self) -> Option<usize> {
 self.steps.iter().position(|s| s.phase == Phase::Connect)
 }

 fn complete_connect(&mut self) {
 if let Some(idx) = self.connect_index() {
 let step = &mut self.steps[idx];
 if step.status != StepStatus::Completed {
 step.running("connected");
 step.complete("connected", Some(Confidence::Guaranteed));
 }
 }
 }

 fn close_context(&mut self) {
 if let Some(idx) = self.context_index {
 let step = &mut self.steps[idx];
 if step.is_open() {
 step.complete(step.detail.clone(), step.confidence);
 }
 }
 }

 fn open_context(&mut self, files: &[String]) {
 self.complete_connect();
 let mut step = ProgressStep::seeded(Phase::Context, "context");
 let detail = if files.is_empty() {
 String::new()
 } else {
 format!("{} file(s)", files.len())
 };
 step.running(detail);
 self.steps.push(step);
 self.context_index = Some(self.steps.len() - 1);
 self.active_phase = Some(Phase::Context);
 }

 fn model_step_mut(&mut self) -> &mut ProgressStep {
 if self.model_index.is_none() {
 let step = ProgressStep::seeded(Phase::Model, "model");
 self.steps.push(step);
 self.model_index = Some(self.steps.len() - 1);
 }
 &mut self.steps[self.model_index.unwrap()]
 }

 fn open_describing(&mut self) {
 self.close_context();
 self.model_step_mut().running("generating description");
 self.active_phase = Some(Phase::Model);
 }

 fn open_reply(&mut self, chunk: &str) {
 if chunk.is_empty() {
 return;
 }
 self.close_context();
 let existed = self.model_index.is_some();
 let step = self.model_step_mut();
 if step.status != StepStatus::Running {
 let detail = if existed {
 "streaming reply (continued)"
 } else {
 "streaming reply"
 };
 step.started_at = None;
 step.finished_at = None;
 step.running(detail);
 }
 self.active_phase = Some(Phase::Model);
 }

 fn replies_finished(&mut self) {
 if let Some(idx) = self.model_index {
 let step = &mut self.steps[idx];
 if step.status == StepStatus::Running {
 step.complete("reply complete", step.confidence);
 }
 }
 }

 fn build_info(&mut self, path: &str, num_tokens: u32, finished: bool, removed: bool) {
 let idx = *self.build_index.entry(path.to_string()).or_insert_with(|| {
 let mut step = ProgressStep::seeded(Phase::Build, path);
 step.path = Some(path.to_string());
 self.steps.push(step);
 self.steps.len() - 1
 });
 self.active_phase = Some(Phase::Build);
 let step = &mut self.steps[idx];
 if finished || removed {
 if step.status != StepStatus::Completed {
 step.complete(format!("{path} — {num_tokens} tokens"), None);
 }
 } else {
 step.running(format!("{path} — {num_tokens} tokens"));
 }
 }

 fn complete_open_steps(&mut self) {
 for step in self.steps.iter_mut() {
 if step.is_open() {
 step.complete(step.detail.clone(), step.confidence);
 }
 }
 }

 fn fail_open_steps(&mut self, message: &str) {
 for step in self.steps.iter_mut() {
 if step.is_open() {
 step.fail(message.to_string());
 }
 }
 }

 fn finished_normally(&mut self) {
 self.complete_open_steps();
 let mut finalize = ProgressStep::seeded(Phase::Finalize, "finalize");
 finalize.running("finalizing");
 finalize.complete("finalized", Some(Confidence::Guaranteed));
 self.steps.push(finalize);
 self.active_phase = Some(Phase::Finalize);
 self.finished = true;
 }

 fn aborted(&mut self) {
 self.complete_open_steps();
 self.finished = true;
 self.error = Some("stopped by user".to_string());
 }

 fn errored(&mut self, message: &str) {
 let message = if message.is_empty() {
 "unknown error"
 } else {
 message
 };
 self.fail_open_steps(message);
 self.finished = true;
 self.error = Some(message.to_string());
 #[cfg(feature = "metrics")]
 metrics::counter!("progress_errors_total").increment(1);
 }
}

/// Adapter translating the stream-message sequence into phase/step
/// progress, safe for concurrent reads.
pub struct ProgressAdapter {
 inner: Arc<RwLock<Inner>>,
 config: ProgressConfig,
 stop: CancellationToken,
}

impl Clone for ProgressAdapter {
 fn clone(&self) -> Self {
 Self {
 inner: Arc::clone(&self.inner),
 config: self.config.clone(),
 stop: self.stop.clone(),
 }
 }
}

impl ProgressAdapter {
 pub fn new(config: ProgressConfig) -> Self {
 Self {
 inner: Arc::new(RwLock::new(Inner::new())),
 config,
 stop: CancellationToken::new(),
 }
 }

 /// Dispatches a single message, taking the exclusive lock for the
 /// duration.
 pub fn dispatch(&self, message: StreamMessage) {
 let mut inner = self.inner.write();
 inner.last_message_at = Instant::now();
 dispatch_one(&mut inner, message);
 }

 /// A concurrent-safe snapshot of current progress.
 pub fn snapshot(&self) -> ProgressSnapshot {
 let inner = self.inner.read();
 ProgressSnapshot {
 steps: inner.steps.clone(),
 active_phase: inner.active_phase,
 finished: inner.finished,
 error: inner.error.clone(),
 }
 }

 /// Spawns the stall watchdog.
 pub fn spawn_stall_watchdog(&self) -> tokio::task::JoinHandle<()> {
 let adapter = self.clone();
 let timeout = self.config.heartbeat_timeout;
 tokio::spawn(async move {
 loop {
 let sleep_for = {
 let inner = adapter.inner.read();
 if inner.shutdown || inner.finished {
 return;
 }
 timeout.saturating_sub(inner.last_message_at.elapsed())
 };
 let sleep = tokio::time::sleep(sleep_for);
 tokio::select! {
 biased;
 _ = adapter.stop.cancelled() => return,
 _ = sleep => {}
 }

 let mut inner = adapter.inner.write();
 if inner.shutdown {
 return;
 }
 if inner.last_message_at.elapsed() >= timeout {
 for step in inner.steps.iter_mut() {
 step.stall();
 }
 }
 }
 })
 }

 /// Closes the internal done-channel. Idempotent across multiple calls.
 pub fn shutdown(&self) {
 let mut inner = self.inner.write();
 if inner.shutdown {
 return;
 }
 inner.shutdown = true;
 drop(inner);
 self.stop.cancel();
 #[cfg(feature = "tracing")]
 tracing::debug!("progress adapter shut down");
 }
}

fn dispatch_one(inner: &mut Inner, message: StreamMessage) {
 match message {
 StreamMessage::Start | StreamMessage::ConnectActive { .. } => inner.complete_connect(),
 StreamMessage::LoadContext { files } => inner.open_context(&files),
 StreamMessage::Describing => inner.open_describing(),
 StreamMessage::Reply { reply_chunk } => inner.open_reply(&reply_chunk),
 StreamMessage::RepliesFinished => inner.replies_finished(),
 StreamMessage::BuildInfo {
 path,
 num_tokens,
 finished,
 removed,
 } => inner.build_info(&path, num_tokens, finished, removed),
 StreamMessage::Finished => inner.finished_normally(),
 StreamMessage::Aborted => inner.aborted(),
 StreamMessage::Error { msg } => inner.errored(&msg),
 StreamMessage::Heartbeat => {}
 StreamMessage::Multi { stream_messages } => {
 for sub in stream_messages {
 // Non-recursive: a nested `Multi` is not itself dispatched.
 if matches!(sub, StreamMessage::Multi { .. }) {
 continue;
 }
 dispatch_one(inner, sub);
 }
 }
 }
}

#[cfg(test)]
mod tests {
 use super::*;

 fn adapter() -> ProgressAdapter {
 ProgressAdapter::new(ProgressConfig::default())
 }

 #[test]
 fn start_completes_seeded_connect_step() {
 let adapter = adapter();
 adapter.dispatch(StreamMessage::Start);
 let snapshot = adapter.snapshot();
 let connect = snapshot
.steps
.iter()
.find(|s| s.phase == Phase::Connect)
.unwrap();
 assert_eq!(connect.status, StepStatus::Completed);
 assert_eq!(connect.confidence, Some(Confidence::Guaranteed));
 }

 #[test]
 fn load_context_opens_context_step_with_file_count() {
 let adapter = adapter();
 adapter.dispatch(StreamMessage::LoadContext {
 files: vec!["a.rs".into(), "b.rs".into()],
 });
 let snapshot = adapter.snapshot();
 let context = snapshot
.steps
.iter()
.find(|s| s.phase == Phase::Context)
.unwrap();
 assert_eq!(context.status, StepStatus::Running);
 assert_eq!(context.detail, "2 file(s)");
 }

 #[test]
 fn reply_then_replies_finished_completes_model_step() {
 let adapter = adapter();
 adapter.dispatch(StreamMessage::LoadContext { files: vec![] });
 adapter.dispatch(StreamMessage::Reply {
 reply_chunk: "hello".into(),
 });
 adapter.dispatch(StreamMessage::RepliesFinished);

 let snapshot = adapter.snapshot();
 let model = snapshot
.steps
.iter()
.find(|s| s.phase == Phase::Model)
.unwrap();
 assert_eq!(model.status, StepStatus::Completed);
 assert_eq!(model.detail, "reply complete");
 }

 #[test]
 fn empty_reply_chunk_is_ignored() {
 let adapter = adapter();
 adapter.dispatch(StreamMessage::Reply {
 reply_chunk: String::new(),
 });
 let snapshot = adapter.snapshot();
 assert!(!snapshot.steps.iter().any(|s| s.phase == Phase::Model));
 }

 #[test]
 fn build_info_tracks_per_path_concurrent_steps() {
 let adapter = adapter();
 adapter.dispatch(StreamMessage::BuildInfo {
 path: "a.rs".into(),
 num_tokens: 10,
 finished: false,
 removed: false,
 });
 adapter.dispatch(StreamMessage::BuildInfo {
 path: "b.rs".into(),
 num_tokens: 5,
 finished: false,
 removed: false,
 });
 adapter.dispatch(StreamMessage::BuildInfo {
 path: "a.rs".into(),
 num_tokens: 20,
 finished: true,
 removed: false,
 });

 let snapshot = adapter.snapshot();
 let build_steps: Vec<_> = snapshot.steps.iter().filter(|s| s.phase == Phase::Build).collect();
 assert_eq!(build_steps.len(), 2);
 let a = build_steps.iter().find(|s| s.path.as_deref() == Some("a.rs")).unwrap();
 assert_eq!(a.status, StepStatus::Completed);
 let b = build_steps.iter().find(|s| s.path.as_deref() == Some("b.rs")).unwrap();
 assert_eq!(b.status, StepStatus::Running);
 }

 #[test]
 fn finished_completes_open_steps_and_appends_finalize() {
 let adapter = adapter();
 adapter.dispatch(StreamMessage::LoadContext { files: vec![] });
 adapter.dispatch(StreamMessage::Finished);

 let snapshot = adapter.snapshot();
 assert!(snapshot.finished);
 assert!(snapshot.steps.iter().any(|s| s.phase == Phase::Finalize
 && s.status == StepStatus::Completed));
 assert!(snapshot.steps.iter().all(|s| s.status != StepStatus::Running));
 }

 #[test]
 fn error_fails_open_steps_with_message() {
 let adapter = adapter();
 adapter.dispatch(StreamMessage::LoadContext { files: vec![] });
 adapter.dispatch(StreamMessage::Error { msg: "boom".into() });

 let snapshot = adapter.snapshot();
 assert!(snapshot.finished);
 assert_eq!(snapshot.error.as_deref(), Some("boom"));
 let context = snapshot.steps.iter().find(|s| s.phase == Phase::Context).unwrap();
 assert_eq!(context.status, StepStatus::Failed);
 assert_eq!(context.error.as_deref(), Some("boom"));
 }

 #[test]
 fn error_without_message_falls_back_to_unknown() {
 let adapter = adapter();
 adapter.dispatch(StreamMessage::LoadContext { files: vec![] });
 adapter.dispatch(StreamMessage::Error { msg: String::new() });
 let snapshot = adapter.snapshot();
 assert_eq!(snapshot.error.as_deref(), Some("unknown error"));
 }

 #[test]
 fn aborted_marks_finished_with_stopped_by_user() {
 let adapter = adapter();
 adapter.dispatch(StreamMessage::LoadContext { files: vec![] });
 adapter.dispatch(StreamMessage::Aborted);
 let snapshot = adapter.snapshot();
 assert!(snapshot.finished);
 assert_eq!(snapshot.error.as_deref(), Some("stopped by user"));
 }

 #[test]
 fn multi_dispatches_each_submessage_once_and_ignores_nested_multi() {
 let adapter = adapter();
 adapter.dispatch(StreamMessage::Multi {
 stream_messages: vec![
 StreamMessage::LoadContext { files: vec!["a.rs".into()] },
 StreamMessage::Multi {
 stream_messages: vec![StreamMessage::Describing],
 },
 ],
 });
 let snapshot = adapter.snapshot();
 // The nested Multi (and its Describing) must not have been dispatched,
 // so the context step should still be open, not completed by Describing.
 let context = snapshot.steps.iter().find(|s| s.phase == Phase::Context).unwrap();
 assert_eq!(context.status, StepStatus::Running);
 assert!(!snapshot.steps.iter().any(|s| s.phase == Phase::Model));
 }

 #[test]
 fn heartbeat_is_a_no_op_against_steps() {
 let adapter = adapter();
 adapter.dispatch(StreamMessage::LoadContext { files: vec![] });
 let before = adapter.snapshot();
 adapter.dispatch(StreamMessage::Heartbeat);
 let after = adapter.snapshot();
 assert_eq!(before.steps.len(), after.steps.len());
 }

 #[test]
 fn shutdown_is_idempotent() {
 let adapter = adapter();
 adapter.shutdown();
 adapter.shutdown();
 }

 #[tokio::test(start_paused = true)]
 async fn stall_watchdog_marks_running_steps_stalled_after_timeout() {
 let adapter = ProgressAdapter::new(
 ProgressConfig::builder()
.heartbeat_timeout(std::time::Duration::from_secs(1))
.build(),
 );
 adapter.dispatch(StreamMessage::LoadContext { files: vec![] });
 let handle = adapter.spawn_stall_watchdog();

 tokio::time::advance(std::time::Duration::from_secs(2)).await;
 tokio::task::yield_now().await;

 let snapshot = adapter.snapshot();
 let context = snapshot.steps.iter().find(|s| s.phase == Phase::Context).unwrap();
 assert_eq!(context.status, StepStatus::Stalled);

 adapter.shutdown();
 let _ = handle.await;
 }
}
