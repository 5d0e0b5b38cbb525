//! Progress step model.

use std::time::Instant;

/// The ordered phases a request passes through en route to the UI
/// collaborator. All phases but `Build` have at most one active step;
/// `Build` is keyed by file path and may have many concurrent steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
 Connect,
 Context,
 Model,
 Build,
 Finalize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
 Pending,
 Running,
 Completed,
 Failed,
 Stalled,
 Skipped,
}

/// How confident the step's reported detail is, e.g. a token count derived
/// from an exact provider usage payload (`Guaranteed`) versus one inferred
/// from partial chunks (`Estimated`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
 Estimated,
 Guaranteed,
}

#[derive(Debug, Clone)]
pub struct ProgressStep {
 pub phase: Phase,
 /// For `Build` steps, the file path this step tracks. `None` otherwise.
 pub path: Option<String>,
 pub label: String,
 pub detail: String,
 pub status: StepStatus,
 pub started_at: Option<Instant>,
 pub finished_at: Option<Instant>,
 pub duration_ms: Option<u64>,
 pub error: Option<String>,
 pub confidence: Option<Confidence>,
}

impl ProgressStep {
 pub(crate) fn seeded(phase: Phase, label: impl Into<String>) -> Self {
 Self {
 phase,
 path: None,
 label: label.into(),
 detail: String::new(),
 status: StepStatus::Pending,
 started_at: None,
 finished_at: None,
 duration_ms: None,
 error: None,
 confidence: None,
 }
 }

 pub(crate) fn running(&mut self, detail: impl Into<String>) {
 self.status = StepStatus::Running;
 self.started_at.get_or_insert(Instant::now());
 self.finished_at = None;
 self.detail = detail.into();
 }

 pub(crate) fn is_open(&self) -> bool {
 matches!(self.status, StepStatus::Running | StepStatus::Stalled)
 }

 pub(crate) fn complete(&mut self, detail: impl Into<String>, confidence: Option<Confidence>) {
 let now = Instant::now();
 self.status = StepStatus::Completed;
 self.detail = detail.into();
 self.confidence = confidence;
 self.finished_at = Some(now);
 if let Some(start) = self.started_at {
 self.duration_ms = Some(now.saturating_duration_since(start).as_millis() as u64);
 }
 }

 pub(crate) fn fail(&mut self, error: impl Into<String>) {
 let now = Instant::now();
 self.status = StepStatus::Failed;
 self.error = Some(error.into());
 self.finished_at = Some(now);
 if let Some(start) = self.started_at {
 self.duration_ms = Some(now.saturating_duration_since(start).as_millis() as u64);
 }
 }

 pub(crate) fn stall(&mut self) {
 if self.status == StepStatus::Running {
 self.status = StepStatus::Stalled;
 }
 }
}
