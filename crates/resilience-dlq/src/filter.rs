//! Query filter for `DeadLetterQueue::list`.

use crate::item::DlqStatus;
use resilience_core::FailureKind;
use std::time::Duration;

/// Filter criteria for listing dead-letter queue items. All fields are optional;
/// an absent field imposes no constraint.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
 pub status: Option<DlqStatus>,
 pub provider: Option<String>,
 pub op_type: Option<String>,
 pub failure_kind: Option<FailureKind>,
 pub plan_id: Option<String>,
 pub min_age: Option<Duration>,
 pub max_age: Option<Duration>,
 pub limit: Option<usize>,
}

impl ListFilter {
 pub fn new() -> Self {
 Self::default()
 }

 pub fn status(mut self, status: DlqStatus) -> Self {
 self.status = Some(status);
 self
 }

 pub fn provider(mut self, provider: impl Into<String>) -> Self {
 self.provider = Some(provider.into());
 self
 }

 pub fn op_type(mut self, op_type: impl Into<String>) -> Self {
 self.op_type = Some(op_type.into());
 self
 }

 pub fn failure_kind(mut self, kind: FailureKind) -> Self {
 self.failure_kind = Some(kind);
 self
 }

 pub fn plan_id(mut self, plan_id: impl Into<String>) -> Self {
 self.plan_id = Some(plan_id.into());
 self
 }

 pub fn min_age(mut self, min_age: Duration) -> Self {
 self.min_age = Some(min_age);
 self
 }

 pub fn max_age(mut self, max_age: Duration) -> Self {
 self.max_age = Some(max_age);
 self
 }

 pub fn limit(mut self, limit: usize) -> Self {
 self.limit = Some(limit);
 self
 }
}
