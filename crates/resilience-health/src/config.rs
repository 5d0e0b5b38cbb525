use std::time::Duration;

/// Tuning knobs for the health scorer.
#[derive(Debug, Clone)]
pub struct HealthScorerConfig {
 pub(crate) healthy_success_rate: f64,
 pub(crate) degraded_success_rate: f64,
 pub(crate) healthy_latency_ms: u64,
 pub(crate) degraded_latency_ms: u64,
 pub(crate) healthy_threshold: u32,
 pub(crate) degraded_threshold: u32,
 pub(crate) max_latency_samples: usize,
}

impl HealthScorerConfig {
 pub fn builder() -> HealthScorerConfigBuilder {
 HealthScorerConfigBuilder::new()
 }
}

impl Default for HealthScorerConfig {
 fn default() -> Self {
 HealthScorerConfigBuilder::new().build()
 }
}

pub struct HealthScorerConfigBuilder {
 healthy_success_rate: f64,
 degraded_success_rate: f64,
 healthy_latency_ms: u64,
 degraded_latency_ms: u64,
 healthy_threshold: u32,
 degraded_threshold: u32,
 max_latency_samples: usize,
}

impl HealthScorerConfigBuilder {
 pub fn new() -> Self {
 Self {
 healthy_success_rate: 0.95,
 degraded_success_rate: 0.8,
 healthy_latency_ms: 2_000,
 degraded_latency_ms: 5_000,
 healthy_threshold: 70,
 degraded_threshold: 40,
 max_latency_samples: 100,
 }
 }

 pub fn healthy_success_rate(mut self, rate: f64) -> Self {
 self.healthy_success_rate = rate;
 self
 }

 pub fn degraded_success_rate(mut self, rate: f64) -> Self {
 self.degraded_success_rate = rate;
 self
 }

 pub fn healthy_latency(mut self, d: Duration) -> Self {
 self.healthy_latency_ms = d.as_millis() as u64;
 self
 }

 pub fn degraded_latency(mut self, d: Duration) -> Self {
 self.degraded_latency_ms = d.as_millis() as u64;
 self
 }

 pub fn healthy_threshold(mut self, score: u32) -> Self {
 self.healthy_threshold = score;
 self
 }

 pub fn degraded_threshold(mut self, score: u32) -> Self {
 self.degraded_threshold = score;
 self
 }

 pub fn max_latency_samples(mut self, n: usize) -> Self {
 self.max_latency_samples = n;
 self
 }

 pub fn build(self) -> HealthScorerConfig {
 HealthScorerConfig {
 healthy_success_rate: self.healthy_success_rate,
 degraded_success_rate: self.degraded_success_rate,
 healthy_latency_ms: self.healthy_latency_ms,
 degraded_latency_ms: self.degraded_latency_ms,
 healthy_threshold: self.healthy_threshold,
 degraded_threshold: self.degraded_threshold,
 max_latency_samples: self.max_latency_samples,
 }
 }
}

impl Default for HealthScorerConfigBuilder {
 fn default() -> Self {
 Self::new()
 }
}
