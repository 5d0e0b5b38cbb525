use crate::config::HealthScorerConfig;
use crate::status::HealthStatus;
use std::collections::VecDeque;
use std::time::Instant;

/// Rolling health state for a single provider.
pub struct ProviderHealth {
 score: u32,
 status: HealthStatus,
 status_since: Instant,
 total_requests: u64,
 successful_requests: u64,
 consecutive_failures: u32,
 consecutive_successes: u32,
 latency_samples: VecDeque<u64>,
 max_samples: usize,
 last_check: Instant,
 last_success: Option<Instant>,
 last_failure: Option<Instant>,
}

impl ProviderHealth {
 pub(crate) fn new(config: &HealthScorerConfig) -> Self {
 Self {
 score: 50,
 status: HealthStatus::Degraded,
 status_since: Instant::now(),
 total_requests: 0,
 successful_requests: 0,
 consecutive_failures: 0,
 consecutive_successes: 0,
 latency_samples: VecDeque::new(),
 max_samples: config.max_latency_samples,
 last_check: Instant::now(),
 last_success: None,
 last_failure: None,
 }
 }

 pub fn score(&self) -> u32 {
 self.score
 }

 pub fn status(&self) -> HealthStatus {
 self.status
 }

 pub fn status_since(&self) -> Instant {
 self.status_since
 }

 pub fn consecutive_failures(&self) -> u32 {
 self.consecutive_failures
 }

 pub fn consecutive_successes(&self) -> u32 {
 self.consecutive_successes
 }

 /// Nearest-rank percentile over the retained samples: `index = ceil(p/100 * N) - 1`.
 pub fn percentile(&self, p: f64) -> Option<u64> {
 if self.latency_samples.is_empty() {
 return None;
 }
 let mut sorted: Vec<u64> = self.latency_samples.iter().copied().collect();
 sorted.sort_unstable();
 let n = sorted.len();
 let rank = ((p / 100.0) * n as f64).ceil() as usize;
 let index = rank.saturating_sub(1).min(n - 1);
 Some(sorted[index])
 }

 pub fn p95(&self) -> Option<u64> {
 self.percentile(95.0)
 }

 pub fn p99(&self) -> Option<u64> {
 self.percentile(99.0)
 }

 /// Mean of the retained latency samples.
 pub fn avg_latency_ms(&self) -> Option<u64> {
 if self.latency_samples.is_empty() {
 return None;
 }
 let sum: u64 = self.latency_samples.iter().sum();
 Some(sum / self.latency_samples.len() as u64)
 }

 /// Fraction of recorded requests that succeeded.
 pub fn success_rate(&self) -> f64 {
 if self.total_requests == 0 {
 1.0
 } else {
 self.successful_requests as f64 / self.total_requests as f64
 }
 }

 pub fn last_check(&self) -> Instant {
 self.last_check
 }

 pub fn last_success(&self) -> Option<Instant> {
 self.last_success
 }

 pub fn last_failure(&self) -> Option<Instant> {
 self.last_failure
 }

 pub(crate) fn record_latency(&mut self, latency_ms: u64) {
 if self.latency_samples.len() >= self.max_samples {
 self.latency_samples.pop_front();
 }
 self.latency_samples.push_back(latency_ms);
 }

 pub(crate) fn record_request(
 &mut self,
 success: bool,
 config: &HealthScorerConfig,
 ) -> Option<(HealthStatus, HealthStatus)> {
 self.total_requests += 1;
 self.last_check = Instant::now();
 if success {
 self.successful_requests += 1;
 self.consecutive_successes += 1;
 self.consecutive_failures = 0;
 self.last_success = Some(self.last_check);
 } else {
 self.consecutive_failures += 1;
 self.consecutive_successes = 0;
 self.last_failure = Some(self.last_check);
 }
 self.recompute_score(config)
 }

 /// Recomputes the integer score in [0,100] from a base of 50, then re-derives the status band.
 pub(crate) fn recompute_score(
 &mut self,
 config: &HealthScorerConfig,
 ) -> Option<(HealthStatus, HealthStatus)> {
 let mut score: i32 = 50;

 let success_rate = self.success_rate();
 if success_rate >= config.healthy_success_rate {
 score += 25;
 } else if success_rate >= config.degraded_success_rate {
 score += 10;
 } else {
 score -= 25;
 }

 if let Some(p95) = self.p95() {
 if p95 <= config.healthy_latency_ms {
 score += 25;
 } else if p95 <= config.degraded_latency_ms {
 score += 10;
 } else {
 score -= 15;
 }
 }

 if self.consecutive_failures >= 5 {
 score -= 30;
 } else if self.consecutive_failures >= 3 {
 score -= 15;
 }

 if self.consecutive_successes >= 10 {
 score += 10;
 }

 self.score = score.clamp(0, 100) as u32;

 let new_status = if self.score >= config.healthy_threshold {
 HealthStatus::Healthy
 } else if self.score >= config.degraded_threshold {
 HealthStatus::Degraded
 } else {
 HealthStatus::Unhealthy
 };

 if new_status != self.status {
 let from = self.status;
 self.status = new_status;
 self.status_since = Instant::now();
 Some((from, new_status))
 } else {
 None
 }
 }
}
