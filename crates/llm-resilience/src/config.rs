//! Configuration for assembling a [`crate::ResilienceCore`].

use resilience_circuitbreaker::CircuitBreakerConfig;
use resilience_degradation::DegradationConfig;
use resilience_dlq::DlqConfig;
use resilience_health::HealthScorerConfig;
use resilience_idempotency::IdempotencyConfig;
use resilience_progress::ProgressConfig;
use resilience_retry::RetryDriverConfig;
use resilience_stream::StreamConfig;
use std::time::Duration;

/// Aggregates every collaborator's own configuration into the single value
/// the composition root consumes. Each field keeps its source crate's
/// builder pattern; this type only groups them.
pub struct ResilienceCoreConfig {
 pub(crate) circuit_breaker: CircuitBreakerConfig,
 pub(crate) health: HealthScorerConfig,
 pub(crate) degradation: DegradationConfig,
 pub(crate) stream: StreamConfig,
 pub(crate) dlq: DlqConfig,
 pub(crate) idempotency: IdempotencyConfig,
 pub(crate) progress: ProgressConfig,
 pub(crate) retry: RetryDriverConfig,
 pub(crate) health_check_interval: Duration,
}

/// Builder for [`ResilienceCoreConfig`].
pub struct ResilienceCoreConfigBuilder {
 circuit_breaker: CircuitBreakerConfig,
 health: HealthScorerConfig,
 degradation: DegradationConfig,
 stream: StreamConfig,
 dlq: DlqConfig,
 idempotency: IdempotencyConfig,
 progress: ProgressConfig,
 retry: RetryDriverConfig,
 health_check_interval: Duration,
}

impl ResilienceCoreConfigBuilder {
 pub fn new() -> Self {
 Self {
 circuit_breaker: CircuitBreakerConfig::default(),
 health: HealthScorerConfig::default(),
 degradation: DegradationConfig::default(),
 stream: StreamConfig::default(),
 dlq: DlqConfig::default(),
 idempotency: IdempotencyConfig::default(),
 progress: ProgressConfig::default(),
 retry: RetryDriverConfig::default(),
 health_check_interval: Duration::from_secs(30),
 }
 }

 pub fn circuit_breaker(mut self, config: CircuitBreakerConfig) -> Self {
 self.circuit_breaker = config;
 self
 }

 pub fn health(mut self, config: HealthScorerConfig) -> Self {
 self.health = config;
 self
 }

 pub fn degradation(mut self, config: DegradationConfig) -> Self {
 self.degradation = config;
 self
 }

 pub fn stream(mut self, config: StreamConfig) -> Self {
 self.stream = config;
 self
 }

 pub fn dlq(mut self, config: DlqConfig) -> Self {
 self.dlq = config;
 self
 }

 pub fn idempotency(mut self, config: IdempotencyConfig) -> Self {
 self.idempotency = config;
 self
 }

 pub fn progress(mut self, config: ProgressConfig) -> Self {
 self.progress = config;
 self
 }

 /// The retry driver's own config, which in turn carries the classifier
 /// config and fallback targets.
 pub fn retry(mut self, config: RetryDriverConfig) -> Self {
 self.retry = config;
 self
 }

 /// Interval of the optional active health-check probe ticker.
 /// Has no effect unless [`crate::ResilienceCore::spawn_health_check_prober`]
 /// is called. Default: 30s.
 pub fn health_check_interval(mut self, interval: Duration) -> Self {
 self.health_check_interval = interval;
 self
 }

 pub fn build(self) -> ResilienceCoreConfig {
 ResilienceCoreConfig {
 circuit_breaker: self.circuit_breaker,
 health: self.health,
 degradation: self.degradation,
 stream: self.stream,
 dlq: self.dlq,
 idempotency: self.idempotency,
 progress: self.progress,
 retry: self.retry,
 health_check_interval: self.health_check_interval,
 }
 }
}

impl Default for ResilienceCoreConfigBuilder {
 fn default() -> Self {
 Self::new()
 }
}

impl ResilienceCoreConfig {
 pub fn builder() -> ResilienceCoreConfigBuilder {
 ResilienceCoreConfigBuilder::new()
 }
}

impl Default for ResilienceCoreConfig {
 fn default() -> Self {
 ResilienceCoreConfigBuilder::new().build()
 }
}
