//! Composition root wiring every resilience collaborator into a single
//! injectable handle for streaming provider calls.
//! Specialized to the collaborators in this workspace rather than generic
//! `tower::Layer`/`Service` stacking: a caller owns one `ResilienceCore`
//! and injects the accessors it needs into its own request path.

mod config;
mod health_probe;

pub use config::{ResilienceCoreConfig, ResilienceCoreConfigBuilder};
pub use health_probe::{ProbeOutcome, ProviderProbe};

use resilience_circuitbreaker::CircuitBreakerRegistry;
use resilience_core::CancellationToken;
use resilience_degradation::DegradationController;
use resilience_dlq::DeadLetterQueue;
use resilience_health::HealthRegistry;
use resilience_idempotency::IdempotencyLedger;
use resilience_progress::ProgressAdapter;
use resilience_retry::RetryDriver;
use resilience_stream::StreamRecoveryManager;
use std::sync::Arc;
use std::time::Duration;

/// Join handles for the background workers started by [`ResilienceCore::init`].
pub struct ResilienceCoreHandles {
 dlq_cleanup: tokio::task::JoinHandle<()>,
 stream_sweep: tokio::task::JoinHandle<()>,
 progress_watchdog: tokio::task::JoinHandle<()>,
}

impl ResilienceCoreHandles {
 /// Awaits every background worker. Call after [`ResilienceCore::shutdown`]
 /// to reclaim the tasks; the handles alone don't stop anything.
 pub async fn join(self) {
 let _ = self.dlq_cleanup.await;
 let _ = self.stream_sweep.await;
 let _ = self.progress_watchdog.await;
 }
}

/// Owns every resilience collaborator and exposes them as explicitly
/// constructed values a caller injects into its own request path, rather
/// than reaching for ambient singletons. [`Self::init`] starts the
/// always-on background workers; [`Self::spawn_health_check_prober`]
/// optionally starts the active health-check ticker; [`Self::shutdown`]
/// tears every manager's worker down idempotently.
pub struct ResilienceCore {
 circuit_breakers: Arc<CircuitBreakerRegistry>,
 health: Arc<HealthRegistry>,
 degradation: Arc<DegradationController>,
 dlq: Arc<DeadLetterQueue>,
 stream: Arc<StreamRecoveryManager>,
 idempotency: Arc<IdempotencyLedger>,
 progress: Arc<ProgressAdapter>,
 retry: RetryDriver,
 health_check_interval: Duration,
 health_check_stop: CancellationToken,
}

impl ResilienceCore {
 /// Constructs every collaborator from `config`. Does not start any
 /// background worker; call [`Self::init`] for that.
 pub fn new(config: ResilienceCoreConfig) -> Self {
 let circuit_breakers = Arc::new(CircuitBreakerRegistry::new(config.circuit_breaker));
 let health = Arc::new(HealthRegistry::new(config.health));
 let degradation = Arc::new(DegradationController::new(config.degradation));
 let dlq = Arc::new(DeadLetterQueue::new(config.dlq));
 let stream = Arc::new(StreamRecoveryManager::new(config.stream));
 let idempotency = Arc::new(IdempotencyLedger::new(config.idempotency));
 let progress = Arc::new(ProgressAdapter::new(config.progress));
 let retry = RetryDriver::new(
 config.retry,
 Arc::clone(&circuit_breakers),
 Arc::clone(&health),
 Arc::clone(&dlq),
 );

 Self {
 circuit_breakers,
 health,
 degradation,
 dlq,
 stream,
 idempotency,
 progress,
 retry,
 health_check_interval: config.health_check_interval,
 health_check_stop: CancellationToken::new(),
 }
 }

 /// Starts the DLQ cleanup sweep, the recovery-session timeout sweep, and
 /// the progress stall watchdog. The health-check prober is separate and
 /// optional; see [`Self::spawn_health_check_prober`].
 pub fn init(&self) -> ResilienceCoreHandles {
 let handles = ResilienceCoreHandles {
 dlq_cleanup: self.dlq.spawn_cleanup_worker(),
 stream_sweep: self.stream.spawn_timeout_sweep(),
 progress_watchdog: self.progress.spawn_stall_watchdog(),
 };

 #[cfg(feature = "tracing")]
 tracing::info!("resilience core initialized");

 handles
 }

 /// Starts the optional active health-check ticker for `providers`,
 /// feeding each probe's outcome into the health registry alongside
 /// live-traffic scoring.
 pub fn spawn_health_check_prober<P>(
 &self,
 probe: Arc<P>,
 providers: Vec<String>,
 ) -> tokio::task::JoinHandle<()>
 where
 P: ProviderProbe + 'static,
 {
 health_probe::spawn_health_check_prober(
 Arc::clone(&self.health),
 probe,
 providers,
 self.health_check_interval,
 self.health_check_stop.clone(),
 )
 }

 /// Cancels every manager's private stop channel, including the
 /// health-check prober's if one was started. Idempotent.
 pub fn shutdown(&self) {
 self.dlq.stop();
 self.stream.stop();
 self.progress.shutdown();
 self.health_check_stop.cancel();

 #[cfg(feature = "tracing")]
 tracing::info!("resilience core shut down");
 }

 pub fn circuit_breakers(&self) -> &Arc<CircuitBreakerRegistry> {
 &self.circuit_breakers
 }

 pub fn health(&self) -> &Arc<HealthRegistry> {
 &self.health
 }

 pub fn degradation(&self) -> &Arc<DegradationController> {
 &self.degradation
 }

 pub fn dlq(&self) -> &Arc<DeadLetterQueue> {
 &self.dlq
 }

 pub fn stream(&self) -> &Arc<StreamRecoveryManager> {
 &self.stream
 }

 pub fn idempotency(&self) -> &Arc<IdempotencyLedger> {
 &self.idempotency
 }

 pub fn progress(&self) -> &Arc<ProgressAdapter> {
 &self.progress
 }

 /// The retry driver, pre-wired to this core's circuit breakers, health
 /// registry, and dead-letter queue.
 pub fn retry(&self) -> &RetryDriver {
 &self.retry
 }
}
