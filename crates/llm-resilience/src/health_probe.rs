//! Optional active health-check prober, supplementing the health
//! registry's otherwise purely reactive, request-driven scoring.
//! An async trait method over a generic resource, with a blanket
//! implementation for closures. Here the "resource" is always a provider
//! name, since the registry this feeds is keyed that way.

use resilience_core::CancellationToken;
use resilience_health::HealthRegistry;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Result of a single active probe of one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
 Reachable,
 Unreachable,
}

/// Checks whether a provider is currently reachable, independent of live
/// request traffic.
pub trait ProviderProbe: Send + Sync {
 fn probe(&self, provider: &str) -> impl Future<Output = ProbeOutcome> + Send;
}

impl<F, Fut> ProviderProbe for F
where
 F: Fn(&str) -> Fut + Send + Sync,
 Fut: Future<Output = ProbeOutcome> + Send,
{
 fn probe(&self, provider: &str) -> impl Future<Output = ProbeOutcome> + Send {
 self(provider)
 }
}

/// Spawns a ticker that probes every provider in `providers` every
/// `interval` and feeds the outcome into `health` via `record_request`, so
/// the scorer reflects reachability even for a provider with no recent live
/// traffic. Exits when `stop` is cancelled.
pub fn spawn_health_check_prober<P>(
 health: Arc<HealthRegistry>,
 probe: Arc<P>,
 providers: Vec<String>,
 interval: Duration,
 stop: CancellationToken,
) -> tokio::task::JoinHandle<()>
where
 P: ProviderProbe + 'static,
{
 tokio::spawn(async move {
 let mut ticker = tokio::time::interval(interval);
 loop {
 let tick = ticker.tick();
 tokio::select! {
 biased;
 _ = stop.cancelled() => break,
 _ = tick => {
 for provider in &providers {
 let started = Instant::now();
 let outcome = probe.probe(provider).await;
 let latency_ms = started.elapsed().as_millis() as u64;
 let reachable = outcome == ProbeOutcome::Reachable;
 health.record_request(provider, reachable, latency_ms);

 #[cfg(feature = "tracing")]
 tracing::debug!(provider, reachable, "health probe completed");
 #[cfg(feature = "metrics")]
 metrics::counter!(
 "health_probe_total",
 "provider" => provider.clone(),
 "outcome" => if reachable { "reachable" } else { "unreachable" },
 )
.increment(1);
 }
 }
 }
 }
 })
}
