//! A thread-safe cancellation handle passed explicitly to every operation
//! that suspends, rather than relying on ambient context. Built on
//! [`tokio::sync::watch`] instead of pulling in `tokio-util` purely for a
//! cancellation token, keeping the `tokio` dependency limited to the `sync`
//! feature.

use std::future::Future;
use tokio::sync::watch;

/// Error returned when a suspension point observes cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// A cloneable, thread-safe cancellation signal.
/// Cloning shares the same underlying signal; cancelling any clone cancels
/// all of them. Cancellation is idempotent and monotonic: once cancelled, a
/// token never un-cancels.
#[derive(Debug, Clone)]
pub struct CancellationToken {
 tx: watch::Sender<bool>,
 rx: watch::Receiver<bool>,
}

impl Default for CancellationToken {
 fn default() -> Self {
 Self::new()
 }
}

impl CancellationToken {
 /// Creates a new, not-yet-cancelled token.
 pub fn new() -> Self {
 let (tx, rx) = watch::channel(false);
 Self { tx, rx }
 }

 /// Signals cancellation to this token and every clone of it.
 pub fn cancel(&self) {
 // `send` only errors if every receiver (including our own `rx`) was
 // dropped, which cannot happen while `self` is alive.
 let _ = self.tx.send(true);
 }

 /// Returns `true` if [`CancellationToken::cancel`] has been called.
 pub fn is_cancelled(&self) -> bool {
 *self.rx.borrow()
 }

 /// Resolves immediately if already cancelled, otherwise resolves the
 /// first time cancellation occurs.
 pub async fn cancelled(&self) {
 let mut rx = self.rx.clone();
 if *rx.borrow() {
 return;
 }
 // A `RecvError` here means the sender was dropped without ever
 // cancelling, which happens only if every `CancellationToken` handle
 // (including `self`) was dropped concurrently with this call; in
 // that case there is no one left to observe cancellation, so we can
 // simply return.
 let _ = rx.wait_for(|cancelled| *cancelled).await;
 }

 /// Races `fut` against cancellation, returning [`Cancelled`] if the token
 /// fires first. This is the core building block for every suspension
 /// point in the retry driver.
 pub async fn race<F, T>(&self, fut: F) -> Result<T, Cancelled>
 where
 F: Future<Output = T>,
 {
 tokio::select! {
 biased;
 _ = self.cancelled() => Err(Cancelled),
 value = fut => Ok(value),
 }
 }
}

#[cfg(test)]
mod tests {
 use super::*;
 use std::time::Duration;

 #[tokio::test]
 async fn not_cancelled_by_default() {
 let token = CancellationToken::new();
 assert!(!token.is_cancelled());
 }

 #[tokio::test]
 async fn cancel_is_observed_by_clones() {
 let token = CancellationToken::new();
 let clone = token.clone();
 token.cancel();
 assert!(clone.is_cancelled());
 }

 #[tokio::test]
 async fn cancel_is_idempotent() {
 let token = CancellationToken::new();
 token.cancel();
 token.cancel();
 assert!(token.is_cancelled());
 }

 #[tokio::test]
 async fn race_returns_value_when_not_cancelled() {
 let token = CancellationToken::new();
 let result = token.race(async { 42 }).await;
 assert_eq!(result, Ok(42));
 }

 #[tokio::test]
 async fn race_returns_cancelled_when_token_fires_first() {
 let token = CancellationToken::new();
 let racer = token.clone();
 tokio::spawn(async move {
 tokio::time::sleep(Duration::from_millis(5)).await;
 racer.cancel();
 });
 let result = token
.race(async {
 tokio::time::sleep(Duration::from_secs(3600)).await;
 "never"
 })
.await;
 assert_eq!(result, Err(Cancelled));
 }

 #[tokio::test]
 async fn cancelled_resolves_immediately_if_already_cancelled() {
 let token = CancellationToken::new();
 token.cancel();
 tokio::time::timeout(Duration::from_millis(50), token.cancelled())
.await
.expect("cancelled() should resolve immediately");
 }
}
