//! Shared infrastructure for the llm-resilience workspace.
//! This crate provides the vocabulary every other crate in the workspace
//! builds on:
//! - [`failure`] — the closed [`FailureKind`] taxonomy and the frozen
//! per-kind [`RetryPolicy`] table.
//! - [`events`] — a unified observer system (`ResilienceEvent`/`EventListener`)
//! used by the circuit breaker, retry driver, and degradation controller to
//! report state changes.
//! - [`cancellation`] — an explicit, cloneable [`CancellationToken`] threaded
//! through every suspension point instead of relying on ambient context.
//! - [`error`] — [`ResilienceError<E>`], a unifying rejection type so callers
//! composing multiple managers don't need a `From` impl per manager.

pub mod cancellation;
pub mod error;
pub mod events;
pub mod failure;

pub use cancellation::{Cancelled, CancellationToken};
pub use error::ResilienceError;
pub use events::{EventListener, EventListeners, FnListener, ResilienceEvent};
pub use failure::{FailureKind, RetryPolicy, RetryPolicyTable};
