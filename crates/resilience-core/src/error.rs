//! A common error type that wraps every resilience-core rejection reason.
//! Composing several independently constructed managers (circuit breaker,
//! degradation controller, idempotency ledger) behind a single retry driver
//! would otherwise require a `From` impl per manager error. Wrapping every
//! manager's rejection in one enum removes that boilerplate while still
//! preserving the caller's own application error in the `Application`
//! variant.

use crate::cancellation::Cancelled;
use crate::failure::FailureKind;
use std::fmt;

/// A unifying error returned by resilience-core collaborators.
/// `E` is the caller's own transport/application error type, preserved
/// verbatim in [`ResilienceError::Application`].
#[derive(Debug, Clone)]
pub enum ResilienceError<E> {
 /// The circuit breaker for the given provider is currently open.
 CircuitOpen {
 /// Name of the provider whose circuit rejected the call.
 provider: String,
 },
 /// The ambient cancellation token fired before the operation completed.
 Cancelled,
 /// A classified failure that exhausted its retry/fallback budget.
 Exhausted {
 /// The failure kind observed on the final attempt.
 kind: FailureKind,
 /// Total attempts made across all providers/fallbacks.
 total_attempts: usize,
 },
 /// The underlying application/transport call failed with its own error.
 Application(E),
}

impl<E> From<Cancelled> for ResilienceError<E> {
 fn from(_: Cancelled) -> Self {
 ResilienceError::Cancelled
 }
}

impl<E: fmt::Display> fmt::Display for ResilienceError<E> {
 fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
 match self {
 ResilienceError::CircuitOpen { provider } => {
 write!(f, "circuit breaker for provider '{provider}' is open")
 }
 ResilienceError::Cancelled => write!(f, "operation cancelled"),
 ResilienceError::Exhausted {
 kind,
 total_attempts,
 } => write!(
 f,
 "exhausted retries after {total_attempts} attempt(s), last failure: {}",
 kind.name()
 ),
 ResilienceError::Application(e) => write!(f, "application error: {e}"),
 }
 }
}

impl<E> std::error::Error for ResilienceError<E> where E: std::error::Error {}

impl<E> ResilienceError<E> {
 /// `true` for [`ResilienceError::CircuitOpen`].
 pub fn is_circuit_open(&self) -> bool {
 matches!(self, ResilienceError::CircuitOpen { .. })
 }

 /// `true` for [`ResilienceError::Cancelled`].
 pub fn is_cancelled(&self) -> bool {
 matches!(self, ResilienceError::Cancelled)
 }

 /// `true` for [`ResilienceError::Exhausted`].
 pub fn is_exhausted(&self) -> bool {
 matches!(self, ResilienceError::Exhausted { .. })
 }

 /// `true` for [`ResilienceError::Application`].
 pub fn is_application(&self) -> bool {
 matches!(self, ResilienceError::Application(_))
 }

 /// Extracts the application error, if this is an `Application` variant.
 pub fn application_error(self) -> Option<E> {
 match self {
 ResilienceError::Application(e) => Some(e),
 _ => None,
 }
 }

 /// Maps the application error using a function, preserving other variants.
 pub fn map_application<F, T>(self, f: F) -> ResilienceError<T>
 where
 F: FnOnce(E) -> T,
 {
 match self {
 ResilienceError::CircuitOpen { provider } => ResilienceError::CircuitOpen { provider },
 ResilienceError::Cancelled => ResilienceError::Cancelled,
 ResilienceError::Exhausted {
 kind,
 total_attempts,
 } => ResilienceError::Exhausted {
 kind,
 total_attempts,
 },
 ResilienceError::Application(e) => ResilienceError::Application(f(e)),
 }
 }
}

#[cfg(test)]
mod tests {
 use super::*;

 #[derive(Debug, Clone)]
 struct TestError;

 impl fmt::Display for TestError {
 fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
 write!(f, "test error")
 }
 }

 impl std::error::Error for TestError {}

 const _: () = {
 const fn assert_send_sync_static<T: Send + Sync + 'static>() {}
 assert_send_sync_static::<ResilienceError<TestError>>();
 };

 #[test]
 fn cancelled_converts_from_cancellation_token_error() {
 let err: ResilienceError<TestError> = Cancelled.into();
 assert!(err.is_cancelled());
 }

 #[test]
 fn display_includes_provider_name() {
 let err: ResilienceError<TestError> = ResilienceError::CircuitOpen {
 provider: "openai".to_string(),
 };
 assert!(err.to_string().contains("openai"));
 }

 #[test]
 fn map_application_preserves_other_variants() {
 let err: ResilienceError<TestError> = ResilienceError::CircuitOpen {
 provider: "anthropic".to_string(),
 };
 let mapped = err.map_application(|_| 0u8);
 assert!(mapped.is_circuit_open());
 }
}
