//! Shared failure taxonomy and per-kind retry policy table.
//! Every component in this workspace that needs to reason about *why* an
//! outbound request failed shares the same closed enumeration defined here,
//! rather than each crate inventing its own.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A semantic classification of why an outbound streaming request failed.
/// Orthogonal to provider and HTTP status: two different providers returning
/// HTTP 429 both classify to [`FailureKind::RateLimit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FailureKind {
 /// Provider asked the caller to slow down (HTTP 429/529, explicit rate limit body).
 RateLimit,
 /// Provider reported it is overloaded (distinct from a hard rate limit).
 Overloaded,
 /// Generic 5xx-shaped failure from the provider.
 ServerError,
 /// No chunk arrived within the active-chunk window.
 Timeout,
 /// The transport could not establish or maintain a connection.
 ConnectionError,
 /// The stream was cut off mid-flight after at least one chunk arrived.
 StreamInterrupted,
 /// The request exceeded the provider's context window.
 ContextTooLong,
 /// Credentials were missing, malformed, or rejected.
 AuthInvalid,
 /// Credentials were valid but lack permission for this operation.
 PermissionDenied,
 /// The request itself was malformed, independent of auth or content.
 InvalidRequest,
 /// The provider refused the request on content-policy grounds.
 ContentPolicy,
 /// The account has exhausted its quota with no further retry expected.
 QuotaExhausted,
 /// The account's subscription-tier quota (distinct from pay-as-you-go quota) is exhausted.
 SubscriptionQuotaExhausted,
 /// The requested model does not exist or is not available to this account.
 ModelNotFound,
 /// The account has been suspended.
 AccountSuspended,
 /// The request used a caching feature the provider does not support.
 CacheUnsupported,
 /// Anything that does not match a more specific kind.
 Other,
}

impl FailureKind {
 /// Whether this kind is retryable on its own terms, independent of any
 /// fallback configuration. The first six variants below are retryable;
 /// `ContextTooLong` is not retryable (but may be fallback eligible);
 /// everything else is terminal unless an error-fallback target is
 /// configured by the caller.
 pub const fn is_retryable(self) -> bool {
 matches!(
 self,
 FailureKind::RateLimit
 | FailureKind::Overloaded
 | FailureKind::ServerError
 | FailureKind::Timeout
 | FailureKind::ConnectionError
 | FailureKind::StreamInterrupted
 )
 }

 /// Whether a large-context (or otherwise alternate-model) fallback is
 /// meaningful for this kind. Only `ContextTooLong` is fallback-eligible
 /// by construction; other non-retryable kinds may still be routed to a
 /// caller-configured error-fallback, but that is a driver-level decision,
 /// not a property of the kind itself.
 pub const fn is_fallback_eligible(self) -> bool {
 matches!(self, FailureKind::ContextTooLong)
 }

 /// Stable lowercase name, used as a label in logs, metrics, and events.
 pub const fn name(self) -> &'static str {
 match self {
 FailureKind::RateLimit => "rate_limit",
 FailureKind::Overloaded => "overloaded",
 FailureKind::ServerError => "server_error",
 FailureKind::Timeout => "timeout",
 FailureKind::ConnectionError => "connection_error",
 FailureKind::StreamInterrupted => "stream_interrupted",
 FailureKind::ContextTooLong => "context_too_long",
 FailureKind::AuthInvalid => "auth_invalid",
 FailureKind::PermissionDenied => "permission_denied",
 FailureKind::InvalidRequest => "invalid_request",
 FailureKind::ContentPolicy => "content_policy",
 FailureKind::QuotaExhausted => "quota_exhausted",
 FailureKind::SubscriptionQuotaExhausted => "subscription_quota_exhausted",
 FailureKind::ModelNotFound => "model_not_found",
 FailureKind::AccountSuspended => "account_suspended",
 FailureKind::CacheUnsupported => "cache_unsupported",
 FailureKind::Other => "other",
 }
 }

 /// All variants. Used by the default retry policy table and by tests
 /// that want exhaustive coverage.
 pub const ALL: [FailureKind; 17] = [
 FailureKind::RateLimit,
 FailureKind::Overloaded,
 FailureKind::ServerError,
 FailureKind::Timeout,
 FailureKind::ConnectionError,
 FailureKind::StreamInterrupted,
 FailureKind::ContextTooLong,
 FailureKind::AuthInvalid,
 FailureKind::PermissionDenied,
 FailureKind::InvalidRequest,
 FailureKind::ContentPolicy,
 FailureKind::QuotaExhausted,
 FailureKind::SubscriptionQuotaExhausted,
 FailureKind::ModelNotFound,
 FailureKind::AccountSuspended,
 FailureKind::CacheUnsupported,
 FailureKind::Other,
 ];
}

/// Per-kind retry parameters.
/// Invariant: `initial_delay <= max_delay`. Enforced at construction by
/// [`RetryPolicy::new`], which is the only constructor outside this module.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
 name: FailureKind,
 max_attempts: usize,
 initial_delay: Duration,
 max_delay: Duration,
 multiplier: f64,
 jitter_fraction: f64,
 respect_retry_after: bool,
}

impl RetryPolicy {
 /// Builds a policy, panicking if `initial_delay > max_delay` since that
 /// would be a programming error in a hardcoded table, not a runtime
 /// condition callers need to recover from.
 pub fn new(
 name: FailureKind,
 max_attempts: usize,
 initial_delay: Duration,
 max_delay: Duration,
 multiplier: f64,
 jitter_fraction: f64,
 respect_retry_after: bool,
 ) -> Self {
 assert!(
 initial_delay <= max_delay,
 "retry policy for {:?}: initial_delay must not exceed max_delay",
 name
 );
 Self {
 name,
 max_attempts,
 initial_delay,
 max_delay,
 multiplier,
 jitter_fraction,
 respect_retry_after,
 }
 }

 pub const fn kind(&self) -> FailureKind {
 self.name
 }

 pub const fn max_attempts(&self) -> usize {
 self.max_attempts
 }

 pub const fn initial_delay(&self) -> Duration {
 self.initial_delay
 }

 pub const fn max_delay(&self) -> Duration {
 self.max_delay
 }

 pub const fn multiplier(&self) -> f64 {
 self.multiplier
 }

 pub const fn jitter_fraction(&self) -> f64 {
 self.jitter_fraction
 }

 pub const fn respects_retry_after(&self) -> bool {
 self.respect_retry_after
 }

 /// Computes the un-jittered backoff for the given zero-indexed attempt:
 /// `min(max_delay, initial_delay * multiplier^attempt)`.
 pub fn base_delay(&self, attempt: u32) -> Duration {
 let scaled = self.initial_delay.as_secs_f64() * self.multiplier.powi(attempt as i32);
 let capped = scaled.min(self.max_delay.as_secs_f64()).max(0.0);
 Duration::from_secs_f64(capped)
 }
}

/// The frozen per-kind retry policy table.
/// The table is deterministic given a `FailureKind`: two lookups for the same
/// kind always return equal policies. Retryable kinds get real backoff
/// schedules; terminal kinds get a `max_attempts` of 1 purely so the table is
/// total (the retry driver never consults the policy for kinds it has
/// already decided are terminal via [`FailureKind::is_retryable`]).
#[derive(Debug, Clone)]
pub struct RetryPolicyTable {
 policies: [RetryPolicy; 17],
}

impl RetryPolicyTable {
 pub fn lookup(&self, kind: FailureKind) -> &RetryPolicy {
 self.policies
.iter()
.find(|p| p.name == kind)
.expect("RetryPolicyTable is total over FailureKind::ALL")
 }
}

impl Default for RetryPolicyTable {
 fn default() -> Self {
 use FailureKind::*;
 let secs = Duration::from_secs;
 let millis = Duration::from_millis;
 let policies = [
 RetryPolicy::new(RateLimit, 5, millis(500), secs(60), 2.0, 0.2, true),
 RetryPolicy::new(Overloaded, 5, secs(1), secs(30), 2.0, 0.2, true),
 RetryPolicy::new(ServerError, 4, secs(1), secs(20), 2.0, 0.15, false),
 RetryPolicy::new(Timeout, 3, secs(1), secs(15), 2.0, 0.1, false),
 RetryPolicy::new(ConnectionError, 4, millis(500), secs(10), 2.0, 0.15, false),
 RetryPolicy::new(StreamInterrupted, 3, secs(1), secs(10), 2.0, 0.1, false),
 RetryPolicy::new(ContextTooLong, 1, secs(0), secs(0), 1.0, 0.0, false),
 RetryPolicy::new(AuthInvalid, 1, secs(0), secs(0), 1.0, 0.0, false),
 RetryPolicy::new(PermissionDenied, 1, secs(0), secs(0), 1.0, 0.0, false),
 RetryPolicy::new(InvalidRequest, 1, secs(0), secs(0), 1.0, 0.0, false),
 RetryPolicy::new(ContentPolicy, 1, secs(0), secs(0), 1.0, 0.0, false),
 RetryPolicy::new(QuotaExhausted, 1, secs(0), secs(0), 1.0, 0.0, true),
 RetryPolicy::new(SubscriptionQuotaExhausted, 1, secs(0), secs(0), 1.0, 0.0, true),
 RetryPolicy::new(ModelNotFound, 1, secs(0), secs(0), 1.0, 0.0, false),
 RetryPolicy::new(AccountSuspended, 1, secs(0), secs(0), 1.0, 0.0, false),
 RetryPolicy::new(CacheUnsupported, 2, millis(100), secs(5), 2.0, 0.1, false),
 RetryPolicy::new(Other, 3, secs(1), secs(30), 2.0, 0.1, false),
 ];
 Self { policies }
 }
}

#[cfg(test)]
mod tests {
 use super::*;

 #[test]
 fn retryable_kinds_match_the_documented_list() {
 let retryable: Vec<_> = FailureKind::ALL
.iter()
.copied()
.filter(|k| k.is_retryable())
.collect();
 assert_eq!(
 retryable,
 vec![
 FailureKind::RateLimit,
 FailureKind::Overloaded,
 FailureKind::ServerError,
 FailureKind::Timeout,
 FailureKind::ConnectionError,
 FailureKind::StreamInterrupted,
 ]
 );
 }

 #[test]
 fn only_context_too_long_is_fallback_eligible() {
 let eligible: Vec<_> = FailureKind::ALL
.iter()
.copied()
.filter(|k| k.is_fallback_eligible())
.collect();
 assert_eq!(eligible, vec![FailureKind::ContextTooLong]);
 }

 #[test]
 fn table_is_total_and_consistent() {
 let table = RetryPolicyTable::default();
 for kind in FailureKind::ALL {
 let policy = table.lookup(kind);
 assert_eq!(policy.kind(), kind);
 assert!(policy.initial_delay() <= policy.max_delay());
 }
 }

 #[test]
 fn base_delay_caps_at_max_delay() {
 let policy = RetryPolicy::new(
 FailureKind::Other,
 5,
 Duration::from_secs(1),
 Duration::from_secs(10),
 2.0,
 0.0,
 false,
 );
 assert_eq!(policy.base_delay(0), Duration::from_secs(1));
 assert_eq!(policy.base_delay(1), Duration::from_secs(2));
 assert_eq!(policy.base_delay(2), Duration::from_secs(4));
 assert_eq!(policy.base_delay(3), Duration::from_secs(8));
 assert_eq!(policy.base_delay(4), Duration::from_secs(10));
 assert_eq!(policy.base_delay(10), Duration::from_secs(10));
 }

 #[test]
 #[should_panic(expected = "initial_delay must not exceed max_delay")]
 fn rejects_inverted_delay_bounds() {
 let _ = RetryPolicy::new(
 FailureKind::Other,
 1,
 Duration::from_secs(10),
 Duration::from_secs(1),
 1.0,
 0.0,
 false,
 );
 }
}
