//! Errors returned by the retry driver.

use resilience_classifier::Classification;

/// Why [`crate::RetryDriver::with_retries`] gave up.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DriverError {
 /// The final attempt failed with a non-retryable, non-fallback-eligible
 /// classification — or a fallback-eligible classification for which no
 /// fallback target was configured.
 #[error("call failed with non-retryable failure: {0:?}")]
 Classified(Classification),

 /// The caller's [`resilience_core::CancellationToken`] fired before the
 /// call completed.
 #[error("retry driver cancelled")]
 Cancelled,

 /// Every permitted attempt (including any fallback-extended budget) was
 /// used without success.
 #[error("retry budget exhausted after {total_attempts} attempts ({total_duration_ms}ms)")]
 Exhausted {
 total_attempts: u32,
 total_duration_ms: u64,
 },
}
