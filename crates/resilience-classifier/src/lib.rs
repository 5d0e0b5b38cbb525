//! Failure classifier.
//! Maps a raw transport-layer error — optionally carrying an HTTP status,
//! response headers, and a body — to a [`FailureKind`] plus an optional
//! retry-after hint. When no HTTP context is available (a bare transport
//! error), classification falls back to message/body pattern matching only.
//! A single ordered algorithm backed by the shared [`FailureKind`] taxonomy
//! from `resilience-core` instead of a local ad hoc enum.

use resilience_core::FailureKind;
use std::time::Duration;

/// A case-insensitive, order-preserving header lookup.
/// Kept deliberately minimal (no dependency on an HTTP crate) since the
/// streaming client interface is external to this core — callers
/// adapt whatever header representation their transport uses into this type.
#[derive(Debug, Clone, Default)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
 pub fn new() -> Self {
 Self(Vec::new())
 }

 pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
 self.0.push((name.into(), value.into()));
 self
 }

 pub fn get(&self, name: &str) -> Option<&str> {
 self.0
.iter()
.find(|(n, _)| n.eq_ignore_ascii_case(name))
.map(|(_, v)| v.as_str())
 }
}

impl FromIterator<(String, String)> for Headers {
 fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
 Self(iter.into_iter().collect())
 }
}

/// Input to [`classify`]. All fields besides `body` are optional because a
/// bare transport error (connection refused, DNS failure) carries no HTTP
/// context at all.
#[derive(Debug, Clone, Default)]
pub struct ClassifierInput<'a> {
 pub http_status: Option<u16>,
 pub headers: Option<&'a Headers>,
 pub body: &'a str,
 /// Set by the caller when the active request is billed against a
 /// subscription-tier quota rather than pay-as-you-go.
 pub is_subscription: bool,
}

/// Configuration for the classifier.
#[derive(Debug, Clone, Copy)]
pub struct ClassifierConfig {
 /// Retry-after hints beyond this ceiling demote an otherwise-retryable
 /// kind to non-retryable for the current attempt.
 pub max_retry_delay: Duration,
}

impl Default for ClassifierConfig {
 fn default() -> Self {
 Self {
 max_retry_delay: Duration::from_secs(600),
 }
 }
}

/// The result of classifying one failure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
 pub kind: FailureKind,
 /// Whether this specific occurrence should be retried — distinct from
 /// `kind.is_retryable()`, since a retry-after hint above the ceiling, or
 /// a subscription-quota hint below it, can override the kind's default.
 pub retryable: bool,
 pub retry_after: Option<Duration>,
}

const CONTEXT_TOO_LONG_PATTERNS: &[&str] = &[
 "maximum context length",
 "context length exceeded",
 "too many tokens",
 "payload too large",
 "input is too long",
];

const OVERLOADED_PATTERNS: &[&str] = &[
 "model overloaded",
 "server is overloaded",
 "overloaded_error",
 "resource has been exhausted",
];

const CACHE_UNSUPPORTED_PATTERNS: &[&str] = &["cache control"];

/// Classifies a single failure using the ordered algorithm below.
pub fn classify(config: &ClassifierConfig, input: &ClassifierInput<'_>) -> Classification {
 let body_lower = input.body.to_lowercase();
 let retry_after = extract_retry_after(input, &body_lower);

 // Step 1: subscription quota short-circuit.
 if input.is_subscription && input.http_status == Some(429) {
 let retryable = matches!(retry_after, Some(d) if d <= config.max_retry_delay);
 return Classification {
 kind: FailureKind::SubscriptionQuotaExhausted,
 retryable,
 retry_after,
 };
 }

 // Step 2: context-too-long body patterns.
 if CONTEXT_TOO_LONG_PATTERNS
.iter()
.any(|p| body_lower.contains(p))
 {
 return Classification {
 kind: FailureKind::ContextTooLong,
 retryable: false,
 retry_after,
 };
 }

 // Step 3: overloaded body patterns.
 if OVERLOADED_PATTERNS.iter().any(|p| body_lower.contains(p)) {
 return finalize(config, FailureKind::Overloaded, retry_after);
 }

 // Step 4: cache-unsupported body patterns.
 if CACHE_UNSUPPORTED_PATTERNS
.iter()
.any(|p| body_lower.contains(p))
 {
 return finalize(config, FailureKind::CacheUnsupported, retry_after);
 }

 // Step 5: HTTP status mapping.
 let kind = match input.http_status {
 Some(429) | Some(529) => FailureKind::RateLimit,
 Some(413) => FailureKind::ContextTooLong,
 Some(401) => FailureKind::AuthInvalid,
 Some(403) => FailureKind::PermissionDenied,
 Some(400) if body_lower.contains("reduce the length of the messages") => {
 FailureKind::ContextTooLong
 }
 Some(404) => FailureKind::ModelNotFound,
 Some(501) | Some(505) => {
 return Classification {
 kind: FailureKind::Other,
 retryable: false,
 retry_after,
 };
 }
 Some(status) if status >= 500 => FailureKind::Other,
 None if body_lower.contains("provider returned error") => FailureKind::Other,
 _ => {
 return Classification {
 kind: FailureKind::Other,
 retryable: false,
 retry_after,
 };
 }
 };

 finalize(config, kind, retry_after)
}

/// Applies step 7's retry-after ceiling to a kind whose retryability so far
/// follows its default from [`FailureKind::is_retryable`].
fn finalize(
 config: &ClassifierConfig,
 kind: FailureKind,
 retry_after: Option<Duration>,
) -> Classification {
 let mut retryable = kind.is_retryable();
 if let Some(hint) = retry_after {
 if hint > config.max_retry_delay {
 retryable = false;
 }
 }
 Classification {
 kind,
 retryable,
 retry_after,
 }
}

/// Extracts a retry-after hint, checking headers before falling back to
/// free-text body parsing, normalized to seconds-as-[`Duration`].
fn extract_retry_after(input: &ClassifierInput<'_>, body_lower: &str) -> Option<Duration> {
 if let Some(headers) = input.headers {
 if let Some(v) = headers.get("retry-after") {
 if let Some(d) = parse_retry_after_header(v) {
 return Some(d);
 }
 }
 if let Some(v) = headers.get("x-ratelimit-reset") {
 if let Ok(epoch) = v.trim().parse::<i64>() {
 let now = chrono::Utc::now().timestamp();
 let delta = epoch - now;
 if delta > 0 {
 return Some(Duration::from_secs(delta as u64));
 }
 return Some(Duration::from_secs(0));
 }
 }
 }

 if let Some(ms) = extract_json_field_ms(input.body, "retry_after_ms") {
 return Some(Duration::from_millis(ms));
 }

 if let Some(d) = extract_free_text_duration(body_lower, "retry after") {
 return Some(d);
 }
 if let Some(d) = extract_free_text_duration(body_lower, "try again in") {
 return Some(d);
 }

 None
}

/// `Retry-After` may be an integer number of seconds or an RFC 1123 date.
fn parse_retry_after_header(value: &str) -> Option<Duration> {
 let trimmed = value.trim();
 if let Ok(secs) = trimmed.parse::<u64>() {
 return Some(Duration::from_secs(secs));
 }
 if let Ok(when) = chrono::DateTime::parse_from_rfc2822(trimmed) {
 let now = chrono::Utc::now();
 let delta = when.with_timezone(&chrono::Utc) - now;
 let secs = delta.num_milliseconds().max(0) as u64;
 return Some(Duration::from_millis(secs));
 }
 None
}

/// Finds `"<key>": <number>` in a (possibly non-JSON-parseable) body without
/// pulling in a JSON parser purely for this one field — the body may not be
/// valid JSON at all (some providers wrap it in prose).
fn extract_json_field_ms(body: &str, key: &str) -> Option<u64> {
 let needle = format!("\"{key}\"");
 let idx = body.find(&needle)?;
 let after_key = &body[idx + needle.len().];
 let colon = after_key.find(':')?;
 let rest = after_key[colon + 1.].trim_start();
 let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
 if digits.is_empty() {
 return None;
 }
 digits.parse::<u64>().ok()
}

/// Matches `"<prefix> N[ms|s]"` in free text, e.g. "retry after 12 seconds"
/// or "try again in 500ms".
fn extract_free_text_duration(body_lower: &str, prefix: &str) -> Option<Duration> {
 let idx = body_lower.find(prefix)?;
 let rest = body_lower[idx + prefix.len().].trim_start();
 let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
 if digits.is_empty() {
 return None;
 }
 let number: u64 = digits.parse().ok()?;
 let after_digits = rest[digits.len().].trim_start();
 if after_digits.starts_with("ms") {
 Some(Duration::from_millis(number))
 } else {
 // Covers "s", "sec", "secs", "second", "seconds", or no unit at all.
 Some(Duration::from_secs(number))
 }
}
