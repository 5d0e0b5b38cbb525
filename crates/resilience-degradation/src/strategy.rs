use crate::level::DegradationLevel;

/// The fixed per-level effect table.
#[derive(Debug, Clone, Copy)]
pub struct Strategy {
 pub context_reduction_pct: u8,
 pub max_context_tokens: Option<u32>,
 pub timeout_multiplier: f64,
 pub disabled_features: &'static [&'static str],
 pub max_concurrent_requests: Option<u32>,
 pub queue_non_urgent: bool,
 pub prefer_faster_model: bool,
 pub prefer_cheaper_model: bool,
 pub reduce_retries: bool,
 pub max_retries: Option<u32>,
}

/// Looks up the frozen strategy for a level. Total over [`DegradationLevel`].
pub fn strategy_for(level: DegradationLevel) -> Strategy {
 match level {
 DegradationLevel::None => Strategy {
 context_reduction_pct: 0,
 max_context_tokens: None,
 timeout_multiplier: 1.0,
 disabled_features: &[],
 max_concurrent_requests: None,
 queue_non_urgent: false,
 prefer_faster_model: false,
 prefer_cheaper_model: false,
 reduce_retries: false,
 max_retries: None,
 },
 DegradationLevel::Light => Strategy {
 context_reduction_pct: 10,
 max_context_tokens: None,
 timeout_multiplier: 1.5,
 disabled_features: &[],
 max_concurrent_requests: None,
 queue_non_urgent: false,
 prefer_faster_model: false,
 prefer_cheaper_model: false,
 reduce_retries: false,
 max_retries: None,
 },
 DegradationLevel::Moderate => Strategy {
 context_reduction_pct: 25,
 max_context_tokens: None,
 timeout_multiplier: 2.0,
 disabled_features: &["caching"],
 max_concurrent_requests: Some(5),
 queue_non_urgent: false,
 prefer_faster_model: true,
 prefer_cheaper_model: false,
 reduce_retries: false,
 max_retries: None,
 },
 DegradationLevel::Heavy => Strategy {
 context_reduction_pct: 50,
 max_context_tokens: None,
 timeout_multiplier: 3.0,
 disabled_features: &["caching", "stream"],
 max_concurrent_requests: Some(2),
 queue_non_urgent: true,
 prefer_faster_model: true,
 prefer_cheaper_model: true,
 reduce_retries: true,
 max_retries: Some(2),
 },
 DegradationLevel::Critical => Strategy {
 context_reduction_pct: 0,
 max_context_tokens: Some(4_000),
 timeout_multiplier: 5.0,
 disabled_features: &["caching", "stream", "parallel"],
 max_concurrent_requests: Some(1),
 queue_non_urgent: true,
 prefer_faster_model: true,
 prefer_cheaper_model: true,
 reduce_retries: true,
 max_retries: Some(1),
 },
 }
}

#[cfg(test)]
mod tests {
 use super::*;

 #[test]
 fn critical_caps_tokens_instead_of_percentage_cut() {
 let s = strategy_for(DegradationLevel::Critical);
 assert_eq!(s.context_reduction_pct, 0);
 assert_eq!(s.max_context_tokens, Some(4_000));
 }

 #[test]
 fn none_is_a_no_op_strategy() {
 let s = strategy_for(DegradationLevel::None);
 assert_eq!(s.timeout_multiplier, 1.0);
 assert!(s.disabled_features.is_empty());
 assert!(!s.queue_non_urgent);
 }
}
