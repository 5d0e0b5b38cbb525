/// Concrete per-request adjustments synthesized from the effective strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestModifications {
 pub max_tokens: u32,
 pub timeout_ms: u64,
 pub max_retries: Option<u32>,
 pub should_queue: bool,
 pub prefer_faster_model: bool,
 pub prefer_cheaper_model: bool,
 pub disabled_features: Vec<&'static str>,
}
