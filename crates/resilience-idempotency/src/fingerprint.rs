//! Stable key and request-fingerprint generation.

use sha2::{Digest, Sha256};

fn hex_digest(parts: &[&[u8]]) -> String {
 let mut hasher = Sha256::new();
 for part in parts {
 hasher.update(part);
 hasher.update(b"\0");
 }
 hasher
.finalize()
.iter()
.map(|b| format!("{b:02x}"))
.collect()
}

/// Generates a stable idempotency key from the operation's coordinates.
/// `params` is sorted by key before hashing so callers don't need to
/// pre-sort their maps.
pub fn generate(
 plan_id: &str,
 branch: &str,
 op_type: &str,
 params: &[(&str, &str)],
) -> String {
 let mut sorted: Vec<&(&str, &str)> = params.iter().collect();
 sorted.sort_by_key(|(k, _)| *k);
 let mut parts: Vec<&[u8]> = vec![plan_id.as_bytes(), branch.as_bytes(), op_type.as_bytes()];
 for (k, v) in &sorted {
 parts.push(k.as_bytes());
 parts.push(v.as_bytes());
 }
 hex_digest(&parts)
}

/// Fingerprints an opaque request payload. Two calls with the same bytes
/// always produce the same fingerprint.
pub fn fingerprint_request(request_data: &[u8]) -> String {
 hex_digest(&[request_data])
}
