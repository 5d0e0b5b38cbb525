use sha2::{Digest, Sha256};

/// First 8 bytes of a SHA-256 over `content`, hex-encoded to 16 characters.
pub fn checkpoint_hash(content: &str) -> String {
 let digest = Sha256::digest(content.as_bytes());
 digest[..8].iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
 use super::*;

 #[test]
 fn hash_is_sixteen_hex_chars() {
 let hash = checkpoint_hash("hello world");
 assert_eq!(hash.len(), 16);
 assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
 }

 #[test]
 fn hash_is_deterministic() {
 assert_eq!(checkpoint_hash("abc"), checkpoint_hash("abc"));
 }

 #[test]
 fn different_content_hashes_differently() {
 assert_ne!(checkpoint_hash("abc"), checkpoint_hash("abd"));
 }
}
