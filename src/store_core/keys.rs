//! Key layout: `<topic-prefix>:<8 lowercase hex chars>`

use rand::RngCore;

/// Bytes of randomness behind each key token (hex-encoded to 8 chars)
const TOKEN_BYTES: usize = 4;

/// Glob pattern matching every key under `prefix`
pub fn scan_pattern(prefix: &str) -> String {
    format!("{}:*", prefix)
}

/// Fresh key for a record written under `prefix`
pub fn generate_key(prefix: &str) -> String {
    let mut token = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut token);
    format!("{}:{}", prefix, hex::encode(token))
}

/// Whether `key` lives directly under `prefix` (mirrors the `prefix:*` glob)
pub fn matches_prefix(key: &str, prefix: &str) -> bool {
    key.len() > prefix.len() && key.starts_with(prefix) && key.as_bytes()[prefix.len()] == b':'
}
