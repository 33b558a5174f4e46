//! Store backend trait
//!
//! Defines the typed operations the feed layer needs from a TTL-capable
//! key-value store. Every method is a single round-trip; chunking and retry
//! policy live in the callers.

use async_trait::async_trait;

/// Maximum keys per multi-get / multi-delete round-trip
pub const BATCH_SIZE: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Store unreachable, connection dropped or timed out
    Unavailable(String),
    /// Store reachable but the command was rejected
    Command(String),
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error()
            || err.is_connection_dropped()
            || err.is_connection_refusal()
            || err.is_timeout()
        {
            StoreError::Unavailable(err.to_string())
        } else {
            StoreError::Command(err.to_string())
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable(e) => write!(f, "Store unavailable: {}", e),
            StoreError::Command(e) => write!(f, "Store command failed: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

/// Backend trait for the key-value store holding records
#[async_trait]
pub trait KvStore: Send + Sync {
    /// All keys currently matching `<prefix>:*`, in no particular order
    async fn scan_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Values for `keys` in one round-trip; absent keys map to `None`
    async fn multi_get(&self, keys: &[String]) -> Result<Vec<(String, Option<Vec<u8>>)>, StoreError>;

    /// Non-blocking bulk delete; returns how many keys existed
    async fn unlink(&self, keys: &[String]) -> Result<usize, StoreError>;

    /// Per-key deletes batched into one round-trip
    async fn delete_each(&self, keys: &[String]) -> Result<usize, StoreError>;

    /// Write a value that the store expires after `ttl_secs`
    async fn set_with_expiry(&self, key: &str, value: &[u8], ttl_secs: u64) -> Result<(), StoreError>;

    /// Get backend type for logging
    fn backend_type(&self) -> &'static str;
}
