//! In-process backend with the same TTL semantics as Redis
//!
//! Expired entries are dropped lazily whenever the map is touched. Handy for
//! local runs without a server and for exercising the feed layer in tests.

use super::backend::{KvStore, StoreError};
use super::keys::matches_prefix;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) keys
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.read().await.values().filter(|e| e.is_live(now)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Store a value under an exact key, bypassing record encoding
    pub async fn insert_raw(&self, key: &str, value: &[u8], ttl: Duration) {
        self.entries.write().await.insert(
            key.to_string(),
            Entry {
                value: value.to_vec(),
                expires_at: Instant::now() + ttl,
            },
        );
    }

    async fn remove_keys(&self, keys: &[String]) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        keys.iter()
            .filter_map(|k| entries.remove(k))
            .filter(|e| e.is_live(now))
            .count()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn scan_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, e| e.is_live(now));

        Ok(entries
            .keys()
            .filter(|k| matches_prefix(k, prefix))
            .cloned()
            .collect())
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<(String, Option<Vec<u8>>)>, StoreError> {
        let now = Instant::now();
        let entries = self.entries.read().await;

        Ok(keys
            .iter()
            .map(|k| {
                let value = entries
                    .get(k)
                    .filter(|e| e.is_live(now))
                    .map(|e| e.value.clone());
                (k.clone(), value)
            })
            .collect())
    }

    async fn unlink(&self, keys: &[String]) -> Result<usize, StoreError> {
        Ok(self.remove_keys(keys).await)
    }

    async fn delete_each(&self, keys: &[String]) -> Result<usize, StoreError> {
        Ok(self.remove_keys(keys).await)
    }

    async fn set_with_expiry(&self, key: &str, value: &[u8], ttl_secs: u64) -> Result<(), StoreError> {
        self.insert_raw(key, value, Duration::from_secs(ttl_secs)).await;
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "Memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scan_respects_prefix() {
        let store = MemoryStore::new();
        store.set_with_expiry("prices:aaaa0001", b"{}", 60).await.unwrap();
        store.set_with_expiry("prices:aaaa0002", b"{}", 60).await.unwrap();
        store.set_with_expiry("algos:aaaa0003", b"{}", 60).await.unwrap();

        let mut keys = store.scan_keys("prices").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["prices:aaaa0001", "prices:aaaa0002"]);
    }

    #[tokio::test]
    async fn test_expired_entries_disappear() {
        let store = MemoryStore::new();
        store.insert_raw("prices:old", b"{}", Duration::ZERO).await;
        store.set_with_expiry("prices:new", b"{}", 60).await.unwrap();

        assert_eq!(store.scan_keys("prices").await.unwrap(), vec!["prices:new"]);
        let values = store.multi_get(&["prices:old".to_string()]).await.unwrap();
        assert_eq!(values[0].1, None);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_multi_get_and_delete() {
        let store = MemoryStore::new();
        store.set_with_expiry("prices:a", b"1", 60).await.unwrap();

        let keys = vec!["prices:a".to_string(), "prices:missing".to_string()];
        let values = store.multi_get(&keys).await.unwrap();
        assert_eq!(values[0], ("prices:a".to_string(), Some(b"1".to_vec())));
        assert_eq!(values[1], ("prices:missing".to_string(), None));
        assert!(store.multi_get(&[]).await.unwrap().is_empty());

        assert_eq!(store.unlink(&keys).await.unwrap(), 1);
        assert!(store.is_empty().await);
    }
}
