//! Redis backend for the record store
//!
//! Uses a multiplexed `ConnectionManager`, which reconnects on its own and is
//! cheap to clone per call, so the store can be shared as `Arc<dyn KvStore>`.

use super::backend::{KvStore, StoreError};
use super::keys::scan_pattern;
use async_trait::async_trait;
use redis::aio::ConnectionManager;

/// Keys requested per SCAN step
const SCAN_COUNT: usize = 1000;

pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Open a connection manager for `url` (e.g. `redis://127.0.0.1:6379/0`)
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;

        log::info!("🔌 Connected to Redis: {}", url);
        Ok(Self { conn })
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn scan_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn.clone();
        let pattern = scan_pattern(prefix);
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await?;

            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN may return a key more than once while the keyspace rehashes
        keys.sort_unstable();
        keys.dedup();

        log::debug!("SCAN {} -> {} keys", pattern, keys.len());
        Ok(keys)
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<(String, Option<Vec<u8>>)>, StoreError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn.clone();
        let values: Vec<Option<Vec<u8>>> = redis::cmd("MGET")
            .arg(keys)
            .query_async(&mut conn)
            .await?;

        Ok(keys.iter().cloned().zip(values).collect())
    }

    async fn unlink(&self, keys: &[String]) -> Result<usize, StoreError> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.clone();
        let removed: usize = redis::cmd("UNLINK").arg(keys).query_async(&mut conn).await?;
        Ok(removed)
    }

    async fn delete_each(&self, keys: &[String]) -> Result<usize, StoreError> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.clone();
        let mut pipe = redis::pipe();
        for key in keys {
            pipe.cmd("DEL").arg(key);
        }

        let removed: Vec<usize> = pipe.query_async(&mut conn).await?;
        Ok(removed.into_iter().sum())
    }

    async fn set_with_expiry(&self, key: &str, value: &[u8], ttl_secs: u64) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl_secs)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "Redis"
    }
}
