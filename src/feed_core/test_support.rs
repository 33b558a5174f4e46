//! Failure-injecting store wrapper for feed tests

use crate::store_core::{KvStore, MemoryStore, StoreError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_scan: AtomicBool,
    fail_multi_get: AtomicBool,
    fail_unlink: AtomicBool,
    fail_delete_each: AtomicBool,
    pub scan_calls: AtomicUsize,
    pub multi_get_calls: AtomicUsize,
    pub unlink_calls: AtomicUsize,
    pub delete_each_calls: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_scan(&self, fail: bool) {
        self.fail_scan.store(fail, Ordering::SeqCst);
    }

    pub fn fail_multi_get(&self, fail: bool) {
        self.fail_multi_get.store(fail, Ordering::SeqCst);
    }

    pub fn fail_unlink(&self, fail: bool) {
        self.fail_unlink.store(fail, Ordering::SeqCst);
    }

    pub fn fail_delete_each(&self, fail: bool) {
        self.fail_delete_each.store(fail, Ordering::SeqCst);
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn check(flag: &AtomicBool, op: &str) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable(format!("injected {} failure", op)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KvStore for FlakyStore {
    async fn scan_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        self.scan_calls.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_scan, "scan")?;
        self.inner.scan_keys(prefix).await
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<(String, Option<Vec<u8>>)>, StoreError> {
        self.multi_get_calls.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_multi_get, "multi_get")?;
        self.inner.multi_get(keys).await
    }

    async fn unlink(&self, keys: &[String]) -> Result<usize, StoreError> {
        self.unlink_calls.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_unlink, "unlink")?;
        self.inner.unlink(keys).await
    }

    async fn delete_each(&self, keys: &[String]) -> Result<usize, StoreError> {
        self.delete_each_calls.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_delete_each, "delete_each")?;
        self.inner.delete_each(keys).await
    }

    async fn set_with_expiry(&self, key: &str, value: &[u8], ttl_secs: u64) -> Result<(), StoreError> {
        self.inner.set_with_expiry(key, value, ttl_secs).await
    }

    fn backend_type(&self) -> &'static str {
        "Flaky"
    }
}
