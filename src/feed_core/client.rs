//! Per-consumer handle onto the record store
//!
//! A `RecordClient` owns the consumer's seen-set. It is meant to live in
//! exactly one task: bulk reads, polls and purges all take `&mut self`, and
//! `stream_new` consumes the client so the background poller becomes its
//! sole owner.

use crate::store_core::config::DEFAULT_TTL_SECS;
use crate::store_core::KvStore;
use std::collections::HashSet;
use std::sync::Arc;

pub struct RecordClient {
    pub(super) store: Arc<dyn KvStore>,
    pub(super) ttl_secs: u64,
    /// Keys already delivered to this consumer
    pub(super) seen: HashSet<String>,
}

impl RecordClient {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self::with_ttl(store, DEFAULT_TTL_SECS)
    }

    /// Create a client whose writes expire after `ttl_secs`
    pub fn with_ttl(store: Arc<dyn KvStore>, ttl_secs: u64) -> Self {
        Self {
            store,
            ttl_secs,
            seen: HashSet::new(),
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    pub fn is_seen(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    pub fn backend_type(&self) -> &'static str {
        self.store.backend_type()
    }
}
