//! Store Core - typed access to the TTL key-value store
//!
//! ```text
//! RecordClient (feed_core)
//!     ↓
//! KvStore trait (scan / multi-get / unlink / delete_each / set-with-expiry)
//!     ↓
//! RedisStore (production) | MemoryStore (local runs, tests)
//! ```

pub mod backend;
pub mod config;
pub mod keys;
pub mod memory_store;
pub mod redis_store;

pub use backend::{KvStore, StoreError, BATCH_SIZE};
pub use config::{ConfigError, StoreConfig};
pub use memory_store::MemoryStore;
pub use redis_store::RedisStore;
