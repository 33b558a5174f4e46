//! tickstore - timestamped records in a TTL key-value store
//!
//! Producers write JSON records under `<topic>:<token>` keys that expire on
//! their own. Consumers read everything under a topic in one sorted batch,
//! stream records as they appear, or purge a topic. `movement` turns a
//! stream of prices into a rolling percentage move.

pub mod config_docs;
pub mod feed_core;
pub mod movement;
pub mod query;
pub mod record;
pub mod store_core;

pub use feed_core::{ChangeStream, PurgeReport, RecordClient, WriteError};
pub use movement::{updown, Direction, TimeBasedMovement};
pub use record::{Record, RecordError};
pub use store_core::{KvStore, MemoryStore, RedisStore, StoreConfig, StoreError};
