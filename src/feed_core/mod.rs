//! Feed Core - consumer-side access to records in the store
//!
//! # Architecture
//!
//! ```text
//! producer → RecordClient::write ─→ KvStore (TTL) ─┬→ RecordClient::read_all   (bulk, sorted)
//!                                                  ├→ RecordClient::stream_new (polling, deduplicated)
//!                                                  └→ RecordClient::clear      (chunked, two-tier delete)
//! ```
//!
//! Every operation hangs off one `RecordClient`, which owns the consumer's
//! seen-set.

pub mod client;
pub mod purger;
pub mod reader;
pub mod streamer;
pub mod writer;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::RecordClient;
pub use purger::PurgeReport;
pub use reader::sort_by_timestamp;
pub use streamer::{ChangeStream, POLL_INTERVAL};
pub use writer::WriteError;
