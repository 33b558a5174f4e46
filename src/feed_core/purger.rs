//! Purger: best-effort deletion of every record under a prefix
//!
//! Each chunk goes through two tiers: a non-blocking bulk `unlink`, then
//! per-key deletes in one batched round-trip. Only chunks that fail both
//! tiers are reported as failed.

use super::client::RecordClient;
use crate::store_core::BATCH_SIZE;

/// Outcome of a `clear` call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PurgeReport {
    /// Keys found by the scan
    pub scanned: usize,
    /// Keys the store reported as removed
    pub deleted: usize,
    /// Chunks that needed the per-key fallback
    pub fallback_chunks: usize,
    /// Keys left behind because both tiers failed
    pub failed_keys: Vec<String>,
    pub scan_failed: bool,
}

impl PurgeReport {
    pub fn is_complete(&self) -> bool {
        !self.scan_failed && self.failed_keys.is_empty()
    }
}

impl RecordClient {
    /// Delete every key under `prefix`; never returns an error
    ///
    /// Keys from successfully deleted chunks leave the seen-set, so a
    /// record rewritten under the same key later counts as new again.
    pub async fn clear(&mut self, prefix: &str) -> PurgeReport {
        let keys = match self.store.scan_keys(prefix).await {
            Ok(keys) => keys,
            Err(e) => {
                log::error!("❌ Error scanning keys for prefix={}: {}", prefix, e);
                return PurgeReport {
                    scan_failed: true,
                    ..Default::default()
                };
            }
        };

        let mut report = PurgeReport {
            scanned: keys.len(),
            ..Default::default()
        };
        if keys.is_empty() {
            return report;
        }

        for chunk in keys.chunks(BATCH_SIZE) {
            let removed = match self.store.unlink(chunk).await {
                Ok(n) => {
                    log::info!("🗑️  Deleted {} keys for prefix={}", chunk.len(), prefix);
                    Some(n)
                }
                Err(e) => {
                    log::warn!(
                        "⚠️  Bulk delete of {} keys failed for prefix={} ({}), retrying per key",
                        chunk.len(),
                        prefix,
                        e
                    );
                    match self.store.delete_each(chunk).await {
                        Ok(n) => {
                            report.fallback_chunks += 1;
                            log::info!(
                                "🗑️  Deleted {} keys (per-key fallback) for prefix={}",
                                chunk.len(),
                                prefix
                            );
                            Some(n)
                        }
                        Err(e) => {
                            log::error!("❌ Error deleting keys for prefix={}: {}", prefix, e);
                            None
                        }
                    }
                }
            };

            match removed {
                Some(n) => {
                    report.deleted += n;
                    for key in chunk {
                        self.seen.remove(key);
                    }
                }
                None => report.failed_keys.extend(chunk.iter().cloned()),
            }
        }

        report
    }
}
