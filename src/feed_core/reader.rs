//! Bulk reader: every record currently stored under a prefix

use super::client::RecordClient;
use crate::record::Record;
use crate::store_core::{StoreError, BATCH_SIZE};

impl RecordClient {
    /// Read all records under `prefix`, ordered by `timestamp`
    ///
    /// Every scanned key is marked seen, so a streamer started from this
    /// client afterwards only delivers records written later. Values that do
    /// not decode are logged and skipped. Only store transport failures are
    /// returned as errors.
    pub async fn read_all(&mut self, prefix: &str) -> Result<Vec<Record>, StoreError> {
        let keys = self.store.scan_keys(prefix).await?;
        if keys.is_empty() {
            log::debug!("No keys found for prefix={}", prefix);
            return Ok(Vec::new());
        }

        self.seen.extend(keys.iter().cloned());

        let mut records = Vec::with_capacity(keys.len());
        let mut decode_errors = 0usize;

        for chunk in keys.chunks(BATCH_SIZE) {
            for (key, raw) in self.store.multi_get(chunk).await? {
                let Some(raw) = raw else {
                    continue;
                };

                match Record::from_slice(&raw) {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        decode_errors += 1;
                        log::warn!("⚠️  Decode error for key={} (prefix={}): {}", key, prefix, e);
                    }
                }
            }
        }

        sort_by_timestamp(&mut records);

        log::debug!(
            "Read {} records for prefix={} ({} keys, {} decode errors)",
            records.len(),
            prefix,
            keys.len(),
            decode_errors
        );
        Ok(records)
    }
}

/// Stable sort by the `timestamp` string; records without one sort first
pub fn sort_by_timestamp(records: &mut [Record]) {
    records.sort_by(|a, b| a.sort_key().cmp(b.sort_key()));
}
