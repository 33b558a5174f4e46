//! Change streamer: continuously deliver records not yet seen by a client
//!
//! The polling loop runs in one dedicated tokio task that owns the
//! `RecordClient`, so the seen-set is never touched from two places at once.
//! The loop stops when its `CancellationToken` fires or when the
//! `ChangeStream` is dropped. Each stream runs on a child of the token it
//! was given, so one stream going away never stops its siblings.

use super::client::RecordClient;
use crate::record::Record;
use crate::store_core::{StoreError, BATCH_SIZE};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Delay between two scans of the prefix
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Records buffered between the poller and a slow consumer
const CHANNEL_CAPACITY: usize = 1024;

impl RecordClient {
    /// One polling iteration: fetch and decode every unseen key under `prefix`
    ///
    /// Keys are marked seen only after their values were fetched, so a
    /// transport failure leaves the batch to be picked up by the next poll.
    /// Undecodable or vanished values stay seen and are never retried.
    pub async fn poll_new(&mut self, prefix: &str) -> Result<Vec<Record>, StoreError> {
        let fetched = self.fetch_unseen(prefix).await?;

        let mut records = Vec::with_capacity(fetched.len());
        for (key, record) in fetched {
            self.seen.insert(key);
            records.push(record);
        }
        Ok(records)
    }

    /// Decoded records for unseen keys, paired with their key and not yet
    /// marked seen. Dead keys (vanished or undecodable) are marked here.
    async fn fetch_unseen(&mut self, prefix: &str) -> Result<Vec<(String, Record)>, StoreError> {
        let fresh: Vec<String> = self
            .store
            .scan_keys(prefix)
            .await?
            .into_iter()
            .filter(|k| !self.seen.contains(k))
            .collect();

        if fresh.is_empty() {
            return Ok(Vec::new());
        }

        let mut fetched = Vec::with_capacity(fresh.len());
        for chunk in fresh.chunks(BATCH_SIZE) {
            fetched.extend(self.store.multi_get(chunk).await?);
        }

        let mut records = Vec::with_capacity(fetched.len());
        for (key, raw) in fetched {
            let Some(raw) = raw else {
                log::debug!("Key {} expired before it could be read", key);
                self.seen.insert(key);
                continue;
            };

            match Record::from_slice(&raw) {
                Ok(record) => records.push((key, record)),
                Err(e) => {
                    log::warn!("⚠️  Decode error for key={}: {}", key, e);
                    self.seen.insert(key);
                }
            }
        }

        log::debug!("Poll of prefix={} found {} new records", prefix, records.len());
        Ok(records)
    }

    /// Move this client into a background poller streaming new records
    ///
    /// Keys already seen (e.g. by a prior `read_all`) are not delivered
    /// again. Cancelling `cancel` stops the poller; so do
    /// `ChangeStream::stop` and dropping the stream, which only cancel a
    /// child of `cancel` and leave other holders of the token running.
    pub fn stream_new(self, prefix: impl Into<String>, cancel: CancellationToken) -> ChangeStream {
        let prefix = prefix.into();
        let cancel = cancel.child_token();
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        log::info!(
            "📡 Streaming new records under {}:* ({} keys already seen)",
            prefix,
            self.seen.len()
        );

        let handle = tokio::spawn(run_poller(self, prefix, tx, cancel.clone()));

        ChangeStream {
            rx,
            cancel: cancel.clone(),
            _guard: cancel.drop_guard(),
            handle,
        }
    }
}

async fn run_poller(
    mut client: RecordClient,
    prefix: String,
    tx: mpsc::Sender<(String, Record)>,
    cancel: CancellationToken,
) -> RecordClient {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = sleep(POLL_INTERVAL) => {}
        }

        let polled = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            polled = client.fetch_unseen(&prefix) => polled,
        };

        let records = match polled {
            Ok(records) => records,
            Err(e) => {
                log::error!("❌ Poll failed for prefix={}: {}", prefix, e);
                continue;
            }
        };

        // A key counts as seen once its record is in the channel; anything
        // not sent here is picked up again by a later poll
        for (key, record) in records {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return client,
                sent = tx.send((key.clone(), record)) => {
                    if sent.is_err() {
                        log::info!("Consumer for prefix={} went away, stopping poller", prefix);
                        return client;
                    }
                    client.seen.insert(key);
                }
            }
        }
    }

    log::info!("🛑 Streamer for prefix={} cancelled", prefix);
    client
}

/// Receiving end of a background change streamer
pub struct ChangeStream {
    rx: mpsc::Receiver<(String, Record)>,
    cancel: CancellationToken,
    _guard: DropGuard,
    handle: JoinHandle<RecordClient>,
}

impl ChangeStream {
    /// Next new record; `None` once the poller has stopped
    pub async fn recv(&mut self) -> Option<Record> {
        self.rx.recv().await.map(|(_, record)| record)
    }

    /// Ask the poller to stop without waiting for it
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stop the poller and take back the client with its seen-set
    ///
    /// Records still buffered and never received are forgotten by the
    /// returned client, so it delivers them again on its next poll.
    /// Returns `None` if the poller task panicked.
    pub async fn stop(mut self) -> Option<RecordClient> {
        self.cancel.cancel();
        let mut client = match (&mut self.handle).await {
            Ok(client) => client,
            Err(e) => {
                log::error!("❌ Streamer task failed: {}", e);
                return None;
            }
        };

        let mut undelivered = 0;
        while let Ok((key, _)) = self.rx.try_recv() {
            client.seen.remove(&key);
            undelivered += 1;
        }
        if undelivered > 0 {
            log::debug!("Returning {} undelivered keys to the unseen pool", undelivered);
        }

        Some(client)
    }
}
