//! Record writer: persist a record under a fresh key with the client TTL

use super::client::RecordClient;
use crate::record::{Record, TIMESTAMP_FIELD};
use crate::store_core::keys::generate_key;
use crate::store_core::StoreError;
use serde_json::Value;

#[derive(Debug)]
pub enum WriteError {
    InvalidRecord(String),
    InvalidPrefix(String),
    Serialization(serde_json::Error),
    Store(StoreError),
}

impl From<serde_json::Error> for WriteError {
    fn from(err: serde_json::Error) -> Self {
        WriteError::Serialization(err)
    }
}

impl From<StoreError> for WriteError {
    fn from(err: StoreError) -> Self {
        WriteError::Store(err)
    }
}

impl std::fmt::Display for WriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteError::InvalidRecord(msg) => write!(f, "Invalid record: {}", msg),
            WriteError::InvalidPrefix(msg) => write!(f, "Invalid prefix: {}", msg),
            WriteError::Serialization(e) => write!(f, "Serialization error: {}", e),
            WriteError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for WriteError {}

impl RecordClient {
    /// Store `record` under `<prefix>:<token>` and return the generated key
    ///
    /// The record must be non-empty and carry a string `timestamp`; both are
    /// checked before the store is touched.
    pub async fn write(&self, prefix: &str, record: &Record) -> Result<String, WriteError> {
        validate_prefix(prefix)?;
        validate_record(record)?;

        let payload = record.to_json()?;
        let key = generate_key(prefix);
        self.store
            .set_with_expiry(&key, payload.as_bytes(), self.ttl_secs)
            .await?;

        log::debug!("Wrote {} (ttl={}s)", key, self.ttl_secs);
        Ok(key)
    }

    /// Same as `write`, for producers holding a loose JSON value
    pub async fn write_value(&self, prefix: &str, value: Value) -> Result<String, WriteError> {
        let record = Record::from_value(value)
            .map_err(|e| WriteError::InvalidRecord(e.to_string()))?;
        self.write(prefix, &record).await
    }
}

fn validate_prefix(prefix: &str) -> Result<(), WriteError> {
    if prefix.is_empty() {
        return Err(WriteError::InvalidPrefix("prefix cannot be empty".to_string()));
    }
    if prefix.contains(['*', '?', '[']) {
        return Err(WriteError::InvalidPrefix(format!(
            "prefix '{}' contains glob characters",
            prefix
        )));
    }
    Ok(())
}

fn validate_record(record: &Record) -> Result<(), WriteError> {
    if record.is_empty() {
        return Err(WriteError::InvalidRecord("record cannot be empty".to_string()));
    }
    if record.timestamp().is_none() {
        return Err(WriteError::InvalidRecord(format!(
            "record must carry a string '{}' field",
            TIMESTAMP_FIELD
        )));
    }
    Ok(())
}
