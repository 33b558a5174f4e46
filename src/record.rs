//! Schemaless record model stored under topic-prefixed keys
//!
//! A record is an ordered JSON object. The only field the crate relies on is
//! `timestamp` (an ISO-8601 string), which orders bulk reads and feeds the
//! movement calculator.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::America::New_York;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const TIMESTAMP_FIELD: &str = "timestamp";

#[derive(Debug)]
pub enum RecordError {
    Json(serde_json::Error),
    Utf8(std::str::Utf8Error),
    NotAnObject,
}

impl From<serde_json::Error> for RecordError {
    fn from(err: serde_json::Error) -> Self {
        RecordError::Json(err)
    }
}

impl From<std::str::Utf8Error> for RecordError {
    fn from(err: std::str::Utf8Error) -> Self {
        RecordError::Utf8(err)
    }
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordError::Json(e) => write!(f, "JSON decode error: {}", e),
            RecordError::Utf8(e) => write!(f, "UTF-8 decode error: {}", e),
            RecordError::NotAnObject => write!(f, "record must be a JSON object"),
        }
    }
}

impl std::error::Error for RecordError {}

/// A single stored record: field name -> scalar JSON value, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style field insertion, used by producers and tests
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Accept a loose JSON value, rejecting anything that is not an object
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(RecordError::NotAnObject),
        }
    }

    /// Decode raw bytes fetched from the store
    pub fn from_slice(raw: &[u8]) -> Result<Self, RecordError> {
        let text = std::str::from_utf8(raw)?;
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// The raw `timestamp` string, if present and a string
    pub fn timestamp(&self) -> Option<&str> {
        self.0.get(TIMESTAMP_FIELD).and_then(Value::as_str)
    }

    /// Ordering key for bulk reads: unusable timestamps sort as ""
    pub fn sort_key(&self) -> &str {
        self.timestamp().unwrap_or("")
    }

    /// Parsed `timestamp`, for callers that need real time arithmetic
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp().and_then(parse_timestamp)
    }

    /// Numeric view of a field (numbers or numeric strings)
    pub fn get_f64(&self, field: &str) -> Option<f64> {
        match self.0.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Record {
    type Error = RecordError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Record::from_value(value)
    }
}

/// Parse an ISO-8601 timestamp; offset-less values are taken as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(naive) => Some(naive.and_utc()),
        Err(e) => {
            log::debug!("Error converting '{}' to datetime: {}", raw, e);
            None
        }
    }
}

pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Wall-clock New York time for a UTC timestamp, as `YYYY-MM-DD HH:MM:SS`
pub fn to_new_york(raw: &str) -> Option<String> {
    let utc = parse_timestamp(raw)?;
    Some(utc.with_timezone(&New_York).format("%Y-%m-%d %H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_decode_object() {
        let raw = br#"{"instrument":"EURUSD","timestamp":"2024-01-01T00:00:00Z","price":1.10}"#;
        let record = Record::from_slice(raw).unwrap();

        assert_eq!(record.timestamp(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(record.get_f64("price"), Some(1.10));
        let fields: Vec<&String> = record.fields().collect();
        assert_eq!(fields, vec!["instrument", "timestamp", "price"]);
    }

    #[test]
    fn test_decode_rejects_non_object() {
        assert!(matches!(Record::from_slice(b"[1,2,3]"), Err(RecordError::NotAnObject)));
        assert!(matches!(Record::from_slice(b"not json"), Err(RecordError::Json(_))));
        assert!(matches!(Record::from_slice(&[0xff, 0xfe]), Err(RecordError::Utf8(_))));
    }

    #[test]
    fn test_sort_key_for_unusable_timestamp() {
        let numeric_ts = Record::from_value(json!({"timestamp": 17})).unwrap();
        let missing_ts = Record::new().with("price", 1.0);

        assert_eq!(numeric_ts.sort_key(), "");
        assert_eq!(missing_ts.sort_key(), "");
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 0, 1, 0).unwrap();

        assert_eq!(parse_timestamp("2024-01-01T00:01:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01T01:01:00+01:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01T00:01:00"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(format_timestamp(expected), "2024-01-01T00:01:00+00:00");
    }

    #[test]
    fn test_to_new_york_follows_dst() {
        assert_eq!(to_new_york("2024-01-15T17:00:00Z").as_deref(), Some("2024-01-15 12:00:00"));
        assert_eq!(to_new_york("2024-07-15T17:00:00.250Z").as_deref(), Some("2024-07-15 13:00:00"));

        // Spring-forward on 2024-03-10 skips 02:00 local
        assert_eq!(to_new_york("2024-03-10T06:59:59Z").as_deref(), Some("2024-03-10 01:59:59"));
        assert_eq!(to_new_york("2024-03-10T07:00:00Z").as_deref(), Some("2024-03-10 03:00:00"));

        assert_eq!(to_new_york("not a time"), None);
    }

    #[test]
    fn test_round_trip_preserves_field_order() {
        let record = Record::new()
            .with("timestamp", "2024-01-01T00:00:00Z")
            .with("b", 2)
            .with("a", 1);

        let encoded = record.to_json().unwrap();
        assert_eq!(encoded, r#"{"timestamp":"2024-01-01T00:00:00Z","b":2,"a":1}"#);
        assert_eq!(Record::from_slice(encoded.as_bytes()).unwrap(), record);
    }
}
