//! Grouped view of records for charting consumers
//!
//! Records are bucketed by one field (usually `instrument`), each bucket
//! gets a shared timestamp column plus one numeric series per field.

use crate::feed_core::sort_by_timestamp;
use crate::record::{Record, TIMESTAMP_FIELD};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Group name for records lacking the grouping field
pub const UNKNOWN_GROUP: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSeries {
    pub field: String,
    /// One point per record; `None` where the value is missing or not numeric
    pub values: Vec<Option<f64>>,
    /// False once any value failed numeric coercion
    pub is_numeric: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentGroup {
    pub records: Vec<Record>,
    pub timestamps: Vec<Option<String>>,
    pub series: Vec<FieldSeries>,
}

/// Group `records` by the value of `group_field`; missing or falsy values
/// (null, `false`, `0`, `""`, empty containers) land in [`UNKNOWN_GROUP`]
pub fn group_records(records: Vec<Record>, group_field: &str) -> BTreeMap<String, InstrumentGroup> {
    let mut buckets: BTreeMap<String, Vec<Record>> = BTreeMap::new();
    for record in records {
        let group = match record.get(group_field) {
            Some(value) if !is_falsy(value) => group_name(value),
            _ => UNKNOWN_GROUP.to_string(),
        };
        buckets.entry(group).or_default().push(record);
    }

    buckets
        .into_iter()
        .map(|(group, mut records)| {
            sort_by_timestamp(&mut records);
            let built = build_group(records);
            (group, built)
        })
        .collect()
}

fn build_group(records: Vec<Record>) -> InstrumentGroup {
    let timestamps = records
        .iter()
        .map(|r| r.get(TIMESTAMP_FIELD).map(timestamp_text))
        .collect();

    let field_names: BTreeSet<&String> = records
        .iter()
        .flat_map(|r| r.fields())
        .filter(|f| f.as_str() != TIMESTAMP_FIELD)
        .collect();

    let series = field_names
        .into_iter()
        .map(|field| {
            let mut is_numeric = true;
            let values = records
                .iter()
                .map(|r| match r.get(field) {
                    None | Some(Value::Null) => None,
                    Some(value) => {
                        let coerced = coerce_f64(value);
                        if coerced.is_none() {
                            is_numeric = false;
                        }
                        coerced
                    }
                })
                .collect();

            FieldSeries {
                field: field.clone(),
                values,
                is_numeric,
            }
        })
        .collect();

    InstrumentGroup {
        records,
        timestamps,
        series,
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn group_name(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn timestamp_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Numeric view of a scalar for plotting
///
/// Only finite values count: strings spelling NaN or infinity yield `None`
/// and mark the series non-numeric.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}
