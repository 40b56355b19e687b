//! Raw records served by the meteor and station endpoints.
//!
//! Every field is optional: a record that decodes but lacks coordinates is
//! skipped later by the mapper, while an element that does not decode at all
//! is counted as malformed here. Neither aborts the batch.

use super::fetch::FetchError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// One meteor sighting.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MeteorRecord {
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub magnitude: Option<f64>,
    /// Trajectory points, only sent by older backends
    #[serde(default)]
    pub snapshots: Option<Vec<SnapshotRecord>>,
}

/// A single point along a meteor's trajectory.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SnapshotRecord {
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub magnitude: Option<f64>,
}

/// One observing station.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StationRecord {
    pub code: Option<String>,
    pub name: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}

/// Records decoded from one response body.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordBatch<T> {
    /// Successfully decoded records, in document order
    pub records: Vec<T>,
    /// Elements that could not be decoded
    pub malformed: usize,
}

/// Decodes a response body into records.
///
/// The body may be a JSON array of records or an object whose values are
/// records (keyed by id). Elements are decoded one at a time so a single bad
/// element only bumps `malformed`.
pub fn decode_records<T: DeserializeOwned>(body: &str) -> Result<RecordBatch<T>, FetchError> {
    let value: Value = serde_json::from_str(body)?;

    let elements: Vec<Value> = match value {
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        other => {
            return Err(FetchError::Payload(format!(
                "expected an array or object of records, got {}",
                json_kind(&other)
            )));
        }
    };

    let mut batch = RecordBatch {
        records: Vec::with_capacity(elements.len()),
        malformed: 0,
    };

    for (index, element) in elements.into_iter().enumerate() {
        match serde_json::from_value::<T>(element) {
            Ok(record) => batch.records.push(record),
            Err(e) => {
                log::debug!("Skipping malformed record #{}: {}", index, e);
                batch.malformed += 1;
            }
        }
    }

    Ok(batch)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
