//! Deterministic JSON canonicalization.
//!
//! Two snapshots with the same raw content must produce the same bytes, so
//! fingerprints do not depend on map iteration order or formatting:
//! - object keys are sorted lexicographically, at every depth
//! - arrays keep their order
//! - output is minified
//!
//! Raw content carries no floats of its own. Entity and block `data` may;
//! they are written the way `serde_json` prints them.

use serde::Serialize;
use serde_json::{Map, Value};

use folio_model::ContentState;
use folio_raw::to_raw;

use crate::raw_json::RawJsonError;

/// Canonical JSON bytes of any serializable value.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let sorted = sort_keys(serde_json::to_value(value)?);
    serde_json::to_vec(&sorted)
}

pub fn to_canonical_json_string<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let sorted = sort_keys(serde_json::to_value(value)?);
    serde_json::to_string(&sorted)
}

/// Canonical JSON of a snapshot's raw form.
pub fn content_to_canonical_json(content: &ContentState) -> Result<String, RawJsonError> {
    let raw = to_raw(content).map_err(RawJsonError::Conversion)?;
    to_canonical_json_string(&raw).map_err(RawJsonError::InvalidJson)
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, sort_keys(v)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        scalar => scalar,
    }
}
