//! Identity normalization at the API boundary
//!
//! The backend spells record identity as `_id` on some payloads and `id` on
//! others (sometimes both). Every response body passes through
//! [`decode`] so that the rest of the crate only ever sees `id`.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{ApiError, ApiResult};

/// Nested objects that carry their own identity
const NESTED_RECORDS: &[&str] = &["institution"];

/// Fold `_id` into `id` on a record, an array of records, or a paginated
/// envelope (`{"items": [...]}`).
pub fn normalize_ids(value: &mut Value) {
    match value {
        Value::Array(items) => items.iter_mut().for_each(normalize_ids),
        Value::Object(map) => {
            if let Some(items) = map.get_mut("items") {
                if items.is_array() {
                    normalize_ids(items);
                    return;
                }
            }
            normalize_record(map);
        }
        _ => {}
    }
}

fn normalize_record(map: &mut Map<String, Value>) {
    let legacy = map.remove("_id");
    let canonical = match map.remove("id") {
        Some(Value::Null) | None => legacy,
        some => some,
    };
    if let Some(id) = canonical.and_then(id_to_string) {
        map.insert("id".to_string(), Value::String(id));
    }

    for key in NESTED_RECORDS {
        if let Some(Value::Object(nested)) = map.get_mut(*key) {
            normalize_record(nested);
        }
    }
}

fn id_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        // Extended JSON ObjectId: {"$oid": "..."}
        Value::Object(mut obj) => obj.remove("$oid").and_then(id_to_string),
        _ => None,
    }
}

/// Normalize identities then decode into `T`
pub fn decode<T: DeserializeOwned>(mut value: Value) -> ApiResult<T> {
    normalize_ids(&mut value);
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}
