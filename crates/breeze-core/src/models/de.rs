//! Field extraction for loosely typed API records.
//!
//! Each helper removes a key from the raw record only when its value can be
//! read as the wanted type. Anything else stays in the map, so it ends up in
//! the model's `extra` and is serialized back unchanged.

use serde_json::{Map, Value};

/// Take a number or numeric string. The API is inconsistent about quoting amounts.
pub(crate) fn take_f64(map: &mut Map<String, Value>, key: &str) -> Option<f64> {
    let parsed = match map.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    if parsed.is_some() {
        map.remove(key);
    }
    parsed
}

/// Take a string, or a number rendered as a string (ids are sometimes numeric).
pub(crate) fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    let parsed = match map.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    };
    if parsed.is_some() {
        map.remove(key);
    }
    parsed
}
