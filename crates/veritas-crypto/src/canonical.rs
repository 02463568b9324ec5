use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CanonicalError {
    #[error("value is not representable as canonical JSON: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Encode `value` as canonical JSON: UTF-8, object keys sorted
/// lexicographically by byte value, no insignificant whitespace (spec §4.1/§6).
/// `serde_json`'s own `Value::Object` is backed by a `BTreeMap` when the
/// `preserve_order` feature is off, which already sorts keys — but we do not
/// rely on that default staying true, or on struct field declaration order,
/// so we walk the value and rebuild a sorted map explicitly.
pub fn canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, CanonicalError> {
    let value = serde_json::to_value(value)?;
    let sorted = sort_value(value);
    Ok(serde_json::to_vec(&sorted)?)
}

fn sort_value(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted: std::collections::BTreeMap<String, Value> = std::collections::BTreeMap::new();
            for (k, v) in map {
                sorted.insert(k, sort_value(v));
            }
            let mut out = serde_json::Map::new();
            for (k, v) in sorted {
                out.insert(k, v);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_value).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sorts_object_keys_regardless_of_insertion_order() {
        let a = canonical_bytes(&json!({"b": 1, "a": 2, "c": {"z": 1, "y": 2}})).unwrap();
        let b = canonical_bytes(&json!({"a": 2, "c": {"y": 2, "z": 1}, "b": 1})).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn produces_no_insignificant_whitespace() {
        let bytes = canonical_bytes(&json!({"a": 1})).unwrap();
        assert_eq!(bytes, br#"{"a":1}"#);
    }
}
