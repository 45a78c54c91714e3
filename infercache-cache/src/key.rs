//! Cache key derivation.

use infercache_core::{Payload, Query};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 digest (lowercase hex) identifying a logical request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for `(model, payload)`.
    ///
    /// The digest covers the canonical form of
    /// `{"model": model, "payload": payload}`, so mapping insertion order
    /// never changes the key.
    pub fn derive(model: &str, payload: &Payload) -> Self {
        let content = canonical_json(&json!({ "model": model, "payload": payload }));
        let digest = Sha256::digest(content.as_bytes());
        Self(digest.iter().map(|b| format!("{:02x}", b)).collect())
    }

    /// Derive the key for a prepared [`Query`].
    pub fn for_query(query: &Query) -> Self {
        Self::derive(&query.model, &query.payload)
    }

    /// The hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the entry stored under this key.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.0)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rebuild `value` with every mapping's keys in sorted order.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), canonicalize(v)))
                    .collect::<Map<_, _>>(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Compact JSON with recursively sorted keys.
pub fn canonical_json(value: &Value) -> String {
    canonicalize(value).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn payload(v: Value) -> Payload {
        v.as_object().cloned().unwrap()
    }

    fn ordered(pairs: &[(&str, Value)]) -> Payload {
        let mut map = Payload::new();
        for (k, v) in pairs {
            map.insert((*k).to_string(), v.clone());
        }
        map
    }

    #[test]
    fn test_key_is_insertion_order_independent() {
        let p1 = ordered(&[
            ("inputs", json!("hello")),
            ("parameters", json!({"temperature": 0.3, "max_new_tokens": 50})),
        ]);
        let p2 = ordered(&[
            ("parameters", json!({"max_new_tokens": 50, "temperature": 0.3})),
            ("inputs", json!("hello")),
        ]);
        assert_eq!(CacheKey::derive("m", &p1), CacheKey::derive("m", &p2));
    }

    #[test]
    fn test_key_changes_with_content() {
        let base = payload(json!({"inputs": "hello"}));
        let other = payload(json!({"inputs": "hello!"}));
        assert_ne!(CacheKey::derive("m", &base), CacheKey::derive("m", &other));
        assert_ne!(CacheKey::derive("m", &base), CacheKey::derive("n", &base));
    }

    #[test]
    fn test_key_shape() {
        let key = CacheKey::derive("openrouter/auto", &payload(json!({"inputs": "x"})));
        assert_eq!(key.as_str().len(), 64);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(key.file_name(), format!("{}.json", key));
    }

    #[test]
    fn test_for_query_matches_derive() {
        let query = Query::from_value("m", json!({"inputs": "x"})).unwrap();
        assert_eq!(CacheKey::for_query(&query), CacheKey::derive("m", &query.payload));
    }

    #[test]
    fn test_canonical_json_sorts_nested_keys() {
        let value = json!({"b": [{"z": 1, "a": 2}], "a": {"y": true, "x": null}});
        assert_eq!(
            canonical_json(&value),
            r#"{"a":{"x":null,"y":true},"b":[{"a":2,"z":1}]}"#
        );
    }
}
