//! Canonical serialization and SHA-256 content addressing.
//!
//! Objects are serialized to JSON with every object's keys sorted
//! (recursively) and compact separators, so two logically equal values hash
//! identically no matter how they were constructed or which field order
//! their Rust type declares.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::models::ContentAddress;

/// Serialize `value` to its canonical JSON bytes.
pub fn canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let value = serde_json::to_value(value)?;
    serde_json::to_vec(&sort_keys(value))
}

/// Hex-encoded SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Content address of `value`: SHA-256 over its canonical serialization.
pub fn content_address<T: Serialize + ?Sized>(
    value: &T,
) -> Result<ContentAddress, serde_json::Error> {
    Ok(ContentAddress::from(sha256_hex(&canonical_bytes(value)?)))
}

// Rebuilding the map from sorted entries keeps the order stable even when
// serde_json's `preserve_order` feature is enabled somewhere in the graph.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, sort_keys(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
