//! Content-addressed identity
//!
//! Entities with no natural business key (hardware descriptions,
//! hyperparameter sets) are keyed by a digest of their content. Two records
//! with the same keys and values always map to the same key, whatever order
//! their fields were written in.
//!
//! # Digest Layout
//!
//! `SHA-256(role || 0x00 || canonical_json(record))` when a role tag is given,
//! `SHA-256(canonical_json(record))` otherwise, rendered as lowercase hex.
//!
//! The digest is a deduplication key, not a security boundary.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

/// Length of a content identity in hex characters
pub const DIGEST_HEX_LEN: usize = 64;

/// Role a device plays for a model
///
/// Used as the salt when deriving device identities, so the same hardware used
/// for training and for inference yields two distinct nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceRole {
    Training,
    Inference,
}

impl DeviceRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceRole::Training => "training",
            DeviceRole::Inference => "inference",
        }
    }
}

impl fmt::Display for DeviceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the content identity of a record
///
/// # Arguments
///
/// * `record` - Any JSON value, usually an object
/// * `role` - Optional salt; `None` and `Some("")` are equivalent
///
/// # Returns
///
/// 64-character lowercase hex SHA-256 digest
///
/// # Examples
///
/// ```rust
/// use modelgraph_core::utils::content_identity;
/// use serde_json::json;
///
/// let a = content_identity(&json!({"lr": 0.01, "epochs": 10}), None);
/// let b = content_identity(&json!({"epochs": 10, "lr": 0.01}), None);
/// assert_eq!(a, b);
/// assert_ne!(a, content_identity(&json!({"lr": 0.01, "epochs": 10}), Some("training")));
/// ```
pub fn content_identity(record: &Value, role: Option<&str>) -> String {
    let mut hasher = Sha256::new();

    if let Some(role) = role.filter(|r| !r.is_empty()) {
        hasher.update(role.as_bytes());
        hasher.update([0u8]);
    }

    hasher.update(canonical_json(record).as_bytes());
    hex::encode(hasher.finalize())
}

/// Serialize a value with object keys sorted at every depth
///
/// Arrays keep their order. No whitespace is emitted.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(&mut out, value);
    out
}

fn write_canonical(out: &mut String, value: &Value) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(out, key);
                out.push(':');
                write_canonical(out, &map[key.as_str()]);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(out, item);
            }
            out.push(']');
        }
        Value::String(s) => write_string(out, s),
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn write_string(out: &mut String, s: &str) {
    // Display of a JSON string is its escaped, quoted form
    out.push_str(&Value::String(s.to_string()).to_string());
}
