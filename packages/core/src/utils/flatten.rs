//! Nested record flattening
//!
//! Collapses nested JSON objects into a single-level map whose keys are the
//! separator-joined paths of their ancestors. Used for metric sub-records that
//! become flat node properties.

use serde_json::{Map, Value};

/// Separator used when flattening evaluation metrics
pub const DEFAULT_SEPARATOR: &str = "_";

/// Flatten a nested object into a single-level map
///
/// Objects are recursed into at any depth. Every other value, including
/// arrays, is an opaque leaf. An empty nested object contributes no keys.
///
/// # Arguments
///
/// * `record` - Object to flatten
/// * `separator` - String placed between path segments
/// * `prefix` - Optional starting path prepended to every key
///
/// # Examples
///
/// ```rust
/// use modelgraph_core::utils::flatten;
/// use serde_json::json;
///
/// let nested = json!({"a": {"b": 1, "c": {"d": 2}}});
/// let flat = flatten(nested.as_object().unwrap(), "_", None);
/// assert_eq!(flat.get("a_b"), Some(&json!(1)));
/// assert_eq!(flat.get("a_c_d"), Some(&json!(2)));
/// ```
pub fn flatten(
    record: &Map<String, Value>,
    separator: &str,
    prefix: Option<&str>,
) -> Map<String, Value> {
    let mut flat = Map::new();
    flatten_into(&mut flat, record, separator, prefix.filter(|p| !p.is_empty()));
    flat
}

fn flatten_into(
    out: &mut Map<String, Value>,
    record: &Map<String, Value>,
    separator: &str,
    parent: Option<&str>,
) {
    for (key, value) in record {
        let path = match parent {
            Some(parent) => format!("{}{}{}", parent, separator, key),
            None => key.clone(),
        };

        match value {
            Value::Object(nested) => flatten_into(out, nested, separator, Some(path.as_str())),
            leaf => {
                out.insert(path, leaf.clone());
            }
        }
    }
}
