//! Clean up of raw JSON before it is stored
//!
//! Results arrive from all sorts of places, so before anything is written:
//!
//! - keys holding `null` are removed, absence is how missing data is stored
//! - sequences are replaced by their first element, and removed if empty
//! - mappings are cleaned recursively
//! - integers are normalised to `i64` where they fit, otherwise `f64`
//!
//! [sanitize] takes the mapping by value and returns the cleaned one, so the
//! caller never ends up holding a half-modified alias of its input.

// external crates
use log::trace;
use serde_json::{Map, Number, Value};

/// Clean a mapping for storage, see the module docs for the rules
///
/// Idempotent, cleaning twice gives the same result as cleaning once.
///
/// ```rust
/// # use chanpost::database::sanitize;
/// # use serde_json::json;
/// let raw = json!({"reb": [5000, 5001], "cf": null, "meta": {"problem": "cha"}});
/// let clean = sanitize(raw.as_object().unwrap().clone());
/// assert_eq!(serde_json::Value::Object(clean), json!({"reb": 5000, "meta": {"problem": "cha"}}));
/// ```
pub fn sanitize(data: Map<String, Value>) -> Map<String, Value> {
    data.into_iter()
        .filter_map(|(key, value)| match sanitize_value(value) {
            Some(value) => Some((key, value)),
            None => {
                trace!("Dropped empty value for '{key}'");
                None
            }
        })
        .collect()
}

/// True if every top-level value is itself a mapping
///
/// A full database maps simulation names to records. Anything with a scalar at
/// the top level is more likely a single simulation record.
pub fn is_full_database(data: &Map<String, Value>) -> bool {
    data.values().all(Value::is_object)
}

fn sanitize_value(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Array(items) => items.into_iter().next().and_then(sanitize_value),
        Value::Object(map) => Some(Value::Object(sanitize(map))),
        Value::Number(n) => Some(Value::Number(normalise(n))),
        other => Some(other),
    }
}

fn normalise(n: Number) -> Number {
    if let Some(i) = n.as_i64() {
        return Number::from(i);
    }
    if n.is_u64() {
        // too large for i64
        if let Some(v) = n.as_f64().and_then(Number::from_f64) {
            return v;
        }
    }
    n
}
