// standard library
use std::collections::BTreeMap;

// internal modules
use crate::error::{Error, Result};
use crate::utils::f;

// external crates
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metric name to value for a single simulation
pub type Record = BTreeMap<String, Entry>;

/// A single stored value
///
/// Integers and floats are kept apart so that `180` stays `180` and `2.0`
/// stays `2.0` through a save and load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Integer(i64),
    Float(f64),
    Flag(bool),
    Text(String),
}

impl Scalar {
    /// Numeric value, `None` for text and flags
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Integer(i) => Some(*i as f64),
            Scalar::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Scalar::Integer(i) => write!(f, "{i}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Flag(b) => write!(f, "{b}"),
            Scalar::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Either a scalar or a nested mapping such as `meta`
///
/// Records loaded or saved through the database hold scalars inside a nested
/// mapping, never another mapping. Conversion from JSON enforces that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Entry {
    Scalar(Scalar),
    Nested(BTreeMap<String, Entry>),
}

impl Entry {
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Entry::Scalar(s) => Some(s),
            Entry::Nested(_) => None,
        }
    }

    pub fn as_nested(&self) -> Option<&BTreeMap<String, Entry>> {
        match self {
            Entry::Nested(map) => Some(map),
            Entry::Scalar(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_scalar().and_then(Scalar::as_f64)
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Scalar::as_str)
    }
}

impl std::fmt::Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Entry::Scalar(s) => write!(f, "{s}"),
            Entry::Nested(map) => match serde_json::to_string(map) {
                Ok(s) => write!(f, "{s}"),
                Err(_) => Err(std::fmt::Error),
            },
        }
    }
}

impl From<i64> for Entry {
    fn from(value: i64) -> Self {
        Entry::Scalar(Scalar::Integer(value))
    }
}

impl From<f64> for Entry {
    fn from(value: f64) -> Self {
        Entry::Scalar(Scalar::Float(value))
    }
}

impl From<&str> for Entry {
    fn from(value: &str) -> Self {
        Entry::Scalar(Scalar::Text(value.to_string()))
    }
}

/// Conversion of an already sanitised JSON value
///
/// Nulls and sequences have no typed representation, so seeing one here means
/// the value skipped sanitising. Mappings are accepted one level deep only,
/// matching the two key limit of [get](crate::database::get).
impl TryFrom<Value> for Entry {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Entry::Nested(
                map.into_iter()
                    .map(|(k, v)| {
                        let scalar = scalar_from_value(v).map_err(|e| match e {
                            Error::SchemaViolation(msg) => {
                                Error::SchemaViolation(f!("'{k}': {msg}"))
                            }
                            other => other,
                        })?;
                        Ok((k, Entry::Scalar(scalar)))
                    })
                    .collect::<Result<_>>()?,
            )),
            other => Ok(Entry::Scalar(scalar_from_value(other)?)),
        }
    }
}

fn scalar_from_value(value: Value) -> Result<Scalar> {
    match value {
        Value::Bool(b) => Ok(Scalar::Flag(b)),
        Value::String(s) => Ok(Scalar::Text(s)),
        Value::Number(n) => Ok(match n.as_i64() {
            Some(i) => Scalar::Integer(i),
            None => Scalar::Float(n.as_f64().unwrap_or(f64::NAN)),
        }),
        Value::Object(_) => Err(Error::SchemaViolation(
            "mappings can only be nested one level deep".into(),
        )),
        Value::Null => Err(Error::SchemaViolation(
            "null values cannot be stored, remove the key instead".into(),
        )),
        Value::Array(items) => Err(Error::SchemaViolation(f!(
            "sequences cannot be stored (found {} items)",
            items.len()
        ))),
    }
}

/// Convert a sanitised JSON mapping into a typed record
pub fn record_from_map(map: serde_json::Map<String, Value>) -> Result<Record> {
    map.into_iter()
        .map(|(k, v)| Ok((k, Entry::try_from(v)?)))
        .collect()
}

/// Copy of a record without the non-finite floats JSON cannot hold
///
/// Those would be written as `null`, and a missing value is stored as an
/// absent key instead.
pub(crate) fn finite_record(record: &Record) -> Record {
    record
        .iter()
        .filter_map(|(key, entry)| match entry {
            Entry::Scalar(Scalar::Float(v)) if !v.is_finite() => {
                warn!("Dropping non-finite value {v} for '{key}'");
                None
            }
            Entry::Nested(map) => Some((key.clone(), Entry::Nested(finite_record(map)))),
            other => Some((key.clone(), other.clone())),
        })
        .collect()
}
