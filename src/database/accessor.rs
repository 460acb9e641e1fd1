//! Uniform lookup of one- or two-level keys in a record
//!
//! Records are shallow on purpose: a metric is either at the top level
//! (`reb`) or one level down (`meta.problem`, `uv.prod`). Paths with more than
//! two keys are refused outright.
//!
//! ```rust
//! # use chanpost::database::{get, Entry, Record};
//! # let record: Record = serde_json::from_str(r#"{"reb": 5000, "meta": {"problem": "cha"}}"#).unwrap();
//! assert_eq!(get(&record, &["reb"]).unwrap(), &Entry::from(5000i64));
//! assert_eq!(get(&record, &["meta", "problem"]).unwrap().as_str(), Some("cha"));
//! assert!(get(&record, &["meta", "problem", "x"]).is_err());
//! ```

// standard library
use std::str::FromStr;

// internal modules
use crate::database::{Entry, Record};
use crate::error::{Error, Result};

/// Deepest path supported by [get]
pub const MAX_DEPTH: usize = 2;

/// Look up a one or two key path in a record
pub fn get<'a>(record: &'a Record, path: &[&str]) -> Result<&'a Entry> {
    match path {
        [] => Err(Error::EmptyPath),
        [key] => lookup(record, key),
        [outer, inner] => match lookup(record, outer)? {
            Entry::Nested(map) => lookup(map, inner),
            Entry::Scalar(_) => Err(Error::NotNested {
                key: outer.to_string(),
            }),
        },
        _ => Err(Error::UnsupportedDepth { depth: path.len() }),
    }
}

fn lookup<'a>(map: &'a Record, key: &str) -> Result<&'a Entry> {
    map.get(key).ok_or_else(|| Error::KeyNotFound {
        key: key.to_string(),
    })
}

/// Owned key path, written `key` or `outer.inner` on the command line
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    pub fn new<S: AsRef<str>>(keys: &[S]) -> Self {
        Self(keys.iter().map(|k| k.as_ref().to_string()).collect())
    }

    pub fn keys(&self) -> Vec<&str> {
        self.0.iter().map(String::as_str).collect()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Same path with every key equal to `from` replaced by `to`
    pub fn rename(&self, from: &str, to: &str) -> Self {
        Self(
            self.0
                .iter()
                .map(|k| if k == from { to.to_string() } else { k.clone() })
                .collect(),
        )
    }

    /// Resolve against a record, see [get]
    pub fn get<'a>(&self, record: &'a Record) -> Result<&'a Entry> {
        get(record, &self.keys())
    }
}

impl FromStr for KeyPath {
    type Err = Error;

    /// Dot separated keys, no more than [MAX_DEPTH] of them
    fn from_str(s: &str) -> Result<Self> {
        let keys: Vec<&str> = s.split('.').filter(|k| !k.is_empty()).collect();
        match keys.len() {
            0 => Err(Error::EmptyPath),
            n if n > MAX_DEPTH => Err(Error::UnsupportedDepth { depth: n }),
            _ => Ok(Self::new(&keys)),
        }
    }
}

impl std::fmt::Display for KeyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Record {
        serde_json::from_str(
            r#"{"reb": 5000, "cf": 0.008, "meta": {"problem": "cou", "dataset": "lm"}}"#,
        )
        .unwrap()
    }

    #[test]
    fn single_key() {
        let record = record();
        assert_eq!(get(&record, &["cf"]).unwrap(), &Entry::from(0.008));
    }

    #[test]
    fn two_keys_match_nested_indexing() {
        let record = record();
        let direct = &record["meta"].as_nested().unwrap()["dataset"];
        assert_eq!(get(&record, &["meta", "dataset"]).unwrap(), direct);
    }

    #[test]
    fn three_keys_are_unsupported() {
        let record = record();
        assert!(matches!(
            get(&record, &["a", "b", "c"]),
            Err(Error::UnsupportedDepth { depth: 3 })
        ));
    }

    #[test]
    fn missing_and_scalar_paths() {
        let record = record();
        assert!(matches!(get(&record, &[]), Err(Error::EmptyPath)));
        assert!(matches!(
            get(&record, &["rew"]),
            Err(Error::KeyNotFound { .. })
        ));
        assert!(matches!(
            get(&record, &["meta", "nope"]),
            Err(Error::KeyNotFound { .. })
        ));
        assert!(matches!(
            get(&record, &["reb", "x"]),
            Err(Error::NotNested { .. })
        ));
    }

    #[test]
    fn key_paths_from_strings() {
        let path: KeyPath = "meta.problem".parse().unwrap();
        assert_eq!(path.depth(), 2);
        assert_eq!(path.to_string(), "meta.problem");
        assert_eq!(path.get(&record()).unwrap().as_str(), Some("cou"));

        assert!(matches!(
            "a.b.c".parse::<KeyPath>(),
            Err(Error::UnsupportedDepth { depth: 3 })
        ));
        assert!(matches!("".parse::<KeyPath>(), Err(Error::EmptyPath)));
    }

    #[test]
    fn renaming_keys() {
        let path = KeyPath::new(&["rew"]);
        assert_eq!(path.rename("rew", "reb"), KeyPath::new(&["reb"]));
        assert_eq!(path.rename("x", "y"), path);
    }
}
