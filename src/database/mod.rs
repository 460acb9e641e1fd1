//! Simulation database
//!
//! # Overview
//!
//! Scalar results from many runs are collected in a single JSON document,
//! mapping simulation name to a record of metric name to value:
//!
//! ```text
//! {
//!     "run1": {
//!         "cf": 0.0081,
//!         "meta": {
//!             "dataset": "mine",
//!             "problem": "cha"
//!         },
//!         "reb": 5000
//!     }
//! }
//! ```
//!
//! The document is always read fresh from disk and rewritten whole. Keys are
//! sorted and indented by four spaces so runs can be diffed, and records that
//! are not touched by a save come out byte-for-byte identical.
//!
//! ```rust
//! # use chanpost::database;
//! # use serde_json::json;
//! # let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("db.json");
//!
//! // save one simulation, leaving anything else in the file alone
//! let record = json!({"reb": 5000, "meta": {"problem": "cha"}});
//! database::save_simulation(record.as_object().unwrap().clone(), &path, "run1").unwrap();
//!
//! let run1 = database::load_simulation(&path, "run1").unwrap();
//! assert_eq!(run1["reb"].as_f64(), Some(5000.0));
//! ```
//!
//! There is no locking. Two processes saving to the same file at the same time
//! will race and the last write wins, so serialise writers externally.

// Split into subfiles for development, but anything important is re-exported
mod accessor;
mod document;
mod entry;
mod sanitize;

#[doc(inline)]
pub use crate::database::accessor::{get, KeyPath, MAX_DEPTH};

#[doc(inline)]
pub use crate::database::entry::{record_from_map, Entry, Record, Scalar};

#[doc(inline)]
pub use crate::database::sanitize::{is_full_database, sanitize};

// standard library
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

// internal modules
use crate::database::document::{Document, INDENT};
use crate::database::entry::finite_record;
use crate::error::{Error, Result};
use crate::utils::f;

// external crates
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

/// Every simulation in the document, keyed by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Database {
    simulations: BTreeMap<String, Record>,
}

impl Database {
    pub fn new() -> Self {
        Default::default()
    }

    /// Load the whole document, an absent file is an empty database
    ///
    /// Loaded values go through [sanitize] like anything being saved, so
    /// documents written by other tools still end up in the typed form.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No database at {}, starting empty", path.display());
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let raw: Map<String, Value> = serde_json::from_str(&content)?;
        Self::from_map(raw).map_err(|e| match e {
            Error::SchemaViolation(msg) => {
                Error::SchemaViolation(f!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Build from a raw mapping of simulation name to record
    ///
    /// Fails with [Error::SchemaViolation] if any top-level value is not a
    /// mapping, i.e. the data looks like a single simulation record.
    pub fn from_map(data: Map<String, Value>) -> Result<Self> {
        let data = sanitize(data);
        if !is_full_database(&data) {
            let scalars: Vec<&str> = data
                .iter()
                .filter(|(_, v)| !v.is_object())
                .map(|(k, _)| k.as_str())
                .collect();
            return Err(Error::SchemaViolation(f!(
                "not a full database, this looks like a single simulation record \
                 (non-mapping values for {scalars:?})"
            )));
        }

        let mut simulations = BTreeMap::new();
        for (sim, record) in data {
            if let Value::Object(map) = record {
                simulations.insert(sim, record_from_map(map)?);
            }
        }
        Ok(Self { simulations })
    }

    /// Write the whole document
    ///
    /// Non-finite floats have no JSON form and are left out with a warning.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let simulations: BTreeMap<&String, Record> = self
            .simulations
            .iter()
            .map(|(sim, record)| (sim, finite_record(record)))
            .collect();

        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        let mut writer = BufWriter::new(file);

        let formatter = PrettyFormatter::with_indent(INDENT.as_bytes());
        let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
        simulations.serialize(&mut serializer)?;
        writer.write_all(b"\n").map_err(|e| Error::io(path, e))?;
        writer.flush().map_err(|e| Error::io(path, e))?;

        info!(
            "Saved {} simulations to {}",
            self.simulations.len(),
            path.display()
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.simulations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.simulations.is_empty()
    }

    pub fn contains(&self, sim: &str) -> bool {
        self.simulations.contains_key(sim)
    }

    pub fn get(&self, sim: &str) -> Option<&Record> {
        self.simulations.get(sim)
    }

    /// Insert or replace a whole simulation record
    pub fn insert(&mut self, sim: &str, record: Record) -> Option<Record> {
        self.simulations.insert(sim.to_string(), record)
    }

    pub fn remove(&mut self, sim: &str) -> Option<Record> {
        self.simulations.remove(sim)
    }

    /// Simulations in name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Record)> {
        self.simulations.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.simulations.keys().map(String::as_str)
    }
}

/// Load the whole database, empty if the file does not exist
pub fn load<P: AsRef<Path>>(path: P) -> Result<Database> {
    Database::load(path)
}

/// Load one simulation record, empty if the file or simulation does not exist
pub fn load_simulation<P: AsRef<Path>>(path: P, sim: &str) -> Result<Record> {
    Ok(Database::load(path)?.remove(sim).unwrap_or_default())
}

/// Sanitise and save a full database, replacing the document
///
/// Fails with [Error::SchemaViolation] without touching the file if `data` is
/// not a mapping of simulation names to records.
pub fn save<P: AsRef<Path>>(data: Map<String, Value>, path: P) -> Result<()> {
    Database::from_map(data)?.save(path)
}

/// Sanitise and save one simulation, keeping every other record as it is
///
/// Reads the current document, replaces the entry for `sim` where it stands
/// (or appends it) and writes the document back. The other entries are copied
/// through as raw text, so their key order and number formatting survive even
/// if another tool wrote them. Not atomic.
pub fn save_simulation<P: AsRef<Path>>(data: Map<String, Value>, path: P, sim: &str) -> Result<()> {
    let path = path.as_ref();
    let record = record_from_map(sanitize(data))?;
    let mut document = Document::read(path)?;
    if document.set(sim, &record)? {
        debug!("Replacing existing record for {sim}");
    }
    document.write(path)?;
    info!("Saved {sim} to {} ({} simulations)", path.display(), document.len());
    Ok(())
}
