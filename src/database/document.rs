//! Untyped view of a database file used for single simulation saves
//!
//! Databases are also written by other tools, with their own key order and
//! number formatting. Saving one simulation must not touch anyone else's
//! bytes, so the document is kept as a list of raw entries in file order and
//! only the entry being saved is re-serialised.

// standard library
use std::fmt;
use std::fs;
use std::path::Path;

// internal modules
use crate::database::entry::{finite_record, Record};
use crate::error::{Error, Result};
use crate::utils::f;

// external crates
use log::trace;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::value::RawValue;

/// Indentation of one level in a written document
pub(crate) const INDENT: &str = "    ";

/// Top-level entries in file order, values exactly as they were read
#[derive(Debug, Default)]
pub(crate) struct Document {
    entries: Vec<(String, Box<RawValue>)>,
}

impl Document {
    /// Read a document, an absent file is an empty one
    pub(crate) fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(&content).map_err(|e| match e {
            Error::SchemaViolation(msg) => Error::SchemaViolation(f!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Parse a document, every top-level value must be a mapping
    pub(crate) fn parse(content: &str) -> Result<Self> {
        let document: Self = serde_json::from_str(content)?;
        let scalars: Vec<&str> = document
            .entries
            .iter()
            .filter(|(_, raw)| !raw.get().starts_with('{'))
            .map(|(sim, _)| sim.as_str())
            .collect();
        if !scalars.is_empty() {
            return Err(Error::SchemaViolation(f!(
                "not a full database, this looks like a single simulation record \
                 (non-mapping values for {scalars:?})"
            )));
        }
        Ok(document)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Replace the entry for `sim` where it stands, or append it
    ///
    /// Returns true if an existing entry was replaced.
    pub(crate) fn set(&mut self, sim: &str, record: &Record) -> Result<bool> {
        let raw = RawValue::from_string(nested_text(record)?)?;
        match self.entries.iter_mut().find(|(name, _)| name == sim) {
            Some((_, existing)) => {
                *existing = raw;
                Ok(true)
            }
            None => {
                self.entries.push((sim.to_string(), raw));
                Ok(false)
            }
        }
    }

    /// Text of the whole document, four space indent and a final newline
    pub(crate) fn to_text(&self) -> Result<String> {
        if self.entries.is_empty() {
            return Ok("{}\n".to_string());
        }
        let mut lines = Vec::with_capacity(self.entries.len());
        for (sim, raw) in &self.entries {
            lines.push(f!("{INDENT}{}: {}", serde_json::to_string(sim)?, raw.get()));
        }
        Ok(f!("{{\n{}\n}}\n", lines.join(",\n")))
    }

    pub(crate) fn write(&self, path: &Path) -> Result<()> {
        let text = self.to_text()?;
        fs::write(path, text).map_err(|e| Error::io(path, e))?;
        trace!("Wrote {} entries to {}", self.len(), path.display());
        Ok(())
    }
}

/// Record serialised as it sits one level into a document
fn nested_text(record: &Record) -> Result<String> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(INDENT.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    finite_record(record).serialize(&mut serializer)?;
    let text = String::from_utf8_lossy(&buffer);
    Ok(text.replace('\n', &f!("\n{INDENT}")))
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(EntriesVisitor)
    }
}

struct EntriesVisitor;

impl<'de> Visitor<'de> for EntriesVisitor {
    type Value = Document;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a mapping of simulation names to records")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Document, A::Error> {
        let mut entries: Vec<(String, Box<RawValue>)> = Vec::new();
        while let Some((sim, raw)) = map.next_entry::<String, Box<RawValue>>()? {
            // repeated keys: the last one wins, as for any JSON reader
            match entries.iter_mut().find(|(name, _)| *name == sim) {
                Some((_, existing)) => *existing = raw,
                None => entries.push((sim, raw)),
            }
        }
        Ok(Document { entries })
    }
}
