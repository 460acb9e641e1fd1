//! Comparison of metrics across every simulation in a database
//!
//! Pulls an `x` and a `y` metric out of each record to print or export as a
//! series. Databases collected over the years are not perfectly consistent,
//! so each metric can be looked up under a list of candidate names, tried in
//! order. The bulk Reynolds number in particular is stored as `reb` in some
//! runs and `rew` in others.
//!
//! A record that has neither spelling, or no numeric value, is skipped with a
//! warning. One bad simulation never stops the rest of the comparison.
//!
//! ```rust
//! # use chanpost::compare::{CandidateKeys, Comparison};
//! # use chanpost::database::Database;
//! # use serde_json::json;
//! let db = Database::from_map(json!({
//!     "a": {"reb": 5000, "cf": 0.008, "meta": {"problem": "cha"}},
//!     "b": {"rew": 6000, "cf": 0.007, "meta": {"problem": "cou", "dataset": "lm"}},
//! }).as_object().unwrap().clone()).unwrap();
//!
//! let rows = Comparison::new(&db)
//!     .factor(2.0)
//!     .rows(&CandidateKeys::metric("reb"), &CandidateKeys::metric("cf"));
//!
//! assert_eq!(rows.len(), 2);
//! assert_eq!(rows[1].x, 12000.0);
//! ```

// standard library
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

// internal modules
use crate::database::{Database, Entry, KeyPath, Record};
use crate::error::{Error, Result};
use crate::utils::f;

// external crates
use itertools::Itertools;
use log::{debug, warn};

/// Alternative spellings tried when a key is missing
const RENAMES: [(&str, &str); 2] = [("rew", "reb"), ("reb", "rew")];

/// Problem whose `x` values are multiplied by the comparison factor
const SCALED_PROBLEM: &str = "cou";

/// Dataset assumed when a record does not say
const DEFAULT_DATASET: &str = "mine";

/// Ordered list of key paths to try for one metric
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateKeys(Vec<KeyPath>);

impl CandidateKeys {
    /// Exactly one path, no alternatives
    pub fn single(path: KeyPath) -> Self {
        Self(vec![path])
    }

    /// A path followed by its known alternative spellings
    pub fn with_renames(path: KeyPath) -> Self {
        let mut candidates = vec![path.clone()];
        for (from, to) in RENAMES {
            let renamed = path.rename(from, to);
            if !candidates.contains(&renamed) {
                candidates.push(renamed);
            }
        }
        Self(candidates)
    }

    /// Single top-level metric name with its alternative spellings
    pub fn metric(name: &str) -> Self {
        Self::with_renames(KeyPath::new(&[name]))
    }

    /// Add another path to try after the existing ones
    pub fn or(mut self, path: KeyPath) -> Self {
        self.0.push(path);
        self
    }

    /// The path as asked for, used for labels and file names
    pub fn primary(&self) -> &KeyPath {
        &self.0[0]
    }

    pub fn candidates(&self) -> &[KeyPath] {
        &self.0
    }

    /// First candidate present in the record
    ///
    /// Every failed attempt is logged. If none match, the last error is
    /// returned.
    pub fn resolve<'a>(&self, record: &'a Record) -> Result<&'a Entry> {
        let mut last = Error::EmptyPath;
        for path in &self.0 {
            match path.get(record) {
                Ok(entry) => return Ok(entry),
                Err(e) if e.is_missing_key() => {
                    debug!("Lookup of '{path}' failed: {e}");
                    last = e;
                }
                Err(e) => return Err(e),
            }
        }
        Err(last)
    }

    /// Resolve to a number
    pub fn resolve_f64(&self, record: &Record) -> Result<f64> {
        self.resolve(record)?
            .as_f64()
            .ok_or_else(|| Error::NotNumeric {
                key: self.primary().to_string(),
            })
    }
}

/// One simulation in a comparison
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub sim: String,
    pub problem: Option<String>,
    pub dataset: String,
    pub x: f64,
    pub y: f64,
}

/// Collects `x` and `y` values for every simulation in a database
#[derive(Debug)]
pub struct Comparison<'a> {
    database: &'a Database,
    factor: f64,
}

impl<'a> Comparison<'a> {
    pub fn new(database: &'a Database) -> Self {
        Self {
            database,
            factor: 1.0,
        }
    }

    /// Multiply `x` by `factor` for Couette flow simulations
    pub fn factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }

    /// Rows for every simulation that has both metrics, in name order
    pub fn rows(&self, x: &CandidateKeys, y: &CandidateKeys) -> Vec<Row> {
        self.database
            .iter()
            .filter_map(|(sim, record)| match self.row(sim, record, x, y) {
                Ok(row) => Some(row),
                Err(e) => {
                    warn!("Skipping simulation {sim}: {e}");
                    None
                }
            })
            .collect()
    }

    fn row(&self, sim: &str, record: &Record, x: &CandidateKeys, y: &CandidateKeys) -> Result<Row> {
        let problem = KeyPath::new(&["meta", "problem"])
            .get(record)
            .ok()
            .and_then(Entry::as_str)
            .map(str::to_string);
        let dataset = KeyPath::new(&["meta", "dataset"])
            .get(record)
            .ok()
            .and_then(Entry::as_str)
            .unwrap_or(DEFAULT_DATASET)
            .to_string();

        let mut x = x.resolve_f64(record)?;
        let y = y.resolve_f64(record)?;
        if problem.as_deref() == Some(SCALED_PROBLEM) {
            x *= self.factor;
        }

        Ok(Row {
            sim: sim.to_string(),
            problem,
            dataset,
            x,
            y,
        })
    }
}

/// Tab separated `problem dataset x y` lines, sorted
pub fn printout(rows: &[Row]) -> String {
    rows.iter()
        .map(|r| {
            [
                r.problem.clone().unwrap_or_else(|| "-".to_string()),
                r.dataset.clone(),
                r.x.to_string(),
                r.y.to_string(),
            ]
            .join("\t")
        })
        .sorted()
        .join("\n")
}

/// Write `x y` pairs to `<dir>/<ykey>_<xkey>.dat`
///
/// Returns the path of the written file.
pub fn write_series(rows: &[Row], dir: &Path, xkey: &KeyPath, ykey: &KeyPath) -> Result<PathBuf> {
    let path = dir.join(f!("{ykey}_{xkey}.dat"));
    let file = File::create(&path).map_err(|e| Error::io(&path, e))?;
    let mut writer = BufWriter::new(file);
    for row in rows {
        writeln!(writer, "{}\t{}", row.x, row.y).map_err(|e| Error::io(&path, e))?;
    }
    writer.flush().map_err(|e| Error::io(&path, e))?;
    debug!("Wrote {} points to {}", rows.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn database() -> Database {
        Database::from_map(
            json!({
                "a": {"reb": 5000, "cf": 0.008, "meta": {"problem": "cha"}},
                "b": {"rew": 6000, "cf": 0.007, "meta": {"problem": "cou", "dataset": "lm"}},
                "c": {"cf": 0.009, "meta": {"problem": "cha"}},
                "d": {"reb": "unknown", "cf": 0.001}
            })
            .as_object()
            .cloned()
            .unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn candidates_include_renames() {
        let keys = CandidateKeys::metric("rew");
        assert_eq!(
            keys.candidates(),
            &[KeyPath::new(&["rew"]), KeyPath::new(&["reb"])]
        );
        assert_eq!(CandidateKeys::metric("cf").candidates().len(), 1);
    }

    #[test]
    fn resolve_falls_back_in_order() {
        let db = database();
        let keys = CandidateKeys::metric("reb");
        assert_eq!(keys.resolve_f64(db.get("a").unwrap()).unwrap(), 5000.0);
        assert_eq!(keys.resolve_f64(db.get("b").unwrap()).unwrap(), 6000.0);
        assert!(matches!(
            keys.resolve(db.get("c").unwrap()),
            Err(Error::KeyNotFound { .. })
        ));
        assert!(matches!(
            keys.resolve_f64(db.get("d").unwrap()),
            Err(Error::NotNumeric { .. })
        ));
    }

    #[test]
    fn explicit_alternatives() {
        let db = database();
        let keys = CandidateKeys::single(KeyPath::new(&["cfr"])).or(KeyPath::new(&["cf"]));
        assert_eq!(keys.resolve_f64(db.get("c").unwrap()).unwrap(), 0.009);
    }

    #[test]
    fn bad_records_are_skipped() {
        let db = database();
        let rows = Comparison::new(&db).rows(&CandidateKeys::metric("reb"), &CandidateKeys::metric("cf"));
        let sims: Vec<&str> = rows.iter().map(|r| r.sim.as_str()).collect();
        assert_eq!(sims, vec!["a", "b"]);
        assert_eq!(rows[0].dataset, "mine");
        assert_eq!(rows[1].dataset, "lm");
    }

    #[test]
    fn factor_only_scales_couette() {
        let db = database();
        let rows = Comparison::new(&db)
            .factor(0.5)
            .rows(&CandidateKeys::metric("reb"), &CandidateKeys::metric("cf"));
        assert_eq!(rows[0].x, 5000.0);
        assert_eq!(rows[1].x, 3000.0);
    }

    #[test]
    fn sorted_printout() {
        let db = database();
        let rows = Comparison::new(&db).rows(&CandidateKeys::metric("reb"), &CandidateKeys::metric("cf"));
        assert_eq!(printout(&rows), "cha\tmine\t5000\t0.008\ncou\tlm\t6000\t0.007");
    }

    #[test]
    fn series_file() {
        let db = database();
        let dir = tempfile::tempdir().unwrap();
        let x = CandidateKeys::metric("reb");
        let y = CandidateKeys::metric("cf");
        let rows = Comparison::new(&db).rows(&x, &y);
        let path = write_series(&rows, dir.path(), x.primary(), y.primary()).unwrap();
        assert!(path.ends_with("cf_reb.dat"));
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text, "5000\t0.008\n6000\t0.007\n");
    }
}
