//! Reader for the volume integrals written by the uiuj post-processor
//!
//! One small table per budget term (`uvintegrals.dat`, `uuintegrals.dat`,
//! ...). After `head_len` lines of free-form header comes a line of column
//! names and then a single row of values.
//!
//! Only the first data row is used. These values are exactly what ends up in
//! the simulation database, one nested mapping per term.

// standard library
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

// internal modules
use crate::error::{Error, Result};
use crate::readers::parsers;

// external crates
use log::{debug, trace};
use serde_json::{Map, Value};

/// Budget terms with an integrals file, in output order
pub const INTEGRAL_TERMS: [&str; 6] = ["uv", "uu", "vv", "ww", "tke", "mke"];

/// Variants of uiuj that never write the mean kinetic energy files
const NO_MKE_VARIANTS: [&str; 2] = ["large", "small"];

/// Integral values keyed by term, then by column name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Integrals {
    pub terms: BTreeMap<String, BTreeMap<String, f64>>,
}

impl Integrals {
    /// Values of one term, if it was read
    pub fn term(&self, term: &str) -> Option<&BTreeMap<String, f64>> {
        self.terms.get(term)
    }

    /// Convert into an unsanitised database record
    ///
    /// Non-finite values become `null`, and are dropped again when the record
    /// is sanitised on save.
    pub fn into_record(self) -> Map<String, Value> {
        self.terms
            .into_iter()
            .map(|(term, columns)| {
                let columns: Map<String, Value> = columns
                    .into_iter()
                    .map(|(name, value)| (name, Value::from(value)))
                    .collect();
                (term, Value::Object(columns))
            })
            .collect()
    }
}

/// A reader for a directory of integrals files
#[derive(Debug)]
pub struct IntegralsReader {
    variant: Option<String>,
    head_len: usize,
}

impl Default for IntegralsReader {
    fn default() -> Self {
        Self {
            variant: None,
            head_len: 1,
        }
    }
}

impl IntegralsReader {
    /// Just calls Default::default(), one header line and no variant
    pub fn new() -> Self {
        Default::default()
    }

    /// Read the `_<variant>` files instead of the plain ones
    pub fn set_variant(&mut self, variant: &str) {
        self.variant = Some(variant.to_string());
    }

    /// Number of lines before the column names
    pub fn set_head_len(&mut self, head_len: usize) {
        self.head_len = head_len;
    }

    /// File name for a term, e.g. `uvintegrals_large.dat`
    pub fn file_name(&self, term: &str) -> String {
        match &self.variant {
            Some(variant) => format!("{term}integrals_{variant}.dat"),
            None => format!("{term}integrals.dat"),
        }
    }

    /// Terms expected for the configured variant
    pub fn expected_terms(&self) -> Vec<&'static str> {
        let skip_mke = self
            .variant
            .as_deref()
            .is_some_and(|v| NO_MKE_VARIANTS.contains(&v));
        INTEGRAL_TERMS
            .into_iter()
            .filter(|term| !(skip_mke && *term == "mke"))
            .collect()
    }

    pub fn parse(&self, dir: &Path) -> Result<Integrals> {
        let mut integrals = Integrals::default();
        for term in self.expected_terms() {
            let path = dir.join(self.file_name(term));
            debug!("Reading {}", path.display());
            let content = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
            integrals
                .terms
                .insert(term.to_string(), self.parse_table(&content)?);
        }
        Ok(integrals)
    }

    /// Column names and the first row of values from one table
    pub fn parse_table(&self, content: &str) -> Result<BTreeMap<String, f64>> {
        let mut lines = content
            .lines()
            .enumerate()
            .skip(self.head_len)
            .map(|(n, l)| (n + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty());

        let (line, header) = lines.next().ok_or(Error::Parse {
            line: self.head_len + 1,
            message: "missing column names".into(),
        })?;
        let (_, names) = parsers::column_names(header).map_err(|e| Error::Parse {
            line,
            message: format!("bad column names ({e})"),
        })?;

        let (line, row) = lines.next().ok_or(Error::Parse {
            line: line + 1,
            message: "missing data row".into(),
        })?;
        let (_, values) = parsers::number_row(row).map_err(|e| Error::Parse {
            line,
            message: format!("bad data row ({e})"),
        })?;

        if names.len() != values.len() {
            return Err(Error::Parse {
                line,
                message: format!("{} columns but {} values", names.len(), values.len()),
            });
        }

        trace!("Parsed {} integral columns", names.len());
        Ok(names
            .into_iter()
            .map(str::to_string)
            .zip(values)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const TABLE: &str = "# uv integrals, nfield = 120\nprod diss turb\n1.5 -0.5 2e-3\n3.0 3.0 3.0\n";

    #[rstest]
    #[case(None, "uvintegrals.dat")]
    #[case(Some("large"), "uvintegrals_large.dat")]
    fn file_names(#[case] variant: Option<&str>, #[case] expected: &str) {
        let mut reader = IntegralsReader::new();
        if let Some(v) = variant {
            reader.set_variant(v);
        }
        assert_eq!(reader.file_name("uv"), expected);
    }

    #[rstest]
    #[case(None, 6)]
    #[case(Some("large"), 5)]
    #[case(Some("small"), 5)]
    #[case(Some("wall"), 6)]
    fn mke_only_for_full_runs(#[case] variant: Option<&str>, #[case] n: usize) {
        let mut reader = IntegralsReader::new();
        if let Some(v) = variant {
            reader.set_variant(v);
        }
        assert_eq!(reader.expected_terms().len(), n);
    }

    #[test]
    fn first_row_only() {
        let table = IntegralsReader::new().parse_table(TABLE).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table["prod"], 1.5);
        assert_eq!(table["diss"], -0.5);
        assert_eq!(table["turb"], 2e-3);
    }

    #[test]
    fn longer_headers() {
        let mut reader = IntegralsReader::new();
        reader.set_head_len(3);
        let table = reader
            .parse_table("a\nb\nc\nx y\n1 2\n")
            .unwrap();
        assert_eq!(table["y"], 2.0);
    }

    #[test]
    fn column_count_mismatch() {
        let result = IntegralsReader::new().parse_table("header\nx y z\n1 2\n");
        assert!(matches!(result, Err(Error::Parse { line: 3, .. })));
    }

    #[test]
    fn record_conversion_drops_nothing_finite() {
        let mut integrals = Integrals::default();
        let mut uv = BTreeMap::new();
        uv.insert("prod".to_string(), 1.0);
        uv.insert("bad".to_string(), f64::NAN);
        integrals.terms.insert("uv".to_string(), uv);

        let record = integrals.into_record();
        assert_eq!(record["uv"]["prod"], Value::from(1.0));
        assert_eq!(record["uv"]["bad"], Value::Null);
    }
}
