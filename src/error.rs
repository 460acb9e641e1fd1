//! Error type shared by every reader and the simulation database

// standard library
use std::path::PathBuf;

// external crates
use thiserror::Error;

/// Convenience alias used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong in the core library
///
/// Binaries wrap this in `anyhow` so the variants only really matter to other
/// Rust code that wants to recover from a specific failure.
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying I/O failure with the offending path attached
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O failure without a useful path (e.g. progress bar output)
    #[error("I/O error: {0}")]
    Stream(#[from] std::io::Error),

    /// Database document could not be (de)serialised
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Metadata or tabular file did not parse
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Grid parameters that would divide by zero in the stretching law
    #[error("Degenerate grid: {0}")]
    DegenerateGrid(String),

    /// Decoded element count does not match the expected shape
    #[error("Shape mismatch: expected {expected} values, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    /// Byte length is not a whole number of f64 values
    ///
    /// The specific form of a shape mismatch where no value count can be
    /// given, [Error::is_shape_mismatch] treats both the same.
    #[error("Shape mismatch: file length of {bytes} bytes is not a multiple of 8")]
    PartialValue { bytes: u64 },

    /// Logical index outside of the field shape
    #[error("Index {index:?} out of bounds for shape {counts:?}")]
    OutOfBounds {
        index: [usize; 4],
        counts: [usize; 4],
    },

    /// Attempt to read through a mapping after it was released
    #[error("Mapped field has already been released")]
    Released,

    /// Configured memory budget would be exceeded
    #[error("Reading {required} bytes exceeds the memory budget of {available} bytes")]
    MemoryBudget { required: u64, available: u64 },

    /// Attempt to store something other than a full database
    #[error("{0}")]
    SchemaViolation(String),

    /// Accessor path longer than two keys
    #[error("Key paths deeper than 2 are not supported (got {depth} keys)")]
    UnsupportedDepth { depth: usize },

    /// Accessor path with no keys at all
    #[error("Key path is empty")]
    EmptyPath,

    /// Requested key is not present
    #[error("Key not found: '{key}'")]
    KeyNotFound { key: String },

    /// Second key of a path applied to a scalar
    #[error("'{key}' is a scalar, not a nested mapping")]
    NotNested { key: String },

    /// Value used in arithmetic is not a number
    #[error("'{key}' is not numeric")]
    NotNumeric { key: String },

    /// Progress bar could not be created
    #[error("Progress bar: {0}")]
    Progress(String),
}

impl Error {
    /// Attach a path to an I/O error
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// True when a file does not hold exactly the expected values
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self, Error::ShapeMismatch { .. } | Error::PartialValue { .. })
    }

    /// True for failures caused by a missing key, used by fallback lookups
    pub fn is_missing_key(&self) -> bool {
        matches!(self, Error::KeyNotFound { .. } | Error::NotNested { .. })
    }
}
