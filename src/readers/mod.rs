//! Readers for simulation output
//!
//! One-liners for the common cases live here, the configurable reader types
//! are re-exported for anything more involved.
//!
//! | Function          | Input                                  |
//! | ----------------- | -------------------------------------- |
//! | [read_field]      | headerless binary field dump           |
//! | [read_info_file]  | two-line grid info file                |
//! | [read_psd]        | power spectral density dump            |
//! | [read_integrals]  | uiuj volume integrals tables           |

// internal modules
use crate::error::Result;
use crate::field::FieldData;
use crate::mesh::{build_mesh, DnsParams, GridParams, Mesh};

// standard library
use std::path::{Path, PathBuf};

// external crates
use log::debug;

// files under the readers module
mod field_file;
mod info_file;
mod integrals_file;
pub mod parsers;
mod psd_file;

#[doc(inline)]
pub use crate::readers::field_file::{Convention, FieldReader};

#[doc(inline)]
pub use crate::readers::info_file::InfoFileReader;

#[doc(inline)]
pub use crate::readers::integrals_file::{Integrals, IntegralsReader, INTEGRAL_TERMS};

#[doc(inline)]
pub use crate::readers::psd_file::{PowerSpectra, PsdReader, PSD_COMPONENTS};

/// Where the grid parameters for a binary come from
#[derive(Debug, Clone, PartialEq)]
pub enum GridSource {
    /// Parameters already in hand
    Params(GridParams),
    /// Two-line info file written by the exporter
    InfoFile(PathBuf),
    /// Spectral description from the solver input
    Dns(DnsParams),
}

impl GridSource {
    /// Resolve to physical grid parameters, reading a file if needed
    pub fn resolve(&self) -> Result<GridParams> {
        match self {
            GridSource::Params(params) => Ok(*params),
            GridSource::InfoFile(path) => read_info_file(path),
            GridSource::Dns(dns) => Ok(GridParams::from_dns(dns)),
        }
    }
}

/// Decoding strategy for [read_field]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Read everything into memory now
    #[default]
    Eager,
    /// Memory map the file and decode on access
    Lazy,
}

/// Read a binary field together with its mesh
///
/// Returns the field (eager or mapped depending on `mode`) and the mesh built
/// from the same grid parameters.
///
/// - `path` - Path to the binary, can be [&str], [String], [Path], etc...
/// - `grid` - Where the grid parameters come from
/// - `convention` - Which tool wrote the binary
///
/// Example
/// ```ignore
/// let grid = GridSource::InfoFile("run1/info.txt".into());
/// let (field, mesh) = chanpost::read_field("run1/vel.bin", &grid, Convention::Brutalbin, Mode::Lazy)?;
/// ```
pub fn read_field<P: AsRef<Path>>(
    path: P,
    grid: &GridSource,
    convention: Convention,
    mode: Mode,
) -> Result<(FieldData, Mesh)> {
    let path: &Path = Path::new(path.as_ref());
    let params = grid.resolve()?;

    let mut reader = FieldReader::new(convention);
    reader.disable_progress();

    // the shape is validated here, before any coordinates are allocated
    debug!("Reading {} in {mode:?} mode", path.display());
    let field = match mode {
        Mode::Eager => FieldData::Eager(reader.read(path, &params)?),
        Mode::Lazy => FieldData::Lazy(reader.map(path, &params)?),
    };
    let mesh = build_mesh(&params)?;
    Ok((field, mesh))
}

/// Read the grid parameters from an info file
///
/// - `path` - Path to the info file, can be [&str], [String], [Path], etc...
pub fn read_info_file<P: AsRef<Path>>(path: P) -> Result<GridParams> {
    let path: &Path = Path::new(path.as_ref());
    InfoFileReader::new().parse(path)
}

/// Read a psd file, averaged across the channel centreline
///
/// - `path` - Path to the psd binary
/// - `dns` - Spectral grid of the simulation
pub fn read_psd<P: AsRef<Path>>(path: P, dns: &DnsParams) -> Result<PowerSpectra> {
    let path: &Path = Path::new(path.as_ref());
    PsdReader::new().parse(path, dns)
}

/// Read every integrals file in a uiuj output directory
///
/// - `dir` - Directory containing the `*integrals*.dat` files
/// - `variant` - Optional uiuj variant suffix, e.g. `large`
/// - `head_len` - Lines of header before the column names
pub fn read_integrals<P: AsRef<Path>>(
    dir: P,
    variant: Option<&str>,
    head_len: usize,
) -> Result<Integrals> {
    let dir: &Path = Path::new(dir.as_ref());
    let mut reader = IntegralsReader::new();
    if let Some(variant) = variant {
        reader.set_variant(variant);
    }
    reader.set_head_len(head_len);
    reader.parse(dir)
}
