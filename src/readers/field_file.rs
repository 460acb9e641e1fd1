//! Reader for headerless binary field dumps
//!
//! The files are nothing but a flat sequence of `f64` values. The shape has to
//! be known in advance from the grid parameters, and the axis order depends on
//! which tool wrote the file. That is never guessed from the file itself, the
//! caller picks a [Convention].

// standard library
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

// internal modules
use crate::error::{Error, Result};
use crate::field::{ByteOrder, Field, FieldShape, Layout, MappedField};
use crate::memory::{MemoryBudget, Unchecked};
use crate::mesh::GridParams;

// external crates
use kdam::{Bar, BarBuilder, BarExt};
use log::{debug, trace};

/// Values decoded per read call in eager mode
const CHUNK_VALUES: usize = 1 << 16;

/// Upstream emitters of binary field files
///
/// | Convention  | File order                                   | Components   |
/// | ----------- | -------------------------------------------- | ------------ |
/// | `Brutalbin` | `(nz_total, ny_total, nx_total, component)`  | 3            |
/// | `Channel`   | `(component, nz_total, ny_total, nx_total)`  | configurable |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convention {
    /// Velocity exports from the out2bin exporter, grid in an info file
    Brutalbin,
    /// Component-major dumps of the channel solver tools
    Channel,
}

impl Convention {
    pub fn layout(&self) -> Layout {
        match self {
            Convention::Brutalbin => Layout::Zyxc,
            Convention::Channel => Layout::Czyx,
        }
    }

    /// Number of components assumed unless told otherwise
    pub fn default_components(&self) -> usize {
        3
    }

    /// Expected shape for a grid, fails if it cannot be addressed
    pub fn shape(&self, grid: &GridParams, components: usize) -> Result<FieldShape> {
        FieldShape::try_new(
            components,
            grid.nz_total,
            grid.ny_total,
            grid.nx_total,
            self.layout(),
        )
    }
}

impl FromStr for Convention {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "brutalbin" | "out2bin" => Ok(Convention::Brutalbin),
            "channel" | "dns" => Ok(Convention::Channel),
            other => Err(format!(
                "unknown convention '{other}', expected 'brutalbin' or 'channel'"
            )),
        }
    }
}

/// A configurable reader for binary field files
///
/// Example:
/// ```ignore
///     let mut reader = FieldReader::new(Convention::Channel);
///     reader.set_components(6);
///     reader.disable_progress();
///     let field = reader.read(path, &grid)?;
/// ```
#[derive(Debug)]
pub struct FieldReader {
    convention: Convention,
    components: usize,
    byte_order: ByteOrder,
    budget: Box<dyn MemoryBudget>,
    disable_progress: bool,
}

impl FieldReader {
    pub fn new(convention: Convention) -> Self {
        Self {
            convention,
            components: convention.default_components(),
            byte_order: ByteOrder::default(),
            budget: Box::new(Unchecked),
            disable_progress: false,
        }
    }

    pub fn set_components(&mut self, components: usize) {
        self.components = components;
    }

    pub fn set_byte_order(&mut self, byte_order: ByteOrder) {
        self.byte_order = byte_order;
    }

    /// Check eager reads against a memory budget before allocating
    pub fn set_memory_budget(&mut self, budget: impl MemoryBudget + 'static) {
        self.budget = Box::new(budget);
    }

    /// Do not print the progress indicator
    pub fn disable_progress(&mut self) {
        debug!("Progress bar disabled");
        self.disable_progress = true;
    }

    pub fn convention(&self) -> Convention {
        self.convention
    }

    /// Shape this reader expects for a grid
    pub fn shape(&self, grid: &GridParams) -> Result<FieldShape> {
        self.convention.shape(grid, self.components)
    }

    /// Decode the whole file into memory
    ///
    /// The file length is checked against the expected shape before anything
    /// is allocated, and the handle is closed again before returning.
    pub fn read(&self, path: &Path, grid: &GridParams) -> Result<Field> {
        let shape = self.shape(grid)?;
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let bytes = file.metadata().map_err(|e| Error::io(path, e))?.len();

        shape.check_bytes(bytes)?;
        self.budget.check(bytes)?;
        debug!("Reading {} as {shape}", path.display());

        let mut reader = BufReader::new(file);
        let mut values = Vec::with_capacity(shape.len());
        let mut buffer = vec![0u8; CHUNK_VALUES * 8];
        let mut progress_bar = self.init_progress_bar(shape.len())?;

        let mut remaining = shape.len();
        while remaining > 0 {
            let n = remaining.min(CHUNK_VALUES);
            let chunk = &mut buffer[..n * 8];
            reader.read_exact(chunk).map_err(|e| Error::io(path, e))?;
            values.extend(self.byte_order.decode_all(chunk));
            progress_bar.update(n)?;
            remaining -= n;
        }

        // need an extra line for clean spacing if the progress bar is printed
        if !self.disable_progress {
            eprintln!()
        }

        trace!("Decoded {} values", values.len());
        Field::from_values(values, shape)
    }

    /// Map the file without reading it, see [MappedField]
    pub fn map(&self, path: &Path, grid: &GridParams) -> Result<MappedField> {
        MappedField::open(path, self.shape(grid)?, self.byte_order)
    }

    fn init_progress_bar(&self, total: usize) -> Result<Bar> {
        BarBuilder::default()
            .total(total)
            .delay(0.0)
            .unit(" values")
            .unit_scale(true)
            .disable(self.disable_progress)
            .build()
            .map_err(Error::Progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    use crate::memory::FixedBudget;

    fn grid() -> GridParams {
        GridParams {
            nx_total: 7,
            nz_total: 5,
            dx: 0.5,
            dz: 0.25,
            ny: 3,
            ny_total: 4,
            a: 1.6,
            ymin: -1.0,
            ymax: 1.0,
        }
    }

    fn sequential_file(n: usize) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for v in 0..n {
            file.write_all(&(v as f64).to_ne_bytes()).unwrap();
        }
        file.flush().unwrap();
        file
    }

    fn quiet(convention: Convention) -> FieldReader {
        let mut reader = FieldReader::new(convention);
        reader.disable_progress();
        reader
    }

    #[test]
    fn convention_names() {
        assert_eq!("Brutalbin".parse::<Convention>(), Ok(Convention::Brutalbin));
        assert_eq!("channel".parse::<Convention>(), Ok(Convention::Channel));
        assert!("vtk".parse::<Convention>().is_err());
    }

    #[test]
    fn expected_shapes() {
        let brutal = quiet(Convention::Brutalbin).shape(&grid()).unwrap();
        assert_eq!(brutal.dims(), [5, 4, 7, 3]);

        let mut reader = quiet(Convention::Channel);
        reader.set_components(6);
        assert_eq!(reader.shape(&grid()).unwrap().dims(), [6, 5, 4, 7]);
    }

    #[test]
    fn eager_read_keeps_file_order() {
        let file = sequential_file(420);
        let field = quiet(Convention::Channel).read(file.path(), &grid()).unwrap();
        assert_eq!(field.values().len(), 420);
        assert_eq!(field[[1, 2, 3, 4]], (140 + 2 * 28 + 3 * 7 + 4) as f64);
    }

    #[test]
    fn eager_read_rejects_wrong_length() {
        let file = sequential_file(419);
        let result = quiet(Convention::Brutalbin).read(file.path(), &grid());
        assert!(matches!(
            result,
            Err(Error::ShapeMismatch {
                expected: 420,
                found: 419
            })
        ));
    }

    #[test]
    fn eager_read_respects_budget() {
        let file = sequential_file(420);
        let mut reader = quiet(Convention::Channel);
        reader.set_memory_budget(FixedBudget(100));
        assert!(matches!(
            reader.read(file.path(), &grid()),
            Err(Error::MemoryBudget { .. })
        ));
    }

    #[test]
    fn big_endian_files() {
        let mut file = NamedTempFile::new().unwrap();
        for v in 0..420 {
            file.write_all(&(v as f64).to_be_bytes()).unwrap();
        }
        file.flush().unwrap();

        let mut reader = quiet(Convention::Channel);
        reader.set_byte_order(ByteOrder::Big);
        let field = reader.read(file.path(), &grid()).unwrap();
        assert_eq!(field[[2, 4, 3, 6]], 419.0);
    }

    #[test]
    fn missing_binary_is_an_io_error() {
        let result = quiet(Convention::Channel).read(Path::new("missing.bin"), &grid());
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
