//! Reader for power spectral density dumps (`psd.bin`)
//!
//! Six spectra (the independent components of the Reynolds stress tensor) on
//! the spectral grid, stored as `(6, ny+1, nz+1, nx+1)` values. Counts here are
//! the half counts of the solver input, not the physical totals.

// standard library
use std::path::Path;

// internal modules
use crate::error::Result;
use crate::field::{ByteOrder, Field, FieldShape, Layout, MappedField};
use crate::memory::{MemoryBudget, Unchecked};
use crate::mesh::{wall_normal, DnsParams};

// external crates
use log::debug;

/// Number of spectra in a psd file
pub const PSD_COMPONENTS: usize = 6;

/// Spectra together with their wavenumbers and wall-normal positions
#[derive(Debug, Clone, PartialEq)]
pub struct PowerSpectra {
    /// Spectra with logical axes `[component, kz, y, kx]`
    pub spectra: Field,
    /// Streamwise wavenumbers
    pub kx: Vec<f64>,
    /// Spanwise wavenumbers
    pub kz: Vec<f64>,
    /// Wall-normal positions of the spectra
    pub y: Vec<f64>,
}

/// A configurable reader for psd binaries
#[derive(Debug)]
pub struct PsdReader {
    y_symmetric: bool,
    byte_order: ByteOrder,
    budget: Box<dyn MemoryBudget>,
}

impl Default for PsdReader {
    fn default() -> Self {
        Self {
            y_symmetric: true,
            byte_order: ByteOrder::default(),
            budget: Box::new(Unchecked),
        }
    }
}

impl PsdReader {
    /// Just calls Default::default(), spectra are averaged across the channel
    pub fn new() -> Self {
        Default::default()
    }

    /// Average each wall-normal position with its mirror image
    pub fn set_y_symmetric(&mut self, y_symmetric: bool) {
        self.y_symmetric = y_symmetric;
    }

    pub fn set_byte_order(&mut self, byte_order: ByteOrder) {
        self.byte_order = byte_order;
    }

    pub fn set_memory_budget(&mut self, budget: impl MemoryBudget + 'static) {
        self.budget = Box::new(budget);
    }

    /// Expected shape of the psd file for a grid
    pub fn shape(dns: &DnsParams) -> Result<FieldShape> {
        FieldShape::try_new(
            PSD_COMPONENTS,
            dns.nz + 1,
            dns.ny + 1,
            dns.nx + 1,
            Layout::Cyzx,
        )
    }

    pub fn parse(&self, path: &Path, dns: &DnsParams) -> Result<PowerSpectra> {
        let shape = Self::shape(dns)?;
        let mapped = MappedField::open(path, shape, self.byte_order)?;

        self.budget.check(shape.byte_len())?;
        let mut spectra = mapped.load()?;
        drop(mapped);

        if self.y_symmetric {
            debug!("Averaging spectra across the channel centreline");
            spectra = symmetrise_y(&spectra)?;
        }

        Ok(PowerSpectra {
            spectra,
            kx: dns.kx(),
            kz: dns.kz(),
            y: wall_normal(dns.ny, dns.ny + 1, dns.a, dns.ymin, dns.ymax)?,
        })
    }
}

/// Average every `y` row with row `ny - 1 - y`
fn symmetrise_y(field: &Field) -> Result<Field> {
    let shape = *field.shape();
    let [nc, nz, ny, nx] = shape.counts();
    let mut values = vec![0.0; shape.len()];
    for c in 0..nc {
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    let here = shape.checked_offset([c, k, j, i])?;
                    let mirror = shape.checked_offset([c, k, ny - 1 - j, i])?;
                    values[here] = 0.5 * (field.values()[here] + field.values()[mirror]);
                }
            }
        }
    }
    Field::from_values(values, shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::memory::FixedBudget;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn dns() -> DnsParams {
        DnsParams {
            nx: 2,
            ny: 3,
            nz: 1,
            alfa0: 0.5,
            beta0: 1.0,
            a: 1.6,
            ymin: -1.0,
            ymax: 1.0,
        }
    }

    fn psd_file(dns: &DnsParams) -> NamedTempFile {
        let n = PsdReader::shape(dns).unwrap().len();
        let mut file = NamedTempFile::new().unwrap();
        for v in 0..n {
            file.write_all(&(v as f64).to_ne_bytes()).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn raw_spectra_and_axes() {
        let dns = dns();
        let file = psd_file(&dns);
        let mut reader = PsdReader::new();
        reader.set_y_symmetric(false);
        let psd = reader.parse(file.path(), &dns).unwrap();

        assert_eq!(psd.spectra.shape().dims(), [6, 4, 2, 3]);
        assert_eq!(psd.kx, vec![0.0, 0.5, 1.0]);
        assert_eq!(psd.kz, vec![0.0, 1.0]);
        assert_eq!(psd.y.len(), 4);
        // file order is (c, y, z, x): y stride is 6
        assert_eq!(psd.spectra[[0, 0, 1, 0]], 6.0);
        assert_eq!(psd.spectra[[0, 1, 0, 0]], 3.0);
    }

    #[test]
    fn symmetric_average() {
        let dns = dns();
        let file = psd_file(&dns);
        let psd = PsdReader::new().parse(file.path(), &dns).unwrap();

        // rows 0 and 3 mirror each other: (0 + 18) / 2
        assert_eq!(psd.spectra[[0, 0, 0, 0]], 9.0);
        assert_eq!(psd.spectra[[0, 0, 3, 0]], 9.0);
        // rows 1 and 2: (6 + 12) / 2
        assert_eq!(psd.spectra[[0, 0, 1, 0]], 9.0);
        assert_eq!(psd.spectra[[5, 1, 2, 2]], psd.spectra[[5, 1, 1, 2]]);
    }

    #[test]
    fn budget_is_checked_before_loading() {
        let dns = dns();
        let file = psd_file(&dns);
        let mut reader = PsdReader::new();
        reader.set_memory_budget(FixedBudget(64));
        assert!(matches!(
            reader.parse(file.path(), &dns),
            Err(Error::MemoryBudget { .. })
        ));
    }
}
