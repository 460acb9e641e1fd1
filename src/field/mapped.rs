// standard library
use std::fs::File;
use std::path::{Path, PathBuf};

// internal modules
use crate::error::{Error, Result};
use crate::field::{ByteOrder, Field, FieldShape};

// external crates
use log::{debug, trace};
use memmap2::Mmap;

/// Field backed by a read-only memory map of the binary file
///
/// Nothing is copied on creation and nothing is validated either. The byte
/// length is checked against the shape on every access, so a truncated file
/// fails at the first read rather than at open.
///
/// The file handle and mapping live as long as the [MappedField], or until
/// [MappedField::release] is called. After release every access returns
/// [Error::Released].
///
/// The mapping assumes nobody writes to the file while it is mapped.
#[derive(Debug)]
pub struct MappedField {
    path: PathBuf,
    shape: FieldShape,
    order: ByteOrder,
    backing: Option<Backing>,
}

#[derive(Debug)]
struct Backing {
    map: Mmap,
    // held so the handle is released together with the mapping
    _file: File,
}

impl MappedField {
    /// Map a binary file without reading it
    pub fn open(path: &Path, shape: FieldShape, order: ByteOrder) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        // SAFETY: the mapping is read-only and files are treated as immutable
        // while mapped, which is the documented contract of this type
        let map = unsafe { Mmap::map(&file) }.map_err(|e| Error::io(path, e))?;
        debug!("Mapped {} ({} bytes)", path.display(), map.len());
        Ok(Self {
            path: path.to_path_buf(),
            shape,
            order,
            backing: Some(Backing { map, _file: file }),
        })
    }

    pub fn shape(&self) -> &FieldShape {
        &self.shape
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_released(&self) -> bool {
        self.backing.is_none()
    }

    /// Drop the mapping and close the file
    pub fn release(&mut self) {
        if self.backing.take().is_some() {
            trace!("Released mapping of {}", self.path.display());
        }
    }

    /// Validated bytes of the mapping
    fn bytes(&self) -> Result<&[u8]> {
        let backing = self.backing.as_ref().ok_or(Error::Released)?;
        self.shape.check_bytes(backing.map.len() as u64)?;
        Ok(&backing.map[..])
    }

    /// Value at a logical `[component, z, y, x]` index
    pub fn get(&self, index: [usize; 4]) -> Result<f64> {
        let bytes = self.bytes()?;
        let offset = self.shape.checked_offset(index)?;
        Ok(self.order.read(bytes, offset))
    }

    /// All values of one component in logical `(z, y, x)` order
    pub fn component(&self, component: usize) -> Result<Vec<f64>> {
        let bytes = self.bytes()?;
        Ok(self
            .shape
            .component_offsets(component)?
            .into_iter()
            .map(|o| self.order.read(bytes, o))
            .collect())
    }

    /// Copy the whole mapping into an eager [Field]
    pub fn load(&self) -> Result<Field> {
        let bytes = self.bytes()?;
        let values = self.order.decode_all(bytes);
        Field::from_values(values, self.shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Layout;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_values(values: &[f64]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for v in values {
            file.write_all(&v.to_ne_bytes()).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn reads_through_the_mapping() {
        let file = write_values(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        let shape = FieldShape::new(2, 1, 1, 3, Layout::Czyx);
        let field = MappedField::open(file.path(), shape, ByteOrder::Native).unwrap();
        assert_eq!(field.get([1, 0, 0, 1]).unwrap(), 4.0);
        assert_eq!(field.component(0).unwrap(), vec![0.0, 1.0, 2.0]);
        assert_eq!(field.load().unwrap().values(), &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn validation_is_deferred_to_access() {
        let file = write_values(&[0.0, 1.0, 2.0]);
        let shape = FieldShape::new(1, 1, 2, 2, Layout::Czyx);
        // opening works, the mismatch only shows up on access
        let field = MappedField::open(file.path(), shape, ByteOrder::Native).unwrap();
        assert!(matches!(
            field.get([0, 0, 0, 0]),
            Err(Error::ShapeMismatch {
                expected: 4,
                found: 3
            })
        ));
    }

    #[test]
    fn access_after_release_fails() {
        let file = write_values(&[1.0]);
        let shape = FieldShape::new(1, 1, 1, 1, Layout::Czyx);
        let mut field = MappedField::open(file.path(), shape, ByteOrder::Native).unwrap();
        assert_eq!(field.get([0, 0, 0, 0]).unwrap(), 1.0);

        field.release();
        assert!(field.is_released());
        assert!(matches!(field.get([0, 0, 0, 0]), Err(Error::Released)));
        assert!(matches!(field.load(), Err(Error::Released)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let shape = FieldShape::new(1, 1, 1, 1, Layout::Czyx);
        let result = MappedField::open(Path::new("does/not/exist.bin"), shape, ByteOrder::Native);
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
