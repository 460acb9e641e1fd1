//! Field arrays decoded from binary dumps
//!
//! # Overview
//!
//! A field is a four dimensional array of `f64` with logical axes
//! `[component, z, y, x]`. The component axis holds the quantities stored per
//! grid point, e.g. 3 for a velocity vector or 6 for a symmetric tensor.
//!
//! Binary dumps carry no header, so the [FieldShape] (counts plus on-disk
//! [Layout]) always comes from outside the file.
//!
//! Two representations share the [FieldView] interface:
//!
//! | Type          | Backing                     | Validation         |
//! | ------------- | --------------------------- | ------------------ |
//! | [Field]       | owned `Vec<f64>`            | on read            |
//! | [MappedField] | memory map of the open file | on every access    |
//!
//! ```rust
//! use chanpost::field::{Field, FieldShape, FieldView, Layout};
//!
//! let shape = FieldShape::new(3, 2, 2, 2, Layout::Czyx);
//! let field = Field::from_values(vec![0.0; 24], shape).unwrap();
//! assert_eq!(field.value([2, 1, 1, 1]).unwrap(), 0.0);
//! ```

// Split into subfiles for development, but anything important is re-exported
mod eager;
mod mapped;
mod shape;

#[doc(inline)]
pub use crate::field::eager::Field;

#[doc(inline)]
pub use crate::field::mapped::MappedField;

#[doc(inline)]
pub use crate::field::shape::{FieldShape, Layout};

// internal modules
use crate::error::{Error, Result};

/// Byte order of the values in a binary file
///
/// The exporters write whatever the machine running the simulation uses,
/// which in practice is little endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    #[default]
    Native,
    Little,
    Big,
}

impl ByteOrder {
    /// Decode one value from its 8 bytes
    pub fn decode(&self, bytes: [u8; 8]) -> f64 {
        match self {
            ByteOrder::Native => f64::from_ne_bytes(bytes),
            ByteOrder::Little => f64::from_le_bytes(bytes),
            ByteOrder::Big => f64::from_be_bytes(bytes),
        }
    }

    /// Decode the value at flat position `offset` of a byte slice
    pub(crate) fn read(&self, bytes: &[u8], offset: usize) -> f64 {
        let start = offset * 8;
        let mut buffer = [0u8; 8];
        buffer.copy_from_slice(&bytes[start..start + 8]);
        self.decode(buffer)
    }

    /// Decode a whole byte slice, any trailing partial value is ignored
    pub(crate) fn decode_all(&self, bytes: &[u8]) -> Vec<f64> {
        bytes
            .chunks_exact(8)
            .map(|chunk| {
                let mut buffer = [0u8; 8];
                buffer.copy_from_slice(chunk);
                self.decode(buffer)
            })
            .collect()
    }
}

/// Read access shared by eager and mapped fields
pub trait FieldView {
    fn shape(&self) -> &FieldShape;

    /// Value at a logical `[component, z, y, x]` index
    fn value(&self, index: [usize; 4]) -> Result<f64>;

    /// All values of one component in logical `(z, y, x)` order
    fn component_values(&self, component: usize) -> Result<Vec<f64>>;
}

impl FieldView for Field {
    fn shape(&self) -> &FieldShape {
        Field::shape(self)
    }

    fn value(&self, index: [usize; 4]) -> Result<f64> {
        self.get(index).ok_or(Error::OutOfBounds {
            index,
            counts: self.shape().counts(),
        })
    }

    fn component_values(&self, component: usize) -> Result<Vec<f64>> {
        self.component(component)
    }
}

impl FieldView for MappedField {
    fn shape(&self) -> &FieldShape {
        MappedField::shape(self)
    }

    fn value(&self, index: [usize; 4]) -> Result<f64> {
        self.get(index)
    }

    fn component_values(&self, component: usize) -> Result<Vec<f64>> {
        self.component(component)
    }
}

/// Result of a read in either mode
#[derive(Debug)]
pub enum FieldData {
    Eager(Field),
    Lazy(MappedField),
}

impl FieldData {
    /// Materialise into an eager field, copying a mapping if needed
    pub fn into_field(self) -> Result<Field> {
        match self {
            FieldData::Eager(field) => Ok(field),
            FieldData::Lazy(mapped) => mapped.load(),
        }
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self, FieldData::Lazy(_))
    }
}

impl FieldView for FieldData {
    fn shape(&self) -> &FieldShape {
        match self {
            FieldData::Eager(field) => field.shape(),
            FieldData::Lazy(mapped) => mapped.shape(),
        }
    }

    fn value(&self, index: [usize; 4]) -> Result<f64> {
        match self {
            FieldData::Eager(field) => FieldView::value(field, index),
            FieldData::Lazy(mapped) => mapped.get(index),
        }
    }

    fn component_values(&self, component: usize) -> Result<Vec<f64>> {
        match self {
            FieldData::Eager(field) => field.component(component),
            FieldData::Lazy(mapped) => mapped.component(component),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_orders() {
        let value = 1.25f64;
        assert_eq!(ByteOrder::Little.decode(value.to_le_bytes()), value);
        assert_eq!(ByteOrder::Big.decode(value.to_be_bytes()), value);
        assert_eq!(ByteOrder::Native.decode(value.to_ne_bytes()), value);
    }

    #[test]
    fn decode_all_in_file_order() {
        let bytes: Vec<u8> = [1.0f64, 2.0, 3.0]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        assert_eq!(ByteOrder::Little.decode_all(&bytes), vec![1.0, 2.0, 3.0]);
        assert_eq!(ByteOrder::Little.read(&bytes, 2), 3.0);
    }

    #[test]
    fn field_data_views() {
        let shape = FieldShape::new(1, 1, 1, 2, Layout::Czyx);
        let data = FieldData::Eager(Field::from_values(vec![4.0, 5.0], shape).unwrap());
        assert!(!data.is_lazy());
        assert_eq!(data.value([0, 0, 0, 1]).unwrap(), 5.0);
        assert!(matches!(
            data.value([0, 0, 1, 0]),
            Err(Error::OutOfBounds { .. })
        ));
        assert_eq!(data.into_field().unwrap().values(), &[4.0, 5.0]);
    }
}
