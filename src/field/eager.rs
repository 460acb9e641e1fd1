// standard library
use std::ops::Index;

// internal modules
use crate::error::{Error, Result};
use crate::field::FieldShape;

/// Fully materialised field
///
/// Values are kept in file order, so no transposition happens on read. Use
/// logical `[component, z, y, x]` indices regardless of the layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    values: Vec<f64>,
    shape: FieldShape,
}

impl Field {
    /// Wrap a vector of values in file order
    ///
    /// Fails with [Error::ShapeMismatch] if the length does not match.
    pub fn from_values(values: Vec<f64>, shape: FieldShape) -> Result<Self> {
        if values.len() != shape.len() {
            return Err(Error::ShapeMismatch {
                expected: shape.len(),
                found: values.len(),
            });
        }
        Ok(Self { values, shape })
    }

    pub fn shape(&self) -> &FieldShape {
        &self.shape
    }

    /// Raw values in file order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at a logical index, `None` if out of range
    ///
    /// ```rust
    /// # use chanpost::field::{Field, FieldShape, Layout};
    /// let shape = FieldShape::new(2, 1, 1, 3, Layout::Zyxc);
    /// let field = Field::from_values(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0], shape).unwrap();
    /// assert_eq!(field.get([1, 0, 0, 2]), Some(5.0));
    /// assert_eq!(field[[0, 0, 0, 1]], 2.0);
    /// ```
    pub fn get(&self, index: [usize; 4]) -> Option<f64> {
        self.shape.offset(index).map(|o| self.values[o])
    }

    /// All values of one component in logical `(z, y, x)` order
    pub fn component(&self, component: usize) -> Result<Vec<f64>> {
        Ok(self
            .shape
            .component_offsets(component)?
            .into_iter()
            .map(|o| self.values[o])
            .collect())
    }
}

impl Index<[usize; 4]> for Field {
    type Output = f64;

    fn index(&self, index: [usize; 4]) -> &Self::Output {
        match self.shape.offset(index) {
            Some(o) => &self.values[o],
            None => panic!(
                "index {index:?} out of bounds for field with counts {:?}",
                self.shape.counts()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Layout;

    fn sequential(shape: FieldShape) -> Field {
        let values = (0..shape.len()).map(|v| v as f64).collect();
        Field::from_values(values, shape).unwrap()
    }

    #[test]
    fn wrong_length_is_rejected() {
        let shape = FieldShape::new(3, 1, 1, 1, Layout::Czyx);
        let result = Field::from_values(vec![1.0, 2.0], shape);
        assert!(matches!(
            result,
            Err(Error::ShapeMismatch {
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn layouts_agree_on_logical_values() {
        let czyx = sequential(FieldShape::new(3, 5, 4, 7, Layout::Czyx));
        let zyxc = sequential(FieldShape::new(3, 5, 4, 7, Layout::Zyxc));

        // same flat position, different logical index
        assert_eq!(czyx[[1, 0, 0, 0]], 140.0);
        assert_eq!(zyxc[[1, 0, 0, 0]], 1.0);
        assert_eq!(czyx[[2, 4, 3, 6]], zyxc[[2, 4, 3, 6]]);
    }

    #[test]
    fn component_extraction() {
        let field = sequential(FieldShape::new(2, 2, 1, 2, Layout::Czyx));
        assert_eq!(field.component(1).unwrap(), vec![4.0, 5.0, 6.0, 7.0]);
        assert!(field.component(2).is_err());
        assert_eq!(field.get([0, 2, 0, 0]), None);
    }

    #[test]
    #[should_panic]
    fn index_out_of_range_panics() {
        let field = sequential(FieldShape::new(1, 1, 1, 2, Layout::Czyx));
        let _ = field[[0, 0, 0, 2]];
    }
}
