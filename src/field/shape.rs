// internal modules
use crate::error::{Error, Result};
use crate::utils::f;

// external crates
use serde::Serialize;

/// Order of the four logical axes as they appear in a binary file
///
/// Logical indexing is always `[component, z, y, x]`, the layout only decides
/// how that maps onto the flat sequence of values on disk. The last axis named
/// is the fastest varying one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Layout {
    /// `(component, z, y, x)`
    Czyx,
    /// `(z, y, x, component)`, components interleaved per point
    Zyxc,
    /// `(component, y, z, x)`, as used by the spectra dumps
    Cyzx,
}

impl Layout {
    /// Logical axis held by each file axis, slowest first
    fn axis_order(&self) -> [usize; 4] {
        match self {
            Layout::Czyx => [0, 1, 2, 3],
            Layout::Zyxc => [1, 2, 3, 0],
            Layout::Cyzx => [0, 2, 1, 3],
        }
    }
}

/// Expected shape of a field and how it is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldShape {
    /// Logical counts `[component, z, y, x]`
    counts: [usize; 4],
    layout: Layout,
}

impl FieldShape {
    /// Shape for counts known to be small, see [FieldShape::try_new]
    pub fn new(components: usize, nz: usize, ny: usize, nx: usize, layout: Layout) -> Self {
        Self {
            counts: [components, nz, ny, nx],
            layout,
        }
    }

    /// Shape whose byte length is guaranteed to be addressable
    ///
    /// Counts usually come from a text file, so a typo can describe a field
    /// of more than `usize::MAX` bytes. That fails with
    /// [Error::DegenerateGrid] here rather than overflowing later.
    ///
    /// ```rust
    /// # use chanpost::field::{FieldShape, Layout};
    /// assert!(FieldShape::try_new(3, 5, 4, 7, Layout::Czyx).is_ok());
    /// assert!(FieldShape::try_new(3, 1 << 22, 1 << 21, 1 << 21, Layout::Zyxc).is_err());
    /// ```
    pub fn try_new(
        components: usize,
        nz: usize,
        ny: usize,
        nx: usize,
        layout: Layout,
    ) -> Result<Self> {
        let counts = [components, nz, ny, nx];
        let bytes = counts
            .iter()
            .try_fold(std::mem::size_of::<f64>(), |acc, &n| acc.checked_mul(n));
        match bytes {
            Some(_) => Ok(Self { counts, layout }),
            None => Err(Error::DegenerateGrid(f!(
                "field of {counts:?} values is too large to address"
            ))),
        }
    }

    /// Logical counts `[component, z, y, x]`
    pub fn counts(&self) -> [usize; 4] {
        self.counts
    }

    pub fn components(&self) -> usize {
        self.counts[0]
    }

    pub fn nz(&self) -> usize {
        self.counts[1]
    }

    pub fn ny(&self) -> usize {
        self.counts[2]
    }

    pub fn nx(&self) -> usize {
        self.counts[3]
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Dimensions in file order
    ///
    /// ```rust
    /// # use chanpost::field::{FieldShape, Layout};
    /// let shape = FieldShape::new(3, 5, 4, 7, Layout::Zyxc);
    /// assert_eq!(shape.dims(), [5, 4, 7, 3]);
    /// ```
    pub fn dims(&self) -> [usize; 4] {
        self.layout.axis_order().map(|axis| self.counts[axis])
    }

    /// Total number of values, saturating for shapes built with `new`
    pub fn len(&self) -> usize {
        self.counts.iter().fold(1, |acc: usize, &n| acc.saturating_mul(n))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of bytes a file of this shape must contain
    pub fn byte_len(&self) -> u64 {
        (self.len() as u64).saturating_mul(std::mem::size_of::<f64>() as u64)
    }

    /// Stride of each logical axis in the flat file sequence
    fn strides(&self) -> [usize; 4] {
        let mut strides = [0; 4];
        let mut stride: usize = 1;
        for &axis in self.layout.axis_order().iter().rev() {
            strides[axis] = stride;
            stride = stride.saturating_mul(self.counts[axis]);
        }
        strides
    }

    /// Flat position of a logical `[component, z, y, x]` index
    ///
    /// Returns `None` when any part of the index is out of range.
    pub fn offset(&self, index: [usize; 4]) -> Option<usize> {
        if index.iter().zip(self.counts.iter()).any(|(i, n)| i >= n) {
            return None;
        }
        let strides = self.strides();
        index
            .iter()
            .zip(strides.iter())
            .try_fold(0usize, |acc, (i, s)| i.checked_mul(*s)?.checked_add(acc))
    }

    /// Like [FieldShape::offset] but with a descriptive error
    pub(crate) fn checked_offset(&self, index: [usize; 4]) -> Result<usize> {
        self.offset(index).ok_or(Error::OutOfBounds {
            index,
            counts: self.counts,
        })
    }

    /// Flat positions of one component, in logical `(z, y, x)` order
    pub(crate) fn component_offsets(&self, component: usize) -> Result<Vec<usize>> {
        if component >= self.components() {
            return Err(Error::OutOfBounds {
                index: [component, 0, 0, 0],
                counts: self.counts,
            });
        }
        let [sc, sz, sy, sx] = self.strides();
        let base = component * sc;
        let mut offsets = Vec::with_capacity(self.nz() * self.ny() * self.nx());
        for k in 0..self.nz() {
            for j in 0..self.ny() {
                for i in 0..self.nx() {
                    offsets.push(base + k * sz + j * sy + i * sx);
                }
            }
        }
        Ok(offsets)
    }

    /// Make sure a byte length holds exactly this shape
    pub(crate) fn check_bytes(&self, bytes: u64) -> Result<()> {
        let width = std::mem::size_of::<f64>() as u64;
        if bytes % width != 0 {
            return Err(Error::PartialValue { bytes });
        }
        let found = (bytes / width) as usize;
        if found != self.len() {
            return Err(Error::ShapeMismatch {
                expected: self.len(),
                found,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for FieldShape {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let [a, b, c, d] = self.dims();
        write!(f, "({a}, {b}, {c}, {d}) {:?}", self.layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Layout::Czyx, [3, 5, 4, 7])]
    #[case(Layout::Zyxc, [5, 4, 7, 3])]
    #[case(Layout::Cyzx, [3, 4, 5, 7])]
    fn file_dimensions(#[case] layout: Layout, #[case] dims: [usize; 4]) {
        let shape = FieldShape::new(3, 5, 4, 7, layout);
        assert_eq!(shape.dims(), dims);
        assert_eq!(shape.len(), 420);
        assert_eq!(shape.byte_len(), 3360);
    }

    #[test]
    fn component_first_offsets() {
        let shape = FieldShape::new(3, 5, 4, 7, Layout::Czyx);
        assert_eq!(shape.offset([0, 0, 0, 0]), Some(0));
        assert_eq!(shape.offset([0, 0, 0, 1]), Some(1));
        assert_eq!(shape.offset([0, 0, 1, 0]), Some(7));
        assert_eq!(shape.offset([0, 1, 0, 0]), Some(28));
        assert_eq!(shape.offset([1, 0, 0, 0]), Some(140));
        assert_eq!(shape.offset([2, 4, 3, 6]), Some(419));
    }

    #[test]
    fn component_last_offsets() {
        let shape = FieldShape::new(3, 5, 4, 7, Layout::Zyxc);
        assert_eq!(shape.offset([1, 0, 0, 0]), Some(1));
        assert_eq!(shape.offset([0, 0, 0, 1]), Some(3));
        assert_eq!(shape.offset([0, 0, 1, 0]), Some(21));
        assert_eq!(shape.offset([0, 1, 0, 0]), Some(84));
        assert_eq!(shape.offset([2, 4, 3, 6]), Some(419));
    }

    #[test]
    fn spectra_offsets() {
        let shape = FieldShape::new(6, 3, 4, 5, Layout::Cyzx);
        assert_eq!(shape.offset([0, 1, 0, 0]), Some(5));
        assert_eq!(shape.offset([0, 0, 1, 0]), Some(15));
        assert_eq!(shape.offset([1, 0, 0, 0]), Some(60));
    }

    #[test]
    fn out_of_range_index() {
        let shape = FieldShape::new(3, 5, 4, 7, Layout::Czyx);
        assert_eq!(shape.offset([3, 0, 0, 0]), None);
        assert_eq!(shape.offset([0, 0, 0, 7]), None);
        assert!(matches!(
            shape.checked_offset([0, 5, 0, 0]),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn unaddressable_shapes_are_refused() {
        let huge = FieldShape::try_new(3, 1 << 22, 1 << 21, 1 << 21, Layout::Zyxc);
        assert!(matches!(huge, Err(Error::DegenerateGrid(_))));
        assert!(FieldShape::try_new(usize::MAX, 1, 1, 1, Layout::Czyx).is_err());
        assert_eq!(
            FieldShape::try_new(3, 5, 4, 7, Layout::Czyx).unwrap(),
            FieldShape::new(3, 5, 4, 7, Layout::Czyx)
        );
    }

    #[test]
    fn oversized_shape_never_matches_a_file() {
        let shape = FieldShape::new(3, 1 << 22, 1 << 21, 1 << 21, Layout::Zyxc);
        assert_eq!(shape.len(), usize::MAX);
        assert!(matches!(
            shape.check_bytes(0),
            Err(Error::ShapeMismatch { found: 0, .. })
        ));
        assert_eq!(shape.offset([2, (1 << 22) - 1, 0, 0]), None);
    }

    #[test]
    fn component_offsets_follow_logical_order() {
        let shape = FieldShape::new(2, 1, 2, 2, Layout::Zyxc);
        assert_eq!(shape.component_offsets(1).unwrap(), vec![1, 3, 5, 7]);
        assert!(shape.component_offsets(2).is_err());
    }

    #[test]
    fn byte_length_checks() {
        let shape = FieldShape::new(1, 1, 2, 2, Layout::Czyx);
        assert!(shape.check_bytes(32).is_ok());
        assert!(matches!(
            shape.check_bytes(40),
            Err(Error::ShapeMismatch {
                expected: 4,
                found: 5
            })
        ));
        assert!(matches!(
            shape.check_bytes(33),
            Err(Error::PartialValue { bytes: 33 })
        ));
        assert!(shape.check_bytes(33).unwrap_err().is_shape_mismatch());
        assert!(shape.check_bytes(40).unwrap_err().is_shape_mismatch());
    }
}
