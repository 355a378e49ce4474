//! Flattened 4-D tensor storage.
//!
//! # Core Tensor Utilities
//!
//! [`Tensor4`] owns one contiguous buffer of `w*x*y*z` elements and exposes it
//! two ways:
//!
//! - **Additive windows**: `axis(d)[i]` views a one-dimensional slice of the
//!   buffer. Dimension 0 starts at offset `0`, dimension 1 at `w`, dimension 2
//!   at `w + x` and dimension 3 at `w + x + y`. These are not coordinates in a
//!   4-D grid; packed layer layouts depend on this exact arithmetic.
//! - **Coordinates**: `element([w, x, y, z])` addresses the buffer row-major
//!   with the first axis fastest. Layer policies index their pages through it.
//!
//! ## Design Highlights
//! - Storage length always equals the product of the current extents
//! - Every check ([`Tensor4::window_offset`], [`Tensor4::linear_index`]) is pure
//!   and returns a [`TensorError`]; nothing on that path logs
//! - The `[]` operators on [`Window`]/[`WindowMut`] resolve failures according
//!   to the tensor's [`BoundsMode`]
//!
//! ## Example
//!
//! ```rust
//! use curnn::config::BoundsMode;
//! use curnn::tensor::Tensor4;
//!
//! let mut t = Tensor4::<f32>::new(3, 2, 1, 1).with_bounds_mode(BoundsMode::Compat);
//! assert_eq!(t.size(), 6);
//! t.axis_mut(0)[2] = 5.0;
//! assert_eq!(t.axis(0)[2], 5.0);
//! assert_eq!(t.axis(0)[5], f32::MAX);
//! ```

mod window;

pub use self::window::{Window, WindowMut};

use briny::prelude::{TrustedData, Validate, ValidationError};
use rayon::prelude::*;

use crate::config::{self, BoundsMode};
use crate::element::Element;
use crate::error::{TensorError, TensorResult};

/// Number of addressable dimensions.
pub const DIMS: usize = 4;

fn checked_product(extents: [usize; DIMS]) -> Option<usize> {
    extents.iter().try_fold(1usize, |acc, &e| acc.checked_mul(e))
}

/// Extents and element count of storage received from outside the crate.
struct PackedExtents {
    extents: [usize; DIMS],
    len: usize,
}

impl Validate for PackedExtents {
    fn validate(&self) -> Result<(), ValidationError> {
        match checked_product(self.extents) {
            Some(expected) if expected == self.len => Ok(()),
            _ => Err(ValidationError),
        }
    }
}

/// A flattened 4-D container with extents `(w, x, y, z)`.
///
/// The tensor exclusively owns its storage. It carries no synchronisation;
/// parallel element-wise work goes through [`Tensor4::fill`] and
/// [`Tensor4::map_inplace`] or over disjoint chunks of [`Tensor4::as_mut_slice`].
#[derive(Debug, Clone)]
pub struct Tensor4<T> {
    extents: [usize; DIMS],
    data: Vec<T>,
    mode: BoundsMode,
}

impl<T: Element> Default for Tensor4<T> {
    fn default() -> Self {
        Self::new(0, 0, 0, 0)
    }
}

impl<T: PartialEq> PartialEq for Tensor4<T> {
    fn eq(&self, other: &Self) -> bool {
        self.extents == other.extents && self.data == other.data
    }
}

impl<T: Element> Tensor4<T> {
    /// Creates a zero-filled tensor with extents `(w, x, y, z)`.
    ///
    /// All-zero extents give an empty tensor.
    ///
    /// # Panics
    ///
    /// Panics if `w*x*y*z` overflows `usize`. Use [`Tensor4::try_new`] to
    /// handle that case.
    #[must_use]
    pub fn new(w: usize, x: usize, y: usize, z: usize) -> Self {
        match Self::try_new(w, x, y, z) {
            Ok(tensor) => tensor,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates a zero-filled tensor, reporting extent overflow as an error.
    ///
    /// # Errors
    ///
    /// [`TensorError::ExtentOverflow`] if `w*x*y*z` overflows `usize`.
    pub fn try_new(w: usize, x: usize, y: usize, z: usize) -> TensorResult<Self> {
        let extents = [w, x, y, z];
        let len = checked_product(extents).ok_or(TensorError::ExtentOverflow { extents })?;
        Ok(Self {
            extents,
            data: vec![T::ZERO; len],
            mode: config::bounds_mode(),
        })
    }

    /// Wraps existing storage.
    ///
    /// # Errors
    ///
    /// [`TensorError::ShapeMismatch`] if `data.len()` is not the product of
    /// `extents` (or that product overflows).
    pub fn from_raw_parts(extents: [usize; DIMS], data: Vec<T>) -> TensorResult<Self> {
        let parts = TrustedData::new(PackedExtents {
            extents,
            len: data.len(),
        })
        .map_err(|_| TensorError::ShapeMismatch {
            extents,
            expected: checked_product(extents).unwrap_or(usize::MAX),
            actual: data.len(),
        })?
        .into_inner();

        Ok(Self {
            extents: parts.extents,
            data,
            mode: config::bounds_mode(),
        })
    }

    /// Splits the tensor into its extents and storage.
    #[must_use]
    pub fn into_raw_parts(self) -> ([usize; DIMS], Vec<T>) {
        (self.extents, self.data)
    }

    /// Returns the tensor with its bounds mode replaced.
    #[must_use]
    pub fn with_bounds_mode(mut self, mode: BoundsMode) -> Self {
        self.mode = mode;
        self
    }

    /// Replaces the bounds mode used by the `[]` operators.
    pub fn set_bounds_mode(&mut self, mode: BoundsMode) {
        self.mode = mode;
    }

    /// Bounds mode used by the `[]` operators.
    #[must_use]
    pub const fn bounds_mode(&self) -> BoundsMode {
        self.mode
    }

    /// Total element count, `w*x*y*z`.
    ///
    /// Pure arithmetic on the extents; safe to call from any execution context.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.extents[0] * self.extents[1] * self.extents[2] * self.extents[3]
    }

    /// Whether the tensor holds no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Current extents `[w, x, y, z]`.
    #[must_use]
    pub const fn extents(&self) -> [usize; DIMS] {
        self.extents
    }

    /// Extent of one dimension.
    ///
    /// # Errors
    ///
    /// [`TensorError::InvalidDimension`] if `dim > 3`.
    pub fn extent(&self, dim: usize) -> TensorResult<usize> {
        self.extents
            .get(dim)
            .copied()
            .ok_or(TensorError::InvalidDimension { dim })
    }

    /// Changes the extents, keeping any axis passed as `None`.
    ///
    /// Storage is resized to the new product: existing values keep their
    /// linear position, growth is zero-filled and shrinking drops the tail.
    ///
    /// # Errors
    ///
    /// [`TensorError::ExtentOverflow`] if the new product overflows `usize`;
    /// the tensor is left unchanged.
    pub fn reshape(
        &mut self,
        w: Option<usize>,
        x: Option<usize>,
        y: Option<usize>,
        z: Option<usize>,
    ) -> TensorResult<()> {
        let [cw, cx, cy, cz] = self.extents;
        let extents = [w.unwrap_or(cw), x.unwrap_or(cx), y.unwrap_or(cy), z.unwrap_or(cz)];
        let len = checked_product(extents).ok_or(TensorError::ExtentOverflow { extents })?;

        self.data.resize(len, T::ZERO);
        self.extents = extents;
        Ok(())
    }

    /// Resolves `index` inside the additive window of dimension `dim`.
    ///
    /// Dimension `d` starts at the sum of the extents before it.
    ///
    /// # Errors
    ///
    /// - [`TensorError::InvalidDimension`] if `dim > 3`
    /// - [`TensorError::OutOfRange`] if `index >= extent(dim)`
    /// - [`TensorError::StorageOverflow`] if the window reaches past the store
    pub fn window_offset(&self, dim: usize, index: usize) -> TensorResult<usize> {
        let extent = self.extent(dim)?;
        if index >= extent {
            return Err(TensorError::OutOfRange { dim, index, extent });
        }

        let len = self.data.len();
        let offset = self.extents[..dim]
            .iter()
            .try_fold(index, |acc, &e| acc.checked_add(e))
            .ok_or(TensorError::StorageOverflow {
                offset: usize::MAX,
                len,
            })?;

        if offset >= len {
            return Err(TensorError::StorageOverflow { offset, len });
        }
        Ok(offset)
    }

    /// Resolves row-major coordinates `[w, x, y, z]`, first axis fastest.
    ///
    /// # Errors
    ///
    /// [`TensorError::OutOfRange`] naming the first axis whose coordinate is
    /// outside its extent.
    pub fn linear_index(&self, coords: [usize; DIMS]) -> TensorResult<usize> {
        for (dim, (&index, &extent)) in coords.iter().zip(&self.extents).enumerate() {
            if index >= extent {
                return Err(TensorError::OutOfRange { dim, index, extent });
            }
        }
        let [w, x, y, z] = coords;
        let [ew, ex, ey, _] = self.extents;
        Ok(w + ew * (x + ex * (y + ey * z)))
    }

    /// Element at row-major coordinates.
    ///
    /// # Errors
    ///
    /// See [`Tensor4::linear_index`].
    pub fn element(&self, coords: [usize; DIMS]) -> TensorResult<&T> {
        let offset = self.linear_index(coords)?;
        Ok(&self.data[offset])
    }

    /// Mutable element at row-major coordinates.
    ///
    /// # Errors
    ///
    /// See [`Tensor4::linear_index`].
    pub fn element_mut(&mut self, coords: [usize; DIMS]) -> TensorResult<&mut T> {
        let offset = self.linear_index(coords)?;
        Ok(&mut self.data[offset])
    }

    /// Read-only accessor for the additive window of dimension `dim`.
    ///
    /// The dimension is checked when the accessor is indexed, not here.
    #[must_use]
    pub fn axis(&self, dim: usize) -> Window<'_, T> {
        Window::new(self, dim)
    }

    /// Writable accessor for the additive window of dimension `dim`.
    #[must_use]
    pub fn axis_mut(&mut self, dim: usize) -> WindowMut<'_, T> {
        WindowMut::new(self, dim)
    }

    /// The whole backing store.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The whole backing store, mutably.
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Sets every element to `value` in parallel.
    pub fn fill(&mut self, value: T) {
        self.data.par_iter_mut().for_each(|v| *v = value);
    }

    /// Replaces every element `v` with `f(v)` in parallel.
    pub fn map_inplace<F>(&mut self, f: F)
    where
        F: Fn(T) -> T + Sync + Send,
    {
        self.data.par_iter_mut().for_each(|v| *v = f(*v));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_matches_storage() {
        let t = Tensor4::<f64>::new(3, 2, 4, 5);
        assert_eq!(t.size(), 120);
        assert_eq!(t.as_slice().len(), 120);
        assert!(t.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn empty_tensor() {
        let t = Tensor4::<u8>::default();
        assert_eq!(t.size(), 0);
        assert!(t.is_empty());
        assert_eq!(t.extents(), [0, 0, 0, 0]);
    }

    #[test]
    fn overflowing_extents_rejected() {
        let err = Tensor4::<u8>::try_new(usize::MAX, 2, 1, 1).unwrap_err();
        assert_eq!(
            err,
            TensorError::ExtentOverflow {
                extents: [usize::MAX, 2, 1, 1]
            }
        );
    }

    #[test]
    fn window_offsets_are_additive() {
        let t = Tensor4::<i32>::new(4, 3, 2, 2);
        assert_eq!(t.window_offset(0, 3), Ok(3));
        assert_eq!(t.window_offset(1, 0), Ok(4));
        assert_eq!(t.window_offset(2, 1), Ok(8));
        assert_eq!(t.window_offset(3, 1), Ok(10));
    }

    #[test]
    fn window_past_storage_is_reported() {
        // 3 + 2 + 1 reaches the end of a 6-element store
        let t = Tensor4::<i32>::new(3, 2, 1, 1);
        assert_eq!(
            t.window_offset(3, 0),
            Err(TensorError::StorageOverflow { offset: 6, len: 6 })
        );
    }

    #[test]
    fn window_checks_dim_then_index() {
        let t = Tensor4::<i32>::new(2, 2, 2, 2);
        assert_eq!(t.window_offset(4, 0), Err(TensorError::InvalidDimension { dim: 4 }));
        assert_eq!(
            t.window_offset(1, 2),
            Err(TensorError::OutOfRange { dim: 1, index: 2, extent: 2 })
        );
    }

    #[test]
    fn coordinates_are_first_axis_fastest() {
        let t = Tensor4::<f32>::new(4, 5, 2, 1);
        assert_eq!(t.linear_index([0, 0, 0, 0]), Ok(0));
        assert_eq!(t.linear_index([3, 0, 0, 0]), Ok(3));
        assert_eq!(t.linear_index([0, 1, 0, 0]), Ok(4));
        assert_eq!(t.linear_index([1, 2, 1, 0]), Ok(1 + 4 * (2 + 5)));
        assert_eq!(
            t.linear_index([0, 0, 2, 0]),
            Err(TensorError::OutOfRange { dim: 2, index: 2, extent: 2 })
        );
    }

    #[test]
    fn reshape_keeps_and_zero_fills() {
        let mut t = Tensor4::<i64>::new(2, 1, 1, 1);
        t.as_mut_slice().copy_from_slice(&[7, 9]);
        t.reshape(None, Some(3), None, None).unwrap();
        assert_eq!(t.extents(), [2, 3, 1, 1]);
        assert_eq!(t.as_slice(), &[7, 9, 0, 0, 0, 0]);

        t.reshape(Some(1), Some(1), None, None).unwrap();
        assert_eq!(t.size(), 1);
        assert_eq!(t.as_slice(), &[7]);
    }

    #[test]
    fn failed_reshape_leaves_tensor() {
        let mut t = Tensor4::<u16>::new(2, 2, 1, 1);
        assert!(t.reshape(Some(usize::MAX), None, None, None).is_err());
        assert_eq!(t.extents(), [2, 2, 1, 1]);
        assert_eq!(t.size(), 4);
    }

    #[test]
    fn raw_parts_are_validated() {
        let t = Tensor4::from_raw_parts([2, 2, 1, 1], vec![1.0f32, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(*t.element([1, 1, 0, 0]).unwrap(), 4.0);

        let err = Tensor4::from_raw_parts([2, 2, 1, 1], vec![1.0f32; 3]).unwrap_err();
        assert_eq!(
            err,
            TensorError::ShapeMismatch {
                extents: [2, 2, 1, 1],
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn parallel_fill_and_map() {
        let mut t = Tensor4::<f64>::new(16, 4, 2, 1);
        t.fill(1.5);
        t.map_inplace(|v| v * 2.0);
        assert!(t.as_slice().iter().all(|&v| v == 3.0));
    }
}
