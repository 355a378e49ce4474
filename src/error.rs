//! Error types shared by tensors and layers.
//!
//! Every checked access returns a [`TensorError`] instead of a sentinel, so a
//! stored `T::MAX` and a failed lookup can never be confused. The sentinel
//! survives only behind the compatibility `[]` operators of
//! [`crate::tensor::Window`] and [`crate::tensor::WindowMut`].

use thiserror::Error;

/// Failure kinds for tensor addressing, reshaping and layer layout checks.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorError {
    /// The subscript lies outside `[0, extent)` of the selected dimension.
    #[error("index {index} is out of range for dimension {dim} with extent {extent}")]
    OutOfRange {
        /// Selected dimension (or coordinate axis).
        dim: usize,
        /// Offending subscript.
        index: usize,
        /// Current extent of that dimension.
        extent: usize,
    },

    /// The dimension selector is not one of `0`, `1`, `2` or `3`.
    #[error("dimension {dim} is not one of 0, 1, 2, 3")]
    InvalidDimension {
        /// Offending selector.
        dim: usize,
    },

    /// An in-range window subscript resolved past the end of the backing store.
    #[error("offset {offset} lies past the end of the {len}-element backing store")]
    StorageOverflow {
        /// Resolved linear offset.
        offset: usize,
        /// Length of the backing store.
        len: usize,
    },

    /// Raw storage does not hold exactly `w*x*y*z` elements.
    #[error("extents {extents:?} require {expected} elements, found {actual}")]
    ShapeMismatch {
        /// Declared extents.
        extents: [usize; 4],
        /// Product of the extents.
        expected: usize,
        /// Elements actually supplied.
        actual: usize,
    },

    /// The product of the extents does not fit in `usize`.
    #[error("extents {extents:?} overflow the addressable element count")]
    ExtentOverflow {
        /// Requested extents.
        extents: [usize; 4],
    },

    /// A sampling range was empty, reversed or not finite.
    #[error("sampling range is empty or not finite")]
    InvalidRange,

    /// A layer policy maps two logical cells onto one storage slot.
    #[error("two layer cells share storage offset {offset}")]
    LayoutOverlap {
        /// Shared linear offset.
        offset: usize,
    },
}

/// Shorthand for results carrying a [`TensorError`].
pub type TensorResult<T> = Result<T, TensorError>;
