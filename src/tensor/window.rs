//! Per-dimension accessors returned by [`Tensor4::axis`] and [`Tensor4::axis_mut`].
//!
//! `get`/`get_mut`/`set` are the checked interface. The `[]` operators exist
//! for layouts written against the sentinel convention: in
//! [`BoundsMode::Compat`] an invalid subscript reports one diagnostic and
//! yields `T::MAX` (read-only) or the first stored element (writable); in
//! [`BoundsMode::Strict`] it panics.

use core::ops::{Index, IndexMut};

use super::Tensor4;
use crate::config::BoundsMode;
use crate::diagnostics;
use crate::element::Element;
use crate::error::{TensorError, TensorResult};

fn degrade(mode: BoundsMode, err: &TensorError) {
    match mode {
        BoundsMode::Strict => panic!("{err}"),
        BoundsMode::Compat => diagnostics::report(err),
    }
}

/// Read-only view of one additive window of a [`Tensor4`].
#[derive(Debug)]
pub struct Window<'a, T> {
    tensor: &'a Tensor4<T>,
    dim: usize,
    sentinel: T,
}

impl<'a, T: Element> Window<'a, T> {
    pub(super) fn new(tensor: &'a Tensor4<T>, dim: usize) -> Self {
        Self {
            tensor,
            dim,
            sentinel: T::MAX,
        }
    }

    /// Selected dimension.
    #[must_use]
    pub const fn dim(&self) -> usize {
        self.dim
    }

    /// Extent of the selected dimension, or `0` if the selector is invalid.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tensor.extent(self.dim).unwrap_or(0)
    }

    /// Whether the window admits no subscripts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checked read.
    ///
    /// # Errors
    ///
    /// See [`Tensor4::window_offset`].
    pub fn get(&self, index: usize) -> TensorResult<&'a T> {
        let tensor: &'a Tensor4<T> = self.tensor;
        let offset = tensor.window_offset(self.dim, index)?;
        Ok(&tensor.data[offset])
    }
}

impl<T: Element> Index<usize> for Window<'_, T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Ok(value) => value,
            Err(err) => {
                degrade(self.tensor.mode, &err);
                &self.sentinel
            }
        }
    }
}

/// Writable view of one additive window of a [`Tensor4`].
#[derive(Debug)]
pub struct WindowMut<'a, T> {
    tensor: &'a mut Tensor4<T>,
    dim: usize,
    // absorbs fallback writes when the store has no first element
    scratch: T,
}

impl<'a, T: Element> WindowMut<'a, T> {
    pub(super) fn new(tensor: &'a mut Tensor4<T>, dim: usize) -> Self {
        Self {
            tensor,
            dim,
            scratch: T::ZERO,
        }
    }

    /// Selected dimension.
    #[must_use]
    pub const fn dim(&self) -> usize {
        self.dim
    }

    /// Extent of the selected dimension, or `0` if the selector is invalid.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tensor.extent(self.dim).unwrap_or(0)
    }

    /// Whether the window admits no subscripts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checked read.
    ///
    /// # Errors
    ///
    /// See [`Tensor4::window_offset`].
    pub fn get(&self, index: usize) -> TensorResult<&T> {
        let offset = self.tensor.window_offset(self.dim, index)?;
        Ok(&self.tensor.data[offset])
    }

    /// Checked mutable access.
    ///
    /// # Errors
    ///
    /// See [`Tensor4::window_offset`].
    pub fn get_mut(&mut self, index: usize) -> TensorResult<&mut T> {
        let offset = self.tensor.window_offset(self.dim, index)?;
        Ok(&mut self.tensor.data[offset])
    }

    /// Checked write.
    ///
    /// # Errors
    ///
    /// See [`Tensor4::window_offset`]. Nothing is written on error.
    pub fn set(&mut self, index: usize, value: T) -> TensorResult<()> {
        *self.get_mut(index)? = value;
        Ok(())
    }

    fn fallback(&self) -> &T {
        self.tensor.data.first().unwrap_or(&self.scratch)
    }

    fn fallback_mut(&mut self) -> &mut T {
        match self.tensor.data.first_mut() {
            Some(first) => first,
            None => &mut self.scratch,
        }
    }
}

impl<T: Element> Index<usize> for WindowMut<'_, T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.tensor.window_offset(self.dim, index) {
            Ok(offset) => &self.tensor.data[offset],
            Err(err) => {
                degrade(self.tensor.mode, &err);
                self.fallback()
            }
        }
    }
}

impl<T: Element> IndexMut<usize> for WindowMut<'_, T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        match self.tensor.window_offset(self.dim, index) {
            Ok(offset) => &mut self.tensor.data[offset],
            Err(err) => {
                degrade(self.tensor.mode, &err);
                self.fallback_mut()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::reported_on_this_thread;

    fn compat(w: usize, x: usize, y: usize, z: usize) -> Tensor4<f32> {
        Tensor4::new(w, x, y, z).with_bounds_mode(BoundsMode::Compat)
    }

    #[test]
    fn checked_round_trip_on_every_window() {
        let mut t = compat(3, 2, 2, 1);
        let mut next = 1.0;
        for dim in 0..4 {
            for index in 0..t.extents()[dim] {
                t.axis_mut(dim).set(index, next).unwrap();
                assert_eq!(*t.axis(dim).get(index).unwrap(), next);
                next += 1.0;
            }
        }
    }

    #[test]
    fn read_sentinel_and_one_diagnostic() {
        let t = compat(3, 2, 1, 1);
        let before = reported_on_this_thread();
        assert_eq!(t.axis(0)[5], f32::MAX);
        assert_eq!(reported_on_this_thread(), before + 1);
    }

    #[test]
    fn invalid_dimension_degrades() {
        let mut t = compat(2, 2, 2, 2);
        t.axis_mut(0)[0] = 4.0;
        let before = reported_on_this_thread();
        assert_eq!(t.axis(7)[0], f32::MAX);
        assert_eq!(t.axis_mut(7)[0], 4.0);
        assert_eq!(reported_on_this_thread(), before + 2);
        assert_eq!(t.axis(7).len(), 0);
    }

    #[test]
    fn writable_fallback_is_first_element() {
        let mut t = compat(3, 2, 1, 1);
        let before = reported_on_this_thread();
        t.axis_mut(1)[9] = 8.0;
        assert_eq!(reported_on_this_thread(), before + 1);
        assert_eq!(t.as_slice()[0], 8.0);
    }

    #[test]
    fn empty_store_absorbs_fallback_write() {
        let mut t = compat(0, 0, 0, 0);
        t.axis_mut(0)[0] = 3.0;
        assert!(t.as_slice().is_empty());
    }

    #[test]
    fn checked_set_does_not_write_on_error() {
        let mut t = compat(2, 1, 1, 1);
        assert_eq!(
            t.axis_mut(0).set(2, 1.0),
            Err(TensorError::OutOfRange { dim: 0, index: 2, extent: 2 })
        );
        assert!(t.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn strict_mode_panics() {
        let t = Tensor4::<f32>::new(3, 2, 1, 1).with_bounds_mode(BoundsMode::Strict);
        let _value: f32 = t.axis(0)[5];
    }

    #[test]
    fn stored_max_is_not_an_error() {
        let mut t = compat(2, 1, 1, 1);
        t.axis_mut(0).set(1, f32::MAX).unwrap();
        assert_eq!(t.axis(0).get(1), Ok(&f32::MAX));
        assert!(t.axis(0).get(2).is_err());
    }
}
