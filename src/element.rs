//! Numeric element types storable in a [`Tensor4`](crate::tensor::Tensor4).

use core::fmt::Debug;

use rand::distr::uniform::SampleUniform;

/// A numeric tensor element with a zero and a maximum representable value.
///
/// `MAX` is the read-only sentinel handed out by the compatibility `[]`
/// operator on an invalid subscript.
pub trait Element: Copy + Default + PartialOrd + Debug + Send + Sync + SampleUniform + 'static {
    /// Additive identity; fresh storage is filled with it.
    const ZERO: Self;
    /// Largest representable value.
    const MAX: Self;

    /// Whether `self` equals the read-only sentinel.
    fn is_sentinel(&self) -> bool {
        *self == Self::MAX
    }
}

macro_rules! element_impl {
    ($zero:expr; $($ty:ty),*) => {
        $(
            impl Element for $ty {
                const ZERO: Self = $zero;
                const MAX: Self = <$ty>::MAX;
            }
        )*
    };
}

element_impl!(0; u8, u16, u32, u64, i8, i16, i32, i64);
element_impl!(0.0; f32, f64);
