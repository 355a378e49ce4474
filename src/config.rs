//! Bounds-mode selection.
//!
//! Tensors resolve invalid `[]` subscripts in one of two ways:
//!
//! - `Compat`: report a diagnostic and hand back a sentinel (default).
//! - `Strict`: panic with the [`TensorError`](crate::error::TensorError) message.
//!
//! The process-wide default lives in an `AtomicU8` and is copied into every
//! tensor at construction; a tensor may override it afterwards. The checked
//! `get`/`get_mut`/`set` methods ignore the mode and always return `Result`.

use core::convert::TryFrom;
use core::sync::atomic::{AtomicU8, Ordering};

/// How the `[]` operators react to an invalid subscript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum BoundsMode {
    /// Emit a diagnostic and degrade to a sentinel.
    #[default]
    Compat = 0,
    /// Fail fast by panicking.
    Strict,
}

impl TryFrom<u8> for BoundsMode {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Compat),
            1 => Ok(Self::Strict),
            _ => Err(()),
        }
    }
}

/// Default picked up by newly created tensors.
static GLOBAL_BOUNDS_MODE: AtomicU8 = AtomicU8::new(BoundsMode::Compat as u8);

/// Sets the default bounds mode picked up by tensors created afterwards.
///
/// # Example
///
/// ```
/// use curnn::config::{bounds_mode, set_bounds_mode, BoundsMode};
/// set_bounds_mode(BoundsMode::Strict);
/// assert_eq!(bounds_mode(), BoundsMode::Strict);
/// set_bounds_mode(BoundsMode::Compat);
/// ```
pub fn set_bounds_mode(mode: BoundsMode) {
    GLOBAL_BOUNDS_MODE.store(mode as u8, Ordering::Release);
}

/// Returns the current default bounds mode.
///
/// If the stored value is invalid, defaults to [`BoundsMode::Compat`].
pub fn bounds_mode() -> BoundsMode {
    BoundsMode::try_from(GLOBAL_BOUNDS_MODE.load(Ordering::Acquire)).unwrap_or_default()
}
