//! Host-side diagnostics for bounds violations.
//!
//! The pure checks in [`crate::tensor`] never log; only the compatibility
//! `[]` operators call [`report`], once per violation. Events go through
//! `tracing` under the `curnn::diagnostics` target, and a per-thread counter
//! records how many were emitted so callers can assert on it without
//! installing a subscriber.

use core::cell::Cell;

use crate::error::TensorError;

thread_local! {
    static REPORTED: Cell<usize> = const { Cell::new(0) };
}

/// Emits one diagnostic event for `err`.
pub fn report(err: &TensorError) {
    REPORTED.with(|count| count.set(count.get() + 1));
    match *err {
        TensorError::OutOfRange { dim, index, extent } => {
            tracing::error!(target: "curnn::diagnostics", dim, index, extent, "{err}");
        }
        TensorError::InvalidDimension { dim } => {
            tracing::error!(target: "curnn::diagnostics", dim, "{err}");
        }
        _ => tracing::error!(target: "curnn::diagnostics", "{err}"),
    }
}

/// Number of diagnostics reported by the calling thread so far.
#[must_use]
pub fn reported_on_this_thread() -> usize {
    REPORTED.with(Cell::get)
}
