//! Storage policies supplying a layer's packed parameter tensor.
//!
//! A policy owns the `wba` tensor (weights, biases, activations) and the
//! per-node `errors` buffer, and decides where each logical cell lives in
//! `wba`. Both policies here store one page per depth index along axis `y`:
//!
//! ```text
//!            node 0   node 1  ...  node N-1        axis w = node
//! row 0    | w(0,0)   w(0,1)  ...  w(0,N-1) |
//! row 1    | w(1,0)   w(1,1)  ...  w(1,N-1) |      axis x = row
//!   ...    |   ...                          |
//! row M-1  | w(M-1,0)         ...           |
//! row M    | b0       b1      ...  bN-1     |      bias row
//! row M+1  | a0       a1      ...  aN-1     |      activation row
//! ```
//!
//! `w(i, n)` is the weight from source unit `i` to node `n`. Page `0` holds
//! the current inputs, pages `1..depth` earlier hidden states. The two
//! policies differ only in `M`.

use crate::element::Element;
use crate::tensor::Tensor4;

/// Compile-time selected parameter storage for a [`Layer`](super::Layer).
///
/// `NODES`, `INPUTS` and `DEPTH` are the layer's fixed sizes. Implementors
/// choose the extents of `wba` and bind logical cells to coordinates; the
/// layer indexes only through [`TypePolicy::weight_coords`],
/// [`TypePolicy::bias_coords`] and [`TypePolicy::activation_coords`].
pub trait TypePolicy<T: Element, const NODES: usize, const INPUTS: usize, const DEPTH: usize> {
    /// Builds zeroed storage for the given sizes.
    fn allocate() -> Self;

    /// The packed weights/biases/activations tensor.
    fn wba(&self) -> &Tensor4<T>;

    /// The packed tensor, mutably.
    fn wba_mut(&mut self) -> &mut Tensor4<T>;

    /// Per-node error terms.
    fn errors(&self) -> &[T];

    /// Per-node error terms, mutably.
    fn errors_mut(&mut self) -> &mut [T];

    /// Coordinates of the weight from source `input` to `node` on `page`.
    fn weight_coords(node: usize, input: usize, page: usize) -> [usize; 4] {
        [node, input, page, 0]
    }

    /// Coordinates of the bias of `node` on `page`.
    fn bias_coords(node: usize, page: usize) -> [usize; 4];

    /// Coordinates of the activation of `node` on `page`.
    fn activation_coords(node: usize, page: usize) -> [usize; 4];
}

/// Recurrent layout: `max(inputs, nodes)` weight rows per page so that
/// history pages can hold hidden-to-hidden weights.
#[derive(Debug, Clone)]
pub struct Recurrent<T> {
    wba: Tensor4<T>,
    errors: Vec<T>,
}

impl<T: Element, const NODES: usize, const INPUTS: usize, const DEPTH: usize>
    TypePolicy<T, NODES, INPUTS, DEPTH> for Recurrent<T>
{
    fn allocate() -> Self {
        let rows = INPUTS.max(NODES) + 2;
        Self {
            wba: Tensor4::new(NODES, rows, DEPTH, 1),
            errors: vec![T::ZERO; NODES],
        }
    }

    fn wba(&self) -> &Tensor4<T> {
        &self.wba
    }

    fn wba_mut(&mut self) -> &mut Tensor4<T> {
        &mut self.wba
    }

    fn errors(&self) -> &[T] {
        &self.errors
    }

    fn errors_mut(&mut self) -> &mut [T] {
        &mut self.errors
    }

    fn bias_coords(node: usize, page: usize) -> [usize; 4] {
        [node, INPUTS.max(NODES), page, 0]
    }

    fn activation_coords(node: usize, page: usize) -> [usize; 4] {
        [node, INPUTS.max(NODES) + 1, page, 0]
    }
}

/// Fully-connected layout: exactly `inputs` weight rows per page.
#[derive(Debug, Clone)]
pub struct FullyConnected<T> {
    wba: Tensor4<T>,
    errors: Vec<T>,
}

impl<T: Element, const NODES: usize, const INPUTS: usize, const DEPTH: usize>
    TypePolicy<T, NODES, INPUTS, DEPTH> for FullyConnected<T>
{
    fn allocate() -> Self {
        Self {
            wba: Tensor4::new(NODES, INPUTS + 2, DEPTH, 1),
            errors: vec![T::ZERO; NODES],
        }
    }

    fn wba(&self) -> &Tensor4<T> {
        &self.wba
    }

    fn wba_mut(&mut self) -> &mut Tensor4<T> {
        &mut self.wba
    }

    fn errors(&self) -> &[T] {
        &self.errors
    }

    fn errors_mut(&mut self) -> &mut [T] {
        &mut self.errors
    }

    fn bias_coords(node: usize, page: usize) -> [usize; 4] {
        [node, INPUTS, page, 0]
    }

    fn activation_coords(node: usize, page: usize) -> [usize; 4] {
        [node, INPUTS + 1, page, 0]
    }
}
