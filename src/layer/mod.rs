//! Network layers over a compile-time storage policy.
//!
//! A [`Layer`] fixes its node count, input count and depth as const
//! generics and delegates parameter storage to a [`TypePolicy`]. Different
//! layer kinds are different policies; nothing here is dispatched at
//! runtime.
//!
//! # Example
//!
//! ```rust
//! use curnn::layer::RecurrentLayer;
//!
//! let mut layer = RecurrentLayer::<f32, 4, 3, 2>::new();
//! layer.initialize_weights(-1.0, 1.0).unwrap();
//! assert!(layer.outputs().iter().all(|&o| o == 0.0));
//! assert_eq!(layer.wba().extents(), [4, 6, 2, 1]);
//! ```

mod policy;

pub use self::policy::{FullyConnected, Recurrent, TypePolicy};

use rand::Rng;
use tracing::debug;

use crate::element::Element;
use crate::error::{TensorError, TensorResult};
use crate::math::Sampler;
use crate::tensor::Tensor4;

/// A layer of `NODES` nodes fed by `INPUTS` inputs over `DEPTH` pages.
#[derive(Debug, Clone)]
pub struct Layer<T, const NODES: usize, const INPUTS: usize, const DEPTH: usize, P> {
    policy: P,
    outputs: Vec<T>,
}

/// A layer whose pages can carry hidden-state history.
pub type RecurrentLayer<T, const NODES: usize, const INPUTS: usize, const DEPTH: usize> =
    Layer<T, NODES, INPUTS, DEPTH, Recurrent<T>>;

/// A layer with compact input-only pages.
pub type FullyConnectedLayer<T, const NODES: usize, const INPUTS: usize, const DEPTH: usize> =
    Layer<T, NODES, INPUTS, DEPTH, FullyConnected<T>>;

impl<T, const NODES: usize, const INPUTS: usize, const DEPTH: usize, P> Default
    for Layer<T, NODES, INPUTS, DEPTH, P>
where
    T: Element,
    P: TypePolicy<T, NODES, INPUTS, DEPTH>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const NODES: usize, const INPUTS: usize, const DEPTH: usize, P> Layer<T, NODES, INPUTS, DEPTH, P>
where
    T: Element,
    P: TypePolicy<T, NODES, INPUTS, DEPTH>,
{
    /// Creates a layer with zeroed outputs and policy-allocated storage.
    #[must_use]
    pub fn new() -> Self {
        debug!(nodes = NODES, inputs = INPUTS, depth = DEPTH, "allocating layer");
        Self {
            policy: P::allocate(),
            outputs: vec![T::ZERO; NODES],
        }
    }

    /// Number of nodes.
    #[must_use]
    pub const fn num_nodes(&self) -> usize {
        NODES
    }

    /// Number of inputs.
    #[must_use]
    pub const fn num_inputs(&self) -> usize {
        INPUTS
    }

    /// Number of pages (timesteps feeding this layer).
    #[must_use]
    pub const fn depth(&self) -> usize {
        DEPTH
    }

    /// Fills every weight cell with a uniform draw from `[min, max]`.
    ///
    /// Covers `depth × inputs × nodes` cells; bias rows, activation rows and
    /// outputs are left untouched.
    ///
    /// # Errors
    ///
    /// - [`TensorError::InvalidRange`] if the range is empty or not finite;
    ///   nothing is written
    /// - [`TensorError::OutOfRange`] if the policy places a weight outside
    ///   its own tensor
    pub fn initialize_weights(&mut self, min: T, max: T) -> TensorResult<()> {
        self.initialize_weights_with(&mut rand::rng(), min, max)
    }

    /// Same as [`Layer::initialize_weights`], drawing from `rng`.
    ///
    /// # Errors
    ///
    /// See [`Layer::initialize_weights`].
    pub fn initialize_weights_with<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        min: T,
        max: T,
    ) -> TensorResult<()> {
        let sampler = Sampler::new(min, max)?;
        let wba = self.policy.wba_mut();
        for d in 0..DEPTH {
            for i in 0..INPUTS {
                for n in 0..NODES {
                    *wba.element_mut(P::weight_coords(n, i, d))? = sampler.draw(rng);
                }
            }
        }
        debug!(cells = DEPTH * INPUTS * NODES, ?min, ?max, "initialized layer weights");
        Ok(())
    }

    /// The packed weights/biases/activations tensor.
    #[must_use]
    pub fn wba(&self) -> &Tensor4<T> {
        self.policy.wba()
    }

    /// Layer outputs, one per node.
    #[must_use]
    pub fn outputs(&self) -> &[T] {
        &self.outputs
    }

    /// Layer outputs, mutably.
    #[must_use]
    pub fn outputs_mut(&mut self) -> &mut [T] {
        &mut self.outputs
    }

    /// Per-node error terms held by the policy.
    #[must_use]
    pub fn errors(&self) -> &[T] {
        self.policy.errors()
    }

    /// Weight from source `input` to `node` on `page`.
    ///
    /// # Errors
    ///
    /// [`TensorError::OutOfRange`] if any argument exceeds the layer's sizes.
    pub fn weight(&self, node: usize, input: usize, page: usize) -> TensorResult<T> {
        check(0, node, NODES)?;
        check(1, input, INPUTS)?;
        check(2, page, DEPTH)?;
        self.wba().element(P::weight_coords(node, input, page)).copied()
    }

    /// Bias of `node` on `page`.
    ///
    /// # Errors
    ///
    /// [`TensorError::OutOfRange`] if `node` or `page` exceeds the layer's sizes.
    pub fn bias(&self, node: usize, page: usize) -> TensorResult<T> {
        check(0, node, NODES)?;
        check(2, page, DEPTH)?;
        self.wba().element(P::bias_coords(node, page)).copied()
    }

    /// Overwrites the bias of `node` on `page`.
    ///
    /// # Errors
    ///
    /// See [`Layer::bias`].
    pub fn set_bias(&mut self, node: usize, page: usize, value: T) -> TensorResult<()> {
        check(0, node, NODES)?;
        check(2, page, DEPTH)?;
        *self.policy.wba_mut().element_mut(P::bias_coords(node, page))? = value;
        Ok(())
    }

    /// Activation of `node` on `page`.
    ///
    /// # Errors
    ///
    /// See [`Layer::bias`].
    pub fn activation(&self, node: usize, page: usize) -> TensorResult<T> {
        check(0, node, NODES)?;
        check(2, page, DEPTH)?;
        self.wba().element(P::activation_coords(node, page)).copied()
    }

    /// Zeroes outputs, error terms and every activation row.
    ///
    /// Weights and biases are kept.
    ///
    /// # Errors
    ///
    /// [`TensorError::OutOfRange`] if the policy places an activation outside
    /// its own tensor.
    pub fn reset_state(&mut self) -> TensorResult<()> {
        self.outputs.fill(T::ZERO);
        self.policy.errors_mut().fill(T::ZERO);
        let wba = self.policy.wba_mut();
        for d in 0..DEPTH {
            for n in 0..NODES {
                *wba.element_mut(P::activation_coords(n, d))? = T::ZERO;
            }
        }
        Ok(())
    }

    /// Checks that the policy's layout agrees with the layer's sizes.
    ///
    /// Every weight, bias and activation cell must fall inside `wba`, no two
    /// cells may share a storage slot, and `errors` must hold one entry per
    /// node.
    ///
    /// # Errors
    ///
    /// - [`TensorError::OutOfRange`] for a cell outside `wba`
    /// - [`TensorError::LayoutOverlap`] for two cells on one slot
    /// - [`TensorError::ShapeMismatch`] for a mis-sized error buffer
    pub fn validate_layout(&self) -> TensorResult<()> {
        let errors = self.errors().len();
        if errors != NODES {
            return Err(TensorError::ShapeMismatch {
                extents: [NODES, 1, 1, 1],
                expected: NODES,
                actual: errors,
            });
        }

        let wba = self.wba();
        let mut taken = vec![false; wba.size()];
        let mut claim = |coords: [usize; 4]| -> TensorResult<()> {
            let offset = wba.linear_index(coords)?;
            if core::mem::replace(&mut taken[offset], true) {
                return Err(TensorError::LayoutOverlap { offset });
            }
            Ok(())
        };

        for d in 0..DEPTH {
            for n in 0..NODES {
                for i in 0..INPUTS {
                    claim(P::weight_coords(n, i, d))?;
                }
                claim(P::bias_coords(n, d))?;
                claim(P::activation_coords(n, d))?;
            }
        }
        Ok(())
    }
}

#[cfg(feature = "wgpu")]
impl<const NODES: usize, const INPUTS: usize, const DEPTH: usize, P> Layer<f32, NODES, INPUTS, DEPTH, P>
where
    P: TypePolicy<f32, NODES, INPUTS, DEPTH>,
{
    /// Copies the packed parameter tensor into a device storage buffer.
    ///
    /// # Errors
    ///
    /// See [`DeviceTensor::upload`](crate::gpu::DeviceTensor::upload).
    pub fn upload_wba(&self) -> Result<crate::gpu::DeviceTensor, crate::gpu::GpuFailure> {
        crate::gpu::DeviceTensor::upload(self.wba())
    }
}

const fn check(dim: usize, index: usize, extent: usize) -> TensorResult<()> {
    if index < extent {
        Ok(())
    } else {
        Err(TensorError::OutOfRange { dim, index, extent })
    }
}
