//! # `curnn`
//!
//! Storage and addressing core for GPU-oriented recurrent networks.
//!
//! A layer's weights, biases and activations are packed into one
//! [`Tensor4`] so a single contiguous buffer crosses the host/device
//! boundary instead of many small ones.
//!
//! ## Features
//!
//! - **Tensors**: a flattened 4-D container with additive per-dimension
//!   windows, row-major coordinates and checked access
//! - **Layers**: [`Layer`] generic over a compile-time [`TypePolicy`] that
//!   owns and lays out the packed parameters
//! - **Bounds modes**: explicit `Result`s everywhere, plus `[]` operators that
//!   either degrade to a sentinel with a diagnostic or fail fast
//! - **GPU transfer** *(feature `wgpu`)*: upload/download of packed tensors
//!
//! ## Example
//!
//! ```rust
//! use curnn::{FullyConnectedLayer, Tensor4};
//!
//! let mut t = Tensor4::<f64>::new(3, 2, 1, 1);
//! t.axis_mut(0).set(2, 5.0).unwrap();
//! assert_eq!(t.axis(0).get(2), Ok(&5.0));
//!
//! let mut layer = FullyConnectedLayer::<f64, 8, 4, 1>::new();
//! layer.initialize_weights(-0.1, 0.1).unwrap();
//! assert_eq!(layer.validate_layout(), Ok(()));
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::many_single_char_names)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod diagnostics;
pub mod element;
pub mod error;
pub mod layer;
pub mod math;
pub mod tensor;

#[cfg(feature = "wgpu")]
pub mod gpu;

pub use crate::config::BoundsMode;
pub use crate::element::Element;
pub use crate::error::{TensorError, TensorResult};
pub use crate::layer::{FullyConnected, FullyConnectedLayer, Layer, Recurrent, RecurrentLayer, TypePolicy};
pub use crate::tensor::Tensor4;
