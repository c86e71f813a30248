//! # normkit Neural Layers
//!
//! Layers built on the `normkit-core` kernels.
//!
//! ```rust
//! use normkit_core::Tensor;
//! use normkit_neural::{InstanceNorm, Layer};
//!
//! let layer = InstanceNorm::<f32>::new(3);
//! let input = Tensor::<f32>::ones(&[2, 3, 4, 4]);
//! let output = layer.forward(&input).unwrap();
//! assert_eq!(output.shape().dims(), &[2, 3, 4, 4]);
//! ```

#![allow(clippy::result_large_err)]

pub mod layers;

pub use layers::{InstanceNorm, Layer, LayerType};
