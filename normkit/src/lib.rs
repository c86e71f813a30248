//! # normkit - Instance Normalization Toolkit
//!
//! normkit bundles three crates:
//!
//! - **core**: tensors, errors, the instance-normalization forward and
//!   backward kernels, and a named-slot operator registry
//! - **neural**: the `InstanceNorm` layer
//! - **vision**: image loading with an explicitly configured decoding backend
//!
//! ## Quick Start
//!
//! ### Running the kernel
//!
//! ```rust
//! use normkit::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let x = Tensor::<f32>::from_vec((0..16).map(|v| v as f32).collect(), &[1, 2, 8])?;
//! let scale = Tensor::<f32>::ones(&[2]);
//! let bias = Tensor::<f32>::zeros(&[2]);
//!
//! let out = instance_norm(&x, &scale, &bias, 1e-5)?;
//! let grads = instance_norm_backward(
//!     &x,
//!     &Tensor::ones(&[1, 2, 8]),
//!     &scale,
//!     &out.saved_mean,
//!     &out.saved_inv_std,
//!     1e-5,
//! )?;
//! assert_eq!(grads.bias_grad.to_vec(), vec![8.0, 8.0]);
//! # Ok(())
//! # }
//! ```
//!
//! ### Dispatching by name
//!
//! ```rust
//! use normkit::prelude::*;
//! use normkit::core::ops::normalization::op::{BIAS, SCALE, X, Y};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = OpRegistry::with_builtin_ops();
//! let inputs = NamedTensors::new()
//!     .with(X, Tensor::<f64>::ones(&[2, 3, 4]))
//!     .with(SCALE, Tensor::<f64>::ones(&[3]))
//!     .with(BIAS, Tensor::<f64>::zeros(&[3]));
//! let outputs = registry.run("instance_norm", &inputs, &OpAttrs::new())?;
//! assert!(outputs.contains(Y));
//! # Ok(())
//! # }
//! ```
//!
//! ### Loading images
//!
//! ```rust,no_run
//! use normkit::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = VisionConfig::load("vision.toml")?;
//! let chw = image_load_chw("photo.png", &config)?;
//! let batch = chw.reshape(&[1, 3, chw.shape()[1], chw.shape()[2]])?;
//! let normalized = InstanceNorm::<f32>::new(3).forward(&batch)?;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

pub use normkit_core as core;
pub use normkit_neural as neural;
pub use normkit_vision as vision;

/// Prelude module for convenient imports
///
/// ```rust
/// use normkit::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::core::{AnyTensor, DType, Shape, Tensor, TensorError};

    // Kernels and operator dispatch
    pub use crate::core::ops::{
        instance_norm, instance_norm_backward, AttrValue, InstanceNormGrads, InstanceNormOutput,
        NamedTensors, OpAttrs, OpRegistry,
    };

    // Layers
    pub use crate::neural::{InstanceNorm, Layer};

    // Image loading
    pub use crate::vision::{
        decoder_for, image_load, image_load_chw, image_load_with, DecodedImage, ImageBackend,
        ImageDecoder, VisionConfig,
    };
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the version string of normkit
pub fn version() -> &'static str {
    VERSION
}
