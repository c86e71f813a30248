//! Normalization Operations
//!
//! Instance normalization over `[batch, channels, spatial...]` inputs.
//!
//! # Modules
//! - [`instance_norm`] - forward and backward kernels on typed tensors
//! - [`op`] - the same kernels bound to named slots for operator dispatch

pub mod instance_norm;
pub mod op;


pub use instance_norm::{instance_norm, instance_norm_backward, InstanceNormGrads, InstanceNormOutput};
pub use op::{run_instance_norm, run_instance_norm_grad, INSTANCE_NORM, INSTANCE_NORM_GRAD};
