//! Operations
//!
//! Kernels operate on typed [`Tensor`](crate::Tensor)s; the [`registry`]
//! exposes them to callers that bind tensors to named slots.

pub mod normalization;
pub mod registry;

pub use normalization::{
    instance_norm, instance_norm_backward, run_instance_norm, run_instance_norm_grad,
    InstanceNormGrads, InstanceNormOutput,
};
pub use registry::{ArgDef, AttrDef, AttrValue, NamedTensors, OpAttrs, OpDef, OpKernel, OpRegistry};
