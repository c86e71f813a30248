//! Core tensor types and the instance-normalization kernel
//!
//! - [`Tensor`]: dense, row-major n-dimensional array
//! - [`AnyTensor`]: tensor whose element type is known only at runtime
//! - [`ops`]: the forward and backward kernels plus the named-slot registry
//! - [`numerical_gradient`]: finite-difference checks for backward kernels

#![allow(clippy::result_large_err)]

pub mod dtype;
pub mod error;
pub mod numerical_gradient;
pub mod ops;
pub mod shape;
pub mod tensor;

pub use dtype::{dtype_from_type, DType};
pub use error::{Result, TensorError};
pub use shape::Shape;
pub use tensor::{AnyTensor, Tensor};
