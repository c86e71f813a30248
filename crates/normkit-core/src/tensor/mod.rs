//! Tensor Module
//!
//! - **core**: tensor structure and property access
//! - **creation**: constructors and reshaping
//! - **indexing**: `tensor[&[n, c, h, w]]` style element access
//! - **any**: runtime-typed tensors for operator boundaries

pub mod any;
pub mod core;
pub mod creation;
pub mod indexing;

pub use any::AnyTensor;
pub use core::Tensor;
