//! Neural network layers

pub mod normalization;

pub use normalization::InstanceNorm;

use normkit_core::{Result, Tensor};

/// Layer type enumeration for introspection and export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerType {
    InstanceNorm,
    Unknown,
}

impl LayerType {
    /// Matching ONNX operator name
    pub fn onnx_op_type(&self) -> &'static str {
        match self {
            LayerType::InstanceNorm => "InstanceNormalization",
            LayerType::Unknown => "Identity",
        }
    }
}

pub trait Layer<T> {
    fn forward(&self, input: &Tensor<T>) -> Result<Tensor<T>>;
    fn parameters(&self) -> Vec<&Tensor<T>>;
    fn parameters_mut(&mut self) -> Vec<&mut Tensor<T>>;
    fn set_training(&mut self, training: bool);
    fn clone_box(&self) -> Box<dyn Layer<T>>;

    /// Returns the type of this layer for export and introspection
    fn layer_type(&self) -> LayerType {
        LayerType::Unknown
    }
}

impl<T> Clone for Box<dyn Layer<T>> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
