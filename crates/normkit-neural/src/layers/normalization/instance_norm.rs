//! Instance Normalization implementation
//!
//! Instance Normalization normalizes each sample and channel independently.
//! It computes statistics over the spatial dimensions for each channel in each
//! sample, making it particularly useful for style transfer tasks.

use crate::layers::{Layer, LayerType};
use normkit_core::ops::normalization::{
    instance_norm, instance_norm_backward, InstanceNormGrads, InstanceNormOutput,
};
use normkit_core::{Result, Tensor, TensorError};
use num_traits::{Float, FromPrimitive};
use tracing::{debug, warn};

/// Instance Normalization - normalizes each sample and channel independently
#[derive(Debug, Clone)]
pub struct InstanceNorm<T> {
    num_channels: usize,
    gamma: Tensor<T>,
    beta: Tensor<T>,
    epsilon: f32,
    affine: bool,
}

impl<T> InstanceNorm<T>
where
    T: Float + FromPrimitive + Send + Sync + 'static,
{
    pub fn new(num_channels: usize) -> Self {
        Self {
            num_channels,
            gamma: Tensor::ones(&[num_channels]),
            beta: Tensor::zeros(&[num_channels]),
            epsilon: 1e-5,
            affine: true,
        }
    }

    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Without affine parameters the layer behaves as scale = 1, bias = 0
    pub fn with_affine(mut self, affine: bool) -> Self {
        self.affine = affine;
        self
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    pub fn affine(&self) -> bool {
        self.affine
    }

    pub fn scale(&self) -> &Tensor<T> {
        &self.gamma
    }

    pub fn bias(&self) -> &Tensor<T> {
        &self.beta
    }

    fn check_channels(&self, input: &Tensor<T>) -> Result<()> {
        match input.shape().dims().get(1) {
            Some(&channels) if channels != self.num_channels => {
                warn!(
                    expected = self.num_channels,
                    got = channels,
                    "InstanceNorm channel mismatch"
                );
                Err(TensorError::invalid_shape(
                    "InstanceNorm",
                    &format!("expected {} channels, got {channels}", self.num_channels),
                    input.shape().dims(),
                ))
            }
            // Rank problems are reported by the kernel
            _ => Ok(()),
        }
    }

    fn epsilon_value(&self) -> Result<T> {
        T::from_f32(self.epsilon).ok_or_else(|| {
            TensorError::invalid_argument(
                "InstanceNorm",
                format!("epsilon {} is not representable", self.epsilon),
            )
        })
    }

    fn effective_params(&self) -> (Tensor<T>, Tensor<T>) {
        if self.affine {
            (self.gamma.clone(), self.beta.clone())
        } else {
            (
                Tensor::ones(&[self.num_channels]),
                Tensor::zeros(&[self.num_channels]),
            )
        }
    }

    /// Forward pass that also returns the per-instance statistics
    pub fn forward_with_stats(&self, input: &Tensor<T>) -> Result<InstanceNormOutput<T>> {
        self.check_channels(input)?;
        debug!(
            shape = ?input.shape().dims(),
            affine = self.affine,
            epsilon = self.epsilon,
            "InstanceNorm forward"
        );
        let (scale, bias) = self.effective_params();
        instance_norm(input, &scale, &bias, self.epsilon_value()?)
    }

    /// Gradients of the layer for `grad_output` at `input`
    ///
    /// Statistics are recomputed from `input`. Scale and bias gradients are
    /// reported even when the layer is not affine.
    pub fn backward(&self, input: &Tensor<T>, grad_output: &Tensor<T>) -> Result<InstanceNormGrads<T>> {
        let stats = self.forward_with_stats(input)?;
        debug!(shape = ?input.shape().dims(), "InstanceNorm backward");
        let (scale, _) = self.effective_params();
        instance_norm_backward(
            input,
            grad_output,
            &scale,
            &stats.saved_mean,
            &stats.saved_inv_std,
            self.epsilon_value()?,
        )
    }
}

impl<T> Layer<T> for InstanceNorm<T>
where
    T: Float + FromPrimitive + Send + Sync + 'static,
{
    fn forward(&self, input: &Tensor<T>) -> Result<Tensor<T>> {
        Ok(self.forward_with_stats(input)?.y)
    }

    fn parameters(&self) -> Vec<&Tensor<T>> {
        if self.affine {
            vec![&self.gamma, &self.beta]
        } else {
            vec![]
        }
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor<T>> {
        if self.affine {
            vec![&mut self.gamma, &mut self.beta]
        } else {
            vec![]
        }
    }

    fn set_training(&mut self, _training: bool) {
        // InstanceNorm behavior doesn't change between training and eval
    }

    fn clone_box(&self) -> Box<dyn Layer<T>> {
        Box::new(self.clone())
    }

    fn layer_type(&self) -> LayerType {
        LayerType::InstanceNorm
    }
}
