//! Instance Normalization Operations
//!
//! Instance normalization computes statistics independently for every
//! (sample, channel) pair over the spatial axes only. Inputs are laid out as
//! `[batch, channels, spatial...]` with rank 2 to 5; a rank-2 input behaves
//! as if it had a single spatial element.
//!
//! The forward pass caches the per-slice mean and inverse standard deviation
//! `1 / sqrt(var + epsilon)` so that the backward pass can reuse them.
//! Both passes run in parallel across the `batch * channels` slices; each
//! slice writes a disjoint chunk of the output.
//!
//! Per-slice sums and the elementwise arithmetic run in `f64` for every
//! element type. Results are narrowed to the element type only when stored.

use crate::{Result, Tensor, TensorError};
use num_traits::{Float, FromPrimitive};
use rayon::prelude::*;
use tracing::debug;

const FORWARD_OP: &str = "instance_norm";
const BACKWARD_OP: &str = "instance_norm_grad";

/// Smallest and largest accepted input rank
pub const MIN_RANK: usize = 2;
pub const MAX_RANK: usize = 5;

/// Result of an instance normalization forward pass
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceNormOutput<T> {
    /// Normalized output, same shape as the input
    pub y: Tensor<T>,
    /// Per-slice mean, shape `[batch * channels]`
    pub saved_mean: Tensor<T>,
    /// Per-slice `1 / sqrt(var + epsilon)`, shape `[batch * channels]`
    pub saved_inv_std: Tensor<T>,
}

/// Gradients produced by the instance normalization backward pass
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceNormGrads<T> {
    /// Gradient with respect to the input, same shape as the input
    pub x_grad: Tensor<T>,
    /// Gradient with respect to the per-channel scale, shape `[channels]`
    pub scale_grad: Tensor<T>,
    /// Gradient with respect to the per-channel bias, shape `[channels]`
    pub bias_grad: Tensor<T>,
}

/// `[batch, channels, spatial...]` viewed as `batch * channels` slices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SliceLayout {
    batch: usize,
    channels: usize,
    spatial: usize,
}

impl SliceLayout {
    fn from_input<T>(operation: &str, input: &Tensor<T>) -> Result<Self> {
        let shape = input.shape();
        let rank = shape.rank();
        if !(MIN_RANK..=MAX_RANK).contains(&rank) {
            return Err(TensorError::invalid_shape(
                operation,
                &format!(
                    "expects input rank between {MIN_RANK} and {MAX_RANK} \
                     (batch, channels, spatial...), got rank {rank}"
                ),
                shape.dims(),
            ));
        }
        if shape.iter().any(|&d| d == 0) {
            return Err(TensorError::invalid_shape(
                operation,
                "input dimensions must be non-zero",
                shape.dims(),
            ));
        }

        let (batch, channels, spatial) = shape.batch_channel_spatial().ok_or_else(|| {
            TensorError::invalid_shape(operation, "missing batch or channel axis", shape.dims())
        })?;
        Ok(Self {
            batch,
            channels,
            spatial,
        })
    }

    fn slices(&self) -> usize {
        self.batch * self.channels
    }
}

fn check_len<T>(operation: &str, name: &str, tensor: &Tensor<T>, expected: usize) -> Result<()> {
    if tensor.rank() != 1 || tensor.numel() != expected {
        return Err(TensorError::shape_mismatch(
            operation,
            &format!("{name} shape [{expected}]"),
            &format!("{name} shape {}", tensor.shape()),
        ));
    }
    Ok(())
}

fn check_epsilon<T: Float>(operation: &str, epsilon: T) -> Result<()> {
    if !(epsilon.is_finite() && epsilon > T::zero()) {
        return Err(TensorError::invalid_argument(
            operation,
            format!(
                "epsilon must be a finite value greater than zero, got {}",
                epsilon.to_f64().unwrap_or(f64::NAN)
            ),
        ));
    }
    Ok(())
}

fn contiguous<'a, T>(operation: &str, name: &str, tensor: &'a Tensor<T>) -> Result<&'a [T]> {
    tensor.as_slice().ok_or_else(|| {
        TensorError::invalid_argument(operation, format!("{name} is not contiguous"))
    })
}

fn widen<T: Float>(value: T) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

fn narrow<T: Float + FromPrimitive>(value: f64) -> T {
    T::from_f64(value).unwrap_or_else(T::nan)
}

/// Instance normalization forward pass
///
/// Input shape: `[batch, channels, spatial...]` (rank 2 to 5)
/// Scale/bias shapes: `[channels]`
///
/// Returns the normalized output together with the per-slice mean and
/// inverse standard deviation.
pub fn instance_norm<T>(
    input: &Tensor<T>,
    scale: &Tensor<T>,
    bias: &Tensor<T>,
    epsilon: T,
) -> Result<InstanceNormOutput<T>>
where
    T: Float + FromPrimitive + Send + Sync,
{
    let layout = SliceLayout::from_input(FORWARD_OP, input)?;
    check_len(FORWARD_OP, "scale", scale, layout.channels)?;
    check_len(FORWARD_OP, "bias", bias, layout.channels)?;
    check_epsilon(FORWARD_OP, epsilon)?;

    let x = contiguous(FORWARD_OP, "input", input)?;
    let scale = contiguous(FORWARD_OP, "scale", scale)?;
    let bias = contiguous(FORWARD_OP, "bias", bias)?;
    let count = layout.spatial as f64;
    let eps = widen(epsilon);

    debug!(
        batch = layout.batch,
        channels = layout.channels,
        spatial = layout.spatial,
        "instance_norm forward"
    );

    let spatial = layout.spatial;
    let channels = layout.channels;
    let mut y = vec![T::zero(); x.len()];
    let mut mean = vec![T::zero(); layout.slices()];
    let mut inv_std = vec![T::zero(); layout.slices()];

    y.par_chunks_mut(spatial)
        .zip(mean.par_iter_mut())
        .zip(inv_std.par_iter_mut())
        .enumerate()
        .for_each(|(slice, ((y_slice, mean_out), inv_std_out))| {
            let ch = slice % channels;
            let x_slice = &x[slice * spatial..(slice + 1) * spatial];

            let m = x_slice.iter().map(|&v| widen(v)).sum::<f64>() / count;
            let var = x_slice
                .iter()
                .map(|&v| {
                    let diff = widen(v) - m;
                    diff * diff
                })
                .sum::<f64>()
                / count;
            let inv = 1.0 / (var + eps).sqrt();

            let (gamma, beta) = (widen(scale[ch]), widen(bias[ch]));
            for (out, &v) in y_slice.iter_mut().zip(x_slice) {
                *out = narrow(gamma * ((widen(v) - m) * inv) + beta);
            }

            *mean_out = narrow(m);
            *inv_std_out = narrow(inv);
        });

    let slices = layout.slices();
    Ok(InstanceNormOutput {
        y: Tensor::from_vec(y, input.shape().dims())?,
        saved_mean: Tensor::from_vec(mean, &[slices])?,
        saved_inv_std: Tensor::from_vec(inv_std, &[slices])?,
    })
}

/// Instance normalization backward pass
///
/// With `x_hat = (x - mean) * inv_std` and per-slice spatial means `mean_s`:
///
/// ```text
/// bias_grad[c]  = Σ_{n,s} dy
/// scale_grad[c] = Σ_{n,s} dy * x_hat
/// x_grad        = scale[c] * inv_std * (dy - mean_s(dy) - x_hat * mean_s(dy * x_hat))
/// ```
///
/// `saved_mean` and `saved_inv_std` are the statistics returned by
/// [`instance_norm`]; `epsilon` is validated but not reapplied.
pub fn instance_norm_backward<T>(
    input: &Tensor<T>,
    grad_output: &Tensor<T>,
    scale: &Tensor<T>,
    saved_mean: &Tensor<T>,
    saved_inv_std: &Tensor<T>,
    epsilon: T,
) -> Result<InstanceNormGrads<T>>
where
    T: Float + FromPrimitive + Send + Sync,
{
    let layout = SliceLayout::from_input(BACKWARD_OP, input)?;
    if !grad_output.same_shape(input) {
        return Err(TensorError::shape_mismatch(
            BACKWARD_OP,
            &format!("grad_output shape {}", input.shape()),
            &format!("grad_output shape {}", grad_output.shape()),
        ));
    }
    check_len(BACKWARD_OP, "scale", scale, layout.channels)?;
    check_len(BACKWARD_OP, "saved_mean", saved_mean, layout.slices())?;
    check_len(BACKWARD_OP, "saved_inv_std", saved_inv_std, layout.slices())?;
    check_epsilon(BACKWARD_OP, epsilon)?;

    let x = contiguous(BACKWARD_OP, "input", input)?;
    let dy = contiguous(BACKWARD_OP, "grad_output", grad_output)?;
    let scale = contiguous(BACKWARD_OP, "scale", scale)?;
    let mean = contiguous(BACKWARD_OP, "saved_mean", saved_mean)?;
    let inv_std = contiguous(BACKWARD_OP, "saved_inv_std", saved_inv_std)?;
    let count = layout.spatial as f64;

    debug!(
        batch = layout.batch,
        channels = layout.channels,
        spatial = layout.spatial,
        "instance_norm backward"
    );

    let spatial = layout.spatial;
    let channels = layout.channels;
    let mut x_grad = vec![T::zero(); x.len()];
    // Per-slice partial sums, reduced over the batch afterwards
    let mut slice_scale_grad = vec![0.0f64; layout.slices()];
    let mut slice_bias_grad = vec![0.0f64; layout.slices()];

    x_grad
        .par_chunks_mut(spatial)
        .zip(slice_scale_grad.par_iter_mut())
        .zip(slice_bias_grad.par_iter_mut())
        .enumerate()
        .for_each(|(slice, ((dx_slice, scale_grad_out), bias_grad_out))| {
            let ch = slice % channels;
            let range = slice * spatial..(slice + 1) * spatial;
            let (x_slice, dy_slice) = (&x[range.clone()], &dy[range]);
            let (m, inv) = (widen(mean[slice]), widen(inv_std[slice]));

            let mut sum_dy = 0.0;
            let mut sum_dy_xhat = 0.0;
            for (&xv, &g) in x_slice.iter().zip(dy_slice) {
                let g = widen(g);
                sum_dy += g;
                sum_dy_xhat += g * ((widen(xv) - m) * inv);
            }
            let mean_dy = sum_dy / count;
            let mean_dy_xhat = sum_dy_xhat / count;

            let coeff = widen(scale[ch]) * inv;
            for ((out, &xv), &g) in dx_slice.iter_mut().zip(x_slice).zip(dy_slice) {
                let x_hat = (widen(xv) - m) * inv;
                *out = narrow(coeff * (widen(g) - mean_dy - x_hat * mean_dy_xhat));
            }

            *scale_grad_out = sum_dy_xhat;
            *bias_grad_out = sum_dy;
        });

    let mut scale_grad = vec![0.0f64; channels];
    let mut bias_grad = vec![0.0f64; channels];
    for (slice, (&ds, &db)) in slice_scale_grad.iter().zip(&slice_bias_grad).enumerate() {
        let ch = slice % channels;
        scale_grad[ch] += ds;
        bias_grad[ch] += db;
    }
    let scale_grad: Vec<T> = scale_grad.into_iter().map(narrow::<T>).collect();
    let bias_grad: Vec<T> = bias_grad.into_iter().map(narrow::<T>).collect();

    Ok(InstanceNormGrads {
        x_grad: Tensor::from_vec(x_grad, input.shape().dims())?,
        scale_grad: Tensor::from_vec(scale_grad, &[channels])?,
        bias_grad: Tensor::from_vec(bias_grad, &[channels])?,
    })
}
