//! Instance normalization as named-slot operators
//!
//! `instance_norm` consumes `X`, `Scale`, `Bias` and produces `Y`,
//! `SavedMean`, `SavedVariance`. Note that `SavedVariance` holds the
//! inverse standard deviation `1 / sqrt(var + epsilon)`, which is what the
//! gradient operator expects back.
//!
//! `instance_norm_grad` consumes `X`, `Scale`, `Y@GRAD`, `SavedMean`,
//! `SavedVariance` and produces `X@GRAD`, `Scale@GRAD`, `Bias@GRAD`.

use super::instance_norm::{instance_norm, instance_norm_backward};
use crate::ops::registry::{ArgDef, AttrDef, AttrValue, NamedTensors, OpAttrs, OpDef};
use crate::{AnyTensor, DType, Result, Tensor, TensorError};
use num_traits::{Float, FromPrimitive};

pub const INSTANCE_NORM: &str = "instance_norm";
pub const INSTANCE_NORM_GRAD: &str = "instance_norm_grad";

pub const X: &str = "X";
pub const SCALE: &str = "Scale";
pub const BIAS: &str = "Bias";
pub const Y: &str = "Y";
pub const SAVED_MEAN: &str = "SavedMean";
pub const SAVED_VARIANCE: &str = "SavedVariance";
pub const Y_GRAD: &str = "Y@GRAD";
pub const X_GRAD: &str = "X@GRAD";
pub const SCALE_GRAD: &str = "Scale@GRAD";
pub const BIAS_GRAD: &str = "Bias@GRAD";

pub const EPSILON_ATTR: &str = "epsilon";
pub const DEFAULT_EPSILON: f64 = 1e-5;

/// Float element types the kernels are instantiated for
trait KernelFloat: Float + FromPrimitive + Send + Sync + 'static {
    fn view<'a>(operation: &str, tensor: &'a AnyTensor) -> Result<&'a Tensor<Self>>;
    fn wrap(tensor: Tensor<Self>) -> AnyTensor;
}

impl KernelFloat for f32 {
    fn view<'a>(operation: &str, tensor: &'a AnyTensor) -> Result<&'a Tensor<f32>> {
        tensor.as_f32(operation)
    }

    fn wrap(tensor: Tensor<f32>) -> AnyTensor {
        AnyTensor::F32(tensor)
    }
}

impl KernelFloat for f64 {
    fn view<'a>(operation: &str, tensor: &'a AnyTensor) -> Result<&'a Tensor<f64>> {
        tensor.as_f64(operation)
    }

    fn wrap(tensor: Tensor<f64>) -> AnyTensor {
        AnyTensor::F64(tensor)
    }
}

/// Common float dtype of the given slots
///
/// Every slot must be floating point and all slots must agree.
fn common_float_dtype(operation: &str, slots: &[&AnyTensor]) -> Result<DType> {
    for tensor in slots {
        if !tensor.dtype().is_floating_point() {
            return Err(TensorError::unsupported_dtype(
                operation,
                tensor.dtype(),
                &DType::FLOATING,
            ));
        }
    }
    let first = slots.first().map(|t| t.dtype()).ok_or_else(|| {
        TensorError::invalid_argument(operation, "no input tensors".to_string())
    })?;
    if let Some(other) = slots.iter().find(|t| t.dtype() != first) {
        return Err(TensorError::dtype_mismatch(operation, first, other.dtype()));
    }
    Ok(first)
}

fn epsilon_attr<T: KernelFloat>(operation: &str, attrs: &OpAttrs) -> Result<T> {
    let epsilon = attrs.float_or(operation, EPSILON_ATTR, DEFAULT_EPSILON)?;
    T::from_f64(epsilon).ok_or_else(|| {
        TensorError::invalid_argument(operation, format!("epsilon {epsilon} is not representable"))
    })
}

fn forward_typed<T: KernelFloat>(inputs: &NamedTensors, attrs: &OpAttrs) -> Result<NamedTensors> {
    let x = T::view(INSTANCE_NORM, inputs.require(INSTANCE_NORM, X)?)?;
    let scale = T::view(INSTANCE_NORM, inputs.require(INSTANCE_NORM, SCALE)?)?;
    let bias = T::view(INSTANCE_NORM, inputs.require(INSTANCE_NORM, BIAS)?)?;
    let epsilon = epsilon_attr::<T>(INSTANCE_NORM, attrs)?;

    let out = instance_norm(x, scale, bias, epsilon)?;
    let mut outputs = NamedTensors::new();
    outputs.insert(Y, T::wrap(out.y));
    outputs.insert(SAVED_MEAN, T::wrap(out.saved_mean));
    outputs.insert(SAVED_VARIANCE, T::wrap(out.saved_inv_std));
    Ok(outputs)
}

fn backward_typed<T: KernelFloat>(inputs: &NamedTensors, attrs: &OpAttrs) -> Result<NamedTensors> {
    let op = INSTANCE_NORM_GRAD;
    let x = T::view(op, inputs.require(op, X)?)?;
    let scale = T::view(op, inputs.require(op, SCALE)?)?;
    let dy = T::view(op, inputs.require(op, Y_GRAD)?)?;
    let mean = T::view(op, inputs.require(op, SAVED_MEAN)?)?;
    let inv_std = T::view(op, inputs.require(op, SAVED_VARIANCE)?)?;
    let epsilon = epsilon_attr::<T>(op, attrs)?;

    let grads = instance_norm_backward(x, dy, scale, mean, inv_std, epsilon)?;
    let mut outputs = NamedTensors::new();
    outputs.insert(X_GRAD, T::wrap(grads.x_grad));
    outputs.insert(SCALE_GRAD, T::wrap(grads.scale_grad));
    outputs.insert(BIAS_GRAD, T::wrap(grads.bias_grad));
    Ok(outputs)
}

/// Kernel for the `instance_norm` operator
pub fn run_instance_norm(inputs: &NamedTensors, attrs: &OpAttrs) -> Result<NamedTensors> {
    let slots = [
        inputs.require(INSTANCE_NORM, X)?,
        inputs.require(INSTANCE_NORM, SCALE)?,
        inputs.require(INSTANCE_NORM, BIAS)?,
    ];
    match common_float_dtype(INSTANCE_NORM, &slots)? {
        DType::Float32 => forward_typed::<f32>(inputs, attrs),
        DType::Float64 => forward_typed::<f64>(inputs, attrs),
        other => Err(TensorError::unsupported_dtype(
            INSTANCE_NORM,
            other,
            &DType::FLOATING,
        )),
    }
}

/// Kernel for the `instance_norm_grad` operator
///
/// Gradient slots listed in `no_grad` are left out of the result.
pub fn run_instance_norm_grad(
    inputs: &NamedTensors,
    attrs: &OpAttrs,
    no_grad: &[&str],
) -> Result<NamedTensors> {
    let op = INSTANCE_NORM_GRAD;
    let slots = [
        inputs.require(op, X)?,
        inputs.require(op, SCALE)?,
        inputs.require(op, Y_GRAD)?,
        inputs.require(op, SAVED_MEAN)?,
        inputs.require(op, SAVED_VARIANCE)?,
    ];
    let mut outputs = match common_float_dtype(op, &slots)? {
        DType::Float32 => backward_typed::<f32>(inputs, attrs)?,
        DType::Float64 => backward_typed::<f64>(inputs, attrs)?,
        other => return Err(TensorError::unsupported_dtype(op, other, &DType::FLOATING)),
    };
    for slot in no_grad {
        outputs.remove(slot);
    }
    Ok(outputs)
}

fn grad_kernel(inputs: &NamedTensors, attrs: &OpAttrs) -> Result<NamedTensors> {
    run_instance_norm_grad(inputs, attrs, &[])
}

fn epsilon_def() -> AttrDef {
    AttrDef {
        name: EPSILON_ATTR,
        default: Some(AttrValue::Float(DEFAULT_EPSILON)),
        doc: "added to the variance before the square root",
    }
}

fn arg(name: &'static str, doc: &'static str) -> ArgDef {
    ArgDef { name, doc }
}

/// Definition of the `instance_norm` operator
pub fn instance_norm_op_def() -> OpDef {
    OpDef {
        name: INSTANCE_NORM,
        inputs: vec![
            arg(X, "input of shape [N, C, spatial...], rank 2 to 5"),
            arg(SCALE, "per-channel scale of shape [C]"),
            arg(BIAS, "per-channel bias of shape [C]"),
        ],
        outputs: vec![
            arg(Y, "normalized output, same shape as X"),
            arg(SAVED_MEAN, "per-instance mean of shape [N * C]"),
            arg(
                SAVED_VARIANCE,
                "per-instance 1 / sqrt(var + epsilon) of shape [N * C]",
            ),
        ],
        attrs: vec![epsilon_def()],
        grad_op: Some(INSTANCE_NORM_GRAD),
        kernel: run_instance_norm,
    }
}

/// Definition of the `instance_norm_grad` operator
pub fn instance_norm_grad_op_def() -> OpDef {
    OpDef {
        name: INSTANCE_NORM_GRAD,
        inputs: vec![
            arg(X, "forward input"),
            arg(SCALE, "per-channel scale of shape [C]"),
            arg(Y_GRAD, "gradient of the loss with respect to Y"),
            arg(SAVED_MEAN, "SavedMean from the forward pass"),
            arg(SAVED_VARIANCE, "SavedVariance from the forward pass"),
        ],
        outputs: vec![
            arg(X_GRAD, "gradient with respect to X"),
            arg(SCALE_GRAD, "gradient with respect to Scale"),
            arg(BIAS_GRAD, "gradient with respect to Bias"),
        ],
        attrs: vec![epsilon_def()],
        grad_op: None,
        kernel: grad_kernel,
    }
}

pub(crate) fn op_defs() -> Vec<OpDef> {
    vec![instance_norm_op_def(), instance_norm_grad_op_def()]
}
