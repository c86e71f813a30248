//! Runtime-typed tensors
//!
//! Operator boundaries and image decoders hand tensors around whose element
//! type is only known at runtime. `AnyTensor` carries the dtype alongside the
//! data so callers can reject non-floating inputs with a type error instead
//! of a compile error.

use super::core::Tensor;
use crate::{DType, Result, Shape, TensorError};

#[derive(Debug, Clone, PartialEq)]
pub enum AnyTensor {
    F32(Tensor<f32>),
    F64(Tensor<f64>),
    I32(Tensor<i32>),
    I64(Tensor<i64>),
    U8(Tensor<u8>),
    Bool(Tensor<bool>),
}

impl AnyTensor {
    pub fn dtype(&self) -> DType {
        match self {
            AnyTensor::F32(_) => DType::Float32,
            AnyTensor::F64(_) => DType::Float64,
            AnyTensor::I32(_) => DType::Int32,
            AnyTensor::I64(_) => DType::Int64,
            AnyTensor::U8(_) => DType::UInt8,
            AnyTensor::Bool(_) => DType::Bool,
        }
    }

    pub fn shape(&self) -> &Shape {
        match self {
            AnyTensor::F32(t) => t.shape(),
            AnyTensor::F64(t) => t.shape(),
            AnyTensor::I32(t) => t.shape(),
            AnyTensor::I64(t) => t.shape(),
            AnyTensor::U8(t) => t.shape(),
            AnyTensor::Bool(t) => t.shape(),
        }
    }

    /// Borrow as an `f32` tensor, failing with a type error otherwise
    pub fn as_f32(&self, operation: &str) -> Result<&Tensor<f32>> {
        match self {
            AnyTensor::F32(t) => Ok(t),
            other => Err(TensorError::unsupported_dtype(
                operation,
                other.dtype(),
                &[DType::Float32],
            )),
        }
    }

    /// Borrow as an `f64` tensor, failing with a type error otherwise
    pub fn as_f64(&self, operation: &str) -> Result<&Tensor<f64>> {
        match self {
            AnyTensor::F64(t) => Ok(t),
            other => Err(TensorError::unsupported_dtype(
                operation,
                other.dtype(),
                &[DType::Float64],
            )),
        }
    }
}

macro_rules! impl_from_tensor {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<Tensor<$ty>> for AnyTensor {
                fn from(tensor: Tensor<$ty>) -> Self {
                    AnyTensor::$variant(tensor)
                }
            }
        )*
    };
}

impl_from_tensor!(
    f32 => F32,
    f64 => F64,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    bool => Bool,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_tensor_dtype_and_shape() {
        let t: AnyTensor = Tensor::<u8>::zeros(&[3, 2, 2]).into();
        assert_eq!(t.dtype(), DType::UInt8);
        assert_eq!(t.shape().dims(), &[3, 2, 2]);
    }

    #[test]
    fn test_any_tensor_typed_access() {
        let t: AnyTensor = Tensor::<f32>::ones(&[2]).into();
        assert!(t.as_f32("test").is_ok());

        let err = t.as_f64("test").unwrap_err();
        assert!(err.is_type_error());
    }
}
