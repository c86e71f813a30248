//! Tensor Creation and Construction

use super::core::Tensor;
use crate::{Result, Shape, TensorError};
use ndarray::{ArrayD, IxDyn};
use num_traits::{One, Zero};

impl<T: Clone> Tensor<T> {
    /// Create a tensor filled with zeros
    pub fn zeros(shape: &[usize]) -> Self
    where
        T: Zero,
    {
        Self::from_array(ArrayD::zeros(IxDyn(shape)))
    }

    /// Create a tensor filled with ones
    pub fn ones(shape: &[usize]) -> Self
    where
        T: One,
    {
        Self::from_array(ArrayD::ones(IxDyn(shape)))
    }

    /// Create a tensor filled with a specific value
    pub fn full(shape: &[usize], value: T) -> Self {
        Self::from_array(ArrayD::from_elem(IxDyn(shape), value))
    }

    /// Create a tensor from a row-major vector with the given shape
    pub fn from_vec(data: Vec<T>, shape: &[usize]) -> Result<Self> {
        let total_size: usize = shape.iter().product();
        if data.len() != total_size {
            return Err(TensorError::invalid_shape(
                "from_vec",
                &format!(
                    "data length {} does not match shape {:?} (expected {} elements)",
                    data.len(),
                    shape,
                    total_size
                ),
                shape,
            ));
        }

        let array = ArrayD::from_shape_vec(IxDyn(shape), data)
            .map_err(|e| TensorError::invalid_shape("from_vec", &e.to_string(), shape))?;
        Ok(Self::from_array(array))
    }

    /// Create a tensor from an existing ndarray
    ///
    /// Arrays that are not in standard layout are copied into it.
    pub fn from_array(array: ArrayD<T>) -> Self {
        let array = if array.is_standard_layout() {
            array
        } else {
            array.as_standard_layout().into_owned()
        };
        let shape = Shape::from_slice(array.shape());
        Self { array, shape }
    }

    /// Return a tensor with the same elements and a new shape
    pub fn reshape(&self, shape: &[usize]) -> Result<Self> {
        let total_size: usize = shape.iter().product();
        if total_size != self.numel() {
            return Err(TensorError::shape_mismatch(
                "reshape",
                &format!("{} elements", self.numel()),
                &format!("shape {:?} with {} elements", shape, total_size),
            ));
        }
        Self::from_vec(self.to_vec(), shape)
    }
}
