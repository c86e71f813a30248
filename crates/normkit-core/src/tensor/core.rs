//! Core Tensor Structure and Properties
//!
//! A `Tensor<T>` is a dense, row-major CPU array together with its shape.
//! Every constructor keeps the backing array in standard layout so the
//! kernels can work on flat slices.

use crate::{DType, Shape};
use ndarray::ArrayD;

/// Core tensor structure that holds data and metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<T> {
    pub(in crate::tensor) array: ArrayD<T>,
    pub(in crate::tensor) shape: Shape,
}

impl<T> Tensor<T> {
    /// Get the shape of the tensor
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Get the data type of the tensor, `None` for element types without one
    pub fn dtype(&self) -> Option<DType>
    where
        T: 'static,
    {
        crate::dtype_from_type::<T>()
    }

    /// Borrow the backing ndarray
    pub fn array(&self) -> &ArrayD<T> {
        &self.array
    }

    /// Consume the tensor and return the backing ndarray
    pub fn into_array(self) -> ArrayD<T> {
        self.array
    }

    /// Get the value at a specific index
    pub fn get(&self, index: &[usize]) -> Option<T>
    where
        T: Clone,
    {
        if index.len() != self.array.ndim() {
            return None;
        }
        self.array.get(index).cloned()
    }

    /// Get the underlying data as a flat row-major slice
    pub fn as_slice(&self) -> Option<&[T]> {
        self.array.as_slice()
    }

    /// Copy the elements out in row-major order
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.array.iter().cloned().collect()
    }

    /// Check if tensor is empty (has no elements)
    pub fn is_empty(&self) -> bool {
        self.shape.size() == 0
    }

    /// Get the total number of elements
    pub fn numel(&self) -> usize {
        self.shape.size()
    }

    /// Get the number of dimensions (rank)
    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    /// Check if two tensors have the same shape
    pub fn same_shape<U>(&self, other: &Tensor<U>) -> bool {
        self.shape == other.shape
    }

    /// Get tensor summary as a formatted string
    pub fn summary(&self) -> String {
        format!(
            "Tensor<{}>: shape={}, numel={}",
            std::any::type_name::<T>(),
            self.shape,
            self.shape.size(),
        )
    }

    /// Apply a function to each element, producing a tensor of another type
    pub fn map<U, F>(&self, f: F) -> Tensor<U>
    where
        F: FnMut(&T) -> U,
    {
        Tensor {
            array: self.array.map(f),
            shape: self.shape.clone(),
        }
    }
}
