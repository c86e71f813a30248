//! Direct indexing for tensors using standard Rust indexing syntax.

use super::core::Tensor;
use std::ops::Index;

impl<T> Index<&[usize]> for Tensor<T> {
    type Output = T;

    fn index(&self, index: &[usize]) -> &Self::Output {
        assert_eq!(
            index.len(),
            self.array.ndim(),
            "index dimension mismatch: expected {} dimensions, got {}",
            self.array.ndim(),
            index.len()
        );
        &self.array[index]
    }
}

impl<T> Index<usize> for Tensor<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        assert_eq!(
            self.array.ndim(),
            1,
            "single index only supported for 1D tensors, but tensor has {} dimensions",
            self.array.ndim()
        );
        &self.array[[index]]
    }
}
