//! Numerical Gradient Validation Utilities
//!
//! Hand-written backward kernels are validated by comparing them against
//! finite differences of a scalar loss:
//!
//! ```text
//! dL/dx_i ≈ [L(x + ε·e_i) - L(x - ε·e_i)] / (2ε)
//! ```
//!
//! # Example
//!
//! ```rust
//! use normkit_core::numerical_gradient::{GradientCheckConfig, NumericalGradientChecker};
//! use normkit_core::Tensor;
//!
//! // L(x) = Σ x², dL/dx = 2x
//! let x = Tensor::<f64>::from_vec(vec![1.0, -2.0, 3.0], &[3]).unwrap();
//! let analytical = x.map(|v| 2.0 * v);
//!
//! let checker = NumericalGradientChecker::new(GradientCheckConfig::default());
//! let result = checker
//!     .check(&x, |t| Ok(t.to_vec().iter().map(|v| v * v).sum()), &analytical)
//!     .unwrap();
//! assert!(result.is_ok(), "{}", result.summary());
//! ```

use crate::{Result, Tensor, TensorError};
use num_traits::{Float, FromPrimitive};
use std::marker::PhantomData;

/// Configuration for numerical gradient checking
#[derive(Debug, Clone)]
pub struct GradientCheckConfig {
    /// Step used for finite differences
    pub epsilon: f64,
    /// Relative tolerance for gradient comparison
    pub rtol: f64,
    /// Absolute tolerance for gradient comparison
    pub atol: f64,
    /// Use central differences (more accurate, two evaluations per element)
    pub use_central_difference: bool,
}

impl Default for GradientCheckConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-5,
            rtol: 1e-3,
            atol: 1e-5,
            use_central_difference: true,
        }
    }
}

impl GradientCheckConfig {
    /// Tighter tolerances, for f64 inputs
    pub fn strict() -> Self {
        Self {
            epsilon: 1e-6,
            rtol: 1e-5,
            atol: 1e-4,
            use_central_difference: true,
        }
    }

    /// Looser tolerances, for f32 inputs
    pub fn relaxed() -> Self {
        Self {
            epsilon: 1e-3,
            rtol: 1e-2,
            atol: 1e-3,
            use_central_difference: true,
        }
    }
}

/// Result of gradient checking
#[derive(Debug, Clone)]
pub struct GradientCheckResult {
    pub passed: bool,
    pub max_relative_error: f64,
    pub max_absolute_error: f64,
    pub num_elements_checked: usize,
    pub num_failures: usize,
    /// Flat indices of elements outside tolerance
    pub failed_indices: Vec<usize>,
}

impl GradientCheckResult {
    pub fn is_ok(&self) -> bool {
        self.passed
    }

    /// Percentage of elements that failed
    pub fn failure_rate(&self) -> f64 {
        if self.num_elements_checked == 0 {
            0.0
        } else {
            (self.num_failures as f64 / self.num_elements_checked as f64) * 100.0
        }
    }

    pub fn summary(&self) -> String {
        if self.passed {
            format!(
                "gradient check passed: {} elements, max rel err {:.2e}, max abs err {:.2e}",
                self.num_elements_checked, self.max_relative_error, self.max_absolute_error
            )
        } else {
            format!(
                "gradient check FAILED: {}/{} elements ({:.2}%), max rel err {:.2e}, max abs err {:.2e}, first failures {:?}",
                self.num_failures,
                self.num_elements_checked,
                self.failure_rate(),
                self.max_relative_error,
                self.max_absolute_error,
                &self.failed_indices[..self.failed_indices.len().min(8)]
            )
        }
    }
}

/// Finite-difference gradient checker for scalar losses
pub struct NumericalGradientChecker<T> {
    config: GradientCheckConfig,
    _phantom: PhantomData<T>,
}

impl<T> NumericalGradientChecker<T>
where
    T: Float + FromPrimitive + 'static,
{
    pub fn new(config: GradientCheckConfig) -> Self {
        Self {
            config,
            _phantom: PhantomData,
        }
    }

    pub fn config(&self) -> &GradientCheckConfig {
        &self.config
    }

    /// Gradient of `loss` with respect to every element of `input`
    pub fn compute_numerical_gradient<F>(&self, input: &Tensor<T>, loss: F) -> Result<Tensor<T>>
    where
        F: Fn(&Tensor<T>) -> Result<T>,
    {
        let dims = input.shape().dims().to_vec();
        let base = input.to_vec();
        let epsilon = T::from_f64(self.config.epsilon).ok_or_else(|| {
            TensorError::invalid_argument(
                "numerical_gradient",
                format!("epsilon {} is not representable", self.config.epsilon),
            )
        })?;

        let base_loss = if self.config.use_central_difference {
            None
        } else {
            Some(loss(input)?)
        };

        let mut gradient = Vec::with_capacity(base.len());
        for i in 0..base.len() {
            let mut plus = base.clone();
            plus[i] = plus[i] + epsilon;
            let f_plus = loss(&Tensor::from_vec(plus, &dims)?)?;

            let grad = match base_loss {
                Some(f0) => (f_plus - f0) / epsilon,
                None => {
                    let mut minus = base.clone();
                    minus[i] = minus[i] - epsilon;
                    let f_minus = loss(&Tensor::from_vec(minus, &dims)?)?;
                    (f_plus - f_minus) / (epsilon + epsilon)
                }
            };
            gradient.push(grad);
        }

        Tensor::from_vec(gradient, &dims)
    }

    /// Compare two gradients element-wise with `|a - n| <= atol + rtol * |n|`
    pub fn compare_gradients(
        &self,
        analytical: &Tensor<T>,
        numerical: &Tensor<T>,
    ) -> Result<GradientCheckResult> {
        if !analytical.same_shape(numerical) {
            return Err(TensorError::shape_mismatch(
                "compare_gradients",
                &numerical.shape().to_string(),
                &analytical.shape().to_string(),
            ));
        }

        let mut result = GradientCheckResult {
            passed: true,
            max_relative_error: 0.0,
            max_absolute_error: 0.0,
            num_elements_checked: analytical.numel(),
            num_failures: 0,
            failed_indices: Vec::new(),
        };

        for (i, (a, n)) in analytical
            .array()
            .iter()
            .zip(numerical.array().iter())
            .enumerate()
        {
            let a = a.to_f64().unwrap_or(f64::NAN);
            let n = n.to_f64().unwrap_or(f64::NAN);
            let abs_err = (a - n).abs();
            let rel_err = abs_err / n.abs().max(f64::MIN_POSITIVE);

            result.max_absolute_error = result.max_absolute_error.max(abs_err);
            if abs_err > self.config.atol {
                result.max_relative_error = result.max_relative_error.max(rel_err);
            }

            // NaN fails this comparison too
            if !(abs_err <= self.config.atol + self.config.rtol * n.abs()) {
                result.passed = false;
                result.num_failures += 1;
                result.failed_indices.push(i);
            }
        }

        Ok(result)
    }

    /// Compute the numerical gradient and compare it with `analytical`
    pub fn check<F>(
        &self,
        input: &Tensor<T>,
        loss: F,
        analytical: &Tensor<T>,
    ) -> Result<GradientCheckResult>
    where
        F: Fn(&Tensor<T>) -> Result<T>,
    {
        let numerical = self.compute_numerical_gradient(input, loss)?;
        self.compare_gradients(analytical, &numerical)
    }
}
