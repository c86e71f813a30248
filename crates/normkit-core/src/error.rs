use crate::DType;
use thiserror::Error;

/// Errors raised at the boundary of every normkit operation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TensorError {
    #[error("Shape mismatch in operation '{operation}': expected {expected}, got {got}")]
    ShapeMismatch {
        operation: String,
        expected: String,
        got: String,
    },

    #[error("Invalid shape in operation '{operation}': {reason}")]
    InvalidShape {
        operation: String,
        reason: String,
        shape: Option<Vec<usize>>,
    },

    #[error("Invalid argument in operation '{operation}': {reason}")]
    InvalidArgument { operation: String, reason: String },

    #[error("Unsupported dtype in operation '{operation}': got {dtype}, expected one of {expected:?}")]
    UnsupportedDType {
        operation: String,
        dtype: DType,
        expected: Vec<DType>,
    },

    #[error("Dtype mismatch in operation '{operation}': {first} and {second}")]
    DTypeMismatch {
        operation: String,
        first: DType,
        second: DType,
    },

    #[error("IO error in operation '{operation}': {details}")]
    IoError {
        operation: String,
        details: String,
        path: Option<String>,
    },

    #[error("Configuration error in '{operation}': {details}")]
    ConfigError { operation: String, details: String },
}

impl TensorError {
    /// Create a shape mismatch error
    pub fn shape_mismatch(operation: &str, expected: &str, got: &str) -> Self {
        Self::ShapeMismatch {
            operation: operation.to_string(),
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }

    /// Create an invalid shape error that records the offending shape
    pub fn invalid_shape(operation: &str, reason: &str, shape: &[usize]) -> Self {
        Self::InvalidShape {
            operation: operation.to_string(),
            reason: reason.to_string(),
            shape: Some(shape.to_vec()),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(operation: &str, reason: String) -> Self {
        Self::InvalidArgument {
            operation: operation.to_string(),
            reason,
        }
    }

    /// Create a type error for a dtype the operation cannot handle
    pub fn unsupported_dtype(operation: &str, dtype: DType, expected: &[DType]) -> Self {
        Self::UnsupportedDType {
            operation: operation.to_string(),
            dtype,
            expected: expected.to_vec(),
        }
    }

    /// Create a dtype mismatch error between two inputs
    pub fn dtype_mismatch(operation: &str, first: DType, second: DType) -> Self {
        Self::DTypeMismatch {
            operation: operation.to_string(),
            first,
            second,
        }
    }

    /// Create an IO error bound to a path
    pub fn io_error(operation: &str, details: String, path: &std::path::Path) -> Self {
        Self::IoError {
            operation: operation.to_string(),
            details,
            path: Some(path.display().to_string()),
        }
    }

    /// Create a configuration error
    pub fn config_error(operation: &str, details: String) -> Self {
        Self::ConfigError {
            operation: operation.to_string(),
            details,
        }
    }

    /// Name of the operation that raised the error
    pub fn operation(&self) -> &str {
        match self {
            Self::ShapeMismatch { operation, .. }
            | Self::InvalidShape { operation, .. }
            | Self::InvalidArgument { operation, .. }
            | Self::UnsupportedDType { operation, .. }
            | Self::DTypeMismatch { operation, .. }
            | Self::IoError { operation, .. }
            | Self::ConfigError { operation, .. } => operation,
        }
    }

    /// Whether this is a type error (as opposed to a value or shape error)
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedDType { .. } | Self::DTypeMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, TensorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_contains_operation() {
        let err = TensorError::shape_mismatch("instance_norm", "[3]", "[4]");
        let msg = err.to_string();
        assert!(msg.contains("instance_norm"));
        assert!(msg.contains("[3]"));
        assert!(msg.contains("[4]"));
        assert_eq!(err.operation(), "instance_norm");
    }

    #[test]
    fn test_invalid_shape_records_shape() {
        let err = TensorError::invalid_shape("instance_norm", "rank too small", &[3]);
        match err {
            TensorError::InvalidShape { shape, .. } => assert_eq!(shape, Some(vec![3])),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_type_errors() {
        let err = TensorError::unsupported_dtype(
            "instance_norm",
            DType::Int32,
            &[DType::Float32, DType::Float64],
        );
        assert!(err.is_type_error());
        assert!(err.to_string().contains("int32"));

        let err = TensorError::dtype_mismatch("instance_norm", DType::Float32, DType::Float64);
        assert!(err.is_type_error());

        let err = TensorError::invalid_argument("load", "bad".to_string());
        assert!(!err.is_type_error());
    }
}
