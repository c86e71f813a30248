#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum DType {
    Float32,
    Float64,
    Int32,
    Int64,
    UInt8,
    Bool,
}

impl DType {
    /// Floating point dtypes accepted by the normalization kernels
    pub const FLOATING: [DType; 2] = [DType::Float32, DType::Float64];

    pub fn size(&self) -> usize {
        match self {
            DType::Float32 => 4,
            DType::Float64 => 8,
            DType::Int32 => 4,
            DType::Int64 => 8,
            DType::UInt8 => 1,
            DType::Bool => 1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DType::Float32 => "float32",
            DType::Float64 => "float64",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::UInt8 => "uint8",
            DType::Bool => "bool",
        }
    }

    pub fn is_floating_point(&self) -> bool {
        matches!(self, DType::Float32 | DType::Float64)
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Get DType from Rust type, `None` for element types without a dtype
pub fn dtype_from_type<T: 'static>() -> Option<DType> {
    use std::any::TypeId;

    let id = TypeId::of::<T>();
    if id == TypeId::of::<f32>() {
        Some(DType::Float32)
    } else if id == TypeId::of::<f64>() {
        Some(DType::Float64)
    } else if id == TypeId::of::<i32>() {
        Some(DType::Int32)
    } else if id == TypeId::of::<i64>() {
        Some(DType::Int64)
    } else if id == TypeId::of::<u8>() {
        Some(DType::UInt8)
    } else if id == TypeId::of::<bool>() {
        Some(DType::Bool)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_from_type() {
        assert_eq!(dtype_from_type::<f32>(), Some(DType::Float32));
        assert_eq!(dtype_from_type::<f64>(), Some(DType::Float64));
        assert_eq!(dtype_from_type::<u8>(), Some(DType::UInt8));
        assert_eq!(dtype_from_type::<u16>(), None);
    }

    #[test]
    fn test_floating_point() {
        assert!(DType::Float32.is_floating_point());
        assert!(DType::Float64.is_floating_point());
        assert!(!DType::Int32.is_floating_point());
        assert!(!DType::UInt8.is_floating_point());
        assert_eq!(DType::Float64.size(), 8);
        assert_eq!(DType::Int64.to_string(), "int64");
    }
}
