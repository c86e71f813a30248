//! Normalization layers

pub mod instance_norm;

pub use instance_norm::InstanceNorm;
