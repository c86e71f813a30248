//! Configuration for image loading
//!
//! The image backend is chosen through an explicit [`VisionConfig`] rather
//! than a process-wide switch. Configurations can be read from YAML, TOML or
//! JSON files and then adjusted with environment variables.
//!
//! ## Sub-modules
//!
//! - `loader`: Configuration file loading and parsing
//! - `env`: Environment variable override handling

pub mod env;
pub mod loader;

pub use env::EnvironmentOverride;
pub use loader::{ConfigLoader, ConfigSource};

use crate::backend::ImageBackend;
use normkit_core::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Image loading configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VisionConfig {
    /// Backend used by [`image_load`](crate::image_load)
    pub image_backend: ImageBackend,
    /// Scale pixel values to `[0, 1]` when converting to float tensors
    pub normalize: bool,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            image_backend: ImageBackend::Pil,
            normalize: true,
        }
    }
}

impl VisionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(mut self, backend: ImageBackend) -> Self {
        self.image_backend = backend;
        self
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Defaults adjusted by `NORMKIT_*` environment variables
    pub fn from_env() -> Result<Self> {
        EnvironmentOverride::new().apply_overrides(Self::default())
    }

    /// Load a configuration file, then apply `NORMKIT_*` environment variables
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = ConfigLoader::new().load_from_file(path)?;
        EnvironmentOverride::new().apply_overrides(config)
    }
}

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format (.yaml, .yml)
    Yaml,
    /// TOML format (.toml)
    Toml,
    /// JSON format (.json)
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Get file extensions for this format
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Yaml => &["yaml", "yml"],
            Self::Toml => &["toml"],
            Self::Json => &["json"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use normkit_core::TensorError;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config() {
        let config = VisionConfig::default();
        assert_eq!(config.image_backend, ImageBackend::Pil);
        assert!(config.normalize);

        let config = VisionConfig::new()
            .with_backend(ImageBackend::Cv2)
            .with_normalize(false);
        assert_eq!(config.image_backend, ImageBackend::Cv2);
        assert!(!config.normalize);
    }

    #[test]
    fn test_config_format_detection() {
        assert_eq!(ConfigFormat::from_extension("yaml"), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_extension("YML"), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_extension("toml"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("json"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("txt"), None);
        assert_eq!(ConfigFormat::Yaml.extensions(), &["yaml", "yml"]);
    }

    // Touches the real NORMKIT_ variables, so every step lives in one test
    #[test]
    fn test_load_and_from_env() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "image_backend = \"cv2\"\nnormalize = false").unwrap();

        let config = VisionConfig::load(file.path()).unwrap();
        assert_eq!(
            config,
            VisionConfig::new()
                .with_backend(ImageBackend::Cv2)
                .with_normalize(false)
        );

        let dir = TempDir::new().unwrap();
        let err = VisionConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, TensorError::IoError { .. }));

        std::env::set_var("NORMKIT_IMAGE_BACKEND", "tensor");
        let from_env = VisionConfig::from_env();
        let loaded = VisionConfig::load(file.path());
        std::env::remove_var("NORMKIT_IMAGE_BACKEND");

        let from_env = from_env.unwrap();
        assert_eq!(from_env.image_backend, ImageBackend::Tensor);
        assert!(from_env.normalize);
        // Environment wins over the file
        let loaded = loaded.unwrap();
        assert_eq!(loaded.image_backend, ImageBackend::Tensor);
        assert!(!loaded.normalize);

        assert_eq!(VisionConfig::from_env().unwrap(), VisionConfig::default());
    }
}
