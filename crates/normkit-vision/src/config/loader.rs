//! Configuration file loading and parsing
//!
//! Supports YAML, TOML and JSON. The format is taken from the file extension
//! unless given explicitly.

use super::{ConfigFormat, VisionConfig};
use normkit_core::{Result, TensorError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration source information
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Configuration loaded from a file
    File(PathBuf),
    /// Configuration loaded from a string
    String { format: ConfigFormat },
}

/// Configuration loader for various formats
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// History of loaded configurations
    load_history: Vec<ConfigSource>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<VisionConfig> {
        let path = path.as_ref();
        let format = detect_format(path)?;
        let content = fs::read_to_string(path).map_err(|e| {
            TensorError::io_error(
                "load_config",
                format!("failed to read configuration file: {e}"),
                path,
            )
        })?;

        let config = parse_content(&content, format)?;
        debug!(path = %path.display(), ?format, ?config, "loaded configuration");

        self.load_history.push(ConfigSource::File(path.to_path_buf()));
        Ok(config)
    }

    /// Load configuration from a string
    pub fn load_from_string(&mut self, content: &str, format: ConfigFormat) -> Result<VisionConfig> {
        let config = parse_content(content, format)?;
        debug!(?format, ?config, "parsed configuration");
        self.load_history.push(ConfigSource::String { format });
        Ok(config)
    }

    /// Save configuration to a file, in the format implied by its extension
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &VisionConfig, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serialize_config(config, detect_format(path)?)?;
        fs::write(path, content).map_err(|e| {
            TensorError::io_error(
                "save_config",
                format!("failed to write configuration file: {e}"),
                path,
            )
        })
    }

    pub fn load_history(&self) -> &[ConfigSource] {
        &self.load_history
    }

    pub fn clear_history(&mut self) {
        self.load_history.clear();
    }
}

/// Detect configuration format from file extension
fn detect_format(path: &Path) -> Result<ConfigFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| {
            TensorError::config_error(
                "load_config",
                format!(
                    "could not determine file extension for '{}'",
                    path.display()
                ),
            )
        })?;

    ConfigFormat::from_extension(extension).ok_or_else(|| {
        TensorError::config_error(
            "load_config",
            format!("unsupported configuration file format: '{extension}'"),
        )
    })
}

fn parse_content(content: &str, format: ConfigFormat) -> Result<VisionConfig> {
    let parsed = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
    };
    parsed.map_err(|e| {
        TensorError::config_error(
            "load_config",
            format!("failed to parse {format:?} configuration: {e}"),
        )
    })
}

fn serialize_config(config: &VisionConfig, format: ConfigFormat) -> Result<String> {
    let serialized = match format {
        ConfigFormat::Yaml => serde_yaml::to_string(config).map_err(|e| e.to_string()),
        ConfigFormat::Toml => toml::to_string_pretty(config).map_err(|e| e.to_string()),
        ConfigFormat::Json => serde_json::to_string_pretty(config).map_err(|e| e.to_string()),
    };
    serialized.map_err(|e| {
        TensorError::config_error(
            "save_config",
            format!("failed to serialize {format:?} configuration: {e}"),
        )
    })
}
