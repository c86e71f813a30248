//! Environment variable override handling
//!
//! Recognised variables, with the default prefix `NORMKIT_`:
//!
//! - `NORMKIT_IMAGE_BACKEND`: `pil`, `cv2` or `tensor`
//! - `NORMKIT_NORMALIZE`: boolean (`true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off`)

use super::VisionConfig;
use crate::backend::ImageBackend;
use normkit_core::{Result, TensorError};
use std::collections::HashMap;
use std::env;
use tracing::{debug, warn};

const IMAGE_BACKEND: &str = "IMAGE_BACKEND";
const NORMALIZE: &str = "NORMALIZE";
const SUPPORTED: [&str; 2] = [IMAGE_BACKEND, NORMALIZE];

/// Environment variable override handler
#[derive(Debug)]
pub struct EnvironmentOverride {
    /// Prefix for environment variables
    prefix: String,
    /// Cache of environment variables
    env_cache: HashMap<String, String>,
    /// Whether to cache environment variables
    cache_enabled: bool,
}

impl Default for EnvironmentOverride {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvironmentOverride {
    /// Handler with the default prefix `NORMKIT_`
    pub fn new() -> Self {
        Self::with_prefix("NORMKIT_")
    }

    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            env_cache: HashMap::new(),
            cache_enabled: true,
        }
    }

    pub fn set_prefix(&mut self, prefix: &str) {
        self.prefix = prefix.to_string();
        self.clear_cache();
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn set_cache_enabled(&mut self, enabled: bool) {
        self.cache_enabled = enabled;
        if !enabled {
            self.clear_cache();
        }
    }

    pub fn clear_cache(&mut self) {
        self.env_cache.clear();
    }

    /// Fully prefixed names of the variables this handler reads
    pub fn supported_variables(&self) -> Vec<String> {
        SUPPORTED
            .iter()
            .map(|key| format!("{}{key}", self.prefix))
            .collect()
    }

    /// Apply environment variable overrides to a configuration
    pub fn apply_overrides(&mut self, mut config: VisionConfig) -> Result<VisionConfig> {
        self.warn_unknown_variables();

        if let Some(value) = self.get_env_var(IMAGE_BACKEND) {
            config.image_backend = value.parse::<ImageBackend>().map_err(|e| {
                self.invalid_value(IMAGE_BACKEND, &value, &e.to_string())
            })?;
        }

        if let Some(normalize) = self.parse_bool_env_var(NORMALIZE)? {
            config.normalize = normalize;
        }

        debug!(prefix = %self.prefix, ?config, "applied environment overrides");
        Ok(config)
    }

    /// Get an environment variable with the configured prefix
    fn get_env_var(&mut self, key: &str) -> Option<String> {
        let full_key = format!("{}{}", self.prefix, key);

        if self.cache_enabled {
            if let Some(value) = self.env_cache.get(&full_key) {
                return Some(value.clone());
            }
        }

        let value = env::var(&full_key).ok()?;
        if self.cache_enabled {
            self.env_cache.insert(full_key, value.clone());
        }
        Some(value)
    }

    /// Parse a boolean environment variable
    fn parse_bool_env_var(&mut self, key: &str) -> Result<Option<bool>> {
        let Some(value) = self.get_env_var(key) else {
            return Ok(None);
        };
        match value.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" | "enabled" => Ok(Some(true)),
            "false" | "0" | "no" | "off" | "disabled" => Ok(Some(false)),
            _ => Err(self.invalid_value(
                key,
                &value,
                "use true/false, 1/0, yes/no, on/off, or enabled/disabled",
            )),
        }
    }

    fn invalid_value(&self, key: &str, value: &str, reason: &str) -> TensorError {
        warn!(variable = %format!("{}{key}", self.prefix), value, "invalid environment override");
        TensorError::config_error(
            "environment_override",
            format!(
                "invalid value for environment variable {}{key}='{value}': {reason}",
                self.prefix
            ),
        )
    }

    fn warn_unknown_variables(&self) {
        if self.prefix.is_empty() {
            return;
        }
        for (name, _) in env::vars_os() {
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some(key) = name.strip_prefix(self.prefix.as_str()) {
                if !SUPPORTED.contains(&key) {
                    warn!(variable = %name, "ignoring unknown environment override");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own prefix so tests can run in parallel

    #[test]
    fn test_environment_override_creation() {
        let env_override = EnvironmentOverride::new();
        assert_eq!(env_override.prefix(), "NORMKIT_");
        assert_eq!(
            env_override.supported_variables(),
            vec!["NORMKIT_IMAGE_BACKEND", "NORMKIT_NORMALIZE"]
        );

        let mut custom = EnvironmentOverride::with_prefix("CUSTOM_");
        assert_eq!(custom.prefix(), "CUSTOM_");
        custom.set_prefix("OTHER_");
        assert_eq!(custom.prefix(), "OTHER_");
    }

    #[test]
    fn test_overrides_applied() {
        env::set_var("NKTEST_APPLY_IMAGE_BACKEND", "tensor");
        env::set_var("NKTEST_APPLY_NORMALIZE", "off");

        let mut env_override = EnvironmentOverride::with_prefix("NKTEST_APPLY_");
        let config = env_override
            .apply_overrides(VisionConfig::default())
            .unwrap();
        assert_eq!(config.image_backend, ImageBackend::Tensor);
        assert!(!config.normalize);

        env::remove_var("NKTEST_APPLY_IMAGE_BACKEND");
        env::remove_var("NKTEST_APPLY_NORMALIZE");
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let mut env_override = EnvironmentOverride::with_prefix("NKTEST_UNSET_");
        let config = VisionConfig::default().with_backend(ImageBackend::Cv2);
        assert_eq!(env_override.apply_overrides(config.clone()).unwrap(), config);
    }

    #[test]
    fn test_invalid_backend_override() {
        env::set_var("NKTEST_BADBACKEND_IMAGE_BACKEND", "opencv");

        let mut env_override = EnvironmentOverride::with_prefix("NKTEST_BADBACKEND_");
        let err = env_override
            .apply_overrides(VisionConfig::default())
            .unwrap_err();
        assert!(matches!(err, TensorError::ConfigError { .. }));
        assert!(err.to_string().contains("['pil', 'cv2', 'tensor']"));

        env::remove_var("NKTEST_BADBACKEND_IMAGE_BACKEND");
    }

    #[test]
    fn test_boolean_parsing() {
        let mut env_override = EnvironmentOverride::with_prefix("NKTEST_BOOL_");
        env_override.set_cache_enabled(false);

        for (value, expected) in [("true", true), ("1", true), ("Yes", true), ("disabled", false)] {
            env::set_var("NKTEST_BOOL_FLAG", value);
            assert_eq!(
                env_override.parse_bool_env_var("FLAG").unwrap(),
                Some(expected)
            );
        }

        env::set_var("NKTEST_BOOL_FLAG", "maybe");
        assert!(env_override.parse_bool_env_var("FLAG").is_err());
        env::remove_var("NKTEST_BOOL_FLAG");
        assert_eq!(env_override.parse_bool_env_var("FLAG").unwrap(), None);
    }

    #[test]
    fn test_cache_functionality() {
        let mut env_override = EnvironmentOverride::with_prefix("NKTEST_CACHE_");
        env::set_var("NKTEST_CACHE_NORMALIZE", "true");
        assert_eq!(env_override.get_env_var("NORMALIZE").as_deref(), Some("true"));

        // Cached value wins until the cache is cleared
        env::set_var("NKTEST_CACHE_NORMALIZE", "false");
        assert_eq!(env_override.get_env_var("NORMALIZE").as_deref(), Some("true"));
        env_override.clear_cache();
        assert_eq!(env_override.get_env_var("NORMALIZE").as_deref(), Some("false"));

        env::remove_var("NKTEST_CACHE_NORMALIZE");
    }
}
