//! Rune runtime configuration
//!
//! This crate provides centralized configuration for the gear and tween
//! runtime, loading settings from `rune.toml` with environment variable
//! overrides. The loaded value is immutable once handed to the runtime.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading `rune.toml`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Main configuration structure for the Rune runtime
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct RuneConfig {
    /// Tween and gear animation settings
    pub animation: AnimationConfig,
}

/// Animation configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnimationConfig {
    /// Let gears animate page changes. When false every gear writes its
    /// owner directly, even if a tween block was authored.
    pub tween_enabled: bool,
    /// Catch and log panics raised by tween callbacks instead of letting
    /// them unwind out of the frame tick.
    pub catch_callback_panics: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            tween_enabled: true,
            catch_callback_panics: true,
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .map(|val| val == "1" || val.eq_ignore_ascii_case("true"))
}

impl RuneConfig {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the rune.toml configuration file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from the default location (rune.toml in the current directory)
    /// or return default configuration if file doesn't exist
    pub fn load_or_default() -> Self {
        Self::load_from_file("rune.toml").unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        if let Some(enabled) = env_flag("RUNE_TWEEN_ENABLED") {
            self.animation.tween_enabled = enabled;
        }
        if let Some(catch) = env_flag("RUNE_CATCH_CALLBACK_PANICS") {
            self.animation.catch_callback_panics = catch;
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from rune.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RuneConfig::default();
        assert!(config.animation.tween_enabled);
        assert!(config.animation.catch_callback_panics);
    }

    #[test]
    fn test_toml_serialization() {
        let config = RuneConfig {
            animation: AnimationConfig {
                tween_enabled: false,
                catch_callback_panics: true,
            },
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: RuneConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let parsed: RuneConfig = toml::from_str("[animation]\ntween_enabled = false\n").unwrap();
        assert!(!parsed.animation.tween_enabled);
        assert!(parsed.animation.catch_callback_panics);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = RuneConfig::load_from_file("definitely/not/here/rune.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read(_)));
    }

    #[test]
    fn test_merge_with_env() {
        unsafe {
            std::env::set_var("RUNE_TWEEN_ENABLED", "false");
            std::env::set_var("RUNE_CATCH_CALLBACK_PANICS", "0");
        }

        let mut config = RuneConfig::default();
        config.merge_with_env();

        assert!(!config.animation.tween_enabled);
        assert!(!config.animation.catch_callback_panics);

        unsafe {
            std::env::remove_var("RUNE_TWEEN_ENABLED");
            std::env::remove_var("RUNE_CATCH_CALLBACK_PANICS");
        }
    }
}
