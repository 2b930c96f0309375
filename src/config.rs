//! Configuration file support for BVAT.
//!
//! This module provides serialization and deserialization of application settings,
//! allowing users to export and import their configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{HANDLE_SIZE, MIN_BOX_SIZE};
use crate::keybindings::KeyBindings;
use crate::model::{ClassDef, default_classes};

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Application configuration that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Application name (for identification)
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// User preferences
    #[serde(default)]
    pub preferences: UserPreferences,

    /// Keybinding configuration
    #[serde(default)]
    pub keybindings: KeyBindings,

    /// Classes used for projects without a class file
    #[serde(default = "default_classes")]
    pub classes: Vec<ClassDef>,
}

fn default_app_name() -> String {
    "BVAT".to_string()
}

/// User preferences section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Side length of the resize handle squares, in image pixels
    #[serde(default = "default_handle_size")]
    pub handle_size: f32,

    /// A drawn box must be wider and taller than this to be kept
    #[serde(default = "default_min_box_size")]
    pub min_box_size: f32,

    /// Ignore editor keys while a text field has focus
    #[serde(default = "default_text_input_guard")]
    pub text_input_guard: bool,
}

fn default_handle_size() -> f32 {
    HANDLE_SIZE
}

fn default_min_box_size() -> f32 {
    MIN_BOX_SIZE
}

fn default_text_input_guard() -> bool {
    true
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            handle_size: default_handle_size(),
            min_box_size: default_min_box_size(),
            text_input_guard: default_text_input_guard(),
        }
    }
}

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            app_name: default_app_name(),
            preferences: UserPreferences::default(),
            keybindings: KeyBindings::default(),
            classes: default_classes(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Get the default filename for config export.
    pub fn default_filename() -> &'static str {
        "bvat-config.json"
    }

    /// Get the default config file path for auto-load/save.
    pub fn default_path() -> Option<PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("bvat").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("bvat")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load_from_path(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to a specific file, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Key;

    #[test]
    fn test_roundtrip_defaults() {
        let config = AppConfig::new();
        let json = config.to_json().expect("serialize");
        let parsed = AppConfig::from_json(&json).expect("parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_minimal_config_fills_defaults() {
        let config = AppConfig::from_json(r#"{"version": 1}"#).expect("parse");
        assert_eq!(config.app_name, "BVAT");
        assert_eq!(config.preferences.handle_size, 6.0);
        assert_eq!(config.preferences.min_box_size, 5.0);
        assert!(config.preferences.text_input_guard);
        assert_eq!(config.classes, default_classes());
        assert_eq!(config.keybindings.delete_selected, vec![Key::Delete, Key::Backspace]);
    }

    #[test]
    fn test_newer_version_rejected() {
        let err = AppConfig::from_json(r#"{"version": 99}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::VersionTooNew {
                file_version: 99,
                supported_version: CONFIG_VERSION
            }
        ));
    }

    #[test]
    fn test_log_level_parsing() {
        let config =
            AppConfig::from_json(r#"{"version": 1, "preferences": {"log_level": "debug"}}"#)
                .expect("parse");
        assert_eq!(config.preferences.log_level, LogLevel::Debug);
        assert_eq!(config.preferences.log_level.name(), "Debug");
        assert_eq!(
            config.preferences.log_level.to_level_filter(),
            log::LevelFilter::Debug
        );
    }

    #[test]
    fn test_save_and_load_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join(AppConfig::default_filename());
        let mut config = AppConfig::new();
        config.preferences.log_level = LogLevel::Trace;
        config.save_to_path(&path).expect("save");
        assert_eq!(AppConfig::load_from_path(&path).expect("load"), config);
    }
}
