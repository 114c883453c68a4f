//! Core error types for breathwork-core.
//!
//! The timer itself cannot fail; errors come from parsing preset names
//! handed in by the presentation layer and from configuration I/O.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for breathwork-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Preset name outside the fixed set
    #[error("Unknown preset '{0}' (expected one of: calm, box-breathing, coffee)")]
    UnknownPreset(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse errors
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key not present in the configuration
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
