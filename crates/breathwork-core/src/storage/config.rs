//! TOML-based application configuration.
//!
//! Stores presentation preferences only: which preset to run by default,
//! the tick interval, and output style. Cycle count and phase durations are
//! fixed by the presets and cannot be configured.
//!
//! Configuration is stored at `~/.config/breathwork/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::timer::{Preset, RunnerOptions};

const MAX_TICK_INTERVAL_MS: u64 = 60_000;

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/breathwork/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_preset")]
    pub default_preset: Preset,
    /// Milliseconds between ticks. 1000 for real sessions.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Print the preset description before a session starts.
    #[serde(default = "default_true")]
    pub show_description: bool,
    /// Emit JSON events instead of rendered lines.
    #[serde(default)]
    pub json_output: bool,
}

fn default_preset() -> Preset {
    Preset::Calm
}
fn default_tick_interval_ms() -> u64 {
    1000
}
fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_preset: default_preset(),
            tick_interval_ms: default_tick_interval_ms(),
            show_description: true,
            json_output: false,
        }
    }
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing defaults first if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            return Ok(cfg);
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let cfg: Config = toml::from_str(&content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 || self.tick_interval_ms > MAX_TICK_INTERVAL_MS {
            return Err(ConfigError::InvalidValue {
                key: "tick_interval_ms".into(),
                message: format!("must be between 1 and {MAX_TICK_INTERVAL_MS}"),
            });
        }
        Ok(())
    }

    /// Get a config value as string by key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match json.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key, in memory. Call [`Config::save`] to persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not parse
    /// for that key's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        let obj = json
            .as_object_mut()
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        let existing = obj
            .get(key)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
            ),
            serde_json::Value::Number(_) => serde_json::Value::Number(
                value
                    .parse::<u64>()
                    .map_err(|e| invalid(e.to_string()))?
                    .into(),
            ),
            _ if key == "default_preset" => {
                let preset = value.parse::<Preset>()?;
                serde_json::Value::String(preset.key().to_string())
            }
            _ => serde_json::Value::String(value.to_string()),
        };
        obj.insert(key.to_string(), new_value);

        let updated: Config = serde_json::from_value(json)?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn runner_options(&self) -> RunnerOptions {
        RunnerOptions {
            tick_interval: self.tick_interval(),
            ..RunnerOptions::default()
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
