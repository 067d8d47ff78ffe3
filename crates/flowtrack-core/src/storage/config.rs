//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Metric window and fallback values
//! - Defaults applied to newly created tasks and blocks
//! - Log level for front-ends
//!
//! Configuration is stored at `~/.config/flowtrack/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, CoreError};
use crate::stats::{MetricsSettings, DEFAULT_HISTORICAL_ACCURACY, DEFAULT_RESOLUTION, DEFAULT_WINDOW_SIZE};
use crate::store::{StoreSettings, DEFAULT_FLOW_INTENSITY};
use crate::task::NewTask;

/// Metric aggregation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    #[serde(default = "default_resolution")]
    pub default_resolution: f64,
    #[serde(default = "default_accuracy")]
    pub default_accuracy: f64,
}

/// Defaults for new tasks and blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    #[serde(default = "default_context_switch_cost")]
    pub default_context_switch_cost: f64,
    #[serde(default = "default_satisficing_threshold")]
    pub default_satisficing_threshold: f64,
    #[serde(default = "default_flow_intensity")]
    pub default_flow_intensity: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/flowtrack/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub tasks: TasksConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}
fn default_resolution() -> f64 {
    DEFAULT_RESOLUTION
}
fn default_accuracy() -> f64 {
    DEFAULT_HISTORICAL_ACCURACY
}
fn default_context_switch_cost() -> f64 {
    5.0
}
fn default_satisficing_threshold() -> f64 {
    0.8
}
fn default_flow_intensity() -> f64 {
    DEFAULT_FLOW_INTENSITY
}
fn default_log_level() -> String {
    "warn".into()
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            default_resolution: default_resolution(),
            default_accuracy: default_accuracy(),
        }
    }
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            default_context_switch_cost: default_context_switch_cost(),
            default_satisficing_threshold: default_satisficing_threshold(),
            default_flow_intensity: default_flow_intensity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) => return Err(unknown()),
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults if no file exists.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed, or the
    /// defaults cannot be written.
    pub fn load() -> Result<Self, CoreError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if it does not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed, or the
    /// defaults cannot be written.
    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                CoreError::from(ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Load, falling back to defaults on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load config; using defaults");
            Self::default()
        })
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), CoreError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<(), CoreError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key in memory. Unknown keys are rejected.
    ///
    /// # Errors
    /// Returns an error if the key is unknown or the value does not fit the
    /// field's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Flattened `(key, value)` pairs of every leaf setting.
    pub fn entries(&self) -> Vec<(String, String)> {
        fn walk(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
            match value {
                serde_json::Value::Object(map) => {
                    for (k, v) in map {
                        let key = if prefix.is_empty() {
                            k.clone()
                        } else {
                            format!("{prefix}.{k}")
                        };
                        walk(&key, v, out);
                    }
                }
                serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }

        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            walk("", &json, &mut out);
        }
        out.sort();
        out
    }

    /// Settings handed to a [`crate::FlowStore`].
    pub fn store_settings(&self) -> StoreSettings {
        StoreSettings {
            metrics: MetricsSettings {
                window_size: self.metrics.window_size.max(1),
                default_resolution: self.metrics.default_resolution,
            },
            default_flow_intensity: self.tasks.default_flow_intensity.clamp(0.0, 1.0),
            default_accuracy: self.metrics.default_accuracy.clamp(0.0, 1.0),
        }
    }

    /// A creation request carrying the configured task defaults.
    pub fn new_task(&self, title: impl Into<String>, estimated_minutes: u32) -> NewTask {
        let mut request = NewTask::new(title, estimated_minutes)
            .with_switch_cost(self.tasks.default_context_switch_cost);
        request.satisficing_threshold = self.tasks.default_satisficing_threshold;
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.metrics.window_size, 20);
        assert_eq!(parsed.metrics.default_resolution, 5.0);
        assert_eq!(parsed.logging.level, "warn");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[metrics]\nwindow_size = 5\n").unwrap();
        assert_eq!(parsed.metrics.window_size, 5);
        assert_eq!(parsed.metrics.default_accuracy, 0.7);
        assert_eq!(parsed.tasks.default_context_switch_cost, 5.0);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("metrics.window_size").as_deref(), Some("20"));
        assert_eq!(cfg.get("logging.level").as_deref(), Some("warn"));
        assert!(cfg.get("metrics.missing_key").is_none());
    }

    #[test]
    fn set_updates_numbers_and_strings() {
        let mut cfg = Config::default();
        cfg.set("metrics.window_size", "10").unwrap();
        cfg.set("tasks.default_flow_intensity", "0.7").unwrap();
        cfg.set("logging.level", "debug").unwrap();
        assert_eq!(cfg.metrics.window_size, 10);
        assert_eq!(cfg.tasks.default_flow_intensity, 0.7);
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(cfg.set("metrics.nonexistent", "1").is_err());
        assert!(cfg.set("metrics", "1").is_err());
        assert!(cfg.set("", "1").is_err());
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.set("metrics.window_size", "lots").is_err());
        assert_eq!(cfg.metrics.window_size, 20);
    }

    #[test]
    fn entries_lists_every_leaf() {
        let keys: Vec<String> = Config::default().entries().into_iter().map(|(k, _)| k).collect();
        assert!(keys.contains(&"metrics.window_size".to_string()));
        assert!(keys.contains(&"tasks.default_satisficing_threshold".to_string()));
        assert_eq!(keys.len(), 7);
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.metrics.window_size, 20);
        assert!(path.exists());

        let mut cfg = cfg;
        cfg.set("metrics.window_size", "8").unwrap();
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().metrics.window_size, 8);
    }

    #[test]
    fn load_from_corrupt_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "metrics = [").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn store_settings_clamp_values() {
        let mut cfg = Config::default();
        cfg.set("metrics.window_size", "0").unwrap();
        cfg.set("tasks.default_flow_intensity", "3").unwrap();
        let settings = cfg.store_settings();
        assert_eq!(settings.metrics.window_size, 1);
        assert_eq!(settings.default_flow_intensity, 1.0);
    }
}
