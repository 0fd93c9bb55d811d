//! TOML-based application configuration.
//!
//! Stores:
//! - Event backend location and request timeout
//! - Countdown tick interval
//! - Scroll-reveal threshold and root margin
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::api::DEFAULT_TIMEOUT_MS;
use crate::countdown::DEFAULT_TICK_INTERVAL_MS;
use crate::error::ConfigError;
use crate::reveal::{RevealOptions, RootMargin, DEFAULT_ROOT_MARGIN, DEFAULT_THRESHOLD};

/// Environment variable overriding `api.base_url`.
pub const API_URL_ENV: &str = "EVENTPAGE_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_root_margin")]
    pub root_margin: String,
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub countdown: CountdownConfig,
    #[serde(default)]
    pub reveal: RevealConfig,
}

fn default_base_url() -> String {
    "http://localhost:3000".into()
}
fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}
fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}
fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}
fn default_root_margin() -> String {
    DEFAULT_ROOT_MARGIN.into()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            root_margin: default_root_margin(),
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
        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

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
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults there if it is absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the data directory.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
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

    /// Set a value by dot-separated key without saving.
    ///
    /// The new value keeps the JSON type of the old one, and the result
    /// must pass [`Config::validate`].
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Reject values the runtime cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "api.timeout_ms".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.countdown.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "countdown.tick_interval_ms".into(),
                message: "must be at least 1".into(),
            });
        }
        self.reveal_options()?;
        Ok(())
    }

    /// [`Config::apply`] followed by [`Config::save`].
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Validated reveal options.
    pub fn reveal_options(&self) -> Result<RevealOptions, ConfigError> {
        let margin = self.reveal.root_margin.parse::<RootMargin>()?;
        Ok(RevealOptions::new(self.reveal.threshold, margin)?)
    }

    /// `api.base_url`, unless overridden by `EVENTPAGE_API_URL`.
    pub fn api_base_url(&self) -> String {
        std::env::var(API_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.api.base_url.clone())
    }

    /// Never zero, even for a hand-edited file.
    pub fn api_timeout(&self) -> Duration {
        Duration::from_millis(self.api.timeout_ms.max(1))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.countdown.tick_interval_ms.max(1))
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails; the error is logged.
    pub fn load_or_default() -> Self {
        match Self::path() {
            Ok(path) => Self::load_from_or_default(&path),
            Err(e) => {
                tracing::warn!(error = %e, "config directory unavailable; using defaults");
                Self::default()
            }
        }
    }

    /// [`Config::load_from`], falling back to defaults with a warning.
    pub fn load_from_or_default(path: &Path) -> Self {
        Self::load_from(path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, path = %path.display(), "config unreadable; using defaults");
            Self::default()
        })
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
        assert_eq!(parsed.api.timeout_ms, 8000);
        assert_eq!(parsed.reveal.root_margin, "0px 0px -10% 0px");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[reveal]\nthreshold = 0.5\n").unwrap();
        assert_eq!(parsed.reveal.threshold, 0.5);
        assert_eq!(parsed.reveal.root_margin, DEFAULT_ROOT_MARGIN);
        assert_eq!(parsed.countdown.tick_interval_ms, 1000);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("api.timeout_ms").as_deref(), Some("8000"));
        assert_eq!(cfg.get("reveal.threshold").as_deref(), Some("0.12"));
        assert!(cfg.get("reveal.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn apply_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.apply("countdown.tick_interval_ms", "500").unwrap();
        cfg.apply("reveal.threshold", "0.3").unwrap();
        cfg.apply("api.base_url", "https://events.example/api").unwrap();
        assert_eq!(cfg.countdown.tick_interval_ms, 500);
        assert_eq!(cfg.reveal.threshold, 0.3);
        assert_eq!(cfg.api.base_url, "https://events.example/api");
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("reveal.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(cfg.apply("nope.deeper", "1"), Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn apply_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.apply("api.timeout_ms", "soon").is_err());
        assert_eq!(cfg.api.timeout_ms, 8000);
    }

    #[test]
    fn apply_rejects_invalid_reveal_options() {
        let mut cfg = Config::default();
        assert!(cfg.apply("reveal.threshold", "1.5").is_err());
        assert!(cfg.apply("reveal.root_margin", "10em").is_err());
        assert_eq!(cfg.reveal.threshold, DEFAULT_THRESHOLD);
        assert!(cfg.reveal_options().is_ok());
    }

    #[test]
    fn load_from_writes_defaults_then_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let first = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(first.api.timeout_ms, 8000);

        let mut changed = first.clone();
        changed.apply("api.timeout_ms", "2000").unwrap();
        changed.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.api.timeout_ms, 2000);
        assert_eq!(reloaded.api_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn load_from_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api\nbase_url = ").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::ParseFailed(_))));
    }

    #[test]
    fn load_from_or_default_falls_back_on_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\ntimeout_ms = \"soon\"\n").unwrap();

        let cfg = Config::load_from_or_default(&path);
        assert_eq!(cfg.api.timeout_ms, 8000);
        assert_eq!(cfg.reveal.threshold, DEFAULT_THRESHOLD);
        // The broken file is left for the user to fix.
        assert!(std::fs::read_to_string(&path).unwrap().contains("soon"));
    }

    #[test]
    fn apply_rejects_zero_durations() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("api.timeout_ms", "0"),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "api.timeout_ms"
        ));
        assert!(cfg.apply("countdown.tick_interval_ms", "0").is_err());
        assert_eq!(cfg.api.timeout_ms, 8000);
        assert!(cfg.apply("api.timeout_ms", "1").is_ok());
    }

    #[test]
    fn zero_timeout_from_file_is_clamped() {
        let cfg: Config = toml::from_str("[api]\ntimeout_ms = 0\n").unwrap();
        assert!(cfg.validate().is_err());
        assert_eq!(cfg.api_timeout(), Duration::from_millis(1));
    }
}
