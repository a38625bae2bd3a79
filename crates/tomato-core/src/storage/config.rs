//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Work and rest durations
//! - Session chaining (auto rest, auto resume)
//! - Ambient sound and full-screen behaviour
//! - Display refresh rate
//!
//! Configuration is stored at `~/.config/tomato/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::effects::AmbientSound;
use crate::error::ConfigError;
use crate::timer::SessionConfig;

/// Session settings, in the units users think in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u64,
    #[serde(default = "default_rest_minutes")]
    pub rest_minutes: u64,
    #[serde(default = "default_true")]
    pub auto_rest: bool,
    #[serde(default = "default_true")]
    pub auto_resume: bool,
    #[serde(default = "default_true")]
    pub play_ambient_on_start: bool,
    #[serde(default = "default_true")]
    pub full_screen_on_start: bool,
    #[serde(default)]
    pub ambient_sound: AmbientSound,
}

/// Display configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_frame_rate")]
    pub frame_rate_hz: u32,
    #[serde(default = "default_true")]
    pub show_ring: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/tomato/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub display: DisplayConfig,
}

// Default functions
fn default_work_minutes() -> u64 {
    25
}
fn default_rest_minutes() -> u64 {
    5
}
const MAX_FRAME_RATE_HZ: u32 = 240;

fn default_frame_rate() -> u32 {
    30
}
fn default_true() -> bool {
    true
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            work_minutes: default_work_minutes(),
            rest_minutes: default_rest_minutes(),
            auto_rest: true,
            auto_resume: true,
            play_ambient_on_start: true,
            full_screen_on_start: true,
            ambient_sound: AmbientSound::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            frame_rate_hz: default_frame_rate(),
            show_ring: true,
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
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    serde_json::Value::Number(_) => serde_json::Value::Number(
                        value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?
                            .into(),
                    ),
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// `config.toml` inside the data directory.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/tomato"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk, writing defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
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

    /// Persist to disk.
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

    /// Set a config value by dot-separated key, in memory only.
    ///
    /// The value is parsed according to the type already stored under
    /// `key`; the updated config must still deserialize (so an unknown
    /// ambient sound id is rejected).
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Reject display settings no renderer can honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_FRAME_RATE_HZ).contains(&self.display.frame_rate_hz) {
            return Err(ConfigError::InvalidValue {
                key: "display.frame_rate_hz".into(),
                message: format!("must be between 1 and {MAX_FRAME_RATE_HZ}"),
            });
        }
        Ok(())
    }

    /// Session parameters for the controller. Not validated; see
    /// [`SessionConfig::validate`].
    pub fn session_config(&self) -> SessionConfig {
        let s = &self.session;
        SessionConfig {
            auto_rest: s.auto_rest,
            auto_resume: s.auto_resume,
            play_ambient_on_start: s.play_ambient_on_start,
            full_screen_on_start: s.full_screen_on_start,
            ambient_sound: s.ambient_sound,
            ..SessionConfig::from_minutes(s.work_minutes, s.rest_minutes)
        }
    }

    /// Time between rendered frames.
    pub fn frame_interval(&self) -> Duration {
        let hz = self.display.frame_rate_hz.clamp(1, MAX_FRAME_RATE_HZ);
        Duration::from_secs_f64(1.0 / f64::from(hz))
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
        assert_eq!(parsed.session.work_minutes, 25);
        assert_eq!(parsed.session.ambient_sound, AmbientSound::Birds);
        assert_eq!(parsed.display.frame_rate_hz, 30);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[session]\nwork_minutes = 50\n").unwrap();
        assert_eq!(parsed.session.work_minutes, 50);
        assert_eq!(parsed.session.rest_minutes, 5);
        assert!(parsed.session.auto_rest);
        assert!(parsed.display.show_ring);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("session.auto_rest").as_deref(), Some("true"));
        assert_eq!(cfg.get("session.work_minutes").as_deref(), Some("25"));
        assert_eq!(cfg.get("session.ambient_sound").as_deref(), Some("birds"));
        assert!(cfg.get("session.missing_key").is_none());
    }

    #[test]
    fn set_updates_typed_values() {
        let mut cfg = Config::default();
        cfg.set("session.auto_resume", "false").unwrap();
        cfg.set("session.rest_minutes", "10").unwrap();
        cfg.set("session.ambient_sound", "rain").unwrap();
        assert!(!cfg.session.auto_resume);
        assert_eq!(cfg.session.rest_minutes, 10);
        assert_eq!(cfg.session.ambient_sound, AmbientSound::Rain);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("session.nonexistent_key", "value"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(cfg.set("", "value").is_err());
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.set("session.auto_rest", "not_a_bool").is_err());
        assert!(cfg.set("session.work_minutes", "-3").is_err());
        assert!(cfg.set("session.ambient_sound", "thunder").is_err());
        assert_eq!(cfg.session.ambient_sound, AmbientSound::Birds);
    }

    #[test]
    fn session_config_converts_minutes() {
        let cfg = Config::default();
        let session = cfg.session_config();
        assert_eq!(session.work_duration_secs, 1500);
        assert_eq!(session.rest_duration_secs, 300);
    }

    #[test]
    fn session_config_rejects_zero_minutes() {
        let mut cfg = Config::default();
        cfg.session.work_minutes = 0;
        assert!(cfg.session_config().validate().is_err());
    }

    #[test]
    fn frame_interval_from_rate() {
        let mut cfg = Config::default();
        cfg.display.frame_rate_hz = 4;
        assert_eq!(cfg.frame_interval(), Duration::from_millis(250));
        cfg.display.frame_rate_hz = 0;
        assert_eq!(cfg.frame_interval(), Duration::from_secs(1));
    }

    #[test]
    fn set_rejects_out_of_range_frame_rate() {
        let mut cfg = Config::default();
        let err = cfg.set("display.frame_rate_hz", "0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "display.frame_rate_hz"));
        assert!(cfg.set("display.frame_rate_hz", "1000").is_err());
        assert_eq!(cfg.display.frame_rate_hz, 30);

        cfg.set("display.frame_rate_hz", "60").unwrap();
        assert_eq!(cfg.display.frame_rate_hz, 60);
    }

    #[test]
    fn load_from_creates_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.session.work_minutes, 25);

        let mut cfg = cfg;
        cfg.set("session.work_minutes", "45").unwrap();
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().session.work_minutes, 45);
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "session = 3").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseFailed(_))
        ));
    }
}
