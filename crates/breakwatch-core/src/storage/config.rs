//! TOML-based user settings.
//!
//! Stores:
//! - Break trigger mode and per-mode tuning (keystroke threshold,
//!   break interval)
//! - Notification preferences
//! - Debug logging toggle
//!
//! Settings are stored at `~/.config/breakwatch/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::arbiter::{BreakArbiter, Mode};
use crate::error::{ConfigError, ValidationError};

/// Break trigger configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakConfig {
    #[serde(default = "default_mode")]
    pub mode: Mode,
    #[serde(default = "default_keystroke_threshold")]
    pub keystroke_threshold: u32,
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u32,
}

/// Notification configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Notification sound name (platform dependent). Unset is silent.
    #[serde(default = "default_sound")]
    pub sound: Option<String>,
}

/// User settings.
///
/// Serialized to/from TOML at `~/.config/breakwatch/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "break", default)]
    pub breaks: BreakConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub debug_logging: bool,
    /// Whether the one-time accessibility permission hint was shown.
    #[serde(default)]
    pub accessibility_prompt_shown: bool,
}

// Default functions
fn default_mode() -> Mode {
    Mode::Keystrokes
}
fn default_keystroke_threshold() -> u32 {
    3000
}
fn default_interval_minutes() -> u32 {
    15
}
fn default_true() -> bool {
    true
}
fn default_sound() -> Option<String> {
    Some("Funk".to_string())
}

impl Default for BreakConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            keystroke_threshold: default_keystroke_threshold(),
            interval_minutes: default_interval_minutes(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sound: default_sound(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            breaks: BreakConfig::default(),
            notifications: NotificationsConfig::default(),
            debug_logging: false,
            accessibility_prompt_shown: false,
        }
    }
}

impl Settings {
    /// Path of the settings file.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be prepared.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk. A missing file is replaced with defaults; a file
    /// that exists but cannot be parsed is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be parsed, or if the
    /// default settings cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path. Same semantics as [`Settings::load`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or defaults cannot
    /// be written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(_) => {
                let settings = Self::default();
                settings.save_to(path)?;
                Ok(settings)
            }
        }
    }

    /// Load from disk, returning defaults on any error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get a settings value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match json_get(&json, key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a settings value by dot-separated key and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be
    /// parsed, the resulting settings are invalid, or saving fails.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Apply a dot-path assignment without persisting.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be
    /// parsed, or the resulting settings fail validation.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        json_set(&mut json, key, value)?;
        let updated: Settings =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Boundary validation: thresholds and intervals must be positive.
    /// The arbiter itself never sees invalid values.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.breaks.keystroke_threshold == 0 {
            return Err(ValidationError::InvalidValue {
                field: "break.keystroke_threshold".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }
        if self.breaks.interval_minutes == 0 {
            return Err(ValidationError::InvalidValue {
                field: "break.interval_minutes".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }
        Ok(())
    }

    /// Build an arbiter from the persisted break configuration.
    pub fn arbiter(&self, now: chrono::DateTime<chrono::Utc>) -> BreakArbiter {
        BreakArbiter::new(
            self.breaks.mode,
            self.breaks.keystroke_threshold,
            self.breaks.interval_minutes,
            now,
        )
    }
}

fn json_get<'a>(root: &'a serde_json::Value, key: &str) -> Option<&'a serde_json::Value> {
    key.split('.').try_fold(root, |node, part| node.get(part))
}

fn json_set(root: &mut serde_json::Value, key: &str, value: &str) -> Result<(), ConfigError> {
    let (parent_path, leaf) = match key.rsplit_once('.') {
        Some((parent, leaf)) => (Some(parent), leaf),
        None => (None, key),
    };

    let parent = match parent_path {
        Some(path) => path
            .split('.')
            .try_fold(root, |node, part| node.get_mut(part))
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?,
        None => root,
    };

    let obj = parent
        .as_object_mut()
        .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
    let existing = obj
        .get(leaf)
        .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

    let parsed = coerce(existing, value).map_err(|message| ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    })?;
    obj.insert(leaf.to_string(), parsed);
    Ok(())
}

/// Parse `raw` into the JSON type the key currently holds, so a bool
/// stays a bool and a number stays a number.
fn coerce(existing: &serde_json::Value, raw: &str) -> Result<serde_json::Value, String> {
    match existing {
        serde_json::Value::Bool(_) => raw
            .parse::<bool>()
            .map(serde_json::Value::Bool)
            .map_err(|_| format!("cannot parse '{raw}' as bool")),
        serde_json::Value::Number(_) => {
            if let Ok(n) = raw.parse::<u64>() {
                Ok(serde_json::Value::Number(n.into()))
            } else if let Ok(n) = raw.parse::<f64>() {
                serde_json::Number::from_f64(n)
                    .map(serde_json::Value::Number)
                    .ok_or_else(|| format!("cannot parse '{raw}' as number"))
            } else {
                Err(format!("cannot parse '{raw}' as number"))
            }
        }
        _ => Ok(serde_json::Value::String(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_roundtrip() {
        let settings = Settings::default();
        let toml_str = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, settings);
        assert_eq!(parsed.breaks.mode, Mode::Keystrokes);
        assert_eq!(parsed.breaks.keystroke_threshold, 3000);
        assert_eq!(parsed.breaks.interval_minutes, 15);
    }

    #[test]
    fn empty_file_yields_defaults() {
        let parsed: Settings = toml::from_str("").unwrap();
        assert_eq!(parsed, Settings::default());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let settings = Settings::default();
        assert_eq!(settings.get("break.mode").as_deref(), Some("keystrokes"));
        assert_eq!(
            settings.get("break.keystroke_threshold").as_deref(),
            Some("3000")
        );
        assert_eq!(settings.get("notifications.enabled").as_deref(), Some("true"));
        assert!(settings.get("break.missing_key").is_none());
        assert!(settings.get("").is_none());
    }

    #[test]
    fn apply_updates_nested_number() {
        let mut settings = Settings::default();
        settings.apply("break.interval_minutes", "25").unwrap();
        assert_eq!(settings.breaks.interval_minutes, 25);
    }

    #[test]
    fn apply_updates_mode_from_string() {
        let mut settings = Settings::default();
        settings.apply("break.mode", "time").unwrap();
        assert_eq!(settings.breaks.mode, Mode::Time);
    }

    #[test]
    fn apply_updates_nested_bool() {
        let mut settings = Settings::default();
        settings.apply("notifications.enabled", "false").unwrap();
        assert!(!settings.notifications.enabled);
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut settings = Settings::default();
        let result = settings.apply("break.nonexistent", "1");
        assert!(matches!(result, Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn apply_rejects_invalid_mode() {
        let mut settings = Settings::default();
        assert!(settings.apply("break.mode", "sideways").is_err());
        assert_eq!(settings.breaks.mode, Mode::Keystrokes);
    }

    #[test]
    fn apply_rejects_non_numeric_threshold() {
        let mut settings = Settings::default();
        assert!(settings.apply("break.keystroke_threshold", "lots").is_err());
    }

    #[test]
    fn zero_threshold_fails_validation() {
        let mut settings = Settings::default();
        let result = settings.apply("break.keystroke_threshold", "0");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
        assert_eq!(settings.breaks.keystroke_threshold, 3000);
    }

    #[test]
    fn zero_interval_fails_validation() {
        let mut settings = Settings::default();
        assert!(settings.apply("break.interval_minutes", "0").is_err());
    }

    #[test]
    fn save_and_load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.breaks.mode = Mode::Time;
        settings.breaks.interval_minutes = 45;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn load_from_missing_path_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded, Settings::default());
        assert!(path.exists());
    }

    #[test]
    fn load_from_garbage_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [valid").unwrap();

        assert!(matches!(
            Settings::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }

    #[test]
    fn arbiter_inherits_break_config() {
        let mut settings = Settings::default();
        settings.breaks.mode = Mode::Time;
        settings.breaks.interval_minutes = 10;

        let now = chrono::Utc::now();
        let arbiter = settings.arbiter(now);
        assert_eq!(arbiter.mode(), Mode::Time);
        assert_eq!(arbiter.interval_minutes(), 10);
        assert_eq!(arbiter.next_break_at(), Some(now + chrono::Duration::minutes(10)));
    }
}
