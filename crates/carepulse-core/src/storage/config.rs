//! TOML-based application configuration.
//!
//! Stores:
//! - Scheduler cadence and timing knobs (snooze delay, missed grace)
//! - Notification preferences and quiet hours
//! - Accessibility settings read by the presentation surface
//! - The patient id stamped onto caregiver alerts
//!
//! Configuration is stored at `~/.config/carepulse/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use crate::engine::EngineConfig;
use crate::notify::QuietHoursPolicy;

use super::data_dir;

/// Scheduler-specific configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between scheduler evaluations.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
    /// Seconds between missed-reminder sweeps.
    #[serde(default = "default_sweep_secs")]
    pub sweep_secs: u64,
    /// Minutes a snoozed reminder waits before re-presentation.
    #[serde(default = "default_snooze_minutes")]
    pub snooze_minutes: i64,
    /// Minutes past the scheduled time before a reminder counts as missed.
    #[serde(default = "default_grace_minutes")]
    pub missed_grace_minutes: i64,
}

/// Notification configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 0.0 .. 1.0
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default)]
    pub quiet_hours: QuietHoursPolicy,
}

/// Accessibility settings the presentation surface reads when rendering
/// the reminder modal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessibilitySettings {
    #[serde(default = "default_font_size")]
    pub font_size: String, // small | medium | large | extra-large
    #[serde(default)]
    pub high_contrast: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/carepulse/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_patient_id")]
    pub patient_id: String,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub accessibility: AccessibilitySettings,
}

// Default functions
fn default_tick_secs() -> u64 {
    crate::engine::TICK_INTERVAL_SECS
}
fn default_sweep_secs() -> u64 {
    crate::engine::SWEEP_INTERVAL_SECS
}
fn default_snooze_minutes() -> i64 {
    10
}
fn default_grace_minutes() -> i64 {
    30
}
fn default_true() -> bool {
    true
}
fn default_volume() -> f32 {
    0.8
}
fn default_font_size() -> String {
    "large".into()
}
fn default_patient_id() -> String {
    "local-patient".into()
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_secs: default_tick_secs(),
            sweep_secs: default_sweep_secs(),
            snooze_minutes: default_snooze_minutes(),
            missed_grace_minutes: default_grace_minutes(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: default_volume(),
            quiet_hours: QuietHoursPolicy::default(),
        }
    }
}

impl Default for AccessibilitySettings {
    fn default() -> Self {
        Self {
            font_size: default_font_size(),
            high_contrast: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            patient_id: default_patient_id(),
            scheduler: SchedulerConfig::default(),
            notifications: NotificationsConfig::default(),
            accessibility: AccessibilitySettings::default(),
        }
    }
}

impl Config {
    fn path() -> std::io::Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the default on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(Self::path()?, content)?;
        Ok(())
    }

    /// Load from disk, returning default on error. Never fails.
    pub fn load_or_default() -> Self {
        match Self::path().map(std::fs::read_to_string) {
            Ok(Ok(content)) => Self::parse_or_default(&content),
            _ => Self::load().unwrap_or_default(),
        }
    }

    /// Parse config TOML, logging and discarding a corrupt document.
    fn parse_or_default(content: &str) -> Self {
        match toml::from_str(content) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("discarding unparseable config, using defaults: {e}");
                Self::default()
            }
        }
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let mut current = &json;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        match current {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed
    /// into the field's existing type, or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
        let mut json = serde_json::to_value(&*self)?;
        set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json)?;
        self.save()?;
        Ok(())
    }

    /// The engine tuning derived from this config.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            patient_id: self.patient_id.clone(),
            snooze_minutes: self.scheduler.snooze_minutes,
            missed_grace_minutes: self.scheduler.missed_grace_minutes,
        }
    }
}

fn set_json_value_by_path(
    root: &mut serde_json::Value,
    key: &str,
    value: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut parts = key.split('.').peekable();
    if parts.peek().is_none() {
        return Err("config key is empty".into());
    }

    let mut current = root;
    while let Some(part) = parts.next() {
        let is_leaf = parts.peek().is_none();
        if is_leaf {
            let obj = current
                .as_object_mut()
                .ok_or_else(|| format!("unknown config key: {key}"))?;
            let existing = obj
                .get(part)
                .ok_or_else(|| format!("unknown config key: {key}"))?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(value.parse::<bool>()?),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<i64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<f64>() {
                        serde_json::Number::from_f64(n)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| format!("cannot parse '{value}' as number"))?
                    } else {
                        return Err(format!("cannot parse '{value}' as number").into());
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value)?
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        current = current
            .get_mut(part)
            .ok_or_else(|| format!("unknown config key: {key}"))?;
    }

    Err(format!("unknown config key: {key}").into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.scheduler.tick_secs, 60);
        assert_eq!(parsed.scheduler.sweep_secs, 300);
        assert_eq!(parsed.scheduler.snooze_minutes, 10);
        assert_eq!(parsed.scheduler.missed_grace_minutes, 30);
        assert!(parsed.notifications.enabled);
        assert_eq!(parsed.accessibility.font_size, "large");
    }

    #[test]
    fn empty_toml_fills_defaults() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn corrupt_toml_falls_back_to_defaults() {
        let cfg = Config::parse_or_default("scheduler = \"not a table\"");
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn valid_toml_survives_parse_or_default() {
        let mut cfg = Config::default();
        cfg.scheduler.snooze_minutes = 15;
        let parsed = Config::parse_or_default(&toml::to_string_pretty(&cfg).unwrap());
        assert_eq!(parsed.scheduler.snooze_minutes, 15);
    }

    #[test]
    fn get_by_dotted_key() {
        let cfg = Config::default();
        assert_eq!(cfg.get("scheduler.snooze_minutes").unwrap(), "10");
        assert_eq!(cfg.get("notifications.enabled").unwrap(), "true");
        assert!(cfg.get("no.such.key").is_none());
    }

    #[test]
    fn set_updates_nested_value() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        set_json_value_by_path(&mut json, "scheduler.snooze_minutes", "15").unwrap();
        let cfg: Config = serde_json::from_value(json).unwrap();
        assert_eq!(cfg.scheduler.snooze_minutes, 15);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        assert!(set_json_value_by_path(&mut json, "scheduler.bogus", "1").is_err());
    }

    #[test]
    fn engine_config_mirrors_scheduler_knobs() {
        let mut cfg = Config::default();
        cfg.scheduler.snooze_minutes = 5;
        cfg.patient_id = "p42".into();
        let ec = cfg.engine_config();
        assert_eq!(ec.snooze_minutes, 5);
        assert_eq!(ec.patient_id, "p42");
        assert_eq!(ec.missed_grace_minutes, 30);
    }
}
