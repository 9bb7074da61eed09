//! Companion configuration
//!
//! Loaded from TOML; every field has a default so an empty file (or no
//! file at all) yields a working setup.

use crate::codec::MessageKeys;
use crate::error::{CompanionError, Result};
use crate::transport::nats::NatsTransportConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Environment variable overriding `settings_url`
pub const SETTINGS_URL_ENV: &str = "FORGETMENOT_SETTINGS_URL";

/// User-configurable settings for the companion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanionConfig {
    /// Page the user is sent to for editing the reminder
    #[serde(default = "default_settings_url")]
    pub settings_url: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dictionary keys for the device message fields
    #[serde(default)]
    pub keys: MessageKeys,

    /// NATS device link; absent when the host supplies its own transport
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nats: Option<NatsTransportConfig>,
}

fn default_settings_url() -> String {
    "http://szilardhuber.github.io/pebble-forgetmenot/".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            settings_url: default_settings_url(),
            log_level: default_log_level(),
            keys: MessageKeys::default(),
            nats: None,
        }
    }
}

impl CompanionConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file.
    /// Returns default config if the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            CompanionError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply overrides from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(SETTINGS_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.settings_url = url;
        }
        self
    }

    /// Parsed settings URL
    pub fn settings_url(&self) -> Result<Url> {
        Url::parse(&self.settings_url).map_err(|e| {
            CompanionError::Config(format!(
                "Invalid settings_url '{}': {}",
                self.settings_url, e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CompanionConfig::default();
        assert_eq!(
            config.settings_url().unwrap().as_str(),
            "http://szilardhuber.github.io/pebble-forgetmenot/"
        );
        assert_eq!(config.log_level, "info");
        assert_eq!(config.keys, MessageKeys { text: 0, time: 1 });
        assert!(config.nats.is_none());
    }

    #[test]
    fn test_config_deserialize() {
        let config = CompanionConfig::from_toml_str(
            r#"
            settings_url = "https://example.com/forgetmenot/config.html"
            log_level = "debug"

            [keys]
            time = 7

            [nats]
            device_id = "wrist"
            "#,
        )
        .unwrap();
        assert!(config.settings_url.ends_with("config.html"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.keys, MessageKeys { text: 0, time: 7 });
        assert_eq!(
            config.nats.unwrap().device_subject(),
            "forgetmenot.device.wrist"
        );
    }

    #[test]
    fn test_invalid_settings_url() {
        let config = CompanionConfig {
            settings_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.settings_url(), Err(CompanionError::Config(_))));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            CompanionConfig::from_toml_str("settings_url = "),
            Err(CompanionError::Config(_))
        ));
    }

    #[test]
    fn test_load_missing_file_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CompanionConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("companion.toml");
        std::fs::write(&path, "log_level = \"warn\"\n").unwrap();
        let config = CompanionConfig::load(&path).unwrap();
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_overrides() {
        let config = CompanionConfig::default().with_overrides(|key| {
            (key == SETTINGS_URL_ENV).then(|| "https://example.com/form".to_string())
        });
        assert_eq!(config.settings_url, "https://example.com/form");

        let config = CompanionConfig::default().with_overrides(|_| Some("  ".to_string()));
        assert_eq!(config.settings_url, default_settings_url());
    }
}
