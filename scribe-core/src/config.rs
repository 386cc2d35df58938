//! Configuration management for the Scribe system

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, ScribeError};
use crate::status::StatusStyles;

/// Prefix for environment variables that override configuration values
pub const ENV_PREFIX: &str = "SCRIBE_";

/// Main system configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub client: ClientConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Location of the per-user configuration file, if the platform has one
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("scribe").join("config.json"))
    }

    /// Load from `path`, or from the default location when it exists, or fall back to defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(default) if default.exists() => {
                    tracing::debug!("Loading configuration from {}", default.display());
                    Self::from_file(&default)
                }
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ScribeError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| ScribeError::Config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ScribeError::Config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)
            .map_err(|e| ScribeError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Collect `SCRIBE_*` variables from the process environment
    pub fn environment_overrides() -> HashMap<String, String> {
        std::env::vars()
            .filter(|(key, _)| key.starts_with(ENV_PREFIX))
            .collect()
    }

    /// Apply environment variable overrides
    pub fn apply_environment_overrides(
        &mut self,
        env_overrides: &HashMap<String, String>,
    ) -> Result<()> {
        for (key, value) in env_overrides {
            match key.as_str() {
                "SCRIBE_SAVE_TIMEOUT_MS" => {
                    self.client.save_timeout_ms = parse_env(key, value)?;
                }
                "SCRIBE_KEEPALIVE_TIMEOUT_MS" => {
                    self.client.keepalive_timeout_ms = parse_env(key, value)?;
                }
                "SCRIBE_SERVER_HOSTNAME" => self.server.hostname = value.clone(),
                "SCRIBE_SERVER_PORT" => self.server.port = parse_env(key, value)?,
                "SCRIBE_SERVER_ROOT" => self.server.root = PathBuf::from(value),
                "SCRIBE_SERVER_CORS_ENABLED" => {
                    self.server.cors_enabled = parse_env(key, value)?;
                }
                _ => {
                    tracing::debug!("Ignoring unknown environment override {}", key);
                }
            }
        }
        Ok(())
    }

    /// Validate the configuration, reporting every problem at once
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.client.save_timeout_ms == 0 {
            errors.push("client.save_timeout_ms must be greater than zero");
        }
        if self.client.keepalive_timeout_ms == 0 {
            errors.push("client.keepalive_timeout_ms must be greater than zero");
        }
        if self.client.file_hash_input.trim().is_empty() {
            errors.push("client.file_hash_input must not be empty");
        }
        if self.client.saved_on_input.trim().is_empty() {
            errors.push("client.saved_on_input must not be empty");
        }
        if self.client.exposed_element.trim().is_empty() {
            errors.push("client.exposed_element must not be empty");
        }
        if self.server.port == 0 {
            errors.push("server.port must not be zero");
        }
        if self.server.hostname.trim().is_empty() {
            errors.push("server.hostname must not be empty");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ScribeError::Config(errors.join("; ")))
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        ScribeError::Config(format!(
            "Invalid value in environment variable {}: {}",
            key, value
        ))
    })
}

/// Settings for the in-page save controller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// How long a save may wait for its response
    pub save_timeout_ms: u64,
    /// How long a keepalive ping may wait for its response
    pub keepalive_timeout_ms: u64,
    /// Hidden input carrying the hash of the last saved content
    pub file_hash_input: String,
    /// Input carrying the last save time; doubles as the status field
    pub saved_on_input: String,
    /// Element that lists the exposed controller functions
    pub exposed_element: String,
    pub styles: StatusStyles,
    pub saving_label: String,
    pub error_label: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            save_timeout_ms: 5000,
            keepalive_timeout_ms: 1000,
            file_hash_input: "file_hash".to_string(),
            saved_on_input: "saved_on".to_string(),
            exposed_element: "exposed".to_string(),
            styles: StatusStyles::default(),
            saving_label: "saving now...".to_string(),
            error_label: "communication error".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn save_timeout(&self) -> Duration {
        Duration::from_millis(self.save_timeout_ms)
    }

    pub fn keepalive_timeout(&self) -> Duration {
        Duration::from_millis(self.keepalive_timeout_ms)
    }
}

/// Reference save endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub hostname: String,
    pub port: u16,
    /// Directory holding one sub-directory per application
    pub root: PathBuf,
    pub cors_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            hostname: "127.0.0.1".to_string(),
            port: 8000,
            root: PathBuf::from("applications"),
            cors_enabled: true,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.hostname, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.client.save_timeout(), Duration::from_millis(5000));
        assert_eq!(config.client.keepalive_timeout(), Duration::from_millis(1000));
        assert_eq!(config.client.saving_label, "saving now...");
        assert_eq!(config.client.error_label, "communication error");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_round_trip_with_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::new();
        config.server.port = 9100;
        config.save_to_file(&path).unwrap();
        assert_eq!(Config::load(Some(&path)).unwrap().server.port, 9100);

        std::fs::write(&path, r#"{"client": {"save_timeout_ms": 250}}"#).unwrap();
        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.client.save_timeout_ms, 250);
        assert_eq!(loaded.client.file_hash_input, "file_hash");
        assert_eq!(loaded.server.port, 8000);
    }

    #[test]
    fn test_environment_overrides() {
        let mut config = Config::new();
        let overrides = HashMap::from([
            ("SCRIBE_SAVE_TIMEOUT_MS".to_string(), "750".to_string()),
            ("SCRIBE_SERVER_PORT".to_string(), "9000".to_string()),
            ("SCRIBE_UNRELATED".to_string(), "x".to_string()),
        ]);
        config.apply_environment_overrides(&overrides).unwrap();
        assert_eq!(config.client.save_timeout_ms, 750);
        assert_eq!(config.server.port, 9000);

        let bad = HashMap::from([("SCRIBE_SERVER_PORT".to_string(), "nope".to_string())]);
        assert!(matches!(
            config.apply_environment_overrides(&bad),
            Err(ScribeError::Config(_))
        ));
    }

    #[test]
    fn test_validation_collects_errors() {
        let mut config = Config::new();
        config.client.save_timeout_ms = 0;
        config.server.port = 0;
        let message = config.validate().unwrap_err().to_string();
        assert!(message.contains("save_timeout_ms"));
        assert!(message.contains("server.port"));
    }
}
