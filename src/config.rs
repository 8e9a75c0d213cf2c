//! Client configuration with JSON persistence.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::vlm::DEFAULT_READ_CHUNK_SIZE;

pub const DEFAULT_HOSTNAME: &str = "localhost";
pub const DEFAULT_PORT: u16 = 4212;

const CONFIG_DIR: &str = "vlm-client";
const CONFIG_FILE: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("Failed to read config: {0}")]
  Io(#[from] std::io::Error),
  #[error("Invalid config JSON: {0}")]
  Json(#[from] serde_json::Error),
  #[error("Invalid config: {0}")]
  Invalid(String),
}

/// Where and how to reach the VLC telnet interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
  /// Host VLC listens on.
  #[serde(default = "default_host")]
  pub host: String,

  /// Telnet port (`--telnet-port`).
  #[serde(default = "default_port")]
  pub port: u16,

  /// Give up waiting for a prompt after this many milliseconds
  /// (None = wait forever).
  #[serde(default)]
  pub read_timeout_ms: Option<u64>,

  /// Bytes requested from the socket per read.
  #[serde(default = "default_read_chunk_size")]
  pub read_chunk_size: usize,
}

fn default_host() -> String {
  DEFAULT_HOSTNAME.to_string()
}

fn default_port() -> u16 {
  DEFAULT_PORT
}

fn default_read_chunk_size() -> usize {
  DEFAULT_READ_CHUNK_SIZE
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      host: default_host(),
      port: default_port(),
      read_timeout_ms: None,
      read_chunk_size: default_read_chunk_size(),
    }
  }
}

impl ClientConfig {
  pub fn new(host: impl Into<String>, port: u16) -> Self {
    Self {
      host: host.into(),
      port,
      ..Self::default()
    }
  }

  pub fn read_timeout(&self) -> Option<Duration> {
    self.read_timeout_ms.map(Duration::from_millis)
  }

  /// Validate configuration values.
  pub fn validate(&self) -> Result<(), String> {
    if self.host.trim().is_empty() {
      return Err("Host cannot be empty".to_string());
    }
    if self.port == 0 {
      return Err("Port must be between 1 and 65535".to_string());
    }
    if self.read_timeout_ms == Some(0) {
      return Err("Read timeout must be positive, leave it unset to wait forever".to_string());
    }
    if self.read_chunk_size == 0 {
      return Err("Read chunk size must be positive".to_string());
    }
    Ok(())
  }

  /// `<config dir>/vlm-client/config.json`, if the platform has a config dir.
  pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
  }

  /// Load and validate a JSON config file. Missing keys take their defaults.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: ClientConfig = serde_json::from_str(&content)?;
    config.validate().map_err(ConfigError::Invalid)?;
    log::debug!("Loaded config from {}", path.display());
    Ok(config)
  }

  /// Load the file at `default_path`, or defaults when there is none.
  pub fn load_or_default() -> Result<Self, ConfigError> {
    match Self::default_path() {
      Some(path) if path.exists() => Self::load(&path),
      _ => Ok(Self::default()),
    }
  }

  /// Write the config as pretty JSON, creating parent directories.
  pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(self)?)?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let config = ClientConfig::default();
    assert_eq!(config.host, "localhost");
    assert_eq!(config.port, 4212);
    assert_eq!(config.read_timeout(), None);
    assert_eq!(config.read_chunk_size, 1024);
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_partial_json_takes_defaults() {
    let config: ClientConfig = serde_json::from_str(r#"{"port": 4213, "readTimeoutMs": 2500}"#).unwrap();
    assert_eq!(config.host, "localhost");
    assert_eq!(config.port, 4213);
    assert_eq!(config.read_timeout(), Some(Duration::from_millis(2500)));
  }

  #[test]
  fn test_validate() {
    assert!(ClientConfig::new(" ", 4212).validate().is_err());
    assert!(ClientConfig::new("vlc.local", 0).validate().is_err());

    let mut config = ClientConfig::default();
    config.read_timeout_ms = Some(0);
    assert!(config.validate().is_err());

    let mut config = ClientConfig::default();
    config.read_chunk_size = 0;
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let mut config = ClientConfig::new("10.0.0.5", 4300);
    config.read_timeout_ms = Some(1000);
    config.save(&path).unwrap();

    assert_eq!(ClientConfig::load(&path).unwrap(), config);
  }

  #[test]
  fn test_load_rejects_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    std::fs::write(&path, r#"{"host": ""}"#).unwrap();
    assert!(matches!(ClientConfig::load(&path), Err(ConfigError::Invalid(_))));

    std::fs::write(&path, "not json").unwrap();
    assert!(matches!(ClientConfig::load(&path), Err(ConfigError::Json(_))));

    assert!(matches!(
      ClientConfig::load(&dir.path().join("missing.json")),
      Err(ConfigError::Io(_))
    ));
  }
}
