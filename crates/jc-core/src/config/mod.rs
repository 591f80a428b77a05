//! Configuration management for jcli-admin

mod console;
mod customer;
pub mod serde_utils;

pub use console::{BackoffConfig, ConsoleConfig};
pub use customer::{CustomerConfig, WorkerConfig};

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete configuration file, one table per concern
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// `[console]` connection and login settings
    pub console: ConsoleConfig,
    /// `[customer]` provisioning conventions
    pub customer: CustomerConfig,
    /// `[worker]` command queue settings
    pub worker: WorkerConfig,
}

/// Get the default configuration directory
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("jcli-admin")
}

/// Get the default configuration file path
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Load configuration from a file
pub fn load_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read config: {}", e)))?;

    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Load the configuration file, falling back to defaults when it does not exist
pub fn load_or_default(path: Option<&Path>) -> Result<ConfigFile, ConfigError> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);

    match load_config(&path) {
        Ok(config) => Ok(config),
        Err(ConfigError::NotFound(_)) => {
            tracing::debug!("No config at {:?}, using defaults", path);
            Ok(ConfigFile::default())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_written_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = ConfigFile::default();
        config.console.host = "jasmin.internal".to_string();
        config.customer.settle_delay = Duration::from_millis(250);
        std::fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let loaded: ConfigFile = load_config(&path).unwrap();
        assert_eq!(loaded.console.host, "jasmin.internal");
        assert_eq!(loaded.customer.settle_delay, Duration::from_millis(250));
        assert_eq!(loaded.worker.queue_capacity, 32);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_or_default(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.console.port, 8990);
        assert_eq!(config.customer.group_suffix, "_group");
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[console\nport = ").unwrap();

        assert!(matches!(
            load_or_default(Some(&path)),
            Err(ConfigError::Parse(_))
        ));
    }
}
