//! Configuration file management.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use bscan_core::{ConnectionConfig, DEFAULT_MAX_RETRIES, DEFAULT_SCAN_DURATION, SendOptions};

use crate::cli::{ScanArgs, SendArgs};

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Scan duration in seconds
    #[serde(default)]
    pub scan_timeout: Option<u64>,

    /// Connection timeout per attempt in seconds
    #[serde(default)]
    pub connect_timeout: Option<u64>,

    /// Maximum number of connection attempts
    #[serde(default)]
    pub max_retries: Option<u32>,

    /// Disable colored output
    #[serde(default)]
    pub no_color: bool,

    /// Print the banner before scanning
    #[serde(default = "default_true")]
    pub banner: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan_timeout: None,
            connect_timeout: None,
            max_retries: None,
            no_color: false,
            banner: true,
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bscan")
            .join("config.toml")
    }

    /// Load config from the default path, or return default if not found
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    /// Load config from `path`, or return default if missing or invalid
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config: {}", e);
                    }
                },
                Err(e) => {
                    eprintln!("Warning: Failed to read config: {}", e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    /// Save config to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

/// Resolve the scan duration: flag, then config, then the built-in default.
pub fn resolve_scan_duration(args: &ScanArgs, config: &Config) -> Duration {
    args.scan_timeout
        .or(config.scan_timeout)
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_SCAN_DURATION)
}

/// Resolve connect-and-write options: flags, then config, then defaults.
///
/// A zero retry count or timeout in the config file falls back to the default.
pub fn resolve_send_options(args: &SendArgs, config: &Config) -> SendOptions {
    let max_retries = args
        .retries
        .or(config.max_retries)
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_MAX_RETRIES);

    let mut connection = ConnectionConfig::default();
    if let Some(secs) = args
        .connect_timeout
        .or(config.connect_timeout)
        .filter(|secs| *secs > 0)
    {
        connection = connection.connection_timeout(Duration::from_secs(secs));
    }

    SendOptions::new()
        .max_retries(max_retries)
        .connection(connection)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert!(config.banner);
        assert!(!config.no_color);
        assert_eq!(config.max_retries, None);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file() {
        let config: Config = toml::from_str("max_retries = 5\nbanner = false\n").unwrap();
        assert_eq!(config.max_retries, Some(5));
        assert!(!config.banner);
        assert_eq!(config.scan_timeout, None);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            scan_timeout: Some(8),
            connect_timeout: Some(15),
            max_retries: Some(2),
            no_color: true,
            banner: false,
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_invalid_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "max_retries = \"lots\"").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn test_resolve_scan_duration_prefers_flag() {
        let config = Config {
            scan_timeout: Some(9),
            ..Default::default()
        };
        let args = ScanArgs {
            scan_timeout: Some(3),
        };
        assert_eq!(resolve_scan_duration(&args, &config), Duration::from_secs(3));
        assert_eq!(
            resolve_scan_duration(&ScanArgs::default(), &config),
            Duration::from_secs(9)
        );
        assert_eq!(
            resolve_scan_duration(&ScanArgs::default(), &Config::default()),
            DEFAULT_SCAN_DURATION
        );
    }

    #[test]
    fn test_resolve_send_options_layers() {
        let config = Config {
            connect_timeout: Some(20),
            max_retries: Some(5),
            ..Default::default()
        };
        let args = SendArgs {
            retries: Some(1),
            ..Default::default()
        };

        let options = resolve_send_options(&args, &config);
        assert_eq!(options.max_retries, 1);
        assert_eq!(
            options.connection.connection_timeout,
            Duration::from_secs(20)
        );

        let options = resolve_send_options(&SendArgs::default(), &Config::default());
        assert_eq!(options, SendOptions::default());
    }

    #[test]
    fn test_resolve_send_options_ignores_zero_in_config() {
        let config = Config {
            connect_timeout: Some(0),
            max_retries: Some(0),
            ..Default::default()
        };
        let options = resolve_send_options(&SendArgs::default(), &config);
        assert_eq!(options, SendOptions::default());
    }
}
