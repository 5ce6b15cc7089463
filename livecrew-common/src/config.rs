//! Configuration loading and root folder resolution
//!
//! Each setting is resolved in priority order:
//! 1. Command-line argument / environment variable (handled by clap in the binary)
//! 2. TOML config file
//! 3. OS-dependent compiled default

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default HTTP port for livecrew-api
pub const DEFAULT_PORT: u16 = 5780;

/// Default bind address (loopback only)
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";

/// Default log filter when neither RUST_LOG nor the TOML file sets one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "livecrew.db";

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}

/// Outcome of looking for the platform config file
///
/// Discovery runs before logging is set up, so the outcome is reported
/// separately via [`ConfigFile::report`].
#[derive(Debug)]
pub enum ConfigFile {
    Loaded { path: PathBuf, config: TomlConfig },
    Missing,
    Invalid { path: PathBuf, error: Error },
}

impl ConfigFile {
    /// Find and parse the platform config file
    pub fn discover() -> Self {
        match config_file_path() {
            Some(path) => match TomlConfig::load(&path) {
                Ok(config) => ConfigFile::Loaded { path, config },
                Err(error) => ConfigFile::Invalid { path, error },
            },
            None => ConfigFile::Missing,
        }
    }

    /// Parsed values, or defaults when the file is missing or invalid
    pub fn config(&self) -> TomlConfig {
        match self {
            ConfigFile::Loaded { config, .. } => config.clone(),
            _ => TomlConfig::default(),
        }
    }

    /// Log where configuration came from
    ///
    /// A missing or unreadable file is not fatal: warn and use defaults.
    pub fn report(&self) {
        match self {
            ConfigFile::Loaded { path, .. } => info!("Loaded config file: {}", path.display()),
            ConfigFile::Missing => info!("No config file found, using defaults"),
            ConfigFile::Invalid { path, error } => {
                warn!("Ignoring config file {}: {}", path.display(), error)
            }
        }
    }
}

/// Values given on the command line or through environment variables
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub root_folder: Option<PathBuf>,
    pub port: Option<u16>,
    pub bind_address: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub root_folder: PathBuf,
    pub port: u16,
    pub bind_address: String,
    pub log_level: String,
}

impl ServiceConfig {
    /// Merge overrides, TOML values and compiled defaults
    pub fn resolve(overrides: ConfigOverrides, toml: TomlConfig) -> Self {
        Self {
            root_folder: overrides
                .root_folder
                .or(toml.root_folder)
                .unwrap_or_else(default_root_folder),
            port: overrides.port.or(toml.port).unwrap_or(DEFAULT_PORT),
            bind_address: overrides
                .bind_address
                .or(toml.bind_address)
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            log_level: toml
                .log_level
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        }
    }

    /// Path of the SQLite database inside the root folder
    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    /// `host:port` string for the HTTP listener
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Get configuration file path for the platform
///
/// Per-user file first, then `/etc/livecrew/config.toml` on Linux.
fn config_file_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("livecrew").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/livecrew/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("livecrew"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\livecrew"))
    } else if cfg!(any(target_os = "linux", target_os = "macos")) {
        // ~/.local/share/livecrew, ~/Library/Application Support/livecrew
        dirs::data_local_dir()
            .map(|d| d.join("livecrew"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/livecrew"))
    } else {
        PathBuf::from("./livecrew_data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = ServiceConfig::resolve(ConfigOverrides::default(), TomlConfig::default());

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.log_level, "info");
        assert!(
            config.root_folder.ends_with("livecrew")
                || config.root_folder.ends_with("livecrew_data")
        );
    }

    #[test]
    fn test_overrides_beat_toml() {
        let toml = TomlConfig {
            root_folder: Some(PathBuf::from("/srv/toml")),
            port: Some(6000),
            bind_address: Some("0.0.0.0".to_string()),
            log_level: Some("debug".to_string()),
        };
        let overrides = ConfigOverrides {
            root_folder: Some(PathBuf::from("/srv/cli")),
            port: None,
            bind_address: None,
        };

        let config = ServiceConfig::resolve(overrides, toml);
        assert_eq!(config.root_folder, PathBuf::from("/srv/cli"));
        assert_eq!(config.port, 6000);
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.listen_address(), "0.0.0.0:6000");
    }

    #[test]
    fn test_database_path_inside_root() {
        let config = ServiceConfig::resolve(
            ConfigOverrides {
                root_folder: Some(PathBuf::from("/data/crew")),
                ..Default::default()
            },
            TomlConfig::default(),
        );
        assert_eq!(config.database_path(), PathBuf::from("/data/crew/livecrew.db"));
    }

    #[test]
    fn test_invalid_config_file_falls_back_to_defaults() {
        let file = ConfigFile::Invalid {
            path: PathBuf::from("/etc/livecrew/config.toml"),
            error: Error::Config("expected `=`".to_string()),
        };
        assert_eq!(file.config(), TomlConfig::default());
        assert_eq!(ConfigFile::Missing.config(), TomlConfig::default());
    }
}
