//! Tests for TOML configuration loading
//!
//! Missing or malformed config files must never stop startup; they fall
//! back to compiled defaults.

use livecrew_common::config::{ConfigOverrides, ServiceConfig, TomlConfig, DEFAULT_PORT};
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_load_full_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
root_folder = "/srv/livecrew"
port = 5999
bind_address = "0.0.0.0"
log_level = "debug"
"#,
    )
    .unwrap();

    let config = TomlConfig::load(&path).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/livecrew")));
    assert_eq!(config.port, Some(5999));
    assert_eq!(config.bind_address.as_deref(), Some("0.0.0.0"));
    assert_eq!(config.log_level.as_deref(), Some("debug"));
}

#[test]
fn test_partial_toml_uses_defaults_for_rest() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "root_folder = \"/srv/livecrew\"\n").unwrap();

    let toml = TomlConfig::load(&path).unwrap();
    let config = ServiceConfig::resolve(ConfigOverrides::default(), toml);

    assert_eq!(config.root_folder, PathBuf::from("/srv/livecrew"));
    assert_eq!(config.port, DEFAULT_PORT);
}

#[test]
fn test_malformed_toml_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = \"not a number\"").unwrap();

    let err = TomlConfig::load(&path).unwrap_err();
    assert!(matches!(err, livecrew_common::Error::Config(_)));
}

#[test]
fn test_missing_toml_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = TomlConfig::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, livecrew_common::Error::Io(_)));
}
