//! Unit tests for bootstrap configuration
//!
//! Covers:
//! - Built-in defaults when no file is present
//! - Partial TOML files falling back to defaults per field
//! - Override precedence (CLI/env over TOML)
//! - Malformed or missing explicit config files
//!
//! Tests that change the working directory are marked #[serial] so they do
//! not race each other.

use serial_test::serial;
use songhive_common::config::{
    ConfigOverrides, StoreBackend, TomlConfig, DEFAULT_CONFIG_FILE,
};
use songhive_common::credentials::PasswordMode;
use std::path::PathBuf;

#[test]
fn test_defaults() {
    let config = TomlConfig::default();

    assert_eq!(config.server.bind, "127.0.0.1:5000");
    assert_eq!(config.store.backend, StoreBackend::Mongodb);
    assert_eq!(config.store.mongodb_uri, "mongodb://localhost:27017");
    assert_eq!(config.store.database, "SongHive");
    assert!(config.seed.enabled);
    assert_eq!(config.seed.file, PathBuf::from("db.json"));
    assert_eq!(config.auth.password_mode, PasswordMode::Hashed);
    assert_eq!(config.logging.level, "info");
    assert!(config.cors.allowed_origins.is_empty());
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let config = TomlConfig::from_toml_str(
        r#"
        [store]
        database = "SongHiveTest"

        [auth]
        password_mode = "plaintext"
        "#,
    )
    .unwrap();

    assert_eq!(config.store.database, "SongHiveTest");
    assert_eq!(config.store.mongodb_uri, "mongodb://localhost:27017");
    assert_eq!(config.auth.password_mode, PasswordMode::Plaintext);
    assert_eq!(config.server.bind, "127.0.0.1:5000");
}

#[test]
fn test_full_toml() {
    let config = TomlConfig::from_toml_str(
        r#"
        [server]
        bind = "0.0.0.0:8080"

        [store]
        backend = "memory"

        [seed]
        enabled = false
        file = "/srv/songhive/db.json"

        [logging]
        level = "debug"

        [cors]
        allowed_origins = ["http://localhost:5173"]
        "#,
    )
    .unwrap();

    assert_eq!(config.server.bind, "0.0.0.0:8080");
    assert_eq!(config.store.backend, StoreBackend::Memory);
    assert!(!config.seed.enabled);
    assert_eq!(config.seed.file, PathBuf::from("/srv/songhive/db.json"));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.cors.allowed_origins, vec!["http://localhost:5173"]);
}

#[test]
fn test_malformed_toml_is_rejected() {
    let result = TomlConfig::from_toml_str("[server\nbind = ");
    assert!(result.is_err());

    let result = TomlConfig::from_toml_str("[store]\nbackend = \"postgres\"");
    assert!(result.is_err());
}

#[test]
fn test_overrides_take_precedence() {
    let mut config = TomlConfig::from_toml_str(
        r#"
        [server]
        bind = "0.0.0.0:8080"

        [store]
        database = "FromFile"
        "#,
    )
    .unwrap();

    config.apply_overrides(ConfigOverrides {
        bind: Some("127.0.0.1:9000".to_string()),
        store: Some(StoreBackend::Memory),
        password_mode: Some(PasswordMode::Plaintext),
        no_seed: true,
        ..Default::default()
    });

    assert_eq!(config.server.bind, "127.0.0.1:9000");
    assert_eq!(config.store.backend, StoreBackend::Memory);
    assert_eq!(config.auth.password_mode, PasswordMode::Plaintext);
    assert!(!config.seed.enabled);
    // Not overridden: file value survives
    assert_eq!(config.store.database, "FromFile");
}

#[test]
fn test_store_backend_parsing() {
    assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
    assert_eq!("MongoDB".parse::<StoreBackend>().unwrap(), StoreBackend::Mongodb);
    assert_eq!("mongo".parse::<StoreBackend>().unwrap(), StoreBackend::Mongodb);
    assert!("sqlite".parse::<StoreBackend>().is_err());
}

#[test]
fn test_explicit_missing_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    assert!(TomlConfig::load(Some(&missing)).is_err());
}

#[test]
fn test_explicit_file_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "[server]\nbind = \"127.0.0.1:7000\"\n").unwrap();

    let config = TomlConfig::load(Some(&path)).unwrap();
    assert_eq!(config.server.bind, "127.0.0.1:7000");
}

#[test]
#[serial]
fn test_missing_default_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let original = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();

    let result = TomlConfig::load(None);

    std::env::set_current_dir(original).unwrap();
    assert_eq!(result.unwrap(), TomlConfig::default());
}

#[test]
#[serial]
fn test_default_file_in_working_directory_is_used() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(DEFAULT_CONFIG_FILE),
        "[store]\ndatabase = \"FromCwd\"\n",
    )
    .unwrap();
    let original = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();

    let result = TomlConfig::load(None);

    std::env::set_current_dir(original).unwrap();
    assert_eq!(result.unwrap().store.database, "FromCwd");
}
