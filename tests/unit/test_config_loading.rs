//! Unit Tests for Configuration Loading
//!
//! Files on disk, partial documents falling back to defaults, and the
//! environment override.

use std::fs;
use std::time::Duration;

use horizons_expect::config::loader::CONFIG_ENV_VAR;
use horizons_expect::config::{LoadOptions, SessionConfig};
use horizons_expect::{Config, ConfigLoader, Error, ReferencePlane};
use tempfile::TempDir;

#[test]
fn test_defaults_match_service_expectations() {
    let config = Config::default();
    assert!(config.validate().is_ok());

    assert_eq!(config.session.banner_timeout(), Duration::from_secs(30));
    assert_eq!(config.session.data_start_timeout(), Duration::from_secs(60));
    assert_eq!(config.transport.command, "telnet");
    assert_eq!(config.transport.args, vec!["ssd.jpl.nasa.gov", "6775"]);
    assert_eq!(config.request.center, "Sun");
    assert_eq!(config.request.reference_plane, ReferencePlane::Ecliptic);
}

#[test]
fn test_partial_toml_keeps_other_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("horizons.toml");
    fs::write(
        &path,
        "[session]\nfield_timeout_ms = 2500\n\n[request]\ninterval = \"6h\"\n",
    )
    .unwrap();

    let config = ConfigLoader::load_from_path(&path).unwrap();
    assert_eq!(config.session.field_timeout(), Duration::from_millis(2500));
    assert_eq!(config.session.prompt_timeout_ms, SessionConfig::default().prompt_timeout_ms);
    assert_eq!(config.request.interval, "6h");
    assert_eq!(config.request.center, "Sun");
    assert_eq!(config.transport, Config::default().transport);
}

#[test]
fn test_json_reference_plane_uses_service_keyword() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("horizons.json");
    fs::write(
        &path,
        r#"{ "request": { "reference_plane": "frame", "center": "@399" } }"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_path(&path).unwrap();
    assert_eq!(config.request.reference_plane, ReferencePlane::Frame);

    let request = config.request.request_for("DES=C/2012 S1;");
    assert_eq!(request.center, "@399");
    assert_eq!(request.reference_plane.as_str(), "frame");
}

#[test]
fn test_unknown_reference_plane_is_parse_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("horizons.toml");
    fs::write(&path, "[request]\nreference_plane = \"galactic\"\n").unwrap();

    assert!(matches!(
        ConfigLoader::load_from_path(&path),
        Err(Error::ConfigParseFailed { .. })
    ));
}

#[test]
fn test_invalid_values_are_rejected() {
    let temp_dir = TempDir::new().unwrap();

    let path = temp_dir.path().join("narrow.toml");
    fs::write(&path, "[transport]\ncols = 40\n").unwrap();
    assert!(matches!(
        ConfigLoader::load_from_path(&path),
        Err(Error::ConfigValidationFailed { .. })
    ));

    let path = temp_dir.path().join("tiny.toml");
    fs::write(&path, "[session]\nmax_buffer_bytes = 16\n").unwrap();
    assert!(matches!(
        ConfigLoader::load_from_path(&path),
        Err(Error::ConfigValidationFailed { .. })
    ));
}

#[test]
fn test_missing_explicit_file_is_load_failure() {
    let temp_dir = TempDir::new().unwrap();
    let result = ConfigLoader::load_from_path(&temp_dir.path().join("absent.toml"));
    assert!(matches!(result, Err(Error::ConfigLoadFailed { .. })));
}

#[test]
fn test_search_path_without_file_gives_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let mut loader = ConfigLoader::new();
    loader.set_search_path(temp_dir.path().join("config"));

    let config = loader.load_with_options(LoadOptions::default()).unwrap();
    assert_eq!(config, Config::default());
    assert!(loader.current_path().is_none());
}

#[test]
fn test_environment_variable_overrides_search() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("env.toml");

    let mut config = Config::default();
    config.session = SessionConfig::uniform(750);
    ConfigLoader::save_to_path(&config, &path).unwrap();

    std::env::set_var(CONFIG_ENV_VAR, &path);
    let loaded = ConfigLoader::load();
    std::env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(loaded.unwrap().session.lookup_timeout(), Duration::from_millis(750));
}
