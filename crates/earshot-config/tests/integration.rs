//! Integration tests for session files on disk.

use earshot_config::{ConfigError, SessionConfig};
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn save_and_load_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.toml");

    let session = SessionConfig {
        profile: "the-bluetooth-speaker".to_string(),
        noise_amount: 0.25,
        windows_down: true,
        mix: 0.8,
        block_size: 1024,
        bit_depth: 32,
        impulse_dir: Some(PathBuf::from("irs")),
    };
    session.save(&path).unwrap();

    let loaded = SessionConfig::load(&path).unwrap();
    assert_eq!(loaded, session);
    assert_eq!(loaded.resolve_profile().unwrap(), 4);
}

#[test]
fn save_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("deeper").join("session.toml");

    SessionConfig::default().save(&path).unwrap();
    assert!(path.exists());
}

#[test]
fn saved_file_is_readable_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.toml");
    SessionConfig {
        profile: "the-phone".to_string(),
        ..Default::default()
    }
    .save(&path)
    .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("profile = \"the-phone\""), "got:\n{text}");
    assert!(!text.contains("impulse_dir"), "absent dir should be omitted:\n{text}");
}

#[test]
fn missing_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let err = SessionConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn invalid_file_is_rejected_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "block_size = 0\nbit_depth = 12\n").unwrap();

    let err = SessionConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)), "got {err}");
}
