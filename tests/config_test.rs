//! Integration tests for Settings loading with layered precedence.
//!
//! These tests pass explicit global paths inside temp directories, so the
//! user's real configuration never takes part.

use std::fs;

use tempfile::TempDir;

use famtree::application::ApplicationError;
use famtree::config::{local_config_path, Settings};
use famtree::domain::DivisionStrategy;

#[test]
fn given_local_config_when_load_then_overrides_defaults() {
    // Arrange
    let script_dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(script_dir.path()),
        "precision = 1\ndivision = \"maximum\"\n",
    )
    .unwrap();

    // Act
    let settings = Settings::load_layers(None, Some(script_dir.path())).expect("load settings");

    // Assert
    assert_eq!(settings.precision, 1);
    assert_eq!(settings.division, DivisionStrategy::Maximum);
}

#[test]
fn given_global_and_local_config_when_load_then_local_wins_per_field() {
    // Arrange: global sets both fields, local only precision
    let global_dir = TempDir::new().unwrap();
    let global_path = global_dir.path().join("famtree.toml");
    fs::write(&global_path, "precision = 6\ndivision = \"maximum\"\n").unwrap();

    let script_dir = TempDir::new().unwrap();
    fs::write(local_config_path(script_dir.path()), "precision = 2\n").unwrap();

    // Act
    let settings = Settings::load_layers(Some(&global_path), Some(script_dir.path()))
        .expect("load settings");

    // Assert
    assert_eq!(settings.precision, 2, "local precision should win");
    assert_eq!(
        settings.division,
        DivisionStrategy::Maximum,
        "global division should survive"
    );
}

#[test]
fn given_missing_files_when_load_then_uses_defaults() {
    let empty_dir = TempDir::new().unwrap();
    let absent_global = empty_dir.path().join("nope.toml");

    let settings =
        Settings::load_layers(Some(&absent_global), Some(empty_dir.path())).expect("load settings");

    assert_eq!(settings, Settings::default());
}

#[test]
fn given_malformed_local_config_when_load_then_fails_with_path() {
    let script_dir = TempDir::new().unwrap();
    let path = local_config_path(script_dir.path());
    fs::write(&path, "precision = \"three\"\n").unwrap();

    let err = Settings::load_layers(None, Some(script_dir.path())).unwrap_err();

    match err {
        ApplicationError::Config { message } => {
            assert!(message.contains(".famtree.toml"), "{}", message);
        }
        other => panic!("expected config error, got {:?}", other),
    }
}

#[test]
fn given_unknown_strategy_in_config_when_load_then_fails() {
    let script_dir = TempDir::new().unwrap();
    fs::write(local_config_path(script_dir.path()), "division = \"best\"\n").unwrap();

    let result = Settings::load_layers(None, Some(script_dir.path()));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_excessive_precision_in_config_when_load_then_fails_validation() {
    let script_dir = TempDir::new().unwrap();
    fs::write(local_config_path(script_dir.path()), "precision = 40\n").unwrap();

    let err = Settings::load_layers(None, Some(script_dir.path())).unwrap_err();

    assert!(err.to_string().contains("exceeds maximum"), "{}", err);
}

#[test]
fn given_template_written_as_local_config_when_load_then_yields_defaults() {
    let script_dir = TempDir::new().unwrap();
    fs::write(local_config_path(script_dir.path()), Settings::template()).unwrap();

    let settings = Settings::load_layers(None, Some(script_dir.path())).expect("load settings");

    assert_eq!(settings, Settings::default());
}
