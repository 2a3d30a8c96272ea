//! Environment overrides for Settings.
//!
//! Kept in its own test binary as a single test: the variables are
//! process-wide.

use std::env;
use std::fs;

use tempfile::TempDir;

use famtree::application::ApplicationError;
use famtree::config::{local_config_path, Settings};
use famtree::domain::DivisionStrategy;

fn config_message(result: Result<Settings, ApplicationError>) -> String {
    match result {
        Err(ApplicationError::Config { message }) => message,
        other => panic!("expected config error, got {:?}", other),
    }
}

#[test]
fn given_env_overrides_when_load_then_env_beats_config_files() {
    // Arrange
    let script_dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(script_dir.path()),
        "precision = 1\ndivision = \"greedy\"\n",
    )
    .unwrap();

    // Act
    env::set_var("FAMTREE_PRECISION", "4");
    env::set_var("FAMTREE_DIVISION", "maximum");
    let settings = Settings::load_layers(None, Some(script_dir.path()));

    env::set_var("FAMTREE_DIVISION", "best");
    let bad_division = Settings::load_layers(None, Some(script_dir.path()));

    env::set_var("FAMTREE_DIVISION", "maximum");
    env::set_var("FAMTREE_PRECISION", "abc");
    let bad_precision = Settings::load_layers(None, Some(script_dir.path()));

    env::set_var("FAMTREE_PRECISION", "-2");
    let negative_precision = Settings::load_layers(None, Some(script_dir.path()));

    env::remove_var("FAMTREE_PRECISION");
    env::remove_var("FAMTREE_DIVISION");
    let unset = Settings::load_layers(None, Some(script_dir.path()));

    // Assert
    let settings = settings.expect("load settings");
    assert_eq!(settings.precision, 4);
    assert_eq!(settings.division, DivisionStrategy::Maximum);

    let message = config_message(bad_division);
    assert!(message.starts_with("FAMTREE_DIVISION"), "{}", message);

    let message = config_message(bad_precision);
    assert!(message.starts_with("FAMTREE_PRECISION"), "{}", message);
    assert!(message.contains("'abc'"), "{}", message);

    let message = config_message(negative_precision);
    assert!(message.starts_with("FAMTREE_PRECISION"), "{}", message);

    let unset = unset.expect("load settings");
    assert_eq!(unset.precision, 1, "local config applies once env is gone");
    assert_eq!(unset.division, DivisionStrategy::Greedy);
}
