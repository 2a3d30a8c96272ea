//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/famtree/famtree.toml`
//! 3. Local config: `<script_dir>/.famtree.toml` (next to the input script)
//! 4. Environment variables: `FAMTREE_*` prefix
//!
//! Command line flags are applied on top by the CLI layer.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{DivisionStrategy, DomainError};

/// Upper bound for the number of decimals written per score.
pub const MAX_PRECISION: usize = 12;

/// Unified configuration for famtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Decimal places for scores in analysis results (default: 3)
    pub precision: usize,
    /// Independent-set strategy for INTEL_DIVIDE (default: greedy)
    pub division: DivisionStrategy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            precision: 3,
            division: DivisionStrategy::Greedy,
        }
    }
}

/// Raw settings for intermediate parsing (fields are Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub precision: Option<usize>,
    pub division: Option<DivisionStrategy>,
}

/// Get the XDG config directory for famtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "famtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("famtree.toml"))
}

/// Get the path to the local config file in a script directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".famtree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins for every field it specifies.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            precision: overlay.precision.unwrap_or(self.precision),
            division: overlay.division.unwrap_or(self.division),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.famtree.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_layers(global_config_path().as_deref(), local_dir)
    }

    /// Load settings from an explicit global file and local directory.
    ///
    /// Missing files are skipped; unreadable or malformed files are errors.
    pub fn load_layers(
        global_path: Option<&Path>,
        local_dir: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_path {
            if global_path.exists() {
                let raw = load_raw_settings(global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config next to the script
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        current.validate()?;
        Ok(current)
    }

    /// Apply FAMTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("FAMTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Some(val) = env_value(&config, "precision")? {
            settings.precision = val.trim().parse().map_err(|_| ApplicationError::Config {
                message: format!(
                    "FAMTREE_PRECISION must be a non-negative integer, got '{}'",
                    val
                ),
            })?;
        }
        if let Some(val) = env_value(&config, "division")? {
            settings.division = val.parse().map_err(|e: DomainError| ApplicationError::Config {
                message: format!("FAMTREE_DIVISION: {}", e),
            })?;
        }

        Ok(settings)
    }

    /// Reject values the output formatter cannot honour.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.precision > MAX_PRECISION {
            return Err(ApplicationError::Config {
                message: format!(
                    "precision {} exceeds maximum of {}",
                    self.precision, MAX_PRECISION
                ),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# famtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/famtree/famtree.toml
#   Local:  <script_dir>/.famtree.toml
#   Env:    FAMTREE_* environment variables
#   Flags:  --precision / --division

# Decimal places for scores in Target and Rank analysis results
# precision = 3

# Independent-set strategy for INTEL_DIVIDE: "greedy" or "maximum"
# division = "greedy"
"#
        .to_string()
    }
}

/// Raw value of an environment key; None when the variable is unset.
fn env_value(config: &Config, key: &str) -> Result<Option<String>, ApplicationError> {
    match config.get_string(key) {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
