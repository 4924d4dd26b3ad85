//! Runtime settings: store location, starting roster and experience curve.

use std::path::{Path, PathBuf};

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Experience required per level, `base + level * per_level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ExpCurve {
    /// Experience needed to leave level 0.
    #[serde(default = "default_exp_base")]
    base: i64,
    /// Extra experience needed for each level already gained.
    #[serde(default = "default_exp_per_level")]
    per_level: i64,
}

#[instrument]
fn default_exp_base() -> i64 {
    100
}

#[instrument]
fn default_exp_per_level() -> i64 {
    20
}

impl ExpCurve {
    /// Creates a curve with the given coefficients.
    #[instrument]
    pub fn new(base: i64, per_level: i64) -> Self {
        Self { base, per_level }
    }

    /// Experience needed to advance from `level` to `level + 1`.
    #[instrument(skip(self))]
    pub fn required_exp(&self, level: i32) -> i64 {
        self.base + i64::from(level) * self.per_level
    }
}

impl Default for ExpCurve {
    fn default() -> Self {
        Self::new(default_exp_base(), default_exp_per_level())
    }
}

/// Settings for the progression subsystem.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct Settings {
    /// Path of the SQLite file holding player progression.
    #[serde(default = "default_database_path")]
    database_path: String,

    /// Hero type ids granted to every player who lacks them, in order.
    #[serde(default)]
    starting_heroes: Vec<String>,

    /// Optional hero catalog file.
    #[serde(default)]
    catalog_path: Option<PathBuf>,

    /// Levelling curve used when heroes gain experience.
    #[serde(default)]
    exp_curve: ExpCurve,
}

#[instrument]
fn default_database_path() -> String {
    "hw.db".to_string()
}

impl Settings {
    /// Creates settings with the default curve and no catalog file.
    #[instrument(skip(database_path, starting_heroes))]
    pub fn new(database_path: impl Into<String>, starting_heroes: Vec<String>) -> Self {
        Self {
            database_path: database_path.into(),
            starting_heroes,
            catalog_path: None,
            exp_curve: ExpCurve::default(),
        }
    }

    /// Parses settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the text is not valid settings TOML.
    #[instrument(skip(content))]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse settings: {}", e)))
    }

    /// Loads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading settings from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read settings file: {}", e)))?;

        let settings = Self::from_toml_str(&content)?;
        info!(
            database_path = %settings.database_path,
            starting_heroes = settings.starting_heroes.len(),
            "Settings loaded"
        );
        Ok(settings)
    }

    /// Replaces the database path, e.g. from a command-line override.
    #[instrument(skip(self, database_path))]
    pub fn with_database_path(mut self, database_path: impl Into<String>) -> Self {
        self.database_path = database_path.into();
        self
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(default_database_path(), Vec::new())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
