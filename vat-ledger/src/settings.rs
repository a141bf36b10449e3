//! Settings file (`vat-ledger.toml`).
//!
//! ```toml
//! [calculator]
//! margin_base = "vat_inclusive"   # or "raw"
//! rounding = "half_up"            # or "half_even"
//! auto_restore = true
//!
//! [database]
//! backend = "sqlite"
//! connection_string = "vat-ledger.db"
//! ```
//!
//! Every key is optional. Command-line flags override the file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use vat_core::RegimeConfig;
use vat_core::db::DbConfig;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_SETTINGS_FILE: &str = "vat-ledger.toml";

pub const DEFAULT_DATABASE: &str = "vat-ledger.db";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub calculator: RegimeConfig,
    pub database: DatabaseSettings,
}

/// The `[database]` table. Unlike [`DbConfig::default`], which is an
/// in-memory database, records persist to [`DEFAULT_DATABASE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseSettings {
    pub backend: String,
    pub connection_string: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            backend: DbConfig::default().backend,
            connection_string: DEFAULT_DATABASE.to_string(),
        }
    }
}

impl DatabaseSettings {
    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            backend: self.backend.clone(),
            connection_string: self.connection_string.clone(),
        }
    }
}

impl Settings {
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::NotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let settings = Self::load_str(&content)?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn load_str(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads `path` if given, else [`DEFAULT_SETTINGS_FILE`] when present,
    /// else the defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Self::load_file(path),
            None if Path::new(DEFAULT_SETTINGS_FILE).exists() => {
                Self::load_file(DEFAULT_SETTINGS_FILE)
            }
            None => Ok(Self::default()),
        }
    }

    /// Applies `--backend` / `--db` on top of the file values.
    pub fn with_database_overrides(
        mut self,
        backend: Option<String>,
        connection_string: Option<String>,
    ) -> Self {
        if let Some(backend) = backend {
            self.database.backend = backend;
        }
        if let Some(connection_string) = connection_string {
            self.database.connection_string = connection_string;
        }
        self
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.database.backend.trim().is_empty() {
            return Err(SettingsError::Validation(
                "database.backend must not be empty".to_string(),
            ));
        }
        if self.database.connection_string.trim().is_empty() {
            return Err(SettingsError::Validation(
                "database.connection_string must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
