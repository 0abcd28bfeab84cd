//! Forest and store configuration, loadable from TOML.
//!
//! ```toml
//! validate_targets = true
//! reload_on_read = true
//!
//! [sqlite]
//! path = "var/forest.db"
//! table = "nodes"
//! journal_mode = "WAL"
//! synchronous = "FULL"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid table name {0:?}")]
    InvalidTable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Reject relocation targets that are not an existing boundary or
    /// `max(right) + 1`.
    pub validate_targets: bool,
    /// Refresh node arguments of read operations from the store. When off,
    /// reads on an out-of-date node fail with `StaleState`.
    pub reload_on_read: bool,
    pub sqlite: SqliteConfig,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            validate_targets: true,
            reload_on_read: true,
            sqlite: SqliteConfig::default(),
        }
    }
}

impl ForestConfig {
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(src)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&src)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sqlite.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
    /// Database file; `None` opens a private in-memory database.
    pub path: Option<PathBuf>,
    pub table: String,
    pub journal_mode: String,
    pub synchronous: String,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: None,
            table: "nodes".to_string(),
            journal_mode: "WAL".to_string(),
            synchronous: "FULL".to_string(),
        }
    }
}

impl SqliteConfig {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if is_identifier(&self.table) {
            Ok(())
        } else {
            Err(ConfigError::InvalidTable(self.table.clone()))
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
