//! Configuration loading and representation.
//!
//! Read from the environment:
//! - `STOCKROOM_STORE`: `json` (default), `memory` or `sqlite`
//! - `STOCKROOM_DATA_DIR`: where stores keep their files (default: platform data dir)
//! - `STOCKROOM_LOG_FORMAT`: `pretty` (default) or `json`

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::store::{InMemoryStore, InventoryStore, JsonFileStore, StoreError};

pub const STORE_ENV: &str = "STOCKROOM_STORE";
pub const DATA_DIR_ENV: &str = "STOCKROOM_DATA_DIR";
pub const LOG_FORMAT_ENV: &str = "STOCKROOM_LOG_FORMAT";

/// File name used by the sqlite store inside the data directory.
pub const SQLITE_FILE: &str = "stockroom.db";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("no data directory available; set STOCKROOM_DATA_DIR")]
    NoDataDir,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum StoreKind {
    Memory,
    #[default]
    Json,
    Sqlite,
}

impl FromStr for StoreKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreKind::Memory),
            "json" => Ok(StoreKind::Json),
            "sqlite" => Ok(StoreKind::Sqlite),
            other => Err(ConfigError::InvalidValue {
                key: STORE_ENV,
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockroomConfig {
    pub store: StoreKind,
    pub data_dir: PathBuf,
    pub log_json: bool,
}

impl StockroomConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup (environment, tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let store = match lookup(STORE_ENV) {
            Some(raw) => raw.parse()?,
            None => StoreKind::default(),
        };

        let data_dir = match lookup(DATA_DIR_ENV) {
            Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => default_data_dir()?,
        };

        let log_json = match lookup(LOG_FORMAT_ENV).as_deref().map(str::trim) {
            None | Some("") | Some("pretty") => false,
            Some("json") => true,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: LOG_FORMAT_ENV,
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            store,
            data_dir,
            log_json,
        })
    }

    /// Build the store this configuration selects.
    pub fn open_store(&self) -> Result<Box<dyn InventoryStore>, StoreError> {
        match self.store {
            StoreKind::Memory => Ok(Box::new(InMemoryStore::new())),
            StoreKind::Json => Ok(Box::new(JsonFileStore::new(&self.data_dir))),
            StoreKind::Sqlite => self.open_sqlite(),
        }
    }

    #[cfg(feature = "sqlite")]
    fn open_sqlite(&self) -> Result<Box<dyn InventoryStore>, StoreError> {
        let store = crate::store::SqliteStore::open(&self.data_dir.join(SQLITE_FILE))?;
        Ok(Box::new(store))
    }

    #[cfg(not(feature = "sqlite"))]
    fn open_sqlite(&self) -> Result<Box<dyn InventoryStore>, StoreError> {
        Err(StoreError::backend(
            "sqlite store requested but this build lacks the `sqlite` feature",
        ))
    }
}

fn default_data_dir() -> Result<PathBuf, ConfigError> {
    dirs::data_dir()
        .map(|dir| dir.join("stockroom"))
        .ok_or(ConfigError::NoDataDir)
}
