//! Persistence boundary for inventory state.
//!
//! The session only needs `load` at startup and `save` after every accepted
//! change; the medium behind it is up to the implementation.

pub mod in_memory;
pub mod json_file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockroom_inventory::{StockItem, Transaction};

pub use in_memory::InMemoryStore;
pub use json_file::JsonFileStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

/// Storage key holding the item list.
pub const ITEMS_KEY: &str = "stockItems";
/// Storage key holding the transaction log.
pub const TRANSACTIONS_KEY: &str = "transactions";

/// Everything a session persists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub items: Vec<StockItem>,
    pub transactions: Vec<Transaction>,
}

impl InventorySnapshot {
    pub fn new(items: Vec<StockItem>, transactions: Vec<Transaction>) -> Self {
        Self {
            items,
            transactions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.transactions.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to (de)serialize `{key}`: {source}")]
    Serialization {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn serialization(key: &'static str, source: serde_json::Error) -> Self {
        Self::Serialization { key, source }
    }

    pub(crate) fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// Load/save contract for inventory state.
///
/// `load` returns empty collections when nothing has been saved yet.
pub trait InventoryStore {
    fn load(&self) -> Result<InventorySnapshot, StoreError>;

    fn save(&self, items: &[StockItem], transactions: &[Transaction]) -> Result<(), StoreError>;
}

impl<S> InventoryStore for Box<S>
where
    S: InventoryStore + ?Sized,
{
    fn load(&self) -> Result<InventorySnapshot, StoreError> {
        (**self).load()
    }

    fn save(&self, items: &[StockItem], transactions: &[Transaction]) -> Result<(), StoreError> {
        (**self).save(items, transactions)
    }
}

impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    fn load(&self) -> Result<InventorySnapshot, StoreError> {
        (**self).load()
    }

    fn save(&self, items: &[StockItem], transactions: &[Transaction]) -> Result<(), StoreError> {
        (**self).save(items, transactions)
    }
}

pub(crate) fn encode<T: Serialize>(key: &'static str, value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|e| StoreError::serialization(key, e))
}

pub(crate) fn decode<T: serde::de::DeserializeOwned>(
    key: &'static str,
    raw: &str,
) -> Result<T, StoreError> {
    serde_json::from_str(raw).map_err(|e| StoreError::serialization(key, e))
}
