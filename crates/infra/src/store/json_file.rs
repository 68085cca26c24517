//! Directory of JSON documents, one per storage key.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use stockroom_inventory::{StockItem, Transaction};

use super::{
    ITEMS_KEY, InventorySnapshot, InventoryStore, StoreError, TRANSACTIONS_KEY, decode, encode,
};

/// Persists `stockItems.json` and `transactions.json` under a data directory.
///
/// A missing file loads as an empty collection. Each document is written to a
/// temporary sibling and renamed into place.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn read_key<T: DeserializeOwned + Default>(&self, key: &'static str) -> Result<T, StoreError> {
        let path = self.path_for(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(T::default()),
            Err(err) => return Err(StoreError::io(path, err)),
        };
        if raw.trim().is_empty() {
            return Ok(T::default());
        }
        decode(key, &raw)
    }

    fn write_key<T: Serialize>(&self, key: &'static str, value: &T) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        let data = encode(key, value)?;

        fs::write(&tmp, data).map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| StoreError::io(&path, e))
    }
}

impl InventoryStore for JsonFileStore {
    fn load(&self) -> Result<InventorySnapshot, StoreError> {
        let items: Vec<StockItem> = self.read_key(ITEMS_KEY)?;
        let transactions: Vec<Transaction> = self.read_key(TRANSACTIONS_KEY)?;
        tracing::debug!(
            dir = %self.dir.display(),
            items = items.len(),
            transactions = transactions.len(),
            "loaded inventory from json files"
        );
        Ok(InventorySnapshot::new(items, transactions))
    }

    fn save(&self, items: &[StockItem], transactions: &[Transaction]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        self.write_key(ITEMS_KEY, &items)?;
        self.write_key(TRANSACTIONS_KEY, &transactions)
    }
}
