use std::sync::RwLock;

use stockroom_inventory::{StockItem, Transaction};

use super::{InventorySnapshot, InventoryStore, StoreError};

/// In-memory store for tests/dev. Nothing outlives the process.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<InventorySnapshot>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a snapshot.
    pub fn with_snapshot(snapshot: InventorySnapshot) -> Self {
        Self {
            inner: RwLock::new(snapshot),
        }
    }

    /// Copy of what was last saved.
    pub fn snapshot(&self) -> Result<InventorySnapshot, StoreError> {
        self.load()
    }
}

impl InventoryStore for InMemoryStore {
    fn load(&self) -> Result<InventorySnapshot, StoreError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| StoreError::backend("lock poisoned"))?;
        Ok(inner.clone())
    }

    fn save(&self, items: &[StockItem], transactions: &[Transaction]) -> Result<(), StoreError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| StoreError::backend("lock poisoned"))?;
        *inner = InventorySnapshot::new(items.to_vec(), transactions.to_vec());
        Ok(())
    }
}
