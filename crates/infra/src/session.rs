//! Process-local inventory state backed by an [`InventoryStore`].
//!
//! State is loaded once when the session opens and saved after every accepted
//! change. Saving is fire-and-forget: a failure is logged and remembered, the
//! in-memory state stays authoritative, and nothing is retried.

use chrono::{DateTime, Utc};

use stockroom_core::{DomainResult, IdGenerator, ItemId, UuidV7Ids};
use stockroom_inventory::{
    DashboardMetrics, Ledger, MutationEngine, StockItem, StockRegistry, Transaction, UsageSummary,
};

use crate::store::{InventorySnapshot, InventoryStore, StoreError};

#[derive(Debug)]
pub struct InventorySession<S, G = UuidV7Ids> {
    engine: MutationEngine<G>,
    store: S,
    last_save_error: Option<StoreError>,
}

impl<S: InventoryStore> InventorySession<S, UuidV7Ids> {
    pub fn open(store: S) -> Self {
        Self::open_with_ids(store, UuidV7Ids)
    }
}

impl<S: InventoryStore, G: IdGenerator> InventorySession<S, G> {
    /// Load persisted state. A load failure or malformed data starts an empty session.
    pub fn open_with_ids(store: S, ids: G) -> Self {
        let snapshot = match store.load() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!(%err, "failed to load inventory; starting empty");
                InventorySnapshot::default()
            }
        };

        let (registry, ledger) = match restore(snapshot) {
            Ok(parts) => parts,
            Err(err) => {
                tracing::warn!(%err, "stored inventory is malformed; starting empty");
                (StockRegistry::new(), Ledger::new())
            }
        };
        tracing::info!(
            items = registry.len(),
            transactions = ledger.len(),
            "inventory session opened"
        );

        let engine = MutationEngine::from_state(registry, ledger, ids);

        Self {
            engine,
            store,
            last_save_error: None,
        }
    }

    pub fn add_item(
        &mut self,
        name: &str,
        quantity: i64,
        low_stock_threshold: Option<i64>,
        at: DateTime<Utc>,
    ) -> DomainResult<StockItem> {
        let item = self.engine.add_item(name, quantity, low_stock_threshold, at)?;
        self.persist();
        Ok(item)
    }

    pub fn refill(&mut self, item_id: ItemId, amount: i64, at: DateTime<Utc>) -> DomainResult<Transaction> {
        let tx = self.engine.refill(item_id, amount, at)?;
        self.persist();
        Ok(tx)
    }

    pub fn withdraw(&mut self, item_id: ItemId, amount: i64, at: DateTime<Utc>) -> DomainResult<Transaction> {
        let tx = self.engine.withdraw(item_id, amount, at)?;
        self.persist();
        Ok(tx)
    }

    pub fn remove_item(&mut self, item_id: ItemId) -> DomainResult<StockItem> {
        let item = self.engine.remove_item(item_id)?;
        self.persist();
        Ok(item)
    }

    pub fn set_threshold(&mut self, item_id: ItemId, threshold: Option<i64>) -> DomainResult<()> {
        self.engine.set_threshold(item_id, threshold)?;
        self.persist();
        Ok(())
    }

    pub fn rename_item(&mut self, item_id: ItemId, name: &str) -> DomainResult<()> {
        self.engine.rename_item(item_id, name)?;
        self.persist();
        Ok(())
    }

    pub fn summary(&self, now: DateTime<Utc>) -> Vec<UsageSummary> {
        self.engine.summarize(now)
    }

    pub fn metrics(&self) -> DashboardMetrics {
        self.engine.metrics()
    }

    pub fn items(&self) -> &[StockItem] {
        self.engine.registry().items()
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.engine.ledger().entries()
    }

    pub fn registry(&self) -> &StockRegistry {
        self.engine.registry()
    }

    pub fn ledger(&self) -> &Ledger {
        self.engine.ledger()
    }

    /// Error from the most recent save, if it failed.
    pub fn last_save_error(&self) -> Option<&StoreError> {
        self.last_save_error.as_ref()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.last_save_error.is_some()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Save current state. Returns `false` (and logs a warning) on failure.
    pub fn persist(&mut self) -> bool {
        match self.store.save(self.items(), self.transactions()) {
            Ok(()) => {
                self.last_save_error = None;
                true
            }
            Err(err) => {
                tracing::warn!(%err, "failed to save inventory; changes kept in memory only");
                self.last_save_error = Some(err);
                false
            }
        }
    }
}

fn restore(snapshot: InventorySnapshot) -> DomainResult<(StockRegistry, Ledger)> {
    let registry = StockRegistry::from_items(snapshot.items)?;
    let ledger = Ledger::from_entries(snapshot.transactions)?;
    Ok((registry, ledger))
}
