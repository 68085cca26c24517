//! Mutation engine: validates stock changes and records them in the ledger.
//!
//! Commands are decided by [`Inventory::handle`] against the current registry
//! and take effect only through [`Inventory::apply`], which updates the registry
//! and appends the matching ledger entry together. A rejected command leaves
//! both untouched.

use chrono::{DateTime, Utc};

use stockroom_core::{
    Aggregate, DomainError, DomainResult, IdGenerator, ItemId, TransactionId, UuidV7Ids,
};

use crate::item::{StockItem, validate_name, validate_threshold};
use crate::ledger::Ledger;
use crate::metrics::DashboardMetrics;
use crate::registry::StockRegistry;
use crate::summary::{self, UsageSummary};
use crate::transaction::{Transaction, TransactionType};

/// Command: AddItem (creates the item and records its ADD transaction).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddItem {
    pub item_id: ItemId,
    pub transaction_id: TransactionId,
    pub name: String,
    pub quantity: i64,
    pub low_stock_threshold: Option<i64>,
    pub occurred_at: DateTime<Utc>,
}

/// Command payload shared by Refill and Withdraw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustStock {
    pub item_id: ItemId,
    pub transaction_id: TransactionId,
    pub amount: i64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryCommand {
    AddItem(AddItem),
    Refill(AdjustStock),
    Withdraw(AdjustStock),
    RemoveItem { item_id: ItemId },
    SetThreshold { item_id: ItemId, threshold: Option<i64> },
    RenameItem { item_id: ItemId, name: String },
}

/// Event: ItemAdded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemAdded {
    pub item: StockItem,
    pub transaction: Transaction,
}

/// Event: StockAdjusted (refill or withdraw).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockAdjusted {
    pub transaction: Transaction,
    pub new_quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryEvent {
    ItemAdded(ItemAdded),
    StockAdjusted(StockAdjusted),
    ItemRemoved(StockItem),
    ThresholdSet { item_id: ItemId, threshold: Option<i64> },
    ItemRenamed { item_id: ItemId, name: String },
}

impl InventoryEvent {
    /// Ledger entry carried by this event, if it records a quantity change.
    pub fn transaction(&self) -> Option<&Transaction> {
        match self {
            InventoryEvent::ItemAdded(e) => Some(&e.transaction),
            InventoryEvent::StockAdjusted(e) => Some(&e.transaction),
            _ => None,
        }
    }
}

/// Registry + ledger, evolved together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    registry: StockRegistry,
    ledger: Ledger,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(registry: StockRegistry, ledger: Ledger) -> Self {
        Self { registry, ledger }
    }

    pub fn registry(&self) -> &StockRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn into_parts(self) -> (StockRegistry, Ledger) {
        (self.registry, self.ledger)
    }

    fn handle_add(&self, cmd: &AddItem) -> DomainResult<Vec<InventoryEvent>> {
        let item = self.registry.validate_new_item(
            cmd.item_id,
            &cmd.name,
            cmd.quantity,
            cmd.low_stock_threshold,
        )?;
        let transaction = Transaction {
            id: cmd.transaction_id,
            item_id: item.id,
            item_name: item.name.clone(),
            kind: TransactionType::Add,
            quantity: item.quantity,
            timestamp: cmd.occurred_at,
        };

        Ok(vec![InventoryEvent::ItemAdded(ItemAdded { item, transaction })])
    }

    fn handle_adjust(
        &self,
        kind: TransactionType,
        cmd: &AdjustStock,
    ) -> DomainResult<Vec<InventoryEvent>> {
        if cmd.amount <= 0 {
            return Err(DomainError::invalid_input("amount must be a positive integer"));
        }
        if kind == TransactionType::Add {
            return Err(DomainError::invalid_input(
                "ADD is only valid when creating an item",
            ));
        }
        let item = self.registry.require(cmd.item_id)?;
        // Same check `apply` runs through `apply_delta`.
        let new_quantity = self
            .registry
            .check_delta(item.id, kind.sign() * cmd.amount)?;

        // Name is snapshotted now so later renames/removals don't rewrite history.
        let transaction = Transaction {
            id: cmd.transaction_id,
            item_id: item.id,
            item_name: item.name.clone(),
            kind,
            quantity: cmd.amount,
            timestamp: cmd.occurred_at,
        };

        Ok(vec![InventoryEvent::StockAdjusted(StockAdjusted {
            transaction,
            new_quantity,
        })])
    }
}

impl Aggregate for Inventory {
    type Command = InventoryCommand;
    type Event = InventoryEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            InventoryEvent::ItemAdded(e) => {
                let item = &e.item;
                match self.registry.add_item(
                    item.id,
                    &item.name,
                    item.quantity,
                    item.low_stock_threshold,
                ) {
                    Ok(_) => self.ledger.append(e.transaction.clone()),
                    Err(err) => {
                        tracing::error!(item_id = %item.id, %err, "item addition not applied");
                    }
                }
            }
            InventoryEvent::StockAdjusted(e) => {
                let tx = &e.transaction;
                match self.registry.apply_delta(tx.item_id, tx.signed_delta()) {
                    Ok(_) => self.ledger.append(tx.clone()),
                    Err(err) => {
                        tracing::error!(item_id = %tx.item_id, %err, "stock adjustment not applied");
                    }
                }
            }
            InventoryEvent::ItemRemoved(item) => {
                if let Err(err) = self.registry.remove_item(item.id) {
                    tracing::error!(item_id = %item.id, %err, "item removal not applied");
                }
            }
            InventoryEvent::ThresholdSet { item_id, threshold } => {
                if let Err(err) = self.registry.set_threshold(*item_id, *threshold) {
                    tracing::error!(%item_id, %err, "threshold change not applied");
                }
            }
            InventoryEvent::ItemRenamed { item_id, name } => {
                if let Err(err) = self.registry.rename_item(*item_id, name) {
                    tracing::error!(%item_id, %err, "rename not applied");
                }
            }
        }
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            InventoryCommand::AddItem(cmd) => self.handle_add(cmd),
            InventoryCommand::Refill(cmd) => self.handle_adjust(TransactionType::Refill, cmd),
            InventoryCommand::Withdraw(cmd) => self.handle_adjust(TransactionType::Withdraw, cmd),
            InventoryCommand::RemoveItem { item_id } => {
                let item = self.registry.require(*item_id)?;
                Ok(vec![InventoryEvent::ItemRemoved(item.clone())])
            }
            InventoryCommand::SetThreshold { item_id, threshold } => {
                validate_threshold(*threshold)?;
                self.registry.require(*item_id)?;
                Ok(vec![InventoryEvent::ThresholdSet {
                    item_id: *item_id,
                    threshold: *threshold,
                }])
            }
            InventoryCommand::RenameItem { item_id, name } => {
                let name = validate_name(name)?;
                self.registry.require(*item_id)?;
                Ok(vec![InventoryEvent::ItemRenamed {
                    item_id: *item_id,
                    name,
                }])
            }
        }
    }
}

/// Front door for stock mutations: builds commands with fresh identities and
/// runs them against the [`Inventory`].
#[derive(Debug, Clone)]
pub struct MutationEngine<G = UuidV7Ids> {
    inventory: Inventory,
    ids: G,
}

impl MutationEngine<UuidV7Ids> {
    pub fn new() -> Self {
        Self::with_ids(UuidV7Ids)
    }
}

impl Default for MutationEngine<UuidV7Ids> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: IdGenerator> MutationEngine<G> {
    pub fn with_ids(ids: G) -> Self {
        Self {
            inventory: Inventory::new(),
            ids,
        }
    }

    /// Resume from previously persisted state.
    pub fn from_state(registry: StockRegistry, ledger: Ledger, ids: G) -> Self {
        Self {
            inventory: Inventory::from_parts(registry, ledger),
            ids,
        }
    }

    pub fn registry(&self) -> &StockRegistry {
        self.inventory.registry()
    }

    pub fn ledger(&self) -> &Ledger {
        self.inventory.ledger()
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn into_inventory(self) -> Inventory {
        self.inventory
    }

    /// Create an item and record its ADD transaction.
    pub fn add_item(
        &mut self,
        name: &str,
        quantity: i64,
        low_stock_threshold: Option<i64>,
        at: DateTime<Utc>,
    ) -> DomainResult<StockItem> {
        let cmd = InventoryCommand::AddItem(AddItem {
            item_id: self.ids.next_item_id(),
            transaction_id: self.ids.next_transaction_id(),
            name: name.to_string(),
            quantity,
            low_stock_threshold,
            occurred_at: at,
        });

        let events = self.execute_recorded(&cmd)?;
        match events.into_iter().next() {
            Some(InventoryEvent::ItemAdded(e)) => {
                tracing::info!(item_id = %e.item.id, name = %e.item.name, quantity = e.item.quantity, "item added");
                Ok(e.item)
            }
            _ => Err(DomainError::invalid_input("item was not added")),
        }
    }

    pub fn refill(&mut self, item_id: ItemId, amount: i64, at: DateTime<Utc>) -> DomainResult<Transaction> {
        let cmd = InventoryCommand::Refill(self.adjustment(item_id, amount, at));
        self.execute_adjustment(&cmd)
    }

    pub fn withdraw(&mut self, item_id: ItemId, amount: i64, at: DateTime<Utc>) -> DomainResult<Transaction> {
        let cmd = InventoryCommand::Withdraw(self.adjustment(item_id, amount, at));
        self.execute_adjustment(&cmd)
    }

    /// Delete an item from the registry. Its transactions stay in the ledger.
    pub fn remove_item(&mut self, item_id: ItemId) -> DomainResult<StockItem> {
        let events = self
            .inventory
            .execute(&InventoryCommand::RemoveItem { item_id })?;
        match events.into_iter().next() {
            Some(InventoryEvent::ItemRemoved(item)) => {
                tracing::info!(%item_id, name = %item.name, "item removed");
                Ok(item)
            }
            _ => Err(DomainError::not_found(format!("item {item_id}"))),
        }
    }

    pub fn set_threshold(&mut self, item_id: ItemId, threshold: Option<i64>) -> DomainResult<()> {
        self.inventory
            .execute(&InventoryCommand::SetThreshold { item_id, threshold })?;
        tracing::info!(%item_id, ?threshold, "low-stock threshold set");
        Ok(())
    }

    pub fn rename_item(&mut self, item_id: ItemId, name: &str) -> DomainResult<()> {
        self.inventory.execute(&InventoryCommand::RenameItem {
            item_id,
            name: name.to_string(),
        })?;
        tracing::info!(%item_id, "item renamed");
        Ok(())
    }

    /// Weekly usage summary as of `now`.
    pub fn summarize(&self, now: DateTime<Utc>) -> Vec<UsageSummary> {
        summary::summarize(self.ledger(), self.registry(), now)
    }

    pub fn metrics(&self) -> DashboardMetrics {
        DashboardMetrics::from_registry(self.registry())
    }

    /// Execute a command that must append exactly one ledger entry.
    fn execute_recorded(&mut self, cmd: &InventoryCommand) -> DomainResult<Vec<InventoryEvent>> {
        let before = self.inventory.ledger().len();
        let events = self.inventory.execute(cmd)?;
        if self.inventory.ledger().len() != before + 1 {
            return Err(DomainError::invalid_input("change was not recorded in the ledger"));
        }
        Ok(events)
    }

    fn adjustment(&mut self, item_id: ItemId, amount: i64, at: DateTime<Utc>) -> AdjustStock {
        AdjustStock {
            item_id,
            transaction_id: self.ids.next_transaction_id(),
            amount,
            occurred_at: at,
        }
    }

    fn execute_adjustment(&mut self, cmd: &InventoryCommand) -> DomainResult<Transaction> {
        let events = self.execute_recorded(cmd)?;
        match events.into_iter().next() {
            Some(InventoryEvent::StockAdjusted(e)) => {
                tracing::info!(
                    item_id = %e.transaction.item_id,
                    kind = %e.transaction.kind,
                    amount = e.transaction.quantity,
                    new_quantity = e.new_quantity,
                    "stock adjusted"
                );
                Ok(e.transaction)
            }
            _ => Err(DomainError::invalid_input("stock was not adjusted")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;
    use stockroom_core::SequentialIds;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap()
    }

    fn engine() -> MutationEngine<SequentialIds> {
        MutationEngine::with_ids(SequentialIds::new())
    }

    #[test]
    fn add_item_records_add_transaction() {
        let mut engine = engine();
        let item = engine.add_item("Water", 100, Some(10), t0()).unwrap();

        assert_eq!(engine.registry().len(), 1);
        assert_eq!(engine.ledger().len(), 1);
        let tx = &engine.ledger().entries()[0];
        assert_eq!(tx.item_id, item.id);
        assert_eq!(tx.kind, TransactionType::Add);
        assert_eq!(tx.quantity, 100);
        assert_eq!(tx.item_name, "Water");
        assert_eq!(tx.timestamp, t0());
    }

    #[test]
    fn withdraw_updates_quantity_and_ledger() {
        let mut engine = engine();
        let item = engine.add_item("Water", 100, Some(10), t0()).unwrap();

        let tx = engine.withdraw(item.id, 30, t0() + Duration::hours(1)).unwrap();
        assert_eq!(tx.kind, TransactionType::Withdraw);
        assert_eq!(engine.registry().quantity_of(item.id), 70);

        let kinds: Vec<_> = engine.ledger().iter().map(|t| (t.kind, t.quantity)).collect();
        assert_eq!(
            kinds,
            vec![(TransactionType::Add, 100), (TransactionType::Withdraw, 30)]
        );
    }

    #[test]
    fn over_withdrawal_is_rejected_without_side_effects() {
        let mut engine = engine();
        let item = engine.add_item("Water", 10, None, t0()).unwrap();
        let before = engine.inventory().clone();

        let err = engine.withdraw(item.id, 11, t0()).unwrap_err();
        assert_eq!(err, DomainError::insufficient_stock(11, 10));
        assert_eq!(engine.inventory(), &before);
    }

    #[test]
    fn non_positive_amounts_are_invalid_input() {
        let mut engine = engine();
        let item = engine.add_item("Water", 10, None, t0()).unwrap();

        for amount in [0, -3] {
            assert!(matches!(engine.refill(item.id, amount, t0()), Err(DomainError::InvalidInput(_))));
            assert!(matches!(engine.withdraw(item.id, amount, t0()), Err(DomainError::InvalidInput(_))));
        }
        assert_eq!(engine.ledger().len(), 1);
        assert_eq!(engine.registry().quantity_of(item.id), 10);
    }

    #[test]
    fn adjusting_missing_item_is_not_found() {
        let mut engine = engine();
        let ghost = ItemId::new();

        assert!(matches!(engine.refill(ghost, 1, t0()), Err(DomainError::NotFound(_))));
        assert!(matches!(engine.withdraw(ghost, 1, t0()), Err(DomainError::NotFound(_))));
        assert!(matches!(engine.remove_item(ghost), Err(DomainError::NotFound(_))));
        assert!(matches!(engine.set_threshold(ghost, Some(2)), Err(DomainError::NotFound(_))));
        assert!(engine.ledger().is_empty());
    }

    #[test]
    fn invalid_add_leaves_state_untouched() {
        let mut engine = engine();
        assert!(engine.add_item("  ", 5, None, t0()).is_err());
        assert!(engine.add_item("Rice", -1, None, t0()).is_err());
        assert!(engine.registry().is_empty());
        assert!(engine.ledger().is_empty());
    }

    #[test]
    fn removal_keeps_history() {
        let mut engine = engine();
        let item = engine.add_item("Water", 10, None, t0()).unwrap();
        engine.withdraw(item.id, 4, t0()).unwrap();

        let removed = engine.remove_item(item.id).unwrap();
        assert_eq!(removed.quantity, 6);
        assert!(engine.registry().is_empty());
        assert_eq!(engine.ledger().for_item(item.id).count(), 2);
    }

    #[test]
    fn rename_does_not_rewrite_recorded_names() {
        let mut engine = engine();
        let item = engine.add_item("Water", 10, None, t0()).unwrap();
        engine.rename_item(item.id, "Sparkling water").unwrap();
        engine.withdraw(item.id, 1, t0()).unwrap();

        let names: Vec<_> = engine.ledger().iter().map(|t| t.item_name.as_str()).collect();
        assert_eq!(names, vec!["Water", "Sparkling water"]);
        assert_eq!(engine.ledger().len(), 2);
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let mut engine = engine();
        let item = engine.add_item("Water", 10, None, t0()).unwrap();
        let inventory = engine.inventory().clone();

        let cmd = InventoryCommand::Withdraw(AdjustStock {
            item_id: item.id,
            transaction_id: TransactionId::new(),
            amount: 3,
            occurred_at: t0(),
        });
        let events = inventory.handle(&cmd).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].transaction().map(|t| t.quantity), Some(3));
        assert_eq!(inventory.registry().quantity_of(item.id), 10);
    }

    #[test]
    fn refill_that_would_overflow_is_rejected_without_side_effects() {
        let mut engine = engine();
        let item = engine.add_item("Bolts", i64::MAX - 1, None, t0()).unwrap();
        let before = engine.inventory().clone();

        assert!(matches!(engine.refill(item.id, 2, t0()), Err(DomainError::InvalidInput(_))));
        assert_eq!(engine.inventory(), &before);

        engine.refill(item.id, 1, t0()).unwrap();
        assert_eq!(engine.registry().quantity_of(item.id), i64::MAX);
        assert_eq!(engine.ledger().len(), 2);
    }

    #[test]
    fn adjustment_event_for_missing_item_is_not_recorded() {
        let mut inventory = Inventory::new();
        let transaction = Transaction {
            id: TransactionId::new(),
            item_id: ItemId::new(),
            item_name: "Ghost".to_string(),
            kind: TransactionType::Refill,
            quantity: 2,
            timestamp: t0(),
        };

        inventory.apply(&InventoryEvent::StockAdjusted(StockAdjusted {
            transaction,
            new_quantity: 2,
        }));
        assert!(inventory.ledger().is_empty());
        assert!(inventory.registry().is_empty());
    }

    #[test]
    fn every_accepted_mutation_appends_one_entry() {
        let mut engine = engine();
        let item = engine.add_item("Water", 0, None, t0()).unwrap();
        assert_eq!(engine.ledger().len(), 1);

        engine.refill(item.id, i64::MAX, t0()).unwrap();
        engine.withdraw(item.id, i64::MAX, t0()).unwrap();
        assert!(engine.withdraw(item.id, 1, t0()).is_err());
        assert_eq!(engine.ledger().len(), 3);
        assert_eq!(engine.registry().quantity_of(item.id), 0);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Refill(usize, i64),
        Withdraw(usize, i64),
        Remove(usize),
    }

    fn amount_strategy() -> impl Strategy<Value = i64> {
        prop_oneof![
            4 => -5i64..60,
            1 => (i64::MAX - 3)..=i64::MAX,
            1 => Just(i64::MIN),
        ]
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..4, amount_strategy()).prop_map(|(i, a)| Op::Refill(i, a)),
            (0usize..4, amount_strategy()).prop_map(|(i, a)| Op::Withdraw(i, a)),
            (0usize..4).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: no sequence of operations drives a quantity below zero, and
        /// every accepted adjustment adds exactly one matching ledger entry.
        #[test]
        fn quantities_stay_non_negative_and_ledger_tracks_mutations(
            initial in prop::collection::vec(prop_oneof![0i64..50, Just(i64::MAX)], 1..4),
            ops in prop::collection::vec(op_strategy(), 0..40),
        ) {
            let mut engine = engine();
            let ids: Vec<ItemId> = initial
                .iter()
                .enumerate()
                .map(|(n, q)| engine.add_item(&format!("item-{n}"), *q, None, t0()).unwrap().id)
                .collect();

            for op in ops {
                let ledger_before = engine.ledger().len();
                let (idx, delta, kind, result) = match op {
                    Op::Refill(i, a) => {
                        let i = i % ids.len();
                        (i, a, TransactionType::Refill, engine.refill(ids[i], a, t0()))
                    }
                    Op::Withdraw(i, a) => {
                        let i = i % ids.len();
                        (i, a.saturating_neg(), TransactionType::Withdraw, engine.withdraw(ids[i], a, t0()))
                    }
                    Op::Remove(i) => {
                        let i = i % ids.len();
                        let _ = engine.remove_item(ids[i]);
                        prop_assert_eq!(engine.ledger().len(), ledger_before);
                        continue;
                    }
                };
                let ledger_quantity = engine
                    .ledger()
                    .for_item(ids[idx])
                    .map(|t| i128::from(t.signed_delta()))
                    .sum::<i128>();

                match result {
                    Ok(tx) => {
                        prop_assert_eq!(engine.ledger().len(), ledger_before + 1);
                        let last = engine.ledger().last().unwrap();
                        prop_assert_eq!(last, &tx);
                        prop_assert_eq!(tx.item_id, ids[idx]);
                        prop_assert_eq!(tx.kind, kind);
                        prop_assert_eq!(tx.signed_delta(), delta);
                        prop_assert_eq!(i128::from(engine.registry().quantity_of(ids[idx])), ledger_quantity);
                    }
                    Err(_) => prop_assert_eq!(engine.ledger().len(), ledger_before),
                }

                for item in engine.registry().iter() {
                    prop_assert!(item.quantity >= 0);
                }
            }

            // Summaries over arbitrary accepted histories never overflow.
            let summary = engine.summarize(t0());
            for row in &summary {
                prop_assert!((0.0..=100.0).contains(&row.percentage_used));
            }
        }
    }
}
