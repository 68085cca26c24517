//! Inventory domain module.
//!
//! This crate contains the stock registry, the transaction ledger, the mutation
//! engine that keeps them in step, and the read-side weekly usage aggregation.
//! It is deterministic domain logic (no IO, no storage).

pub mod engine;
pub mod item;
pub mod ledger;
pub mod metrics;
pub mod registry;
pub mod summary;
pub mod transaction;

pub use engine::{
    AddItem, AdjustStock, Inventory, InventoryCommand, InventoryEvent, ItemAdded, MutationEngine,
    StockAdjusted,
};
pub use item::StockItem;
pub use ledger::Ledger;
pub use metrics::DashboardMetrics;
pub use registry::StockRegistry;
pub use summary::{USAGE_WINDOW_DAYS, UsageSummary, summarize, summarize_window, usage_window};
pub use transaction::{Transaction, TransactionType};
