//! Infrastructure layer: persistence adapters, session wiring, configuration.

pub mod config;
pub mod session;
pub mod store;


pub use config::{ConfigError, StockroomConfig, StoreKind};
pub use session::InventorySession;
pub use store::{InMemoryStore, InventorySnapshot, InventoryStore, JsonFileStore, StoreError};
#[cfg(feature = "sqlite")]
pub use store::SqliteStore;
