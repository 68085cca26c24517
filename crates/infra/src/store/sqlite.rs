//! SQLite-backed key/value store (feature `sqlite`).
//!
//! Holds the same two JSON documents as [`JsonFileStore`](super::JsonFileStore),
//! one row per storage key.

use std::path::Path;
use std::str::FromStr;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tokio::runtime::{Builder, Runtime};

use stockroom_inventory::{StockItem, Transaction};

use super::{
    ITEMS_KEY, InventorySnapshot, InventoryStore, StoreError, TRANSACTIONS_KEY, decode, encode,
};

#[derive(Debug)]
pub struct SqliteStore {
    runtime: Runtime,
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) a database file.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        Self::connect(options)
    }

    /// Private in-memory database (tests/dev).
    pub fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StoreError::backend(e.to_string()))?;
        Self::connect(options)
    }

    fn connect(options: SqliteConnectOptions) -> Result<Self, StoreError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| StoreError::backend(format!("failed to create runtime: {e}")))?;

        let pool = runtime.block_on(async {
            // One connection: an in-memory database is private to its connection.
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .connect_with(options)
                .await?;

            sqlx::query(
                r#"
                CREATE TABLE IF NOT EXISTS inventory_documents (
                    key        TEXT PRIMARY KEY,
                    data       TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                )
                "#,
            )
            .execute(&pool)
            .await?;

            Ok::<_, sqlx::Error>(pool)
        })
        .map_err(|e| StoreError::backend(format!("failed to open sqlite store: {e}")))?;

        Ok(Self { runtime, pool })
    }

    fn read_key(&self, key: &'static str) -> Result<Option<String>, StoreError> {
        self.runtime
            .block_on(async {
                let row = sqlx::query("SELECT data FROM inventory_documents WHERE key = ?1")
                    .bind(key)
                    .fetch_optional(&self.pool)
                    .await?;
                row.map(|r| r.try_get::<String, _>("data")).transpose()
            })
            .map_err(|e| StoreError::backend(format!("failed to read `{key}`: {e}")))
    }
}

impl InventoryStore for SqliteStore {
    fn load(&self) -> Result<InventorySnapshot, StoreError> {
        let items: Vec<StockItem> = match self.read_key(ITEMS_KEY)? {
            Some(raw) => decode(ITEMS_KEY, &raw)?,
            None => Vec::new(),
        };
        let transactions: Vec<Transaction> = match self.read_key(TRANSACTIONS_KEY)? {
            Some(raw) => decode(TRANSACTIONS_KEY, &raw)?,
            None => Vec::new(),
        };
        Ok(InventorySnapshot::new(items, transactions))
    }

    fn save(&self, items: &[StockItem], transactions: &[Transaction]) -> Result<(), StoreError> {
        let items = encode(ITEMS_KEY, &items)?;
        let transactions = encode(TRANSACTIONS_KEY, &transactions)?;
        let updated_at = Utc::now().to_rfc3339();

        self.runtime
            .block_on(async {
                let mut tx = self.pool.begin().await?;
                for (key, data) in [(ITEMS_KEY, &items), (TRANSACTIONS_KEY, &transactions)] {
                    sqlx::query(
                        r#"
                        INSERT INTO inventory_documents (key, data, updated_at)
                        VALUES (?1, ?2, ?3)
                        ON CONFLICT(key) DO UPDATE SET
                            data = excluded.data,
                            updated_at = excluded.updated_at
                        "#,
                    )
                    .bind(key)
                    .bind(data)
                    .bind(&updated_at)
                    .execute(&mut *tx)
                    .await?;
                }
                tx.commit().await
            })
            .map_err(|e| StoreError::backend(format!("failed to save inventory: {e}")))
    }
}
