use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, ItemId, TransactionId};
use stockroom_events::Event;

/// Kind of quantity-changing event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Initial quantity recorded when the item was created.
    Add,
    Refill,
    Withdraw,
}

impl TransactionType {
    /// +1 for stock coming in, -1 for stock going out.
    pub fn sign(self) -> i64 {
        match self {
            TransactionType::Add | TransactionType::Refill => 1,
            TransactionType::Withdraw => -1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Add => "ADD",
            TransactionType::Refill => "REFILL",
            TransactionType::Withdraw => "WITHDRAW",
        }
    }
}

impl core::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Immutable record of a quantity-changing event.
///
/// `item_id` is a weak reference: the item may since have been removed.
/// `item_name` is the name the item had when the transaction was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub item_id: ItemId,
    pub item_name: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Magnitude of the change (always positive; ADD may carry 0).
    pub quantity: i64,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Effect of this transaction on the item's stock level.
    pub fn signed_delta(&self) -> i64 {
        self.kind.sign() * self.quantity
    }

    /// Check a persisted entry: a non-empty name and a positive quantity
    /// (zero is allowed for ADD).
    pub fn validate(&self) -> DomainResult<()> {
        if self.item_name.trim().is_empty() {
            return Err(DomainError::invalid_input(format!(
                "transaction {} has an empty item name",
                self.id
            )));
        }
        let minimum = match self.kind {
            TransactionType::Add => 0,
            TransactionType::Refill | TransactionType::Withdraw => 1,
        };
        if self.quantity < minimum {
            return Err(DomainError::invalid_input(format!(
                "transaction {} has invalid {} quantity {}",
                self.id, self.kind, self.quantity
            )));
        }
        Ok(())
    }
}

impl Event for Transaction {
    fn occurred_at(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
