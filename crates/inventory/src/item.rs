use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, ItemId};

/// A stock-keeping unit tracked by name and quantity.
///
/// Serialized with the field names used by the browser storage format
/// (`lowStockThreshold` is omitted when absent).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    pub id: ItemId,
    pub name: String,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_stock_threshold: Option<i64>,
}

impl StockItem {
    /// Validate and build a new item. The name is trimmed.
    pub fn new(
        id: ItemId,
        name: &str,
        quantity: i64,
        low_stock_threshold: Option<i64>,
    ) -> DomainResult<Self> {
        let name = validate_name(name)?;
        if quantity < 0 {
            return Err(DomainError::invalid_input("quantity cannot be negative"));
        }
        validate_threshold(low_stock_threshold)?;

        Ok(Self {
            id,
            name,
            quantity,
            low_stock_threshold,
        })
    }

    /// True when a threshold is set and the quantity has fallen to or below it.
    pub fn is_low_stock(&self) -> bool {
        self.low_stock_threshold
            .is_some_and(|threshold| self.quantity <= threshold)
    }
}

pub(crate) fn validate_name(name: &str) -> DomainResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::invalid_input("name cannot be empty"));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn validate_threshold(threshold: Option<i64>) -> DomainResult<()> {
    match threshold {
        Some(t) if t < 0 => Err(DomainError::invalid_input(
            "low-stock threshold cannot be negative",
        )),
        _ => Ok(()),
    }
}
