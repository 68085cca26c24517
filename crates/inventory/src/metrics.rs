use serde::{Deserialize, Serialize};

use crate::registry::StockRegistry;

/// Registry-wide counters for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    /// Number of distinct items.
    pub total_items: usize,
    /// Sum of all quantities.
    pub total_units: i64,
    /// Items at or below their low-stock threshold.
    pub low_stock_items: usize,
}

impl DashboardMetrics {
    pub fn from_registry(registry: &StockRegistry) -> Self {
        Self {
            total_items: registry.len(),
            total_units: registry.iter().map(|i| i.quantity).sum(),
            low_stock_items: registry.low_stock_items().count(),
        }
    }
}
