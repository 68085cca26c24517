//! Plain-text rendering of inventory views.

use std::fmt::Write;

use stockroom_inventory::{DashboardMetrics, StockItem, Transaction, USAGE_WINDOW_DAYS, UsageSummary};

pub fn item_line(item: &StockItem) -> String {
    let threshold = item
        .low_stock_threshold
        .map(|t| t.to_string())
        .unwrap_or_else(|| "-".to_string());
    let flag = if item.is_low_stock() { "  LOW" } else { "" };
    format!(
        "{}  {:<24} {:>8}  threshold {:>5}{}",
        item.id, item.name, item.quantity, threshold, flag
    )
}

pub fn items(items: &[StockItem]) -> String {
    if items.is_empty() {
        return "No items in stock.\n".to_string();
    }
    let mut out = String::new();
    for item in items {
        let _ = writeln!(out, "{}", item_line(item));
    }
    out
}

pub fn transaction_line(tx: &Transaction) -> String {
    format!(
        "{}  {:<8} {:>8}  {}",
        tx.timestamp.format("%Y-%m-%d %H:%M:%S"),
        tx.kind,
        tx.quantity,
        tx.item_name
    )
}

pub fn transactions<'a>(txs: impl IntoIterator<Item = &'a Transaction>) -> String {
    let mut out = String::new();
    for tx in txs {
        let _ = writeln!(out, "{}", transaction_line(tx));
    }
    if out.is_empty() {
        out.push_str("No transactions recorded.\n");
    }
    out
}

pub fn summary(rows: &[UsageSummary]) -> String {
    if rows.is_empty() {
        return format!("No withdrawals in the last {USAGE_WINDOW_DAYS} days.\n");
    }
    let mut out = String::new();
    for row in rows {
        let _ = writeln!(
            out,
            "{:<24} withdrawn {:>6}  start {:>6}  {:>5.1}% of start-of-week stock",
            row.item_name, row.total_withdrawn, row.stock_at_start_of_week, row.percentage_used
        );
    }
    out
}

pub fn metrics(m: &DashboardMetrics) -> String {
    format!(
        "items: {}\nunits: {}\nlow stock: {}\n",
        m.total_items, m.total_units, m.low_stock_items
    )
}

pub fn json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    let mut out = serde_json::to_string_pretty(value)?;
    out.push('\n');
    Ok(out)
}
