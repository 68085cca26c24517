//! Weekly usage aggregation.
//!
//! Reconstructs, per item, the stock level at the start of a trailing window and
//! the share of it that was withdrawn, from the ledger plus live registry state.
//!
//! Model:
//! - `start = current_quantity - net_change_in_window` (current is 0 for removed items)
//! - `used% = withdrawn / start * 100`, or `withdrawn / added_in_window * 100`
//!   when the window started empty, capped at 100.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::ItemId;
use stockroom_events::occurred_since;

use crate::ledger::Ledger;
use crate::registry::StockRegistry;
use crate::transaction::TransactionType;

/// Length of the trailing usage window, in days.
pub const USAGE_WINDOW_DAYS: i64 = 7;

pub fn usage_window() -> Duration {
    Duration::days(USAGE_WINDOW_DAYS)
}

/// Usage of one item over the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummary {
    pub item_id: ItemId,
    pub item_name: String,
    pub total_withdrawn: i64,
    pub stock_at_start_of_week: i64,
    pub percentage_used: f64,
}

/// Running totals are kept in `i128` so sums of valid `i64` amounts cannot overflow.
#[derive(Debug)]
struct Accumulator {
    item_id: ItemId,
    item_name: String,
    total_withdrawn: i128,
    total_added: i128,
    net_change: i128,
}

/// Weekly usage summary as of `now` over the trailing [`usage_window`].
pub fn summarize(ledger: &Ledger, registry: &StockRegistry, now: DateTime<Utc>) -> Vec<UsageSummary> {
    summarize_window(ledger, registry, now, usage_window())
}

/// Usage summary over `[now - window, ..)`, sorted by `total_withdrawn` descending.
///
/// Pure: the same inputs always give the same output. Items without withdrawals
/// in the window are omitted. Ties keep the order in which items first appear
/// in the ledger.
pub fn summarize_window(
    ledger: &Ledger,
    registry: &StockRegistry,
    now: DateTime<Utc>,
    window: Duration,
) -> Vec<UsageSummary> {
    let cutoff = now - window;

    let mut groups: Vec<Accumulator> = Vec::new();
    let mut index: HashMap<ItemId, usize> = HashMap::new();

    for tx in occurred_since(ledger, cutoff) {
        let slot = *index.entry(tx.item_id).or_insert_with(|| {
            groups.push(Accumulator {
                item_id: tx.item_id,
                item_name: tx.item_name.clone(),
                total_withdrawn: 0,
                total_added: 0,
                net_change: 0,
            });
            groups.len() - 1
        });
        let acc = &mut groups[slot];

        let quantity = i128::from(tx.quantity);
        match tx.kind {
            TransactionType::Withdraw => {
                acc.total_withdrawn += quantity;
                acc.net_change -= quantity;
            }
            TransactionType::Add | TransactionType::Refill => {
                acc.total_added += quantity;
                acc.net_change += quantity;
            }
        }
        // Last processed snapshot wins.
        acc.item_name.clone_from(&tx.item_name);
    }

    let mut result: Vec<UsageSummary> = groups
        .into_iter()
        .filter(|acc| acc.total_withdrawn != 0)
        .map(|acc| {
            let current_quantity = i128::from(registry.quantity_of(acc.item_id));
            let stock_at_start_of_week = current_quantity - acc.net_change;

            UsageSummary {
                item_id: acc.item_id,
                percentage_used: percentage_used(
                    acc.total_withdrawn,
                    stock_at_start_of_week,
                    acc.total_added,
                ),
                item_name: acc.item_name,
                total_withdrawn: clamp_to_i64(acc.total_withdrawn),
                stock_at_start_of_week: clamp_to_i64(stock_at_start_of_week),
            }
        })
        .collect();

    result.sort_by(|a, b| b.total_withdrawn.cmp(&a.total_withdrawn));

    tracing::debug!(
        cutoff = %cutoff,
        items = result.len(),
        "weekly usage summarized"
    );

    result
}

fn clamp_to_i64(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}

fn percentage_used(withdrawn: i128, start: i128, added: i128) -> f64 {
    let pct = if start > 0 {
        withdrawn as f64 / start as f64 * 100.0
    } else if withdrawn > 0 && added > 0 {
        // Window started empty: measure against what came in during the window.
        withdrawn as f64 / added as f64 * 100.0
    } else {
        0.0
    };
    pct.min(100.0)
}
