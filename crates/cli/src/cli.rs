use clap::{Args, Parser, Subcommand};

use stockroom_core::ItemId;

#[derive(Parser, Debug)]
#[command(name = "stockroom")]
#[command(about = "Track stock items, refills and withdrawals, and weekly usage")]
pub struct Cli {
    /// Storage backend: json, memory or sqlite (also read from `STOCKROOM_STORE`).
    #[arg(long, env = "STOCKROOM_STORE", global = true)]
    pub store: Option<String>,

    /// Directory holding the stored inventory (also read from `STOCKROOM_DATA_DIR`).
    #[arg(long, env = "STOCKROOM_DATA_DIR", global = true)]
    pub data_dir: Option<String>,

    /// Log format: pretty or json (also read from `STOCKROOM_LOG_FORMAT`).
    #[arg(long, env = "STOCKROOM_LOG_FORMAT", global = true)]
    pub log_format: Option<String>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new item with its initial quantity.
    Add(AddArgs),
    /// Put stock back on the shelf.
    Refill(AdjustArgs),
    /// Take stock off the shelf.
    Withdraw(AdjustArgs),
    /// Delete an item (its history is kept).
    Remove(RemoveArgs),
    /// Set or clear the low-stock threshold.
    Threshold(ThresholdArgs),
    /// Change an item's display name.
    Rename(RenameArgs),
    /// List current items.
    List,
    /// Show recorded transactions.
    History(HistoryArgs),
    /// Weekly usage summary.
    Summary,
    /// Dashboard counters.
    Metrics,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    pub name: String,
    #[arg(allow_negative_numbers = true)]
    pub quantity: i64,
    #[arg(long, allow_negative_numbers = true)]
    pub threshold: Option<i64>,
}

#[derive(Args, Debug)]
pub struct AdjustArgs {
    pub id: ItemId,
    #[arg(allow_negative_numbers = true)]
    pub amount: i64,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    pub id: ItemId,
    /// Confirm the removal.
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct ThresholdArgs {
    pub id: ItemId,
    #[arg(allow_negative_numbers = true, conflicts_with = "clear", required_unless_present = "clear")]
    pub value: Option<i64>,
    /// Remove the threshold instead of setting one.
    #[arg(long)]
    pub clear: bool,
}

#[derive(Args, Debug)]
pub struct RenameArgs {
    pub id: ItemId,
    pub name: String,
}

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Only show transactions for this item.
    #[arg(long)]
    pub item: Option<ItemId>,
}
