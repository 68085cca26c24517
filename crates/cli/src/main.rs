mod cli;
mod render;

use anyhow::{Context, bail};
use chrono::Utc;
use clap::Parser;

use stockroom_core::ItemId;
use stockroom_infra::config::{DATA_DIR_ENV, LOG_FORMAT_ENV, STORE_ENV};
use stockroom_infra::{InventorySession, InventoryStore, StockroomConfig};
use stockroom_observability::LogFormat;

use crate::cli::{Cli, Command};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = StockroomConfig::from_lookup(|key| match key {
        STORE_ENV => cli.store.clone(),
        DATA_DIR_ENV => cli.data_dir.clone(),
        LOG_FORMAT_ENV => cli.log_format.clone(),
        _ => None,
    })
    .context("invalid configuration")?;

    stockroom_observability::init_with(LogFormat::from_json_flag(config.log_json));
    tracing::debug!(store = ?config.store, data_dir = %config.data_dir.display(), "configuration loaded");

    let store = config.open_store().context("failed to open inventory store")?;
    let mut session = InventorySession::open(store);

    let output = run(&mut session, cli.command, cli.json)?;
    print!("{output}");

    if let Some(err) = session.last_save_error() {
        eprintln!("warning: changes were not saved: {err}");
    }
    Ok(())
}

fn run<S: InventoryStore>(
    session: &mut InventorySession<S>,
    command: Command,
    json: bool,
) -> anyhow::Result<String> {
    let now = Utc::now();

    let output = match command {
        Command::Add(args) => {
            let item = session
                .add_item(&args.name, args.quantity, args.threshold, now)
                .context("could not add item")?;
            if json { render::json(&item)? } else { format!("{}\n", render::item_line(&item)) }
        }
        Command::Refill(args) => {
            let tx = session
                .refill(args.id, args.amount, now)
                .with_context(|| format!("could not refill {}", args.id))?;
            if json { render::json(&tx)? } else { format!("{}\n", render::transaction_line(&tx)) }
        }
        Command::Withdraw(args) => {
            let tx = session
                .withdraw(args.id, args.amount, now)
                .with_context(|| format!("could not withdraw from {}", args.id))?;
            if json { render::json(&tx)? } else { format!("{}\n", render::transaction_line(&tx)) }
        }
        Command::Remove(args) => {
            if !args.yes {
                bail!("refusing to remove {} without --yes", args.id);
            }
            let item = session
                .remove_item(args.id)
                .with_context(|| format!("could not remove {}", args.id))?;
            if json { render::json(&item)? } else { format!("removed {}\n", item.name) }
        }
        Command::Threshold(args) => {
            let threshold = if args.clear { None } else { args.value };
            session
                .set_threshold(args.id, threshold)
                .with_context(|| format!("could not update threshold of {}", args.id))?;
            show_item(session, args.id, json)?
        }
        Command::Rename(args) => {
            session
                .rename_item(args.id, &args.name)
                .with_context(|| format!("could not rename {}", args.id))?;
            show_item(session, args.id, json)?
        }
        Command::List => {
            if json { render::json(session.items())? } else { render::items(session.items()) }
        }
        Command::History(args) => {
            let entries: Vec<_> = match args.item {
                Some(id) => session.ledger().for_item(id).collect(),
                None => session.ledger().iter().collect(),
            };
            if json { render::json(&entries)? } else { render::transactions(entries) }
        }
        Command::Summary => {
            let rows = session.summary(now);
            if json { render::json(&rows)? } else { render::summary(&rows) }
        }
        Command::Metrics => {
            let metrics = session.metrics();
            if json { render::json(&metrics)? } else { render::metrics(&metrics) }
        }
    };

    Ok(output)
}

fn show_item<S: InventoryStore>(
    session: &InventorySession<S>,
    id: ItemId,
    json: bool,
) -> anyhow::Result<String> {
    let item = session.registry().require(id)?;
    if json { render::json(item) } else { Ok(format!("{}\n", render::item_line(item))) }
}
