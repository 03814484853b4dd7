use std::str::FromStr;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use log::*;
use ssg_common::Quantity;
use stock_sync_engine::{
    db_types::{ChannelId, Sku, SyncStatus},
    traits::{AlertStore, StockLedger, StockLedgerError, SyncLogQuery},
    SyncLogApi,
};

mod daemon;
mod display;
mod setup;

use crate::{
    daemon::run_daemon,
    display::{print_alerts, print_log_entries, print_stock_item, print_summaries},
    setup::{build_reconciler, connect_backend, SyncSettings},
};

#[derive(Parser, Debug)]
#[command(version = "1.0.0", about = "Operator tooling for the Stock Sync Gateway")]
pub struct Arguments {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one reconciliation pass, for a single channel or for all of them.
    #[clap(name = "run")]
    Run(RunParams),
    /// Run the scheduler: periodic passes over all channels plus the sync log retention sweep.
    #[clap(name = "daemon")]
    Daemon,
    /// Show (or correct) the stock on hand for a SKU.
    #[clap(name = "stock")]
    Stock(StockParams),
    /// Mark a SKU as listed or delisted on a channel.
    #[clap(name = "listing")]
    Listing(ListingParams),
    /// Query the sync log.
    #[clap(name = "logs")]
    Logs(LogsParams),
    /// Delete sync log entries older than the retention window.
    #[clap(name = "purge-logs")]
    PurgeLogs(PurgeParams),
    /// List recent operator alerts.
    #[clap(name = "alerts")]
    Alerts(AlertsParams),
}

#[derive(Debug, Args)]
pub struct RunParams {
    /// The channel to reconcile. Omit to run every registered channel.
    #[arg(short = 'c', long = "channel")]
    channel: Option<String>,
    /// Widen the order window to this many hours (a manual re-sync).
    #[arg(short = 'w', long = "window-hours")]
    window_hours: Option<i64>,
}

#[derive(Debug, Args)]
pub struct StockParams {
    #[arg(short = 's', long = "sku")]
    sku: String,
    /// Set the stock to this absolute quantity instead of showing it.
    #[arg(long = "set")]
    set: Option<i64>,
}

#[derive(Debug, Args)]
pub struct ListingParams {
    #[arg(short = 's', long = "sku")]
    sku: String,
    #[arg(short = 'c', long = "channel")]
    channel: String,
    /// Mark the SKU as no longer listed on the channel.
    #[arg(long = "delisted")]
    delisted: bool,
}

#[derive(Debug, Args)]
pub struct LogsParams {
    #[arg(short = 'c', long = "channel")]
    channel: Option<String>,
    /// Filter by status: Info, Success or Error.
    #[arg(short = 't', long = "status")]
    status: Option<String>,
    #[arg(short = 'n', long = "limit", default_value = "50")]
    limit: i64,
}

#[derive(Debug, Args)]
pub struct PurgeParams {
    /// Retention window in days.
    #[arg(short = 'd', long = "days", default_value = "2")]
    days: i64,
}

#[derive(Debug, Args)]
pub struct AlertsParams {
    #[arg(short = 'n', long = "limit", default_value = "20")]
    limit: i64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();
    let args = Arguments::parse();
    match args.command {
        Command::Run(params) => run_passes(params).await,
        Command::Daemon => {
            let settings = SyncSettings::from_env_or_default();
            let reconciler = build_reconciler().await?;
            run_daemon(reconciler, settings).await;
            Ok(())
        },
        Command::Stock(params) => stock(params).await,
        Command::Listing(params) => listing(params).await,
        Command::Logs(params) => logs(params).await,
        Command::PurgeLogs(params) => purge_logs(params).await,
        Command::Alerts(params) => alerts(params).await,
    }
}

async fn run_passes(params: RunParams) -> Result<()> {
    let reconciler = build_reconciler().await?;
    let window = params.window_hours.map(chrono::Duration::hours);
    let summaries = match params.channel {
        Some(channel) => {
            let channel = ChannelId::from(channel);
            let summary = match window {
                Some(_) => reconciler.run_manual_pass(&channel, window).await,
                None => reconciler.run_pass(&channel).await,
            };
            vec![summary]
        },
        None => reconciler.run_all_passes().await,
    };
    print_summaries(&summaries);
    Ok(())
}

async fn stock(params: StockParams) -> Result<()> {
    let db = connect_backend().await?;
    let sku = Sku::from(params.sku);
    if let Some(quantity) = params.set {
        let quantity = Quantity::from(quantity);
        match db.set_stock(&sku, quantity).await {
            Ok(q) => info!("Stock for {sku} corrected to {q}"),
            Err(StockLedgerError::SkuNotFound(_)) => {
                db.upsert_stock_item(&sku, quantity).await?;
                info!("Created stock item {sku} with quantity {quantity}");
            },
            Err(e) => return Err(e.into()),
        }
    }
    match db.stock_on_hand(&sku).await? {
        Some(item) => print_stock_item(&item),
        None => println!("No stock item for {sku}"),
    }
    Ok(())
}

async fn listing(params: ListingParams) -> Result<()> {
    let db = connect_backend().await?;
    let sku = Sku::from(params.sku);
    let channel = ChannelId::from(params.channel);
    db.upsert_listing(&sku, &channel, !params.delisted).await?;
    let state = if params.delisted { "delisted from" } else { "listed on" };
    println!("{sku} is now {state} {channel}");
    Ok(())
}

async fn logs(params: LogsParams) -> Result<()> {
    let db = connect_backend().await?;
    let mut query = SyncLogQuery::default().with_limit(params.limit);
    if let Some(channel) = params.channel {
        query = query.with_channel(ChannelId::from(channel));
    }
    if let Some(status) = params.status {
        let status = SyncStatus::from_str(&status).map_err(|e| anyhow::anyhow!("{e}"))?;
        query = query.with_status(status);
    }
    let log = SyncLogApi::from_env(db);
    let entries = log.search(query).await?;
    print_log_entries(&entries);
    Ok(())
}

async fn purge_logs(params: PurgeParams) -> Result<()> {
    let db = connect_backend().await?;
    let log = SyncLogApi::from_env(db);
    let removed = log.purge(chrono::Duration::days(params.days)).await?;
    println!("Removed {removed} sync log entries older than {} days", params.days);
    Ok(())
}

async fn alerts(params: AlertsParams) -> Result<()> {
    let db = connect_backend().await?;
    let alerts = db.recent_alerts(params.limit).await?;
    print_alerts(&alerts);
    Ok(())
}
