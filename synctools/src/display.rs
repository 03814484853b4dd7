use prettytable::{row, Table};
use stock_sync_engine::{
    db_types::{OperatorAlert, StockItem, SyncLogEntry},
    PassSummary,
};

pub fn print_summaries(summaries: &[PassSummary]) {
    let mut table = Table::new();
    table.add_row(row!["Channel", "New orders", "Duplicates skipped", "Errors"]);
    for summary in summaries {
        let errors = if summary.errors.is_empty() { "-".to_string() } else { summary.errors.join("; ") };
        table.add_row(row![summary.channel, summary.new_orders, summary.skipped_duplicates, errors]);
    }
    table.printstd();
}

pub fn print_stock_item(item: &StockItem) {
    let mut table = Table::new();
    table.add_row(row!["SKU", "On hand", "Updated"]);
    table.add_row(row![item.sku, item.stock_quantity, item.updated_at]);
    table.printstd();
}

pub fn print_log_entries(entries: &[SyncLogEntry]) {
    let mut table = Table::new();
    table.add_row(row!["When", "Channel", "Operation", "Status", "Message"]);
    for entry in entries {
        table.add_row(row![entry.created_at, entry.channel, entry.operation, entry.status, entry.message]);
    }
    table.printstd();
}

pub fn print_alerts(alerts: &[OperatorAlert]) {
    let mut table = Table::new();
    table.add_row(row!["When", "Source", "Title", "Message", "Ack"]);
    for alert in alerts {
        let ack = if alert.acknowledged { "yes" } else { "no" };
        table.add_row(row![alert.created_at, alert.source_channel, alert.title, alert.message, ack]);
    }
    table.printstd();
}
