use std::collections::HashSet;

use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{ChannelId, ExternalOrderId, ExternalOrderRecord, NewExternalOrder, OrderLineItem},
    traits::{InsertOrderResult, OrderLedgerError},
};

/// Inserts the order and its line items, or does nothing at all if the `(channel, external_order_id)` pair is
/// already in the ledger. Callers run this inside a transaction so the order and its lines land together.
pub async fn idempotent_insert(
    order: &NewExternalOrder,
    conn: &mut SqliteConnection,
) -> Result<InsertOrderResult, OrderLedgerError> {
    let result = sqlx::query(
        r#"
            INSERT INTO external_orders (channel, external_order_id, status, ordered_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (channel, external_order_id) DO NOTHING;
        "#,
    )
    .bind(order.channel.as_str())
    .bind(order.external_order_id.as_str())
    .bind(&order.status)
    .bind(order.ordered_at)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 0 {
        debug!("🗃️ Order {} on {} was already in the ledger; skipping", order.external_order_id, order.channel);
        return Ok(InsertOrderResult::AlreadyProcessed);
    }
    let order_id = result.last_insert_rowid();
    for line in &order.lines {
        sqlx::query("INSERT INTO external_order_lines (order_id, sku, quantity) VALUES ($1, $2, $3)")
            .bind(order_id)
            .bind(line.sku.as_str())
            .bind(line.quantity.value())
            .execute(&mut *conn)
            .await?;
    }
    debug!("🗃️ Order {} on {} inserted with id {order_id}", order.external_order_id, order.channel);
    Ok(InsertOrderResult::Inserted(order_id))
}

pub async fn known_order_ids(
    channel: &ChannelId,
    conn: &mut SqliteConnection,
) -> Result<HashSet<ExternalOrderId>, OrderLedgerError> {
    let ids: Vec<String> = sqlx::query_scalar("SELECT external_order_id FROM external_orders WHERE channel = $1")
        .bind(channel.as_str())
        .fetch_all(conn)
        .await?;
    Ok(ids.into_iter().map(ExternalOrderId::from).collect())
}

pub async fn fetch_order(
    channel: &ChannelId,
    external_order_id: &ExternalOrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<ExternalOrderRecord>, OrderLedgerError> {
    let order = sqlx::query_as("SELECT * FROM external_orders WHERE channel = $1 AND external_order_id = $2")
        .bind(channel.as_str())
        .bind(external_order_id.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub async fn order_lines(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderLineItem>, OrderLedgerError> {
    let lines = sqlx::query_as("SELECT * FROM external_order_lines WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(lines)
}
