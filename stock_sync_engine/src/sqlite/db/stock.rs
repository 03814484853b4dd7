use log::debug;
use sqlx::SqliteConnection;
use ssg_common::Quantity;

use crate::{
    db_types::{ChannelId, Sku, StockItem},
    traits::StockLedgerError,
};

/// Atomically decrements the stock for `sku` with a floor of zero, in a single conditional UPDATE.
///
/// Concurrent passes racing on the same SKU serialise inside the datastore; there is no read-modify-write window.
/// Returns the resulting quantity, or `None` when the SKU is unknown.
pub async fn decrement(
    sku: &Sku,
    quantity: Quantity,
    conn: &mut SqliteConnection,
) -> Result<Option<Quantity>, StockLedgerError> {
    let new_quantity: Option<i64> = sqlx::query_scalar(
        r#"
            UPDATE stock_items
            SET stock_quantity = MAX(stock_quantity - $1, 0), updated_at = CURRENT_TIMESTAMP
            WHERE sku = $2
            RETURNING stock_quantity;
        "#,
    )
    .bind(quantity.value())
    .bind(sku.as_str())
    .fetch_optional(conn)
    .await?;
    if let Some(q) = new_quantity {
        debug!("🗃️ Stock for [{sku}] decremented by {quantity} to {q}");
    }
    Ok(new_quantity.map(Quantity::from))
}

pub async fn fetch_stock_item(sku: &Sku, conn: &mut SqliteConnection) -> Result<Option<StockItem>, StockLedgerError> {
    let item = sqlx::query_as("SELECT * FROM stock_items WHERE sku = $1").bind(sku.as_str()).fetch_optional(conn).await?;
    Ok(item)
}

/// Sets the quantity of an existing stock item to an absolute value.
pub async fn set_quantity(
    sku: &Sku,
    quantity: Quantity,
    conn: &mut SqliteConnection,
) -> Result<Quantity, StockLedgerError> {
    let new_quantity: Option<i64> = sqlx::query_scalar(
        r#"
            UPDATE stock_items
            SET stock_quantity = MAX($1, 0), updated_at = CURRENT_TIMESTAMP
            WHERE sku = $2
            RETURNING stock_quantity;
        "#,
    )
    .bind(quantity.value())
    .bind(sku.as_str())
    .fetch_optional(conn)
    .await?;
    new_quantity.map(Quantity::from).ok_or_else(|| StockLedgerError::SkuNotFound(sku.clone()))
}

pub async fn upsert_item(sku: &Sku, quantity: Quantity, conn: &mut SqliteConnection) -> Result<(), StockLedgerError> {
    sqlx::query(
        r#"
            INSERT INTO stock_items (sku, stock_quantity) VALUES ($1, MAX($2, 0))
            ON CONFLICT (sku) DO UPDATE SET stock_quantity = MAX(excluded.stock_quantity, 0),
                                            updated_at = CURRENT_TIMESTAMP;
        "#,
    )
    .bind(sku.as_str())
    .bind(quantity.value())
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn upsert_listing(
    sku: &Sku,
    channel: &ChannelId,
    listed: bool,
    conn: &mut SqliteConnection,
) -> Result<(), StockLedgerError> {
    sqlx::query(
        r#"
            INSERT INTO channel_listings (sku, channel, listed) VALUES ($1, $2, $3)
            ON CONFLICT (sku, channel) DO UPDATE SET listed = excluded.listed, updated_at = CURRENT_TIMESTAMP;
        "#,
    )
    .bind(sku.as_str())
    .bind(channel.as_str())
    .bind(listed)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn listed_channels(sku: &Sku, conn: &mut SqliteConnection) -> Result<Vec<ChannelId>, StockLedgerError> {
    let channels: Vec<String> =
        sqlx::query_scalar("SELECT channel FROM channel_listings WHERE sku = $1 AND listed = 1 ORDER BY channel")
            .bind(sku.as_str())
            .fetch_all(conn)
            .await?;
    Ok(channels.into_iter().map(ChannelId::from).collect())
}
