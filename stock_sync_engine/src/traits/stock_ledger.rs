use ssg_common::Quantity;
use thiserror::Error;

use crate::db_types::{ChannelId, Sku, StockItem};

/// The authoritative stock ledger.
///
/// Concurrent reconciliation passes race freely on the same SKU, so the decrement must be a single conditional
/// update in the datastore (`new = max(current - n, 0)`), never a read-modify-write in the application.
#[allow(async_fn_in_trait)]
pub trait StockLedger {
    /// Atomically decrements the stock for `sku`, flooring at zero, and returns the resulting quantity.
    /// Returns `None` for an unknown SKU: the order line is simply skipped.
    async fn decrement_stock(&self, sku: &Sku, quantity: Quantity) -> Result<Option<Quantity>, StockLedgerError>;

    async fn stock_on_hand(&self, sku: &Sku) -> Result<Option<StockItem>, StockLedgerError>;

    /// Sets the stock for an existing SKU to an absolute value (channel-initiated reconciliation or a manual
    /// correction). Unlike [`Self::decrement_stock`], an unknown SKU is an error here.
    async fn set_stock(&self, sku: &Sku, quantity: Quantity) -> Result<Quantity, StockLedgerError>;

    /// Creates the stock item if it does not exist, otherwise overwrites its quantity.
    async fn upsert_stock_item(&self, sku: &Sku, quantity: Quantity) -> Result<(), StockLedgerError>;

    /// Marks `sku` as listed (or delisted) on `channel`.
    async fn upsert_listing(&self, sku: &Sku, channel: &ChannelId, listed: bool) -> Result<(), StockLedgerError>;

    /// The channels currently listing `sku`. Propagation targets are drawn from this set.
    async fn listed_channels(&self, sku: &Sku) -> Result<Vec<ChannelId>, StockLedgerError>;
}

#[derive(Debug, Clone, Error)]
pub enum StockLedgerError {
    #[error("Internal stock ledger error: {0}")]
    DatabaseError(String),
    #[error("The SKU {0} does not exist in the stock ledger")]
    SkuNotFound(Sku),
}

impl From<sqlx::Error> for StockLedgerError {
    fn from(e: sqlx::Error) -> Self {
        StockLedgerError::DatabaseError(e.to_string())
    }
}
