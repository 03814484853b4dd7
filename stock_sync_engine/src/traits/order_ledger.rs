use std::collections::HashSet;

use thiserror::Error;

use crate::{
    db_types::{ChannelId, ExternalOrderId, ExternalOrderRecord, NewExternalOrder, OrderLineItem},
    traits::InsertOrderResult,
};

/// The append-only idempotency store of orders already processed.
///
/// An order may be fetched repeatedly across overlapping windows, but must be ingested at most once. The store
/// enforces the `(channel, external order id)` uniqueness even when two passes race past the caller-side dedupe.
#[allow(async_fn_in_trait)]
pub trait OrderLedger {
    /// Persists the order and its line items in one transaction. Returns
    /// [`InsertOrderResult::AlreadyProcessed`] without writing anything if the idempotency key is already present.
    async fn insert_order(&self, order: NewExternalOrder) -> Result<InsertOrderResult, OrderLedgerError>;

    /// All external order ids already ingested for the channel. This is the dedupe set for a pass.
    async fn known_order_ids(&self, channel: &ChannelId) -> Result<HashSet<ExternalOrderId>, OrderLedgerError>;

    async fn fetch_order(
        &self,
        channel: &ChannelId,
        external_order_id: &ExternalOrderId,
    ) -> Result<Option<ExternalOrderRecord>, OrderLedgerError>;

    async fn order_lines(&self, order_id: i64) -> Result<Vec<OrderLineItem>, OrderLedgerError>;
}

#[derive(Debug, Clone, Error)]
pub enum OrderLedgerError {
    #[error("Internal order ledger error: {0}")]
    DatabaseError(String),
    #[error("The requested order (internal id {0}) does not exist")]
    OrderIdNotFound(i64),
}

impl From<sqlx::Error> for OrderLedgerError {
    fn from(e: sqlx::Error) -> Self {
        OrderLedgerError::DatabaseError(e.to_string())
    }
}
