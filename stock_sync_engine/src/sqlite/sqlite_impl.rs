//! `SqliteDatabase` is the concrete storage backend of the Stock Sync Engine.
//!
//! It implements every trait defined in the [`crate::traits`] module over a SQLite connection pool. The heavy
//! lifting is done by the free functions in [`super::db`]; this type provides connections and transaction
//! boundaries.
use std::{collections::HashSet, fmt::Debug};

use chrono::Duration;
use sqlx::SqlitePool;
use ssg_common::Quantity;

use super::db::{alerts, credentials, db_url, leases, new_pool, orders, stock, sync_log};
use crate::{
    db_types::{
        AccessCredential,
        ChannelId,
        ExternalOrderId,
        ExternalOrderRecord,
        NewExternalOrder,
        NewOperatorAlert,
        NewSyncLogEntry,
        OperatorAlert,
        OrderLineItem,
        Sku,
        StockItem,
        SyncLogEntry,
        TokenPair,
    },
    traits::{
        AlertStore,
        AlertStoreError,
        BackendError,
        CredentialStore,
        CredentialStoreError,
        InsertOrderResult,
        LeaseError,
        LeaseStore,
        OrderLedger,
        OrderLedgerError,
        StockLedger,
        StockLedgerError,
        SyncBackend,
        SyncLogError,
        SyncLogQuery,
        SyncLogStore,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Connects to the database given by `SSG_DATABASE_URL`, or the default URL if unset.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl StockLedger for SqliteDatabase {
    async fn decrement_stock(&self, sku: &Sku, quantity: Quantity) -> Result<Option<Quantity>, StockLedgerError> {
        let mut conn = self.pool.acquire().await?;
        stock::decrement(sku, quantity, &mut conn).await
    }

    async fn stock_on_hand(&self, sku: &Sku) -> Result<Option<StockItem>, StockLedgerError> {
        let mut conn = self.pool.acquire().await?;
        stock::fetch_stock_item(sku, &mut conn).await
    }

    async fn set_stock(&self, sku: &Sku, quantity: Quantity) -> Result<Quantity, StockLedgerError> {
        let mut conn = self.pool.acquire().await?;
        stock::set_quantity(sku, quantity, &mut conn).await
    }

    async fn upsert_stock_item(&self, sku: &Sku, quantity: Quantity) -> Result<(), StockLedgerError> {
        let mut conn = self.pool.acquire().await?;
        stock::upsert_item(sku, quantity, &mut conn).await
    }

    async fn upsert_listing(&self, sku: &Sku, channel: &ChannelId, listed: bool) -> Result<(), StockLedgerError> {
        let mut conn = self.pool.acquire().await?;
        stock::upsert_listing(sku, channel, listed, &mut conn).await
    }

    async fn listed_channels(&self, sku: &Sku) -> Result<Vec<ChannelId>, StockLedgerError> {
        let mut conn = self.pool.acquire().await?;
        stock::listed_channels(sku, &mut conn).await
    }
}

impl OrderLedger for SqliteDatabase {
    /// The order and its line items land in one transaction, so a crash can never leave a half-ingested order
    /// that would dodge the dedupe on the next pass.
    async fn insert_order(&self, order: NewExternalOrder) -> Result<InsertOrderResult, OrderLedgerError> {
        let mut tx = self.pool.begin().await?;
        let result = orders::idempotent_insert(&order, &mut tx).await?;
        tx.commit().await?;
        Ok(result)
    }

    async fn known_order_ids(&self, channel: &ChannelId) -> Result<HashSet<ExternalOrderId>, OrderLedgerError> {
        let mut conn = self.pool.acquire().await?;
        orders::known_order_ids(channel, &mut conn).await
    }

    async fn fetch_order(
        &self,
        channel: &ChannelId,
        external_order_id: &ExternalOrderId,
    ) -> Result<Option<ExternalOrderRecord>, OrderLedgerError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order(channel, external_order_id, &mut conn).await
    }

    async fn order_lines(&self, order_id: i64) -> Result<Vec<OrderLineItem>, OrderLedgerError> {
        let mut conn = self.pool.acquire().await?;
        orders::order_lines(order_id, &mut conn).await
    }
}

impl CredentialStore for SqliteDatabase {
    async fn fetch_credential(&self, channel: &ChannelId) -> Result<Option<AccessCredential>, CredentialStoreError> {
        let mut conn = self.pool.acquire().await?;
        credentials::fetch_credential(channel, &mut conn).await
    }

    async fn store_credential(&self, channel: &ChannelId, pair: &TokenPair) -> Result<(), CredentialStoreError> {
        let mut conn = self.pool.acquire().await?;
        credentials::upsert_credential(channel, pair, &mut conn).await
    }

    async fn invalidate_credential(&self, channel: &ChannelId) -> Result<(), CredentialStoreError> {
        let mut conn = self.pool.acquire().await?;
        credentials::delete_credential(channel, &mut conn).await
    }
}

impl SyncLogStore for SqliteDatabase {
    async fn append_log(&self, entry: NewSyncLogEntry) -> Result<i64, SyncLogError> {
        let mut conn = self.pool.acquire().await?;
        sync_log::insert_entry(&entry, &mut conn).await
    }

    async fn search_logs(&self, query: SyncLogQuery) -> Result<Vec<SyncLogEntry>, SyncLogError> {
        let mut conn = self.pool.acquire().await?;
        sync_log::search_entries(query, &mut conn).await
    }

    async fn purge_logs(&self, older_than: Duration) -> Result<u64, SyncLogError> {
        let mut conn = self.pool.acquire().await?;
        sync_log::purge_entries(older_than, &mut conn).await
    }
}

impl AlertStore for SqliteDatabase {
    async fn insert_alert(&self, alert: &NewOperatorAlert) -> Result<i64, AlertStoreError> {
        let mut conn = self.pool.acquire().await?;
        alerts::insert_alert(alert, &mut conn).await
    }

    async fn recent_alerts(&self, limit: i64) -> Result<Vec<OperatorAlert>, AlertStoreError> {
        let mut conn = self.pool.acquire().await?;
        alerts::recent_alerts(limit, &mut conn).await
    }
}

impl LeaseStore for SqliteDatabase {
    async fn try_acquire_lease(
        &self,
        channel: &ChannelId,
        holder: &str,
        stale_after: Duration,
    ) -> Result<bool, LeaseError> {
        let mut conn = self.pool.acquire().await?;
        leases::try_acquire(channel, holder, stale_after, &mut conn).await
    }

    async fn release_lease(&self, channel: &ChannelId, holder: &str) -> Result<(), LeaseError> {
        let mut conn = self.pool.acquire().await?;
        leases::release(channel, holder, &mut conn).await
    }
}

impl SyncBackend for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        self.pool.close().await;
        Ok(())
    }
}
