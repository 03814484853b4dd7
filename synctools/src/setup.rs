use std::{env, future::Future, pin::Pin};

use anyhow::{Context, Result};
use log::*;
use ssg_common::helpers::parse_positive_int;
use stock_sync_engine::{
    events::{EventHandlers, EventHooks, OperatorAlertEvent},
    Reconciler,
    SqliteDatabase,
};

const DEFAULT_SYNC_INTERVAL_SECS: u64 = 600;
const DEFAULT_LOG_RETENTION_DAYS: u64 = 2;
const MAX_DB_CONNECTIONS: u32 = 10;

#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub interval_secs: u64,
    pub retention_days: u64,
}

impl SyncSettings {
    pub fn from_env_or_default() -> Self {
        let interval_secs =
            parse_positive_int(env::var("SSG_SYNC_INTERVAL_SECS").ok(), DEFAULT_SYNC_INTERVAL_SECS);
        let retention_days =
            parse_positive_int(env::var("SSG_LOG_RETENTION_DAYS").ok(), DEFAULT_LOG_RETENTION_DAYS);
        Self { interval_secs, retention_days }
    }
}

/// Opens the database named by `SSG_DATABASE_URL` and brings the schema up to date.
pub async fn connect_backend() -> Result<SqliteDatabase> {
    let db = SqliteDatabase::new(MAX_DB_CONNECTIONS).await.context("Could not connect to the database")?;
    db.run_migrations().await.context("Could not run database migrations")?;
    Ok(db)
}

/// Wires the full engine: storage, the six-channel registry, and a console hook for operator alerts.
pub async fn build_reconciler() -> Result<Reconciler<SqliteDatabase>> {
    let db = connect_backend().await?;
    let registry = channel_tools::standard_registry_from_env().context("Could not build the channel registry")?;
    let mut hooks = EventHooks::default();
    hooks.on_operator_alert(|ev: OperatorAlertEvent| {
        Box::pin(async move {
            info!("📣️ [{}] {}: {}", ev.alert.source_channel, ev.alert.title, ev.alert.message);
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    let handlers = EventHandlers::new(16, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;
    Ok(Reconciler::new(db, registry, producers))
}
