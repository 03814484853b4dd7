use chrono::Duration;
use log::*;
use stock_sync_engine::{Reconciler, SqliteDatabase, SyncLogApi};

use crate::setup::SyncSettings;

const RETENTION_SWEEP_INTERVAL_SECS: u64 = 3600;

/// The scheduler loop: a reconciliation batch over every channel on a fixed cadence, and an hourly retention
/// sweep of the sync log. Runs until the process is killed.
pub async fn run_daemon(reconciler: Reconciler<SqliteDatabase>, settings: SyncSettings) {
    let mut sync_timer = tokio::time::interval(std::time::Duration::from_secs(settings.interval_secs));
    let mut sweep_timer = tokio::time::interval(std::time::Duration::from_secs(RETENTION_SWEEP_INTERVAL_SECS));
    let log = SyncLogApi::from_env(reconciler.db().clone());
    let retention = Duration::days(settings.retention_days as i64);
    info!("🕰️ Sync daemon started: passes every {}s, retention {} days", settings.interval_secs, settings.retention_days);
    loop {
        tokio::select! {
            _ = sync_timer.tick() => {
                info!("🕰️ Running reconciliation batch");
                let summaries = reconciler.run_all_passes().await;
                for summary in &summaries {
                    if summary.is_clean() {
                        debug!(
                            "🕰️ {}: {} new orders, {} duplicates skipped",
                            summary.channel, summary.new_orders, summary.skipped_duplicates
                        );
                    } else {
                        error!(
                            "🕰️ {}: {} new orders, errors: {}",
                            summary.channel, summary.new_orders, summary.errors.join("; ")
                        );
                    }
                }
            },
            _ = sweep_timer.tick() => {
                info!("🕰️ Running sync log retention sweep");
                if let Err(e) = log.purge(retention).await {
                    error!("🕰️ Retention sweep failed: {e}");
                }
            },
        }
    }
}
