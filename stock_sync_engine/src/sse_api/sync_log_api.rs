use std::{
    env,
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Duration;
use log::*;

use crate::{
    db_types::NewSyncLogEntry,
    traits::{SyncLogError, SyncLogQuery, SyncLogStore},
};

const DEFAULT_FALLBACK_PATH: &str = "data/sync_log_fallback.jsonl";

/// The audit trail front door.
///
/// [`SyncLogApi::log`] must never fail: the sync flow treats logging as fire-and-forget, and a broken log store is
/// not a reason to abort stock reconciliation. When the store write fails, the entry is appended as a JSON line to
/// a local fallback file so nothing is silently lost.
#[derive(Debug, Clone)]
pub struct SyncLogApi<B> {
    db: B,
    fallback_path: PathBuf,
}

impl<B> SyncLogApi<B> {
    pub fn new<P: Into<PathBuf>>(db: B, fallback_path: P) -> Self {
        Self { db, fallback_path: fallback_path.into() }
    }

    /// Uses `SSG_SYNC_LOG_FALLBACK` for the fallback file, or the default path next to the data store.
    pub fn from_env(db: B) -> Self {
        let path = env::var("SSG_SYNC_LOG_FALLBACK").unwrap_or_else(|_| DEFAULT_FALLBACK_PATH.to_string());
        Self::new(db, path)
    }

    pub fn fallback_path(&self) -> &Path {
        &self.fallback_path
    }

    fn append_fallback(&self, entry: &NewSyncLogEntry) -> std::io::Result<()> {
        if let Some(parent) = self.fallback_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let line = serde_json::to_string(entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let mut file = OpenOptions::new().create(true).append(true).open(&self.fallback_path)?;
        writeln!(file, "{line}")
    }
}

impl<B> SyncLogApi<B>
where B: SyncLogStore
{
    /// Appends an entry to the audit trail. Falls back to the local file when the store is unavailable; a failure
    /// of the fallback itself is only logged. This method never raises.
    pub async fn log(&self, entry: NewSyncLogEntry) {
        if let Err(e) = self.db.append_log(entry.clone()).await {
            error!("🗃️ Sync log store unavailable ({e}). Writing the entry to {}", self.fallback_path.display());
            if let Err(io) = self.append_fallback(&entry) {
                error!("🗃️ Fallback write failed as well ({io}). Entry dropped: {entry:?}");
            }
        }
    }

    pub async fn search(&self, query: SyncLogQuery) -> Result<Vec<crate::db_types::SyncLogEntry>, SyncLogError> {
        self.db.search_logs(query).await
    }

    /// Deletes entries older than the retention window. May run on its own schedule, independently of any pass.
    pub async fn purge(&self, older_than: Duration) -> Result<u64, SyncLogError> {
        let removed = self.db.purge_logs(older_than).await?;
        if removed > 0 {
            info!("🗃️ Purged {removed} sync log entries older than {older_than}");
        }
        Ok(removed)
    }
}
