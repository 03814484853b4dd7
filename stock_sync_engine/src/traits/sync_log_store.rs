use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::db_types::{ChannelId, NewSyncLogEntry, SyncLogEntry, SyncOperation, SyncStatus};

/// The queryable audit trail. Every sync step appends one entry; a retention sweep prunes old rows on its own
/// schedule.
#[allow(async_fn_in_trait)]
pub trait SyncLogStore {
    /// Appends an entry and returns its generated id.
    async fn append_log(&self, entry: NewSyncLogEntry) -> Result<i64, SyncLogError>;

    /// Entries matching the filter, newest first.
    async fn search_logs(&self, query: SyncLogQuery) -> Result<Vec<SyncLogEntry>, SyncLogError>;

    /// Deletes entries older than the retention window. Returns the number of rows removed.
    async fn purge_logs(&self, older_than: Duration) -> Result<u64, SyncLogError>;
}

/// Filter criteria for [`SyncLogStore::search_logs`]. Empty criteria match everything.
#[derive(Debug, Clone, Default)]
pub struct SyncLogQuery {
    pub channel: Option<ChannelId>,
    pub operation: Option<SyncOperation>,
    pub status: Option<SyncStatus>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl SyncLogQuery {
    pub fn is_empty(&self) -> bool {
        self.channel.is_none()
            && self.operation.is_none()
            && self.status.is_none()
            && self.since.is_none()
            && self.until.is_none()
    }

    pub fn with_channel(mut self, channel: ChannelId) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn with_operation(mut self, operation: SyncOperation) -> Self {
        self.operation = Some(operation);
        self
    }

    pub fn with_status(mut self, status: SyncStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }
}

#[derive(Debug, Clone, Error)]
pub enum SyncLogError {
    #[error("Internal sync log error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for SyncLogError {
    fn from(e: sqlx::Error) -> Self {
        SyncLogError::DatabaseError(e.to_string())
    }
}
