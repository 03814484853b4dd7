use chrono::Duration;
use thiserror::Error;

use crate::db_types::ChannelId;

/// Per-channel pass leases.
///
/// A pass acquires the channel's lease before doing any work and releases it on every exit path. Because the lease
/// is a datastore row and not an in-process flag, the overlap guarantee holds across process restarts and multiple
/// scheduler instances. A holder that dies without releasing is handled by the staleness window: a lease older than
/// `stale_after` can be taken over by the next caller.
#[allow(async_fn_in_trait)]
pub trait LeaseStore {
    /// Attempts to take the lease for `channel`. Returns `false` when another holder has a fresh lease.
    async fn try_acquire_lease(
        &self,
        channel: &ChannelId,
        holder: &str,
        stale_after: Duration,
    ) -> Result<bool, LeaseError>;

    /// Releases the lease if this holder still owns it. Releasing someone else's lease is a no-op.
    async fn release_lease(&self, channel: &ChannelId, holder: &str) -> Result<(), LeaseError>;
}

#[derive(Debug, Clone, Error)]
pub enum LeaseError {
    #[error("Internal lease store error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for LeaseError {
    fn from(e: sqlx::Error) -> Self {
        LeaseError::DatabaseError(e.to_string())
    }
}
