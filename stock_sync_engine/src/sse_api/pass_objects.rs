use chrono::Duration;

use crate::db_types::ChannelId;

/// The time windows a [`super::Reconciler`] works with.
#[derive(Debug, Clone)]
pub struct SyncWindows {
    /// How far back a routine pass looks for new orders. Deliberately wider than the usual scheduling cadence;
    /// overlapping windows are harmless because the order ledger dedupes.
    pub routine: Duration,
    /// The default window for an on-demand re-sync.
    pub manual: Duration,
    /// A pass lease older than this is considered abandoned and may be taken over.
    pub lease_stale_after: Duration,
}

impl Default for SyncWindows {
    fn default() -> Self {
        Self { routine: Duration::minutes(10), manual: Duration::days(1), lease_stale_after: Duration::minutes(15) }
    }
}

/// What one reconciliation pass did. Returned to the trigger; never thrown.
#[derive(Debug, Clone)]
pub struct PassSummary {
    pub channel: ChannelId,
    pub new_orders: usize,
    pub skipped_duplicates: usize,
    pub errors: Vec<String>,
}

impl PassSummary {
    pub fn new(channel: ChannelId) -> Self {
        Self { channel, new_orders: 0, skipped_duplicates: 0, errors: Vec::new() }
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
