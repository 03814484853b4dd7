use chrono::Duration;
use log::trace;
use sqlx::SqliteConnection;

use crate::{db_types::ChannelId, traits::LeaseError};

/// Takes the pass lease for `channel` if it is free or stale. The whole decision happens inside one upsert, so two
/// racing schedulers cannot both win.
pub async fn try_acquire(
    channel: &ChannelId,
    holder: &str,
    stale_after: Duration,
    conn: &mut SqliteConnection,
) -> Result<bool, LeaseError> {
    let result = sqlx::query(
        r#"
            INSERT INTO pass_leases (channel, holder, acquired_at)
            VALUES ($1, $2, CURRENT_TIMESTAMP)
            ON CONFLICT (channel) DO UPDATE SET holder = excluded.holder, acquired_at = CURRENT_TIMESTAMP
            WHERE (unixepoch(CURRENT_TIMESTAMP) - unixepoch(pass_leases.acquired_at)) > $3;
        "#,
    )
    .bind(channel.as_str())
    .bind(holder)
    .bind(stale_after.num_seconds())
    .execute(conn)
    .await?;
    let acquired = result.rows_affected() > 0;
    trace!("🗃️ Lease for {channel}: acquired={acquired} holder={holder}");
    Ok(acquired)
}

pub async fn release(channel: &ChannelId, holder: &str, conn: &mut SqliteConnection) -> Result<(), LeaseError> {
    sqlx::query("DELETE FROM pass_leases WHERE channel = $1 AND holder = $2")
        .bind(channel.as_str())
        .bind(holder)
        .execute(conn)
        .await?;
    Ok(())
}
