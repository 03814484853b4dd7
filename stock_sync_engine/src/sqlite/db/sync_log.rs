use chrono::Duration;
use log::trace;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewSyncLogEntry, SyncLogEntry},
    traits::{SyncLogError, SyncLogQuery},
};

pub async fn insert_entry(entry: &NewSyncLogEntry, conn: &mut SqliteConnection) -> Result<i64, SyncLogError> {
    let details = entry.details.as_ref().map(|d| d.to_string());
    let result = sqlx::query(
        r#"
            INSERT INTO sync_log (channel, operation, status, message, details)
            VALUES ($1, $2, $3, $4, $5);
        "#,
    )
    .bind(entry.channel.as_str())
    .bind(entry.operation.to_string())
    .bind(entry.status.to_string())
    .bind(&entry.message)
    .bind(details)
    .execute(conn)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Fetches log entries according to the criteria in the `SyncLogQuery`, newest first.
pub async fn search_entries(query: SyncLogQuery, conn: &mut SqliteConnection) -> Result<Vec<SyncLogEntry>, SyncLogError> {
    let mut builder = QueryBuilder::new(
        r#"
    SELECT * FROM sync_log
    "#,
    );
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(channel) = query.channel {
        where_clause.push("channel = ");
        where_clause.push_bind_unseparated(channel.as_str().to_string());
    }
    if let Some(operation) = query.operation {
        where_clause.push("operation = ");
        where_clause.push_bind_unseparated(operation.to_string());
    }
    if let Some(status) = query.status {
        where_clause.push("status = ");
        where_clause.push_bind_unseparated(status.to_string());
    }
    if let Some(since) = query.since {
        where_clause.push("created_at >= ");
        where_clause.push_bind_unseparated(since);
    }
    if let Some(until) = query.until {
        where_clause.push("created_at <= ");
        where_clause.push_bind_unseparated(until);
    }
    builder.push(" ORDER BY created_at DESC, id DESC");
    if let Some(limit) = query.limit {
        builder.push(" LIMIT ");
        builder.push_bind(limit);
        if let Some(offset) = query.offset {
            builder.push(" OFFSET ");
            builder.push_bind(offset);
        }
    }

    trace!("🗃️ Executing query: {}", builder.sql());
    let query = builder.build_query_as::<SyncLogEntry>();
    let entries = query.fetch_all(conn).await?;
    trace!("🗃️ Result of search_entries: {:?}", entries.len());
    Ok(entries)
}

/// Deletes entries older than the retention window and returns the number of rows removed.
pub async fn purge_entries(older_than: Duration, conn: &mut SqliteConnection) -> Result<u64, SyncLogError> {
    let result = sqlx::query(
        format!(
            "DELETE FROM sync_log WHERE (unixepoch(CURRENT_TIMESTAMP) - unixepoch(created_at)) > {};",
            older_than.num_seconds()
        )
        .as_str(),
    )
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}
