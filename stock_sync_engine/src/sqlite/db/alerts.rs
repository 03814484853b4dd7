use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOperatorAlert, OperatorAlert},
    traits::AlertStoreError,
};

pub async fn insert_alert(alert: &NewOperatorAlert, conn: &mut SqliteConnection) -> Result<i64, AlertStoreError> {
    let result = sqlx::query(
        r#"
            INSERT INTO operator_alerts (title, message, location, source_channel)
            VALUES ($1, $2, $3, $4);
        "#,
    )
    .bind(&alert.title)
    .bind(&alert.message)
    .bind(&alert.location)
    .bind(alert.source_channel.as_str())
    .execute(conn)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn recent_alerts(limit: i64, conn: &mut SqliteConnection) -> Result<Vec<OperatorAlert>, AlertStoreError> {
    let alerts = sqlx::query_as("SELECT * FROM operator_alerts ORDER BY created_at DESC, id DESC LIMIT $1")
        .bind(limit)
        .fetch_all(conn)
        .await?;
    Ok(alerts)
}
