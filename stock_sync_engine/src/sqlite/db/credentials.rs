use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{AccessCredential, ChannelId, TokenPair},
    traits::CredentialStoreError,
};

pub async fn fetch_credential(
    channel: &ChannelId,
    conn: &mut SqliteConnection,
) -> Result<Option<AccessCredential>, CredentialStoreError> {
    let credential = sqlx::query_as("SELECT * FROM access_credentials WHERE channel = $1")
        .bind(channel.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(credential)
}

/// Replaces the stored credential for the channel. Last writer wins on concurrent refreshes; both writers hold a
/// valid pair.
pub async fn upsert_credential(
    channel: &ChannelId,
    pair: &TokenPair,
    conn: &mut SqliteConnection,
) -> Result<(), CredentialStoreError> {
    sqlx::query(
        r#"
            INSERT INTO access_credentials (channel, access_token, refresh_token, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (channel) DO UPDATE SET access_token  = excluded.access_token,
                                                refresh_token = excluded.refresh_token,
                                                expires_at    = excluded.expires_at,
                                                updated_at    = CURRENT_TIMESTAMP;
        "#,
    )
    .bind(channel.as_str())
    .bind(&pair.access_token)
    .bind(&pair.refresh_token)
    .bind(pair.expires_at)
    .execute(conn)
    .await?;
    debug!("🗃️ Credential for {channel} replaced");
    Ok(())
}

pub async fn delete_credential(channel: &ChannelId, conn: &mut SqliteConnection) -> Result<(), CredentialStoreError> {
    sqlx::query("DELETE FROM access_credentials WHERE channel = $1").bind(channel.as_str()).execute(conn).await?;
    debug!("🗃️ Credential for {channel} invalidated");
    Ok(())
}
