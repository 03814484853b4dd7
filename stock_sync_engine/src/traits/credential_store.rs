use thiserror::Error;

use crate::db_types::{AccessCredential, ChannelId, TokenPair};

/// Per-channel API credential persistence.
///
/// Rows are created by the out-of-band authorization handshake; the engine only reads them, replaces them after a
/// successful refresh, and removes them when a refresh is rejected as invalid. Refresh races are last-writer-wins:
/// both writers persist a valid pair for the same channel, so no row lock is taken.
#[allow(async_fn_in_trait)]
pub trait CredentialStore {
    async fn fetch_credential(&self, channel: &ChannelId) -> Result<Option<AccessCredential>, CredentialStoreError>;

    async fn store_credential(&self, channel: &ChannelId, pair: &TokenPair) -> Result<(), CredentialStoreError>;

    /// Removes the credential, forcing a new authorization handshake before the channel can sync again.
    async fn invalidate_credential(&self, channel: &ChannelId) -> Result<(), CredentialStoreError>;
}

#[derive(Debug, Clone, Error)]
pub enum CredentialStoreError {
    #[error("Internal credential store error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for CredentialStoreError {
    fn from(e: sqlx::Error) -> Self {
        CredentialStoreError::DatabaseError(e.to_string())
    }
}
