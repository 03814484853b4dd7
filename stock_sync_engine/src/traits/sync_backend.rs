use thiserror::Error;

use crate::traits::{AlertStore, CredentialStore, LeaseStore, OrderLedger, StockLedger, SyncLogStore};

/// The umbrella trait a storage backend implements to drive the reconciliation engine.
#[allow(async_fn_in_trait)]
pub trait SyncBackend:
    Clone + StockLedger + OrderLedger + CredentialStore + SyncLogStore + AlertStore + LeaseStore
{
    /// The URL of the datastore.
    fn url(&self) -> &str;

    /// Closes the datastore connection.
    async fn close(&mut self) -> Result<(), BackendError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("Internal datastore error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for BackendError {
    fn from(e: sqlx::Error) -> Self {
        BackendError::DatabaseError(e.to_string())
    }
}
