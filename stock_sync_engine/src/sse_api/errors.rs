use thiserror::Error;

use crate::{
    db_types::ChannelId,
    traits::{ChannelError, CredentialStoreError, OrderLedgerError, StockLedgerError},
};

#[derive(Debug, Error)]
pub enum TokenApiError {
    /// No usable credential: either none is stored, or the channel rejected the refresh token outright. A human
    /// must re-run the authorization handshake before this channel can sync again. Never retried.
    #[error("Channel {0} requires operator re-authorization")]
    AuthenticationRequired(ChannelId),
    /// The refresh exchange kept failing for transient reasons until the retries ran out.
    #[error("Could not refresh the access token: {0}")]
    Refresh(ChannelError),
    #[error("Credential store failure: {0}")]
    Store(#[from] CredentialStoreError),
}

/// A channel-fatal failure inside one reconciliation pass. These abort the pass for their channel only; sibling
/// channel passes are unaffected.
#[derive(Debug, Error)]
pub enum PassError {
    #[error("Token acquisition failed: {0}")]
    Token(#[from] TokenApiError),
    #[error("Order fetch failed: {0}")]
    Fetch(ChannelError),
    #[error("Stock push failed: {0}")]
    Push(ChannelError),
    #[error("Datastore failure: {0}")]
    Store(String),
}

impl From<OrderLedgerError> for PassError {
    fn from(e: OrderLedgerError) -> Self {
        PassError::Store(e.to_string())
    }
}

impl From<StockLedgerError> for PassError {
    fn from(e: StockLedgerError) -> Self {
        PassError::Store(e.to_string())
    }
}
