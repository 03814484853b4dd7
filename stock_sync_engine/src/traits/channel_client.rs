use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ssg_common::Quantity;
use thiserror::Error;

use crate::db_types::{ChannelId, ExternalOrderId, Sku, TokenPair};

/// The capability one marketplace integration provides to the engine.
///
/// Implementations are object-safe so that N channels can sit behind one registry. Every call that talks to the
/// channel takes the access token explicitly; token lifecycle belongs to the credential store, not the client.
#[async_trait]
pub trait ChannelClient: Send + Sync {
    /// The channel instance this client serves.
    fn channel(&self) -> &ChannelId;

    /// Performs the refresh-token exchange. A structurally rejected refresh token (expired, revoked) must surface
    /// as [`ChannelError::AuthenticationRequired`] so the caller can invalidate the stored credential.
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenPair, ChannelError>;

    /// Orders created on the channel since `since`. Windows overlap deliberately; the order ledger dedupes.
    async fn fetch_recent_orders(
        &self,
        access_token: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<RemoteOrder>, ChannelError>;

    /// Pushes an absolute stock quantity for a listed SKU. Never called with zero: stock-to-zero is expressed as
    /// [`Self::delete_listing`] instead, which every channel supports.
    async fn push_stock_update(
        &self,
        access_token: &str,
        sku: &Sku,
        quantity: Quantity,
    ) -> Result<PushOutcome, ChannelError>;

    /// Removes the channel listing/inventory record for the SKU. The only automatic stock-to-zero action.
    async fn delete_listing(&self, access_token: &str, sku: &Sku) -> Result<(), ChannelError>;
}

/// The two non-error outcomes of a stock push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// The channel accepted the new quantity.
    Accepted,
    /// The channel's business rules forbid an automated change for this listing; an operator must act by hand.
    PolicyRestricted { reason: String },
}

/// Failure taxonomy for channel calls. The classification decides retry behaviour:
/// only [`ChannelError::Transient`] is ever retried.
#[derive(Debug, Clone, Error)]
pub enum ChannelError {
    /// The channel rejected our credentials outright. Requires a human to re-run the authorization handshake.
    /// Never retried.
    #[error("Channel {channel} requires re-authorization: {reason}")]
    AuthenticationRequired { channel: ChannelId, reason: String },
    /// Network trouble, timeouts, 5xx or rate limiting. Retried with backoff.
    #[error("Transient channel failure: {0}")]
    Transient(String),
    /// The channel rejected the request as malformed (4xx other than 429). Never retried.
    #[error("Request rejected by channel: {0}")]
    Validation(String),
    /// The SKU has no listing on the channel.
    #[error("No listing found for {0}")]
    ListingNotFound(Sku),
    /// The channel answered with something we could not interpret.
    #[error("Unexpected channel response: {0}")]
    Protocol(String),
}

impl ChannelError {
    pub fn authentication_required<S: Into<String>>(channel: &ChannelId, reason: S) -> Self {
        ChannelError::AuthenticationRequired { channel: channel.clone(), reason: reason.into() }
    }

    pub fn is_authentication_required(&self) -> bool {
        matches!(self, ChannelError::AuthenticationRequired { .. })
    }
}

/// An order as reported by a channel, reduced to what the engine consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteOrder {
    pub external_order_id: ExternalOrderId,
    pub created_at: DateTime<Utc>,
    pub status: String,
    pub line_items: Vec<RemoteLineItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteLineItem {
    pub sku: Sku,
    pub quantity: Quantity,
}
