use chrono::Duration;
use log::*;

use crate::{
    retry::{retry, RetryPolicy},
    sse_api::TokenApiError,
    traits::{ChannelClient, ChannelError, CredentialStore},
};

/// How close to expiry a cached access token may be before it is refreshed pre-emptively.
pub const TOKEN_EXPIRY_MARGIN_MINUTES: i64 = 5;

/// Access token lifecycle for the channels.
///
/// Reads the stored credential and returns the cached access token while it is comfortably far from expiry.
/// Otherwise it performs the refresh exchange through the channel client, persists the new pair, and returns the
/// new token. A refresh that the channel rejects as structurally invalid (expired or revoked refresh token)
/// invalidates the stored credential and surfaces [`TokenApiError::AuthenticationRequired`]: only a human re-running
/// the authorization handshake can fix that, so it is never retried.
#[derive(Debug, Clone)]
pub struct TokenApi<B> {
    db: B,
    retry: RetryPolicy,
}

impl<B> TokenApi<B> {
    pub fn new(db: B) -> Self {
        Self { db, retry: RetryPolicy::default() }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl<B> TokenApi<B>
where B: CredentialStore
{
    pub async fn valid_token(&self, client: &dyn ChannelClient) -> Result<String, TokenApiError> {
        let channel = client.channel();
        let credential = self.db.fetch_credential(channel).await?.ok_or_else(|| {
            warn!("🔑️ No credential stored for {channel}. The authorization handshake has not been run.");
            TokenApiError::AuthenticationRequired(channel.clone())
        })?;
        if !credential.expires_within(Duration::minutes(TOKEN_EXPIRY_MARGIN_MINUTES)) {
            trace!("🔑️ Cached access token for {channel} is still valid");
            return Ok(credential.access_token);
        }
        debug!("🔑️ Access token for {channel} expires at {}; refreshing", credential.expires_at);
        let refreshed =
            retry("token refresh", &self.retry, || client.refresh_access_token(&credential.refresh_token)).await;
        match refreshed {
            Ok(pair) => {
                self.db.store_credential(channel, &pair).await?;
                info!("🔑️ Access token for {channel} refreshed; new expiry {}", pair.expires_at);
                Ok(pair.access_token)
            },
            Err(e @ ChannelError::AuthenticationRequired { .. }) => {
                error!("🔑️ Refresh token for {channel} was rejected ({e}). Invalidating the credential.");
                self.db.invalidate_credential(channel).await?;
                Err(TokenApiError::AuthenticationRequired(channel.clone()))
            },
            Err(e) => {
                error!("🔑️ Token refresh for {channel} failed: {e}");
                Err(TokenApiError::Refresh(e))
            },
        }
    }
}
