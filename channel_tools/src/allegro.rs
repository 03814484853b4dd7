use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::*;
use reqwest::Client;
use ssg_common::Quantity;
use stock_sync_engine::{
    db_types::{ChannelId, Sku, TokenPair},
    traits::{ChannelClient, ChannelError, PushOutcome, RemoteOrder},
};

use crate::{
    config::AllegroConfig,
    data_objects::AllegroCheckoutForms,
    helpers::{build_client, refresh_oauth_token, send_json, send_listing_request},
    ConnectorError,
};

/// One Allegro channel account. The gateway runs three of these against the same developer application; they
/// differ only by channel id and by the refresh token the credential store holds for them.
#[derive(Clone)]
pub struct AllegroApi {
    channel: ChannelId,
    config: AllegroConfig,
    client: Arc<Client>,
}

impl AllegroApi {
    pub fn new(channel: ChannelId, config: AllegroConfig) -> Result<Self, ConnectorError> {
        let client = build_client()?;
        Ok(Self { channel, config, client: Arc::new(client) })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }
}

#[async_trait]
impl ChannelClient for AllegroApi {
    fn channel(&self) -> &ChannelId {
        &self.channel
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenPair, ChannelError> {
        debug!("🛒️ {}: refreshing access token", self.channel);
        let token = refresh_oauth_token(
            &self.channel,
            &self.client,
            &self.config.auth_url,
            &self.config.client_id,
            self.config.client_secret.reveal(),
            refresh_token,
        )
        .await?;
        info!("🛒️ {}: access token refreshed", self.channel);
        Ok(token.into_token_pair())
    }

    async fn fetch_recent_orders(
        &self,
        access_token: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<RemoteOrder>, ChannelError> {
        let url = self.url("/order/checkout-forms");
        debug!("🛒️ {}: fetching orders updated since {since}", self.channel);
        let req = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .query(&[("updatedAt.gte", since.to_rfc3339()), ("status", "READY_FOR_PROCESSING".to_string())]);
        match send_json::<AllegroCheckoutForms>(&self.channel, req).await {
            Ok(forms) => {
                info!("🛒️ {}: fetched {} checkout forms", self.channel, forms.checkout_forms.len());
                Ok(forms.checkout_forms.into_iter().map(|f| f.into_remote_order()).collect())
            },
            Err(e @ (ChannelError::AuthenticationRequired { .. } | ChannelError::Transient(_))) => Err(e),
            Err(e) => {
                // A best-effort channel must never abort the reconciliation pass over a malformed answer.
                warn!("🛒️ {}: order fetch failed non-transiently ({e}); returning no orders", self.channel);
                Ok(Vec::new())
            },
        }
    }

    async fn push_stock_update(
        &self,
        access_token: &str,
        sku: &Sku,
        quantity: Quantity,
    ) -> Result<PushOutcome, ChannelError> {
        let url = self.url(&format!("/sale/offers/external/{sku}/quantity"));
        debug!("🛒️ {}: setting stock for {sku} to {quantity}", self.channel);
        let body = serde_json::json!({ "quantity": quantity.value() });
        let req = self.client.put(url).bearer_auth(access_token).json(&body);
        send_listing_request(&self.channel, sku, req).await?;
        info!("🛒️ {}: stock for {sku} set to {quantity}", self.channel);
        Ok(PushOutcome::Accepted)
    }

    async fn delete_listing(&self, access_token: &str, sku: &Sku) -> Result<(), ChannelError> {
        let url = self.url(&format!("/sale/offers/external/{sku}"));
        debug!("🛒️ {}: ending offer for {sku}", self.channel);
        let req = self.client.delete(url).bearer_auth(access_token);
        send_listing_request(&self.channel, sku, req).await?;
        info!("🛒️ {}: offer for {sku} ended", self.channel);
        Ok(())
    }
}
