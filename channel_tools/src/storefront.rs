use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use log::*;
use reqwest::Client;
use ssg_common::Quantity;
use stock_sync_engine::{
    db_types::{ChannelId, Sku, TokenPair},
    traits::{ChannelClient, ChannelError, PushOutcome, RemoteOrder},
};

use crate::{
    config::StorefrontConfig,
    data_objects::StorefrontOrderPage,
    helpers::{build_client, send_json, send_listing_request},
    ConnectorError,
    STOREFRONT,
};

/// The merchant's own storefront. There is no OAuth dance here: the configured API key is minted into a
/// long-lived token pair, which keeps the credential lifecycle uniform across all channels.
#[derive(Clone)]
pub struct StorefrontApi {
    channel: ChannelId,
    config: StorefrontConfig,
    client: Arc<Client>,
}

impl StorefrontApi {
    pub fn new(config: StorefrontConfig) -> Result<Self, ConnectorError> {
        let client = build_client()?;
        Ok(Self { channel: ChannelId::from(STOREFRONT), config, client: Arc::new(client) })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }
}

#[async_trait]
impl ChannelClient for StorefrontApi {
    fn channel(&self) -> &ChannelId {
        &self.channel
    }

    async fn refresh_access_token(&self, _refresh_token: &str) -> Result<TokenPair, ChannelError> {
        debug!("🛒️ {}: minting token pair from the configured API key", self.channel);
        let key = self.config.api_key.reveal().clone();
        Ok(TokenPair { access_token: key.clone(), refresh_token: key, expires_at: Utc::now() + Duration::days(365) })
    }

    async fn fetch_recent_orders(
        &self,
        access_token: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<RemoteOrder>, ChannelError> {
        let url = self.url("/api/v1/orders");
        debug!("🛒️ {}: fetching orders placed since {since}", self.channel);
        let req = self.client.get(url).bearer_auth(access_token).query(&[("created_after", since.to_rfc3339())]);
        match send_json::<StorefrontOrderPage>(&self.channel, req).await {
            Ok(page) => {
                info!("🛒️ {}: fetched {} orders", self.channel, page.orders.len());
                Ok(page.orders.into_iter().map(|o| o.into_remote_order()).collect())
            },
            Err(e @ (ChannelError::AuthenticationRequired { .. } | ChannelError::Transient(_))) => Err(e),
            Err(e) => {
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
        let url = self.url(&format!("/api/v1/products/{sku}/inventory"));
        debug!("🛒️ {}: setting stock for {sku} to {quantity}", self.channel);
        let body = serde_json::json!({ "stock_quantity": quantity.value() });
        let req = self.client.put(url).bearer_auth(access_token).json(&body);
        send_listing_request(&self.channel, sku, req).await?;
        info!("🛒️ {}: stock for {sku} set to {quantity}", self.channel);
        Ok(PushOutcome::Accepted)
    }

    async fn delete_listing(&self, access_token: &str, sku: &Sku) -> Result<(), ChannelError> {
        let url = self.url(&format!("/api/v1/products/{sku}/listing"));
        debug!("🛒️ {}: unlisting {sku}", self.channel);
        let req = self.client.delete(url).bearer_auth(access_token);
        send_listing_request(&self.channel, sku, req).await?;
        info!("🛒️ {}: {sku} unlisted", self.channel);
        Ok(())
    }
}
