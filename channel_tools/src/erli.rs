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
    config::ErliConfig,
    data_objects::ErliOrderPage,
    helpers::{build_client, refresh_oauth_token, send_json, send_listing_request},
    ConnectorError,
    ERLI,
};

#[derive(Clone)]
pub struct ErliApi {
    channel: ChannelId,
    config: ErliConfig,
    client: Arc<Client>,
}

impl ErliApi {
    pub fn new(config: ErliConfig) -> Result<Self, ConnectorError> {
        let client = build_client()?;
        Ok(Self { channel: ChannelId::from(ERLI), config, client: Arc::new(client) })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }
}

#[async_trait]
impl ChannelClient for ErliApi {
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
        let url = self.url("/v1/orders");
        debug!("🛒️ {}: fetching orders created since {since}", self.channel);
        let req = self.client.get(url).bearer_auth(access_token).query(&[("created_from", since.to_rfc3339())]);
        match send_json::<ErliOrderPage>(&self.channel, req).await {
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
        let url = self.url(&format!("/v1/listings/{sku}/stock"));
        debug!("🛒️ {}: setting stock for {sku} to {quantity}", self.channel);
        let body = serde_json::json!({ "stock": quantity.value() });
        let req = self.client.put(url).bearer_auth(access_token).json(&body);
        send_listing_request(&self.channel, sku, req).await?;
        info!("🛒️ {}: stock for {sku} set to {quantity}", self.channel);
        Ok(PushOutcome::Accepted)
    }

    async fn delete_listing(&self, access_token: &str, sku: &Sku) -> Result<(), ChannelError> {
        let url = self.url(&format!("/v1/listings/{sku}"));
        debug!("🛒️ {}: removing listing for {sku}", self.channel);
        let req = self.client.delete(url).bearer_auth(access_token);
        send_listing_request(&self.channel, sku, req).await?;
        info!("🛒️ {}: listing for {sku} removed", self.channel);
        Ok(())
    }
}
