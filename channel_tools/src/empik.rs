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
    config::EmpikConfig,
    data_objects::EmpikOrderList,
    helpers::{build_client, refresh_oauth_token, send_json, send_listing_request},
    ConnectorError,
    EMPIK,
};

/// The Empik marketplace. Empik's seller terms forbid automated stock changes on live offers: a push of any
/// positive quantity reports [`PushOutcome::PolicyRestricted`] without calling the API, and the caller raises a
/// manual-action alert instead. Withdrawing an offer whose stock reached zero is the one automated path that is
/// allowed.
#[derive(Clone)]
pub struct EmpikApi {
    channel: ChannelId,
    config: EmpikConfig,
    client: Arc<Client>,
}

impl EmpikApi {
    pub fn new(config: EmpikConfig) -> Result<Self, ConnectorError> {
        let client = build_client()?;
        Ok(Self { channel: ChannelId::from(EMPIK), config, client: Arc::new(client) })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }
}

#[async_trait]
impl ChannelClient for EmpikApi {
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
        let url = self.url("/orders");
        debug!("🛒️ {}: fetching orders created since {since}", self.channel);
        let req = self.client.get(url).bearer_auth(access_token).query(&[("from", since.to_rfc3339())]);
        match send_json::<EmpikOrderList>(&self.channel, req).await {
            Ok(list) => {
                info!("🛒️ {}: fetched {} orders", self.channel, list.orders.len());
                Ok(list.orders.into_iter().map(|o| o.into_remote_order()).collect())
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
        _access_token: &str,
        sku: &Sku,
        quantity: Quantity,
    ) -> Result<PushOutcome, ChannelError> {
        debug!("🛒️ {}: automated stock change for {sku} (to {quantity}) is not permitted", self.channel);
        Ok(PushOutcome::PolicyRestricted {
            reason: "Empik offers only accept manual stock changes through the seller panel".to_string(),
        })
    }

    async fn delete_listing(&self, access_token: &str, sku: &Sku) -> Result<(), ChannelError> {
        let url = self.url(&format!("/offers/{sku}"));
        debug!("🛒️ {}: withdrawing offer for {sku}", self.channel);
        let req = self.client.delete(url).bearer_auth(access_token);
        send_listing_request(&self.channel, sku, req).await?;
        info!("🛒️ {}: offer for {sku} withdrawn", self.channel);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn positive_pushes_are_policy_restricted_without_touching_the_network() {
        // base_url points nowhere; if the client attempted an HTTP call, this would fail on connect.
        let config = EmpikConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            auth_url: "http://127.0.0.1:1".to_string(),
            ..Default::default()
        };
        let api = EmpikApi::new(config).unwrap();
        let outcome = api.push_stock_update("token", &Sku::from("SKU-1"), Quantity::from(3)).await.unwrap();
        assert!(matches!(outcome, PushOutcome::PolicyRestricted { .. }));
    }
}
