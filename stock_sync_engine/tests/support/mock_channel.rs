use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mockall::mock;
use ssg_common::Quantity;
use stock_sync_engine::{
    db_types::{ChannelId, ExternalOrderId, Sku, TokenPair},
    traits::{ChannelClient, ChannelError, CredentialStore, PushOutcome, RemoteLineItem, RemoteOrder},
    SqliteDatabase,
};

mock! {
    pub Channel {}

    #[async_trait]
    impl ChannelClient for Channel {
        fn channel(&self) -> &ChannelId;
        async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenPair, ChannelError>;
        async fn fetch_recent_orders(
            &self,
            access_token: &str,
            since: DateTime<Utc>,
        ) -> Result<Vec<RemoteOrder>, ChannelError>;
        async fn push_stock_update(
            &self,
            access_token: &str,
            sku: &Sku,
            quantity: Quantity,
        ) -> Result<PushOutcome, ChannelError>;
        async fn delete_listing(&self, access_token: &str, sku: &Sku) -> Result<(), ChannelError>;
    }
}

/// A mock that identifies as `channel` and has no other expectations.
pub fn bare_mock(channel: &str) -> MockChannel {
    let mut mock = MockChannel::new();
    mock.expect_channel().return_const(ChannelId::from(channel));
    mock
}

pub fn remote_order(id: &str, lines: &[(&str, i64)]) -> RemoteOrder {
    RemoteOrder {
        external_order_id: ExternalOrderId::from(id),
        created_at: Utc::now(),
        status: "READY_FOR_PROCESSING".to_string(),
        line_items: lines
            .iter()
            .map(|(sku, quantity)| RemoteLineItem { sku: Sku::from(*sku), quantity: Quantity::from(*quantity) })
            .collect(),
    }
}

/// Stores a credential for `channel` whose access token is valid for another `minutes_valid` minutes.
pub async fn seed_credential(db: &SqliteDatabase, channel: &str, minutes_valid: i64) {
    let pair = TokenPair {
        access_token: format!("{channel}-token"),
        refresh_token: format!("{channel}-refresh"),
        expires_at: Utc::now() + Duration::minutes(minutes_valid),
    };
    db.store_credential(&ChannelId::from(channel), &pair).await.expect("Error seeding credential");
}
