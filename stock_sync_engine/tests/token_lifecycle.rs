use chrono::{Duration, Utc};
use stock_sync_engine::{
    db_types::{ChannelId, TokenPair},
    retry::RetryPolicy,
    traits::{ChannelError, CredentialStore},
    TokenApi,
    TokenApiError,
};

mod support;

use support::{
    mock_channel::{bare_mock, seed_credential},
    prepare_env::{setup, tear_down},
};

#[tokio::test]
async fn a_fresh_token_is_served_from_the_store() {
    let db = setup().await;
    seed_credential(&db, "allegro-main", 60).await;
    // No refresh expectation: touching the channel here would fail the test.
    let client = bare_mock("allegro-main");
    let api = TokenApi::new(db.clone());

    let token = api.valid_token(&client).await.unwrap();
    assert_eq!(token, "allegro-main-token");
    tear_down(db).await;
}

#[tokio::test]
async fn a_token_close_to_expiry_is_refreshed_and_persisted() {
    let db = setup().await;
    // One minute of validity left, inside the five-minute safety margin.
    seed_credential(&db, "allegro-main", 1).await;
    let mut client = bare_mock("allegro-main");
    client.expect_refresh_access_token().times(1).withf(|rt| rt == "allegro-main-refresh").returning(|_| {
        Ok(TokenPair {
            access_token: "fresh-token".to_string(),
            refresh_token: "fresh-refresh".to_string(),
            expires_at: Utc::now() + Duration::hours(12),
        })
    });
    let api = TokenApi::new(db.clone());

    let token = api.valid_token(&client).await.unwrap();
    assert_eq!(token, "fresh-token");

    let stored = db.fetch_credential(&ChannelId::from("allegro-main")).await.unwrap().unwrap();
    assert_eq!(stored.access_token, "fresh-token");
    assert_eq!(stored.refresh_token, "fresh-refresh");
    tear_down(db).await;
}

#[tokio::test]
async fn a_rejected_refresh_invalidates_the_credential() {
    let db = setup().await;
    seed_credential(&db, "allegro-main", 1).await;
    let mut client = bare_mock("allegro-main");
    client.expect_refresh_access_token().times(1).returning(|_| {
        Err(ChannelError::authentication_required(&ChannelId::from("allegro-main"), "invalid_grant"))
    });
    let api = TokenApi::new(db.clone());

    let result = api.valid_token(&client).await;
    assert!(matches!(result, Err(TokenApiError::AuthenticationRequired(_))));

    // The credential is gone: the next sync will demand a fresh authorization handshake.
    let stored = db.fetch_credential(&ChannelId::from("allegro-main")).await.unwrap();
    assert!(stored.is_none());
    tear_down(db).await;
}

#[tokio::test]
async fn a_missing_credential_requires_authorization() {
    let db = setup().await;
    let client = bare_mock("erli");
    let api = TokenApi::new(db.clone());
    let result = api.valid_token(&client).await;
    assert!(matches!(result, Err(TokenApiError::AuthenticationRequired(c)) if c == ChannelId::from("erli")));
    tear_down(db).await;
}

#[tokio::test]
async fn transient_refresh_failures_are_retried_then_surfaced() {
    let db = setup().await;
    seed_credential(&db, "allegro-main", 1).await;
    let mut client = bare_mock("allegro-main");
    client
        .expect_refresh_access_token()
        .times(3)
        .returning(|_| Err(ChannelError::Transient("auth host unreachable".to_string())));
    let api = TokenApi::new(db.clone()).with_retry_policy(RetryPolicy::no_delay(3));

    let result = api.valid_token(&client).await;
    assert!(matches!(result, Err(TokenApiError::Refresh(ChannelError::Transient(_)))));

    // Transient trouble is not an invalid grant: the credential must survive.
    let stored = db.fetch_credential(&ChannelId::from("allegro-main")).await.unwrap();
    assert!(stored.is_some());
    tear_down(db).await;
}
