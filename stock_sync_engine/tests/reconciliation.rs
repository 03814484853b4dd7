//! End-to-end reconciliation passes against a real SQLite store, with mocked channel clients.
use std::sync::Arc;

use chrono::Duration;
use ssg_common::Quantity;
use stock_sync_engine::{
    db_types::{ChannelId, ExternalOrderId, Sku, SyncOperation, SyncStatus},
    events::EventProducers,
    registry::ChannelRegistry,
    retry::RetryPolicy,
    traits::{
        AlertStore,
        ChannelError,
        CredentialStore,
        LeaseStore,
        OrderLedger,
        PushOutcome,
        StockLedger,
        SyncLogQuery,
        SyncLogStore,
    },
    Reconciler,
    SqliteDatabase,
};

mod support;

use support::{
    mock_channel::{bare_mock, remote_order, seed_credential, MockChannel},
    prepare_env::{setup, tear_down},
};

async fn seed_stock(db: &SqliteDatabase, sku: &str, quantity: i64, channels: &[&str]) {
    let sku = Sku::from(sku);
    db.upsert_stock_item(&sku, Quantity::from(quantity)).await.unwrap();
    for channel in channels {
        db.upsert_listing(&sku, &ChannelId::from(*channel), true).await.unwrap();
    }
}

fn registry_of(mocks: Vec<MockChannel>) -> ChannelRegistry {
    let mut registry = ChannelRegistry::new();
    for mock in mocks {
        registry.register(Arc::new(mock));
    }
    registry
}

fn reconciler(db: &SqliteDatabase, registry: ChannelRegistry) -> Reconciler<SqliteDatabase> {
    Reconciler::new(db.clone(), registry, EventProducers::default()).with_retry_policy(RetryPolicy::no_delay(3))
}

#[tokio::test]
async fn a_new_order_decrements_stock_and_propagates_to_siblings() {
    let db = setup().await;
    seed_stock(&db, "X1", 5, &["allegro-main", "erli", "storefront"]).await;
    for channel in ["allegro-main", "erli", "storefront"] {
        seed_credential(&db, channel, 60).await;
    }

    let mut source = bare_mock("allegro-main");
    source.expect_fetch_recent_orders().times(1).returning(|_, _| Ok(vec![remote_order("A-1001", &[("X1", 2)])]));
    let mut erli = bare_mock("erli");
    erli.expect_push_stock_update()
        .times(1)
        .withf(|_, sku, quantity| sku.as_str() == "X1" && quantity.value() == 3)
        .returning(|_, _, _| Ok(PushOutcome::Accepted));
    let mut storefront = bare_mock("storefront");
    storefront
        .expect_push_stock_update()
        .times(1)
        .withf(|_, sku, quantity| sku.as_str() == "X1" && quantity.value() == 3)
        .returning(|_, _, _| Ok(PushOutcome::Accepted));

    let rec = reconciler(&db, registry_of(vec![source, erli, storefront]));
    let summary = rec.run_pass(&ChannelId::from("allegro-main")).await;

    assert_eq!(summary.new_orders, 1);
    assert!(summary.is_clean(), "unexpected errors: {:?}", summary.errors);
    let item = db.stock_on_hand(&Sku::from("X1")).await.unwrap().unwrap();
    assert_eq!(item.stock_quantity, Quantity::from(3));
    let record = db.fetch_order(&ChannelId::from("allegro-main"), &ExternalOrderId::from("A-1001")).await.unwrap();
    assert!(record.is_some());
    tear_down(db).await;
}

#[tokio::test]
async fn refetching_an_ingested_order_changes_nothing() {
    let db = setup().await;
    seed_stock(&db, "X1", 5, &["allegro-main", "erli"]).await;
    seed_credential(&db, "allegro-main", 60).await;
    seed_credential(&db, "erli", 60).await;

    let mut source = bare_mock("allegro-main");
    // The same order shows up in two consecutive (overlapping) windows.
    source.expect_fetch_recent_orders().times(2).returning(|_, _| Ok(vec![remote_order("A-1001", &[("X1", 2)])]));
    let mut erli = bare_mock("erli");
    erli.expect_push_stock_update().times(1).returning(|_, _, _| Ok(PushOutcome::Accepted));

    let rec = reconciler(&db, registry_of(vec![source, erli]));
    let first = rec.run_pass(&ChannelId::from("allegro-main")).await;
    assert_eq!(first.new_orders, 1);

    let second = rec.run_pass(&ChannelId::from("allegro-main")).await;
    assert_eq!(second.new_orders, 0);
    assert_eq!(second.skipped_duplicates, 1);
    assert!(second.is_clean());

    // Stock was decremented exactly once.
    let item = db.stock_on_hand(&Sku::from("X1")).await.unwrap().unwrap();
    assert_eq!(item.stock_quantity, Quantity::from(3));

    // The dedupe skip is in the audit trail.
    let skips = db
        .search_logs(SyncLogQuery::default().with_channel(ChannelId::from("allegro-main")).with_status(SyncStatus::Info))
        .await
        .unwrap();
    assert!(skips.iter().any(|e| e.message.contains("already-processed")));
    tear_down(db).await;
}

#[tokio::test]
async fn stock_reaching_zero_deletes_the_sibling_listings() {
    let db = setup().await;
    seed_stock(&db, "X1", 2, &["allegro-main", "erli", "storefront"]).await;
    for channel in ["allegro-main", "erli", "storefront"] {
        seed_credential(&db, channel, 60).await;
    }

    let mut source = bare_mock("allegro-main");
    source.expect_fetch_recent_orders().times(1).returning(|_, _| Ok(vec![remote_order("A-1002", &[("X1", 2)])]));
    // Quantity hit zero: every sibling gets a deletion, never a zero-quantity push.
    let mut erli = bare_mock("erli");
    erli.expect_delete_listing().times(1).withf(|_, sku| sku.as_str() == "X1").returning(|_, _| Ok(()));
    let mut storefront = bare_mock("storefront");
    storefront.expect_delete_listing().times(1).withf(|_, sku| sku.as_str() == "X1").returning(|_, _| Ok(()));

    let rec = reconciler(&db, registry_of(vec![source, erli, storefront]));
    let summary = rec.run_pass(&ChannelId::from("allegro-main")).await;
    assert!(summary.is_clean(), "unexpected errors: {:?}", summary.errors);

    let item = db.stock_on_hand(&Sku::from("X1")).await.unwrap().unwrap();
    assert_eq!(item.stock_quantity, Quantity::from(0));
    // The deleted listings are recorded as delisted; only the source channel still lists the SKU.
    let listed = db.listed_channels(&Sku::from("X1")).await.unwrap();
    assert_eq!(listed, vec![ChannelId::from("allegro-main")]);
    tear_down(db).await;
}

#[tokio::test]
async fn a_policy_restricted_push_alerts_the_operator_and_spares_the_rest() {
    let db = setup().await;
    seed_stock(&db, "X1", 5, &["allegro-main", "empik", "storefront"]).await;
    for channel in ["allegro-main", "empik", "storefront"] {
        seed_credential(&db, channel, 60).await;
    }

    let mut source = bare_mock("allegro-main");
    source.expect_fetch_recent_orders().times(1).returning(|_, _| Ok(vec![remote_order("A-1003", &[("X1", 1)])]));
    let mut empik = bare_mock("empik");
    empik.expect_push_stock_update().times(1).returning(|_, _, _| {
        Ok(PushOutcome::PolicyRestricted { reason: "manual changes only".to_string() })
    });
    let mut storefront = bare_mock("storefront");
    storefront.expect_push_stock_update().times(1).returning(|_, _, _| Ok(PushOutcome::Accepted));

    let rec = reconciler(&db, registry_of(vec![source, empik, storefront]));
    let summary = rec.run_pass(&ChannelId::from("allegro-main")).await;

    // A policy restriction is an operator action item, not an error.
    assert!(summary.is_clean(), "unexpected errors: {:?}", summary.errors);
    let alerts = db.recent_alerts(10).await.unwrap();
    assert!(alerts.iter().any(|a| a.title.contains("Manual stock update needed on empik")));
    tear_down(db).await;
}

#[tokio::test]
async fn one_failing_sibling_does_not_stop_the_others() {
    let db = setup().await;
    seed_stock(&db, "X1", 5, &["allegro-main", "erli", "storefront"]).await;
    for channel in ["allegro-main", "erli", "storefront"] {
        seed_credential(&db, channel, 60).await;
    }

    let mut source = bare_mock("allegro-main");
    source.expect_fetch_recent_orders().times(1).returning(|_, _| Ok(vec![remote_order("A-1004", &[("X1", 2)])]));
    // Erli stays down through every retry; the storefront must still receive its push.
    let mut erli = bare_mock("erli");
    erli.expect_push_stock_update()
        .times(3)
        .returning(|_, _, _| Err(ChannelError::Transient("gateway timeout".to_string())));
    let mut storefront = bare_mock("storefront");
    storefront.expect_push_stock_update().times(1).returning(|_, _, _| Ok(PushOutcome::Accepted));

    let rec = reconciler(&db, registry_of(vec![source, erli, storefront]));
    let summary = rec.run_pass(&ChannelId::from("allegro-main")).await;

    // The decrement stands, the failure is reported, and an alert asks the operator to look at Erli.
    let item = db.stock_on_hand(&Sku::from("X1")).await.unwrap().unwrap();
    assert_eq!(item.stock_quantity, Quantity::from(3));
    assert_eq!(summary.errors.len(), 1);
    let alerts = db.recent_alerts(10).await.unwrap();
    assert!(alerts.iter().any(|a| a.title.contains("Stock push to erli failed")));
    tear_down(db).await;
}

#[tokio::test]
async fn a_dead_channel_does_not_drag_down_its_siblings() {
    let db = setup().await;
    // Channel A's token is about to expire and its refresh token has been revoked.
    seed_credential(&db, "allegro-main", 1).await;
    seed_credential(&db, "erli", 60).await;

    let mut dead = bare_mock("allegro-main");
    dead.expect_refresh_access_token().times(1).returning(|_| {
        Err(ChannelError::authentication_required(&ChannelId::from("allegro-main"), "invalid_grant"))
    });
    let mut healthy = bare_mock("erli");
    healthy.expect_fetch_recent_orders().times(1).returning(|_, _| Ok(Vec::new()));

    let rec = reconciler(&db, registry_of(vec![dead, healthy]));
    let summaries = rec.run_all_passes().await;
    assert_eq!(summaries.len(), 2);

    let a = summaries.iter().find(|s| s.channel == ChannelId::from("allegro-main")).unwrap();
    assert_eq!(a.new_orders, 0);
    assert_eq!(a.errors.len(), 1);
    let b = summaries.iter().find(|s| s.channel == ChannelId::from("erli")).unwrap();
    assert!(b.is_clean());

    // The dead channel's credential was invalidated and the failure is in the audit trail.
    let stored = db.fetch_credential(&ChannelId::from("allegro-main")).await.unwrap();
    assert!(stored.is_none());
    let entries = db
        .search_logs(
            SyncLogQuery::default()
                .with_channel(ChannelId::from("allegro-main"))
                .with_operation(SyncOperation::TokenRetrieval)
                .with_status(SyncStatus::Error),
        )
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    tear_down(db).await;
}

#[tokio::test]
async fn a_held_lease_skips_the_pass() {
    let db = setup().await;
    seed_credential(&db, "allegro-main", 60).await;
    let channel = ChannelId::from("allegro-main");
    // Another scheduler instance is mid-pass on this channel.
    let taken = db.try_acquire_lease(&channel, "other-process", Duration::minutes(15)).await.unwrap();
    assert!(taken);

    // No fetch expectation: the skipped pass must not touch the channel at all.
    let source = bare_mock("allegro-main");
    let rec = reconciler(&db, registry_of(vec![source]));
    let summary = rec.run_pass(&channel).await;
    assert_eq!(summary.new_orders, 0);
    assert!(summary.is_clean());

    let skips = db.search_logs(SyncLogQuery::default().with_channel(channel.clone())).await.unwrap();
    assert!(skips.iter().any(|e| e.message.contains("lease already held")));
    tear_down(db).await;
}

#[tokio::test]
async fn a_stale_lease_is_taken_over() {
    let db = setup().await;
    let channel = ChannelId::from("erli");
    assert!(db.try_acquire_lease(&channel, "crashed-process", Duration::minutes(15)).await.unwrap());
    // While the lease is fresh, a second holder is refused.
    assert!(!db.try_acquire_lease(&channel, "replacement", Duration::minutes(15)).await.unwrap());

    tokio::time::sleep(std::time::Duration::from_secs(2)).await;
    // The original holder died without releasing; past the staleness window the lease can be stolen.
    assert!(db.try_acquire_lease(&channel, "replacement", Duration::seconds(1)).await.unwrap());
    db.release_lease(&channel, "replacement").await.unwrap();
    tear_down(db).await;
}
