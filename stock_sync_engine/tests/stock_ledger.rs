use ssg_common::Quantity;
use stock_sync_engine::{
    db_types::{ChannelId, Sku},
    traits::{StockLedger, StockLedgerError},
};

mod support;

use support::prepare_env::{setup, tear_down};

#[tokio::test]
async fn decrement_is_clamped_at_zero() {
    let db = setup().await;
    let sku = Sku::from("X1");
    db.upsert_stock_item(&sku, Quantity::from(5)).await.unwrap();

    let remaining = db.decrement_stock(&sku, Quantity::from(2)).await.unwrap();
    assert_eq!(remaining, Some(Quantity::from(3)));

    // A decrement larger than the remaining stock floors at zero instead of going negative.
    let remaining = db.decrement_stock(&sku, Quantity::from(10)).await.unwrap();
    assert_eq!(remaining, Some(Quantity::from(0)));

    let item = db.stock_on_hand(&sku).await.unwrap().unwrap();
    assert_eq!(item.stock_quantity, Quantity::from(0));
    tear_down(db).await;
}

#[tokio::test]
async fn decrement_of_unknown_sku_is_a_noop() {
    let db = setup().await;
    let remaining = db.decrement_stock(&Sku::from("GHOST"), Quantity::from(1)).await.unwrap();
    assert_eq!(remaining, None);
    tear_down(db).await;
}

#[tokio::test]
async fn concurrent_decrements_never_go_negative() {
    let db = setup().await;
    let sku = Sku::from("X1");
    db.upsert_stock_item(&sku, Quantity::from(5)).await.unwrap();

    // Two channel passes racing on the same stock row. The conditional update makes any interleaving safe.
    let d1 = db.decrement_stock(&sku, Quantity::from(3));
    let d2 = db.decrement_stock(&sku, Quantity::from(3));
    let (r1, r2) = tokio::join!(d1, d2);
    let r1 = r1.unwrap().unwrap();
    let r2 = r2.unwrap().unwrap();
    assert!(r1.value() >= 0 && r2.value() >= 0);

    let item = db.stock_on_hand(&sku).await.unwrap().unwrap();
    assert_eq!(item.stock_quantity, Quantity::from(0));
    tear_down(db).await;
}

#[tokio::test]
async fn set_stock_requires_an_existing_sku() {
    let db = setup().await;
    let result = db.set_stock(&Sku::from("GHOST"), Quantity::from(7)).await;
    assert!(matches!(result, Err(StockLedgerError::SkuNotFound(_))));

    let sku = Sku::from("X2");
    db.upsert_stock_item(&sku, Quantity::from(1)).await.unwrap();
    let quantity = db.set_stock(&sku, Quantity::from(7)).await.unwrap();
    assert_eq!(quantity, Quantity::from(7));
    tear_down(db).await;
}

#[tokio::test]
async fn listings_track_which_channels_carry_a_sku() {
    let db = setup().await;
    let sku = Sku::from("X1");
    db.upsert_stock_item(&sku, Quantity::from(5)).await.unwrap();
    db.upsert_listing(&sku, &ChannelId::from("allegro-main"), true).await.unwrap();
    db.upsert_listing(&sku, &ChannelId::from("erli"), true).await.unwrap();
    db.upsert_listing(&sku, &ChannelId::from("empik"), true).await.unwrap();

    let listed = db.listed_channels(&sku).await.unwrap();
    assert_eq!(listed, vec![ChannelId::from("allegro-main"), ChannelId::from("empik"), ChannelId::from("erli")]);

    // Delisting drops the channel from the propagation set.
    db.upsert_listing(&sku, &ChannelId::from("empik"), false).await.unwrap();
    let listed = db.listed_channels(&sku).await.unwrap();
    assert_eq!(listed, vec![ChannelId::from("allegro-main"), ChannelId::from("erli")]);
    tear_down(db).await;
}
