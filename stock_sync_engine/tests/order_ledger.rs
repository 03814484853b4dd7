use chrono::Utc;
use ssg_common::Quantity;
use stock_sync_engine::{
    db_types::{ChannelId, ExternalOrderId, NewExternalOrder, Sku},
    traits::{InsertOrderResult, OrderLedger},
};

mod support;

use support::prepare_env::{setup, tear_down};

fn order(channel: &str, id: &str) -> NewExternalOrder {
    NewExternalOrder::new(ChannelId::from(channel), ExternalOrderId::from(id), Utc::now())
        .with_status("READY_FOR_PROCESSING")
        .with_line(Sku::from("X1"), Quantity::from(2))
        .with_line(Sku::from("X2"), Quantity::from(1))
}

#[tokio::test]
async fn the_same_order_is_ingested_at_most_once() {
    let db = setup().await;
    let first = db.insert_order(order("allegro-main", "A-1001")).await.unwrap();
    let id = match first {
        InsertOrderResult::Inserted(id) => id,
        InsertOrderResult::AlreadyProcessed => panic!("first insert must succeed"),
    };

    // The same order arriving from an overlapping window writes nothing.
    let second = db.insert_order(order("allegro-main", "A-1001")).await.unwrap();
    assert_eq!(second, InsertOrderResult::AlreadyProcessed);

    let lines = db.order_lines(id).await.unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].sku, Sku::from("X1"));
    assert_eq!(lines[0].quantity, Quantity::from(2));
    tear_down(db).await;
}

#[tokio::test]
async fn the_idempotency_key_is_scoped_per_channel() {
    let db = setup().await;
    // The same external id on two different channels is two different orders.
    let first = db.insert_order(order("allegro-main", "1001")).await.unwrap();
    let second = db.insert_order(order("erli", "1001")).await.unwrap();
    assert!(first.was_inserted());
    assert!(second.was_inserted());

    let known = db.known_order_ids(&ChannelId::from("allegro-main")).await.unwrap();
    assert_eq!(known.len(), 1);
    assert!(known.contains(&ExternalOrderId::from("1001")));
    tear_down(db).await;
}

#[tokio::test]
async fn ingested_orders_can_be_looked_up() {
    let db = setup().await;
    db.insert_order(order("erli", "E-7")).await.unwrap();

    let found = db.fetch_order(&ChannelId::from("erli"), &ExternalOrderId::from("E-7")).await.unwrap();
    let record = found.expect("order should exist");
    assert_eq!(record.status, "READY_FOR_PROCESSING");

    let missing = db.fetch_order(&ChannelId::from("erli"), &ExternalOrderId::from("E-8")).await.unwrap();
    assert!(missing.is_none());
    tear_down(db).await;
}
