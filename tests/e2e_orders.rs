//! Order pipeline E2E tests
//!
//! These tests validate the full consume path against live services:
//! publish order events to Kafka, run the consumption loop, and assert the
//! resulting store state and offset progress.
//!
//! Requires Kafka and PostgreSQL (the DevContainer services); endpoints can
//! be overridden via `KAFKA_BROKER` and `DATABASE_URL`. Topics, consumer
//! groups, and product IDs are unique per run so parallel executions do not
//! collide.

use std::time::Duration;

use inventory_store::{MemoryStore, PostgresStore};
use kafka_producer::OrderPublisher;
use order_ingest::testing::{
    cleanup_products, connect_postgres, create_schema, database_url, generate_test_id,
    kafka_broker, sales_for_order, seed_product, stock_of,
};
use order_types::OrderMessage;
use tokio::sync::watch;

fn test_config(topic: &str, group_id: &str, max_messages: u64) -> order_pipeline::Config {
    order_pipeline::Config {
        brokers: vec![kafka_broker()],
        group_id: group_id.to_string(),
        topic: topic.to_string(),
        auto_offset_reset: "earliest".to_string(),
        session_timeout_ms: "6000".to_string(),
        poll_timeout_ms: 1000,
        retry_pause_ms: 100,
        max_messages: Some(max_messages),
    }
}

#[tokio::test]
async fn test_order_pipeline_e2e() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for debug output
    tracing_subscriber::fmt()
        .with_env_filter("order_ingest=debug,order_pipeline=debug,kafka_consumer=debug")
        .try_init()
        .ok();

    let test_id = generate_test_id();
    let topic = format!("test-orders-{test_id}");
    let group_id = format!("test-group-{test_id}");

    // Product IDs unique per run so parallel tests don't collide.
    let product_a = (test_id % 1_000_000_000) as i64 * 10 + 1;
    let product_b = product_a + 1;
    let missing_product = product_a + 2;

    let client = connect_postgres().await?;
    create_schema(&client).await?;
    cleanup_products(&client, &[product_a, product_b, missing_product]).await?;
    seed_product(&client, product_a, 10).await?;
    seed_product(&client, product_b, 2).await?;

    // Step 1: publish a mix of valid, rejectable, and malformed messages.
    let producer = OrderPublisher::new(&kafka_broker()).await?;
    producer.create_topic_if_not_exists(&topic, 1).await?;

    // Give Kafka a moment to propagate topic metadata
    tokio::time::sleep(Duration::from_millis(500)).await;

    let applied = OrderMessage {
        order_id: format!("order-applied-{test_id}"),
        product_id: product_a,
        quantity: 4,
        unit_price: "29.99".parse()?,
    };
    producer.submit_order(&topic, &applied).await?;

    let rejected = OrderMessage {
        order_id: format!("order-rejected-{test_id}"),
        product_id: product_b,
        quantity: 5,
        unit_price: "10.00".parse()?,
    };
    producer.submit_order(&topic, &rejected).await?;

    let unknown = OrderMessage {
        order_id: format!("order-unknown-{test_id}"),
        product_id: missing_product,
        quantity: 1,
        unit_price: "5.00".parse()?,
    };
    producer.submit_order(&topic, &unknown).await?;

    // Missing unit_price: a poison message the loop must commit past.
    producer
        .publish_raw(
            &topic,
            b"poison",
            br#"{"order_id": "order-poison", "product_id": 1, "quantity": 1}"#,
        )
        .await?;

    // Step 2: run the loop until all four messages are finalized.
    let config = test_config(&topic, &group_id, 4);
    let mut store = PostgresStore::connect(&database_url()).await?;
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::time::timeout(
        Duration::from_secs(30),
        order_pipeline::run_consumer_loop(&mut store, config.clone(), shutdown_rx),
    )
    .await??;

    // Step 3: applied order decremented stock 10 -> 6 and recorded exactly
    // one sale with subtotal 4 x 29.99.
    assert_eq!(stock_of(&client, product_a).await?, Some(6));
    let sales = sales_for_order(&client, &applied.order_id).await?;
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].0, 4);
    assert_eq!(sales[0].1, "29.99".parse::<rust_decimal::Decimal>()?);
    assert_eq!(sales[0].2, "119.96".parse::<rust_decimal::Decimal>()?);

    // Rejected and unknown orders left no trace.
    assert_eq!(stock_of(&client, product_b).await?, Some(2));
    assert!(sales_for_order(&client, &rejected.order_id).await?.is_empty());
    assert_eq!(stock_of(&client, missing_product).await?, None);
    assert!(sales_for_order(&client, &unknown.order_id).await?.is_empty());

    // Step 4: every offset was committed, including the rejected and poison
    // messages. A fresh consumer in the same group finds nothing to read -
    // redelivery after a committed outcome is impossible by construction -
    // so a bounded rerun times out instead of finalizing a message.
    let rerun_config = order_pipeline::Config {
        max_messages: Some(1),
        ..config
    };
    let (_rerun_tx, rerun_rx) = watch::channel(false);
    let rerun = tokio::time::timeout(
        Duration::from_secs(10),
        order_pipeline::run_consumer_loop(&mut store, rerun_config, rerun_rx),
    )
    .await;
    assert!(
        rerun.is_err(),
        "a finalized message was redelivered to the same group"
    );

    Ok(())
}

#[tokio::test]
async fn test_transient_fault_redelivers_same_message() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("order_pipeline=debug,kafka_consumer=debug")
        .try_init()
        .ok();

    let test_id = generate_test_id();
    let topic = format!("test-orders-transient-{test_id}");
    let group_id = format!("test-group-transient-{test_id}");

    let producer = OrderPublisher::new(&kafka_broker()).await?;
    producer.create_topic_if_not_exists(&topic, 1).await?;
    tokio::time::sleep(Duration::from_millis(500)).await;

    let order = OrderMessage {
        order_id: format!("order-transient-{test_id}"),
        product_id: 7,
        quantity: 4,
        unit_price: "29.99".parse()?,
    };
    producer.submit_order(&topic, &order).await?;

    // Arm the store so the first attempt fails with an infrastructure
    // fault. The loop must withhold the offset, rewind, and apply the same
    // message on redelivery - finalizing exactly one message in total.
    let mut store = MemoryStore::new().with_stock(7, 10);
    store.fail_next_with("injected connectivity fault");

    let config = test_config(&topic, &group_id, 1);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::time::timeout(
        Duration::from_secs(30),
        order_pipeline::run_consumer_loop(&mut store, config, shutdown_rx),
    )
    .await??;

    // The order was applied on the second delivery of the same message.
    assert_eq!(store.stock_of(7), Some(6));
    let sales = store.sales();
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].order_id, order.order_id);
    assert_eq!(sales[0].subtotal, "119.96".parse::<rust_decimal::Decimal>()?);

    Ok(())
}
