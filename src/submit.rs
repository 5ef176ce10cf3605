//! Submit command handler: the producer-side collaborator.
//!
//! Publishes one order event per invocation, the way the checkout API would
//! enqueue one message per line item.

use anyhow::Result;
use clap::Parser;
use kafka_producer::OrderPublisher;
use order_types::{Decimal, OrderMessage};

/// Arguments for publishing a single line-item order.
#[derive(Debug, Clone, Parser)]
pub struct SubmitArgs {
    /// Kafka brokers (comma-separated or multiple --brokers)
    #[clap(long, value_delimiter = ',', required = true)]
    pub brokers: Vec<String>,
    /// Topic to publish order events to
    #[clap(long, default_value = "orders")]
    pub topic: String,
    /// Order ID (defaults to a random UUID)
    #[clap(long)]
    pub order_id: Option<String>,
    /// Product to order
    #[clap(long)]
    pub product_id: i64,
    /// Quantity to order
    #[clap(long)]
    pub quantity: i64,
    /// Unit price, e.g. 29.99
    #[clap(long)]
    pub unit_price: Decimal,
}

pub async fn run(args: SubmitArgs) -> Result<()> {
    let order = OrderMessage {
        order_id: args
            .order_id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        product_id: args.product_id,
        quantity: args.quantity,
        unit_price: args.unit_price,
    };

    let publisher = OrderPublisher::new(&args.brokers.join(",")).await?;
    publisher.submit_order(&args.topic, &order).await?;

    tracing::info!("Submitted order {} to topic {}", order.order_id, args.topic);
    Ok(())
}
