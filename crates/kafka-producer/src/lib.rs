//! Kafka publisher for order events.
//!
//! The collaborator interface exposed to the (out-of-scope) checkout API:
//! one JSON-encoded message per line item, keyed by order ID. Also carries
//! the topic-management and raw-payload helpers the E2E tests use to drive
//! the consumer, including deliberately malformed payloads.
//!
//! Producer-side input is not validated here beyond what the type system
//! enforces. The consume side re-validates every field - the two sides do
//! not trust each other.

use anyhow::{Context, Result};
use order_types::OrderMessage;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::ClientConfig;
use std::time::Duration;

/// Kafka producer wrapper publishing order events.
pub struct OrderPublisher {
    producer: FutureProducer,
    broker: String,
}

impl OrderPublisher {
    /// Create a new order publisher.
    pub async fn new(broker: &str) -> Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", broker)
            .set("message.timeout.ms", "5000")
            .create()
            .context("Failed to create Kafka producer")?;

        Ok(Self {
            producer,
            broker: broker.to_string(),
        })
    }

    /// Create a Kafka topic if it doesn't exist.
    pub async fn create_topic_if_not_exists(&self, topic: &str, partitions: i32) -> Result<()> {
        let admin_client: AdminClient<DefaultClientContext> = ClientConfig::new()
            .set("bootstrap.servers", &self.broker)
            .create()
            .context("Failed to create admin client")?;

        let new_topic = NewTopic::new(topic, partitions, TopicReplication::Fixed(1));
        let opts = AdminOptions::new().operation_timeout(Some(Duration::from_secs(5)));

        match admin_client.create_topics(&[new_topic], &opts).await {
            Ok(results) => {
                for result in results {
                    match result {
                        Ok(topic_name) => {
                            tracing::info!("Topic '{topic_name}' created successfully");
                        }
                        Err((topic_name, err)) => {
                            if err.to_string().contains("already exists") {
                                tracing::info!("Topic '{topic_name}' already exists");
                            } else {
                                return Err(anyhow::anyhow!("Failed to create topic: {err}"));
                            }
                        }
                    }
                }
            }
            Err(e) => return Err(anyhow::anyhow!("Failed to create topics: {e}")),
        }

        Ok(())
    }

    /// Publish one line-item order, keyed by its order ID.
    pub async fn submit_order(&self, topic: &str, order: &OrderMessage) -> Result<()> {
        let payload = serde_json::to_vec(order).context("Failed to encode order message")?;

        self.publish_raw(topic, order.order_id.as_bytes(), &payload)
            .await?;

        tracing::debug!("Published order message: {}", order.order_id);
        Ok(())
    }

    /// Publish an arbitrary payload.
    ///
    /// The consumer re-validates everything it reads, so tests use this to
    /// enqueue malformed payloads and exercise the poison-message path.
    pub async fn publish_raw(&self, topic: &str, key: &[u8], payload: &[u8]) -> Result<()> {
        let record = FutureRecord::to(topic).key(key).payload(payload);

        self.producer
            .send(record, Duration::from_secs(5))
            .await
            .map_err(|(err, _)| err)
            .context("Failed to send message to Kafka")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use order_types::OrderMessage;

    #[test]
    fn order_encodes_to_the_wire_format() {
        let order = OrderMessage {
            order_id: "order-001".to_string(),
            product_id: 7,
            quantity: 2,
            unit_price: "29.99".parse().unwrap(),
        };

        let payload = serde_json::to_vec(&order).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&payload).unwrap();

        assert_eq!(value["order_id"], "order-001");
        assert_eq!(value["product_id"], 7);
        assert_eq!(value["quantity"], 2);
        assert!(value["unit_price"].is_number());
    }

    #[test]
    fn published_orders_pass_consumer_validation() {
        // Defense in depth: both sides validate independently, but what the
        // publisher emits must at least be acceptable to the consumer.
        let order = OrderMessage {
            order_id: "order-002".to_string(),
            product_id: 3,
            quantity: 1,
            unit_price: "12.50".parse().unwrap(),
        };

        let payload = serde_json::to_vec(&order).unwrap();
        let parsed = OrderMessage::parse(&payload).unwrap();
        assert_eq!(parsed.order_id, order.order_id);
        assert_eq!(parsed.product_id, order.product_id);
        assert_eq!(parsed.quantity, order.quantity);
        assert_eq!(parsed.unit_price, order.unit_price);
    }
}
