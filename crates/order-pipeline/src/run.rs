//! The consumption loop: poll -> parse -> process -> finalize.

use crate::outcome::{MessageOutcome, OffsetAction};
use crate::processor::{process, Outcome};
use anyhow::{Context, Result};
use clap::Parser;
use inventory_store::InventoryStore;
use kafka_consumer::{Consumer, ConsumerConfig, Delivery};
use order_types::OrderMessage;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{info, warn};

/// Configuration for the order consumption loop.
#[derive(Debug, Clone, Parser)]
pub struct Config {
    /// Kafka brokers (comma-separated or multiple --brokers)
    #[clap(long, value_delimiter = ',', required = true)]
    pub brokers: Vec<String>,
    /// Consumer group ID
    #[clap(long, default_value = "order-ingest")]
    pub group_id: String,
    /// Topic to consume order events from
    #[clap(long, default_value = "orders")]
    pub topic: String,
    /// Offset reset strategy when the group has no committed offset
    /// ("earliest" or "latest")
    #[clap(long, default_value = "earliest")]
    pub auto_offset_reset: String,
    /// Session timeout in milliseconds
    #[clap(long, default_value = "6000")]
    pub session_timeout_ms: String,
    /// Poll timeout in milliseconds; on expiry the loop simply re-polls
    #[clap(long, default_value_t = 1000)]
    pub poll_timeout_ms: u64,
    /// Pause in milliseconds after a transient failure, before re-polling
    /// the rewound message
    #[clap(long, default_value_t = 1000)]
    pub retry_pause_ms: u64,
    /// Maximum number of messages to finalize before exiting.
    /// When unset, the loop runs until shutdown is signalled.
    #[clap(long)]
    pub max_messages: Option<u64>,
}

impl Config {
    fn consumer_config(&self) -> ConsumerConfig {
        ConsumerConfig {
            brokers: self.brokers.join(","),
            group_id: self.group_id.clone(),
            topic: self.topic.clone(),
            auto_offset_reset: self.auto_offset_reset.clone(),
            session_timeout_ms: self.session_timeout_ms.clone(),
            enable_auto_commit: false,
        }
    }
}

/// Run the consumption loop until shutdown is signalled or `max_messages`
/// messages have been finalized.
///
/// Shutdown is observed only at the poll point: a message that has been
/// polled is always carried through to its finalize decision first, so the
/// committed offsets stay consistent with what was actually applied.
///
/// An error while committing an offset is fatal and propagates out;
/// continuing with unknown offset state could silently lose or duplicate
/// orders.
pub async fn run_consumer_loop<S: InventoryStore>(
    store: &mut S,
    config: Config,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let consumer =
        Consumer::new(config.consumer_config()).context("Failed to create Kafka consumer")?;

    info!(
        topic = %config.topic,
        group_id = %config.group_id,
        "order consumption loop started"
    );

    let poll_timeout = Duration::from_millis(config.poll_timeout_ms);
    let retry_pause = Duration::from_millis(config.retry_pause_ms);
    let mut finalized: u64 = 0;

    loop {
        if let Some(max) = config.max_messages {
            if finalized >= max {
                info!("Reached max_messages limit ({max}), stopping");
                break;
            }
        }

        let delivery = tokio::select! {
            biased;
            _ = shutdown.changed() => {
                info!("Shutdown signalled, stopping after {finalized} finalized messages");
                break;
            }
            polled = consumer.poll(poll_timeout) => {
                match polled.context("Failed polling Kafka")? {
                    Some(delivery) => delivery,
                    // Poll timeout with nothing to read; re-poll.
                    None => continue,
                }
            }
        };

        let outcome = handle_message(store, &delivery).await;

        match outcome.offset_action() {
            OffsetAction::Commit => {
                consumer
                    .commit(&delivery)
                    .context("Failed to commit offset; aborting to avoid ambiguous offset state")?;
                finalized += 1;
            }
            OffsetAction::Withhold => {
                consumer
                    .rewind(&delivery)
                    .context("Failed to rewind partition for redelivery")?;
                sleep(retry_pause).await;
            }
        }
    }

    Ok(())
}

/// Carry one delivery from Received through Processed, classifying the
/// result.
///
/// Never returns an error: whatever happens inside parsing or processing
/// ends up as one of the four outcomes, so the caller always reaches a
/// finalize decision.
pub(crate) async fn handle_message<S: InventoryStore>(
    store: &mut S,
    delivery: &Delivery,
) -> MessageOutcome {
    let order = match OrderMessage::parse(&delivery.payload) {
        Ok(order) => order,
        Err(e) => {
            warn!(
                partition = delivery.partition,
                offset = delivery.offset,
                "dropping malformed message: {e}"
            );
            return MessageOutcome::Malformed(e);
        }
    };

    info!(
        order_id = %order.order_id,
        product_id = order.product_id,
        quantity = order.quantity,
        "processing order"
    );

    match process(store, &order).await {
        Outcome::Applied { new_quantity } => {
            info!(order_id = %order.order_id, new_quantity, "order applied");
            MessageOutcome::Applied {
                order_id: order.order_id,
                new_quantity,
            }
        }
        Outcome::Rejected(rejection) => {
            warn!(order_id = %order.order_id, "order rejected: {rejection}");
            MessageOutcome::Rejected {
                order_id: order.order_id,
                rejection,
            }
        }
        Outcome::Transient(e) => {
            warn!(
                order_id = %order.order_id,
                "transient failure, message will be redelivered: {e}"
            );
            MessageOutcome::Transient(e)
        }
    }
}
