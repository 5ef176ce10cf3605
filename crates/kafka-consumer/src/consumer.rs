use crate::error::{Error, Result};
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer as RdkafkaConsumer, StreamConsumer};
use rdkafka::message::Message as RdkafkaMessage;
use rdkafka::{Offset, TopicPartitionList};
use std::time::Duration;
use tracing::debug;

/// Configuration for the order consumer.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Kafka brokers (comma-separated list)
    pub brokers: String,
    /// Consumer group ID
    pub group_id: String,
    /// Topic to consume order events from
    pub topic: String,
    /// Auto offset reset strategy ("earliest" or "latest")
    ///
    /// Applied only when the group has no committed offset yet. "earliest"
    /// is the default so a fresh group does not skip orders published before
    /// it first connected.
    pub auto_offset_reset: String,
    /// Session timeout in milliseconds
    pub session_timeout_ms: String,
    /// Enable auto commit.
    ///
    /// Must stay false: offsets are committed explicitly as part of the
    /// consumption loop's finalize step. [`Consumer::new`] rejects a config
    /// with this set to true.
    pub enable_auto_commit: bool,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            group_id: "order-ingest".to_string(),
            topic: "orders".to_string(),
            auto_offset_reset: "earliest".to_string(),
            session_timeout_ms: "6000".to_string(),
            enable_auto_commit: false,
        }
    }
}

/// One record as consumed from the queue, payload undecoded.
///
/// Decoding and validation happen at the loop boundary: the producer side is
/// not trusted to have published well-formed orders, so nothing is assumed
/// about the payload here. A record with no payload carries empty bytes and
/// fails validation downstream like any other malformed message.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub payload: Vec<u8>,
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub key: Option<Vec<u8>>,
    /// Message timestamp (milliseconds since epoch)
    pub timestamp: Option<i64>,
}

/// Kafka consumer with manual offset management.
pub struct Consumer {
    consumer: StreamConsumer,
    config: ConsumerConfig,
}

impl Consumer {
    /// Create a consumer and subscribe to the configured topic.
    pub fn new(config: ConsumerConfig) -> Result<Self> {
        if config.enable_auto_commit {
            return Err(Error::InvalidConfig(
                "auto commit must be disabled; offsets are committed explicitly by the consumption loop"
                    .to_string(),
            ));
        }

        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", &config.auto_offset_reset)
            .set("session.timeout.ms", &config.session_timeout_ms)
            .set("enable.partition.eof", "false")
            .create()
            .map_err(|e| Error::Consumer(format!("Failed to create consumer: {e}")))?;

        consumer
            .subscribe(&[&config.topic])
            .map_err(|e| Error::Consumer(format!("Failed to subscribe to topic: {e}")))?;

        Ok(Self { consumer, config })
    }

    /// Wait up to `timeout` for the next message.
    ///
    /// `Ok(None)` means the wait expired with nothing to read - a normal
    /// re-poll condition, not an error.
    pub async fn poll(&self, timeout: Duration) -> Result<Option<Delivery>> {
        match tokio::time::timeout(timeout, self.consumer.recv()).await {
            Ok(Ok(msg)) => Ok(Some(Delivery {
                payload: msg.payload().map(|p| p.to_vec()).unwrap_or_default(),
                topic: msg.topic().to_string(),
                partition: msg.partition(),
                offset: msg.offset(),
                key: msg.key().map(|k| k.to_vec()),
                timestamp: msg.timestamp().to_millis(),
            })),
            Ok(Err(e)) => Err(Error::Kafka(e)),
            Err(_) => Ok(None),
        }
    }

    /// Commit the offset directly after this delivery, synchronously.
    ///
    /// Advancing to `offset + 1` finalizes the message: it will not be
    /// redelivered to this group again.
    pub fn commit(&self, delivery: &Delivery) -> Result<()> {
        let mut tpl = TopicPartitionList::new();
        tpl.add_partition_offset(
            &delivery.topic,
            delivery.partition,
            Offset::Offset(delivery.offset + 1),
        )
        .map_err(|e| Error::Consumer(format!("Failed to add partition offset: {e}")))?;

        self.consumer.commit(&tpl, CommitMode::Sync)?;

        debug!(
            topic = %delivery.topic,
            partition = delivery.partition,
            offset = delivery.offset,
            "offset committed"
        );
        Ok(())
    }

    /// Move the partition's read position back to this delivery's offset.
    ///
    /// The committed offset is left untouched, so the same message is the
    /// next one the poll returns - the withhold half of the commit policy.
    pub fn rewind(&self, delivery: &Delivery) -> Result<()> {
        self.consumer.seek(
            &delivery.topic,
            delivery.partition,
            Offset::Offset(delivery.offset),
            Duration::from_secs(5),
        )?;

        debug!(
            topic = %delivery.topic,
            partition = delivery.partition,
            offset = delivery.offset,
            "partition rewound for redelivery"
        );
        Ok(())
    }

    pub fn config(&self) -> &ConsumerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_commit_is_refused() {
        let config = ConsumerConfig {
            enable_auto_commit: true,
            ..Default::default()
        };
        let err = Consumer::new(config).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn default_config_disables_auto_commit() {
        let config = ConsumerConfig::default();
        assert!(!config.enable_auto_commit);
        assert_eq!(config.auto_offset_reset, "earliest");
    }
}
