//! Kafka consumption for the order pipeline.
//!
//! A thin wrapper over rdkafka's `StreamConsumer` exposing exactly the three
//! operations the consumption loop needs:
//!
//! - a bounded poll returning the next raw [`Delivery`]
//! - an explicit per-message offset commit
//! - a partition rewind for offsets the loop decides to withhold
//!
//! Auto-commit is refused at construction time. The loop's commit decision
//! is the load-bearing part of the design, and a background commit would
//! advance offsets past messages whose outcome is not yet final.

mod consumer;
mod error;

pub use consumer::{Consumer, ConsumerConfig, Delivery};
pub use error::{Error, Result};
