//! order-ingest library
//!
//! An order-ingestion pipeline: consumes order events from Kafka and applies
//! them to a PostgreSQL inventory store under transactional, at-least-once
//! guarantees with explicit offset commits.
//!
//! # Pipeline Crates
//!
//! Each concern has its own dedicated crate:
//!
//! - `order-types` - wire record, parse and structural validation
//! - `kafka-consumer` - manual-offset consumer (poll / commit / rewind)
//! - `inventory-store` - transactional decrement plus sale insert
//! - `order-pipeline` - order processor and the consumption loop
//! - `kafka-producer` - `submit_order` publisher collaborator
//!
//! # CLI Usage
//!
//! ```bash
//! # Run the consumer against local Kafka and PostgreSQL
//! order-ingest consume --brokers localhost:9092 --group-id order-ingest \
//!   --topic orders --database-url postgres://postgres@localhost/orders
//!
//! # Publish one order event (collaborator/testing path)
//! order-ingest submit --brokers localhost:9092 --topic orders \
//!   --product-id 7 --quantity 2 --unit-price 29.99
//! ```

pub mod consume;
pub mod submit;
pub mod testing;

// Re-export pipeline crates for convenience
pub use inventory_store as store;
pub use order_pipeline as pipeline;
pub use order_types as types;
