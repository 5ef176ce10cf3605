//! Inventory persistence for the order pipeline.
//!
//! The store owns the one piece of shared mutable state in the system: the
//! `inventory` table, plus the append-only `sales` table written alongside
//! it. The whole contract is [`InventoryStore::try_decrement`]: stock check,
//! decrement, and sale insert as a single atomic unit, visible entirely or
//! not at all.
//!
//! Two implementations:
//!
//! - [`PostgresStore`] - the real store, one transaction per message
//! - [`MemoryStore`] - in-memory twin with fault injection, for tests and
//!   local runs without a database

mod error;
mod memory;
mod postgres;


pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use order_types::{Decimal, OrderMessage};

/// Result of one atomic read-check-decrement attempt.
///
/// Only `Applied` mutates anything; on the other two arms the store is left
/// exactly as it was.
#[derive(Debug, Clone, PartialEq)]
pub enum DecrementOutcome {
    /// Stock reduced and a sale recorded in the same transaction.
    Applied { new_quantity: i64 },
    /// Stock on hand is below the requested quantity.
    InsufficientStock { available: i64 },
    /// No inventory record exists for the product.
    ProductNotFound,
}

/// One row of the append-only `sales` table.
///
/// Inserted atomically with the inventory decrement; never mutated or
/// deleted by this subsystem.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleRecord {
    pub order_id: String,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub sale_date: DateTime<Utc>,
}

/// Transactional inventory access.
///
/// `Err` is reserved for infrastructure faults (connection loss, transaction
/// failure) - the retryable path. Business outcomes, including the two
/// permanent rejections, are values.
#[async_trait]
pub trait InventoryStore {
    /// Atomically check stock for `order.product_id`, decrement it by
    /// `order.quantity`, and insert the corresponding sale record.
    ///
    /// A crash mid-way leaves the store in its pre-transaction state; there
    /// is no partial visibility between the check and the write.
    async fn try_decrement(&mut self, order: &OrderMessage) -> Result<DecrementOutcome>;
}
