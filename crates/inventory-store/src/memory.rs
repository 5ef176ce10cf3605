//! In-memory inventory store.
//!
//! Mirrors the transactional contract of the PostgreSQL store over plain
//! maps, with a hook for injecting infrastructure faults so tests can drive
//! the retryable path deterministically.

use crate::{DecrementOutcome, Error, InventoryStore, Result, SaleRecord};
use async_trait::async_trait;
use chrono::Utc;
use order_types::OrderMessage;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct MemoryStore {
    inventory: HashMap<i64, i64>,
    sales: Vec<SaleRecord>,
    fail_next: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed stock for a product, replacing any existing record.
    pub fn with_stock(mut self, product_id: i64, quantity_in_stock: i64) -> Self {
        self.inventory.insert(product_id, quantity_in_stock);
        self
    }

    /// Current stock for a product, if it has an inventory record.
    pub fn stock_of(&self, product_id: i64) -> Option<i64> {
        self.inventory.get(&product_id).copied()
    }

    /// Sale records inserted so far, in insertion order.
    pub fn sales(&self) -> &[SaleRecord] {
        &self.sales
    }

    /// Make the next `try_decrement` fail with `Error::Unavailable(reason)`.
    ///
    /// The failure is consumed by that one call; subsequent calls succeed
    /// again, matching a transient condition that clears.
    pub fn fail_next_with(&mut self, reason: &str) {
        self.fail_next = Some(reason.to_string());
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn try_decrement(&mut self, order: &OrderMessage) -> Result<DecrementOutcome> {
        if let Some(reason) = self.fail_next.take() {
            return Err(Error::Unavailable(reason));
        }

        let available = match self.inventory.get(&order.product_id) {
            Some(quantity) => *quantity,
            None => return Ok(DecrementOutcome::ProductNotFound),
        };

        if available < order.quantity {
            return Ok(DecrementOutcome::InsufficientStock { available });
        }

        let new_quantity = available - order.quantity;
        self.inventory.insert(order.product_id, new_quantity);
        self.sales.push(SaleRecord {
            order_id: order.order_id.clone(),
            product_id: order.product_id,
            quantity: order.quantity,
            unit_price: order.unit_price,
            subtotal: order.subtotal(),
            sale_date: Utc::now(),
        });

        Ok(DecrementOutcome::Applied { new_quantity })
    }
}
