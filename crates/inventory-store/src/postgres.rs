//! PostgreSQL-backed inventory store.

use crate::{DecrementOutcome, InventoryStore, Result};
use async_trait::async_trait;
use chrono::Utc;
use order_types::OrderMessage;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, warn};

/// Inventory store backed by PostgreSQL.
///
/// Holds one connection for the lifetime of the consumption loop. The
/// transactional handle itself is scoped to a single `try_decrement` call
/// and released on every exit path - commit, rejection, or fault - so it is
/// never held across the loop's poll wait.
pub struct PostgresStore {
    client: Client,
}

impl PostgresStore {
    /// Connect to PostgreSQL and spawn the connection driver task.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(database_url, NoTls).await?;

        // The connection object performs the actual I/O and must be polled
        // on its own task for the client to make progress.
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!("postgres connection terminated: {e}");
            }
        });

        Ok(Self { client })
    }

    /// Wrap an already-connected client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl InventoryStore for PostgresStore {
    async fn try_decrement(&mut self, order: &OrderMessage) -> Result<DecrementOutcome> {
        // Dropping the transaction without commit rolls it back, so every
        // early return below leaves the store untouched.
        let tx = self.client.transaction().await?;

        let row = tx
            .query_opt(
                "SELECT quantity_in_stock FROM inventory WHERE product_id = $1 FOR UPDATE",
                &[&order.product_id],
            )
            .await?;

        let available: i64 = match row {
            Some(row) => row.get(0),
            None => return Ok(DecrementOutcome::ProductNotFound),
        };

        if available < order.quantity {
            return Ok(DecrementOutcome::InsufficientStock { available });
        }

        let new_quantity = available - order.quantity;
        tx.execute(
            "UPDATE inventory SET quantity_in_stock = $1 WHERE product_id = $2",
            &[&new_quantity, &order.product_id],
        )
        .await?;

        let subtotal = order.subtotal();
        tx.execute(
            "INSERT INTO sales (order_id, product_id, quantity, unit_price, subtotal, sale_date) \
             VALUES ($1, $2, $3, $4, $5, $6)",
            &[
                &order.order_id,
                &order.product_id,
                &order.quantity,
                &order.unit_price,
                &subtotal,
                &Utc::now(),
            ],
        )
        .await?;

        tx.commit().await?;

        debug!(
            order_id = %order.order_id,
            product_id = order.product_id,
            new_quantity,
            "inventory decremented"
        );

        Ok(DecrementOutcome::Applied { new_quantity })
    }
}
