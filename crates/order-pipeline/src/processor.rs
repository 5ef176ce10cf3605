use crate::outcome::Rejection;
use inventory_store::{DecrementOutcome, Error as StoreError, InventoryStore};
use order_types::OrderMessage;

/// Tri-state result of applying one validated order to the store.
#[derive(Debug)]
pub enum Outcome {
    Applied { new_quantity: i64 },
    Rejected(Rejection),
    Transient(StoreError),
}

/// Apply one validated order message to the inventory store.
///
/// Stateless between calls: the outcome is a function of the order and the
/// store's current contents. The only side effect is the store transaction,
/// and non-`Applied` outcomes leave no trace in it.
pub async fn process<S: InventoryStore>(store: &mut S, order: &OrderMessage) -> Outcome {
    match store.try_decrement(order).await {
        Ok(DecrementOutcome::Applied { new_quantity }) => Outcome::Applied { new_quantity },
        Ok(DecrementOutcome::ProductNotFound) => Outcome::Rejected(Rejection::ProductNotFound),
        Ok(DecrementOutcome::InsufficientStock { available }) => {
            Outcome::Rejected(Rejection::InsufficientStock { available })
        }
        Err(e) => Outcome::Transient(e),
    }
}
