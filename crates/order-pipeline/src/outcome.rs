use inventory_store::Error as StoreError;
use order_types::MalformedError;
use std::fmt;

/// Permanent business-rule rejection.
///
/// Reprocessing the same message cannot change either outcome: the product
/// either does not exist or does not have the stock, and redelivery would
/// find the same store state it already rejected against.
#[derive(Debug)]
pub enum Rejection {
    ProductNotFound,
    InsufficientStock { available: i64 },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::ProductNotFound => write!(f, "product not found"),
            Rejection::InsufficientStock { available } => {
                write!(f, "insufficient stock, {available} available")
            }
        }
    }
}

/// What to do with the consumer offset once a message's outcome is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetAction {
    /// Advance past the message; it is finalized and never redelivered.
    Commit,
    /// Leave the committed offset where it is so the next poll redelivers
    /// the same message.
    Withhold,
}

/// Final classification of one polled message.
///
/// Every loop iteration ends in exactly one of these four states. The
/// variants are the whole design, so the mapping to an offset action is an
/// exhaustive match with no catch-all arm.
#[derive(Debug)]
pub enum MessageOutcome {
    /// Stock decremented and sale recorded.
    Applied { order_id: String, new_quantity: i64 },
    /// Permanently invalid business outcome. Committing here is what keeps
    /// a doomed message from stalling the partition; a dead-letter channel
    /// would hang off this arm.
    Rejected {
        order_id: String,
        rejection: Rejection,
    },
    /// Unparseable or structurally invalid payload; never reached the store.
    Malformed(MalformedError),
    /// Infrastructure fault; retry may succeed, so the message must be
    /// redelivered.
    Transient(StoreError),
}

impl MessageOutcome {
    /// The asymmetric commit policy: permanent outcomes commit, retryable
    /// ones withhold.
    pub fn offset_action(&self) -> OffsetAction {
        match self {
            MessageOutcome::Applied { .. } => OffsetAction::Commit,
            MessageOutcome::Rejected { .. } => OffsetAction::Commit,
            MessageOutcome::Malformed(_) => OffsetAction::Commit,
            MessageOutcome::Transient(_) => OffsetAction::Withhold,
        }
    }
}
