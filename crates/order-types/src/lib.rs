//! Wire types for order events.
//!
//! One queue message carries one JSON-encoded line-item order. This crate
//! owns the consume-side parse and structural validation: a payload that
//! fails here is malformed and must never reach order processing.
//!
//! The producer and consumer do not trust each other. Whatever the checkout
//! API published, the consumer re-validates every field on its side before
//! the message can touch the inventory store.

use serde::Serialize;
use thiserror::Error;

// Re-export for consumers of this crate
pub use rust_decimal::Decimal;

/// Fields every order message must carry.
pub const REQUIRED_FIELDS: [&str; 4] = ["order_id", "product_id", "quantity", "unit_price"];

/// A validated, normalized line-item order consumed from the queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderMessage {
    pub order_id: String,
    pub product_id: i64,
    /// Always positive once parsing has succeeded.
    pub quantity: i64,
    /// Serialized as a JSON number on the wire.
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
}

impl OrderMessage {
    /// Parse and structurally validate one queue payload.
    ///
    /// Any error here classifies the message as permanently unprocessable:
    /// redelivering the same bytes cannot change the result.
    pub fn parse(payload: &[u8]) -> Result<Self, MalformedError> {
        let value: serde_json::Value = serde_json::from_slice(payload)?;
        let fields = value.as_object().ok_or(MalformedError::NotAnObject)?;

        let order_id = fields
            .get("order_id")
            .ok_or(MalformedError::MissingField("order_id"))?
            .as_str()
            .ok_or(MalformedError::InvalidField {
                field: "order_id",
                expected: "string",
            })?
            .to_string();

        let product_id = fields
            .get("product_id")
            .ok_or(MalformedError::MissingField("product_id"))?
            .as_i64()
            .ok_or(MalformedError::InvalidField {
                field: "product_id",
                expected: "integer",
            })?;

        let quantity = fields
            .get("quantity")
            .ok_or(MalformedError::MissingField("quantity"))?
            .as_i64()
            .ok_or(MalformedError::InvalidField {
                field: "quantity",
                expected: "integer",
            })?;
        if quantity <= 0 {
            return Err(MalformedError::NonPositiveQuantity(quantity));
        }

        let unit_price = match fields
            .get("unit_price")
            .ok_or(MalformedError::MissingField("unit_price"))?
        {
            serde_json::Value::Number(n) => decimal_from_number(n)?,
            _ => {
                return Err(MalformedError::InvalidField {
                    field: "unit_price",
                    expected: "number",
                })
            }
        };

        Ok(OrderMessage {
            order_id,
            product_id,
            quantity,
            unit_price,
        })
    }

    /// Line subtotal as recorded on the sale: `quantity * unit_price`.
    pub fn subtotal(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

/// Convert a JSON number to a Decimal through its exact textual form, so
/// prices like 29.99 do not pick up binary-float rounding noise.
fn decimal_from_number(n: &serde_json::Number) -> Result<Decimal, MalformedError> {
    let text = n.to_string();
    text.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| MalformedError::InvalidField {
            field: "unit_price",
            expected: "number",
        })
}

/// Structural validation failure: the message is permanently unprocessable.
///
/// Validation runs before order processing, so a malformed message never
/// touches the inventory store. Retrying cannot change any of these
/// outcomes, which is what drives the commit-and-skip offset policy for
/// poison messages.
#[derive(Debug, Error)]
pub enum MalformedError {
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("payload is not a JSON object")]
    NotAnObject,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("field {field} is not a {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("quantity must be positive, got {0}")]
    NonPositiveQuantity(i64),
}
