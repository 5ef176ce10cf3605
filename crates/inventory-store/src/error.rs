use thiserror::Error;

/// Infrastructure faults raised by a store.
///
/// Every variant is transient by taxonomy: the same operation may succeed
/// once the underlying condition clears, so callers treat any `Error` as
/// retryable. Permanent outcomes (product not found, insufficient stock)
/// are values, not errors.
#[derive(Debug, Error)]
pub enum Error {
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, Error>;
