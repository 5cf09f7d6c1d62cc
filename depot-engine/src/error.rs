//! Ledger engine error types.

use depot_domain::ProductId;
use depot_store::StoreError;
use thiserror::Error;

/// Errors surfaced by the stock ledger engine.
///
/// The engine recovers nothing locally beyond rollback; every failure is
/// returned to the caller explicitly, and nothing is retried automatically.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Product id does not exist
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// Exit requested more than the on-hand quantity
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        /// Product the exit targeted
        product_id: ProductId,
        /// Quantity requested
        requested: i32,
        /// Quantity on hand
        available: i32,
    },

    /// Non-positive movement quantity supplied
    #[error("Movement quantity must be positive, got {0}")]
    InvalidQuantity(i32),

    /// Persistence failure during the transaction (after rollback)
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
