//! Daemon error types.

use depot_engine::LedgerError;
use depot_store::StoreError;
use thiserror::Error;

/// Daemon-level errors.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Ledger engine error
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error (binding, serving)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for daemon operations.
pub type DaemonResult<T> = Result<T, DaemonError>;
