//! Value Objects for the Depot Domain
//!
//! Immutable domain primitives: movement kinds, threshold signals, and the
//! validation errors they can raise.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Domain errors for value object validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Movement quantity must be a positive integer
    #[error("Invalid quantity: {0} (must be positive)")]
    InvalidQuantity(i32),

    /// Unrecognized movement type string
    #[error("Invalid movement type: {0}")]
    InvalidMovementType(String),

    /// Name must be non-empty
    #[error("Invalid name: {0}")]
    InvalidName(String),
}

// =============================================================================
// MovementType
// =============================================================================

/// Direction of a stock movement.
///
/// `Entry` increases the product's on-hand quantity; `Exit` decreases it and
/// is rejected if it would drive the quantity negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementType {
    /// Stock-increasing movement
    Entry,
    /// Stock-decreasing movement
    Exit,
}

impl MovementType {
    /// Canonical string form, as stored in the ledger table.
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Entry => "Entry",
            MovementType::Exit => "Exit",
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Entry" => Ok(MovementType::Entry),
            "Exit" => Ok(MovementType::Exit),
            other => Err(DomainError::InvalidMovementType(other.to_string())),
        }
    }
}

// =============================================================================
// ThresholdSignal
// =============================================================================

/// Advisory classification of a product's quantity against its configured
/// min/max bounds.
///
/// Purely observational: a breach never blocks a movement transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ThresholdSignal {
    /// Quantity dropped below the configured minimum
    BelowMinimum {
        /// Product name, for operator-facing messages
        product: String,
        /// Configured minimum quantity
        min_quantity: i32,
    },
    /// Quantity rose above the configured maximum
    AboveMaximum {
        /// Product name, for operator-facing messages
        product: String,
        /// Configured maximum quantity
        max_quantity: i32,
    },
    /// Quantity is within the configured bounds
    WithinRange,
}

impl ThresholdSignal {
    /// Whether this signal indicates a bound breach.
    pub fn is_breach(&self) -> bool {
        !matches!(self, ThresholdSignal::WithinRange)
    }
}

impl fmt::Display for ThresholdSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdSignal::BelowMinimum { product, min_quantity } => write!(
                f,
                "stock for {} is low: minimum is {} units",
                product, min_quantity
            ),
            ThresholdSignal::AboveMaximum { product, max_quantity } => write!(
                f,
                "stock for {} is high: maximum is {} units",
                product, max_quantity
            ),
            ThresholdSignal::WithinRange => f.write_str("stock within configured range"),
        }
    }
}
