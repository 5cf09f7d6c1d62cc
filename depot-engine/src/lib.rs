//! Depot Stock Ledger Engine
//!
//! Validates and applies entry/exit movements against a product's quantity,
//! as a single all-or-nothing unit of work against the store, and classifies
//! the resulting quantity against the product's advisory bounds.

#![warn(clippy::all)]

mod error;
mod ledger;

pub use error::{LedgerError, LedgerResult};
pub use ledger::{LedgerEngine, MovementOutcome};
