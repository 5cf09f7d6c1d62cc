//! Depot Storage Layer
//!
//! Provides persistence for products, categories, and the movement ledger.
//!
//! # Architecture
//!
//! - **Repository traits**: Define the storage interface (ports)
//! - **In-memory store**: Fast implementation for testing and development
//! - **PostgreSQL store**: Production implementation (feature `postgres`)
//!
//! The movement ledger is the correctness core: `MovementRepository::apply`
//! adjusts a product's quantity and appends the audit row as one atomic unit
//! of work, in every implementation.

#![warn(clippy::all)]

// Modules
mod error;
mod memory;
#[cfg(feature = "postgres")]
mod postgres;
mod repository;

// Re-exports
pub use error::StoreError;
pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PgStore;
pub use repository::{
    AppliedMovement, CategoryRepository, MovementRepository, ProductRepository, Store,
};
