//! Depot Domain Layer
//!
//! Pure domain logic with zero I/O dependencies.
//! Contains entities, value objects, and domain rules.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod entities;
pub mod value_objects;

// Re-export commonly used types
pub use entities::{
    Category, CategoryId, MovementId, MovementRecord, NewCategory, NewMovement, NewProduct,
    Product, ProductId,
};
pub use value_objects::{DomainError, MovementType, ThresholdSignal};
