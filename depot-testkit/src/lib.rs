//! Depot test kit
//!
//! Shared builders and seeding helpers for tests across the workspace.

#![warn(clippy::all)]

mod helpers;

pub use helpers::{product_with_bounds, product_with_stock, seed_product};
