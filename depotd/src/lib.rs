//! Depot Daemon Library
//!
//! Runtime orchestrator for the Depot inventory service.
//!
//! # Components
//!
//! - **Daemon**: store wiring and HTTP serve loop
//! - **API**: axum endpoints for products, categories, and movements
//! - **Config**: environment-based configuration

#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod daemon;
pub mod error;

#[cfg(feature = "postgres")]
pub mod db;

// Re-exports for convenience
pub use config::{ApiConfig, Config, Environment};
pub use daemon::Daemon;
pub use error::{DaemonError, DaemonResult};
