//! Daemon: store wiring and HTTP serve loop.
//!
//! # Lifecycle
//!
//! 1. Load configuration
//! 2. Wire the store and the ledger engine
//! 3. Serve the API until SIGINT

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use depot_engine::LedgerEngine;
use depot_store::{MemoryStore, Store};

use crate::api::{create_router, ApiState};
use crate::config::Config;
use crate::error::{DaemonError, DaemonResult};

/// The main Depot daemon.
pub struct Daemon<S: Store + 'static> {
    /// Configuration
    config: Config,
    /// Shared store
    store: Arc<S>,
}

impl Daemon<MemoryStore> {
    /// Create a daemon over the in-memory store (testing/development).
    pub fn new_memory(config: Config) -> Self {
        Self {
            config,
            store: Arc::new(MemoryStore::new()),
        }
    }
}

#[cfg(feature = "postgres")]
impl Daemon<depot_store::PgStore> {
    /// Create a daemon over PostgreSQL.
    pub fn new_postgres(config: Config, pool: sqlx::PgPool) -> Self {
        Self {
            config,
            store: Arc::new(depot_store::PgStore::new(pool)),
        }
    }
}

impl<S: Store + 'static> Daemon<S> {
    /// Create a daemon over a provided store.
    pub fn new(config: Config, store: Arc<S>) -> Self {
        Self { config, store }
    }

    /// Run the daemon: serve the API until a shutdown signal arrives.
    pub async fn run(self) -> DaemonResult<()> {
        info!(
            version = env!("CARGO_PKG_VERSION"),
            environment = %self.config.environment,
            "Starting Depot daemon"
        );

        let state = Arc::new(ApiState {
            engine: LedgerEngine::new(Arc::clone(&self.store)),
            store: self.store,
        });
        let router = create_router(state);

        let addr = format!("{}:{}", self.config.api.host, self.config.api.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| DaemonError::Config(format!("Failed to bind to {}: {}", addr, e)))?;
        info!(addr = %listener.local_addr()?, "API server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("Received shutdown signal");
            })
            .await?;

        info!("Depot daemon stopped");
        Ok(())
    }
}
