//! Depot Daemon
//!
//! Inventory service: product/category CRUD and the stock-movement ledger
//! over HTTP.
//!
//! # Usage
//!
//! ```bash
//! # Start with default configuration (in-memory store)
//! cargo run -p depotd
//!
//! # Start against PostgreSQL
//! DATABASE_URL=postgres://... cargo run -p depotd --features postgres
//!
//! # Database lifecycle (feature `postgres`)
//! depotd db migrate
//! depotd db status
//! depotd db seed
//! ```
//!
//! # Environment Variables
//!
//! - `DEPOT_ENV`: Environment (test, development, production)
//! - `DEPOT_API_HOST`: API host (default: 0.0.0.0)
//! - `DEPOT_API_PORT`: API port (default: 8080)
//! - `DATABASE_URL`: PostgreSQL connection string (optional)

use depotd::{Config, Daemon};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("depotd=info".parse()?))
        .init();

    #[cfg(feature = "postgres")]
    {
        let args: Vec<String> = std::env::args().collect();
        if args.get(1).map(String::as_str) == Some("db") {
            return depotd::db::run_db_command(args).await;
        }
    }

    // Load configuration
    let config = Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        api_host = %config.api.host,
        api_port = config.api.port,
        "Depot daemon"
    );

    #[cfg(feature = "postgres")]
    if let Some(url) = config.database_url.clone() {
        let pool = sqlx::PgPool::connect(&url).await?;
        depot_db::migrate(&pool).await?;
        let daemon = Daemon::new_postgres(config, pool);
        daemon.run().await?;
        return Ok(());
    }

    if config.database_url.is_some() {
        warn!("DATABASE_URL is set but depotd was built without the postgres feature; using the in-memory store");
    }

    let daemon = Daemon::new_memory(config);
    daemon.run().await?;

    Ok(())
}
