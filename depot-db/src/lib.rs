//! Database lifecycle management for Depot.
//!
//! Provides migration running, status checking, and demo data seeding.

mod init;

pub use init::seed_demo_data;

use sqlx::{PgPool, Row};
use tracing::{info, warn};

/// Result type for DB operations.
pub type Result<T> = std::result::Result<T, anyhow::Error>;

/// Run all pending migrations.
///
/// Uses sqlx migrations from the workspace `migrations` directory.
/// Idempotent: safe to run multiple times.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    info!("Running database migrations...");

    sqlx::migrate!("../migrations").run(pool).await?;

    info!("Migrations completed successfully");
    Ok(())
}

/// Check database connectivity and report table row counts.
pub async fn status(pool: &PgPool) -> Result<()> {
    // Check connectivity
    let _: i64 = sqlx::query_scalar("SELECT 1").fetch_one(pool).await?;
    info!("Database connection OK");

    for table in ["products", "categories", "stock_movements"] {
        let sql = format!("SELECT COUNT(*) AS count FROM {table}");
        match sqlx::query(&sql).fetch_one(pool).await {
            Ok(row) => {
                let count: i64 = row.try_get("count")?;
                info!(table, count, "Table status");
            },
            Err(e) => {
                warn!(table, error = %e, "Table missing or unreadable (run migrations?)");
            },
        }
    }

    Ok(())
}
