//! Database CLI subcommands for depotd.
//!
//! Provides `db migrate`, `db status`, and `db seed` commands.

use anyhow::{anyhow, Result};
use std::env;

use depot_db::{migrate, seed_demo_data, status};

/// Run database CLI subcommands.
///
/// Supported commands:
/// - `depotd db migrate` - Run pending migrations
/// - `depotd db status` - Check connectivity and table counts
/// - `depotd db seed` - Seed demo data
pub async fn run_db_command(args: Vec<String>) -> Result<()> {
    if args.len() < 3 {
        return Err(anyhow!("Usage: depotd db <migrate|status|seed>"));
    }

    let database_url = env::var("DATABASE_URL")
        .map_err(|_| anyhow!("DATABASE_URL environment variable is required for db commands"))?;

    let pool = sqlx::PgPool::connect(&database_url).await?;

    match args[2].as_str() {
        "migrate" => migrate(&pool).await?,
        "status" => status(&pool).await?,
        "seed" => {
            migrate(&pool).await?;
            seed_demo_data(&pool).await?;
        },
        other => {
            return Err(anyhow!("Unknown db command: {}. Use migrate, status, or seed", other));
        },
    }

    Ok(())
}
