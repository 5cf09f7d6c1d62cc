//! Demo data seeding for Depot.
//!
//! Seeds a starter category and product so a fresh install has something to
//! move stock against.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::info;

use super::Result;

/// Seed a demo category and product if they are not present.
///
/// Matching is by name, so the seed is idempotent. Both inserts run inside
/// one transaction.
pub async fn seed_demo_data(pool: &PgPool) -> Result<()> {
    let mut tx = pool.begin().await?;

    let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM products WHERE name = $1")
        .bind("Demo product")
        .fetch_optional(&mut *tx)
        .await?;

    if existing.is_some() {
        info!("Demo data already present, skipping");
        tx.commit().await?;
        return Ok(());
    }

    sqlx::query("INSERT INTO categories (name, size, packaging) VALUES ($1, $2, $3)")
        .bind("General")
        .bind("M")
        .bind("box")
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "INSERT INTO products (name, unit, quantity, price, min_quantity, max_quantity, category) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind("Demo product")
    .bind("unit")
    .bind(10)
    .bind(Decimal::new(999, 2))
    .bind(5)
    .bind(100)
    .bind("General")
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!("Demo data seeded");
    Ok(())
}
