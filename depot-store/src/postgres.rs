//! PostgreSQL store implementation.
//!
//! The movement transaction is the core: the quantity adjustment and the
//! ledger append run inside one `sqlx` transaction, and the exit path
//! re-validates sufficiency as a conditional update (`WHERE quantity >= $q`)
//! so concurrent exits cannot drive the quantity negative off a stale read.
//!
//! This module uses dynamic queries (sqlx::query) instead of compile-time
//! checked macros (sqlx::query!) to allow compilation without DATABASE_URL.

use crate::error::StoreError;
use crate::repository::{
    AppliedMovement, CategoryRepository, MovementRepository, ProductRepository, Store,
};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use depot_domain::{
    Category, CategoryId, MovementRecord, MovementType, NewCategory, NewMovement, NewProduct,
    Product, ProductId,
};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::debug;

const PRODUCT_COLUMNS: &str = "id, name, unit, quantity, price, min_quantity, max_quantity, category";
const MOVEMENT_COLUMNS: &str = "id, product_id, movement_type, quantity, note, moved_on";

/// PostgreSQL-backed store
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool (for migrations and tests).
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn parse_product_row(row: &PgRow) -> Result<Product, sqlx::Error> {
    Ok(Product {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        unit: row.try_get("unit")?,
        quantity: row.try_get("quantity")?,
        price: row.try_get::<Decimal, _>("price")?,
        min_quantity: row.try_get("min_quantity")?,
        max_quantity: row.try_get("max_quantity")?,
        category: row.try_get("category")?,
    })
}

fn parse_category_row(row: &PgRow) -> Result<Category, sqlx::Error> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        size: row.try_get("size")?,
        packaging: row.try_get("packaging")?,
    })
}

fn parse_movement_row(row: &PgRow) -> Result<MovementRecord, StoreError> {
    let kind: String = row.try_get("movement_type").map_err(StoreError::from)?;
    Ok(MovementRecord {
        id: row.try_get("id").map_err(StoreError::from)?,
        product_id: row.try_get("product_id").map_err(StoreError::from)?,
        kind: kind.parse::<MovementType>()?,
        quantity: row.try_get("quantity").map_err(StoreError::from)?,
        note: row.try_get("note").map_err(StoreError::from)?,
        date: row.try_get::<NaiveDate, _>("moved_on").map_err(StoreError::from)?,
    })
}

#[async_trait]
impl ProductRepository for PgStore {
    async fn create(&self, product: &NewProduct) -> Result<Product, StoreError> {
        let sql = format!(
            "INSERT INTO products (name, unit, quantity, price, min_quantity, max_quantity, category) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&product.name)
            .bind(&product.unit)
            .bind(product.quantity)
            .bind(product.price)
            .bind(product.min_quantity)
            .bind(product.max_quantity)
            .bind(&product.category)
            .fetch_one(&self.pool)
            .await?;
        Ok(parse_product_row(&row)?)
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(parse_product_row).transpose().map_err(StoreError::from)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE name = $1");
        let row = sqlx::query(&sql).bind(name).fetch_optional(&self.pool).await?;
        row.as_ref().map(parse_product_row).transpose().map_err(StoreError::from)
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter()
            .map(parse_product_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::from)
    }

    async fn search(
        &self,
        name: Option<&str>,
        category: Option<&str>,
    ) -> Result<Vec<Product>, StoreError> {
        // NULL parameters disable the corresponding filter; everything stays
        // bind-parameterized.
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE ($1::text IS NULL OR name LIKE '%' || $1 || '%') \
               AND ($2::text IS NULL OR category = $2) \
             ORDER BY id"
        );
        let rows = sqlx::query(&sql)
            .bind(name)
            .bind(category)
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(parse_product_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::from)
    }

    async fn update(&self, product: &Product) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE products SET name = $1, unit = $2, quantity = $3, price = $4, \
             min_quantity = $5, max_quantity = $6, category = $7 WHERE id = $8",
        )
        .bind(&product.name)
        .bind(&product.unit)
        .bind(product.quantity)
        .bind(product.price)
        .bind(product.min_quantity)
        .bind(product.max_quantity)
        .bind(&product.category)
        .bind(product.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        // Ledger rows are not cascaded: the audit trail outlives the product
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn categories_in_use(&self) -> Result<Vec<String>, StoreError> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT category FROM products ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }
}

#[async_trait]
impl CategoryRepository for PgStore {
    async fn create(&self, category: &NewCategory) -> Result<Category, StoreError> {
        let row = sqlx::query(
            "INSERT INTO categories (name, size, packaging) VALUES ($1, $2, $3) \
             RETURNING id, name, size, packaging",
        )
        .bind(&category.name)
        .bind(&category.size)
        .bind(&category.packaging)
        .fetch_one(&self.pool)
        .await?;
        Ok(parse_category_row(&row)?)
    }

    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        let row = sqlx::query("SELECT id, name, size, packaging FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(parse_category_row).transpose().map_err(StoreError::from)
    }

    async fn list(&self) -> Result<Vec<Category>, StoreError> {
        let rows = sqlx::query("SELECT id, name, size, packaging FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(parse_category_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::from)
    }

    async fn update(&self, category: &Category) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE categories SET name = $1, size = $2, packaging = $3 WHERE id = $4",
        )
        .bind(&category.name)
        .bind(&category.size)
        .bind(&category.packaging)
        .bind(category.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: CategoryId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl MovementRepository for PgStore {
    async fn apply(&self, movement: &NewMovement) -> Result<AppliedMovement, StoreError> {
        let mut tx = self.pool.begin().await?;
        let record = apply_in_tx(&mut tx, movement).await?;

        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(movement.product_id)
            .fetch_one(&mut *tx)
            .await?;
        let product = parse_product_row(&row)?;

        tx.commit().await?;

        debug!(
            movement_id = record.id,
            product_id = record.product_id,
            kind = %record.kind,
            quantity = record.quantity,
            quantity_after = product.quantity,
            "Movement applied"
        );

        Ok(AppliedMovement { record, product })
    }

    async fn list_all(&self) -> Result<Vec<MovementRecord>, StoreError> {
        let sql = format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements ORDER BY moved_on DESC, id DESC"
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(parse_movement_row).collect()
    }

    async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<MovementRecord>, StoreError> {
        let sql = format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements WHERE product_id = $1 \
             ORDER BY moved_on DESC, id DESC"
        );
        let rows = sqlx::query(&sql).bind(product_id).fetch_all(&self.pool).await?;
        rows.iter().map(parse_movement_row).collect()
    }
}

/// Run the quantity update and the ledger append inside an open transaction.
///
/// Any early return drops the transaction, which rolls it back; the caller
/// commits. Zero rows affected on the update means the product is missing or
/// (exit only) the stock is insufficient; a follow-up read inside the same
/// transaction tells the two apart.
async fn apply_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    movement: &NewMovement,
) -> Result<MovementRecord, StoreError> {
    let rows_affected = match movement.kind {
        MovementType::Entry => {
            sqlx::query("UPDATE products SET quantity = quantity + $1 WHERE id = $2")
                .bind(movement.quantity)
                .bind(movement.product_id)
                .execute(&mut **tx)
                .await?
                .rows_affected()
        },
        MovementType::Exit => {
            sqlx::query(
                "UPDATE products SET quantity = quantity - $1 WHERE id = $2 AND quantity >= $1",
            )
            .bind(movement.quantity)
            .bind(movement.product_id)
            .execute(&mut **tx)
            .await?
            .rows_affected()
        },
    };

    if rows_affected == 0 {
        let available: Option<i32> =
            sqlx::query_scalar("SELECT quantity FROM products WHERE id = $1")
                .bind(movement.product_id)
                .fetch_optional(&mut **tx)
                .await?;

        return Err(match available {
            None => StoreError::not_found("product", movement.product_id.to_string()),
            Some(available) => StoreError::InsufficientStock {
                product_id: movement.product_id,
                requested: movement.quantity,
                available,
            },
        });
    }

    let date = movement.date.unwrap_or_else(|| Utc::now().date_naive());
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO stock_movements (product_id, movement_type, quantity, note, moved_on) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(movement.product_id)
    .bind(movement.kind.as_str())
    .bind(movement.quantity)
    .bind(&movement.note)
    .bind(date)
    .fetch_one(&mut **tx)
    .await?;

    Ok(MovementRecord {
        id,
        product_id: movement.product_id,
        kind: movement.kind,
        quantity: movement.quantity,
        note: movement.note.clone(),
        date,
    })
}

impl Store for PgStore {
    fn products(&self) -> &dyn ProductRepository {
        self
    }

    fn categories(&self) -> &dyn CategoryRepository {
        self
    }

    fn movements(&self) -> &dyn MovementRepository {
        self
    }
}
