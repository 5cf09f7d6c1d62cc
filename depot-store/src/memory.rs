//! In-memory store implementation
//!
//! Used for testing and development without a database.
//!
//! All tables live behind a single `RwLock`: the movement transaction must
//! mutate the product row and append the ledger row under one write guard to
//! keep the same atomicity the PostgreSQL implementation gets from a real
//! transaction.

use crate::error::StoreError;
use crate::repository::{
    AppliedMovement, CategoryRepository, MovementRepository, ProductRepository, Store,
};
use async_trait::async_trait;
use chrono::Utc;
use depot_domain::{
    Category, CategoryId, MovementRecord, MovementType, NewCategory, NewMovement, NewProduct,
    Product, ProductId,
};
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
struct Inner {
    products: HashMap<ProductId, Product>,
    categories: HashMap<CategoryId, Category>,
    movements: Vec<MovementRecord>,
    next_product_id: ProductId,
    next_category_id: CategoryId,
    next_movement_id: i64,
}

/// In-memory store for testing and development
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Get the number of products
    pub fn product_count(&self) -> usize {
        self.inner.read().unwrap().products.len()
    }

    /// Get the number of categories
    pub fn category_count(&self) -> usize {
        self.inner.read().unwrap().categories.len()
    }

    /// Get the number of ledger rows
    pub fn movement_count(&self) -> usize {
        self.inner.read().unwrap().movements.len()
    }

    /// Clear all data (useful for test setup)
    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap();
        *inner = Inner::default();
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn sort_ledger(mut records: Vec<MovementRecord>) -> Vec<MovementRecord> {
    // Display order: date desc, id desc
    records.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    records
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn create(&self, product: &NewProduct) -> Result<Product, StoreError> {
        let mut inner = self.inner.write().unwrap();
        inner.next_product_id += 1;
        let created = Product {
            id: inner.next_product_id,
            name: product.name.clone(),
            unit: product.unit.clone(),
            quantity: product.quantity,
            price: product.price,
            min_quantity: product.min_quantity,
            max_quantity: product.max_quantity,
            category: product.category.clone(),
        };
        inner.products.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.inner.read().unwrap().products.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(inner.products.values().find(|p| p.name == name).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let inner = self.inner.read().unwrap();
        let mut products: Vec<Product> = inner.products.values().cloned().collect();
        products.sort_by_key(|p| p.id);
        Ok(products)
    }

    async fn search(
        &self,
        name: Option<&str>,
        category: Option<&str>,
    ) -> Result<Vec<Product>, StoreError> {
        let inner = self.inner.read().unwrap();
        let mut products: Vec<Product> = inner
            .products
            .values()
            .filter(|p| name.map_or(true, |n| p.name.contains(n)))
            .filter(|p| category.map_or(true, |c| p.category == c))
            .cloned()
            .collect();
        products.sort_by_key(|p| p.id);
        Ok(products)
    }

    async fn update(&self, product: &Product) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().unwrap();
        match inner.products.get_mut(&product.id) {
            Some(existing) => {
                *existing = product.clone();
                Ok(true)
            },
            None => Ok(false),
        }
    }

    async fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        // Ledger rows outlive the product: the audit trail is kept
        Ok(self.inner.write().unwrap().products.remove(&id).is_some())
    }

    async fn categories_in_use(&self) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.read().unwrap();
        let mut names: Vec<String> = inner.products.values().map(|p| p.category.clone()).collect();
        names.sort();
        names.dedup();
        Ok(names)
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn create(&self, category: &NewCategory) -> Result<Category, StoreError> {
        let mut inner = self.inner.write().unwrap();
        inner.next_category_id += 1;
        let created = Category {
            id: inner.next_category_id,
            name: category.name.clone(),
            size: category.size.clone(),
            packaging: category.packaging.clone(),
        };
        inner.categories.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        Ok(self.inner.read().unwrap().categories.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Category>, StoreError> {
        let inner = self.inner.read().unwrap();
        let mut categories: Vec<Category> = inner.categories.values().cloned().collect();
        categories.sort_by_key(|c| c.id);
        Ok(categories)
    }

    async fn update(&self, category: &Category) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().unwrap();
        match inner.categories.get_mut(&category.id) {
            Some(existing) => {
                *existing = category.clone();
                Ok(true)
            },
            None => Ok(false),
        }
    }

    async fn delete(&self, id: CategoryId) -> Result<bool, StoreError> {
        Ok(self.inner.write().unwrap().categories.remove(&id).is_some())
    }
}

#[async_trait]
impl MovementRepository for MemoryStore {
    async fn apply(&self, movement: &NewMovement) -> Result<AppliedMovement, StoreError> {
        // One write guard covers the quantity mutation and the ledger append,
        // so no partial state is ever observable and failed movements leave
        // no ledger row behind.
        let mut inner = self.inner.write().unwrap();

        let product = inner
            .products
            .get_mut(&movement.product_id)
            .ok_or_else(|| StoreError::not_found("product", movement.product_id.to_string()))?;

        match movement.kind {
            MovementType::Entry => {
                product.quantity += movement.quantity;
            },
            MovementType::Exit => {
                if product.quantity < movement.quantity {
                    return Err(StoreError::InsufficientStock {
                        product_id: movement.product_id,
                        requested: movement.quantity,
                        available: product.quantity,
                    });
                }
                product.quantity -= movement.quantity;
            },
        }
        let product = product.clone();

        inner.next_movement_id += 1;
        let record = MovementRecord {
            id: inner.next_movement_id,
            product_id: movement.product_id,
            kind: movement.kind,
            quantity: movement.quantity,
            note: movement.note.clone(),
            date: movement.date.unwrap_or_else(|| Utc::now().date_naive()),
        };
        inner.movements.push(record.clone());

        Ok(AppliedMovement { record, product })
    }

    async fn list_all(&self) -> Result<Vec<MovementRecord>, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(sort_ledger(inner.movements.clone()))
    }

    async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<MovementRecord>, StoreError> {
        let inner = self.inner.read().unwrap();
        let records = inner
            .movements
            .iter()
            .filter(|m| m.product_id == product_id)
            .cloned()
            .collect();
        Ok(sort_ledger(records))
    }
}

impl Store for MemoryStore {
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

// =============================================================================
// Tests
// =============================================================================
