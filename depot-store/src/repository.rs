//! Repository trait definitions (Ports)
//!
//! These traits define the storage interface for the domain.
//! Implementations can be PostgreSQL, in-memory, or mock for testing.

use crate::error::StoreError;
use async_trait::async_trait;
use depot_domain::{
    Category, CategoryId, MovementRecord, NewCategory, NewMovement, NewProduct, Product, ProductId,
};

/// Result of an applied movement: the ledger row that was created and the
/// product as it stands after the quantity adjustment, read inside the same
/// transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedMovement {
    /// The ledger row created by the transaction
    pub record: MovementRecord,
    /// The product after the quantity adjustment
    pub product: Product,
}

/// Repository for Product entities
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Create a product; the store assigns the id
    async fn create(&self, product: &NewProduct) -> Result<Product, StoreError>;

    /// Find a product by ID
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Find a product by exact name
    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, StoreError>;

    /// List all products
    async fn list(&self) -> Result<Vec<Product>, StoreError>;

    /// Search by name substring and/or exact category
    async fn search(
        &self,
        name: Option<&str>,
        category: Option<&str>,
    ) -> Result<Vec<Product>, StoreError>;

    /// Update all mutable fields of a product; returns false if it does not exist
    async fn update(&self, product: &Product) -> Result<bool, StoreError>;

    /// Delete a product by ID; returns false if it does not exist
    async fn delete(&self, id: ProductId) -> Result<bool, StoreError>;

    /// Distinct category names referenced by products, sorted ascending
    async fn categories_in_use(&self) -> Result<Vec<String>, StoreError>;
}

/// Repository for Category entities
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a category; the store assigns the id
    async fn create(&self, category: &NewCategory) -> Result<Category, StoreError>;

    /// Find a category by ID
    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, StoreError>;

    /// List all categories
    async fn list(&self) -> Result<Vec<Category>, StoreError>;

    /// Update a category; returns false if it does not exist
    async fn update(&self, category: &Category) -> Result<bool, StoreError>;

    /// Delete a category by ID; returns false if it does not exist
    async fn delete(&self, id: CategoryId) -> Result<bool, StoreError>;
}

/// Repository for the stock-movement ledger (append-only)
#[async_trait]
pub trait MovementRepository: Send + Sync {
    /// Apply a movement atomically: adjust the product's quantity and append
    /// the ledger row as one unit of work.
    ///
    /// Either both writes become durably visible or neither does. An exit
    /// re-validates sufficiency as part of the quantity update itself, so a
    /// concurrent exit cannot drive the quantity negative.
    ///
    /// # Errors
    /// - `NotFound` if the product does not exist
    /// - `InsufficientStock` if an exit exceeds the on-hand quantity
    /// - `Database`/`Connection` on persistence failures (after rollback)
    async fn apply(&self, movement: &NewMovement) -> Result<AppliedMovement, StoreError>;

    /// Full ledger, ordered by (date desc, id desc)
    async fn list_all(&self) -> Result<Vec<MovementRecord>, StoreError>;

    /// Ledger subset for one product, ordered by (date desc, id desc)
    async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<MovementRecord>, StoreError>;
}

/// Combined store interface
pub trait Store: Send + Sync {
    /// Get product repository
    fn products(&self) -> &dyn ProductRepository;

    /// Get category repository
    fn categories(&self) -> &dyn CategoryRepository;

    /// Get movement repository
    fn movements(&self) -> &dyn MovementRepository;
}
