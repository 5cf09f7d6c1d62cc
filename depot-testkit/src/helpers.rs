//! Test helper functions for store seeding.

use depot_domain::{NewProduct, Product};
use depot_store::{MemoryStore, Store};
use rust_decimal::Decimal;

/// A product with the bounds used by most scenarios (min 5, max 100).
pub fn product_with_stock(name: &str, quantity: i32) -> NewProduct {
    product_with_bounds(name, quantity, 5, 100)
}

/// A product with explicit threshold bounds.
pub fn product_with_bounds(
    name: &str,
    quantity: i32,
    min_quantity: i32,
    max_quantity: i32,
) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        unit: "unit".to_string(),
        quantity,
        price: Decimal::new(1999, 2),
        min_quantity,
        max_quantity,
        category: "General".to_string(),
    }
}

/// Insert a product into the store and return it with its assigned id.
pub async fn seed_product(store: &MemoryStore, product: NewProduct) -> Product {
    store
        .products()
        .create(&product)
        .await
        .expect("seeding product into memory store")
}
