//! Domain Entities for Depot
//!
//! Products, categories, and the append-only movement ledger record.
//! Identity is store-assigned (serial integers).

use crate::value_objects::{MovementType, ThresholdSignal};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Identifiers
// =============================================================================

/// Unique identifier for a Product
pub type ProductId = i32;

/// Unique identifier for a Category
pub type CategoryId = i32;

/// Unique identifier for a MovementRecord
pub type MovementId = i64;

// =============================================================================
// Product
// =============================================================================

/// A tracked inventory product.
///
/// `quantity` holds the invariant `>= 0` and is mutated only through the
/// movement protocol; `min_quantity`/`max_quantity` are informational bounds
/// that produce threshold signals, never rejections. `category` is a
/// free-text reference to a category name, not a foreign key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Store-assigned identifier
    pub id: ProductId,
    /// Display name, unique in practice but not enforced
    pub name: String,
    /// Unit of measure ("box", "kg", ...)
    pub unit: String,
    /// On-hand quantity, never negative
    pub quantity: i32,
    /// Unit price
    pub price: Decimal,
    /// Advisory lower bound for the threshold signal
    pub min_quantity: i32,
    /// Advisory upper bound for the threshold signal
    pub max_quantity: i32,
    /// Category name reference
    pub category: String,
}

impl Product {
    /// Classify the current quantity against the configured bounds.
    pub fn threshold_signal(&self) -> ThresholdSignal {
        if self.quantity < self.min_quantity {
            ThresholdSignal::BelowMinimum {
                product: self.name.clone(),
                min_quantity: self.min_quantity,
            }
        } else if self.quantity > self.max_quantity {
            ThresholdSignal::AboveMaximum {
                product: self.name.clone(),
                max_quantity: self.max_quantity,
            }
        } else {
            ThresholdSignal::WithinRange
        }
    }
}

/// Fields for creating a product; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    /// Display name
    pub name: String,
    /// Unit of measure
    pub unit: String,
    /// Initial on-hand quantity
    pub quantity: i32,
    /// Unit price
    pub price: Decimal,
    /// Advisory lower bound
    pub min_quantity: i32,
    /// Advisory upper bound
    pub max_quantity: i32,
    /// Category name reference
    pub category: String,
}

// =============================================================================
// Category
// =============================================================================

/// A product category. Independent record; no referential integrity is
/// enforced against `Product.category`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Store-assigned identifier
    pub id: CategoryId,
    /// Category name
    pub name: String,
    /// Size descriptor ("S", "M", "500ml", ...)
    pub size: String,
    /// Packaging descriptor ("box", "bag", ...)
    pub packaging: String,
}

/// Fields for creating a category; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    /// Category name
    pub name: String,
    /// Size descriptor
    pub size: String,
    /// Packaging descriptor
    pub packaging: String,
}

// =============================================================================
// MovementRecord
// =============================================================================

/// One row of the stock-movement ledger.
///
/// Created once inside the movement transaction and immutable thereafter.
/// Wire shape: `{ id, productId, type, quantity, note, date }` with `date`
/// as an ISO calendar date string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementRecord {
    /// Store-assigned identifier
    pub id: MovementId,
    /// Product the movement applied to
    pub product_id: ProductId,
    /// Movement direction
    #[serde(rename = "type")]
    pub kind: MovementType,
    /// Units moved, always positive
    pub quantity: i32,
    /// Optional free-text note
    pub note: Option<String>,
    /// Calendar date the movement was recorded on
    pub date: NaiveDate,
}

/// A movement to apply: the input to the ledger transaction.
///
/// `date` of `None` means "the transaction's start date".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovement {
    /// Product to move stock for
    pub product_id: ProductId,
    /// Movement direction
    pub kind: MovementType,
    /// Units to move
    pub quantity: i32,
    /// Optional free-text note
    pub note: Option<String>,
    /// Explicit date, or `None` for the transaction's start date
    pub date: Option<NaiveDate>,
}

impl NewMovement {
    /// Build an entry movement dated at transaction time.
    pub fn entry(product_id: ProductId, quantity: i32, note: Option<String>) -> Self {
        Self {
            product_id,
            kind: MovementType::Entry,
            quantity,
            note,
            date: None,
        }
    }

    /// Build an exit movement dated at transaction time.
    pub fn exit(product_id: ProductId, quantity: i32, note: Option<String>) -> Self {
        Self {
            product_id,
            kind: MovementType::Exit,
            quantity,
            note,
            date: None,
        }
    }

    /// Pin the movement to an explicit calendar date.
    pub fn on_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn product(quantity: i32, min_quantity: i32, max_quantity: i32) -> Product {
        Product {
            id: 7,
            name: "Washers".to_string(),
            unit: "box".to_string(),
            quantity,
            price: Decimal::new(1250, 2),
            min_quantity,
            max_quantity,
            category: "Hardware".to_string(),
        }
    }

    #[test]
    fn threshold_below_minimum() {
        let signal = product(4, 5, 100).threshold_signal();
        assert_eq!(
            signal,
            ThresholdSignal::BelowMinimum {
                product: "Washers".to_string(),
                min_quantity: 5
            }
        );
    }

    #[test]
    fn threshold_above_maximum() {
        let signal = product(101, 5, 100).threshold_signal();
        assert_eq!(
            signal,
            ThresholdSignal::AboveMaximum {
                product: "Washers".to_string(),
                max_quantity: 100
            }
        );
    }

    #[test]
    fn threshold_within_range_is_inclusive_of_bounds() {
        assert_eq!(product(5, 5, 100).threshold_signal(), ThresholdSignal::WithinRange);
        assert_eq!(product(100, 5, 100).threshold_signal(), ThresholdSignal::WithinRange);
        assert_eq!(product(42, 5, 100).threshold_signal(), ThresholdSignal::WithinRange);
    }

    #[test]
    fn movement_record_wire_shape() {
        let record = MovementRecord {
            id: 11,
            product_id: 7,
            kind: MovementType::Exit,
            quantity: 4,
            note: Some("sale".to_string()),
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 11,
                "productId": 7,
                "type": "Exit",
                "quantity": 4,
                "note": "sale",
                "date": "2024-03-15",
            })
        );
    }
}
