//! Stock-movement orchestration.
//!
//! `LedgerEngine` is the only writer of product quantities. Each operation
//! validates its input, delegates the atomic update-and-append to the store's
//! movement transaction, and reports the advisory threshold signal for the
//! resulting quantity.

use crate::error::{LedgerError, LedgerResult};
use depot_domain::{MovementRecord, NewMovement, ProductId, ThresholdSignal};
use depot_store::{AppliedMovement, Store, StoreError};
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of a successfully applied movement.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementOutcome {
    /// The ledger row created by the transaction
    pub record: MovementRecord,
    /// The product's quantity after the adjustment
    pub quantity_after: i32,
    /// Advisory classification against the product's min/max bounds
    pub signal: ThresholdSignal,
}

impl From<AppliedMovement> for MovementOutcome {
    fn from(applied: AppliedMovement) -> Self {
        let signal = applied.product.threshold_signal();
        Self {
            record: applied.record,
            quantity_after: applied.product.quantity,
            signal,
        }
    }
}

/// The stock ledger engine.
///
/// Holds a shared store handle; performs no internal threading. Concurrency
/// safety for simultaneous movements on the same product comes from the
/// store's transactional conditional update.
pub struct LedgerEngine<S: Store> {
    store: Arc<S>,
}

impl<S: Store> Clone for LedgerEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: Store> LedgerEngine<S> {
    /// Create an engine over a shared store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Record a stock entry: increase the product's quantity and append an
    /// Entry ledger row, atomically.
    ///
    /// # Errors
    /// - `InvalidQuantity` if `quantity <= 0` (checked before any store call)
    /// - `NotFound` if the product does not exist
    /// - `Store` on persistence failures (rolled back, nothing written)
    pub async fn record_entry(
        &self,
        product_id: ProductId,
        quantity: i32,
        note: Option<String>,
    ) -> LedgerResult<MovementOutcome> {
        if quantity <= 0 {
            return Err(LedgerError::InvalidQuantity(quantity));
        }

        let applied = self
            .store
            .movements()
            .apply(&NewMovement::entry(product_id, quantity, note))
            .await
            .map_err(map_movement_error)?;

        Ok(self.finish(applied))
    }

    /// Record a stock exit: decrease the product's quantity and append an
    /// Exit ledger row, atomically. Rejected with `InsufficientStock` if the
    /// requested quantity exceeds the on-hand quantity.
    ///
    /// The pre-transaction read below rejects hopeless requests without
    /// opening a write transaction; sufficiency is re-validated inside the
    /// transaction by the store's conditional update, which is what actually
    /// closes the race between concurrent exits.
    pub async fn record_exit(
        &self,
        product_id: ProductId,
        quantity: i32,
        note: Option<String>,
    ) -> LedgerResult<MovementOutcome> {
        if quantity <= 0 {
            return Err(LedgerError::InvalidQuantity(quantity));
        }

        let product = self
            .store
            .products()
            .find_by_id(product_id)
            .await?
            .ok_or(LedgerError::NotFound(product_id))?;

        if product.quantity < quantity {
            warn!(
                product_id,
                requested = quantity,
                available = product.quantity,
                "Exit rejected: insufficient stock"
            );
            return Err(LedgerError::InsufficientStock {
                product_id,
                requested: quantity,
                available: product.quantity,
            });
        }

        let applied = self
            .store
            .movements()
            .apply(&NewMovement::exit(product_id, quantity, note))
            .await
            .map_err(map_movement_error)?;

        Ok(self.finish(applied))
    }

    /// Return the full ledger, or the subset for one product, ordered by
    /// (date desc, id desc).
    pub async fn list_movements(
        &self,
        product_id: Option<ProductId>,
    ) -> LedgerResult<Vec<MovementRecord>> {
        let records = match product_id {
            Some(id) => self.store.movements().list_for_product(id).await?,
            None => self.store.movements().list_all().await?,
        };
        Ok(records)
    }

    fn finish(&self, applied: AppliedMovement) -> MovementOutcome {
        let outcome = MovementOutcome::from(applied);
        info!(
            movement_id = outcome.record.id,
            product_id = outcome.record.product_id,
            kind = %outcome.record.kind,
            quantity = outcome.record.quantity,
            quantity_after = outcome.quantity_after,
            "Movement recorded"
        );
        if outcome.signal.is_breach() {
            warn!(product_id = outcome.record.product_id, signal = %outcome.signal, "Threshold breached");
        }
        outcome
    }
}

/// Lift the store's semantic failures into the engine taxonomy.
fn map_movement_error(err: StoreError) -> LedgerError {
    match err {
        StoreError::NotFound { entity_type, id } => match id.parse::<ProductId>() {
            Ok(product_id) => LedgerError::NotFound(product_id),
            Err(_) => LedgerError::Store(StoreError::NotFound { entity_type, id }),
        },
        StoreError::InsufficientStock {
            product_id,
            requested,
            available,
        } => LedgerError::InsufficientStock {
            product_id,
            requested,
            available,
        },
        other => LedgerError::Store(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use depot_domain::{MovementType, NewMovement};
    use depot_store::MemoryStore;
    use depot_testkit::{product_with_stock, seed_product};

    fn engine(store: &Arc<MemoryStore>) -> LedgerEngine<MemoryStore> {
        LedgerEngine::new(Arc::clone(store))
    }

    #[tokio::test]
    async fn entry_increases_quantity_and_appends_one_record() {
        let store = Arc::new(MemoryStore::new());
        let product = seed_product(&store, product_with_stock("Bolts", 10)).await;
        let engine = engine(&store);

        let outcome = engine
            .record_entry(product.id, 3, Some("restock".to_string()))
            .await
            .unwrap();

        assert_eq!(outcome.quantity_after, 13);
        assert_eq!(outcome.record.kind, MovementType::Entry);
        assert_eq!(outcome.record.quantity, 3);

        let ledger = engine.list_movements(Some(product.id)).await.unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].note.as_deref(), Some("restock"));
    }

    #[tokio::test]
    async fn exit_decreases_quantity_within_bounds() {
        // Start at quantity 10 with bounds [5, 100]; exit 4 -> 6
        let store = Arc::new(MemoryStore::new());
        let product = seed_product(&store, product_with_stock("Washers", 10)).await;
        let engine = engine(&store);

        let outcome = engine
            .record_exit(product.id, 4, Some("sale".to_string()))
            .await
            .unwrap();

        assert_eq!(outcome.quantity_after, 6);
        assert_eq!(outcome.signal, ThresholdSignal::WithinRange);
        assert_eq!(engine.list_movements(Some(product.id)).await.unwrap().len(), 1);

        // Then an exit of 10 on quantity 6 fails, leaving everything untouched
        let err = engine
            .record_exit(product.id, 10, Some("sale2".to_string()))
            .await
            .unwrap_err();
        match err {
            LedgerError::InsufficientStock { requested, available, .. } => {
                assert_eq!(requested, 10);
                assert_eq!(available, 6);
            },
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        let unchanged = store.products().find_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(unchanged.quantity, 6);
        assert_eq!(engine.list_movements(Some(product.id)).await.unwrap().len(), 1);

        // Entry of 2 on quantity 6 -> 8, still within range since min=5
        let outcome = engine
            .record_entry(product.id, 2, Some("restock".to_string()))
            .await
            .unwrap();
        assert_eq!(outcome.quantity_after, 8);
        assert_eq!(outcome.signal, ThresholdSignal::WithinRange);
    }

    #[tokio::test]
    async fn exit_below_minimum_signals_but_succeeds() {
        let store = Arc::new(MemoryStore::new());
        let product = seed_product(&store, product_with_stock("Washers", 6)).await;
        let engine = engine(&store);

        let outcome = engine.record_exit(product.id, 3, None).await.unwrap();

        assert_eq!(outcome.quantity_after, 3);
        assert_eq!(
            outcome.signal,
            ThresholdSignal::BelowMinimum {
                product: "Washers".to_string(),
                min_quantity: 5
            }
        );
    }

    #[tokio::test]
    async fn entry_above_maximum_signals_but_succeeds() {
        let store = Arc::new(MemoryStore::new());
        let product = seed_product(&store, product_with_stock("Washers", 95)).await;
        let engine = engine(&store);

        let outcome = engine.record_entry(product.id, 10, None).await.unwrap();

        assert_eq!(outcome.quantity_after, 105);
        assert_eq!(
            outcome.signal,
            ThresholdSignal::AboveMaximum {
                product: "Washers".to_string(),
                max_quantity: 100
            }
        );
    }

    #[tokio::test]
    async fn non_positive_quantities_are_rejected_before_the_store() {
        let store = Arc::new(MemoryStore::new());
        let product = seed_product(&store, product_with_stock("Bolts", 10)).await;
        let engine = engine(&store);

        for quantity in [0, -4] {
            let entry_err = engine.record_entry(product.id, quantity, None).await.unwrap_err();
            assert!(matches!(entry_err, LedgerError::InvalidQuantity(q) if q == quantity));
            let exit_err = engine.record_exit(product.id, quantity, None).await.unwrap_err();
            assert!(matches!(exit_err, LedgerError::InvalidQuantity(q) if q == quantity));
        }

        assert_eq!(store.movement_count(), 0);
        let unchanged = store.products().find_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(unchanged.quantity, 10);
    }

    #[tokio::test]
    async fn movements_on_unknown_products_fail_cleanly() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(&store);

        assert!(matches!(
            engine.record_entry(99, 1, None).await.unwrap_err(),
            LedgerError::NotFound(99)
        ));
        assert!(matches!(
            engine.record_exit(99, 1, None).await.unwrap_err(),
            LedgerError::NotFound(99)
        ));
        assert_eq!(store.movement_count(), 0);
    }

    #[tokio::test]
    async fn failed_then_corrected_exit_produces_exactly_one_effect() {
        let store = Arc::new(MemoryStore::new());
        let product = seed_product(&store, product_with_stock("Bolts", 5)).await;
        let engine = engine(&store);

        engine.record_exit(product.id, 9, None).await.unwrap_err();
        let outcome = engine.record_exit(product.id, 2, None).await.unwrap();

        assert_eq!(outcome.quantity_after, 3);
        // No ghost row from the failed attempt
        assert_eq!(engine.list_movements(Some(product.id)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_movements_orders_newest_date_first() {
        let store = Arc::new(MemoryStore::new());
        let product = seed_product(&store, product_with_stock("Bolts", 50)).await;
        let engine = engine(&store);

        let d1 = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 5, 9).unwrap();

        // Backdated rows inserted directly through the store
        store
            .movements()
            .apply(&NewMovement::exit(product.id, 1, None).on_date(d1))
            .await
            .unwrap();
        store
            .movements()
            .apply(&NewMovement::exit(product.id, 1, None).on_date(d2))
            .await
            .unwrap();

        let ledger = engine.list_movements(Some(product.id)).await.unwrap();
        assert_eq!(ledger[0].date, d2);
        assert_eq!(ledger[1].date, d1);
    }

    #[tokio::test]
    async fn list_movements_without_filter_returns_whole_ledger() {
        let store = Arc::new(MemoryStore::new());
        let a = seed_product(&store, product_with_stock("A", 10)).await;
        let b = seed_product(&store, product_with_stock("B", 10)).await;
        let engine = engine(&store);

        engine.record_entry(a.id, 1, None).await.unwrap();
        engine.record_entry(b.id, 2, None).await.unwrap();

        assert_eq!(engine.list_movements(None).await.unwrap().len(), 2);
        assert_eq!(engine.list_movements(Some(a.id)).await.unwrap().len(), 1);
    }
}
