//! HTTP API for the Depot daemon.
//!
//! Provides REST endpoints for:
//! - Health check
//! - Product CRUD and search
//! - Category CRUD
//! - Stock movements (entries, exits, ledger listing)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use depot_domain::{
    Category, CategoryId, MovementRecord, NewCategory, NewProduct, Product, ProductId,
    ThresholdSignal,
};
use depot_engine::{LedgerEngine, LedgerError, MovementOutcome};
use depot_store::{Store, StoreError};

// =============================================================================
// API State
// =============================================================================

/// Shared state for API handlers.
pub struct ApiState<S: Store + 'static> {
    pub store: Arc<S>,
    pub engine: LedgerEngine<S>,
}

// =============================================================================
// Request/Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Query filters for product listing.
#[derive(Debug, Default, Deserialize)]
pub struct ProductFilter {
    /// Substring match on the product name
    pub name: Option<String>,
    /// Exact match on the category name
    pub category: Option<String>,
}

/// Request to record a movement against a product.
#[derive(Debug, Deserialize)]
pub struct MovementRequest {
    pub quantity: i32,
    #[serde(default)]
    pub note: Option<String>,
}

/// Response after a movement was applied.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementResponse {
    #[serde(flatten)]
    pub record: MovementRecord,
    pub quantity_after: i32,
    pub signal: ThresholdSignal,
}

impl From<MovementOutcome> for MovementResponse {
    fn from(outcome: MovementOutcome) -> Self {
        Self {
            record: outcome.record,
            quantity_after: outcome.quantity_after,
            signal: outcome.signal,
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn ledger_error_response(err: LedgerError) -> ApiError {
    let status = match &err {
        LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::InsufficientStock { .. } => StatusCode::CONFLICT,
        LedgerError::InvalidQuantity(_) => StatusCode::UNPROCESSABLE_ENTITY,
        LedgerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse { error: err.to_string() }))
}

fn store_error_response(err: StoreError) -> ApiError {
    let status = match &err {
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::Duplicate { .. } => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse { error: err.to_string() }))
}

fn not_found(what: &str, id: impl std::fmt::Display) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("{} not found: {}", what, id),
        }),
    )
}

// =============================================================================
// Router
// =============================================================================

/// Create the API router.
pub fn create_router<S>(state: Arc<ApiState<S>>) -> Router
where
    S: Store + 'static,
{
    Router::new()
        .route("/health", get(health_handler))
        .route("/products", get(list_products_handler).post(create_product_handler))
        .route("/products/categories", get(categories_in_use_handler))
        .route("/products/:id", get(get_product_handler))
        .route("/products/:id", put(update_product_handler))
        .route("/products/:id", delete(delete_product_handler))
        .route("/products/:id/movements", get(product_movements_handler))
        .route("/products/:id/entries", post(record_entry_handler))
        .route("/products/:id/exits", post(record_exit_handler))
        .route("/movements", get(list_movements_handler))
        .route("/categories", get(list_categories_handler).post(create_category_handler))
        .route("/categories/:id", put(update_category_handler))
        .route("/categories/:id", delete(delete_category_handler))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint.
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// List products, optionally filtered by name substring and/or category.
async fn list_products_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = if filter.name.is_none() && filter.category.is_none() {
        state.store.products().list().await
    } else {
        state
            .store
            .products()
            .search(filter.name.as_deref(), filter.category.as_deref())
            .await
    }
    .map_err(store_error_response)?;

    Ok(Json(products))
}

/// Create a product.
async fn create_product_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    Json(req): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let created = state
        .store
        .products()
        .create(&req)
        .await
        .map_err(store_error_response)?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Get a single product.
async fn get_product_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>, ApiError> {
    let product = state
        .store
        .products()
        .find_by_id(id)
        .await
        .map_err(store_error_response)?
        .ok_or_else(|| not_found("Product", id))?;

    Ok(Json(product))
}

/// Update all mutable fields of a product.
async fn update_product_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    Path(id): Path<ProductId>,
    Json(req): Json<NewProduct>,
) -> Result<StatusCode, ApiError> {
    let product = Product {
        id,
        name: req.name,
        unit: req.unit,
        quantity: req.quantity,
        price: req.price,
        min_quantity: req.min_quantity,
        max_quantity: req.max_quantity,
        category: req.category,
    };

    let updated = state
        .store
        .products()
        .update(&product)
        .await
        .map_err(store_error_response)?;

    if updated {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("Product", id))
    }
}

/// Delete a product. Its ledger history is kept.
async fn delete_product_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .store
        .products()
        .delete(id)
        .await
        .map_err(store_error_response)?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("Product", id))
    }
}

/// Distinct category names referenced by products.
async fn categories_in_use_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
) -> Result<Json<Vec<String>>, ApiError> {
    let names = state
        .store
        .products()
        .categories_in_use()
        .await
        .map_err(store_error_response)?;

    Ok(Json(names))
}

/// Record a stock entry for a product.
async fn record_entry_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    Path(id): Path<ProductId>,
    Json(req): Json<MovementRequest>,
) -> Result<(StatusCode, Json<MovementResponse>), ApiError> {
    let outcome = state
        .engine
        .record_entry(id, req.quantity, req.note)
        .await
        .map_err(ledger_error_response)?;

    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// Record a stock exit for a product.
async fn record_exit_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    Path(id): Path<ProductId>,
    Json(req): Json<MovementRequest>,
) -> Result<(StatusCode, Json<MovementResponse>), ApiError> {
    let outcome = state
        .engine
        .record_exit(id, req.quantity, req.note)
        .await
        .map_err(ledger_error_response)?;

    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// Full movement ledger, newest first.
async fn list_movements_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
) -> Result<Json<Vec<MovementRecord>>, ApiError> {
    let records = state
        .engine
        .list_movements(None)
        .await
        .map_err(ledger_error_response)?;

    Ok(Json(records))
}

/// Movement ledger for one product, newest first.
async fn product_movements_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    Path(id): Path<ProductId>,
) -> Result<Json<Vec<MovementRecord>>, ApiError> {
    let records = state
        .engine
        .list_movements(Some(id))
        .await
        .map_err(ledger_error_response)?;

    Ok(Json(records))
}

/// List categories.
async fn list_categories_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = state
        .store
        .categories()
        .list()
        .await
        .map_err(store_error_response)?;

    Ok(Json(categories))
}

/// Create a category.
async fn create_category_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    Json(req): Json<NewCategory>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let created = state
        .store
        .categories()
        .create(&req)
        .await
        .map_err(store_error_response)?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a category.
async fn update_category_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    Path(id): Path<CategoryId>,
    Json(req): Json<NewCategory>,
) -> Result<StatusCode, ApiError> {
    let category = Category {
        id,
        name: req.name,
        size: req.size,
        packaging: req.packaging,
    };

    let updated = state
        .store
        .categories()
        .update(&category)
        .await
        .map_err(store_error_response)?;

    if updated {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("Category", id))
    }
}

/// Delete a category.
async fn delete_category_handler<S: Store + 'static>(
    State(state): State<Arc<ApiState<S>>>,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .store
        .categories()
        .delete(id)
        .await
        .map_err(store_error_response)?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("Category", id))
    }
}
