//! REST API handlers for the product catalog

use super::{helpers::apply_update, models::*};
use crate::error::{ApiError, ApiJson, ApiPath, PRODUCT_NOT_FOUND};
use crate::state::SharedState;
use crate::store::Session;
use axum::{http::StatusCode, routing::get, Json, Router};
use tracing::info;

/// Creates routes for product operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/products/", get(list_products).post(create_product))
        .route("/products", get(list_products).post(create_product)) // Trailing slash safety
        .route(
            "/products/:product_id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

/// Endpoint: POST /products/
async fn create_product(
    mut session: Session,
    ApiJson(payload): ApiJson<ProductCreate>,
) -> Result<Json<Product>, ApiError> {
    let product = session.products().insert(payload.into_row());
    session.commit().await?;

    info!(product_id = product.id, name = %product.name, "product created");
    Ok(Json(product))
}

/// Endpoint: GET /products/
async fn list_products(mut session: Session) -> Json<Vec<Product>> {
    Json(session.products().all())
}

/// Endpoint: GET /products/{id}
async fn get_product(
    mut session: Session,
    ApiPath(product_id): ApiPath<i64>,
) -> Result<Json<Product>, ApiError> {
    session
        .products()
        .get(product_id)
        .map(Json)
        .ok_or(ApiError::NotFound(PRODUCT_NOT_FOUND))
}

/// Endpoint: PUT /products/{id}
/// Partial update: fields left out of the body keep their current values.
async fn update_product(
    mut session: Session,
    ApiPath(product_id): ApiPath<i64>,
    ApiJson(payload): ApiJson<ProductUpdate>,
) -> Result<Json<Product>, ApiError> {
    let mut product = session
        .products()
        .get(product_id)
        .ok_or(ApiError::NotFound(PRODUCT_NOT_FOUND))?;

    apply_update(&mut product, payload);
    let product = session.products().update(product);
    session.commit().await?;

    info!(product_id, "product updated");
    Ok(Json(product))
}

/// Endpoint: DELETE /products/{id}
/// Basket rows referencing the product are left in place.
async fn delete_product(
    mut session: Session,
    ApiPath(product_id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    if !session.products().delete(product_id) {
        return Err(ApiError::NotFound(PRODUCT_NOT_FOUND));
    }
    session.commit().await?;

    info!(product_id, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}
