//! REST API handlers for basket operations
//!
//! Every response that returns basket rows embeds the product as it is
//! stored at the time of the request.

use super::{helpers::*, models::*};
use crate::error::{ApiError, ApiJson, ApiPath, BASKET_ITEM_NOT_FOUND, PRODUCT_NOT_FOUND};
use crate::state::SharedState;
use crate::store::Session;
use axum::{
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::info;

/// Creates routes for basket operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route(
            "/basket/",
            get(get_basket).post(add_to_basket).delete(clear_basket),
        )
        .route(
            "/basket",
            get(get_basket).post(add_to_basket).delete(clear_basket),
        ) // Trailing slash safety
        .route(
            "/basket/:item_id",
            put(update_basket_item).delete(remove_from_basket),
        )
}

/// Endpoint: POST /basket/
/// Adds to the existing row for the product if there is one.
async fn add_to_basket(
    mut session: Session,
    ApiJson(payload): ApiJson<BasketItemCreate>,
) -> Result<Json<BasketItemView>, ApiError> {
    let product = session
        .products()
        .get(payload.product_id)
        .ok_or(ApiError::NotFound(PRODUCT_NOT_FOUND))?;

    let item = merge_into_basket(&mut session, payload.product_id, payload.quantity);
    session.commit().await?;

    info!(
        item_id = item.id,
        product_id = item.product_id,
        quantity = item.quantity,
        "basket item added"
    );
    Ok(Json(BasketItemView::join(item, product)))
}

/// Endpoint: GET /basket/
async fn get_basket(mut session: Session) -> Json<Vec<BasketItemView>> {
    let items = session.basket_items().all();
    Json(join_products(&mut session, items))
}

/// Endpoint: PUT /basket/{item_id}
/// Replaces the quantity outright.
async fn update_basket_item(
    mut session: Session,
    ApiPath(item_id): ApiPath<i64>,
    ApiJson(payload): ApiJson<BasketItemUpdate>,
) -> Result<Json<BasketItemView>, ApiError> {
    let mut item = session
        .basket_items()
        .get(item_id)
        .ok_or(ApiError::NotFound(BASKET_ITEM_NOT_FOUND))?;

    // The row may outlive its product; nothing is committed in that case.
    let product = session
        .products()
        .get(item.product_id)
        .ok_or(ApiError::NotFound(PRODUCT_NOT_FOUND))?;

    item.quantity = payload.quantity.get();
    let item = session.basket_items().update(item);
    session.commit().await?;

    info!(item_id, quantity = item.quantity, "basket item updated");
    Ok(Json(BasketItemView::join(item, product)))
}

/// Endpoint: DELETE /basket/{item_id}
async fn remove_from_basket(
    mut session: Session,
    ApiPath(item_id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    if !session.basket_items().delete(item_id) {
        return Err(ApiError::NotFound(BASKET_ITEM_NOT_FOUND));
    }
    session.commit().await?;

    info!(item_id, "basket item removed");
    Ok(StatusCode::NO_CONTENT)
}

/// Endpoint: DELETE /basket/
/// Always succeeds, including on an empty basket.
async fn clear_basket(mut session: Session) -> Result<StatusCode, ApiError> {
    let items = session.basket_items().all();
    let summary = format_basket_summary(&join_products(&mut session, items));

    session.basket_items().clear();
    session.commit().await?;

    info!(summary = %summary, "basket cleared");
    Ok(StatusCode::NO_CONTENT)
}
