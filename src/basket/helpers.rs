//! Shopping Basket Business Logic Helpers

use super::models::{BasketItem, BasketItemView, Quantity};
use crate::store::Session;

/// Adds `quantity` of `product_id` to the basket.
///
/// # Behaviour
///
/// * If a row for the same `product_id` already exists, its `quantity` is
///   increased by the incoming amount.
/// * Otherwise a new row is staged.
///
/// The lookup is keyed on `product_id` alone. The store has no uniqueness
/// constraint on that column, so two sessions adding the same new product
/// concurrently can each insert a row.
pub fn merge_into_basket(
    session: &mut Session,
    product_id: i64,
    quantity: Quantity,
) -> BasketItem {
    let mut basket = session.basket_items();

    match basket.find(|item| item.product_id == product_id) {
        Some(mut existing) => {
            existing.quantity = existing.quantity.saturating_add(quantity.get());
            basket.update(existing)
        }
        None => basket.insert(BasketItem {
            id: 0,
            product_id,
            quantity: quantity.get(),
        }),
    }
}

/// Joins each row with the current state of its product.
///
/// Rows whose product no longer exists are dropped.
pub fn join_products(session: &mut Session, items: Vec<BasketItem>) -> Vec<BasketItemView> {
    let mut products = session.products();
    items
        .into_iter()
        .filter_map(|item| {
            let product = products.get(item.product_id)?;
            Some(BasketItemView::join(item, product))
        })
        .collect()
}

/// Produces a one-line summary of the basket, e.g. `"2x Apple, 1x Banana"`.
pub fn format_basket_summary(items: &[BasketItemView]) -> String {
    items
        .iter()
        .map(|i| format!("{}x {}", i.quantity, i.product.name))
        .collect::<Vec<_>>()
        .join(", ")
}
