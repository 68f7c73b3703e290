//! Product Catalog Helpers

use super::models::{Product, ProductUpdate};

/// Merges `update` into `product`, one field at a time.
///
/// Only fields present in the request change; the id is never touched.
pub fn apply_update(product: &mut Product, update: ProductUpdate) {
    let ProductUpdate {
        name,
        price,
        description,
        stock,
    } = update;

    name.apply_to(&mut product.name);
    price.apply_to(&mut product.price);
    description.apply_to(&mut product.description);
    stock.apply_to(&mut product.stock);
}
