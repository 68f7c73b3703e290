//! Row definitions for the two persisted tables.

use serde::{Deserialize, Serialize};

/// A row that lives in a [`Table`](super::table::Table) under a store-assigned id.
pub trait Row: Clone + PartialEq + Send + Sync + 'static {
    fn id(&self) -> i64;
    fn set_id(&mut self, id: i64);
}

/// `products` table row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
    pub stock: i64,
}

/// `basket_items` table row
///
/// `product_id` is not a checked foreign key: deleting a product leaves any
/// basket rows that point at it in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BasketItem {
    pub id: i64,
    pub product_id: i64,
    pub quantity: u32,
}

impl Row for Product {
    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

impl Row for BasketItem {
    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}
