//! Shopping Basket Models

use crate::catalog::Product;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use crate::store::BasketItem;

/// A basket quantity; always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "i64")]
pub struct Quantity(u32);

impl Quantity {
    pub const ONE: Quantity = Quantity(1);

    pub fn new(value: u32) -> Option<Self> {
        (value >= 1).then_some(Quantity(value))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidQuantity(i64);

impl fmt::Display for InvalidQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "quantity must be a whole number between 1 and {}, got {}",
            u32::MAX,
            self.0
        )
    }
}

impl TryFrom<i64> for Quantity {
    type Error = InvalidQuantity;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .ok()
            .and_then(Quantity::new)
            .ok_or(InvalidQuantity(value))
    }
}

/// Returns the default quantity (1) for basket adds
fn default_quantity() -> Quantity {
    Quantity::ONE
}

/// Body of `POST /basket/`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BasketItemCreate {
    pub product_id: i64,

    /// Quantity to add (defaults to 1)
    #[serde(default = "default_quantity")]
    pub quantity: Quantity,
}

/// Body of `PUT /basket/{item_id}`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BasketItemUpdate {
    pub quantity: Quantity,
}

/// A basket row with its product joined in, as returned by every basket read.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BasketItemView {
    pub id: i64,
    pub product_id: i64,
    pub quantity: u32,
    pub product: Product,
}

impl BasketItemView {
    pub fn join(item: BasketItem, product: Product) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            quantity: item.quantity,
            product,
        }
    }
}
