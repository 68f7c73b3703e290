//! Product Catalog Models

use serde::{Deserialize, Deserializer};

pub use crate::store::Product;

/// A request field that is either absent from the body or present with a value.
///
/// Unlike `Option<T>`, this keeps "omitted" apart from "explicitly null":
/// `Field<Option<String>>` reads an explicit `null` as `Present(None)`.
/// Use with `#[serde(default)]` so missing keys become [`Field::Missing`].
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    Missing,
    Present(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Missing
    }
}

impl<T> Field<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Field::Present(_))
    }

    /// Overwrites `target` when the field was supplied.
    pub fn apply_to(self, target: &mut T) {
        if let Field::Present(value) = self {
            *target = value;
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Field::Present)
    }
}

/// Body of `POST /products/`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProductCreate {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub description: Option<String>,
    pub stock: i64,
}

impl ProductCreate {
    /// Builds the row to insert; the store assigns the id.
    pub fn into_row(self) -> Product {
        Product {
            id: 0,
            name: self.name,
            price: self.price,
            description: self.description,
            stock: self.stock,
        }
    }
}

/// Body of `PUT /products/{id}`; every field is optional.
///
/// `name`, `price` and `stock` may be omitted but not set to `null`.
/// `description` may be set to `null` to clear it.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ProductUpdate {
    #[serde(default)]
    pub name: Field<String>,
    #[serde(default)]
    pub price: Field<f64>,
    #[serde(default)]
    pub description: Field<Option<String>>,
    #[serde(default)]
    pub stock: Field<i64>,
}
