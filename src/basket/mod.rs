//! Shopping Basket Domain Module
//!
//! This module contains all basket logic, including:
//! - Request and response models
//! - The quantity-merge rule for repeated adds
//! - REST API handlers

pub mod handlers;
pub mod helpers;
pub mod models;

pub use handlers::routes;
pub use models::{BasketItem, BasketItemCreate, BasketItemUpdate, BasketItemView, Quantity};
