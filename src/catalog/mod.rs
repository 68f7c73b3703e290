//! Product Catalog Domain Module
//!
//! This module contains everything about products:
//! - Request models (create payload, partial update payload)
//! - The field-by-field update merge
//! - REST API handlers

pub mod handlers;
pub mod helpers;
pub mod models;

pub use handlers::routes;
pub use models::{Field, Product, ProductCreate, ProductUpdate};
