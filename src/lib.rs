//! Catalog & Basket Library
//!
//! This library provides a product catalog and a single shopping basket
//! served over HTTP.

// Domain modules
pub mod basket;
pub mod catalog;

// Infrastructure
pub mod config;
pub mod error;
pub mod router;
pub mod state;
pub mod store;
