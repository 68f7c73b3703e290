//! Application State
//!
//! Shared state handed to every handler, and the extractor that opens a
//! storage session per request.

use crate::config::Settings;
use crate::store::{Session, Store};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;
use std::sync::Arc;

/// Shared application state that can be safely passed between threads
pub type SharedState = Arc<AppState>;

/// Core application state: the store and the settings it was started with
pub struct AppState {
    pub store: Arc<Store>,
    pub settings: Settings,
}

impl AppState {
    pub fn new(store: Store, settings: Settings) -> Self {
        Self {
            store: Arc::new(store),
            settings,
        }
    }

    /// In-memory store with default settings.
    pub fn in_memory() -> Self {
        Self::new(Store::in_memory(), Settings::default())
    }
}

/// Each handler that names a `Session` argument gets a fresh one.
#[async_trait]
impl FromRequestParts<SharedState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        Ok(state.store.session())
    }
}
