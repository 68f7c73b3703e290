//! Unit-of-work handle handed to each request.

use super::schema::{BasketItem, Product};
use super::table::{Staged, TableView};
use super::{Store, StoreError};
use std::sync::Arc;
use tracing::debug;

/// Scoped storage session.
///
/// Writes are staged until [`Session::commit`]; a session dropped without
/// committing leaves the store untouched.
pub struct Session {
    store: Arc<Store>,
    products: Staged<Product>,
    basket_items: Staged<BasketItem>,
}

impl Session {
    pub(crate) fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            products: Staged::default(),
            basket_items: Staged::default(),
        }
    }

    pub fn products(&mut self) -> TableView<'_, Product> {
        TableView::new(&self.store.products, &mut self.products)
    }

    pub fn basket_items(&mut self) -> TableView<'_, BasketItem> {
        TableView::new(&self.store.basket_items, &mut self.basket_items)
    }

    /// Whether anything has been staged since the session was opened.
    pub fn has_changes(&self) -> bool {
        !self.products.is_empty() || !self.basket_items.is_empty()
    }

    /// Applies every staged write, or none of them.
    ///
    /// Fails with [`StoreError::Conflict`] when a row this session updates
    /// was changed, deleted or cleared by a session that committed first.
    /// When the store is file-backed the snapshot is written before the
    /// tables are touched, so a failed write commits nothing either.
    pub async fn commit(self) -> Result<(), StoreError> {
        if !self.has_changes() {
            return Ok(());
        }

        let store = self.store;
        let _guard = store.commit_lock.lock().await;

        if let Some(id) = store.products.conflict(&self.products) {
            return Err(StoreError::Conflict {
                table: "products",
                id,
            });
        }
        if let Some(id) = store.basket_items.conflict(&self.basket_items) {
            return Err(StoreError::Conflict {
                table: "basket_items",
                id,
            });
        }

        if let Some(path) = &store.data_file {
            let snapshot = store.snapshot_with(&self.products, &self.basket_items);
            super::write_snapshot(path, &snapshot).await?;
        }

        store.products.apply(self.products);
        store.basket_items.apply(self.basket_items);
        debug!("session committed");
        Ok(())
    }
}
