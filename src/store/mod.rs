//! In-memory table store with scoped sessions and optional JSON snapshot
//! persistence.
//!
//! The store owns two tables, `products` and `basket_items`. Request handlers
//! never touch the tables directly; they open a [`Session`], read and stage
//! writes through it, then commit.

pub mod schema;
pub mod session;
pub mod table;

pub use schema::{BasketItem, Product, Row};
pub use session::Session;
pub use table::{Table, TableSnapshot, TableView};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use table::Staged;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Store snapshot is malformed: {0}")]
    Snapshot(#[from] serde_json::Error),
    #[error("Row {id} in {table} was changed or removed by another session")]
    Conflict { table: &'static str, id: i64 },
}

/// On-disk layout: both tables with their id counters.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub products: TableSnapshot<Product>,
    pub basket_items: TableSnapshot<BasketItem>,
}

pub struct Store {
    pub(crate) products: Table<Product>,
    pub(crate) basket_items: Table<BasketItem>,
    data_file: Option<PathBuf>,
    commit_lock: tokio::sync::Mutex<()>,
}

impl Store {
    /// Creates an empty store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::from_snapshot(StoreSnapshot::default(), None)
    }

    /// Opens the store, creating the tables if they do not exist yet.
    ///
    /// With a `data_file`, an existing snapshot is loaded; a missing one is
    /// created empty. Opening twice against the same file is harmless.
    pub async fn open(data_file: Option<PathBuf>) -> Result<Self, StoreError> {
        let Some(path) = data_file else {
            info!("using in-memory store");
            return Ok(Self::in_memory());
        };

        let snapshot = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let snapshot: StoreSnapshot = serde_json::from_slice(&bytes)?;
                info!(
                    path = %path.display(),
                    products = snapshot.products.rows.len(),
                    basket_items = snapshot.basket_items.rows.len(),
                    "loaded store snapshot"
                );
                snapshot
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let snapshot = StoreSnapshot::default();
                write_snapshot(&path, &snapshot).await?;
                info!(path = %path.display(), "created empty store snapshot");
                snapshot
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        Ok(Self::from_snapshot(snapshot, Some(path)))
    }

    fn from_snapshot(snapshot: StoreSnapshot, data_file: Option<PathBuf>) -> Self {
        Self {
            products: Table::from_snapshot(snapshot.products),
            basket_items: Table::from_snapshot(snapshot.basket_items),
            data_file,
            commit_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Opens a new session against this store.
    pub fn session(self: &Arc<Self>) -> Session {
        Session::new(Arc::clone(self))
    }

    pub fn products(&self) -> &Table<Product> {
        &self.products
    }

    pub fn basket_items(&self) -> &Table<BasketItem> {
        &self.basket_items
    }

    pub(crate) fn snapshot_with(
        &self,
        products: &Staged<Product>,
        basket_items: &Staged<BasketItem>,
    ) -> StoreSnapshot {
        StoreSnapshot {
            products: self.products.snapshot_with(products),
            basket_items: self.basket_items.snapshot_with(basket_items),
        }
    }
}

/// Writes via a sibling temp file and rename so readers never see a torn file.
pub(crate) async fn write_snapshot(
    path: &Path,
    snapshot: &StoreSnapshot,
) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }

    let bytes = serde_json::to_vec_pretty(snapshot)?;
    let tmp_path = path.with_extension("tmp");
    tokio::fs::write(&tmp_path, bytes).await.map_err(io_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(io_err)?;
    Ok(())
}
