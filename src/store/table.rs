//! Committed table contents and the per-session staging area layered on top.

use super::schema::Row;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicI64, Ordering};

/// Committed rows of one table, keyed by id.
/// DashMap lets concurrent sessions read without an external lock.
pub struct Table<R> {
    rows: DashMap<i64, R>,
    next_id: AtomicI64,
}

/// Serialized form of a table inside the snapshot file.
#[derive(Debug, Serialize, Deserialize)]
pub struct TableSnapshot<R> {
    pub next_id: i64,
    pub rows: Vec<R>,
}

impl<R> Default for TableSnapshot<R> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: Vec::new(),
        }
    }
}

impl<R: Row> Default for Table<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Row> Table<R> {
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Rebuilds a table from a snapshot. The id counter never moves backwards
    /// past an id that is already in use.
    pub fn from_snapshot(snapshot: TableSnapshot<R>) -> Self {
        let highest = snapshot.rows.iter().map(Row::id).max().unwrap_or(0);
        let rows = snapshot.rows.into_iter().map(|r| (r.id(), r)).collect();
        Self {
            rows,
            next_id: AtomicI64::new(snapshot.next_id.max(highest.saturating_add(1))),
        }
    }

    pub(crate) fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    pub fn get(&self, id: i64) -> Option<R> {
        self.rows.get(&id).map(|entry| entry.value().clone())
    }

    /// All committed rows in ascending id order.
    pub fn rows(&self) -> Vec<R> {
        self.merged(&Staged::default())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Committed rows with `staged` layered on top, in ascending id order.
    pub(crate) fn merged(&self, staged: &Staged<R>) -> Vec<R> {
        let mut merged: BTreeMap<i64, R> = if staged.cleared {
            BTreeMap::new()
        } else {
            self.rows
                .iter()
                .map(|entry| (*entry.key(), entry.value().clone()))
                .collect()
        };
        for id in &staged.deletes {
            merged.remove(id);
        }
        for (id, update) in &staged.updates {
            merged.insert(*id, update.row.clone());
        }
        for (id, row) in &staged.inserts {
            merged.insert(*id, row.clone());
        }
        merged.into_values().collect()
    }

    pub(crate) fn snapshot_with(&self, staged: &Staged<R>) -> TableSnapshot<R> {
        TableSnapshot {
            next_id: self.next_id.load(Ordering::SeqCst),
            rows: self.merged(staged),
        }
    }

    /// Finds the first staged update whose row no longer matches what the
    /// session read, i.e. another session changed or removed it since.
    pub(crate) fn conflict(&self, staged: &Staged<R>) -> Option<i64> {
        staged.updates.iter().find_map(|(id, update)| {
            let current = self.get(*id);
            match (&update.expected, current) {
                (Some(expected), Some(current)) if *expected == current => None,
                _ => Some(*id),
            }
        })
    }

    pub(crate) fn apply(&self, staged: Staged<R>) {
        if staged.cleared {
            self.rows.clear();
        }
        for id in staged.deletes {
            self.rows.remove(&id);
        }
        for (id, update) in staged.updates {
            self.rows.insert(id, update.row);
        }
        for (id, row) in staged.inserts {
            self.rows.insert(id, row);
        }
    }
}

/// A staged replacement of a committed row, with the committed value it
/// was based on.
#[derive(Debug)]
pub(crate) struct StagedUpdate<R> {
    expected: Option<R>,
    row: R,
}

/// Writes made inside one session that are not yet committed.
#[derive(Debug)]
pub(crate) struct Staged<R> {
    cleared: bool,
    inserts: BTreeMap<i64, R>,
    updates: BTreeMap<i64, StagedUpdate<R>>,
    deletes: BTreeSet<i64>,
    /// Committed rows as first read by the session.
    observed: BTreeMap<i64, R>,
}

impl<R> Default for Staged<R> {
    fn default() -> Self {
        Self {
            cleared: false,
            inserts: BTreeMap::new(),
            updates: BTreeMap::new(),
            deletes: BTreeSet::new(),
            observed: BTreeMap::new(),
        }
    }
}

impl<R> Staged<R> {
    pub(crate) fn is_empty(&self) -> bool {
        !self.cleared
            && self.inserts.is_empty()
            && self.updates.is_empty()
            && self.deletes.is_empty()
    }
}

/// A session's read/write handle on one table.
///
/// Reads see the session's own staged writes over the committed rows.
/// Committed rows read through the view are remembered so that a later
/// [`update`](TableView::update) only commits if nobody else touched them.
pub struct TableView<'s, R> {
    table: &'s Table<R>,
    staged: &'s mut Staged<R>,
}

impl<'s, R: Row> TableView<'s, R> {
    pub(crate) fn new(table: &'s Table<R>, staged: &'s mut Staged<R>) -> Self {
        Self { table, staged }
    }

    pub fn get(&mut self, id: i64) -> Option<R> {
        if self.staged.deletes.contains(&id) {
            return None;
        }
        if let Some(row) = self.staged.inserts.get(&id) {
            return Some(row.clone());
        }
        if let Some(update) = self.staged.updates.get(&id) {
            return Some(update.row.clone());
        }
        if self.staged.cleared {
            return None;
        }
        let row = self.table.get(id)?;
        self.observe(&row);
        Some(row)
    }

    pub fn all(&self) -> Vec<R> {
        self.table.merged(self.staged)
    }

    /// First row (in id order) matching `predicate`.
    pub fn find<P>(&mut self, predicate: P) -> Option<R>
    where
        P: Fn(&R) -> bool,
    {
        let found = self.all().into_iter().find(|row| predicate(row))?;
        self.observe(&found);
        Some(found)
    }

    fn observe(&mut self, row: &R) {
        let id = row.id();
        if self.staged.inserts.contains_key(&id) || self.staged.updates.contains_key(&id) {
            return;
        }
        self.staged
            .observed
            .entry(id)
            .or_insert_with(|| row.clone());
    }

    /// Stages `row` under a freshly assigned id and returns the stored row.
    pub fn insert(&mut self, mut row: R) -> R {
        let id = self.table.allocate_id();
        row.set_id(id);
        self.staged.inserts.insert(id, row.clone());
        row
    }

    /// Stages a replacement for the row with the same id.
    ///
    /// Replacing a committed row only commits if that row is still exactly
    /// as this session first read it; otherwise the commit fails with
    /// [`StoreError::Conflict`](super::StoreError::Conflict).
    pub fn update(&mut self, row: R) -> R {
        let id = row.id();
        if let Some(inserted) = self.staged.inserts.get_mut(&id) {
            *inserted = row.clone();
            return row;
        }
        if let Some(update) = self.staged.updates.get_mut(&id) {
            update.row = row.clone();
            return row;
        }

        let expected = match self.staged.observed.get(&id) {
            Some(observed) => Some(observed.clone()),
            None if self.staged.cleared => None,
            None => self.table.get(id),
        };
        self.staged.deletes.remove(&id);
        self.staged.updates.insert(
            id,
            StagedUpdate {
                expected,
                row: row.clone(),
            },
        );
        row
    }

    /// Stages removal of `id`. Returns `false` when no such row is visible.
    pub fn delete(&mut self, id: i64) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.staged.inserts.remove(&id);
        self.staged.updates.remove(&id);
        self.staged.deletes.insert(id);
        true
    }

    /// Stages removal of every row, committed or staged.
    pub fn clear(&mut self) {
        self.staged.cleared = true;
        self.staged.inserts.clear();
        self.staged.updates.clear();
        self.staged.deletes.clear();
    }
}
