//! In-memory node table.
//!
//! Rows live in a `BTreeMap` keyed by id. A transaction snapshots the whole
//! table on [`begin`](IntervalStore::begin) and restores it on
//! [`rollback`](IntervalStore::rollback), which is plenty for the forest
//! sizes this store is meant for (tests and embedding without a database).

use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::node::{NewRow, Node, NodeId};
use crate::store::{Filter, IntervalStore, Update};

#[derive(Debug, Clone)]
struct Snapshot {
    rows: BTreeMap<NodeId, Node>,
    next_id: i64,
}

#[derive(Debug, Clone)]
pub struct MemoryStore {
    rows: BTreeMap<NodeId, Node>,
    next_id: i64,
    snapshot: Option<Snapshot>,
    /// Remaining successful writes before an injected failure.
    fail_after: Option<usize>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
            snapshot: None,
            fail_after: None,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Makes the write issued after `writes` further successful writes fail
    /// with [`StoreError::Injected`]. The failure fires once.
    pub fn inject_failure(&mut self, writes: usize) {
        self.fail_after = Some(writes);
    }

    fn charge_write(&mut self) -> Result<(), StoreError> {
        match self.fail_after {
            Some(0) => {
                self.fail_after = None;
                Err(StoreError::Injected("write budget exhausted".into()))
            }
            Some(n) => {
                self.fail_after = Some(n - 1);
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl IntervalStore for MemoryStore {
    fn insert(&mut self, row: NewRow) -> Result<NodeId, StoreError> {
        self.charge_write()?;
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.rows.insert(
            id,
            Node {
                id,
                label: row.label,
                parent: row.parent,
                left: row.interval.left,
                right: row.interval.right,
                depth: row.depth,
            },
        );
        Ok(id)
    }

    fn get(&self, id: NodeId) -> Result<Option<Node>, StoreError> {
        Ok(self.rows.get(&id).cloned())
    }

    fn update(&mut self, update: Update, filter: &Filter) -> Result<usize, StoreError> {
        self.charge_write()?;
        let mut count = 0;
        for row in self.rows.values_mut() {
            if filter.matches(row) {
                update.apply(row);
                count += 1;
            }
        }
        Ok(count)
    }

    fn delete(&mut self, filter: &Filter) -> Result<usize, StoreError> {
        self.charge_write()?;
        let before = self.rows.len();
        self.rows.retain(|_, row| !filter.matches(row));
        Ok(before - self.rows.len())
    }

    fn max_right(&self) -> Result<Option<i64>, StoreError> {
        Ok(self.rows.values().map(|row| row.right).max())
    }

    fn select(&self, filter: &Filter) -> Result<Vec<Node>, StoreError> {
        let mut out: Vec<Node> = self
            .rows
            .values()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect();
        out.sort_by_key(|row| row.left);
        Ok(out)
    }

    fn begin(&mut self) -> Result<(), StoreError> {
        if self.snapshot.is_some() {
            return Err(StoreError::NestedTransaction);
        }
        self.snapshot = Some(Snapshot {
            rows: self.rows.clone(),
            next_id: self.next_id,
        });
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        self.snapshot
            .take()
            .map(drop)
            .ok_or(StoreError::NoTransaction)
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        let snapshot = self.snapshot.take().ok_or(StoreError::NoTransaction)?;
        self.rows = snapshot.rows;
        // Ids handed out inside the aborted transaction are not reused.
        self.next_id = self.next_id.max(snapshot.next_id);
        Ok(())
    }
}
