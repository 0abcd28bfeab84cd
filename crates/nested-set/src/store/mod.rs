//! Interval store adapter.
//!
//! The forest never talks to a database directly. It issues the handful of
//! bulk operations below, each described by a [`Filter`] over the integer
//! columns of the node table:
//!
//! | Operation | SQL shape |
//! |-----------|-----------|
//! | [`IntervalStore::insert`] | `INSERT` (returns the new rowid) |
//! | [`IntervalStore::get`] | `SELECT ... WHERE id = ?` |
//! | [`IntervalStore::update`] | `UPDATE ... SET col = col + ? WHERE <filter>` |
//! | [`IntervalStore::delete`] | `DELETE ... WHERE <filter>` |
//! | [`IntervalStore::max_right`] | `SELECT MAX(rgt)` |
//! | [`IntervalStore::select`] | `SELECT ... WHERE <filter> ORDER BY lft` |
//!
//! Filters on an `UPDATE` are evaluated against the values each row had
//! before that statement ran.

use crate::error::StoreError;
use crate::node::{Interval, NewRow, Node, NodeId};

pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

/// Integer column of the node table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    Left,
    Right,
    Depth,
}

impl Column {
    pub fn value_of(self, row: &Node) -> i64 {
        match self {
            Column::Id => row.id.0,
            Column::Left => row.left,
            Column::Right => row.right,
            Column::Depth => row.depth,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cmp {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Cmp {
    pub fn test(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Cmp::Eq => lhs == rhs,
            Cmp::Lt => lhs < rhs,
            Cmp::Le => lhs <= rhs,
            Cmp::Gt => lhs > rhs,
            Cmp::Ge => lhs >= rhs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Condition {
    pub column: Column,
    pub cmp: Cmp,
    pub value: i64,
}

impl Condition {
    pub fn matches(&self, row: &Node) -> bool {
        self.cmp.test(self.column.value_of(row), self.value)
    }
}

/// Conjunction of [`Condition`]s. The empty filter matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn and(mut self, column: Column, cmp: Cmp, value: i64) -> Self {
        self.conditions.push(Condition { column, cmp, value });
        self
    }

    pub fn id(id: NodeId) -> Self {
        Self::all().and(Column::Id, Cmp::Eq, id.0)
    }

    /// Rows inside `interval`, the interval's own row included.
    pub fn within(interval: Interval) -> Self {
        Self::all()
            .and(Column::Left, Cmp::Ge, interval.left)
            .and(Column::Right, Cmp::Le, interval.right)
    }

    /// Rows strictly inside `interval`.
    pub fn strictly_within(interval: Interval) -> Self {
        Self::all()
            .and(Column::Left, Cmp::Gt, interval.left)
            .and(Column::Right, Cmp::Lt, interval.right)
    }

    /// Rows whose interval strictly contains `interval`.
    pub fn enclosing(interval: Interval) -> Self {
        Self::all()
            .and(Column::Left, Cmp::Lt, interval.left)
            .and(Column::Right, Cmp::Gt, interval.right)
    }

    /// `lower <= column <= upper`, either bound optional.
    pub fn between(column: Column, lower: Option<i64>, upper: Option<i64>) -> Self {
        let mut filter = Self::all();
        if let Some(lower) = lower {
            filter = filter.and(column, Cmp::Ge, lower);
        }
        if let Some(upper) = upper {
            filter = filter.and(column, Cmp::Le, upper);
        }
        filter
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn matches(&self, row: &Node) -> bool {
        self.conditions.iter().all(|c| c.matches(row))
    }
}

/// Assignment applied to every row matched by an update filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    /// `column = column + delta`
    Add(Column, i64),
    SetParent(Option<NodeId>),
    SetLabel(String),
}

impl Update {
    pub fn apply(&self, row: &mut Node) {
        match self {
            Update::Add(column, delta) => match column {
                Column::Id => row.id = NodeId(row.id.0 + delta),
                Column::Left => row.left += delta,
                Column::Right => row.right += delta,
                Column::Depth => row.depth += delta,
            },
            Update::SetParent(parent) => row.parent = *parent,
            Update::SetLabel(label) => row.label.clone_from(label),
        }
    }
}

/// Persistence collaborator for a single table of node rows.
///
/// Writes issued between [`begin`](Self::begin) and
/// [`commit`](Self::commit) become visible to other readers all at once or,
/// after [`rollback`](Self::rollback), not at all. Writes outside a
/// transaction are applied immediately.
pub trait IntervalStore {
    /// Inserts a row and returns its freshly assigned id.
    fn insert(&mut self, row: NewRow) -> Result<NodeId, StoreError>;

    fn get(&self, id: NodeId) -> Result<Option<Node>, StoreError>;

    /// Applies `update` to every row matching `filter`; returns the count.
    fn update(&mut self, update: Update, filter: &Filter) -> Result<usize, StoreError>;

    fn delete(&mut self, filter: &Filter) -> Result<usize, StoreError>;

    /// Largest `right` in the table, `None` when empty.
    fn max_right(&self) -> Result<Option<i64>, StoreError>;

    /// Matching rows ordered by `left` ascending.
    fn select(&self, filter: &Filter) -> Result<Vec<Node>, StoreError>;

    fn begin(&mut self) -> Result<(), StoreError>;
    fn commit(&mut self) -> Result<(), StoreError>;
    fn rollback(&mut self) -> Result<(), StoreError>;
}

/// Runs `f` inside one store transaction.
///
/// Commits when `f` succeeds. On any error the transaction is rolled back
/// and the original error is returned; a failing rollback is logged.
pub fn atomically<S, T, E, F>(store: &mut S, f: F) -> Result<T, E>
where
    S: IntervalStore + ?Sized,
    E: From<StoreError>,
    F: FnOnce(&mut S) -> Result<T, E>,
{
    store.begin()?;
    let result = f(store);
    let outcome = match result {
        Ok(value) => store.commit().map(|()| value).map_err(E::from),
        Err(err) => Err(err),
    };
    if outcome.is_err() {
        tracing::debug!("rolling back transaction");
        if let Err(rollback) = store.rollback() {
            tracing::warn!(error = %rollback, "rollback failed");
        }
    }
    outcome
}
