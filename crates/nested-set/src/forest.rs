//! Tree mutation API.
//!
//! Every mutation resolves a [`Placement`] to a boundary position from the
//! anchor's current row, relocates the moving node there, and runs as one
//! store transaction. Node arguments are refreshed from the store before the
//! call returns, so callers can keep using them.

use crate::config::ForestConfig;
use crate::error::{ForestError, Result};
use crate::node::{NewRow, Node, NodeId};
use crate::print::print_forest;
use crate::relocate::{relocate, Relocation};
use crate::store::{atomically, Filter, IntervalStore, Update};
use crate::validate;

/// Where a node should end up, relative to an anchor node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Last child of the anchor.
    LastChildOf(NodeId),
    /// First child of the anchor.
    FirstChildOf(NodeId),
    /// Previous sibling of the anchor.
    Before(NodeId),
    /// Next sibling of the anchor.
    After(NodeId),
    /// New trailing root.
    Detached,
}

/// A nested-set forest over an injected store.
#[derive(Debug)]
pub struct Forest<S> {
    store: S,
    config: ForestConfig,
}

pub(crate) fn fetch<S: IntervalStore + ?Sized>(store: &S, id: NodeId) -> Result<Node> {
    store.get(id)?.ok_or(ForestError::NotFound(id))
}

/// Boundary position a placement refers to, in current coordinates.
fn resolve<S: IntervalStore + ?Sized>(store: &S, placement: Placement) -> Result<i64> {
    Ok(match placement {
        Placement::LastChildOf(id) => fetch(store, id)?.right,
        Placement::FirstChildOf(id) => fetch(store, id)?.left + 1,
        Placement::Before(id) => fetch(store, id)?.left,
        Placement::After(id) => fetch(store, id)?.right + 1,
        Placement::Detached => store.max_right()?.map_or(0, |max| max + 1),
    })
}

fn place<S: IntervalStore + ?Sized>(
    store: &mut S,
    id: NodeId,
    placement: Placement,
    require_boundary: bool,
) -> Result<Relocation> {
    if placement == Placement::Detached {
        if store.update(Update::SetParent(None), &Filter::id(id))? == 0 {
            return Err(ForestError::NotFound(id));
        }
    }
    let node = fetch(store, id)?;
    let target = resolve(store, placement)?;
    relocate(store, &node, target, require_boundary)
}

impl<S: IntervalStore> Forest<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, ForestConfig::default())
    }

    pub fn with_config(store: S, config: ForestConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn get(&self, id: NodeId) -> Result<Node> {
        fetch(&self.store, id)
    }

    /// Overwrites `node` with its current row.
    pub fn reload(&self, node: &mut Node) -> Result<()> {
        *node = self.get(node.id)?;
        Ok(())
    }

    /// Returns the stored row, or `StaleState` if `node` no longer matches
    /// it positionally.
    pub fn ensure_current(&self, node: &Node) -> Result<Node> {
        let stored = self.get(node.id)?;
        if stored.same_position(node) {
            Ok(stored)
        } else {
            Err(ForestError::StaleState {
                id: node.id,
                held: node.interval(),
                stored: stored.interval(),
            })
        }
    }

    /// Creates a detached root after every existing node.
    pub fn create(&mut self, label: impl Into<String>) -> Result<Node> {
        self.create_at(label, Placement::Detached)
    }

    /// Creates a node and moves it to `placement` in the same transaction.
    pub fn create_at(&mut self, label: impl Into<String>, placement: Placement) -> Result<Node> {
        let label = label.into();
        let require_boundary = self.config.validate_targets;
        let id = atomically(&mut self.store, |store| {
            let left = store.max_right()?.map_or(0, |max| max + 1);
            let id = store.insert(NewRow::detached(label, left))?;
            if placement != Placement::Detached {
                place(store, id, placement, require_boundary)?;
            }
            Ok::<_, ForestError>(id)
        })?;
        self.get(id)
    }

    /// Moves `node` (with its subtree) to `placement`.
    pub fn move_to(&mut self, node: &mut Node, placement: Placement) -> Result<Relocation> {
        let id = node.id;
        let require_boundary = self.config.validate_targets;
        let relocation =
            atomically(&mut self.store, |store| place(store, id, placement, require_boundary))?;
        self.reload(node)?;
        Ok(relocation)
    }

    /// Makes `child` the last child of `parent`.
    pub fn append(&mut self, parent: &mut Node, child: &mut Node) -> Result<Relocation> {
        let relocation = self.move_to(child, Placement::LastChildOf(parent.id))?;
        self.reload(parent)?;
        Ok(relocation)
    }

    /// Makes `child` the first child of `parent`.
    pub fn prepend(&mut self, parent: &mut Node, child: &mut Node) -> Result<Relocation> {
        let relocation = self.move_to(child, Placement::FirstChildOf(parent.id))?;
        self.reload(parent)?;
        Ok(relocation)
    }

    pub fn append_to(&mut self, child: &mut Node, parent: &mut Node) -> Result<Relocation> {
        self.append(parent, child)
    }

    pub fn prepend_to(&mut self, child: &mut Node, parent: &mut Node) -> Result<Relocation> {
        self.prepend(parent, child)
    }

    /// Places `node` immediately before `sibling`, under the same parent.
    pub fn insert_before(&mut self, sibling: &mut Node, node: &mut Node) -> Result<Relocation> {
        let relocation = self.move_to(node, Placement::Before(sibling.id))?;
        self.reload(sibling)?;
        Ok(relocation)
    }

    /// Places `node` immediately after `sibling`, under the same parent.
    pub fn insert_after(&mut self, sibling: &mut Node, node: &mut Node) -> Result<Relocation> {
        let relocation = self.move_to(node, Placement::After(sibling.id))?;
        self.reload(sibling)?;
        Ok(relocation)
    }

    /// Detaches `node` and its subtree into a new trailing root.
    pub fn pop(&mut self, node: &mut Node) -> Result<Relocation> {
        self.move_to(node, Placement::Detached)
    }

    /// Deletes `node` and its whole subtree; returns the number of rows
    /// deleted.
    pub fn remove(&mut self, node: Node) -> Result<usize> {
        let id = node.id;
        let require_boundary = self.config.validate_targets;
        let removed = atomically(&mut self.store, |store| {
            place(store, id, Placement::Detached, require_boundary)?;
            let detached = fetch(store, id)?;
            let removed = store.delete(&Filter::within(detached.interval()))?;
            Ok::<_, ForestError>(removed)
        })?;
        tracing::debug!(node = %id, removed, "removed subtree");
        Ok(removed)
    }

    pub fn set_label(&mut self, node: &mut Node, label: impl Into<String>) -> Result<()> {
        let label = label.into();
        let updated = self
            .store
            .update(Update::SetLabel(label.clone()), &Filter::id(node.id))?;
        if updated == 0 {
            return Err(ForestError::NotFound(node.id));
        }
        node.label = label;
        Ok(())
    }

    /// Checks every global invariant against the whole table.
    pub fn check_invariants(&self) -> Result<()> {
        let rows = self.store.select(&Filter::all())?;
        validate::check(&rows)?;
        Ok(())
    }

    /// Renders the whole forest, one tree per root.
    pub fn print(&self) -> Result<String> {
        Ok(print_forest(&self.store.select(&Filter::all())?))
    }
}
