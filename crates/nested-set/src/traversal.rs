//! Read-only queries. Each one is a single interval predicate; results come
//! back in preorder (ascending `left`).

use crate::error::{ForestError, Result};
use crate::forest::{fetch, Forest};
use crate::node::Node;
use crate::store::{Cmp, Column, Filter, IntervalStore};

impl<S: IntervalStore> Forest<S> {
    /// The row to query against: reloaded, or verified current when
    /// `reload_on_read` is off.
    fn current(&self, node: &Node) -> Result<Node> {
        if self.config().reload_on_read {
            self.get(node.id)
        } else {
            self.ensure_current(node)
        }
    }

    pub fn children(&self, node: &Node) -> Result<Vec<Node>> {
        let node = self.current(node)?;
        let filter =
            Filter::strictly_within(node.interval()).and(Column::Depth, Cmp::Eq, node.depth + 1);
        Ok(self.store().select(&filter)?)
    }

    pub fn descendants(&self, node: &Node) -> Result<Vec<Node>> {
        let node = self.current(node)?;
        Ok(self.store().select(&Filter::strictly_within(node.interval()))?)
    }

    /// `node` followed by its descendants.
    pub fn subtree(&self, node: &Node) -> Result<Vec<Node>> {
        let node = self.current(node)?;
        Ok(self.store().select(&Filter::within(node.interval()))?)
    }

    /// Enclosing nodes, outermost first.
    pub fn ancestors(&self, node: &Node) -> Result<Vec<Node>> {
        let node = self.current(node)?;
        Ok(self.store().select(&Filter::enclosing(node.interval()))?)
    }

    /// Innermost enclosing node, derived from intervals.
    pub fn parent_of(&self, node: &Node) -> Result<Option<Node>> {
        Ok(self.ancestors(node)?.pop())
    }

    /// Follows cached parent references `level` times; `0` yields `node`.
    pub fn ancestor_at_level(&self, node: &Node, level: usize) -> Result<Node> {
        let mut current = self.current(node)?;
        for _ in 0..level {
            let parent = current.parent.ok_or(ForestError::NoAncestor {
                id: node.id,
                level,
            })?;
            current = fetch(self.store(), parent)?;
        }
        Ok(current)
    }

    pub fn roots(&self) -> Result<Vec<Node>> {
        Ok(self
            .store()
            .select(&Filter::all().and(Column::Depth, Cmp::Eq, 0))?)
    }

    pub fn all(&self) -> Result<Vec<Node>> {
        Ok(self.store().select(&Filter::all())?)
    }
}
