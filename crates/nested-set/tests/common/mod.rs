#![allow(dead_code)]

use std::collections::HashSet;

use nested_set::{Forest, ForestError, IntervalStore, Node, NodeId};
use nested_set_fuzz::ForestOp;

/// Preorder `(label, depth)` pairs, the shape of a forest without ids or
/// coordinates.
pub fn shape<S: IntervalStore>(forest: &Forest<S>) -> Vec<(String, i64)> {
    forest
        .all()
        .unwrap()
        .into_iter()
        .map(|n| (n.label, n.depth))
        .collect()
}

pub fn labels(nodes: &[Node]) -> Vec<&str> {
    nodes.iter().map(|n| n.label.as_str()).collect()
}

/// Full row layout `(label, left, right, depth)` in preorder.
pub fn layout<S: IntervalStore>(forest: &Forest<S>) -> Vec<(String, i64, i64, i64)> {
    forest
        .all()
        .unwrap()
        .into_iter()
        .map(|n| (n.label, n.left, n.right, n.depth))
        .collect()
}

/// Depth recomputed from scratch as the number of enclosing intervals.
pub fn assert_depths_match_containment(rows: &[Node]) {
    for node in rows {
        let enclosing = rows
            .iter()
            .filter(|other| other.interval().strictly_contains(&node.interval()))
            .count() as i64;
        assert_eq!(node.depth, enclosing, "depth of {node}");
    }
}

/// Applies `op` to `forest`, keeping `live` in sync. Returns `Ok(false)`
/// when the forest refused the op as an invalid target.
pub fn apply<S: IntervalStore>(
    forest: &mut Forest<S>,
    live: &mut Vec<NodeId>,
    op: &ForestOp,
) -> Result<bool, ForestError> {
    let outcome = match op {
        ForestOp::Create { label } => {
            let node = forest.create(label.as_str())?;
            live.push(node.id);
            Ok(())
        }
        ForestOp::Append { parent, child } => {
            let mut parent = forest.get(live[*parent])?;
            let mut child = forest.get(live[*child])?;
            forest.append(&mut parent, &mut child).map(drop)
        }
        ForestOp::Prepend { parent, child } => {
            let mut parent = forest.get(live[*parent])?;
            let mut child = forest.get(live[*child])?;
            forest.prepend(&mut parent, &mut child).map(drop)
        }
        ForestOp::InsertBefore { sibling, node } => {
            let mut sibling = forest.get(live[*sibling])?;
            let mut node = forest.get(live[*node])?;
            forest.insert_before(&mut sibling, &mut node).map(drop)
        }
        ForestOp::InsertAfter { sibling, node } => {
            let mut sibling = forest.get(live[*sibling])?;
            let mut node = forest.get(live[*node])?;
            forest.insert_after(&mut sibling, &mut node).map(drop)
        }
        ForestOp::Pop { node } => {
            let mut node = forest.get(live[*node])?;
            forest.pop(&mut node).map(drop)
        }
        ForestOp::Remove { node } => {
            let node = forest.get(live[*node])?;
            let doomed: HashSet<NodeId> = forest.subtree(&node)?.iter().map(|n| n.id).collect();
            let removed = forest.remove(node)?;
            assert_eq!(removed, doomed.len());
            live.retain(|id| !doomed.contains(id));
            Ok(())
        }
    };
    match outcome {
        Ok(()) => Ok(true),
        Err(ForestError::InvalidTarget { .. }) => Ok(false),
        Err(err) => Err(err),
    }
}

/// The node an op moves, if it is a move.
pub fn moved_node(op: &ForestOp, live: &[NodeId]) -> Option<NodeId> {
    match op {
        ForestOp::Append { child, .. } | ForestOp::Prepend { child, .. } => Some(live[*child]),
        ForestOp::InsertBefore { node, .. } | ForestOp::InsertAfter { node, .. } => {
            Some(live[*node])
        }
        ForestOp::Pop { node } => Some(live[*node]),
        ForestOp::Create { .. } | ForestOp::Remove { .. } => None,
    }
}
