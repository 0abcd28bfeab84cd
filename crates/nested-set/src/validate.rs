//! Whole-table invariant check.
//!
//! Verifies, for a full table snapshot:
//! - every interval is non-degenerate (`left < right`);
//! - the boundaries are exactly `0..2n`, each used once;
//! - no two intervals partially overlap;
//! - `depth` is the number of enclosing intervals;
//! - the cached `parent` is the innermost enclosing interval.
//!
//! Sibling tiling follows from the boundary and overlap checks together.

use thiserror::Error;

use crate::node::{Node, NodeId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("node {id} has degenerate interval {left}-{right}")]
    Degenerate { id: NodeId, left: i64, right: i64 },
    #[error("boundary {expected} is missing or used twice (found {found})")]
    Boundary { expected: i64, found: i64 },
    #[error("nodes {outer} and {inner} partially overlap")]
    Overlap { outer: NodeId, inner: NodeId },
    #[error("node {id} has depth {stored}, expected {expected}")]
    Depth {
        id: NodeId,
        stored: i64,
        expected: i64,
    },
    #[error("node {id} caches parent {stored:?}, expected {expected:?}")]
    Parent {
        id: NodeId,
        stored: Option<NodeId>,
        expected: Option<NodeId>,
    },
}

/// Checks `rows`, which must be the complete table in any order.
pub fn check(rows: &[Node]) -> Result<(), InvariantViolation> {
    let mut sorted: Vec<&Node> = rows.iter().collect();
    sorted.sort_by_key(|n| n.left);

    for node in &sorted {
        if node.left >= node.right {
            return Err(InvariantViolation::Degenerate {
                id: node.id,
                left: node.left,
                right: node.right,
            });
        }
    }

    let mut boundaries: Vec<i64> = sorted.iter().flat_map(|n| [n.left, n.right]).collect();
    boundaries.sort_unstable();
    for (expected, found) in (0_i64..).zip(boundaries.iter().copied()) {
        if expected != found {
            return Err(InvariantViolation::Boundary { expected, found });
        }
    }

    let mut open: Vec<&Node> = Vec::new();
    for node in sorted {
        while open.last().is_some_and(|top| top.right < node.left) {
            open.pop();
        }
        if let Some(top) = open.last() {
            if node.right > top.right {
                return Err(InvariantViolation::Overlap {
                    outer: top.id,
                    inner: node.id,
                });
            }
        }
        let expected = open.len() as i64;
        if node.depth != expected {
            return Err(InvariantViolation::Depth {
                id: node.id,
                stored: node.depth,
                expected,
            });
        }
        let expected = open.last().map(|top| top.id);
        if node.parent != expected {
            return Err(InvariantViolation::Parent {
                id: node.id,
                stored: node.parent,
                expected,
            });
        }
        open.push(node);
    }
    Ok(())
}
