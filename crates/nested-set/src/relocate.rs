//! Interval relocation.
//!
//! Moving a subtree `[m, p]` (width `w = p - m`) to target boundary `i` is
//! three range shifts followed by a depth fix-up:
//!
//! ```text
//!   │    m   p     i       │
//!   │    └───┘     │       │
//!   └──────────────┴───────┘
//! ```
//!
//! 1. open a `w + 1` gap at `i`;
//! 2. slide the block into the gap (`i - m` when moving forward, where step 1
//!    left the block in place; `i - p - 1` when moving backward, where step 1
//!    dragged the block along);
//! 3. close the hole the block left behind, shifting everything after `p`
//!    back by `w + 1`.
//!
//! `i` is given in pre-move coordinates, so a forward move lands the block
//! at `i - (w + 1)`.

use crate::error::{ForestError, Result, TargetRejection};
use crate::node::{Interval, Node, NodeId};
use crate::store::{Cmp, Column, Filter, IntervalStore, Update};

/// Outcome of a single [`relocate`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relocation {
    pub node: NodeId,
    pub from: Interval,
    pub to: Interval,
    pub parent: Option<NodeId>,
    pub depth_delta: i64,
}

impl Relocation {
    pub fn moved(&self) -> bool {
        self.from != self.to
    }
}

/// Adds `delta` to every `left` and every `right` lying in
/// `[lower, upper]`; each column is tested against its own value.
pub fn shift<S: IntervalStore + ?Sized>(
    store: &mut S,
    delta: i64,
    lower: Option<i64>,
    upper: Option<i64>,
) -> Result<()> {
    tracing::trace!(delta, ?lower, ?upper, "shift");
    store.update(
        Update::Add(Column::Left, delta),
        &Filter::between(Column::Left, lower, upper),
    )?;
    store.update(
        Update::Add(Column::Right, delta),
        &Filter::between(Column::Right, lower, upper),
    )?;
    Ok(())
}

/// Final left boundary of a block at `from` relocated to target `target`.
pub fn landing(from: Interval, target: i64) -> i64 {
    if target > from.left {
        target - (from.width() + 1)
    } else {
        target
    }
}

/// Rejects targets that would put the block inside itself and, when
/// `require_boundary` is set, targets that are not a boundary of any row
/// nor the slot just past the current maximum.
pub fn check_target<S: IntervalStore + ?Sized>(
    store: &S,
    from: Interval,
    target: i64,
    require_boundary: bool,
) -> Result<()> {
    if from.swallows(target) {
        return Err(ForestError::InvalidTarget {
            target,
            reason: TargetRejection::InsideSubtree(from),
        });
    }
    if !require_boundary {
        return Ok(());
    }
    let past_end = store.max_right()?.map_or(0, |max| max + 1);
    let is_boundary = target == past_end
        || !store
            .select(&Filter::all().and(Column::Left, Cmp::Eq, target))?
            .is_empty()
        || !store
            .select(&Filter::all().and(Column::Right, Cmp::Eq, target))?
            .is_empty();
    if is_boundary {
        Ok(())
    } else {
        Err(ForestError::InvalidTarget {
            target,
            reason: TargetRejection::NotABoundary,
        })
    }
}

/// Moves `node` and its subtree so that it sits at boundary `target`,
/// then recomputes depth for the moved rows and the node's cached parent.
///
/// `node` must hold current coordinates. The caller owns the transaction.
pub fn relocate<S: IntervalStore + ?Sized>(
    store: &mut S,
    node: &Node,
    target: i64,
    require_boundary: bool,
) -> Result<Relocation> {
    let from = node.interval();
    check_target(store, from, target, require_boundary)?;

    let (i, m, p) = (target, from.left, from.right);
    let w = from.width();
    let to = from.moved_to(landing(from, target));

    if to != from {
        shift(store, w + 1, Some(i), None)?;
        if m < i {
            shift(store, i - m, Some(m), Some(p))?;
        } else {
            shift(store, i - p - 1, Some(p + 1), Some(2 * p - m + 1))?;
        }
        shift(store, m - p - 1, Some(p + 1), None)?;
    }

    let parent = store.select(&Filter::enclosing(to))?.pop();
    let depth = parent.as_ref().map_or(0, |p| p.depth + 1);
    let depth_delta = depth - node.depth;
    if depth_delta != 0 {
        store.update(Update::Add(Column::Depth, depth_delta), &Filter::within(to))?;
    }
    let parent = parent.map(|p| p.id);
    store.update(Update::SetParent(parent), &Filter::id(node.id))?;

    let relocation = Relocation {
        node: node.id,
        from,
        to,
        parent,
        depth_delta,
    };
    tracing::debug!(
        node = %node.id,
        from = %from,
        to = %to,
        parent = ?parent,
        depth_delta,
        "relocated subtree"
    );
    Ok(relocation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NewRow;
    use crate::store::MemoryStore;

    /// R(A(C), B) laid out by hand.
    fn sample() -> MemoryStore {
        let mut store = MemoryStore::new();
        for (label, left, right, depth) in [
            ("R", 0, 7, 0),
            ("A", 1, 4, 1),
            ("C", 2, 3, 2),
            ("B", 5, 6, 1),
        ] {
            store
                .insert(NewRow {
                    label: label.into(),
                    parent: None,
                    interval: Interval::new(left, right),
                    depth,
                })
                .unwrap();
        }
        store
    }

    fn layout(store: &MemoryStore) -> Vec<(String, i64, i64, i64)> {
        store
            .select(&Filter::all())
            .unwrap()
            .into_iter()
            .map(|n| (n.label, n.left, n.right, n.depth))
            .collect()
    }

    fn row(store: &MemoryStore, id: i64) -> Node {
        store.get(NodeId(id)).unwrap().unwrap()
    }

    #[test]
    fn landing_accounts_for_closed_hole() {
        let block = Interval::new(4, 7);
        assert_eq!(landing(block, 1), 1);
        assert_eq!(landing(block, 4), 4);
        assert_eq!(landing(block, 8), 4);
        assert_eq!(landing(block, 12), 8);
    }

    #[test]
    fn shift_bounds_each_column_separately() {
        let mut store = sample();
        shift(&mut store, 10, Some(4), Some(6)).unwrap();
        // A's right (4) and B's interval move, R's right (7) does not.
        assert_eq!(
            layout(&store),
            vec![
                ("R".into(), 0, 7, 0),
                ("A".into(), 1, 14, 1),
                ("C".into(), 2, 3, 2),
                ("B".into(), 15, 16, 1),
            ]
        );
    }

    #[test]
    fn backward_move_into_earlier_sibling() {
        let mut store = sample();
        let b = row(&store, 4);
        let a = row(&store, 2);
        let moved = relocate(&mut store, &b, a.right, true).unwrap();
        assert_eq!(moved.to, Interval::new(4, 5));
        assert_eq!(moved.parent, Some(NodeId(2)));
        assert_eq!(moved.depth_delta, 1);
        assert_eq!(
            layout(&store),
            vec![
                ("R".into(), 0, 7, 0),
                ("A".into(), 1, 6, 1),
                ("C".into(), 2, 3, 2),
                ("B".into(), 4, 5, 2),
            ]
        );
    }

    #[test]
    fn forward_move_lands_before_target() {
        let mut store = sample();
        let a = row(&store, 2);
        let r = row(&store, 1);
        // After B, i.e. as R's last child.
        let moved = relocate(&mut store, &a, r.right, true).unwrap();
        assert_eq!(moved.from, Interval::new(1, 4));
        assert_eq!(moved.to, Interval::new(3, 6));
        assert_eq!(moved.depth_delta, 0);
        assert_eq!(
            layout(&store),
            vec![
                ("R".into(), 0, 7, 0),
                ("B".into(), 1, 2, 1),
                ("A".into(), 3, 6, 1),
                ("C".into(), 4, 5, 2),
            ]
        );
    }

    #[test]
    fn move_to_trailing_slot_makes_a_root() {
        let mut store = sample();
        let a = row(&store, 2);
        let moved = relocate(&mut store, &a, 8, true).unwrap();
        assert_eq!(moved.to, Interval::new(4, 7));
        assert_eq!(moved.parent, None);
        assert_eq!(moved.depth_delta, -1);
        assert_eq!(
            layout(&store),
            vec![
                ("R".into(), 0, 3, 0),
                ("B".into(), 1, 2, 1),
                ("A".into(), 4, 7, 0),
                ("C".into(), 5, 6, 1),
            ]
        );
        assert_eq!(row(&store, 2).parent, None);
    }

    #[test]
    fn own_boundaries_are_no_ops() {
        for target in [1, 5] {
            let mut store = sample();
            let before = layout(&store);
            let a = row(&store, 2);
            let moved = relocate(&mut store, &a, target, true).unwrap();
            assert!(!moved.moved());
            assert_eq!(layout(&store), before);
        }
    }

    #[test]
    fn rejects_targets_inside_the_block() {
        let mut store = sample();
        let a = row(&store, 2);
        for target in [2, 3, 4] {
            let err = relocate(&mut store, &a, target, true).unwrap_err();
            assert!(matches!(
                err,
                ForestError::InvalidTarget {
                    reason: TargetRejection::InsideSubtree(_),
                    ..
                }
            ));
        }
    }

    #[test]
    fn rejects_targets_off_the_boundary_set() {
        let mut store = sample();
        let b = row(&store, 4);
        for target in [-1, 9, 40] {
            let err = relocate(&mut store, &b, target, true).unwrap_err();
            assert!(matches!(
                err,
                ForestError::InvalidTarget {
                    reason: TargetRejection::NotABoundary,
                    ..
                }
            ));
        }
        // Unchecked mode trusts the caller.
        assert!(relocate(&mut store, &b, 9, false).is_ok());
    }
}
