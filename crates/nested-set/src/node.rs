//! Node rows and interval arithmetic.
//!
//! A [`Node`] is the in-memory copy of one row of the forest table. Its
//! `[left, right]` [`Interval`] is the single source of truth for position;
//! `parent` and `depth` are derived from interval containment and rewritten
//! on every relocation.

use std::fmt;

/// Store-assigned row identifier. Monotonically increasing, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub i64);

impl NodeId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Closed integer interval `[left, right]`, `left < right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    pub left: i64,
    pub right: i64,
}

impl Interval {
    pub fn new(left: i64, right: i64) -> Self {
        debug_assert!(left < right, "degenerate interval [{left}, {right}]");
        Self { left, right }
    }

    /// Interval of a fresh leaf whose left boundary is `left`.
    pub fn leaf_at(left: i64) -> Self {
        Self::new(left, left + 1)
    }

    /// `right - left`. A leaf has width 1.
    pub fn width(&self) -> i64 {
        self.right - self.left
    }

    /// Strict containment: `other` lies entirely inside `(left, right)`.
    pub fn strictly_contains(&self, other: &Interval) -> bool {
        self.left < other.left && other.right < self.right
    }

    /// True when `position` lies in `(left, right]`, i.e. relocating this
    /// interval to `position` would place it inside itself.
    pub fn swallows(&self, position: i64) -> bool {
        self.left < position && position <= self.right
    }

    pub fn is_disjoint(&self, other: &Interval) -> bool {
        self.right < other.left || other.right < self.left
    }

    /// Same width, moved so that it starts at `left`.
    pub fn moved_to(&self, left: i64) -> Interval {
        Interval::new(left, left + self.width())
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.left, self.right)
    }
}

/// One forest row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    pub parent: Option<NodeId>,
    pub left: i64,
    pub right: i64,
    pub depth: i64,
}

impl Node {
    pub fn interval(&self) -> Interval {
        Interval::new(self.left, self.right)
    }

    pub fn is_leaf(&self) -> bool {
        self.right == self.left + 1
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Number of rows strictly inside this node's interval.
    pub fn descendant_count(&self) -> i64 {
        (self.right - self.left - 1) / 2
    }

    /// Whether `other` has the same position, depth and cached parent.
    pub(crate) fn same_position(&self, other: &Node) -> bool {
        self.left == other.left
            && self.right == other.right
            && self.depth == other.depth
            && self.parent == other.parent
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} ({}-{}) [{}]",
            self.id.0,
            self.label,
            self.left,
            self.right,
            self.parent.map_or(0, NodeId::get)
        )
    }
}

/// Row values handed to [`IntervalStore::insert`](crate::store::IntervalStore::insert).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRow {
    pub label: String,
    pub parent: Option<NodeId>,
    pub interval: Interval,
    pub depth: i64,
}

impl NewRow {
    /// A detached root occupying `[left, left + 1]`.
    pub fn detached(label: impl Into<String>, left: i64) -> Self {
        Self {
            label: label.into(),
            parent: None,
            interval: Interval::leaf_at(left),
            depth: 0,
        }
    }
}
