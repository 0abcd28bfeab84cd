use crate::node::{Interval, NodeId};
use crate::validate::InvariantViolation;
use thiserror::Error;

/// Failure reported by an [`IntervalStore`](crate::store::IntervalStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[cfg(feature = "sqlite")]
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to create directory for database: {0}")]
    Io(#[from] std::io::Error),
    #[error("no transaction in progress")]
    NoTransaction,
    #[error("transaction already in progress")]
    NestedTransaction,
    #[error("injected failure: {0}")]
    Injected(String),
}

/// Why a relocation target was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRejection {
    /// The target lies in `(left, right]` of the subtree being moved.
    InsideSubtree(Interval),
    /// No row has the target as a boundary and it is not `max(right) + 1`.
    NotABoundary,
}

#[derive(Debug, Error)]
pub enum ForestError {
    #[error("invalid relocation target {target}: {reason:?}")]
    InvalidTarget {
        target: i64,
        reason: TargetRejection,
    },
    #[error("node {0} not found")]
    NotFound(NodeId),
    #[error("store failure: {0}")]
    Store(#[from] StoreError),
    #[error("node {id} is stale: held ({held}), stored ({stored})")]
    StaleState {
        id: NodeId,
        held: Interval,
        stored: Interval,
    },
    #[error("node {id} has no ancestor {level} levels up")]
    NoAncestor { id: NodeId, level: usize },
    #[error("invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
}

pub type Result<T, E = ForestError> = std::result::Result<T, E>;
