//! Random forest operation sequences.
//!
//! Operations refer to nodes by index into the caller's list of live nodes,
//! so the generator needs no knowledge of the forest itself. Indices are
//! always below the `live` count passed to [`OpGenerator::next_op`].

use crate::fuzzer::Fuzzer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForestOp {
    Create { label: String },
    Append { parent: usize, child: usize },
    Prepend { parent: usize, child: usize },
    InsertBefore { sibling: usize, node: usize },
    InsertAfter { sibling: usize, node: usize },
    Pop { node: usize },
    Remove { node: usize },
}

impl ForestOp {
    /// Whether the op moves an existing node (as opposed to creating or
    /// deleting one).
    pub fn is_move(&self) -> bool {
        !matches!(self, ForestOp::Create { .. } | ForestOp::Remove { .. })
    }
}

/// Relative weights of each op kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpWeights {
    pub create: u32,
    pub attach: u32,
    pub sibling: u32,
    pub pop: u32,
    pub remove: u32,
}

impl Default for OpWeights {
    fn default() -> Self {
        Self {
            create: 5,
            attach: 8,
            sibling: 6,
            pop: 2,
            remove: 1,
        }
    }
}

impl OpWeights {
    fn total(&self) -> u32 {
        self.create + self.attach + self.sibling + self.pop + self.remove
    }
}

pub struct OpGenerator {
    fuzzer: Fuzzer,
    weights: OpWeights,
    created: usize,
}

impl OpGenerator {
    pub fn new(fuzzer: Fuzzer) -> Self {
        Self::with_weights(fuzzer, OpWeights::default())
    }

    pub fn with_weights(fuzzer: Fuzzer, weights: OpWeights) -> Self {
        assert!(weights.total() > 0, "all op weights are zero");
        Self {
            fuzzer,
            weights,
            created: 0,
        }
    }

    pub fn seed(&self) -> [u8; 32] {
        self.fuzzer.seed
    }

    /// Next op for a forest currently holding `live` nodes. An empty forest
    /// always gets a `Create`.
    pub fn next_op(&mut self, live: usize) -> ForestOp {
        if live == 0 {
            return self.create();
        }
        let w = self.weights;
        let mut roll = self.fuzzer.random_int(0, i64::from(w.total()) - 1) as u32;
        if roll < w.create {
            return self.create();
        }
        roll -= w.create;
        let a = self.fuzzer.index(live);
        let b = self.fuzzer.index(live);
        if roll < w.attach {
            return if self.fuzzer.random_bool(0.5) {
                ForestOp::Append {
                    parent: a,
                    child: b,
                }
            } else {
                ForestOp::Prepend {
                    parent: a,
                    child: b,
                }
            };
        }
        roll -= w.attach;
        if roll < w.sibling {
            return if self.fuzzer.random_bool(0.5) {
                ForestOp::InsertBefore {
                    sibling: a,
                    node: b,
                }
            } else {
                ForestOp::InsertAfter {
                    sibling: a,
                    node: b,
                }
            };
        }
        roll -= w.sibling;
        if roll < w.pop {
            ForestOp::Pop { node: a }
        } else {
            ForestOp::Remove { node: a }
        }
    }

    fn create(&mut self) -> ForestOp {
        self.created += 1;
        let suffix = self.fuzzer.random_string(3, "abcdefghijklmnopqrstuvwxyz");
        ForestOp::Create {
            label: format!("n{}-{suffix}", self.created),
        }
    }
}
