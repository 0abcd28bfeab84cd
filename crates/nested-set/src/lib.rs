//! Ordered forests stored as nested-set intervals.
//!
//! Each node row carries a `[left, right]` interval; containment encodes
//! ancestry and ascending `left` is preorder. Moving a subtree rewrites the
//! intervals of the affected rows with three bounded range updates, so
//! children, descendants and ancestors are all single interval queries.
//!
//! # Example
//!
//! ```
//! use nested_set::{Forest, MemoryStore};
//!
//! let mut forest = Forest::new(MemoryStore::new());
//! let mut root = forest.create("root").unwrap();
//! let mut a = forest.create("a").unwrap();
//! let mut b = forest.create("b").unwrap();
//! forest.append(&mut root, &mut a).unwrap();
//! forest.append(&mut root, &mut b).unwrap();
//!
//! let labels: Vec<_> = forest
//!     .children(&root)
//!     .unwrap()
//!     .into_iter()
//!     .map(|n| n.label)
//!     .collect();
//! assert_eq!(labels, vec!["a", "b"]);
//! assert_eq!((root.left, root.right), (0, 5));
//! ```
//!
//! # Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`node`] | [`Node`] rows, [`NodeId`], [`Interval`] |
//! | [`store`] | [`IntervalStore`] adapter, [`MemoryStore`], `SqliteStore` |
//! | [`relocate`] | range shifts and subtree relocation |
//! | [`forest`] | [`Forest`] mutations (`append`, `pop`, `remove`, ...) |
//! | [`traversal`] | `children`, `descendants`, `ancestors`, ... |
//! | [`validate`] | whole-table invariant check |
//! | [`print`] | text rendering |
//! | [`config`] | [`ForestConfig`] |

pub mod config;
pub mod error;
pub mod forest;
pub mod node;
pub mod print;
pub mod relocate;
pub mod store;
pub mod traversal;
pub mod validate;

pub use config::{ConfigError, ForestConfig, SqliteConfig};
pub use error::{ForestError, Result, StoreError, TargetRejection};
pub use forest::{Forest, Placement};
pub use node::{Interval, NewRow, Node, NodeId};
pub use print::print_forest;
pub use relocate::Relocation;
pub use store::{atomically, Cmp, Column, Filter, IntervalStore, MemoryStore, Update};
#[cfg(feature = "sqlite")]
pub use store::SqliteStore;
pub use validate::InvariantViolation;
