//! nested-set-fuzz - reproducible random workloads for nested-set forests.
//!
//! [`Fuzzer`] wraps a seeded xoshiro256** generator; [`OpGenerator`] turns it
//! into a stream of [`ForestOp`]s addressed by live-node index.

pub mod fuzzer;
pub mod ops;

pub use fuzzer::Fuzzer;
pub use ops::{ForestOp, OpGenerator, OpWeights};
