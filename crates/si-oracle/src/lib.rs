//! # si-oracle
//!
//! The ask/tell protocol between the exploration harness and a search
//! algorithm, plus default samplers (grid, random, annealed) usable out of
//! the box. The harness only ever talks to the [`Oracle`] trait; swapping in
//! an external TPE or Gaussian-process sampler is a trait impl, not a
//! harness change.

mod oracle;
mod sampler;

pub use oracle::{ConstraintFn, Objectives, Oracle, ViolationStore};
pub use sampler::{AnnealedOracle, GridOracle, RandomOracle};
