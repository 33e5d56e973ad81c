//! # si-build
//!
//! Runs the external build pipeline for a batch of design variants: assembles
//! the invocation, partitions the shared CPU budget, enforces the wall-clock
//! timeout, and classifies each variant's outcome independently.

mod executor;
mod invocation;
mod pipeline;

pub use executor::BuildExecutor;
pub use invocation::{threads_per_variant, BuildInvocation};
pub use pipeline::{BuildPipeline, ProcessPipeline};
