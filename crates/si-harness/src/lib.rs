//! # si-harness
//!
//! The exploration loop: draws proposals from a search oracle, delegates
//! batches to the build executor, scores and stores trials, feeds objectives
//! and constraint feedback back to the oracle, and aggregates the resulting
//! study into a Pareto front and a text report.

pub mod designs;
mod orchestrator;
mod pareto;
mod report;

pub use orchestrator::Orchestrator;
pub use pareto::{dominates, pareto_front};
pub use report::{render_summary, write_report};
