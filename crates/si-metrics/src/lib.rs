//! # si-metrics
//!
//! Parses the flat `key: value` metrics artifact produced by a physical build
//! and computes area, performance, slack, and the unified constraint-violation
//! scalar from it.

mod evaluate;
mod extract;

pub use evaluate::{
    metric_f64, Evaluation, Evaluator, AREA_METRIC, FREQUENCY_METRIC, POWER_METRIC, SLACK_METRIC,
};
pub use extract::parse_artifact;
