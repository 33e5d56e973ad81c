//! Build outcomes and the fully-populated per-variant result record.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::Sentinels;

/// One raw metric parsed from the build artifact. Non-numeric values are kept
/// as text so metadata lines (tool versions, corner names) survive parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl MetricValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(_) => None,
        }
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
        }
    }
}

/// Flat metric mapping extracted from one build artifact.
pub type RawMetrics = HashMap<String, MetricValue>;

/// How one variant's build ended. Exactly one tag per result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildOutcome {
    /// Artifact produced, parsed, and evaluated.
    Success,
    /// The whole invocation hit the wall-clock bound.
    Timeout,
    /// The build process produced no artifact for this variant.
    ProcessFailure,
    /// The artifact existed but yielded no key/value pairs.
    ParseFailure,
    /// Metrics parsed but objective evaluation failed.
    MetricFailure,
}

impl std::fmt::Display for BuildOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::Timeout => "timeout",
            Self::ProcessFailure => "process_failure",
            Self::ParseFailure => "parse_failure",
            Self::MetricFailure => "metric_failure",
        };
        write!(f, "{s}")
    }
}

/// Result of building and evaluating one variant.
///
/// The four numeric fields are always populated. On any failure outcome they
/// hold the configured worst-case sentinels, so consumers read the floats
/// without branching on the outcome tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildResult {
    pub outcome: BuildOutcome,
    pub raw_metrics: RawMetrics,
    pub area: f64,
    pub performance: f64,
    pub slack: f64,
    pub constraint_violation: f64,
}

impl BuildResult {
    pub fn success(
        raw_metrics: RawMetrics,
        area: f64,
        performance: f64,
        slack: f64,
        constraint_violation: f64,
    ) -> Self {
        Self {
            outcome: BuildOutcome::Success,
            raw_metrics,
            area,
            performance,
            slack,
            constraint_violation,
        }
    }

    /// A fully-populated failure result carrying worst-case sentinels.
    pub fn failed(outcome: BuildOutcome, sentinels: &Sentinels) -> Self {
        debug_assert_ne!(outcome, BuildOutcome::Success);
        Self {
            outcome,
            raw_metrics: RawMetrics::new(),
            area: sentinels.worst_area,
            performance: sentinels.worst_performance,
            slack: sentinels.worst_slack,
            constraint_violation: sentinels.failed_build_penalty,
        }
    }

    /// Same as [`BuildResult::failed`] but keeps the metrics that did parse,
    /// for post-mortem inspection of evaluation failures.
    pub fn failed_with_metrics(
        outcome: BuildOutcome,
        sentinels: &Sentinels,
        raw_metrics: RawMetrics,
    ) -> Self {
        Self {
            raw_metrics,
            ..Self::failed(outcome, sentinels)
        }
    }

    /// Feasibility is derived from the continuous violation scalar alone.
    pub fn is_feasible(&self) -> bool {
        self.constraint_violation <= 0.0
    }

    pub fn is_failure(&self) -> bool {
        self.outcome != BuildOutcome::Success
    }

    /// The minimized objective pair reported to the oracle: performance is
    /// negated because the oracle minimizes both objectives uniformly.
    pub fn objectives(&self) -> (f64, f64) {
        (self.area, -self.performance)
    }
}
