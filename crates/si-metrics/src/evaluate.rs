//! Constraint and objective evaluation.

use si_types::{Design, ParameterSet, RawMetrics, Sentinels, SiResult, Thresholds};

/// Metric key for cell area (um^2).
pub const AREA_METRIC: &str = "cell_area";
/// Metric key for timing slack (ps).
pub const SLACK_METRIC: &str = "slack";
/// Metric key for the WNS-adjusted effective frequency (GHz).
pub const FREQUENCY_METRIC: &str = "effective_frequency_ghz";
/// Metric key for estimated power (uW).
pub const POWER_METRIC: &str = "estimated_power_uw";

/// Numeric lookup into raw metrics; text-valued metrics count as absent.
pub fn metric_f64(metrics: &RawMetrics, key: &str) -> Option<f64> {
    metrics.get(key).and_then(|v| v.as_f64())
}

/// The derived per-variant scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub area: f64,
    pub performance: f64,
    pub slack: f64,
    pub constraint_violation: f64,
}

/// Computes objectives and the unified constraint scalar from raw metrics.
///
/// Sentinels and thresholds are explicit so concurrent studies can evaluate
/// under different bounds.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator {
    sentinels: Sentinels,
    thresholds: Thresholds,
}

impl Evaluator {
    pub fn new(sentinels: Sentinels, thresholds: Thresholds) -> Self {
        Self {
            sentinels,
            thresholds,
        }
    }

    pub fn area(&self, metrics: &RawMetrics) -> f64 {
        metric_f64(metrics, AREA_METRIC).unwrap_or(self.sentinels.worst_area)
    }

    pub fn slack(&self, metrics: &RawMetrics) -> f64 {
        metric_f64(metrics, SLACK_METRIC).unwrap_or(self.sentinels.worst_slack)
    }

    /// The single continuous feasibility signal consumed by the oracle's
    /// constraint mechanism.
    ///
    /// Hard gates come first: a design outside the area, frequency, or power
    /// bounds is a severe violation, short-circuiting before slack is read.
    /// Otherwise the value is `-slack`: negative with timing margin (more
    /// negative = more margin), zero at the boundary, positive when timing is
    /// violated. Continuity lets the sampler descend toward feasibility
    /// instead of seeing all violations as equal.
    pub fn constraint_violation(&self, metrics: &RawMetrics) -> f64 {
        let area = metric_f64(metrics, AREA_METRIC).unwrap_or(self.sentinels.worst_area);
        if area >= self.thresholds.max_area {
            return self.sentinels.severe_violation;
        }

        let frequency = metric_f64(metrics, FREQUENCY_METRIC).unwrap_or(0.0);
        if frequency <= self.thresholds.min_frequency_ghz {
            return self.sentinels.severe_violation;
        }

        let power = metric_f64(metrics, POWER_METRIC).unwrap_or(0.0);
        if power >= self.thresholds.max_power_uw {
            return self.sentinels.severe_violation;
        }

        -self.slack(metrics)
    }

    /// Full evaluation of one variant. The performance formula is the
    /// design's; everything else is generic.
    pub fn evaluate(
        &self,
        design: &dyn Design,
        metrics: &RawMetrics,
        params: &ParameterSet,
    ) -> SiResult<Evaluation> {
        let performance = design.performance(metrics, params)?;
        Ok(Evaluation {
            area: self.area(metrics),
            performance,
            slack: self.slack(metrics),
            constraint_violation: self.constraint_violation(metrics),
        })
    }
}
