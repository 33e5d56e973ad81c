//! Study configuration: sentinels, thresholds, and resource budgets.
//!
//! Every component receives these as explicit values so multiple studies can
//! run in one process with different settings.

use serde::{Deserialize, Serialize};

/// Worst-case values substituted for failed or invalid builds.
///
/// Each sentinel must dominate (be worse than) any realistic value so failed
/// trials never appear competitive in the objective space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentinels {
    /// Maximum area value (um^2).
    pub worst_area: f64,
    /// Minimum performance value.
    pub worst_performance: f64,
    /// Minimum slack value (ps), a severe timing violation.
    pub worst_slack: f64,
    /// Constraint violation reported when a hard threshold gate fails.
    pub severe_violation: f64,
    /// Constraint violation reported for builds that never produced metrics.
    /// Distinct from `severe_violation` so the two causes stay tellable apart.
    pub failed_build_penalty: f64,
}

impl Default for Sentinels {
    fn default() -> Self {
        Self {
            worst_area: 1e9,
            worst_performance: 0.0,
            worst_slack: -1e9,
            severe_violation: 1e9,
            failed_build_penalty: 1e6,
        }
    }
}

/// Hard infeasibility gates checked before the continuous slack term.
///
/// A build whose metrics land outside these bounds is treated as a severe
/// violation regardless of its timing slack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Reject if cell area reaches this value (likely a synthesis error).
    pub max_area: f64,
    /// Reject if effective frequency falls to this value or below (GHz).
    pub min_frequency_ghz: f64,
    /// Reject if estimated power reaches this value (uW).
    pub max_power_uw: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_area: 1e8,
            min_frequency_ghz: 0.001,
            max_power_uw: 1e9,
        }
    }
}

/// Top-level configuration for a design-space exploration study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyConfig {
    /// Study name, also the handle passed to any oracle-side storage.
    pub study_name: String,

    /// Maximum number of trials to run.
    pub max_trials: usize,

    /// How many variants to build per external invocation.
    pub batch_size: usize,

    /// Hard wall-clock bound for one build invocation, in seconds.
    pub timeout_seconds: u64,

    /// Total CPU threads shared by all variants of a batch.
    pub total_cpus: usize,

    /// Random seed for reproducible sampling.
    pub seed: u64,

    pub sentinels: Sentinels,
    pub thresholds: Thresholds,
}

impl StudyConfig {
    pub fn new(study_name: impl Into<String>) -> Self {
        let total_cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            study_name: study_name.into(),
            max_trials: 20,
            batch_size: 1,
            timeout_seconds: 600,
            total_cpus,
            seed: 42,
            sentinels: Sentinels::default(),
            thresholds: Thresholds::default(),
        }
    }

    pub fn with_max_trials(mut self, n: usize) -> Self {
        self.max_trials = n;
        self
    }

    pub fn with_batch_size(mut self, n: usize) -> Self {
        self.batch_size = n.max(1);
        self
    }

    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    pub fn with_total_cpus(mut self, n: usize) -> Self {
        self.total_cpus = n.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_sentinels(mut self, sentinels: Sentinels) -> Self {
        self.sentinels = sentinels;
        self
    }
}
