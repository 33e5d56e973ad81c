//! Trial lifecycle tracking and study bookkeeping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::parameter::ParameterSet;
use crate::result::BuildResult;

/// Opaque oracle-managed trial handle. The orchestrator never interprets it,
/// only hands it back through the tell protocol.
pub type TrialToken = Uuid;

/// Lifecycle phase of one trial. Phases only ever advance, in order:
/// a trial never reaches `Reported` without passing through `Scored`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrialPhase {
    /// Parameters drawn from the oracle, build not started.
    Proposed,
    /// Build finished (successfully or not) and the result is attached.
    Built,
    /// Objectives computed from the build result.
    Scored,
    /// Objectives and constraint feedback delivered to the oracle.
    Reported,
}

/// One (parameters, outcome) evaluation instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    pub id: Uuid,
    /// The oracle's private handle for this trial.
    pub token: TrialToken,
    /// Trial sequence number within the study (0-indexed).
    pub number: usize,
    pub parameters: ParameterSet,
    pub phase: TrialPhase,
    pub result: Option<BuildResult>,
    /// The minimized objective pair `(area, -performance)`.
    pub objectives: Option<(f64, f64)>,
    /// Namespaced attributes attached by the orchestrator (raw PPA metrics
    /// under `ppa_*` keys).
    pub attrs: HashMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Trial {
    pub fn new(token: TrialToken, number: usize, parameters: ParameterSet) -> Self {
        Self {
            id: Uuid::new_v4(),
            token,
            number,
            parameters,
            phase: TrialPhase::Proposed,
            result: None,
            objectives: None,
            attrs: HashMap::new(),
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn mark_built(&mut self, result: BuildResult) {
        debug_assert_eq!(self.phase, TrialPhase::Proposed);
        self.result = Some(result);
        self.phase = TrialPhase::Built;
    }

    pub fn mark_scored(&mut self, objectives: (f64, f64)) {
        debug_assert_eq!(self.phase, TrialPhase::Built);
        self.objectives = Some(objectives);
        self.phase = TrialPhase::Scored;
    }

    pub fn mark_reported(&mut self) {
        debug_assert_eq!(self.phase, TrialPhase::Scored);
        debug_assert!(self.objectives.is_some());
        self.phase = TrialPhase::Reported;
        self.finished_at = Some(Utc::now());
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.attrs.insert(key.into(), value);
    }

    /// Feasible: built successfully and within all constraints.
    pub fn is_feasible(&self) -> bool {
        self.result
            .as_ref()
            .map(|r| !r.is_failure() && r.is_feasible())
            .unwrap_or(false)
    }

    /// Built successfully but violating at least one constraint.
    pub fn is_infeasible(&self) -> bool {
        self.result
            .as_ref()
            .map(|r| !r.is_failure() && !r.is_feasible())
            .unwrap_or(false)
    }

    /// The build itself failed (timeout, missing artifact, parse or
    /// evaluation failure).
    pub fn is_failed(&self) -> bool {
        self.result
            .as_ref()
            .map(BuildResult::is_failure)
            .unwrap_or(false)
    }
}

/// Counts for the feasible/infeasible/failed partition of a study.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StudySummary {
    pub total: usize,
    pub feasible: usize,
    pub infeasible: usize,
    pub failed: usize,
}

/// Ordered collection of finalized trials.
///
/// Append-only and mutated only by the control thread; the non-dominated
/// subset is a derived view, never stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Study {
    pub id: Uuid,
    pub name: String,
    trials: Vec<Trial>,
    pub created_at: DateTime<Utc>,
}

impl Study {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            trials: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn push(&mut self, trial: Trial) {
        self.trials.push(trial);
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn feasible(&self) -> impl Iterator<Item = &Trial> {
        self.trials.iter().filter(|t| t.is_feasible())
    }

    pub fn infeasible(&self) -> impl Iterator<Item = &Trial> {
        self.trials.iter().filter(|t| t.is_infeasible())
    }

    pub fn failed(&self) -> impl Iterator<Item = &Trial> {
        self.trials.iter().filter(|t| t.is_failed())
    }

    pub fn summary(&self) -> StudySummary {
        StudySummary {
            total: self.trials.len(),
            feasible: self.feasible().count(),
            infeasible: self.infeasible().count(),
            failed: self.failed().count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Sentinels;
    use crate::result::{BuildOutcome, RawMetrics};

    fn scored_trial(number: usize, area: f64, perf: f64, violation: f64) -> Trial {
        let mut trial = Trial::new(Uuid::new_v4(), number, ParameterSet::new());
        let result = BuildResult::success(RawMetrics::new(), area, perf, -violation, violation);
        let objectives = result.objectives();
        trial.mark_built(result);
        trial.mark_scored(objectives);
        trial.mark_reported();
        trial
    }

    #[test]
    fn trial_lifecycle() {
        let mut trial = Trial::new(Uuid::new_v4(), 0, ParameterSet::new());
        assert_eq!(trial.phase, TrialPhase::Proposed);

        trial.mark_built(BuildResult::success(RawMetrics::new(), 10.0, 5.0, 20.0, -20.0));
        assert_eq!(trial.phase, TrialPhase::Built);

        trial.mark_scored((10.0, -5.0));
        assert_eq!(trial.phase, TrialPhase::Scored);

        trial.mark_reported();
        assert_eq!(trial.phase, TrialPhase::Reported);
        assert!(trial.finished_at.is_some());
        assert_eq!(trial.objectives, Some((10.0, -5.0)));
    }

    #[test]
    fn trial_partition_predicates() {
        let sentinels = Sentinels::default();

        let feasible = scored_trial(0, 10.0, 5.0, -20.0);
        assert!(feasible.is_feasible());
        assert!(!feasible.is_infeasible());
        assert!(!feasible.is_failed());

        let infeasible = scored_trial(1, 10.0, 5.0, 30.0);
        assert!(!infeasible.is_feasible());
        assert!(infeasible.is_infeasible());

        let mut failed = Trial::new(Uuid::new_v4(), 2, ParameterSet::new());
        failed.mark_built(BuildResult::failed(BuildOutcome::Timeout, &sentinels));
        assert!(failed.is_failed());
        assert!(!failed.is_feasible());
        assert!(!failed.is_infeasible());
    }

    #[test]
    fn study_summary_partitions_trials() {
        let sentinels = Sentinels::default();
        let mut study = Study::new("test");

        study.push(scored_trial(0, 10.0, 5.0, -20.0));
        study.push(scored_trial(1, 12.0, 4.0, 15.0));

        let mut failed = Trial::new(Uuid::new_v4(), 2, ParameterSet::new());
        failed.mark_built(BuildResult::failed(BuildOutcome::ProcessFailure, &sentinels));
        study.push(failed);

        let summary = study.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.feasible, 1);
        assert_eq!(summary.infeasible, 1);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn unbuilt_trial_is_neither_feasible_nor_failed() {
        let trial = Trial::new(Uuid::new_v4(), 0, ParameterSet::new());
        assert!(!trial.is_feasible());
        assert!(!trial.is_infeasible());
        assert!(!trial.is_failed());
    }
}
