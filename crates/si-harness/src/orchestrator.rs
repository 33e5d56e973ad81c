//! The trial orchestration loop.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use si_build::BuildExecutor;
use si_oracle::{Oracle, ViolationStore};
use si_types::{Design, ParameterSet, Study, StudyConfig, Trial};

/// Drives the study: propose, build, score, report, repeat.
///
/// A single control thread owns this loop; parallelism lives entirely inside
/// the external build process, which runs up to `batch_size` variants against
/// a shared CPU budget. Batch size 1 is plain sequential operation — there is
/// no separate code path.
pub struct Orchestrator {
    design: Arc<dyn Design>,
    executor: BuildExecutor,
    oracle: Box<dyn Oracle>,
    violations: ViolationStore,
    config: StudyConfig,
    study: Study,
}

impl Orchestrator {
    pub fn new(
        design: Arc<dyn Design>,
        executor: BuildExecutor,
        oracle: Box<dyn Oracle>,
        violations: ViolationStore,
        config: StudyConfig,
    ) -> Self {
        let study = Study::new(&config.study_name);
        Self {
            design,
            executor,
            oracle,
            violations,
            config,
            study,
        }
    }

    pub fn study(&self) -> &Study {
        &self.study
    }

    /// Draw up to `limit` proposals, build them as one batch, and finalize
    /// every trial. Returns the number of trials run; 0 means the oracle is
    /// exhausted.
    pub async fn run_batch(&mut self, limit: usize) -> usize {
        // Parameters are captured per trial before building: some oracles
        // adapt their internal state from the suggested values themselves,
        // so each assignment must be recorded even if the build fails later.
        let mut trials: Vec<Trial> = Vec::with_capacity(limit);
        for _ in 0..limit {
            match self.oracle.propose() {
                Some((token, params)) => {
                    let number = self.study.len() + trials.len();
                    trials.push(Trial::new(token, number, params));
                }
                None => break,
            }
        }
        if trials.is_empty() {
            return 0;
        }

        let batch_id = Uuid::new_v4();
        let variants: Vec<ParameterSet> =
            trials.iter().map(|t| t.parameters.clone()).collect();
        info!(
            batch = %batch_id,
            size = trials.len(),
            first_trial = trials[0].number,
            "running trial batch"
        );

        let results = self
            .executor
            .execute(
                self.design.as_ref(),
                &variants,
                Duration::from_secs(self.config.timeout_seconds),
                batch_id,
            )
            .await;
        debug_assert_eq!(results.len(), trials.len());

        let count = trials.len();
        // Result-to-trial mapping is strictly positional.
        for (mut trial, result) in trials.into_iter().zip(results) {
            info!(
                trial = trial.number,
                outcome = %result.outcome,
                params = %trial.parameters.summary(),
                area = result.area,
                performance = result.performance,
                violation = result.constraint_violation,
                "trial finalized"
            );

            for (key, value) in &result.raw_metrics {
                let json = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
                trial.set_attr(format!("ppa_{key}"), json);
            }

            let objectives = result.objectives();
            let violation = result.constraint_violation;
            trial.mark_built(result);
            trial.mark_scored(objectives);
            // Constraint feedback must be in place before the tell call so
            // the oracle's registered callback can already see it.
            self.violations.record(trial.token, violation);
            self.oracle.report(trial.token, objectives);
            trial.mark_reported();
            self.study.push(trial);
        }
        count
    }

    /// Run batches until the trial budget is exhausted, then hand the study
    /// back for aggregation. Individual build failures never abort the loop.
    pub async fn run(mut self) -> Study {
        info!(
            study = %self.config.study_name,
            design = self.design.name(),
            oracle = self.oracle.name(),
            max_trials = self.config.max_trials,
            batch_size = self.config.batch_size,
            seed = self.config.seed,
            "starting design-space exploration"
        );

        while self.study.len() < self.config.max_trials {
            let remaining = self.config.max_trials - self.study.len();
            let limit = remaining.min(self.config.batch_size);
            if self.run_batch(limit).await == 0 {
                warn!(
                    trials = self.study.len(),
                    "oracle exhausted before the trial budget"
                );
                break;
            }
        }

        let summary = self.study.summary();
        info!(
            total = summary.total,
            feasible = summary.feasible,
            infeasible = summary.infeasible,
            failed = summary.failed,
            "exploration complete"
        );
        self.study
    }
}
