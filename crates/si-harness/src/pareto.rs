//! Non-dominated trial aggregation.

use si_types::{Study, Trial};

/// Pareto dominance on the minimized objective pair: no worse on both, and
/// strictly better on at least one.
pub fn dominates(a: (f64, f64), b: (f64, f64)) -> bool {
    a.0 <= b.0 && a.1 <= b.1 && (a.0 < b.0 || a.1 < b.1)
}

/// The non-dominated subset of a study's feasible trials.
///
/// Feasibility (`constraint_violation <= 0`) is the sole gate for membership:
/// an infeasible trial is excluded no matter how strong its objectives look.
/// Recomputed on demand — the study never stores this view.
pub fn pareto_front(study: &Study) -> Vec<&Trial> {
    let candidates: Vec<(&Trial, (f64, f64))> = study
        .feasible()
        .filter_map(|t| t.objectives.map(|o| (t, o)))
        .collect();

    candidates
        .iter()
        .filter(|(trial, objectives)| {
            !candidates
                .iter()
                .any(|(other, other_obj)| other.id != trial.id && dominates(*other_obj, *objectives))
        })
        .map(|(trial, _)| *trial)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use si_types::{BuildResult, ParameterSet, RawMetrics, Sentinels, Study, TrialPhase};
    use uuid::Uuid;

    fn push_trial(study: &mut Study, area: f64, perf: f64, violation: f64) {
        let number = study.len();
        let mut trial = si_types::Trial::new(Uuid::new_v4(), number, ParameterSet::new());
        let result = BuildResult::success(RawMetrics::new(), area, perf, -violation, violation);
        let objectives = result.objectives();
        trial.mark_built(result);
        trial.mark_scored(objectives);
        trial.mark_reported();
        study.push(trial);
    }

    #[test]
    fn dominance_requires_strict_improvement() {
        assert!(dominates((1.0, -5.0), (2.0, -5.0)));
        assert!(dominates((1.0, -6.0), (1.0, -5.0)));
        assert!(!dominates((1.0, -5.0), (1.0, -5.0)));
        assert!(!dominates((1.0, -5.0), (0.5, -6.0)));
    }

    #[test]
    fn infeasible_trials_never_join_the_front() {
        let mut study = Study::new("pareto");
        // A: small and slow, B: big and fast, C: infeasible but competitive.
        push_trial(&mut study, 10.0, 5.0, -1.0);
        push_trial(&mut study, 20.0, 15.0, -1.0);
        push_trial(&mut study, 15.0, 5.0, 3.0);

        let front = pareto_front(&study);
        let numbers: Vec<usize> = front.iter().map(|t| t.number).collect();
        assert_eq!(numbers, vec![0, 1]);
    }

    #[test]
    fn dominated_feasible_trial_is_excluded() {
        let mut study = Study::new("pareto");
        push_trial(&mut study, 10.0, 5.0, -1.0);
        // Worse area, same performance: dominated by trial 0.
        push_trial(&mut study, 12.0, 5.0, -1.0);

        let front = pareto_front(&study);
        assert_eq!(front.len(), 1);
        assert_eq!(front[0].number, 0);
    }

    #[test]
    fn sentinel_results_are_dominated_by_any_feasible_trial() {
        let mut study = Study::new("pareto");
        push_trial(&mut study, 10.0, 5.0, -1.0);

        let sentinels = Sentinels::default();
        let mut failed =
            si_types::Trial::new(Uuid::new_v4(), 1, ParameterSet::new());
        failed.mark_built(BuildResult::failed(
            si_types::BuildOutcome::Timeout,
            &sentinels,
        ));
        study.push(failed);

        let front = pareto_front(&study);
        assert_eq!(front.len(), 1);
        assert_eq!(front[0].number, 0);
    }

    #[test]
    fn empty_study_has_empty_front() {
        let study = Study::new("empty");
        assert!(pareto_front(&study).is_empty());
    }

    #[test]
    fn unscored_trials_are_skipped() {
        let mut study = Study::new("pareto");
        let mut trial = si_types::Trial::new(Uuid::new_v4(), 0, ParameterSet::new());
        trial.mark_built(BuildResult::success(RawMetrics::new(), 1.0, 1.0, 1.0, -1.0));
        assert_eq!(trial.phase, TrialPhase::Built);
        study.push(trial);
        // Feasible but never scored: no objectives to compare.
        assert!(pareto_front(&study).is_empty());
    }
}
