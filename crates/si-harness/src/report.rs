//! Plain-text study reporting.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::info;

use si_types::{SiResult, Study, Trial};

use crate::pareto::pareto_front;

const RULE: &str = "======================================================================";

fn write_solution(out: &mut String, index: usize, trial: &Trial) {
    let _ = writeln!(out, "Solution {}:", index + 1);
    let _ = writeln!(out, "  parameters: {}", trial.parameters.summary());
    if let Some(result) = &trial.result {
        let _ = writeln!(out, "  Area: {:.3}", result.area);
        let _ = writeln!(out, "  Performance: {:.3}", result.performance);
        let _ = writeln!(out, "  Slack: {:.3}", result.slack);
    }
    let mut ppa: Vec<_> = trial
        .attrs
        .iter()
        .filter(|(k, _)| k.starts_with("ppa_"))
        .collect();
    ppa.sort_by(|a, b| a.0.cmp(b.0));
    for (key, value) in ppa {
        let _ = writeln!(out, "  {}: {}", key.trim_start_matches("ppa_"), value);
    }
}

/// Human-readable summary of a finished study.
///
/// Distinguishes "no trials were run" (the oracle produced nothing) from
/// "trials ran but none were feasible", with guidance for each.
pub fn render_summary(study: &Study) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Results Summary: {}", study.name);
    let _ = writeln!(out, "{RULE}");

    if study.is_empty() {
        let _ = writeln!(out, "\nNo trials were run.");
        let _ = writeln!(out, "\nPossible reasons:");
        let _ = writeln!(out, "  - The oracle produced no proposals (empty search space)");
        let _ = writeln!(out, "  - The trial budget is zero");
        let _ = writeln!(out, "\nSuggestions:");
        let _ = writeln!(out, "  - Check the design's search-space definition");
        let _ = writeln!(out, "  - Increase max_trials in the study configuration");
        return out;
    }

    let summary = study.summary();
    let _ = writeln!(
        out,
        "\nTrials: {} total, {} feasible, {} infeasible, {} failed",
        summary.total, summary.feasible, summary.infeasible, summary.failed
    );

    let front = pareto_front(study);
    if front.is_empty() {
        let _ = writeln!(out, "\nNo feasible solutions found!");
        let _ = writeln!(out, "\nPossible reasons:");
        let _ = writeln!(out, "  - All trials failed to build");
        let _ = writeln!(out, "  - All trials violated constraints");
        let _ = writeln!(out, "  - Parameter ranges may be too restrictive");
        let _ = writeln!(out, "\nSuggestions:");
        let _ = writeln!(out, "  - Check build logs for errors");
        let _ = writeln!(out, "  - Relax constraints");
        let _ = writeln!(out, "  - Adjust parameter ranges");
        return out;
    }

    let _ = writeln!(out, "\nFound {} Pareto optimal solutions", front.len());
    for (i, trial) in front.iter().take(5).enumerate() {
        let _ = writeln!(out);
        write_solution(&mut out, i, trial);
    }
    out
}

/// Write the full study report: Pareto solutions plus every feasible trial.
pub fn write_report(study: &Study, path: &Path) -> SiResult<()> {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "{} DSE Results", study.name);
    let _ = writeln!(out, "{RULE}\n");

    let front = pareto_front(study);
    let _ = writeln!(out, "Pareto optimal solutions: {}\n", front.len());
    for (i, trial) in front.iter().enumerate() {
        write_solution(&mut out, i, trial);
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "All Feasible Trials:");
    let _ = writeln!(out, "{RULE}");
    for trial in study.feasible() {
        if let Some(result) = &trial.result {
            let _ = writeln!(
                out,
                "Trial {}: {}, Area={:.3}, Perf={:.3}",
                trial.number,
                trial.parameters.summary(),
                result.area,
                result.performance
            );
        }
    }

    fs::write(path, &out)?;
    info!(path = %path.display(), "study report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use si_types::{BuildOutcome, BuildResult, ParameterSet, ParameterValue, RawMetrics, Sentinels};
    use uuid::Uuid;

    fn feasible_trial(number: usize, area: f64, perf: f64) -> Trial {
        let mut params = ParameterSet::new();
        params.insert("n_lanes", ParameterValue::Int(8 * (number as i64 + 1)));
        let mut trial = Trial::new(Uuid::new_v4(), number, params);
        let result = BuildResult::success(RawMetrics::new(), area, perf, 20.0, -20.0);
        let objectives = result.objectives();
        trial.mark_built(result);
        trial.mark_scored(objectives);
        trial.mark_reported();
        trial.set_attr("ppa_slack", serde_json::json!(20.0));
        trial
    }

    #[test]
    fn empty_study_reports_zero_trials() {
        let study = Study::new("empty");
        let summary = render_summary(&study);
        assert!(summary.contains("No trials were run"));
        assert!(!summary.contains("No feasible solutions"));
    }

    #[test]
    fn all_failed_study_reports_no_feasible_solutions() {
        let mut study = Study::new("failed");
        let mut trial = Trial::new(Uuid::new_v4(), 0, ParameterSet::new());
        trial.mark_built(BuildResult::failed(
            BuildOutcome::ProcessFailure,
            &Sentinels::default(),
        ));
        study.push(trial);

        let summary = render_summary(&study);
        assert!(summary.contains("No feasible solutions found"));
        assert!(!summary.contains("No trials were run"));
        assert!(summary.contains("Check build logs"));
    }

    #[test]
    fn feasible_study_lists_pareto_solutions() {
        let mut study = Study::new("ok");
        study.push(feasible_trial(0, 10.0, 5.0));
        study.push(feasible_trial(1, 20.0, 15.0));

        let summary = render_summary(&study);
        assert!(summary.contains("Found 2 Pareto optimal solutions"));
        assert!(summary.contains("n_lanes=8"));
        assert!(summary.contains("slack: 20.0"));
    }

    #[test]
    fn report_file_contains_all_feasible_trials() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.txt");

        let mut study = Study::new("simd");
        study.push(feasible_trial(0, 10.0, 5.0));
        study.push(feasible_trial(1, 12.0, 5.0)); // dominated but feasible

        write_report(&study, &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("simd DSE Results"));
        assert!(contents.contains("Pareto optimal solutions: 1"));
        assert!(contents.contains("Trial 0:"));
        assert!(contents.contains("Trial 1:"));
    }
}
