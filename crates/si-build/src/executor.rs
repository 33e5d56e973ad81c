//! Batch build execution and per-variant outcome classification.

use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use si_metrics::{parse_artifact, Evaluator};
use si_types::{
    BuildError, BuildOutcome, BuildResult, Design, MetricsError, ParameterSet, Sentinels,
    StudyConfig,
};

use crate::invocation::{threads_per_variant, BuildInvocation};
use crate::pipeline::{BuildPipeline, ProcessPipeline};

/// Runs one external build invocation per batch and turns its byproducts into
/// one fully-populated [`BuildResult`] per variant.
///
/// Failures never escape: every path yields a sentinel-filled result, so the
/// orchestration loop above runs to completion regardless of what the build
/// did.
pub struct BuildExecutor {
    pipeline: Box<dyn BuildPipeline>,
    workspace: PathBuf,
    evaluator: Evaluator,
    sentinels: Sentinels,
    total_cpus: usize,
}

impl BuildExecutor {
    pub fn new(
        config: &StudyConfig,
        workspace: impl Into<PathBuf>,
        pipeline: Box<dyn BuildPipeline>,
    ) -> Self {
        Self {
            pipeline,
            workspace: workspace.into(),
            evaluator: Evaluator::new(config.sentinels, config.thresholds),
            sentinels: config.sentinels,
            total_cpus: config.total_cpus.max(1),
        }
    }

    /// Executor backed by a real subprocess pipeline.
    pub fn with_process_pipeline(config: &StudyConfig, workspace: impl Into<PathBuf>) -> Self {
        Self::new(config, workspace, Box::new(ProcessPipeline))
    }

    /// Build and classify a batch of variants.
    ///
    /// Always returns exactly `variants.len()` results, positionally aligned
    /// with the input, regardless of partial failure.
    pub async fn execute(
        &self,
        design: &dyn Design,
        variants: &[ParameterSet],
        timeout: Duration,
        batch_id: Uuid,
    ) -> Vec<BuildResult> {
        if variants.is_empty() {
            return Vec::new();
        }

        let threads = threads_per_variant(self.total_cpus, variants.len());
        let invocation = match BuildInvocation::assemble(
            design,
            variants,
            threads,
            batch_id,
            &self.workspace,
        ) {
            Ok(invocation) => invocation,
            Err(e) => {
                error!(batch = %batch_id, error = %e, "failed to assemble build invocation");
                return self.all_failed(BuildOutcome::ProcessFailure, variants.len());
            }
        };

        info!(
            batch = %batch_id,
            variants = variants.len(),
            threads_per_variant = threads,
            command = %invocation.command_line(),
            "launching build batch"
        );

        match self.pipeline.run(&invocation, timeout).await {
            Ok(0) => {}
            Ok(code) => {
                // Keep-going semantics: a nonzero exit only means some
                // variants may have failed. Artifact presence is the
                // authoritative per-variant signal.
                warn!(batch = %batch_id, code, "build exited nonzero; checking artifacts per variant");
            }
            Err(BuildError::Timeout { seconds }) => {
                // A killed process gives no reliable partial-completion
                // signal; the whole batch fails conservatively.
                warn!(batch = %batch_id, seconds, "build timed out; marking all variants");
                return self.all_failed(BuildOutcome::Timeout, variants.len());
            }
            Err(e) => {
                error!(batch = %batch_id, error = %e, "build process never completed");
                return self.all_failed(BuildOutcome::ProcessFailure, variants.len());
            }
        }

        variants
            .iter()
            .enumerate()
            .map(|(variant, params)| self.classify(design, variant, params))
            .collect()
    }

    /// Classify one variant independently of its siblings.
    fn classify(&self, design: &dyn Design, variant: usize, params: &ParameterSet) -> BuildResult {
        let path = design.artifact_path(&self.workspace, variant);

        let metrics = match parse_artifact(&path) {
            Ok(metrics) => metrics,
            Err(MetricsError::ArtifactNotFound { .. }) => {
                warn!(variant, path = %path.display(), "no artifact produced for variant");
                return BuildResult::failed(BuildOutcome::ProcessFailure, &self.sentinels);
            }
            Err(e) => {
                warn!(variant, error = %e, "artifact could not be parsed");
                return BuildResult::failed(BuildOutcome::ParseFailure, &self.sentinels);
            }
        };

        match self.evaluator.evaluate(design, &metrics, params) {
            Ok(eval) => {
                debug!(
                    variant,
                    area = eval.area,
                    performance = eval.performance,
                    slack = eval.slack,
                    violation = eval.constraint_violation,
                    "variant evaluated"
                );
                BuildResult::success(
                    metrics,
                    eval.area,
                    eval.performance,
                    eval.slack,
                    eval.constraint_violation,
                )
            }
            Err(e) => {
                warn!(variant, error = %e, "metric evaluation failed");
                BuildResult::failed_with_metrics(BuildOutcome::MetricFailure, &self.sentinels, metrics)
            }
        }
    }

    fn all_failed(&self, outcome: BuildOutcome, count: usize) -> Vec<BuildResult> {
        (0..count)
            .map(|_| BuildResult::failed(outcome, &self.sentinels))
            .collect()
    }
}
