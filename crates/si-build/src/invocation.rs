//! Build invocation assembly.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use si_types::{BuildError, Design, EnvOverlay, ParameterSet};

/// Static per-variant share of the CPU budget.
///
/// K heavy build jobs with unrestricted thread pools slow down super-linearly
/// under contention; capping each variant keeps aggregate utilization near
/// `total_cpus` without oversubscription.
pub fn threads_per_variant(total_cpus: usize, n_variants: usize) -> usize {
    if n_variants == 0 {
        return total_cpus.max(1);
    }
    (total_cpus / n_variants).max(1)
}

/// One fully-assembled external build invocation covering a whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildInvocation {
    pub program: String,
    pub args: Vec<String>,
    /// Immutable environment overlay passed to the spawn call.
    pub env: EnvOverlay,
    pub workspace: PathBuf,
}

impl BuildInvocation {
    /// Assemble the argv covering `variants`: base command, per-variant flags
    /// in batch order, the shared thread-budget flag, the cache-busting batch
    /// identifier, and finally the build targets.
    pub fn assemble(
        design: &dyn Design,
        variants: &[ParameterSet],
        threads_per_variant: usize,
        batch_id: Uuid,
        workspace: &Path,
    ) -> Result<Self, BuildError> {
        let mut argv = design.base_command();
        if argv.is_empty() {
            return Err(BuildError::InvalidInvocation {
                message: format!("design '{}' returned an empty base command", design.name()),
            });
        }
        let program = argv.remove(0);
        let mut args = argv;

        for (variant, params) in variants.iter().enumerate() {
            args.extend(design.variant_args(variant, params));
        }
        args.push(design.thread_budget_arg(threads_per_variant));
        args.push(design.batch_arg(batch_id));
        args.extend(design.targets(variants));

        Ok(Self {
            program,
            args,
            env: design.env_overlay(variants),
            workspace: workspace.to_path_buf(),
        })
    }

    /// Single-line rendering for logs.
    pub fn command_line(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.clone());
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use si_types::{ParameterValue, RawMetrics, SearchSpace, SiResult};

    struct StubDesign;

    impl Design for StubDesign {
        fn name(&self) -> &str {
            "stub"
        }

        fn search_space(&self) -> SearchSpace {
            SearchSpace::new().add_int("n", 1, 4)
        }

        fn base_command(&self) -> Vec<String> {
            vec!["bazel".into(), "build".into(), "--keep_going".into()]
        }

        fn variant_args(&self, variant: usize, params: &ParameterSet) -> Vec<String> {
            vec![format!(
                "--define=V{variant}_N={}",
                params.get_i64("n").unwrap_or(0)
            )]
        }

        fn targets(&self, _variants: &[ParameterSet]) -> Vec<String> {
            vec!["//eda/stub:stub_ppa".into()]
        }

        fn artifact_path(&self, workspace: &Path, variant: usize) -> PathBuf {
            workspace.join(format!("stub_ppa.v{variant}.txt"))
        }

        fn performance(&self, _metrics: &RawMetrics, _params: &ParameterSet) -> SiResult<f64> {
            Ok(0.0)
        }
    }

    struct EmptyCommandDesign;

    impl Design for EmptyCommandDesign {
        fn name(&self) -> &str {
            "empty"
        }
        fn search_space(&self) -> SearchSpace {
            SearchSpace::new()
        }
        fn base_command(&self) -> Vec<String> {
            Vec::new()
        }
        fn variant_args(&self, _variant: usize, _params: &ParameterSet) -> Vec<String> {
            Vec::new()
        }
        fn targets(&self, _variants: &[ParameterSet]) -> Vec<String> {
            Vec::new()
        }
        fn artifact_path(&self, workspace: &Path, _variant: usize) -> PathBuf {
            workspace.to_path_buf()
        }
        fn performance(&self, _metrics: &RawMetrics, _params: &ParameterSet) -> SiResult<f64> {
            Ok(0.0)
        }
    }

    fn params(n: i64) -> ParameterSet {
        let mut p = ParameterSet::new();
        p.insert("n", ParameterValue::Int(n));
        p
    }

    #[test]
    fn thread_partitioning_never_drops_below_one() {
        assert_eq!(threads_per_variant(16, 1), 16);
        assert_eq!(threads_per_variant(16, 4), 4);
        assert_eq!(threads_per_variant(16, 8), 2);
        assert_eq!(threads_per_variant(4, 8), 1);
        assert_eq!(threads_per_variant(0, 3), 1);
    }

    #[test]
    fn assemble_orders_flags_then_targets() {
        let batch_id = Uuid::new_v4();
        let variants = vec![params(2), params(8)];
        let invocation = BuildInvocation::assemble(
            &StubDesign,
            &variants,
            4,
            batch_id,
            Path::new("/workspace"),
        )
        .unwrap();

        assert_eq!(invocation.program, "bazel");
        assert_eq!(
            invocation.args,
            vec![
                "build".to_string(),
                "--keep_going".to_string(),
                "--define=V0_N=2".to_string(),
                "--define=V1_N=8".to_string(),
                "--jobs=4".to_string(),
                format!("--define=DSE_BATCH_ID={batch_id}"),
                "//eda/stub:stub_ppa".to_string(),
            ]
        );
        assert_eq!(invocation.workspace, PathBuf::from("/workspace"));
    }

    #[test]
    fn distinct_batches_get_distinct_cache_keys() {
        let variants = vec![params(2)];
        let a = BuildInvocation::assemble(
            &StubDesign,
            &variants,
            1,
            Uuid::new_v4(),
            Path::new("/w"),
        )
        .unwrap();
        let b = BuildInvocation::assemble(
            &StubDesign,
            &variants,
            1,
            Uuid::new_v4(),
            Path::new("/w"),
        )
        .unwrap();
        assert_ne!(a.args, b.args);
    }

    #[test]
    fn empty_base_command_is_rejected() {
        let err = BuildInvocation::assemble(
            &EmptyCommandDesign,
            &[params(1)],
            1,
            Uuid::new_v4(),
            Path::new("/w"),
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::InvalidInvocation { .. }));
    }

    #[test]
    fn command_line_includes_program() {
        let invocation = BuildInvocation::assemble(
            &StubDesign,
            &[params(4)],
            2,
            Uuid::new_v4(),
            Path::new("/w"),
        )
        .unwrap();
        let line = invocation.command_line();
        assert!(line.starts_with("bazel build"));
        assert!(line.ends_with("//eda/stub:stub_ppa"));
    }
}
