//! Design-space exploration for the SIMD dot-product accelerator.
//!
//! Runs the full loop against a real Bazel workspace: proposals from the
//! annealed oracle, batched `bazel build` invocations, PPA scoring, and a
//! final Pareto report.
//!
//! Usage (from the hardware workspace root):
//!     cargo run --example simd_dse

use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use si_build::BuildExecutor;
use si_harness::designs::SimdDotProduct;
use si_harness::{render_summary, write_report, Orchestrator};
use si_oracle::{AnnealedOracle, ViolationStore};
use si_types::{Design, StudyConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Under `bazel run` the caller's workspace root arrives via this
    // variable; standalone invocations just use the current directory.
    let workspace = std::env::var("BUILD_WORKSPACE_DIRECTORY")
        .map(PathBuf::from)
        .or_else(|_| std::env::current_dir())?;

    let config = StudyConfig::new("simd_dotproduct_dse")
        .with_max_trials(20)
        .with_batch_size(4)
        .with_timeout_seconds(600)
        .with_seed(42);

    let design = Arc::new(SimdDotProduct::new());
    let violations = ViolationStore::new();
    let oracle = AnnealedOracle::new(design.search_space(), config.seed, 0.3)
        .with_constraints(violations.constraint_fn());
    let executor = BuildExecutor::with_process_pipeline(&config, &workspace);

    let orchestrator = Orchestrator::new(
        design,
        executor,
        Box::new(oracle),
        violations,
        config,
    );
    let study = orchestrator.run().await;

    println!("{}", render_summary(&study));

    let report_path = workspace.join("simd_dse_results.txt");
    write_report(&study, &report_path)?;
    println!("Full report: {}", report_path.display());

    Ok(())
}
