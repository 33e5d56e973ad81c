//! SIMD dot-product accelerator design space.
//!
//! Two free parameters:
//!   - `n_lanes`: how many multiply-accumulate lanes run in parallel.
//!     Low counts scale linearly; past the knee the combinational depth
//!     grows, WNS goes negative, effective frequency drops, and GOPS
//!     plateaus despite the extra area.
//!   - `abc_clock_ps`: target clock period in picoseconds for the whole
//!     synthesis flow. Tighter periods force larger gates and more area.

use std::path::{Path, PathBuf};

use si_metrics::{metric_f64, FREQUENCY_METRIC};
use si_types::{
    Design, EvalError, ParameterSet, RawMetrics, SearchSpace, SiResult,
};

const N_LANES_CHOICES: [i64; 6] = [4, 8, 16, 32, 64, 128];
const ABC_CLOCK_MIN_PS: f64 = 700.0; // ~1.43 GHz, aggressive
const ABC_CLOCK_MAX_PS: f64 = 10_000.0; // 100 MHz, conservative

const INPUT_WIDTH: i64 = 8;
const OUTPUT_WIDTH: i64 = 16;

/// The SimdDotProduct generator wired into the harness.
#[derive(Debug, Clone)]
pub struct SimdDotProduct {
    package: String,
    clock_max_ps: f64,
}

impl SimdDotProduct {
    pub fn new() -> Self {
        Self {
            package: "eda/SimdDotProduct".into(),
            clock_max_ps: ABC_CLOCK_MAX_PS,
        }
    }

    /// Cap the clock period for short smoke runs (e.g. 5000 ps = 200 MHz).
    pub fn with_clock_max_ps(mut self, max_ps: f64) -> Self {
        self.clock_max_ps = max_ps;
        self
    }

    fn target(&self, variant: usize) -> String {
        format!("//{}:SimdDotProduct_ppa_v{variant}", self.package)
    }
}

impl Default for SimdDotProduct {
    fn default() -> Self {
        Self::new()
    }
}

impl Design for SimdDotProduct {
    fn name(&self) -> &str {
        "SimdDotProduct"
    }

    fn search_space(&self) -> SearchSpace {
        SearchSpace::new()
            .add_choice(
                "n_lanes",
                N_LANES_CHOICES.iter().map(|n| serde_json::json!(n)).collect(),
            )
            .add_log_uniform("abc_clock_ps", ABC_CLOCK_MIN_PS, self.clock_max_ps)
    }

    fn base_command(&self) -> Vec<String> {
        // --keep_going lets the remaining variants finish when one fails;
        // per-variant failure is detected via artifact presence afterwards.
        vec!["bazel".into(), "build".into(), "--keep_going".into()]
    }

    fn variant_args(&self, variant: usize, params: &ParameterSet) -> Vec<String> {
        let n_lanes = params.get_i64("n_lanes").unwrap_or(N_LANES_CHOICES[0]);
        let clock_ps = params
            .get_f64("abc_clock_ps")
            .unwrap_or(ABC_CLOCK_MAX_PS)
            .round() as i64;
        let chisel_opts = format!(
            "--nLanes={n_lanes} --inputWidth={INPUT_WIDTH} --outputWidth={OUTPUT_WIDTH}"
        );
        vec![
            format!("--//rules:chisel_app_opts_v{variant}={chisel_opts}"),
            format!("--define=ABC_CLOCK_PERIOD_IN_PS_V{variant}={clock_ps}"),
        ]
    }

    fn targets(&self, variants: &[ParameterSet]) -> Vec<String> {
        (0..variants.len()).map(|v| self.target(v)).collect()
    }

    fn artifact_path(&self, workspace: &Path, variant: usize) -> PathBuf {
        workspace
            .join("bazel-bin")
            .join(&self.package)
            .join(format!("SimdDotProduct_ppa_v{variant}.txt"))
    }

    /// GOPS = 2 ops/lane (multiply + add) * n_lanes * effective frequency in
    /// GHz. The frequency metric is already WNS-adjusted, so deep logic shows
    /// up here as flattened GOPS growth.
    fn performance(&self, metrics: &RawMetrics, params: &ParameterSet) -> SiResult<f64> {
        let n_lanes = params.get_i64("n_lanes").ok_or(EvalError::MissingParameter {
            name: "n_lanes".into(),
        })?;
        let f_real_ghz = metric_f64(metrics, FREQUENCY_METRIC).unwrap_or(0.0);
        Ok(2.0 * n_lanes as f64 * f_real_ghz)
    }
}
