//! The design-specific surface injected into the generic harness.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::errors::SiResult;
use crate::parameter::{ParameterSet, SearchSpace};
use crate::result::RawMetrics;

/// Extra environment for a spawned build process.
///
/// Constructed per invocation and passed to the spawn call as an immutable
/// overlay; ambient process state is never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnvOverlay {
    vars: BTreeMap<String, String>,
}

impl EnvOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.vars.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }
}

/// Everything the harness needs to know about one hardware design.
///
/// The generic loop owns trial orchestration, resource partitioning, and
/// outcome classification; implementations of this trait own the parameter
/// space, the build-system flags, and the performance formula.
pub trait Design: Send + Sync {
    /// Design name, used for logging and report headers.
    fn name(&self) -> &str;

    /// The parameter space the oracle samples from.
    fn search_space(&self) -> SearchSpace;

    /// argv prefix of the external build invocation, e.g.
    /// `["bazel", "build", "--keep_going"]`.
    fn base_command(&self) -> Vec<String>;

    /// Build-system flags selecting one variant's parameters.
    fn variant_args(&self, variant: usize, params: &ParameterSet) -> Vec<String>;

    /// Build targets covering the given variants, appended after all flags.
    fn targets(&self, variants: &[ParameterSet]) -> Vec<String>;

    /// Shared thread-budget flag. `threads` is the per-variant cap.
    fn thread_budget_arg(&self, threads: usize) -> String {
        format!("--jobs={threads}")
    }

    /// Cache-busting batch identifier flag. Repeated identical parameters in
    /// a later batch must trigger a fresh build, never a cached artifact.
    fn batch_arg(&self, batch_id: Uuid) -> String {
        format!("--define=DSE_BATCH_ID={batch_id}")
    }

    /// Extra environment for the invocation covering `variants`.
    fn env_overlay(&self, _variants: &[ParameterSet]) -> EnvOverlay {
        EnvOverlay::default()
    }

    /// Deterministic path where the build writes the metrics artifact for
    /// `variant`, relative to `workspace`.
    fn artifact_path(&self, workspace: &Path, variant: usize) -> PathBuf;

    /// Design-specific performance objective (higher is better).
    fn performance(&self, metrics: &RawMetrics, params: &ParameterSet) -> SiResult<f64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overlay_builder() {
        let overlay = EnvOverlay::new()
            .set("ABC_CLOCK_PERIOD_IN_PS", "1500")
            .set("RUST_LOG", "info");
        assert_eq!(overlay.len(), 2);
        assert!(!overlay.is_empty());

        let keys: Vec<_> = overlay.iter().map(|(k, _)| k.as_str()).collect();
        // BTreeMap keeps deterministic ordering for spawn-call reproducibility.
        assert_eq!(keys, vec!["ABC_CLOCK_PERIOD_IN_PS", "RUST_LOG"]);
    }

    #[test]
    fn env_overlay_round_trip() {
        let overlay = EnvOverlay::new().set("A", "1");
        let json = serde_json::to_string(&overlay).unwrap();
        let back: EnvOverlay = serde_json::from_str(&json).unwrap();
        assert_eq!(overlay, back);
    }
}
