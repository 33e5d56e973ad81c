//! The ask/tell oracle protocol.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use si_types::{ParameterSet, TrialToken};

/// The minimized objective pair `(area, -performance)`.
pub type Objectives = (f64, f64);

/// Constraint feedback callback, registered at oracle construction. Returns
/// the stored continuous violation scalar for a finalized trial handle, or
/// `None` if the trial has not been scored yet.
pub type ConstraintFn = Arc<dyn Fn(TrialToken) -> Option<f64> + Send + Sync>;

/// A black-box search algorithm driving proposals.
///
/// `propose` hands out a private trial handle together with a full parameter
/// assignment; `report` feeds the finalized objectives back so adaptive
/// strategies can refine sampling. Constraint feedback flows through the
/// [`ConstraintFn`] the oracle captured at construction, keyed by the same
/// handle.
pub trait Oracle: Send + Sync {
    /// Draw the next parameter assignment. `None` means the strategy has
    /// exhausted its search space.
    fn propose(&mut self) -> Option<(TrialToken, ParameterSet)>;

    /// Report the minimized objective pair for a finalized trial.
    fn report(&mut self, token: TrialToken, objectives: Objectives);

    /// Human-readable strategy name.
    fn name(&self) -> &str;
}

/// Shared store of per-trial constraint violations.
///
/// The orchestrator records into it after scoring; oracles read from it via
/// the callback handed to their constructor. Cheap to clone — all clones
/// share one map.
#[derive(Clone, Default)]
pub struct ViolationStore {
    inner: Arc<Mutex<HashMap<TrialToken, f64>>>,
}

impl ViolationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, token: TrialToken, violation: f64) {
        self.inner.lock().insert(token, violation);
    }

    pub fn get(&self, token: TrialToken) -> Option<f64> {
        self.inner.lock().get(&token).copied()
    }

    /// Whether the stored violation marks the trial feasible.
    pub fn is_feasible(&self, token: TrialToken) -> bool {
        self.get(token).map(|v| v <= 0.0).unwrap_or(false)
    }

    /// The constraint callback to register with an oracle.
    pub fn constraint_fn(&self) -> ConstraintFn {
        let store = self.clone();
        Arc::new(move |token| store.get(token))
    }
}
