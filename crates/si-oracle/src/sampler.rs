//! Default sampling strategies behind the [`Oracle`] protocol.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use si_types::{ParameterKind, ParameterSet, ParameterValue, SearchSpace, TrialToken};

use crate::oracle::{ConstraintFn, Objectives, Oracle};

fn sample_from(space: &SearchSpace, rng: &mut ChaCha8Rng) -> ParameterSet {
    let mut params = ParameterSet::new();
    for param in &space.parameters {
        let value = match &param.kind {
            ParameterKind::FloatRange { low, high } => {
                ParameterValue::Float(rng.gen_range(*low..=*high))
            }
            ParameterKind::IntRange { low, high } => {
                ParameterValue::Int(rng.gen_range(*low..=*high))
            }
            ParameterKind::LogUniform { low, high } => {
                let log_val: f64 = rng.gen_range(low.ln()..=high.ln());
                ParameterValue::Float(log_val.exp())
            }
            ParameterKind::Choice { values } => {
                let idx = rng.gen_range(0..values.len());
                ParameterValue::Json(values[idx].clone())
            }
        };
        params.insert(param.name.clone(), value);
    }
    params
}

// ---- Grid oracle ----

/// Exhaustive sweep over discrete parameter combinations. Continuous
/// dimensions are discretized into `float_steps` points.
pub struct GridOracle {
    combos: Vec<ParameterSet>,
    cursor: usize,
}

impl GridOracle {
    pub fn new(space: &SearchSpace, float_steps: usize) -> Self {
        Self {
            combos: Self::build_grid(space, float_steps),
            cursor: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.combos.len() - self.cursor
    }

    fn build_grid(space: &SearchSpace, float_steps: usize) -> Vec<ParameterSet> {
        let mut axes: Vec<Vec<(&str, ParameterValue)>> = Vec::new();

        for param in &space.parameters {
            let values: Vec<ParameterValue> = match &param.kind {
                ParameterKind::FloatRange { low, high } => {
                    let steps = float_steps.max(2);
                    (0..steps)
                        .map(|i| {
                            let t = i as f64 / (steps - 1) as f64;
                            ParameterValue::Float(low + t * (high - low))
                        })
                        .collect()
                }
                ParameterKind::IntRange { low, high } => {
                    (*low..=*high).map(ParameterValue::Int).collect()
                }
                ParameterKind::LogUniform { low, high } => {
                    let steps = float_steps.max(2);
                    let log_low = low.ln();
                    let log_high = high.ln();
                    (0..steps)
                        .map(|i| {
                            let t = i as f64 / (steps - 1) as f64;
                            ParameterValue::Float((log_low + t * (log_high - log_low)).exp())
                        })
                        .collect()
                }
                ParameterKind::Choice { values } => values
                    .iter()
                    .map(|v| ParameterValue::Json(v.clone()))
                    .collect(),
            };
            axes.push(
                values
                    .into_iter()
                    .map(|v| (param.name.as_str(), v))
                    .collect(),
            );
        }

        // Cartesian product
        let mut result: Vec<ParameterSet> = vec![ParameterSet::new()];
        for axis in &axes {
            let mut next = Vec::with_capacity(result.len() * axis.len());
            for existing in &result {
                for (name, value) in axis {
                    let mut combo = existing.clone();
                    combo.insert(name.to_string(), value.clone());
                    next.push(combo);
                }
            }
            result = next;
        }

        result
    }
}

impl Oracle for GridOracle {
    fn propose(&mut self) -> Option<(TrialToken, ParameterSet)> {
        let params = self.combos.get(self.cursor)?.clone();
        self.cursor += 1;
        Some((Uuid::new_v4(), params))
    }

    fn report(&mut self, _token: TrialToken, _objectives: Objectives) {}

    fn name(&self) -> &str {
        "grid"
    }
}

// ---- Random oracle ----

/// Independent seeded sampling across the search space.
pub struct RandomOracle {
    space: SearchSpace,
    rng: ChaCha8Rng,
}

impl RandomOracle {
    pub fn new(space: SearchSpace, seed: u64) -> Self {
        Self {
            space,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Oracle for RandomOracle {
    fn propose(&mut self) -> Option<(TrialToken, ParameterSet)> {
        Some((Uuid::new_v4(), sample_from(&self.space, &mut self.rng)))
    }

    fn report(&mut self, _token: TrialToken, _objectives: Objectives) {}

    fn name(&self) -> &str {
        "random"
    }
}

// ---- Annealed oracle ----

/// Adaptive sampler that alternates exploration with perturbation of the
/// best-known feasible point.
///
/// Tracks reported (parameters, objectives) pairs and, when exploiting,
/// perturbs the observation with the best scalarized objective among those
/// its constraint callback marks feasible. Infeasible observations are never
/// exploited — the continuous violation scalar keeps the sampler honest
/// about how far each point is from the constraint boundary.
pub struct AnnealedOracle {
    space: SearchSpace,
    rng: ChaCha8Rng,
    exploration_weight: f64,
    constraints: Option<ConstraintFn>,
    pending: HashMap<TrialToken, ParameterSet>,
    observations: Vec<(TrialToken, ParameterSet, Objectives)>,
}

impl AnnealedOracle {
    pub fn new(space: SearchSpace, seed: u64, exploration_weight: f64) -> Self {
        Self {
            space,
            rng: ChaCha8Rng::seed_from_u64(seed),
            exploration_weight,
            constraints: None,
            pending: HashMap::new(),
            observations: Vec::new(),
        }
    }

    /// Register constraint feedback. Without it every observation counts as
    /// exploitable.
    pub fn with_constraints(mut self, constraints: ConstraintFn) -> Self {
        self.constraints = Some(constraints);
        self
    }

    fn is_exploitable(&self, token: TrialToken) -> bool {
        match &self.constraints {
            Some(callback) => callback(token).map(|v| v <= 0.0).unwrap_or(false),
            None => true,
        }
    }

    /// Best feasible observation by scalarized objective sum.
    fn best_observation(&self) -> Option<&(TrialToken, ParameterSet, Objectives)> {
        self.observations
            .iter()
            .filter(|(token, _, _)| self.is_exploitable(*token))
            .min_by(|a, b| {
                let sa = a.2 .0 + a.2 .1;
                let sb = b.2 .0 + b.2 .1;
                sa.partial_cmp(&sb).unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    fn exploit(&mut self) -> ParameterSet {
        let base = match self.best_observation() {
            Some((_, params, _)) => params.clone(),
            None => return sample_from(&self.space, &mut self.rng),
        };

        let mut perturbed = ParameterSet::new();
        for param in &self.space.parameters {
            let base_val = base.get(&param.name).cloned();
            let value = match (&param.kind, base_val) {
                (ParameterKind::FloatRange { low, high }, Some(ParameterValue::Float(v))) => {
                    let noise = self.rng.gen_range(-0.1..0.1) * (high - low);
                    ParameterValue::Float((v + noise).clamp(*low, *high))
                }
                (ParameterKind::IntRange { low, high }, Some(ParameterValue::Int(v))) => {
                    let delta: i64 = self.rng.gen_range(-2..=2);
                    ParameterValue::Int((v + delta).clamp(*low, *high))
                }
                (ParameterKind::LogUniform { low, high }, Some(ParameterValue::Float(v))) => {
                    let log_range = high.ln() - low.ln();
                    let noise = self.rng.gen_range(-0.1..0.1) * log_range;
                    ParameterValue::Float((v.ln() + noise).exp().clamp(*low, *high))
                }
                // Categorical values and missing bases fall back to a fresh draw.
                (kind, _) => {
                    let single = SearchSpace {
                        parameters: vec![si_types::ParameterDef {
                            name: param.name.clone(),
                            kind: kind.clone(),
                        }],
                    };
                    sample_from(&single, &mut self.rng)
                        .get(&param.name)
                        .cloned()
                        .unwrap_or(ParameterValue::Int(0))
                }
            };
            perturbed.insert(param.name.clone(), value);
        }
        perturbed
    }
}

impl Oracle for AnnealedOracle {
    fn propose(&mut self) -> Option<(TrialToken, ParameterSet)> {
        let explore =
            self.observations.is_empty() || self.rng.gen::<f64>() < self.exploration_weight;
        let params = if explore {
            sample_from(&self.space, &mut self.rng)
        } else {
            self.exploit()
        };

        let token = Uuid::new_v4();
        debug!(%token, explore, params = %params.summary(), "proposing trial");
        self.pending.insert(token, params.clone());
        Some((token, params))
    }

    fn report(&mut self, token: TrialToken, objectives: Objectives) {
        if let Some(params) = self.pending.remove(&token) {
            self.observations.push((token, params, objectives));
        }
    }

    fn name(&self) -> &str {
        "annealed"
    }
}
