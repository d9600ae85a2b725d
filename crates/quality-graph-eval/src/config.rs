//! Evaluation configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use quality_graph_core::types::ElementId;

/// What to do when the impact graph contains a cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePolicy {
    /// Evaluate cyclic components by bounded fixed-point iteration,
    /// raising `NonConvergence` if the bound is exhausted. Default.
    #[default]
    FixedPoint,
    /// Reject the model with `Cycle` on the first cyclic component.
    Reject,
}

/// Tunables for one evaluation pass.
///
/// Defaults implement the documented engine policy: bounded-sum composite
/// clamped to [0, 1], fixed-point cycle resolution with epsilon 1e-6 over
/// at most 100 iterations, equal measure weights, and a neutral prior of
/// 0.5 for factors that have impacts but no measures of their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalConfig {
    pub cycle_policy: CyclePolicy,

    /// Convergence threshold: iteration stops once the largest per-factor
    /// score change falls below this.
    pub epsilon: f64,

    /// Iteration bound for cyclic components.
    pub max_iterations: u32,

    /// Base score for a factor with incoming impacts but no measured data,
    /// so influences can move it in both directions.
    pub neutral_prior: f64,

    /// Per-measure weights for a factor's base score. Measures not listed
    /// weigh 1.0; the base score is the weighted mean of the factor's
    /// measures that have data.
    pub measure_weights: BTreeMap<ElementId, f64>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            cycle_policy: CyclePolicy::default(),
            epsilon: 1e-6,
            max_iterations: 100,
            neutral_prior: 0.5,
            measure_weights: BTreeMap::new(),
        }
    }
}

impl EvalConfig {
    /// Weight of `measure` in its factors' base scores.
    pub fn measure_weight(&self, measure: &ElementId) -> f64 {
        self.measure_weights.get(measure).copied().unwrap_or(1.0)
    }
}
