//! Quality-Model Evaluation Engine
//!
//! Reduces raw tool/manual inputs through aggregation and normalization
//! into per-factor base scores, then propagates influences along the
//! impact graph to composite quality scores.
//!
//! # Architecture
//!
//! - **inputs**: raw input mapping, findings, the `NoData` absence value
//! - **aggregate**: strategy-pattern reduction (set operations on findings,
//!   statistical reduction on numbers) with per-pass memoization
//! - **normalize**: linear utility functions with saturating bounds
//! - **propagate**: SCC condensation, topological scoring, bounded
//!   fixed-point resolution of cycles, severity-weighted bounded sum
//! - **config**: evaluation tunables with documented defaults
//! - **error**: `EvalError` and result alias
//!
//! # Data flow
//!
//! ```text
//! raw inputs -> aggregation -> normalization -> base scores -> propagation
//! ```
//!
//! # Example
//!
//! ```
//! use quality_graph_core::model::QualityModel;
//! use quality_graph_core::types::{ElementId, Factor, Measure, MeasureType};
//! use quality_graph_eval::{evaluate, EvalConfig, RawInputs, Score};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut model = QualityModel::new();
//! model.add_factor(Factor::builder("Reliability").identifier("rel").create()?)?;
//! model.add_measure(
//!     Measure::builder("Defect density")
//!         .identifier("dd")
//!         .measure_type(MeasureType::Number)
//!         .measures("rel")
//!         .create()?,
//! )?;
//!
//! let mut inputs = RawInputs::new();
//! inputs.add_numbers("dd", None, vec![0.25, 0.75]);
//!
//! let evaluation = evaluate(&model, &inputs, &EvalConfig::default())?;
//! assert_eq!(evaluation.factor_scores[&ElementId::from("rel")], Score::Utility(0.5));
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod inputs;
pub mod normalize;
pub mod propagate;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use quality_graph_core::model::QualityModel;
use quality_graph_core::types::{ElementId, MeasureType};
use quality_graph_core::validation::validate;

// Re-exports for convenience
pub use aggregate::{aggregate, Contribution, MeasureEvaluator};
pub use config::{CyclePolicy, EvalConfig};
pub use error::{EvalError, EvalResult};
pub use inputs::{Finding, MeasureValue, RawInput, RawInputs, RawValue, Score};
pub use normalize::{normalize, normalize_value};
pub use propagate::severity_weight;

use inputs::RawValue as Raw;

/// The complete outcome of one evaluation pass.
///
/// Besides the composite factor scores, the intermediate stages are kept
/// for traceability: the reduced value of every measure, its normalized
/// score, and each factor's measured base before impacts were folded in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Composite score per factor, after impact propagation.
    pub factor_scores: BTreeMap<ElementId, Score>,
    /// Measured base score per factor, before impact propagation.
    pub base_scores: BTreeMap<ElementId, Score>,
    /// Reduced (aggregated, un-normalized) value per measure.
    pub measure_values: BTreeMap<ElementId, MeasureValue>,
    /// Normalized score per measure.
    pub measure_scores: BTreeMap<ElementId, Score>,
}

/// Evaluates a structurally valid model against raw inputs.
///
/// Fails with [`EvalError::InvalidModel`] when validation reports issues,
/// with [`EvalError::UnknownMeasure`] / [`EvalError::InputTypeMismatch`]
/// when the raw inputs do not fit the model, and with the configured cycle
/// policy's error on cyclic impact graphs that cannot be resolved. On
/// success the result covers every factor in the model; re-running on an
/// unchanged model and inputs yields bit-identical scores.
pub fn evaluate(
    model: &QualityModel,
    inputs: &RawInputs,
    config: &EvalConfig,
) -> EvalResult<Evaluation> {
    let issues = validate(model);
    if !issues.is_empty() {
        return Err(EvalError::InvalidModel(issues));
    }
    check_inputs(model, inputs)?;

    let mut evaluator = MeasureEvaluator::new(model, inputs);
    let measure_values = evaluator.all_values();

    let mut measure_scores = BTreeMap::new();
    for measure in model.measures() {
        let value = measure_values
            .get(&measure.id)
            .cloned()
            .unwrap_or(MeasureValue::NoData);
        let function = measure
            .normalized_by
            .as_ref()
            .and_then(|id| model.function(id));
        measure_scores.insert(measure.id.clone(), normalize_value(function, &value));
    }

    let mut base_scores = BTreeMap::new();
    for factor in model.factors() {
        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;
        for measure_id in &factor.measured_by {
            if let Some(Score::Utility(utility)) = measure_scores.get(measure_id) {
                let weight = config.measure_weight(measure_id);
                weighted_sum += utility * weight;
                total_weight += weight;
            }
        }
        let base = if total_weight > 0.0 {
            Score::Utility(weighted_sum / total_weight)
        } else {
            Score::NoData
        };
        base_scores.insert(factor.id.clone(), base);
    }

    let factor_scores = propagate::propagate(model, config, &base_scores)?;
    debug!(factors = factor_scores.len(), "evaluation complete");

    Ok(Evaluation {
        factor_scores,
        base_scores,
        measure_values,
        measure_scores,
    })
}

/// Rejects inputs keyed by unknown measures or carrying the wrong data
/// kind for a measure's declared type.
fn check_inputs(model: &QualityModel, inputs: &RawInputs) -> EvalResult<()> {
    for measure_id in inputs.measures() {
        let Some(measure) = model.measure(measure_id) else {
            return Err(EvalError::UnknownMeasure(measure_id.clone()));
        };
        for raw in inputs.for_measure(measure_id) {
            let compatible = matches!(
                (&raw.value, measure.measure_type),
                (Raw::Findings(_), MeasureType::Findings) | (Raw::Numbers(_), MeasureType::Number)
            );
            if !compatible {
                return Err(EvalError::InputTypeMismatch(measure_id.clone()));
            }
        }
    }
    Ok(())
}
