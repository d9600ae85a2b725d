//! Error types for quality-graph-eval.

use thiserror::Error;

use quality_graph_core::types::ElementId;
use quality_graph_core::validation::StructuralIssue;

/// Result alias for evaluation operations.
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors raised by the evaluation entry point.
///
/// "No data" is deliberately not here: a measure with zero inputs produces
/// a defined absence value that flows through scoring, never an error.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The model failed structural validation. Evaluation refuses to run
    /// rather than score a malformed graph.
    #[error("model has {} structural issue(s)", .0.len())]
    InvalidModel(Vec<StructuralIssue>),

    /// Raw inputs were keyed by a measure that is not in the model.
    #[error("raw inputs reference unknown measure {0}")]
    UnknownMeasure(ElementId),

    /// Raw inputs carry the wrong data kind for the measure's declared type
    /// (e.g. findings supplied to a Number measure).
    #[error("raw inputs for measure {0} do not match its declared type")]
    InputTypeMismatch(ElementId),

    /// The impact graph contains a cycle and the configured policy is
    /// [`crate::config::CyclePolicy::Reject`].
    #[error("impact cycle through factors {factors:?}")]
    Cycle {
        /// Factors forming the strongly connected component.
        factors: Vec<ElementId>,
    },

    /// Fixed-point iteration over a cyclic component failed to stabilize
    /// within the configured iteration bound.
    #[error("scores over factors {factors:?} did not converge within {iterations} iteration(s)")]
    NonConvergence {
        factors: Vec<ElementId>,
        iterations: u32,
    },
}
