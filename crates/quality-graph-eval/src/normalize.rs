//! Normalization layer: maps raw aggregated values to utilities in [0, 1].

use quality_graph_core::types::{FunctionKind, UtilityFunction};

use crate::inputs::{MeasureValue, Score};

/// Applies `function` to a raw value.
///
/// # Formula
///
/// ```text
/// increasing: clamp((raw - lower) / (upper - lower), 0, 1)
/// decreasing: clamp((upper - raw) / (upper - lower), 0, 1)
/// ```
///
/// Values at or beyond the bounds saturate. Inverted bounds never reach
/// here; validation rejects them before evaluation starts.
pub fn normalize(function: &UtilityFunction, raw: f64) -> f64 {
    let span = function.upper_bound - function.lower_bound;
    let utility = match function.kind {
        FunctionKind::LinearIncreasing => (raw - function.lower_bound) / span,
        FunctionKind::LinearDecreasing => (function.upper_bound - raw) / span,
    };
    utility.clamp(0.0, 1.0)
}

/// Normalizes a measure value into a score.
///
/// `NoData` passes through as `NoData`. A measure without a declared
/// function keeps its raw value clamped to [0, 1] (documented pass-through
/// policy); findings normalize over their deduplicated count.
pub fn normalize_value(function: Option<&UtilityFunction>, value: &MeasureValue) -> Score {
    let Some(raw) = value.as_raw_number() else {
        return Score::NoData;
    };
    let utility = match function {
        Some(function) => normalize(function, raw),
        None => raw.clamp(0.0, 1.0),
    };
    Score::Utility(utility)
}
