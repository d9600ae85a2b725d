//! Raw inputs fed into an evaluation pass, and the engine's value currency.
//!
//! Ingestion collaborators (tool-output parsers, manual entry) run entirely
//! before evaluation and hand over a [`RawInputs`] mapping: for each
//! measure, the contributions of every tool or source that reported for it.
//! The engine treats this as opaque data with no interpretation of how it
//! was produced.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use quality_graph_core::types::ElementId;

/// A located occurrence of interest (e.g. a rule violation).
///
/// Identity is the location alone: the same location reported by two
/// different sources is one finding. Findings are deduplicated, never
/// counted per source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Location identifier (file/line, element path, ...).
    pub location: String,
    /// Source that reported this finding, for traceability only.
    pub source: Option<ElementId>,
}

impl Finding {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            source: None,
        }
    }

    pub fn with_source(location: impl Into<String>, source: impl Into<ElementId>) -> Self {
        Self {
            location: location.into(),
            source: Some(source.into()),
        }
    }
}

// Equality, ordering, and hashing by location only.
impl PartialEq for Finding {
    fn eq(&self, other: &Self) -> bool {
        self.location == other.location
    }
}

impl Eq for Finding {}

impl PartialOrd for Finding {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Finding {
    fn cmp(&self, other: &Self) -> Ordering {
        self.location.cmp(&other.location)
    }
}

impl std::hash::Hash for Finding {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.location.hash(state);
    }
}

/// One contribution to a measure, tagged with its origin source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInput {
    pub source: Option<ElementId>,
    pub value: RawValue,
}

/// The payload of one contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawValue {
    Findings(Vec<Finding>),
    Numbers(Vec<f64>),
}

/// All raw data for one evaluation pass, keyed by measure identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawInputs {
    inputs: BTreeMap<ElementId, Vec<RawInput>>,
}

impl RawInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a findings contribution for `measure`.
    pub fn add_findings(
        &mut self,
        measure: impl Into<ElementId>,
        source: Option<ElementId>,
        findings: Vec<Finding>,
    ) {
        self.inputs.entry(measure.into()).or_default().push(RawInput {
            source,
            value: RawValue::Findings(findings),
        });
    }

    /// Records a numbers contribution for `measure`.
    pub fn add_numbers(
        &mut self,
        measure: impl Into<ElementId>,
        source: Option<ElementId>,
        numbers: Vec<f64>,
    ) {
        self.inputs.entry(measure.into()).or_default().push(RawInput {
            source,
            value: RawValue::Numbers(numbers),
        });
    }

    /// Contributions recorded for `measure`. Empty when no tool reported.
    pub fn for_measure(&self, measure: &ElementId) -> &[RawInput] {
        self.inputs.get(measure).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Measures that have at least one contribution.
    pub fn measures(&self) -> impl Iterator<Item = &ElementId> {
        self.inputs.keys()
    }
}

/// A measure's reduced value: the aggregation engine's output currency.
///
/// `NoData` is a defined absence, distinct from zero, produced when a
/// measure has no contributing inputs at all. It propagates as absence
/// through normalization and propagation, never as a worst- or best-case
/// score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureValue {
    Findings(BTreeSet<Finding>),
    Number(f64),
    NoData,
}

impl MeasureValue {
    #[inline]
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }

    /// The raw number handed to normalization: the value itself for
    /// `Number`, the deduplicated finding count for `Findings`, and `None`
    /// for `NoData`.
    pub fn as_raw_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Findings(set) => Some(set.len() as f64),
            Self::NoData => None,
        }
    }
}

/// A factor's (or normalized measure's) score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Score {
    /// Utility in [0, 1].
    Utility(f64),
    /// Defined absence: no data reached this element.
    NoData,
}

impl Score {
    #[inline]
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }

    #[inline]
    pub fn utility(&self) -> Option<f64> {
        match self {
            Self::Utility(u) => Some(*u),
            Self::NoData => None,
        }
    }
}
