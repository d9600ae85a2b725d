//! Aggregation strategies reducing raw measure inputs to one value.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::element::{Annotated, Annotation, ElementId, Provenance, ProvenanceHolder, Tag};
use super::measure::MeasureType;
use crate::error::{ModelError, ModelResult};

/// Closed set of aggregation strategies, grouped by input kind.
///
/// Findings strategies are set operations over deduplicated finding
/// locations; number strategies are statistical reductions over real-value
/// multisets. Every strategy is order-independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationKind {
    /// Findings present in every contributing input set.
    FindingsIntersection,
    /// Findings present in any contributing input set.
    FindingsUnion,
    /// Arithmetic mean.
    NumberMean,
    /// Sum. An empty input set yields no data, not zero.
    NumberSum,
    /// Population variance.
    NumberVariance,
    /// Smallest input.
    NumberMin,
    /// Largest input.
    NumberMax,
    /// Median (mean of the middle pair for even counts).
    NumberMedian,
}

impl AggregationKind {
    /// The measure type this strategy consumes. Aggregated measures whose
    /// declared type differs fail validation.
    #[inline]
    pub fn input_kind(self) -> MeasureType {
        match self {
            Self::FindingsIntersection | Self::FindingsUnion => MeasureType::Findings,
            Self::NumberMean
            | Self::NumberSum
            | Self::NumberVariance
            | Self::NumberMin
            | Self::NumberMax
            | Self::NumberMedian => MeasureType::Number,
        }
    }

    /// Returns all aggregation kinds as an array.
    #[inline]
    pub fn all() -> [AggregationKind; 8] {
        [
            Self::FindingsIntersection,
            Self::FindingsUnion,
            Self::NumberMean,
            Self::NumberSum,
            Self::NumberVariance,
            Self::NumberMin,
            Self::NumberMax,
            Self::NumberMedian,
        ]
    }
}

/// Declares how one measure's value is computed from other measures.
///
/// The `aggregates` set holds the contributing measures; insertion order is
/// irrelevant by construction (the set is ordered by id, and every strategy
/// is commutative).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureAggregation {
    pub id: ElementId,
    pub kind: AggregationKind,
    /// The measure whose value this aggregation produces.
    pub output: Option<ElementId>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Measures contributing inputs to this aggregation.
    pub aggregates: BTreeSet<ElementId>,
    pub provenance: Provenance,
}

impl MeasureAggregation {
    /// Starts building an aggregation of the given kind.
    pub fn builder(kind: AggregationKind) -> MeasureAggregationBuilder {
        MeasureAggregationBuilder {
            aggregation: MeasureAggregation {
                id: ElementId::generate(),
                kind,
                output: None,
                title: None,
                description: None,
                aggregates: BTreeSet::new(),
                provenance: Provenance::new(),
            },
        }
    }
}

impl Annotated for MeasureAggregation {
    fn tags(&self) -> &BTreeSet<Tag> {
        &self.provenance.tags
    }
    fn annotations(&self) -> &BTreeSet<Annotation> {
        &self.provenance.annotations
    }
}

impl ProvenanceHolder for MeasureAggregation {
    fn origins(&self) -> &BTreeSet<ElementId> {
        &self.provenance.origins
    }
}

/// Fluent builder for [`MeasureAggregation`]. Consumed by `create()`.
#[derive(Debug)]
pub struct MeasureAggregationBuilder {
    aggregation: MeasureAggregation,
}

impl MeasureAggregationBuilder {
    pub fn identifier(mut self, id: impl Into<ElementId>) -> Self {
        self.aggregation.id = id.into();
        self
    }

    /// Sets the measure whose value this aggregation produces.
    pub fn output(mut self, measure: impl Into<ElementId>) -> Self {
        self.aggregation.output = Some(measure.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.aggregation.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.aggregation.description = Some(description.into());
        self
    }

    /// Adds a contributing measure. No-op if already present.
    pub fn aggregates(mut self, measure: impl Into<ElementId>) -> Self {
        self.aggregation.aggregates.insert(measure.into());
        self
    }

    pub fn originates_from(mut self, source: impl Into<ElementId>) -> Self {
        self.aggregation.provenance.add_origin(source.into());
        self
    }

    pub fn tagged_by(mut self, tag: Tag) -> Self {
        self.aggregation.provenance.add_tag(tag);
        self
    }

    pub fn annotation(mut self, annotation: Annotation) -> Self {
        self.aggregation.provenance.add_annotation(annotation);
        self
    }

    /// Finishes construction. Fails if no output measure is set; the
    /// type-match between the strategy and the aggregated measures is a
    /// graph-level concern checked by validation.
    pub fn create(self) -> ModelResult<MeasureAggregation> {
        if self.aggregation.output.is_none() {
            return Err(ModelError::MissingField {
                entity: "MeasureAggregation",
                field: "output",
            });
        }
        Ok(self.aggregation)
    }
}
