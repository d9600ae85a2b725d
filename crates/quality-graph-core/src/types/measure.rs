//! Measures: how factors are quantified.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::element::{Annotated, Annotation, ElementId, Provenance, ProvenanceHolder, Tag};
use crate::error::{ModelError, ModelResult};

/// The data kind a measure produces.
///
/// `Findings` measures identify locations in the product where a rule is
/// violated (most static analyzers report these). `Number` measures report
/// an arbitrary real value, absolute or ratio. The type is declared at
/// construction and fixed: validation rejects aggregations whose input kind
/// does not match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureType {
    #[default]
    None,
    Findings,
    Number,
}

/// A quantification mechanism for one or more factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub id: ElementId,
    /// Measure name. Required, non-empty.
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// The product entity this measure characterizes, if any.
    pub characterizes: Option<ElementId>,
    /// Measures this measure refines.
    pub refines: BTreeSet<ElementId>,
    /// Factors this measure quantifies.
    pub measures: BTreeSet<ElementId>,
    /// Declared data kind.
    pub measure_type: MeasureType,
    /// Utility function normalizing this measure's aggregated value, if any.
    pub normalized_by: Option<ElementId>,
    pub provenance: Provenance,
}

impl Measure {
    /// Starts building a Measure with the given (required) name.
    pub fn builder(name: impl Into<String>) -> MeasureBuilder {
        MeasureBuilder {
            measure: Measure {
                id: ElementId::generate(),
                name: name.into(),
                title: None,
                description: None,
                characterizes: None,
                refines: BTreeSet::new(),
                measures: BTreeSet::new(),
                measure_type: MeasureType::default(),
                normalized_by: None,
                provenance: Provenance::new(),
            },
        }
    }
}

impl Annotated for Measure {
    fn tags(&self) -> &BTreeSet<Tag> {
        &self.provenance.tags
    }
    fn annotations(&self) -> &BTreeSet<Annotation> {
        &self.provenance.annotations
    }
}

impl ProvenanceHolder for Measure {
    fn origins(&self) -> &BTreeSet<ElementId> {
        &self.provenance.origins
    }
}

/// Fluent builder for [`Measure`]. Consumed by `create()`.
#[derive(Debug)]
pub struct MeasureBuilder {
    measure: Measure,
}

impl MeasureBuilder {
    pub fn identifier(mut self, id: impl Into<ElementId>) -> Self {
        self.measure.id = id.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.measure.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.measure.description = Some(description.into());
        self
    }

    pub fn characterizes(mut self, entity: impl Into<ElementId>) -> Self {
        self.measure.characterizes = Some(entity.into());
        self
    }

    pub fn measure_type(mut self, measure_type: MeasureType) -> Self {
        self.measure.measure_type = measure_type;
        self
    }

    /// Declares that this measure refines `other`.
    pub fn refines(mut self, other: impl Into<ElementId>) -> Self {
        self.measure.refines.insert(other.into());
        self
    }

    /// Declares that this measure quantifies `factor`.
    pub fn measures(mut self, factor: impl Into<ElementId>) -> Self {
        self.measure.measures.insert(factor.into());
        self
    }

    /// Attaches the utility function normalizing this measure.
    pub fn normalized_by(mut self, function: impl Into<ElementId>) -> Self {
        self.measure.normalized_by = Some(function.into());
        self
    }

    pub fn originates_from(mut self, source: impl Into<ElementId>) -> Self {
        self.measure.provenance.add_origin(source.into());
        self
    }

    pub fn tagged_by(mut self, tag: Tag) -> Self {
        self.measure.provenance.add_tag(tag);
        self
    }

    pub fn annotation(mut self, annotation: Annotation) -> Self {
        self.measure.provenance.add_annotation(annotation);
        self
    }

    /// Finishes construction. Fails if the name is empty.
    pub fn create(self) -> ModelResult<Measure> {
        if self.measure.name.trim().is_empty() {
            return Err(ModelError::MissingField {
                entity: "Measure",
                field: "name",
            });
        }
        Ok(self.measure)
    }
}
