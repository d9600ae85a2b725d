//! Quality factors: the attributes, aspects, and requirements being assessed.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::element::{Annotated, Annotation, ElementId, Provenance, ProvenanceHolder, Tag};
use crate::error::{ModelError, ModelResult};

/// Closed set of factor variants.
///
/// The variant only classifies the factor; edge semantics are identical
/// across kinds, which lets validation match exhaustively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    /// Generic factor with no further classification.
    #[default]
    Factor,
    /// A -ility of the product itself (maintainability, reliability, ...).
    QualityAspect,
    /// A quality attribute observable in use (efficiency in use, comfort).
    QualityInUseAttribute,
    /// An explicit stakeholder requirement.
    Requirement,
}

impl FactorKind {
    /// Returns all factor kinds as an array.
    #[inline]
    pub fn all() -> [FactorKind; 4] {
        [
            Self::Factor,
            Self::QualityAspect,
            Self::QualityInUseAttribute,
            Self::Requirement,
        ]
    }
}

/// A quality attribute, aspect, or requirement whose degree is assessed.
///
/// Factors form the node set of the impact graph. Edge sets (`refines`,
/// `refined_by`, `measured_by`, `incoming`, `outgoing`) are maintained
/// bidirectionally by the owning [`crate::model::QualityModel`]; they stay
/// mutable for the life of the model while the identity is immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factor {
    pub id: ElementId,
    pub kind: FactorKind,
    /// Factor name. Required, non-empty.
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// The product entity this factor characterizes, if any.
    pub characterizes: Option<ElementId>,
    /// Factors this factor refines (is a sub-aspect of).
    pub refines: BTreeSet<ElementId>,
    /// Reverse of `refines`, maintained by the model arena.
    pub refined_by: BTreeSet<ElementId>,
    /// Measures that quantify this factor, maintained by the model arena.
    pub measured_by: BTreeSet<ElementId>,
    /// Impacts targeting this factor, maintained by the model arena.
    pub incoming: BTreeSet<ElementId>,
    /// Impacts originating at this factor, maintained by the model arena.
    pub outgoing: BTreeSet<ElementId>,
    pub provenance: Provenance,
}

impl Factor {
    /// Starts building a Factor with the given (required) name.
    pub fn builder(name: impl Into<String>) -> FactorBuilder {
        FactorBuilder {
            factor: Factor {
                id: ElementId::generate(),
                kind: FactorKind::default(),
                name: name.into(),
                title: None,
                description: None,
                characterizes: None,
                refines: BTreeSet::new(),
                refined_by: BTreeSet::new(),
                measured_by: BTreeSet::new(),
                incoming: BTreeSet::new(),
                outgoing: BTreeSet::new(),
                provenance: Provenance::new(),
            },
        }
    }
}

impl Annotated for Factor {
    fn tags(&self) -> &BTreeSet<Tag> {
        &self.provenance.tags
    }
    fn annotations(&self) -> &BTreeSet<Annotation> {
        &self.provenance.annotations
    }
}

impl ProvenanceHolder for Factor {
    fn origins(&self) -> &BTreeSet<ElementId> {
        &self.provenance.origins
    }
}

/// Fluent builder for [`Factor`]. Consumed by `create()`.
///
/// Adders have set semantics: re-adding an existing edge is a silent no-op.
/// Graph-level checks (e.g. self-refinement) are deferred to
/// [`crate::validation::validate`].
#[derive(Debug)]
pub struct FactorBuilder {
    factor: Factor,
}

impl FactorBuilder {
    pub fn identifier(mut self, id: impl Into<ElementId>) -> Self {
        self.factor.id = id.into();
        self
    }

    pub fn kind(mut self, kind: FactorKind) -> Self {
        self.factor.kind = kind;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.factor.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.factor.description = Some(description.into());
        self
    }

    pub fn characterizes(mut self, entity: impl Into<ElementId>) -> Self {
        self.factor.characterizes = Some(entity.into());
        self
    }

    /// Declares that this factor refines `other`.
    pub fn refines(mut self, other: impl Into<ElementId>) -> Self {
        self.factor.refines.insert(other.into());
        self
    }

    pub fn originates_from(mut self, source: impl Into<ElementId>) -> Self {
        self.factor.provenance.add_origin(source.into());
        self
    }

    pub fn tagged_by(mut self, tag: Tag) -> Self {
        self.factor.provenance.add_tag(tag);
        self
    }

    pub fn annotation(mut self, annotation: Annotation) -> Self {
        self.factor.provenance.add_annotation(annotation);
        self
    }

    /// Finishes construction. Fails if the name is empty.
    pub fn create(self) -> ModelResult<Factor> {
        if self.factor.name.trim().is_empty() {
            return Err(ModelError::MissingField {
                entity: "Factor",
                field: "name",
            });
        }
        Ok(self.factor)
    }
}
