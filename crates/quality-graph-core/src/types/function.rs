//! Utility functions mapping raw aggregated values into [0, 1].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::element::{Annotated, Annotation, ElementId, Provenance, ProvenanceHolder, Tag};
use crate::error::{ModelError, ModelResult};

/// Closed set of normalization function shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    /// Utility grows with the raw value: 0 at the lower bound, 1 at the
    /// upper bound, saturating beyond both.
    LinearIncreasing,
    /// Utility falls with the raw value: 1 at the lower bound, 0 at the
    /// upper bound, saturating beyond both.
    LinearDecreasing,
}

impl FunctionKind {
    /// Returns all function kinds as an array.
    #[inline]
    pub fn all() -> [FunctionKind; 2] {
        [Self::LinearIncreasing, Self::LinearDecreasing]
    }
}

/// A normalization function with its bounds.
///
/// `lower_bound < upper_bound` is a structural invariant checked by
/// validation, never clamped at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilityFunction {
    pub id: ElementId,
    pub kind: FunctionKind,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub provenance: Provenance,
}

impl UtilityFunction {
    /// Starts building a function of the given shape over `[lower, upper]`.
    pub fn builder(kind: FunctionKind) -> UtilityFunctionBuilder {
        UtilityFunctionBuilder {
            function: UtilityFunction {
                id: ElementId::generate(),
                kind,
                lower_bound: 0.0,
                upper_bound: 1.0,
                title: None,
                description: None,
                provenance: Provenance::new(),
            },
        }
    }
}

impl Annotated for UtilityFunction {
    fn tags(&self) -> &BTreeSet<Tag> {
        &self.provenance.tags
    }
    fn annotations(&self) -> &BTreeSet<Annotation> {
        &self.provenance.annotations
    }
}

impl ProvenanceHolder for UtilityFunction {
    fn origins(&self) -> &BTreeSet<ElementId> {
        &self.provenance.origins
    }
}

/// Fluent builder for [`UtilityFunction`]. Consumed by `create()`.
#[derive(Debug)]
pub struct UtilityFunctionBuilder {
    function: UtilityFunction,
}

impl UtilityFunctionBuilder {
    pub fn identifier(mut self, id: impl Into<ElementId>) -> Self {
        self.function.id = id.into();
        self
    }

    pub fn lower_bound(mut self, bound: f64) -> Self {
        self.function.lower_bound = bound;
        self
    }

    pub fn upper_bound(mut self, bound: f64) -> Self {
        self.function.upper_bound = bound;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.function.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.function.description = Some(description.into());
        self
    }

    pub fn originates_from(mut self, source: impl Into<ElementId>) -> Self {
        self.function.provenance.add_origin(source.into());
        self
    }

    pub fn tagged_by(mut self, tag: Tag) -> Self {
        self.function.provenance.add_tag(tag);
        self
    }

    pub fn annotation(mut self, annotation: Annotation) -> Self {
        self.function.provenance.add_annotation(annotation);
        self
    }

    /// Finishes construction. Non-finite bounds are a construction error;
    /// inverted bounds are left for validation so a partially assembled
    /// model can still be inspected.
    pub fn create(self) -> ModelResult<UtilityFunction> {
        if !self.function.lower_bound.is_finite() || !self.function.upper_bound.is_finite() {
            return Err(ModelError::MissingField {
                entity: "UtilityFunction",
                field: "finite bounds",
            });
        }
        Ok(self.function)
    }
}
