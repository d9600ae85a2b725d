//! Shared identity and provenance value objects.
//!
//! Every model entity carries an opaque unique identifier and a provenance
//! payload (originating sources, tags, free-form annotations). All
//! multi-valued fields have set semantics: re-adding an existing item is a
//! silent no-op, never an error and never a duplicate.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ModelError, ModelResult};

/// Opaque unique identifier for a model element.
///
/// Generated identifiers are UUID v4 strings; callers may also supply their
/// own opaque strings (identity generation is an external service as far as
/// the model is concerned). Immutable once set, unique within a model.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Generates a fresh unique identifier (UUID v4).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ElementId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A tag attached to a model element.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name (e.g. "security", "tool:clippy").
    pub name: String,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A free-form key/value annotation attached to a model element.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Annotation {
    pub key: String,
    pub value: String,
}

impl Annotation {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Shared provenance payload carried by every non-Source entity.
///
/// Ordered containers keep model iteration deterministic; insertion order is
/// irrelevant to all consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Identifiers of the Sources this element originates from.
    pub origins: BTreeSet<ElementId>,
    /// Tags attached to this element.
    pub tags: BTreeSet<Tag>,
    /// Free-form annotations attached to this element.
    pub annotations: BTreeSet<Annotation>,
}

impl Provenance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an originating Source. No-op if already present.
    pub fn add_origin(&mut self, source: ElementId) {
        self.origins.insert(source);
    }

    /// Attaches a tag. No-op if already present.
    pub fn add_tag(&mut self, tag: Tag) {
        self.tags.insert(tag);
    }

    /// Attaches an annotation. No-op if already present.
    pub fn add_annotation(&mut self, annotation: Annotation) {
        self.annotations.insert(annotation);
    }
}

/// Capability: an element that can be tagged and annotated.
pub trait Annotated {
    fn tags(&self) -> &BTreeSet<Tag>;
    fn annotations(&self) -> &BTreeSet<Annotation>;
}

/// Capability: an element whose provenance chain can cite Sources.
///
/// [`Source`] deliberately implements only [`Annotated`], not this trait:
/// a Source cannot itself originate from another Source. The restriction is
/// expressed by the missing capability, not by an override that silently
/// returns nothing.
pub trait ProvenanceHolder: Annotated {
    fn origins(&self) -> &BTreeSet<ElementId>;
}

/// A thing in the (software) product that Factors and Measures characterize,
/// e.g. "source code", "method", "build artifact".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: ElementId,
    /// Entity name. Required, non-empty.
    pub name: String,
    /// Optional alternative, more readable identifier.
    pub title: Option<String>,
    pub description: Option<String>,
    pub provenance: Provenance,
}

impl Entity {
    /// Starts building an Entity with the given (required) name.
    pub fn builder(name: impl Into<String>) -> EntityBuilder {
        EntityBuilder {
            entity: Entity {
                id: ElementId::generate(),
                name: name.into(),
                title: None,
                description: None,
                provenance: Provenance::new(),
            },
        }
    }
}

impl Annotated for Entity {
    fn tags(&self) -> &BTreeSet<Tag> {
        &self.provenance.tags
    }
    fn annotations(&self) -> &BTreeSet<Annotation> {
        &self.provenance.annotations
    }
}

impl ProvenanceHolder for Entity {
    fn origins(&self) -> &BTreeSet<ElementId> {
        &self.provenance.origins
    }
}

/// Fluent builder for [`Entity`]. Consumed by `create()`.
#[derive(Debug)]
pub struct EntityBuilder {
    entity: Entity,
}

impl EntityBuilder {
    pub fn identifier(mut self, id: impl Into<ElementId>) -> Self {
        self.entity.id = id.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.entity.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.entity.description = Some(description.into());
        self
    }

    pub fn originates_from(mut self, source: impl Into<ElementId>) -> Self {
        self.entity.provenance.add_origin(source.into());
        self
    }

    pub fn tagged_by(mut self, tag: Tag) -> Self {
        self.entity.provenance.add_tag(tag);
        self
    }

    pub fn annotation(mut self, annotation: Annotation) -> Self {
        self.entity.provenance.add_annotation(annotation);
        self
    }

    /// Finishes construction. Fails if the name is empty.
    pub fn create(self) -> ModelResult<Entity> {
        if self.entity.name.trim().is_empty() {
            return Err(ModelError::MissingField {
                entity: "Entity",
                field: "name",
            });
        }
        Ok(self.entity)
    }
}

/// Provenance root: a tool, document, or person that model content
/// originates from.
///
/// A Source carries tags and annotations but no "originates from" set of its
/// own. The provenance chain terminates here by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: ElementId,
    /// Source name. Required, non-empty.
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: BTreeSet<Tag>,
    pub annotations: BTreeSet<Annotation>,
}

impl Source {
    /// Starts building a Source with the given (required) name.
    pub fn builder(name: impl Into<String>) -> SourceBuilder {
        SourceBuilder {
            source: Source {
                id: ElementId::generate(),
                name: name.into(),
                title: None,
                description: None,
                tags: BTreeSet::new(),
                annotations: BTreeSet::new(),
            },
        }
    }
}

impl Annotated for Source {
    fn tags(&self) -> &BTreeSet<Tag> {
        &self.tags
    }
    fn annotations(&self) -> &BTreeSet<Annotation> {
        &self.annotations
    }
}

/// Fluent builder for [`Source`]. Consumed by `create()`.
#[derive(Debug)]
pub struct SourceBuilder {
    source: Source,
}

impl SourceBuilder {
    pub fn identifier(mut self, id: impl Into<ElementId>) -> Self {
        self.source.id = id.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.source.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.source.description = Some(description.into());
        self
    }

    pub fn tagged_by(mut self, tag: Tag) -> Self {
        self.source.tags.insert(tag);
        self
    }

    pub fn annotation(mut self, annotation: Annotation) -> Self {
        self.source.annotations.insert(annotation);
        self
    }

    /// Finishes construction. Fails if the name is empty.
    pub fn create(self) -> ModelResult<Source> {
        if self.source.name.trim().is_empty() {
            return Err(ModelError::MissingField {
                entity: "Source",
                field: "name",
            });
        }
        Ok(self.source)
    }
}
