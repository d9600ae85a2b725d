//! Error types for quality-graph-core.
//!
//! Construction errors surface immediately at builder completion or arena
//! insertion; graph-level problems are reported by [`crate::validation`]
//! instead, as a list of issues rather than a hard error.

use thiserror::Error;

use crate::types::ElementId;

/// Result alias for model construction operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while constructing entities or inserting them into a model.
///
/// A failed construction leaves all prior state untouched: builders are
/// consumed on `create()`, and arena insertion rejects before mutating.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A mandatory identity field was missing or empty at `create()`.
    #[error("missing mandatory field `{field}` on {entity}")]
    MissingField {
        /// Entity kind under construction (e.g. "Measure").
        entity: &'static str,
        /// Name of the missing field.
        field: &'static str,
    },

    /// An element with this identifier already exists in the model.
    #[error("duplicate element identifier {0}")]
    DuplicateId(ElementId),

    /// A referenced element identifier does not exist in the model.
    #[error("unknown element {0}")]
    UnknownElement(ElementId),
}
