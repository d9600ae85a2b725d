//! Quality-Model Core Library
//!
//! Provides the entity graph for a software-quality assessment model:
//! quality **Factors** connected by directed, justified **Impacts**,
//! quantified by typed **Measures**, reduced by declared **Aggregations**
//! and normalized by utility **Functions**.
//!
//! # Architecture
//!
//! This crate defines:
//! - Domain types (`Factor`, `Measure`, `Impact`, `MeasureAggregation`,
//!   `UtilityFunction`, and the provenance value objects)
//! - Fluent builders per entity kind, terminal `create()`
//! - The `QualityModel` arena that owns every entity and maintains
//!   bidirectional edge bookkeeping
//! - Structural validation (`validate`) producing a list of issues,
//!   never repairing the model silently
//! - Error types and result aliases
//!
//! Evaluation (aggregation, normalization, propagation) lives in the
//! companion crate `quality-graph-eval`.
//!
//! # Example
//!
//! ```
//! use quality_graph_core::types::{Factor, FactorKind, Measure, MeasureType};
//! use quality_graph_core::model::QualityModel;
//! use quality_graph_core::validation::validate;
//!
//! # fn main() -> quality_graph_core::error::ModelResult<()> {
//! let mut model = QualityModel::new();
//! let maintainability = Factor::builder("Maintainability")
//!     .kind(FactorKind::QualityAspect)
//!     .create()?;
//! let factor_id = model.add_factor(maintainability)?;
//!
//! let loc = Measure::builder("Lines of Code")
//!     .measure_type(MeasureType::Number)
//!     .measures(factor_id.clone())
//!     .create()?;
//! model.add_measure(loc)?;
//!
//! assert!(validate(&model).is_empty());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod model;
pub mod types;
pub mod validation;

// Re-exports for convenience
pub use error::{ModelError, ModelResult};
pub use model::QualityModel;
pub use types::{
    AggregationKind, Annotation, ElementId, Entity, Factor, FactorKind, FunctionKind, Impact,
    InfluenceEffect, Measure, MeasureAggregation, MeasureType, Severity, Source, Tag,
    UtilityFunction,
};
pub use validation::{validate, IssueKind, StructuralIssue};
