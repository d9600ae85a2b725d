//! Domain types for the quality-model entity graph.
//!
//! # Module Structure
//! - `element`: identifiers, provenance value objects, `Entity`, `Source`
//! - `factor`: `Factor` variants and builder
//! - `measure`: `Measure`, `MeasureType`, builder
//! - `impact`: `Impact`, `InfluenceEffect`, `Severity`, builder
//! - `aggregation`: `MeasureAggregation` strategies and builder
//! - `function`: `UtilityFunction` normalization shapes and builder

mod aggregation;
mod element;
mod factor;
mod function;
mod impact;
mod measure;

#[cfg(test)]
mod tests_builders;
#[cfg(test)]
mod tests_impact;
#[cfg(test)]
mod tests_provenance;

// Re-export all public items
pub use self::aggregation::{AggregationKind, MeasureAggregation, MeasureAggregationBuilder};
pub use self::element::{
    Annotated, Annotation, ElementId, Entity, EntityBuilder, Provenance, ProvenanceHolder, Source,
    SourceBuilder, Tag,
};
pub use self::factor::{Factor, FactorBuilder, FactorKind};
pub use self::function::{FunctionKind, UtilityFunction, UtilityFunctionBuilder};
pub use self::impact::{Impact, ImpactBuilder, InfluenceEffect, Severity};
pub use self::measure::{Measure, MeasureBuilder, MeasureType};
