//! Unit tests for entity builders: mandatory fields, chained setters,
//! set-semantics adders.

use super::*;
use crate::error::ModelError;

// =========================================================================
// Mandatory identity fields
// =========================================================================

#[test]
fn test_factor_requires_nonempty_name() {
    let err = Factor::builder("").create().unwrap_err();
    assert!(matches!(
        err,
        ModelError::MissingField {
            entity: "Factor",
            field: "name"
        }
    ));
}

#[test]
fn test_factor_whitespace_name_rejected() {
    assert!(Factor::builder("   ").create().is_err());
}

#[test]
fn test_measure_requires_nonempty_name() {
    let err = Measure::builder("").create().unwrap_err();
    assert!(matches!(err, ModelError::MissingField { entity: "Measure", .. }));
}

#[test]
fn test_entity_and_source_require_names() {
    assert!(Entity::builder("").create().is_err());
    assert!(Source::builder("").create().is_err());
    assert!(Entity::builder("source code").create().is_ok());
    assert!(Source::builder("clippy").create().is_ok());
}

#[test]
fn test_aggregation_requires_output_measure() {
    let err = MeasureAggregation::builder(AggregationKind::NumberMean)
        .create()
        .unwrap_err();
    assert!(matches!(
        err,
        ModelError::MissingField {
            entity: "MeasureAggregation",
            field: "output"
        }
    ));
}

#[test]
fn test_function_rejects_non_finite_bounds() {
    let err = UtilityFunction::builder(FunctionKind::LinearIncreasing)
        .lower_bound(f64::NAN)
        .upper_bound(1.0)
        .create();
    assert!(err.is_err());
}

#[test]
fn test_function_inverted_bounds_deferred_to_validation() {
    // Inverted bounds build fine; validation is what rejects them.
    let f = UtilityFunction::builder(FunctionKind::LinearIncreasing)
        .lower_bound(10.0)
        .upper_bound(5.0)
        .create()
        .unwrap();
    assert_eq!(f.lower_bound, 10.0);
    assert_eq!(f.upper_bound, 5.0);
}

// =========================================================================
// Chained setters and identity
// =========================================================================

#[test]
fn test_builder_chain_sets_optional_fields() {
    let factor = Factor::builder("Maintainability")
        .kind(FactorKind::QualityAspect)
        .title("Maintainability")
        .description("Ease of modification")
        .create()
        .unwrap();
    assert_eq!(factor.kind, FactorKind::QualityAspect);
    assert_eq!(factor.title.as_deref(), Some("Maintainability"));
    assert_eq!(factor.description.as_deref(), Some("Ease of modification"));
}

#[test]
fn test_generated_ids_are_unique() {
    let a = Factor::builder("A").create().unwrap();
    let b = Factor::builder("A").create().unwrap();
    assert_ne!(a.id, b.id);
}

#[test]
fn test_caller_supplied_identifier_is_kept() {
    let m = Measure::builder("LOC")
        .identifier("measure-loc")
        .create()
        .unwrap();
    assert_eq!(m.id, ElementId::from("measure-loc"));
}

// =========================================================================
// Set-semantics adders
// =========================================================================

#[test]
fn test_refines_adder_deduplicates() {
    let target = ElementId::from("target");
    let factor = Factor::builder("F")
        .refines(target.clone())
        .refines(target.clone())
        .create()
        .unwrap();
    assert_eq!(factor.refines.len(), 1);
    assert!(factor.refines.contains(&target));
}

#[test]
fn test_aggregates_adder_deduplicates() {
    let agg = MeasureAggregation::builder(AggregationKind::FindingsUnion)
        .output("out")
        .aggregates("m1")
        .aggregates("m2")
        .aggregates("m1")
        .create()
        .unwrap();
    assert_eq!(agg.aggregates.len(), 2);
}

#[test]
fn test_aggregation_kind_input_kinds() {
    assert_eq!(
        AggregationKind::FindingsIntersection.input_kind(),
        MeasureType::Findings
    );
    assert_eq!(
        AggregationKind::FindingsUnion.input_kind(),
        MeasureType::Findings
    );
    for kind in [
        AggregationKind::NumberMean,
        AggregationKind::NumberSum,
        AggregationKind::NumberVariance,
        AggregationKind::NumberMin,
        AggregationKind::NumberMax,
        AggregationKind::NumberMedian,
    ] {
        assert_eq!(kind.input_kind(), MeasureType::Number);
    }
}
