//! Unit tests for Impact construction and the permissive severity setter.

use super::*;

#[test]
fn test_impact_builder_requires_nothing_at_creation() {
    let impact = Impact::builder().create();
    assert!(impact.target.is_none());
    assert!(impact.justification.is_none());
}

#[test]
fn test_impact_default_severity_is_least_severe() {
    let impact = Impact::builder().create();
    assert_eq!(impact.severity(), Severity::LEAST_SEVERE);
    assert_eq!(impact.severity().value(), 5);
}

#[test]
fn test_severity_setter_accepts_in_range() {
    let mut impact = Impact::builder().create();
    impact.set_severity(1);
    assert_eq!(impact.severity().value(), 1);
    impact.set_severity(3);
    assert_eq!(impact.severity().value(), 3);
}

#[test]
fn test_severity_setter_silently_ignores_out_of_range() {
    // Deliberately permissive contract: the prior value survives.
    let mut impact = Impact::builder().create();
    impact.set_severity(2);
    impact.set_severity(0);
    assert_eq!(impact.severity().value(), 2);
    impact.set_severity(6);
    assert_eq!(impact.severity().value(), 2);
    impact.set_severity(255);
    assert_eq!(impact.severity().value(), 2);
}

#[test]
fn test_severity_setter_out_of_range_keeps_uninitialized_default() {
    let impact = Impact::builder().severity(9).create();
    assert_eq!(impact.severity(), Severity::default());
}

#[test]
fn test_severity_new_bounds() {
    assert!(Severity::new(0).is_none());
    assert!(Severity::new(1).is_some());
    assert!(Severity::new(5).is_some());
    assert!(Severity::new(6).is_none());
}

#[test]
fn test_effect_sign() {
    assert_eq!(InfluenceEffect::Positive.sign(), 1.0);
    assert_eq!(InfluenceEffect::Negative.sign(), -1.0);
}

#[test]
fn test_impact_builder_wires_target_effect_justification() {
    let impact = Impact::builder()
        .target("factor-a")
        .origin("factor-b")
        .effect(InfluenceEffect::Negative)
        .justification("complex code is harder to analyze")
        .severity(1)
        .create();
    assert_eq!(impact.target, Some(ElementId::from("factor-a")));
    assert_eq!(impact.origin, Some(ElementId::from("factor-b")));
    assert_eq!(impact.effect, InfluenceEffect::Negative);
    assert_eq!(impact.severity().value(), 1);
    assert!(impact.justification.is_some());
}

#[test]
fn test_future_target_marker() {
    let impact = Impact::builder()
        .future_target("Planned security aspect")
        .create();
    assert_eq!(impact.future_target.as_deref(), Some("Planned security aspect"));
    assert!(impact.target.is_none());
}
