//! Structural validation of an assembled quality model.
//!
//! Builders intentionally defer every graph-level check to this pass:
//! `validate` walks the whole model and reports each problem as a
//! [`StructuralIssue`] carrying the offending element's identifier and a
//! human-readable cause. Nothing is ever repaired silently, and validation
//! never mutates the model.
//!
//! Evaluation (`quality-graph-eval`) refuses models with issues, so callers
//! run this once after assembly and before scoring.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::model::QualityModel;
use crate::types::{ElementId, MeasureType};

/// The cause of a structural issue.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// An impact has neither a target nor a future-target marker.
    #[error("impact has no target")]
    MissingImpactTarget,

    /// An impact names a target factor that is not in the model.
    #[error("impact target {0} does not exist")]
    DanglingImpactTarget(ElementId),

    /// An impact names an origin factor that is not in the model.
    #[error("impact origin {0} does not exist")]
    DanglingImpactOrigin(ElementId),

    /// An impact has no justification. A model is invalid without a
    /// rationale for every influence edge.
    #[error("impact has no justification")]
    MissingJustification,

    /// A factor refines itself.
    #[error("factor refines itself")]
    SelfRefinement,

    /// An aggregation consumes a measure whose declared type does not
    /// match the strategy's input kind.
    #[error("aggregated measure {measure} is {actual:?} but the strategy consumes {expected:?}")]
    AggregationTypeMismatch {
        measure: ElementId,
        expected: MeasureType,
        actual: MeasureType,
    },

    /// A utility function's lower bound is not strictly below its upper.
    #[error("bounds are inverted: lower {lower} >= upper {upper}")]
    InvertedBounds { lower: f64, upper: f64 },

    /// An edge names an element that is not in the model.
    #[error("{relation} edge points at missing element {to}")]
    DanglingReference {
        relation: String,
        to: ElementId,
    },
}

/// One problem found by [`validate`], attributed to a model element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralIssue {
    /// The element the issue is attributed to.
    pub element: ElementId,
    pub kind: IssueKind,
}

impl std::fmt::Display for StructuralIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.element, self.kind)
    }
}

/// Checks every construction invariant that builders defer.
///
/// Returns all issues found, in deterministic model order. An empty vector
/// means the model is structurally sound and eligible for evaluation.
pub fn validate(model: &QualityModel) -> Vec<StructuralIssue> {
    let mut issues = Vec::new();
    let mut push = |element: &ElementId, kind: IssueKind| {
        warn!(element = %element, issue = %kind, "structural issue");
        issues.push(StructuralIssue {
            element: element.clone(),
            kind,
        });
    };

    for factor in model.factors() {
        if factor.refines.contains(&factor.id) {
            push(&factor.id, IssueKind::SelfRefinement);
        }
        for target in &factor.refines {
            if target != &factor.id && model.factor(target).is_none() {
                push(
                    &factor.id,
                    IssueKind::DanglingReference {
                        relation: "refines".into(),
                        to: target.clone(),
                    },
                );
            }
        }
        if let Some(entity) = &factor.characterizes {
            if model.entity(entity).is_none() {
                push(
                    &factor.id,
                    IssueKind::DanglingReference {
                        relation: "characterizes".into(),
                        to: entity.clone(),
                    },
                );
            }
        }
    }

    for measure in model.measures() {
        for factor in &measure.measures {
            if model.factor(factor).is_none() {
                push(
                    &measure.id,
                    IssueKind::DanglingReference {
                        relation: "measures".into(),
                        to: factor.clone(),
                    },
                );
            }
        }
        for other in &measure.refines {
            if model.measure(other).is_none() {
                push(
                    &measure.id,
                    IssueKind::DanglingReference {
                        relation: "refines".into(),
                        to: other.clone(),
                    },
                );
            }
        }
        if let Some(function) = &measure.normalized_by {
            if model.function(function).is_none() {
                push(
                    &measure.id,
                    IssueKind::DanglingReference {
                        relation: "normalized-by".into(),
                        to: function.clone(),
                    },
                );
            }
        }
    }

    for impact in model.impacts() {
        match &impact.target {
            Some(target) => {
                if model.factor(target).is_none() {
                    push(&impact.id, IssueKind::DanglingImpactTarget(target.clone()));
                }
            }
            // A future-target marker keeps a planned impact legal; it stays
            // inert until a real target is wired in.
            None if impact.future_target.is_none() => {
                push(&impact.id, IssueKind::MissingImpactTarget);
            }
            None => {}
        }
        if let Some(origin) = &impact.origin {
            if model.factor(origin).is_none() {
                push(&impact.id, IssueKind::DanglingImpactOrigin(origin.clone()));
            }
        }
        if impact
            .justification
            .as_deref()
            .map_or(true, |j| j.trim().is_empty())
        {
            push(&impact.id, IssueKind::MissingJustification);
        }
    }

    for aggregation in model.aggregations() {
        let expected = aggregation.kind.input_kind();
        for measure_id in &aggregation.aggregates {
            match model.measure(measure_id) {
                Some(measure) if measure.measure_type != expected => {
                    push(
                        &aggregation.id,
                        IssueKind::AggregationTypeMismatch {
                            measure: measure_id.clone(),
                            expected,
                            actual: measure.measure_type,
                        },
                    );
                }
                Some(_) => {}
                None => push(
                    &aggregation.id,
                    IssueKind::DanglingReference {
                        relation: "aggregates".into(),
                        to: measure_id.clone(),
                    },
                ),
            }
        }
        if let Some(output) = &aggregation.output {
            if model.measure(output).is_none() {
                push(
                    &aggregation.id,
                    IssueKind::DanglingReference {
                        relation: "output".into(),
                        to: output.clone(),
                    },
                );
            }
        }
    }

    for function in model.functions() {
        if function.lower_bound >= function.upper_bound {
            push(
                &function.id,
                IssueKind::InvertedBounds {
                    lower: function.lower_bound,
                    upper: function.upper_bound,
                },
            );
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        AggregationKind, Factor, FunctionKind, Impact, InfluenceEffect, Measure,
        MeasureAggregation, MeasureType, UtilityFunction,
    };

    fn valid_model() -> QualityModel {
        let mut model = QualityModel::new();
        model
            .add_factor(Factor::builder("F").identifier("f").create().unwrap())
            .unwrap();
        model
            .add_measure(
                Measure::builder("M")
                    .identifier("m")
                    .measure_type(MeasureType::Number)
                    .measures("f")
                    .create()
                    .unwrap(),
            )
            .unwrap();
        model
    }

    #[test]
    fn test_valid_model_has_no_issues() {
        assert!(validate(&valid_model()).is_empty());
    }

    #[test]
    fn test_self_refinement_rejected() {
        let mut model = QualityModel::new();
        let factor = Factor::builder("F")
            .identifier("f")
            .refines("f")
            .create()
            .unwrap();
        model.add_factor(factor).unwrap();
        let issues = validate(&model);
        assert!(issues
            .iter()
            .any(|i| i.kind == IssueKind::SelfRefinement && i.element == "f".into()));
    }

    #[test]
    fn test_impact_without_target_or_justification() {
        let mut model = valid_model();
        model
            .add_impact(Impact::builder().identifier("i").create())
            .unwrap();
        let issues = validate(&model);
        assert!(issues.iter().any(|i| i.kind == IssueKind::MissingImpactTarget));
        assert!(issues.iter().any(|i| i.kind == IssueKind::MissingJustification));
    }

    #[test]
    fn test_future_target_marker_excuses_missing_target() {
        let mut model = valid_model();
        model
            .add_impact(
                Impact::builder()
                    .identifier("i")
                    .future_target("planned factor")
                    .justification("anticipated influence")
                    .create(),
            )
            .unwrap();
        assert!(validate(&model).is_empty());
    }

    #[test]
    fn test_dangling_impact_target_reported() {
        let mut model = valid_model();
        model
            .add_impact(
                Impact::builder()
                    .identifier("i")
                    .target("ghost")
                    .effect(InfluenceEffect::Positive)
                    .justification("points nowhere")
                    .create(),
            )
            .unwrap();
        let issues = validate(&model);
        assert!(issues
            .iter()
            .any(|i| matches!(&i.kind, IssueKind::DanglingImpactTarget(t) if t == &"ghost".into())));
    }

    #[test]
    fn test_number_measure_under_findings_aggregation_fails() {
        let mut model = valid_model();
        model
            .add_measure(
                Measure::builder("Out")
                    .identifier("out")
                    .measure_type(MeasureType::Findings)
                    .create()
                    .unwrap(),
            )
            .unwrap();
        model
            .add_aggregation(
                MeasureAggregation::builder(AggregationKind::FindingsIntersection)
                    .identifier("agg")
                    .output("out")
                    .aggregates("m") // m is a Number measure
                    .create()
                    .unwrap(),
            )
            .unwrap();
        let issues = validate(&model);
        assert!(issues.iter().any(|i| matches!(
            &i.kind,
            IssueKind::AggregationTypeMismatch {
                expected: MeasureType::Findings,
                actual: MeasureType::Number,
                ..
            }
        )));
    }

    #[test]
    fn test_inverted_bounds_rejected_for_every_function_kind() {
        for kind in FunctionKind::all() {
            let mut model = QualityModel::new();
            model
                .add_function(
                    UtilityFunction::builder(kind)
                        .identifier("fun")
                        .lower_bound(10.0)
                        .upper_bound(5.0)
                        .create()
                        .unwrap(),
                )
                .unwrap();
            let issues = validate(&model);
            assert!(
                issues
                    .iter()
                    .any(|i| matches!(i.kind, IssueKind::InvertedBounds { .. })),
                "kind {kind:?} accepted inverted bounds"
            );
        }
    }

    #[test]
    fn test_equal_bounds_are_inverted() {
        let mut model = QualityModel::new();
        model
            .add_function(
                UtilityFunction::builder(FunctionKind::LinearDecreasing)
                    .identifier("fun")
                    .lower_bound(3.0)
                    .upper_bound(3.0)
                    .create()
                    .unwrap(),
            )
            .unwrap();
        assert_eq!(validate(&model).len(), 1);
    }

    #[test]
    fn test_issues_round_trip_through_serde() {
        let issue = StructuralIssue {
            element: "m".into(),
            kind: IssueKind::DanglingReference {
                relation: "measures".into(),
                to: "ghost".into(),
            },
        };
        let json = serde_json::to_string(&issue).unwrap();
        let back: StructuralIssue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, issue);
    }

    #[test]
    fn test_validation_does_not_mutate_model() {
        let mut model = valid_model();
        model
            .add_impact(Impact::builder().identifier("i").create())
            .unwrap();
        let before = model.clone();
        let _ = validate(&model);
        assert_eq!(model, before);
    }
}
