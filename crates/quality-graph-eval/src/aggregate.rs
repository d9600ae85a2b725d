//! Aggregation engine: reduces a measure's contributing inputs to one value.
//!
//! Findings strategies are set operations over deduplicated finding
//! locations; number strategies are statistical reductions over the flat
//! multiset of contributed values. Every strategy is order-independent, and
//! every strategy maps an empty contribution list to [`MeasureValue::NoData`]
//! rather than a zero or a division by zero.

use std::collections::BTreeSet;

use tracing::{trace, warn};

use quality_graph_core::model::QualityModel;
use quality_graph_core::types::{AggregationKind, ElementId, MeasureType};

use crate::inputs::{Finding, MeasureValue, RawInputs, RawValue};

/// One contribution to an aggregation, already reduced to the engine
/// currency. `NoData` contributions are dropped before reduction.
#[derive(Debug, Clone, PartialEq)]
pub enum Contribution {
    Findings(BTreeSet<Finding>),
    Numbers(Vec<f64>),
}

/// Reduces contributions with the given strategy.
///
/// Contract: `aggregate(strategy, inputs) -> reduced value`. The result is
/// invariant under permutation of `contributions`, and `NoData` when no
/// contribution matches the strategy's input kind.
pub fn aggregate(kind: AggregationKind, contributions: &[Contribution]) -> MeasureValue {
    match kind {
        AggregationKind::FindingsIntersection => {
            let mut sets = contributions.iter().filter_map(as_findings);
            let Some(first) = sets.next() else {
                return MeasureValue::NoData;
            };
            let result = sets.fold(first.clone(), |acc, set| &acc & set);
            MeasureValue::Findings(result)
        }
        AggregationKind::FindingsUnion => {
            let mut result: Option<BTreeSet<Finding>> = None;
            for set in contributions.iter().filter_map(as_findings) {
                result = Some(match result {
                    Some(acc) => &acc | set,
                    None => set.clone(),
                });
            }
            result.map_or(MeasureValue::NoData, MeasureValue::Findings)
        }
        AggregationKind::NumberMean
        | AggregationKind::NumberSum
        | AggregationKind::NumberVariance
        | AggregationKind::NumberMin
        | AggregationKind::NumberMax
        | AggregationKind::NumberMedian => {
            let values: Vec<f64> = contributions
                .iter()
                .filter_map(as_numbers)
                .flatten()
                .copied()
                .collect();
            if values.is_empty() {
                // "No tool ran" stays distinct from "tools reported zero".
                return MeasureValue::NoData;
            }
            MeasureValue::Number(reduce_numbers(kind, &values))
        }
    }
}

fn as_findings(c: &Contribution) -> Option<&BTreeSet<Finding>> {
    match c {
        Contribution::Findings(set) => Some(set),
        Contribution::Numbers(_) => None,
    }
}

fn as_numbers(c: &Contribution) -> Option<&Vec<f64>> {
    match c {
        Contribution::Numbers(values) => Some(values),
        Contribution::Findings(_) => None,
    }
}

/// Statistical reduction over a non-empty multiset.
fn reduce_numbers(kind: AggregationKind, values: &[f64]) -> f64 {
    let n = values.len() as f64;
    match kind {
        AggregationKind::NumberSum => values.iter().sum(),
        AggregationKind::NumberMean => values.iter().sum::<f64>() / n,
        AggregationKind::NumberVariance => {
            // Population variance.
            let mean = values.iter().sum::<f64>() / n;
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
        }
        AggregationKind::NumberMin => values.iter().copied().fold(f64::INFINITY, f64::min),
        AggregationKind::NumberMax => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        AggregationKind::NumberMedian => {
            let mut sorted = values.to_vec();
            sorted.sort_by(f64::total_cmp);
            let mid = sorted.len() / 2;
            if sorted.len() % 2 == 1 {
                sorted[mid]
            } else {
                (sorted[mid - 1] + sorted[mid]) / 2.0
            }
        }
        AggregationKind::FindingsIntersection | AggregationKind::FindingsUnion => {
            unreachable!("findings strategies never reach numeric reduction")
        }
    }
}

/// Computes measure values with per-pass memoization.
///
/// A measure's contributions are its own raw inputs plus the values of the
/// measures its declared aggregation aggregates over, computed recursively.
/// Without a declared aggregation the default strategy applies: union for
/// findings measures, mean for number measures; a `None`-typed measure
/// carries no value.
pub struct MeasureEvaluator<'a> {
    model: &'a QualityModel,
    inputs: &'a RawInputs,
    cache: std::collections::BTreeMap<ElementId, MeasureValue>,
    in_progress: BTreeSet<ElementId>,
}

impl<'a> MeasureEvaluator<'a> {
    pub fn new(model: &'a QualityModel, inputs: &'a RawInputs) -> Self {
        Self {
            model,
            inputs,
            cache: std::collections::BTreeMap::new(),
            in_progress: BTreeSet::new(),
        }
    }

    /// The reduced value of `id`, computed at most once per pass.
    pub fn measure_value(&mut self, id: &ElementId) -> MeasureValue {
        if let Some(cached) = self.cache.get(id) {
            return cached.clone();
        }
        if self.in_progress.contains(id) {
            // Aggregation cycle: treat the back-edge as absent data.
            warn!(measure = %id, "aggregation cycle, treating as no data");
            return MeasureValue::NoData;
        }
        self.in_progress.insert(id.clone());
        let value = self.compute(id);
        self.in_progress.remove(id);
        trace!(measure = %id, ?value, "aggregated measure");
        self.cache.insert(id.clone(), value.clone());
        value
    }

    /// Values of all measures in the model, in model order.
    pub fn all_values(&mut self) -> std::collections::BTreeMap<ElementId, MeasureValue> {
        let ids: Vec<ElementId> = self.model.measures().map(|m| m.id.clone()).collect();
        for id in &ids {
            self.measure_value(id);
        }
        self.cache.clone()
    }

    fn compute(&mut self, id: &ElementId) -> MeasureValue {
        let Some(measure) = self.model.measure(id) else {
            return MeasureValue::NoData;
        };
        if measure.measure_type == MeasureType::None {
            return MeasureValue::NoData;
        }

        let mut contributions: Vec<Contribution> = Vec::new();
        for raw in self.inputs.for_measure(id) {
            match &raw.value {
                RawValue::Findings(findings) => {
                    contributions.push(Contribution::Findings(findings.iter().cloned().collect()));
                }
                RawValue::Numbers(numbers) => {
                    contributions.push(Contribution::Numbers(numbers.clone()));
                }
            }
        }

        let aggregation = self.model.aggregation_for_measure(id);
        if let Some(aggregation) = aggregation {
            for sub in aggregation.aggregates.clone() {
                match self.measure_value(&sub) {
                    MeasureValue::Findings(set) => contributions.push(Contribution::Findings(set)),
                    MeasureValue::Number(n) => contributions.push(Contribution::Numbers(vec![n])),
                    MeasureValue::NoData => {}
                }
            }
        }

        let kind = aggregation.map(|a| a.kind).unwrap_or(match measure.measure_type {
            MeasureType::Findings => AggregationKind::FindingsUnion,
            _ => AggregationKind::NumberMean,
        });
        aggregate(kind, &contributions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn findings(locations: &[&str]) -> Contribution {
        Contribution::Findings(locations.iter().map(|l| Finding::new(*l)).collect())
    }

    #[test]
    fn test_intersection_keeps_common_findings() {
        let result = aggregate(
            AggregationKind::FindingsIntersection,
            &[findings(&["a", "b", "c"]), findings(&["b", "c", "d"])],
        );
        let MeasureValue::Findings(set) = result else {
            panic!("expected findings");
        };
        let locations: Vec<_> = set.iter().map(|f| f.location.as_str()).collect();
        assert_eq!(locations, ["b", "c"]);
    }

    #[test]
    fn test_union_merges_and_deduplicates() {
        let result = aggregate(
            AggregationKind::FindingsUnion,
            &[findings(&["a", "b"]), findings(&["b", "c"])],
        );
        let MeasureValue::Findings(set) = result else {
            panic!("expected findings");
        };
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_intersection_is_idempotent_and_subset_of_union() {
        let inputs = [findings(&["x", "y"]), findings(&["x", "y"])];
        let inter = aggregate(AggregationKind::FindingsIntersection, &inputs);
        let union = aggregate(AggregationKind::FindingsUnion, &inputs);
        let (MeasureValue::Findings(inter), MeasureValue::Findings(union)) = (inter, union) else {
            panic!("expected findings");
        };
        assert_eq!(inter, union);
        assert!(inter.is_subset(&union));
    }

    #[test]
    fn test_number_reductions() {
        let inputs = [Contribution::Numbers(vec![1.0, 2.0]), Contribution::Numbers(vec![3.0])];
        assert_eq!(aggregate(AggregationKind::NumberSum, &inputs), MeasureValue::Number(6.0));
        assert_eq!(aggregate(AggregationKind::NumberMean, &inputs), MeasureValue::Number(2.0));
        assert_eq!(aggregate(AggregationKind::NumberMin, &inputs), MeasureValue::Number(1.0));
        assert_eq!(aggregate(AggregationKind::NumberMax, &inputs), MeasureValue::Number(3.0));
        assert_eq!(aggregate(AggregationKind::NumberMedian, &inputs), MeasureValue::Number(2.0));
    }

    #[test]
    fn test_population_variance() {
        let inputs = [Contribution::Numbers(vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0])];
        // Known population variance of this classic sample is 4.
        assert_eq!(
            aggregate(AggregationKind::NumberVariance, &inputs),
            MeasureValue::Number(4.0)
        );
    }

    #[test]
    fn test_median_even_count_averages_middle_pair() {
        let inputs = [Contribution::Numbers(vec![4.0, 1.0, 3.0, 2.0])];
        assert_eq!(
            aggregate(AggregationKind::NumberMedian, &inputs),
            MeasureValue::Number(2.5)
        );
    }

    #[test]
    fn test_every_strategy_maps_empty_to_no_data() {
        for kind in AggregationKind::all() {
            assert_eq!(aggregate(kind, &[]), MeasureValue::NoData, "{kind:?}");
        }
    }

    #[test]
    fn test_every_strategy_is_order_independent() {
        let findings_inputs = [findings(&["a", "b"]), findings(&["b", "c"]), findings(&["b"])];
        let number_inputs = [
            Contribution::Numbers(vec![0.5, 2.5]),
            Contribution::Numbers(vec![1.5]),
            Contribution::Numbers(vec![4.0, 0.0]),
        ];
        for kind in AggregationKind::all() {
            let inputs: &[Contribution] = if kind.input_kind() == MeasureType::Findings {
                &findings_inputs
            } else {
                &number_inputs
            };
            let forward = aggregate(kind, inputs);
            let mut reversed = inputs.to_vec();
            reversed.reverse();
            assert_eq!(forward, aggregate(kind, &reversed), "{kind:?}");
        }
    }
}
