//! The quality model arena: exclusive owner of every entity in one model.
//!
//! Entities are stored by identifier in ordered maps, so model iteration
//! (and therefore evaluation, see `quality-graph-eval`) is deterministic.
//! Impacts and refinement edges store lookup keys, never owning references;
//! the logical graph may contain cycles while ownership stays acyclic.
//!
//! Insertion maintains bidirectional edge bookkeeping on both ends:
//! registering a refinement on A also registers A in the target's
//! `refined_by` set, a measure's `measures` edge fills the factor's
//! `measured_by` set, and an impact fills `incoming`/`outgoing` on its
//! target and origin. Forward references (edges naming an id inserted
//! later) are wired up when the referenced element arrives; edges that
//! never resolve are reported by validation, not repaired.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ModelError, ModelResult};
use crate::types::{
    ElementId, Entity, Factor, Impact, Measure, MeasureAggregation, Source, UtilityFunction,
};

/// Owner of all entities reachable from a quality model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityModel {
    /// Optional model name, for reporting only.
    pub name: Option<String>,
    factors: BTreeMap<ElementId, Factor>,
    measures: BTreeMap<ElementId, Measure>,
    entities: BTreeMap<ElementId, Entity>,
    sources: BTreeMap<ElementId, Source>,
    aggregations: BTreeMap<ElementId, MeasureAggregation>,
    functions: BTreeMap<ElementId, UtilityFunction>,
    impacts: BTreeMap<ElementId, Impact>,
}

impl QualityModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// True if any arena already holds this identifier.
    pub fn contains(&self, id: &ElementId) -> bool {
        self.factors.contains_key(id)
            || self.measures.contains_key(id)
            || self.entities.contains_key(id)
            || self.sources.contains_key(id)
            || self.aggregations.contains_key(id)
            || self.functions.contains_key(id)
            || self.impacts.contains_key(id)
    }

    fn check_fresh(&self, id: &ElementId) -> ModelResult<()> {
        if self.contains(id) {
            return Err(ModelError::DuplicateId(id.clone()));
        }
        Ok(())
    }

    // =====================================================================
    // Insertion
    // =====================================================================

    /// Inserts a factor, wiring refinement, measurement, and impact edges
    /// in both directions. Returns the factor's identifier.
    pub fn add_factor(&mut self, mut factor: Factor) -> ModelResult<ElementId> {
        self.check_fresh(&factor.id)?;
        let id = factor.id.clone();

        // Wire this factor's declared refinements into existing targets.
        // A self-refinement is left untouched for validation to flag.
        for target in factor.refines.clone() {
            if target == id {
                continue;
            }
            if let Some(existing) = self.factors.get_mut(&target) {
                existing.refined_by.insert(id.clone());
            }
        }

        // Resolve forward references from elements inserted earlier.
        for other in self.factors.values() {
            if other.refines.contains(&id) {
                factor.refined_by.insert(other.id.clone());
            }
        }
        for measure in self.measures.values() {
            if measure.measures.contains(&id) {
                factor.measured_by.insert(measure.id.clone());
            }
        }
        for impact in self.impacts.values() {
            if impact.target.as_ref() == Some(&id) {
                factor.incoming.insert(impact.id.clone());
            }
            if impact.origin.as_ref() == Some(&id) {
                factor.outgoing.insert(impact.id.clone());
            }
        }

        debug!(factor = %id, "added factor");
        self.factors.insert(id.clone(), factor);
        Ok(id)
    }

    /// Inserts a measure, registering it on every factor it quantifies.
    pub fn add_measure(&mut self, measure: Measure) -> ModelResult<ElementId> {
        self.check_fresh(&measure.id)?;
        let id = measure.id.clone();
        for factor_id in &measure.measures {
            if let Some(factor) = self.factors.get_mut(factor_id) {
                factor.measured_by.insert(id.clone());
            }
        }
        debug!(measure = %id, measure_type = ?measure.measure_type, "added measure");
        self.measures.insert(id.clone(), measure);
        Ok(id)
    }

    /// Inserts an impact, registering it on its target and origin factors
    /// when those are already present.
    pub fn add_impact(&mut self, impact: Impact) -> ModelResult<ElementId> {
        self.check_fresh(&impact.id)?;
        let id = impact.id.clone();
        if let Some(target) = impact.target.clone() {
            if let Some(factor) = self.factors.get_mut(&target) {
                factor.incoming.insert(id.clone());
            }
        }
        if let Some(origin) = impact.origin.clone() {
            if let Some(factor) = self.factors.get_mut(&origin) {
                factor.outgoing.insert(id.clone());
            }
        }
        debug!(impact = %id, "added impact");
        self.impacts.insert(id.clone(), impact);
        Ok(id)
    }

    pub fn add_entity(&mut self, entity: Entity) -> ModelResult<ElementId> {
        self.check_fresh(&entity.id)?;
        let id = entity.id.clone();
        self.entities.insert(id.clone(), entity);
        Ok(id)
    }

    pub fn add_source(&mut self, source: Source) -> ModelResult<ElementId> {
        self.check_fresh(&source.id)?;
        let id = source.id.clone();
        self.sources.insert(id.clone(), source);
        Ok(id)
    }

    pub fn add_aggregation(&mut self, aggregation: MeasureAggregation) -> ModelResult<ElementId> {
        self.check_fresh(&aggregation.id)?;
        let id = aggregation.id.clone();
        self.aggregations.insert(id.clone(), aggregation);
        Ok(id)
    }

    pub fn add_function(&mut self, function: UtilityFunction) -> ModelResult<ElementId> {
        self.check_fresh(&function.id)?;
        let id = function.id.clone();
        self.functions.insert(id.clone(), function);
        Ok(id)
    }

    // =====================================================================
    // Post-insertion edge mutation
    // =====================================================================

    /// Declares that `refiner` refines `target`, updating both ends.
    ///
    /// A self-refinement request is a no-op (and would be flagged by
    /// validation had it been declared at construction). Unknown ids fail
    /// without mutating either end.
    pub fn link_refines(&mut self, refiner: &ElementId, target: &ElementId) -> ModelResult<()> {
        if refiner == target {
            return Ok(());
        }
        if !self.factors.contains_key(refiner) {
            return Err(ModelError::UnknownElement(refiner.clone()));
        }
        if !self.factors.contains_key(target) {
            return Err(ModelError::UnknownElement(target.clone()));
        }
        if let Some(f) = self.factors.get_mut(refiner) {
            f.refines.insert(target.clone());
        }
        if let Some(t) = self.factors.get_mut(target) {
            t.refined_by.insert(refiner.clone());
        }
        Ok(())
    }

    /// Declares that `measure` quantifies `factor`, updating both ends.
    pub fn link_measures(&mut self, measure: &ElementId, factor: &ElementId) -> ModelResult<()> {
        if !self.measures.contains_key(measure) {
            return Err(ModelError::UnknownElement(measure.clone()));
        }
        if !self.factors.contains_key(factor) {
            return Err(ModelError::UnknownElement(factor.clone()));
        }
        if let Some(m) = self.measures.get_mut(measure) {
            m.measures.insert(factor.clone());
        }
        if let Some(f) = self.factors.get_mut(factor) {
            f.measured_by.insert(measure.clone());
        }
        Ok(())
    }

    // =====================================================================
    // Lookup
    // =====================================================================

    pub fn factor(&self, id: &ElementId) -> Option<&Factor> {
        self.factors.get(id)
    }

    pub fn measure(&self, id: &ElementId) -> Option<&Measure> {
        self.measures.get(id)
    }

    pub fn entity(&self, id: &ElementId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn source(&self, id: &ElementId) -> Option<&Source> {
        self.sources.get(id)
    }

    pub fn aggregation(&self, id: &ElementId) -> Option<&MeasureAggregation> {
        self.aggregations.get(id)
    }

    pub fn function(&self, id: &ElementId) -> Option<&UtilityFunction> {
        self.functions.get(id)
    }

    pub fn impact(&self, id: &ElementId) -> Option<&Impact> {
        self.impacts.get(id)
    }

    /// Mutable impact access, e.g. for the severity setter.
    pub fn impact_mut(&mut self, id: &ElementId) -> Option<&mut Impact> {
        self.impacts.get_mut(id)
    }

    pub fn factors(&self) -> impl Iterator<Item = &Factor> {
        self.factors.values()
    }

    pub fn measures(&self) -> impl Iterator<Item = &Measure> {
        self.measures.values()
    }

    pub fn sources(&self) -> impl Iterator<Item = &Source> {
        self.sources.values()
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn aggregations(&self) -> impl Iterator<Item = &MeasureAggregation> {
        self.aggregations.values()
    }

    pub fn functions(&self) -> impl Iterator<Item = &UtilityFunction> {
        self.functions.values()
    }

    pub fn impacts(&self) -> impl Iterator<Item = &Impact> {
        self.impacts.values()
    }

    /// The aggregation producing `measure`'s value, if one is declared.
    pub fn aggregation_for_measure(&self, measure: &ElementId) -> Option<&MeasureAggregation> {
        self.aggregations
            .values()
            .find(|agg| agg.output.as_ref() == Some(measure))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Factor, Impact, InfluenceEffect, Measure, MeasureType};

    fn factor(name: &str, id: &str) -> Factor {
        Factor::builder(name).identifier(id).create().unwrap()
    }

    #[test]
    fn test_duplicate_id_rejected_across_arenas() {
        let mut model = QualityModel::new();
        model.add_factor(factor("A", "shared")).unwrap();
        let measure = Measure::builder("M").identifier("shared").create().unwrap();
        assert!(matches!(
            model.add_measure(measure),
            Err(ModelError::DuplicateId(_))
        ));
        // Failed insertion leaves the model untouched.
        assert!(model.measure(&"shared".into()).is_none());
        assert!(model.factor(&"shared".into()).is_some());
    }

    #[test]
    fn test_refinement_bookkeeping_is_bidirectional() {
        let mut model = QualityModel::new();
        model.add_factor(factor("Parent", "parent")).unwrap();
        let child = Factor::builder("Child")
            .identifier("child")
            .refines("parent")
            .create()
            .unwrap();
        model.add_factor(child).unwrap();

        let parent = model.factor(&"parent".into()).unwrap();
        assert!(parent.refined_by.contains(&"child".into()));
    }

    #[test]
    fn test_forward_refinement_resolved_on_late_insertion() {
        let mut model = QualityModel::new();
        let child = Factor::builder("Child")
            .identifier("child")
            .refines("parent")
            .create()
            .unwrap();
        model.add_factor(child).unwrap();
        model.add_factor(factor("Parent", "parent")).unwrap();

        let parent = model.factor(&"parent".into()).unwrap();
        assert!(parent.refined_by.contains(&"child".into()));
    }

    #[test]
    fn test_measure_fills_measured_by() {
        let mut model = QualityModel::new();
        model.add_factor(factor("F", "f")).unwrap();
        let m = Measure::builder("M")
            .identifier("m")
            .measure_type(MeasureType::Number)
            .measures("f")
            .create()
            .unwrap();
        model.add_measure(m).unwrap();
        assert!(model
            .factor(&"f".into())
            .unwrap()
            .measured_by
            .contains(&"m".into()));
    }

    #[test]
    fn test_impact_fills_incoming_and_outgoing() {
        let mut model = QualityModel::new();
        model.add_factor(factor("A", "a")).unwrap();
        model.add_factor(factor("B", "b")).unwrap();
        let impact = Impact::builder()
            .identifier("i")
            .origin("a")
            .target("b")
            .effect(InfluenceEffect::Positive)
            .justification("a drives b")
            .create();
        model.add_impact(impact).unwrap();

        assert!(model.factor(&"a".into()).unwrap().outgoing.contains(&"i".into()));
        assert!(model.factor(&"b".into()).unwrap().incoming.contains(&"i".into()));
    }

    #[test]
    fn test_link_refines_rejects_unknown_without_mutation() {
        let mut model = QualityModel::new();
        model.add_factor(factor("A", "a")).unwrap();
        let err = model.link_refines(&"a".into(), &"ghost".into());
        assert!(matches!(err, Err(ModelError::UnknownElement(_))));
        assert!(model.factor(&"a".into()).unwrap().refines.is_empty());
    }

    #[test]
    fn test_link_refines_self_is_noop() {
        let mut model = QualityModel::new();
        model.add_factor(factor("A", "a")).unwrap();
        model.link_refines(&"a".into(), &"a".into()).unwrap();
        let a = model.factor(&"a".into()).unwrap();
        assert!(a.refines.is_empty());
        assert!(a.refined_by.is_empty());
    }

    #[test]
    fn test_aggregation_for_measure_lookup() {
        use crate::types::{AggregationKind, MeasureAggregation};
        let mut model = QualityModel::new();
        let agg = MeasureAggregation::builder(AggregationKind::NumberMean)
            .identifier("agg")
            .output("m")
            .aggregates("m1")
            .create()
            .unwrap();
        model.add_aggregation(agg).unwrap();
        assert!(model.aggregation_for_measure(&"m".into()).is_some());
        assert!(model.aggregation_for_measure(&"other".into()).is_none());
    }
}
