//! Propagation engine: folds impact influences into composite factor scores.
//!
//! The impact graph is condensed into strongly connected components
//! (iterative Tarjan) and evaluated in topological component order, so a
//! factor's composite is computed only after every origin feeding it.
//! Cyclic components are resolved per [`CyclePolicy`]: bounded Gauss-Seidel
//! fixed-point iteration (default) or outright rejection.
//!
//! # Combination policy
//!
//! ```text
//! composite = clamp(base + sum over incoming impacts of
//!                   sign(effect) * origin_score * (6 - severity) / 5,
//!                   0, 1)
//! ```
//!
//! Severity 1 (most severe) weighs 1.0, severity 5 weighs 0.2. Impacts
//! whose origin has no data contribute nothing. A factor with no measured
//! base but at least one data-bearing impact starts from the configured
//! neutral prior; a factor with neither stays `NoData`.
//!
//! Mutually unreachable subgraphs are scored in parallel, synchronizing
//! only at the per-pass memoization cache, which admits one result per
//! factor.

use std::collections::{BTreeMap, BTreeSet};

use parking_lot::Mutex;
use rayon::prelude::*;
use tracing::{debug, trace};

use quality_graph_core::model::QualityModel;
use quality_graph_core::types::{ElementId, InfluenceEffect, Severity};

use crate::config::{CyclePolicy, EvalConfig};
use crate::error::{EvalError, EvalResult};
use crate::inputs::Score;

/// Weight of an impact by severity: monotonically decreasing from 1.0 at
/// severity 1 to 0.2 at severity 5.
#[inline]
pub fn severity_weight(severity: Severity) -> f64 {
    f64::from(6 - severity.value()) / 5.0
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    origin: usize,
    effect: InfluenceEffect,
    severity: Severity,
}

/// Computes composite scores for every factor in the model.
///
/// `base_scores` holds each factor's measured base (or `NoData`), keyed by
/// factor id; the result maps every factor to its composite.
pub fn propagate(
    model: &QualityModel,
    config: &EvalConfig,
    base_scores: &BTreeMap<ElementId, Score>,
) -> EvalResult<BTreeMap<ElementId, Score>> {
    let ids: Vec<ElementId> = model.factors().map(|f| f.id.clone()).collect();
    let index: BTreeMap<&ElementId, usize> =
        ids.iter().enumerate().map(|(i, id)| (id, i)).collect();

    let base: Vec<Score> = ids
        .iter()
        .map(|id| base_scores.get(id).copied().unwrap_or(Score::NoData))
        .collect();

    // Eligible impacts only: target and origin resolved, justification
    // present. Everything else is inert by contract.
    let mut incoming: Vec<Vec<Edge>> = vec![Vec::new(); ids.len()];
    let mut undirected: Vec<Vec<usize>> = vec![Vec::new(); ids.len()];
    for impact in model.impacts() {
        let (Some(target), Some(origin)) = (&impact.target, &impact.origin) else {
            continue;
        };
        if impact.justification.as_deref().map_or(true, str::is_empty) {
            continue;
        }
        let (Some(&t), Some(&o)) = (index.get(target), index.get(origin)) else {
            continue;
        };
        incoming[t].push(Edge {
            origin: o,
            effect: impact.effect,
            severity: impact.severity(),
        });
        undirected[t].push(o);
        undirected[o].push(t);
    }

    let engine = Engine {
        ids: &ids,
        base: &base,
        incoming: &incoming,
        config,
    };

    let components = weakly_connected(&undirected);
    debug!(
        factors = ids.len(),
        subgraphs = components.len(),
        "propagating scores"
    );

    // Per-pass memoization cache: one entry per factor, written exactly
    // once. Independent subgraphs synchronize only here.
    let cache: Mutex<BTreeMap<ElementId, Score>> = Mutex::new(BTreeMap::new());
    components
        .par_iter()
        .try_for_each(|members| engine.score_subgraph(members, &cache))?;
    Ok(cache.into_inner())
}

struct Engine<'a> {
    ids: &'a [ElementId],
    base: &'a [Score],
    incoming: &'a [Vec<Edge>],
    config: &'a EvalConfig,
}

impl Engine<'_> {
    /// Scores one weakly connected subgraph, writing each factor's
    /// composite into the shared cache at most once.
    fn score_subgraph(
        &self,
        members: &[usize],
        cache: &Mutex<BTreeMap<ElementId, Score>>,
    ) -> EvalResult<()> {
        let mut resolved: BTreeMap<usize, Score> = BTreeMap::new();
        // Tarjan emits components successors-first; reversing yields a
        // topological order in which origins precede their targets.
        let sccs = tarjan_sccs(members, self.incoming);
        for component in sccs.iter().rev() {
            let cyclic = component.len() > 1 || self.has_self_loop(component[0]);
            if cyclic {
                self.resolve_cycle(component, &mut resolved)?;
            } else {
                let node = component[0];
                let score = self.composite(node, |origin| resolved_score(&resolved, origin));
                trace!(factor = %self.ids[node], ?score, "scored factor");
                resolved.insert(node, score);
            }
        }

        let mut cache = cache.lock();
        for (node, score) in resolved {
            cache.entry(self.ids[node].clone()).or_insert(score);
        }
        Ok(())
    }

    fn has_self_loop(&self, node: usize) -> bool {
        self.incoming[node].iter().any(|e| e.origin == node)
    }

    /// One factor's composite given a lookup for origin scores.
    fn composite(&self, target: usize, score_of: impl Fn(usize) -> Score) -> Score {
        let mut delta = 0.0;
        let mut any_data = false;
        for edge in &self.incoming[target] {
            if let Score::Utility(origin_score) = score_of(edge.origin) {
                any_data = true;
                delta += edge.effect.sign() * origin_score * severity_weight(edge.severity);
            }
        }
        let start = match self.base[target] {
            Score::Utility(u) => u,
            Score::NoData if any_data => self.config.neutral_prior,
            Score::NoData => return Score::NoData,
        };
        Score::Utility((start + delta).clamp(0.0, 1.0))
    }

    /// Resolves a cyclic component per the configured policy.
    ///
    /// A component where no member has a measured base and no external
    /// origin carries data resolves to `NoData` for every member, matching
    /// what the same shape would yield acyclically.
    fn resolve_cycle(
        &self,
        component: &[usize],
        resolved: &mut BTreeMap<usize, Score>,
    ) -> EvalResult<()> {
        let factors: Vec<ElementId> = component.iter().map(|&n| self.ids[n].clone()).collect();
        if self.config.cycle_policy == CyclePolicy::Reject {
            return Err(EvalError::Cycle { factors });
        }

        let members: BTreeSet<usize> = component.iter().copied().collect();
        let any_data = component.iter().any(|&node| {
            self.base[node].utility().is_some()
                || self.incoming[node].iter().any(|edge| {
                    !members.contains(&edge.origin)
                        && resolved_score(resolved, edge.origin).utility().is_some()
                })
        });
        if !any_data {
            trace!(?factors, "cycle carries no data");
            for &node in component {
                resolved.insert(node, Score::NoData);
            }
            return Ok(());
        }

        debug!(?factors, "resolving cyclic component by fixed point");
        let mut current: BTreeMap<usize, f64> = component
            .iter()
            .map(|&n| {
                let start = self.base[n].utility().unwrap_or(self.config.neutral_prior);
                (n, start)
            })
            .collect();

        for iteration in 0..self.config.max_iterations {
            let mut max_delta: f64 = 0.0;
            for &node in component {
                let score = self.composite(node, |origin| match current.get(&origin) {
                    Some(&u) => Score::Utility(u),
                    None => resolved_score(resolved, origin),
                });
                // Inside a cycle every member has at least one data-bearing
                // origin, so the composite is always a utility.
                let new = score.utility().unwrap_or(self.config.neutral_prior);
                if let Some(slot) = current.get_mut(&node) {
                    max_delta = max_delta.max((new - *slot).abs());
                    *slot = new;
                }
            }
            if max_delta < self.config.epsilon {
                trace!(?factors, iteration, "cycle converged");
                for (&node, &utility) in &current {
                    resolved.insert(node, Score::Utility(utility));
                }
                return Ok(());
            }
        }

        Err(EvalError::NonConvergence {
            factors,
            iterations: self.config.max_iterations,
        })
    }
}

fn resolved_score(resolved: &BTreeMap<usize, Score>, node: usize) -> Score {
    resolved.get(&node).copied().unwrap_or(Score::NoData)
}

/// Weakly connected components over the undirected impact adjacency,
/// ordered by smallest member for determinism.
fn weakly_connected(undirected: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let n = undirected.len();
    let mut seen = vec![false; n];
    let mut components = Vec::new();
    for start in 0..n {
        if seen[start] {
            continue;
        }
        let mut members = Vec::new();
        let mut stack = vec![start];
        seen[start] = true;
        while let Some(node) = stack.pop() {
            members.push(node);
            for &next in &undirected[node] {
                if !seen[next] {
                    seen[next] = true;
                    stack.push(next);
                }
            }
        }
        members.sort_unstable();
        components.push(members);
    }
    components
}

/// Iterative Tarjan over the subgraph induced by `members`. The incoming
/// edge lists are transposed into outgoing adjacency first, so traversal
/// follows origin -> target and components come out successors-first.
fn tarjan_sccs(members: &[usize], incoming: &[Vec<Edge>]) -> Vec<Vec<usize>> {
    // Outgoing adjacency restricted to the subgraph.
    let mut outgoing: BTreeMap<usize, Vec<usize>> =
        members.iter().map(|&m| (m, Vec::new())).collect();
    for &target in members {
        for edge in &incoming[target] {
            if let Some(out) = outgoing.get_mut(&edge.origin) {
                out.push(target);
            }
        }
    }

    let mut index: BTreeMap<usize, usize> = BTreeMap::new();
    let mut lowlink: BTreeMap<usize, usize> = BTreeMap::new();
    let mut on_stack: BTreeMap<usize, bool> = BTreeMap::new();
    let mut stack: Vec<usize> = Vec::new();
    let mut next_index = 0usize;
    let mut components: Vec<Vec<usize>> = Vec::new();

    for &root in members {
        if index.contains_key(&root) {
            continue;
        }
        // Explicit DFS frames: (node, next child position).
        let mut frames: Vec<(usize, usize)> = vec![(root, 0)];
        while let Some(&(node, child_pos)) = frames.last() {
            if child_pos == 0 && !index.contains_key(&node) {
                index.insert(node, next_index);
                lowlink.insert(node, next_index);
                next_index += 1;
                stack.push(node);
                on_stack.insert(node, true);
            }
            let children = outgoing.get(&node).map(Vec::as_slice).unwrap_or(&[]);
            if child_pos < children.len() {
                let child = children[child_pos];
                if let Some(frame) = frames.last_mut() {
                    frame.1 += 1;
                }
                if !index.contains_key(&child) {
                    frames.push((child, 0));
                } else if on_stack.get(&child).copied().unwrap_or(false) {
                    let child_index = index.get(&child).copied().unwrap_or(usize::MAX);
                    if let Some(low) = lowlink.get_mut(&node) {
                        *low = (*low).min(child_index);
                    }
                }
            } else {
                frames.pop();
                let node_low = lowlink.get(&node).copied().unwrap_or(usize::MAX);
                if let Some(&(parent, _)) = frames.last() {
                    if let Some(parent_low) = lowlink.get_mut(&parent) {
                        *parent_low = (*parent_low).min(node_low);
                    }
                }
                if Some(node_low) == index.get(&node).copied() {
                    let mut component = Vec::new();
                    while let Some(popped) = stack.pop() {
                        on_stack.insert(popped, false);
                        component.push(popped);
                        if popped == node {
                            break;
                        }
                    }
                    component.sort_unstable();
                    components.push(component);
                }
            }
        }
    }
    components
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_weight_is_monotonically_decreasing() {
        let weights: Vec<f64> = (1..=5)
            .filter_map(Severity::new)
            .map(severity_weight)
            .collect();
        assert_eq!(weights[0], 1.0);
        assert_eq!(weights[4], 0.2);
        for pair in weights.windows(2) {
            assert!(pair[0] > pair[1]);
        }
    }

    #[test]
    fn test_tarjan_separates_acyclic_chain() {
        // 0 -> 1 -> 2 as incoming lists: incoming[1] = [0], incoming[2] = [1]
        let incoming = vec![
            vec![],
            vec![edge(0)],
            vec![edge(1)],
        ];
        let sccs = tarjan_sccs(&[0, 1, 2], &incoming);
        assert_eq!(sccs.len(), 3);
        // Successors-first: reversed order must put 0 before 1 before 2.
        let reversed: Vec<usize> = sccs.iter().rev().map(|c| c[0]).collect();
        assert_eq!(reversed, vec![0, 1, 2]);
    }

    #[test]
    fn test_tarjan_groups_two_cycle() {
        let incoming = vec![vec![edge(1)], vec![edge(0)], vec![edge(1)]];
        let sccs = tarjan_sccs(&[0, 1, 2], &incoming);
        assert!(sccs.iter().any(|c| c == &[0, 1]));
        assert!(sccs.iter().any(|c| c == &[2]));
    }

    #[test]
    fn test_weakly_connected_splits_islands() {
        let undirected = vec![vec![1], vec![0], vec![], vec![4], vec![3]];
        let components = weakly_connected(&undirected);
        assert_eq!(components, vec![vec![0, 1], vec![2], vec![3, 4]]);
    }

    fn edge(origin: usize) -> Edge {
        Edge {
            origin,
            effect: InfluenceEffect::Positive,
            severity: Severity::MOST_SEVERE,
        }
    }
}
