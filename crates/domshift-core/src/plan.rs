#![forbid(unsafe_code)]

//! Placement plans: one ordered list of placements per threshold.
//!
//! # Invariants
//!
//! 1. Every plan is sorted by ascending position; ties keep spec order.
//! 2. A [`PlanSet`] holds a plan for every numeric threshold and for
//!    `Threshold::Default`.
//! 3. The default plan holds exactly one placement per source.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::spec::{PlacementRule, ValidatedSpec};
use crate::threshold::{Px, Threshold, Thresholds};

/// How a spec contributes to thresholds it has no explicit rule for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoveragePolicy {
    /// No placement; the element stays where the last relocation put it.
    #[default]
    Retain,
    /// Reuse the rule of the nearest lower threshold the spec defines, else
    /// its default rule.
    Inherit,
    /// Use the spec's default rule.
    Fallback,
}

/// A resolved `(source, target, position)` triple.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement<N> {
    pub source: N,
    pub target: N,
    pub position: usize,
}

impl<N: Clone> Placement<N> {
    fn from_rule(source: &N, rule: &PlacementRule<N>) -> Self {
        Self {
            source: source.clone(),
            target: rule.target.clone(),
            position: rule.position,
        }
    }
}

/// Placements applied together when one threshold becomes active.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementPlan<N> {
    placements: Vec<Placement<N>>,
}

impl<N> Default for PlacementPlan<N> {
    fn default() -> Self {
        Self {
            placements: Vec::new(),
        }
    }
}

impl<N> PlacementPlan<N> {
    /// Build a plan, sorting by position.
    pub fn new(mut placements: Vec<Placement<N>>) -> Self {
        placements.sort_by_key(|p| p.position);
        Self { placements }
    }

    #[must_use]
    pub fn placements(&self) -> &[Placement<N>] {
        &self.placements
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Placement<N>> {
        self.placements.iter()
    }
}

impl<'a, N> IntoIterator for &'a PlacementPlan<N> {
    type Item = &'a Placement<N>;
    type IntoIter = std::slice::Iter<'a, Placement<N>>;

    fn into_iter(self) -> Self::IntoIter {
        self.placements.iter()
    }
}

/// Immutable plan storage keyed by threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanSet<N> {
    thresholds: Thresholds,
    widths: BTreeMap<Px, PlacementPlan<N>>,
    default: PlacementPlan<N>,
}

impl<N: Clone> PlanSet<N> {
    /// Assemble plans for the union of all spec thresholds plus default.
    pub fn assemble(specs: &[ValidatedSpec<N>], coverage: CoveragePolicy) -> Self {
        let thresholds = Thresholds::new(specs.iter().flat_map(ValidatedSpec::widths));
        let plan_for = |threshold: Threshold| {
            let placements = specs
                .iter()
                .filter_map(|spec| {
                    covering_rule(spec, threshold, coverage)
                        .map(|rule| Placement::from_rule(&spec.source, rule))
                })
                .collect();
            PlacementPlan::new(placements)
        };
        let widths = thresholds
            .as_slice()
            .iter()
            .map(|&px| (px, plan_for(Threshold::Width(px))))
            .collect();
        let default = plan_for(Threshold::Default);
        Self {
            thresholds,
            widths,
            default,
        }
    }

    /// Replace the default plan (after the initialization pass refreshed it).
    pub(crate) fn set_default(&mut self, plan: PlacementPlan<N>) {
        self.default = plan;
    }
}

impl<N> PlanSet<N> {
    #[must_use]
    pub const fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    #[must_use]
    pub fn get(&self, threshold: Threshold) -> Option<&PlacementPlan<N>> {
        match threshold {
            Threshold::Width(px) => self.widths.get(&px),
            Threshold::Default => Some(&self.default),
        }
    }

    #[must_use]
    pub const fn default_plan(&self) -> &PlacementPlan<N> {
        &self.default
    }

    /// Plans in application order: numeric ascending, then default.
    pub fn iter(&self) -> impl Iterator<Item = (Threshold, &PlacementPlan<N>)> {
        self.widths
            .iter()
            .map(|(px, plan)| (Threshold::Width(*px), plan))
            .chain(std::iter::once((Threshold::Default, &self.default)))
    }

    /// Number of plans, default included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.widths.len() + 1
    }
}

fn covering_rule<N>(
    spec: &ValidatedSpec<N>,
    threshold: Threshold,
    coverage: CoveragePolicy,
) -> Option<&PlacementRule<N>> {
    if let Some(rule) = spec.rules.get(&threshold) {
        return Some(rule);
    }
    match coverage {
        CoveragePolicy::Retain => None,
        CoveragePolicy::Fallback => spec.default_rule(),
        CoveragePolicy::Inherit => spec
            .rules
            .range(..threshold)
            .next_back()
            .map(|(_, rule)| rule)
            .or_else(|| spec.default_rule()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(v: f64) -> Px {
        Px::new(v).unwrap()
    }

    fn spec(source: u32, rules: &[(Threshold, u32, usize)]) -> ValidatedSpec<u32> {
        ValidatedSpec {
            source,
            rules: rules
                .iter()
                .map(|&(t, target, position)| (t, PlacementRule::new(target).at_position(position)))
                .collect(),
        }
    }

    fn sources(plan: &PlacementPlan<u32>) -> Vec<u32> {
        plan.iter().map(|p| p.source).collect()
    }

    /// Source 1 defines 500 and 900, source 2 only 900, source 3 only 500.
    fn specs() -> Vec<ValidatedSpec<u32>> {
        vec![
            spec(
                1,
                &[
                    (px(500.0).into(), 10, 2),
                    (px(900.0).into(), 11, 0),
                    (Threshold::Default, 20, 0),
                ],
            ),
            spec(
                2,
                &[(px(900.0).into(), 11, 1), (Threshold::Default, 20, 1)],
            ),
            spec(
                3,
                &[(px(500.0).into(), 10, 0), (Threshold::Default, 21, 0)],
            ),
        ]
    }

    #[test]
    fn plans_sorted_by_position() {
        let set = PlanSet::assemble(&specs(), CoveragePolicy::Retain);
        let at_500 = set.get(px(500.0).into()).unwrap();
        assert_eq!(sources(at_500), vec![3, 1]);
        assert_eq!(
            at_500.placements()[1],
            Placement {
                source: 1,
                target: 10,
                position: 2
            }
        );
    }

    #[test]
    fn ties_keep_spec_order() {
        let set = PlanSet::assemble(&specs(), CoveragePolicy::Retain);
        // Sources 1 and 3 both sit at position 0 by default.
        assert_eq!(sources(set.default_plan()), vec![1, 3, 2]);
    }

    #[test]
    fn one_plan_per_threshold_plus_default() {
        let set = PlanSet::assemble(&specs(), CoveragePolicy::Retain);
        let keys: Vec<Threshold> = set.iter().map(|(t, _)| t).collect();
        assert_eq!(
            keys,
            vec![px(500.0).into(), px(900.0).into(), Threshold::Default]
        );
        assert_eq!(set.len(), 3);
        assert!(set.get(px(700.0).into()).is_none());
    }

    #[test]
    fn retain_omits_uncovered_specs() {
        let set = PlanSet::assemble(&specs(), CoveragePolicy::Retain);
        assert_eq!(sources(set.get(px(500.0).into()).unwrap()), vec![3, 1]);
        assert_eq!(sources(set.get(px(900.0).into()).unwrap()), vec![1, 2]);
    }

    #[test]
    fn fallback_uses_default_rule() {
        let set = PlanSet::assemble(&specs(), CoveragePolicy::Fallback);
        let at_500 = set.get(px(500.0).into()).unwrap();
        assert_eq!(at_500.len(), 3);
        let two = at_500.iter().find(|p| p.source == 2).unwrap();
        assert_eq!((two.target, two.position), (20, 1));
    }

    #[test]
    fn inherit_uses_nearest_lower_rule() {
        let set = PlanSet::assemble(&specs(), CoveragePolicy::Inherit);
        let at_900 = set.get(px(900.0).into()).unwrap();
        let three = at_900.iter().find(|p| p.source == 3).unwrap();
        assert_eq!((three.target, three.position), (10, 0));
        // Nothing lower than 500 for source 2: default rule.
        let at_500 = set.get(px(500.0).into()).unwrap();
        let two = at_500.iter().find(|p| p.source == 2).unwrap();
        assert_eq!((two.target, two.position), (20, 1));
    }

    #[test]
    fn coverage_policy_serde_names() {
        let policy: CoveragePolicy = serde_json::from_str("\"inherit\"").unwrap();
        assert_eq!(policy, CoveragePolicy::Inherit);
        assert_eq!(
            serde_json::to_string(&CoveragePolicy::Fallback).unwrap(),
            "\"fallback\""
        );
        assert_eq!(CoveragePolicy::default(), CoveragePolicy::Retain);
    }
}
