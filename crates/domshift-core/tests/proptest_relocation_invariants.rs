#![forbid(unsafe_code)]

//! Property-based invariants for threshold resolution and relocation.
//!
//! 1. **Monotonic resolution**: `w1 <= w2` implies `resolve(w1) <= resolve(w2)`,
//!    and `Default` is only returned above every numeric threshold.
//! 2. **Smallest covering threshold**: the resolved threshold is the smallest
//!    one `>= width`.
//! 3. **Plans are position-sorted**, and every plan lists each source once.
//! 4. **Round-trip**: any walk over widths that ends in a given zone leaves
//!    every source at the placement observed the first time that zone was
//!    entered.

use std::collections::HashMap;

use domshift_core::{
    ArenaTree, CoveragePolicy, NodeId, PlacementRule, Px, RelocationSpec, Relocator,
    RelocatorOptions, Threshold, Thresholds,
};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

fn threshold_values() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1u32..4000, 1..8).prop_map(|v| v.into_iter().map(f64::from).collect())
}

fn widths() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..5000.0, 1..24)
}

fn coverage() -> impl Strategy<Value = CoveragePolicy> {
    prop_oneof![
        Just(CoveragePolicy::Retain),
        Just(CoveragePolicy::Inherit),
        Just(CoveragePolicy::Fallback),
    ]
}

/// Per-source rule seeds: `(threshold index, target index, position)`.
fn rule_seeds() -> impl Strategy<Value = Vec<Vec<(usize, usize, usize)>>> {
    prop::collection::vec(
        prop::collection::vec((0usize..4, 0usize..3, 0usize..2), 1..4),
        1..4,
    )
}

// ── Fixture ─────────────────────────────────────────────────────────────

const BREAKPOINTS: [f64; 4] = [320.0, 640.0, 960.0, 1280.0];

/// Four sources, each alone in its own home, and three containers with two
/// fixed children each.
fn fixture() -> (ArenaTree, Vec<NodeId>, Vec<NodeId>) {
    let mut tree = ArenaTree::new("html");
    let body = tree.element(tree.root(), "body");
    let main = tree.element(body, "main");
    let sources = (0..4)
        .map(|_| {
            let home = tree.element(main, "article");
            tree.element(home, "section")
        })
        .collect();
    let targets = (0..3)
        .map(|_| {
            let target = tree.element(body, "div");
            tree.element(target, "span");
            tree.element(target, "span");
            target
        })
        .collect();
    (tree, sources, targets)
}

fn build_specs(
    sources: &[NodeId],
    targets: &[NodeId],
    seeds: &[Vec<(usize, usize, usize)>],
) -> Vec<RelocationSpec<NodeId>> {
    seeds
        .iter()
        .zip(sources)
        .map(|(rules, &source)| {
            let mut used = Vec::new();
            let mut spec = RelocationSpec::new(source);
            for &(bp, target, position) in rules {
                if used.contains(&bp) {
                    continue;
                }
                used.push(bp);
                spec = spec.at(
                    BREAKPOINTS[bp],
                    PlacementRule::new(targets[target]).at_position(position),
                );
            }
            spec
        })
        .collect()
}

fn placements(tree: &ArenaTree, sources: &[NodeId]) -> Vec<Option<(NodeId, usize)>> {
    sources.iter().map(|&s| tree.location(s)).collect()
}

// ── Resolution ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn resolution_is_monotonic(values in threshold_values(), mut ws in widths()) {
        let thresholds = Thresholds::new(values.iter().map(|&v| Px::new(v).unwrap()));
        ws.sort_by(f64::total_cmp);
        let resolved: Vec<Threshold> = ws.iter().map(|&w| thresholds.resolve(w)).collect();
        for pair in resolved.windows(2) {
            prop_assert!(pair[0] <= pair[1], "{:?} > {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn resolution_picks_smallest_covering(values in threshold_values(), w in 0.0f64..5000.0) {
        let thresholds = Thresholds::new(values.iter().map(|&v| Px::new(v).unwrap()));
        let expected = values
            .iter()
            .copied()
            .filter(|&v| v >= w)
            .min_by(f64::total_cmp)
            .map_or(Threshold::Default, |v| Threshold::Width(Px::new(v).unwrap()));
        prop_assert_eq!(thresholds.resolve(w), expected);
    }

    #[test]
    fn exact_threshold_resolves_to_itself(values in threshold_values()) {
        let thresholds = Thresholds::new(values.iter().map(|&v| Px::new(v).unwrap()));
        for &px in thresholds.as_slice() {
            prop_assert_eq!(thresholds.resolve(px.get()), Threshold::Width(px));
        }
    }
}

// ── Plans and relocation ────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn plans_are_position_sorted(seeds in rule_seeds(), policy in coverage()) {
        let (mut tree, sources, targets) = fixture();
        let specs = build_specs(&sources, &targets, &seeds);
        let options = RelocatorOptions::new().coverage(policy);
        let relocator = Relocator::new(&mut tree, specs, options).unwrap();

        for (_, plan) in relocator.plans().iter() {
            let positions: Vec<usize> = plan.iter().map(|p| p.position).collect();
            prop_assert!(positions.windows(2).all(|w| w[0] <= w[1]), "{positions:?}");
            let mut seen: Vec<NodeId> = plan.iter().map(|p| p.source).collect();
            seen.sort();
            seen.dedup();
            prop_assert_eq!(seen.len(), plan.len());
        }
        prop_assert_eq!(relocator.plans().default_plan().len(), seeds.len());
    }

    #[test]
    fn zones_round_trip(seeds in rule_seeds(), policy in coverage(), walk in widths()) {
        prop_assume!(policy != CoveragePolicy::Retain);
        let (mut tree, sources, targets) = fixture();
        let specs = build_specs(&sources, &targets, &seeds);
        let options = RelocatorOptions::new().coverage(policy);
        let mut relocator = Relocator::new(&mut tree, specs, options).unwrap();

        let mut zones: HashMap<Threshold, Vec<Option<(NodeId, usize)>>> = HashMap::new();
        zones.insert(Threshold::Default, placements(&tree, &sources));
        for w in walk {
            relocator.apply_width(&mut tree, w);
            let now = placements(&tree, &sources);
            let first = zones.entry(relocator.active()).or_insert_with(|| now.clone()).clone();
            prop_assert_eq!(&now, &first, "zone {} after width {}", relocator.active(), w);
        }
    }
}
