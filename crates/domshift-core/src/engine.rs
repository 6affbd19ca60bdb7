#![forbid(unsafe_code)]

//! The breakpoint relocation engine.
//!
//! [`Relocator`] owns immutable plan storage and a single mutable cursor, the
//! last applied threshold. Construction validates every spec, pre-flights
//! every plan, then runs one initialization pass that puts each source at its
//! default placement. After that, [`Relocator::apply_width`] moves sources
//! only when the resolved threshold changes.
//!
//! [`ObservedRelocator`] binds a relocator to its tree and to the
//! subscription feeding it observations, and gives the pair an explicit
//! disposal path.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::apply::{Insertion, insert_sources, preflight, relocate, remove_sources};
use crate::error::RelocateError;
use crate::observe::{SizeSubscription, WidthObservation};
use crate::plan::{CoveragePolicy, Placement, PlacementPlan, PlanSet};
use crate::raw::{RawValue, validate_raw_specs};
use crate::spec::{RelocationSpec, ValidatedSpec, validate_specs};
use crate::threshold::{Threshold, Thresholds};
use crate::tree::ElementTree;

/// Construction options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelocatorOptions {
    pub coverage: CoveragePolicy,
}

impl RelocatorOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            coverage: CoveragePolicy::Retain,
        }
    }

    #[must_use]
    pub const fn coverage(mut self, coverage: CoveragePolicy) -> Self {
        self.coverage = coverage;
        self
    }
}

/// A threshold change that was applied to the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Threshold,
    pub to: Threshold,
    /// Placements that landed; fewer than the plan size if writes failed.
    pub moved: usize,
}

/// Breakpoint-driven element relocation for one set of specs.
#[derive(Debug, Clone)]
pub struct Relocator<N> {
    plans: PlanSet<N>,
    active: Threshold,
    options: RelocatorOptions,
}

impl<N: Clone + PartialEq + std::fmt::Debug> Relocator<N> {
    /// Validate `specs`, build plans and apply the default placement.
    ///
    /// On error the tree is left exactly as it was.
    pub fn new<T: ElementTree<Node = N>>(
        tree: &mut T,
        specs: Vec<RelocationSpec<N>>,
        options: RelocatorOptions,
    ) -> Result<Self, RelocateError> {
        let validated = validate_specs(tree, specs)?;
        Self::from_validated(tree, validated, options)
    }

    /// [`new`](Self::new) from loosely-typed host records.
    ///
    /// Shape and tree checks interleave per record, so the first fault in
    /// walk order decides the error.
    pub fn from_raw<T: ElementTree<Node = N>>(
        tree: &mut T,
        raw: Vec<RawValue<N>>,
        options: RelocatorOptions,
    ) -> Result<Self, RelocateError> {
        let validated = validate_raw_specs(tree, raw)?;
        Self::from_validated(tree, validated, options)
    }

    fn from_validated<T: ElementTree<Node = N>>(
        tree: &mut T,
        validated: Vec<ValidatedSpec<N>>,
        options: RelocatorOptions,
    ) -> Result<Self, RelocateError> {
        let mut plans = PlanSet::assemble(&validated, options.coverage);
        preflight(tree, &plans)?;

        let default = plans.default_plan().clone();
        remove_sources(tree, &default)?;
        insert_sources(tree, &default, Insertion::Checked)?;
        plans.set_default(snapshot(tree, &default));

        debug!(
            specs = validated.len(),
            thresholds = plans.thresholds().len(),
            coverage = ?options.coverage,
            "relocator ready"
        );
        Ok(Self {
            plans,
            active: Threshold::Default,
            options,
        })
    }

    /// Threshold whose plan was applied last.
    #[must_use]
    pub const fn active(&self) -> Threshold {
        self.active
    }

    #[must_use]
    pub const fn options(&self) -> RelocatorOptions {
        self.options
    }

    #[must_use]
    pub const fn thresholds(&self) -> &Thresholds {
        self.plans.thresholds()
    }

    #[must_use]
    pub const fn plans(&self) -> &PlanSet<N> {
        &self.plans
    }

    #[must_use]
    pub fn plan(&self, threshold: Threshold) -> Option<&PlacementPlan<N>> {
        self.plans.get(threshold)
    }

    /// Resolve without mutating anything.
    #[must_use]
    pub fn resolve(&self, width: f64) -> Threshold {
        self.plans.thresholds().resolve(width)
    }

    /// Apply the plan for `width` if its threshold differs from the active one.
    pub fn apply_width<T: ElementTree<Node = N>>(
        &mut self,
        tree: &mut T,
        width: f64,
    ) -> Option<Transition> {
        let next = self.resolve(width);
        if next == self.active {
            return None;
        }
        let plan = self.plans.get(next)?;
        let moved = relocate(tree, plan);
        let transition = Transition {
            from: self.active,
            to: next,
            moved,
        };
        self.active = next;
        debug!(from = %transition.from, to = %transition.to, moved, width, "relocated");
        Some(transition)
    }

    /// [`apply_width`](Self::apply_width) with scrollbar compensation.
    pub fn observe<T: ElementTree<Node = N>>(
        &mut self,
        tree: &mut T,
        observation: WidthObservation,
    ) -> Option<Transition> {
        self.apply_width(tree, observation.effective_width())
    }
}

/// Live placement of every source in `plan`, position-sorted.
fn snapshot<T: ElementTree>(tree: &T, plan: &PlacementPlan<T::Node>) -> PlacementPlan<T::Node> {
    let placements = plan
        .iter()
        .map(|placement| {
            let target = tree
                .parent(&placement.source)
                .unwrap_or_else(|| placement.target.clone());
            let position = tree
                .index_in_parent(&placement.source)
                .unwrap_or(placement.position);
            Placement {
                source: placement.source.clone(),
                target,
                position,
            }
        })
        .collect();
    PlacementPlan::new(placements)
}

/// A relocator bound to its tree and observation subscription.
pub struct ObservedRelocator<T: ElementTree, S: SizeSubscription> {
    tree: T,
    relocator: Relocator<T::Node>,
    subscription: Option<S>,
}

impl<T: ElementTree, S: SizeSubscription> ObservedRelocator<T, S> {
    pub fn new(tree: T, relocator: Relocator<T::Node>, subscription: S) -> Self {
        Self {
            tree,
            relocator,
            subscription: Some(subscription),
        }
    }

    /// Handle one observation; ignored after [`dispose`](Self::dispose).
    pub fn deliver(&mut self, observation: WidthObservation) -> Option<Transition> {
        self.subscription.as_ref()?;
        self.relocator.observe(&mut self.tree, observation)
    }

    /// Release the subscription. Later calls are no-ops.
    pub fn dispose(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.unsubscribe();
            debug!(active = %self.relocator.active(), "relocator disposed");
        }
    }

    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.subscription.is_none()
    }

    #[must_use]
    pub const fn relocator(&self) -> &Relocator<T::Node> {
        &self.relocator
    }

    #[must_use]
    pub const fn tree(&self) -> &T {
        &self.tree
    }

    /// Mutable tree access for host code outside the managed elements.
    pub fn tree_mut(&mut self) -> &mut T {
        &mut self.tree
    }
}

impl<T: ElementTree, S: SizeSubscription> Drop for ObservedRelocator<T, S> {
    fn drop(&mut self) {
        self.dispose();
    }
}
