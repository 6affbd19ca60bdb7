#![forbid(unsafe_code)]

//! Relocation specs and their validation against a live tree.
//!
//! [`RelocationSpec`] is the typed caller input: one source element plus a
//! map from breakpoint width to [`PlacementRule`]. [`validate_specs`] checks
//! identity and range invariants against an [`ElementTree`] and synthesizes
//! each spec's default rule from the source's current location.

use std::collections::BTreeMap;

use crate::error::{ConfigError, MAX_SAFE_INTEGER, RangeError, RelocateError};
use crate::threshold::{Px, Threshold};
use crate::tree::ElementTree;

/// Where a source element goes while one breakpoint is active.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementRule<N> {
    pub target: N,
    /// Index among the target's element children. Defaults to 0.
    pub position: usize,
}

impl<N> PlacementRule<N> {
    pub const fn new(target: N) -> Self {
        Self {
            target,
            position: 0,
        }
    }

    #[must_use]
    pub fn at_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }
}

/// One source element and its per-breakpoint placements.
#[derive(Debug, Clone, PartialEq)]
pub struct RelocationSpec<N> {
    pub source: N,
    /// Breakpoint widths in declaration order. Validated on construction.
    pub breakpoints: Vec<(f64, PlacementRule<N>)>,
}

impl<N> RelocationSpec<N> {
    pub const fn new(source: N) -> Self {
        Self {
            source,
            breakpoints: Vec::new(),
        }
    }

    /// Add a rule active below `width` (builder pattern).
    #[must_use]
    pub fn at(mut self, width: f64, rule: PlacementRule<N>) -> Self {
        self.breakpoints.push((width, rule));
        self
    }
}

/// A spec whose rules passed validation, keyed by threshold.
///
/// Always holds a `Threshold::Default` rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSpec<N> {
    pub source: N,
    pub rules: BTreeMap<Threshold, PlacementRule<N>>,
}

impl<N> ValidatedSpec<N> {
    /// The synthesized default rule.
    #[must_use]
    pub fn default_rule(&self) -> Option<&PlacementRule<N>> {
        self.rules.get(&Threshold::Default)
    }

    /// Numeric thresholds this spec defines explicitly.
    pub fn widths(&self) -> impl Iterator<Item = Px> + '_ {
        self.rules.keys().filter_map(|t| t.width())
    }
}

/// Check a target position for the safe-integer range.
pub fn check_position(value: f64) -> Result<usize, RangeError> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= MAX_SAFE_INTEGER {
        Ok(value as usize)
    } else {
        Err(RangeError::InvalidPosition { value })
    }
}

/// Current `(parent, index)` of `node` as a rule.
pub fn current_placement<T: ElementTree>(
    tree: &T,
    node: &T::Node,
) -> Option<PlacementRule<T::Node>> {
    let parent = tree.parent(node)?;
    let position = tree.index_in_parent(node)?;
    Some(PlacementRule::new(parent).at_position(position))
}

/// Reject a source that an earlier spec already claimed.
pub(crate) fn check_unclaimed<T: ElementTree>(
    tree: &T,
    source: &T::Node,
    claimed: &[T::Node],
) -> Result<(), ConfigError> {
    if claimed.contains(source) {
        return Err(ConfigError::DuplicateSource {
            element: tree.describe(source),
        });
    }
    Ok(())
}

/// Target checks that do not depend on the position: not the source, not
/// inside the source, able to hold children.
pub(crate) fn check_target<T: ElementTree>(
    tree: &T,
    source: &T::Node,
    target: &T::Node,
) -> Result<(), ConfigError> {
    if target == source {
        return Err(ConfigError::TargetIsSource {
            element: tree.describe(source),
        });
    }
    if tree.is_descendant_of(target, source) {
        return Err(ConfigError::TargetInsideSource {
            target: tree.describe(target),
            element: tree.describe(source),
        });
    }
    if !tree.accepts_children(target) {
        return Err(ConfigError::VoidTarget {
            target: tree.describe(target),
        });
    }
    Ok(())
}

/// Rule set for one source under construction.
pub(crate) struct SpecBuilder<N> {
    source: N,
    rules: BTreeMap<Threshold, PlacementRule<N>>,
}

impl<N: Clone + PartialEq> SpecBuilder<N> {
    pub(crate) const fn new(source: N) -> Self {
        Self {
            source,
            rules: BTreeMap::new(),
        }
    }

    pub(crate) const fn source(&self) -> &N {
        &self.source
    }

    pub(crate) fn insert<T: ElementTree<Node = N>>(
        &mut self,
        tree: &T,
        px: Px,
        rule: PlacementRule<N>,
    ) -> Result<(), ConfigError> {
        if self.rules.insert(Threshold::Width(px), rule).is_some() {
            return Err(ConfigError::DuplicateThreshold {
                threshold: px.get(),
                element: tree.describe(&self.source),
            });
        }
        Ok(())
    }

    /// Add the default rule from the source's current location.
    pub(crate) fn finish<T: ElementTree<Node = N>>(
        mut self,
        tree: &T,
    ) -> Result<ValidatedSpec<N>, ConfigError> {
        let default = current_placement(tree, &self.source).ok_or_else(|| {
            ConfigError::Detached {
                element: tree.describe(&self.source),
            }
        })?;
        self.rules.insert(Threshold::Default, default);
        Ok(ValidatedSpec {
            source: self.source,
            rules: self.rules,
        })
    }
}

/// Validate one spec against the tree and the sources claimed so far.
pub fn validate_spec<T: ElementTree>(
    tree: &T,
    spec: RelocationSpec<T::Node>,
    claimed: &[T::Node],
) -> Result<ValidatedSpec<T::Node>, RelocateError> {
    let RelocationSpec {
        source,
        breakpoints,
    } = spec;

    check_unclaimed(tree, &source, claimed)?;
    if breakpoints.is_empty() {
        return Err(ConfigError::EmptyBreakpoints {
            element: tree.describe(&source),
        }
        .into());
    }

    let mut builder = SpecBuilder::new(source);
    for (width, rule) in breakpoints {
        let px = Px::new(width)?;
        check_target(tree, builder.source(), &rule.target)?;
        check_position(rule.position as f64)?;
        builder.insert(tree, px, rule)?;
    }
    Ok(builder.finish(tree)?)
}

/// Validate every spec in order; the first violation aborts.
pub fn validate_specs<T: ElementTree>(
    tree: &T,
    specs: Vec<RelocationSpec<T::Node>>,
) -> Result<Vec<ValidatedSpec<T::Node>>, RelocateError> {
    if specs.is_empty() {
        return Err(ConfigError::NoSpecs.into());
    }
    let mut claimed: Vec<T::Node> = Vec::with_capacity(specs.len());
    let mut validated = Vec::with_capacity(specs.len());
    for spec in specs {
        let spec = validate_spec(tree, spec, &claimed)?;
        claimed.push(spec.source.clone());
        validated.push(spec);
    }
    Ok(validated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::{ArenaTree, NodeId};
    use crate::error::ErrorKind;

    struct Page {
        tree: ArenaTree,
        body: NodeId,
        header: NodeId,
        desc: NodeId,
        aside: NodeId,
    }

    fn page() -> Page {
        let mut tree = ArenaTree::new("html");
        let body = tree.element(tree.root(), "body");
        let header = tree.element_with_id(body, "header", "header");
        let desc = tree.element_with_id(body, "p", "desc");
        let aside = tree.element_with_id(body, "aside", "aside");
        Page {
            tree,
            body,
            header,
            desc,
            aside,
        }
    }

    #[test]
    fn synthesizes_default_from_current_location() {
        let p = page();
        let spec = RelocationSpec::new(p.desc).at(768.0, PlacementRule::new(p.header));
        let v = validate_spec(&p.tree, spec, &[]).unwrap();
        assert_eq!(
            v.default_rule(),
            Some(&PlacementRule::new(p.body).at_position(1))
        );
        assert_eq!(v.widths().map(Px::get).collect::<Vec<_>>(), vec![768.0]);
    }

    #[test]
    fn rejects_empty_spec_list() {
        let p = page();
        let err = validate_specs(&p.tree, Vec::new()).unwrap_err();
        assert_eq!(err, RelocateError::Config(ConfigError::NoSpecs));
    }

    #[test]
    fn rejects_duplicate_source() {
        let p = page();
        let specs = vec![
            RelocationSpec::new(p.desc).at(500.0, PlacementRule::new(p.header)),
            RelocationSpec::new(p.desc).at(900.0, PlacementRule::new(p.aside)),
        ];
        let err = validate_specs(&p.tree, specs).unwrap_err();
        assert_eq!(
            err,
            RelocateError::Config(ConfigError::DuplicateSource {
                element: "<p id=\"desc\"></p>".into()
            })
        );
    }

    #[test]
    fn rejects_empty_breakpoints() {
        let p = page();
        let err = validate_spec(&p.tree, RelocationSpec::new(p.desc), &[]).unwrap_err();
        assert!(matches!(
            err,
            RelocateError::Config(ConfigError::EmptyBreakpoints { .. })
        ));
    }

    #[test]
    fn rejects_bad_thresholds_as_range() {
        let p = page();
        for width in [0.0, -10.0, f64::NAN, MAX_SAFE_INTEGER + 4096.0] {
            let spec = RelocationSpec::new(p.desc).at(width, PlacementRule::new(p.header));
            let err = validate_spec(&p.tree, spec, &[]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Range, "{width}");
        }
    }

    #[test]
    fn rejects_target_equal_to_source() {
        let p = page();
        let spec = RelocationSpec::new(p.desc).at(500.0, PlacementRule::new(p.desc));
        let err = validate_spec(&p.tree, spec, &[]).unwrap_err();
        assert!(matches!(
            err,
            RelocateError::Config(ConfigError::TargetIsSource { .. })
        ));
    }

    #[test]
    fn rejects_target_inside_source() {
        let mut p = page();
        let nested = p.tree.element(p.aside, "div");
        let spec = RelocationSpec::new(p.aside).at(500.0, PlacementRule::new(nested));
        let err = validate_spec(&p.tree, spec, &[]).unwrap_err();
        assert!(matches!(
            err,
            RelocateError::Config(ConfigError::TargetInsideSource { .. })
        ));
    }

    #[test]
    fn accepts_ancestor_target() {
        let mut p = page();
        let nested = p.tree.element(p.aside, "span");
        let spec = RelocationSpec::new(nested).at(500.0, PlacementRule::new(p.body));
        assert!(validate_spec(&p.tree, spec, &[]).is_ok());
    }

    #[test]
    fn rejects_void_target() {
        let mut p = page();
        let img = p.tree.element(p.body, "img");
        let spec = RelocationSpec::new(p.desc).at(500.0, PlacementRule::new(img));
        let err = validate_spec(&p.tree, spec, &[]).unwrap_err();
        assert_eq!(
            err,
            RelocateError::Config(ConfigError::VoidTarget {
                target: "<img>".into()
            })
        );
    }

    #[test]
    fn rejects_duplicate_threshold() {
        let p = page();
        let spec = RelocationSpec::new(p.desc)
            .at(768.0, PlacementRule::new(p.header))
            .at(768.0, PlacementRule::new(p.aside));
        let err = validate_spec(&p.tree, spec, &[]).unwrap_err();
        assert!(matches!(
            err,
            RelocateError::Config(ConfigError::DuplicateThreshold { threshold, .. }) if threshold == 768.0
        ));
    }

    #[test]
    fn rejects_detached_source() {
        let mut p = page();
        let loose = p.tree.create_element("div");
        let spec = RelocationSpec::new(loose).at(500.0, PlacementRule::new(p.header));
        let err = validate_spec(&p.tree, spec, &[]).unwrap_err();
        assert!(matches!(
            err,
            RelocateError::Config(ConfigError::Detached { .. })
        ));
    }

    #[test]
    fn position_range() {
        assert_eq!(check_position(0.0), Ok(0));
        assert_eq!(check_position(12.0), Ok(12));
        for bad in [-1.0, 1.5, f64::NAN, MAX_SAFE_INTEGER + 2.0] {
            assert!(check_position(bad).is_err(), "{bad}");
        }
    }
}
