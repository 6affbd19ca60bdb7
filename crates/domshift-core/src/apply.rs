#![forbid(unsafe_code)]

//! Removal and insertion primitives.
//!
//! Insertion walks a position-sorted plan and, for each placement, inserts
//! the source before the target's child at `position`, or appends when there
//! is no such child. Because positions ascend, each insertion leaves earlier
//! placements where they were declared.
//!
//! [`Insertion::Checked`] additionally rejects positions beyond the target's
//! current child count. [`preflight`] runs that check, and the cycle check a
//! host tree would apply, on a shadow of the affected child lists and parent
//! links so construction can fail without touching the tree.

use tracing::{trace, warn};

use crate::error::{DomError, RangeError, RelocateError};
use crate::plan::{PlacementPlan, PlanSet};
use crate::tree::ElementTree;

/// Position handling during insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// Reject positions past the end (construction).
    Checked,
    /// Append when the position is past the end (runtime).
    Lenient,
}

/// Detach every source referenced by `plan`.
pub fn remove_sources<T: ElementTree>(
    tree: &mut T,
    plan: &PlacementPlan<T::Node>,
) -> Result<(), DomError> {
    for placement in plan {
        tree.detach(&placement.source)?;
    }
    Ok(())
}

/// Insert every source of `plan` at its declared position.
pub fn insert_sources<T: ElementTree>(
    tree: &mut T,
    plan: &PlacementPlan<T::Node>,
    mode: Insertion,
) -> Result<(), RelocateError> {
    for placement in plan {
        let count = tree.child_count(&placement.target);
        if mode == Insertion::Checked && placement.position > count {
            return Err(RangeError::PositionExceedsChildren {
                position: placement.position,
                max: count,
            }
            .into());
        }
        insert_one(tree, &placement.source, &placement.target, placement.position)?;
    }
    Ok(())
}

fn insert_one<T: ElementTree>(
    tree: &mut T,
    source: &T::Node,
    target: &T::Node,
    position: usize,
) -> Result<(), DomError> {
    match tree.child_at(target, position) {
        Some(reference) => {
            trace!(?source, ?target, position, "insert before");
            tree.insert_before(target, source, &reference)
        }
        None => {
            trace!(?source, ?target, position, "append");
            tree.append_child(target, source)
        }
    }
}

/// Remove then re-insert leniently, logging failed writes.
///
/// A source whose insertion fails goes back where it was before removal.
/// Returns the number of placements that landed.
pub fn relocate<T: ElementTree>(tree: &mut T, plan: &PlacementPlan<T::Node>) -> usize {
    let homes: Vec<Option<(T::Node, usize)>> = plan
        .iter()
        .map(|placement| {
            let parent = tree.parent(&placement.source)?;
            let index = tree.index_in_parent(&placement.source)?;
            Some((parent, index))
        })
        .collect();
    for placement in plan {
        if let Err(err) = tree.detach(&placement.source) {
            warn!(source = ?placement.source, %err, "detach failed");
        }
    }
    let mut moved = 0;
    for (placement, home) in plan.iter().zip(homes) {
        let Err(err) = insert_one(tree, &placement.source, &placement.target, placement.position)
        else {
            moved += 1;
            continue;
        };
        warn!(
            source = ?placement.source,
            target = ?placement.target,
            %err,
            "insert failed"
        );
        let Some((parent, index)) = home else {
            continue;
        };
        if let Err(err) = insert_one(tree, &placement.source, &parent, index) {
            warn!(source = ?placement.source, parent = ?parent, %err, "restore failed");
        }
    }
    moved
}

/// Child lists of every container a plan may touch, plus the parent of every
/// source moved so far.
struct Shadow<N> {
    containers: Vec<(N, Vec<N>)>,
    parents: Vec<(N, Option<N>)>,
}

impl<N: Clone + PartialEq> Shadow<N> {
    fn capture<T: ElementTree<Node = N>>(tree: &T, plans: &PlanSet<N>) -> Self {
        let mut containers: Vec<(N, Vec<N>)> = Vec::new();
        for (_, plan) in plans.iter() {
            for placement in plan {
                if !containers.iter().any(|(c, _)| c == &placement.target) {
                    let children = tree.children(&placement.target);
                    containers.push((placement.target.clone(), children));
                }
            }
        }
        Self {
            containers,
            parents: Vec::new(),
        }
    }

    fn set_parent(&mut self, node: &N, parent: Option<N>) {
        match self.parents.iter_mut().find(|(n, _)| n == node) {
            Some((_, slot)) => *slot = parent,
            None => self.parents.push((node.clone(), parent)),
        }
    }

    fn parent<T: ElementTree<Node = N>>(&self, tree: &T, node: &N) -> Option<N> {
        match self.parents.iter().find(|(n, _)| n == node) {
            Some((_, parent)) => parent.clone(),
            None => tree.parent(node),
        }
    }

    /// Whether `ancestor` is `node` or lies on its shadow parent chain.
    fn is_inclusive_ancestor<T: ElementTree<Node = N>>(
        &self,
        tree: &T,
        ancestor: &N,
        node: &N,
    ) -> bool {
        let mut current = Some(node.clone());
        while let Some(n) = current {
            if &n == ancestor {
                return true;
            }
            current = self.parent(tree, &n);
        }
        false
    }

    fn remove(&mut self, node: &N) {
        for (_, children) in &mut self.containers {
            children.retain(|child| child != node);
        }
        self.set_parent(node, None);
    }

    fn children_mut(&mut self, container: &N) -> Option<&mut Vec<N>> {
        self.containers
            .iter_mut()
            .find(|(c, _)| c == container)
            .map(|(_, children)| children)
    }
}

/// Simulate applying every plan in order with the checked insertion rule.
///
/// Sources start wherever the live tree has them; each plan first removes
/// its own sources from the shadow, then inserts them. An insertion that
/// would place a source inside itself, or past the end of its target, fails
/// here. The tree is only read.
pub fn preflight<T: ElementTree>(
    tree: &T,
    plans: &PlanSet<T::Node>,
) -> Result<(), RelocateError> {
    let mut shadow = Shadow::capture(tree, plans);
    for (_, plan) in plans.iter() {
        for placement in plan {
            shadow.remove(&placement.source);
        }
        for placement in plan {
            if shadow.is_inclusive_ancestor(tree, &placement.source, &placement.target) {
                return Err(DomError::new(format!(
                    "HierarchyRequestError: moving {} into {} would place it inside itself",
                    tree.describe(&placement.source),
                    tree.describe(&placement.target)
                ))
                .into());
            }
            let Some(children) = shadow.children_mut(&placement.target) else {
                continue;
            };
            if placement.position > children.len() {
                return Err(RangeError::PositionExceedsChildren {
                    position: placement.position,
                    max: children.len(),
                }
                .into());
            }
            children.insert(placement.position, placement.source.clone());
            shadow.set_parent(&placement.source, Some(placement.target.clone()));
        }
    }
    Ok(())
}
