#![forbid(unsafe_code)]

//! Element-tree seam.
//!
//! [`ElementTree`] is everything the engine needs from a document: element
//! child lists, parent links, and three write primitives. Hosts implement it
//! over their live tree (`domshift-web` over `web_sys::Element`); native code
//! and tests use [`ArenaTree`](crate::arena::ArenaTree).
//!
//! # Invariants
//!
//! 1. `children()` lists element children only, in document order.
//! 2. `detach()` on a node without a parent is a no-op.
//! 3. `insert_before()` and `append_child()` move a node that is already
//!    attached elsewhere (DOM semantics), never duplicate it.

use std::fmt;

use crate::error::DomError;

/// HTML elements that can never contain children.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Whether `tag` names an HTML void element (case-insensitive).
#[must_use]
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS
        .iter()
        .any(|void| void.eq_ignore_ascii_case(tag))
}

/// Read/write access to a mutable element tree.
pub trait ElementTree {
    /// Identity handle for an element. Equality is identity.
    type Node: Clone + PartialEq + fmt::Debug;

    /// Parent element, if attached.
    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Element children in document order.
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Whether `node` may hold children (false for void elements).
    fn accepts_children(&self, node: &Self::Node) -> bool;

    /// Short human-readable label for error messages.
    fn describe(&self, node: &Self::Node) -> String;

    /// Look up an element by its `id` attribute.
    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// Remove `node` from its parent.
    fn detach(&mut self, node: &Self::Node) -> Result<(), DomError>;

    /// Insert `node` into `parent` immediately before `reference`.
    fn insert_before(
        &mut self,
        parent: &Self::Node,
        node: &Self::Node,
        reference: &Self::Node,
    ) -> Result<(), DomError>;

    /// Append `node` as the last child of `parent`.
    fn append_child(&mut self, parent: &Self::Node, node: &Self::Node) -> Result<(), DomError>;

    fn child_count(&self, node: &Self::Node) -> usize {
        self.children(node).len()
    }

    fn child_at(&self, node: &Self::Node, index: usize) -> Option<Self::Node> {
        self.children(node).into_iter().nth(index)
    }

    /// Index of `node` among its parent's element children.
    fn index_in_parent(&self, node: &Self::Node) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(&parent).iter().position(|child| child == node)
    }

    /// Whether `node` lies strictly inside `ancestor`'s subtree.
    ///
    /// Walks the parent chain; never consults layout or rendering state.
    fn is_descendant_of(&self, node: &Self::Node, ancestor: &Self::Node) -> bool {
        let mut cursor = self.parent(node);
        while let Some(current) = cursor {
            if &current == ancestor {
                return true;
            }
            cursor = self.parent(&current);
        }
        false
    }
}
