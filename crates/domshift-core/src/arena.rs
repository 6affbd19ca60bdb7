#![forbid(unsafe_code)]

//! Explicit arena tree model.
//!
//! [`ArenaTree`] is a small element tree with stable [`NodeId`] handles,
//! parent links and ordered child lists. It implements
//! [`ElementTree`] with DOM move semantics and DOM-style hierarchy checks, so
//! relocation can be exercised without a browser.
//!
//! # Failure Modes
//!
//! Writes fail with [`DomError`] when a handle is unknown, the parent is a
//! void element, the reference node is not a child of the parent, or the
//! write would make a node its own ancestor.

use std::fmt;

use crate::error::DomError;
use crate::tree::{ElementTree, is_void_element};

/// Stable handle into an [`ArenaTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Raw index into the arena.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct ArenaNode {
    tag: String,
    id: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// In-memory element tree.
#[derive(Debug, Clone)]
pub struct ArenaTree {
    nodes: Vec<ArenaNode>,
}

impl ArenaTree {
    /// Create a tree whose root element has tag `root_tag`.
    #[must_use]
    pub fn new(root_tag: &str) -> Self {
        Self {
            nodes: vec![ArenaNode {
                tag: root_tag.to_ascii_lowercase(),
                id: None,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// The document root element.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of elements ever created, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(ArenaNode {
            tag: tag.to_ascii_lowercase(),
            id: None,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create an element and append it to `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is unknown or void; this is a builder for fixtures.
    pub fn element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let node = self.create_element(tag);
        if let Err(err) = self.append_child(&parent, &node) {
            panic!("cannot build fixture under {parent}: {err}");
        }
        node
    }

    /// [`element`](Self::element) plus an `id` attribute.
    pub fn element_with_id(&mut self, parent: NodeId, tag: &str, id: &str) -> NodeId {
        let node = self.element(parent, tag);
        self.set_id(node, id);
        node
    }

    pub fn set_id(&mut self, node: NodeId, id: &str) {
        if let Some(entry) = self.nodes.get_mut(node.index()) {
            entry.id = Some(id.to_string());
        }
    }

    #[must_use]
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.index()).map(|n| n.tag.as_str())
    }

    #[must_use]
    pub fn id(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.index()).and_then(|n| n.id.as_deref())
    }

    /// Borrowed child list of `node` (empty for unknown handles).
    #[must_use]
    pub fn children_of(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.index())
            .map_or(&[][..], |n| n.children.as_slice())
    }

    #[must_use]
    pub fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.index()).and_then(|n| n.parent)
    }

    /// `(parent, index)` of an attached node.
    #[must_use]
    pub fn location(&self, node: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent_of(node)?;
        let index = self.children_of(parent).iter().position(|&c| c == node)?;
        Some((parent, index))
    }

    fn node(&self, node: NodeId) -> Result<&ArenaNode, DomError> {
        self.nodes
            .get(node.index())
            .ok_or_else(|| DomError::new(format!("unknown node {node}")))
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent_of(current);
        }
        false
    }

    fn check_insert(&self, parent: NodeId, node: NodeId) -> Result<(), DomError> {
        let parent_entry = self.node(parent)?;
        self.node(node)?;
        if is_void_element(&parent_entry.tag) {
            return Err(DomError::new(format!(
                "<{}> {parent} cannot contain children",
                parent_entry.tag
            )));
        }
        if self.is_inclusive_ancestor(node, parent) {
            return Err(DomError::new(format!(
                "inserting {node} into {parent} would create a cycle"
            )));
        }
        Ok(())
    }

    fn unlink(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.index()].parent.take() {
            self.nodes[parent.index()].children.retain(|&c| c != node);
        }
    }
}

impl ElementTree for ArenaTree {
    type Node = NodeId;

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.parent_of(*node)
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.children_of(*node).to_vec()
    }

    fn child_count(&self, node: &NodeId) -> usize {
        self.children_of(*node).len()
    }

    fn child_at(&self, node: &NodeId, index: usize) -> Option<NodeId> {
        self.children_of(*node).get(index).copied()
    }

    fn accepts_children(&self, node: &NodeId) -> bool {
        self.tag(*node).is_some_and(|tag| !is_void_element(tag))
    }

    fn describe(&self, node: &NodeId) -> String {
        let Some(tag) = self.tag(*node) else {
            return format!("<unknown {node}>");
        };
        let attrs = self
            .id(*node)
            .map(|id| format!(" id=\"{id}\""))
            .unwrap_or_default();
        if is_void_element(tag) {
            format!("<{tag}{attrs}>")
        } else {
            format!("<{tag}{attrs}></{tag}>")
        }
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.id.as_deref() == Some(id))
            .map(|index| NodeId(index as u32))
    }

    fn detach(&mut self, node: &NodeId) -> Result<(), DomError> {
        self.node(*node)?;
        self.unlink(*node);
        Ok(())
    }

    fn insert_before(
        &mut self,
        parent: &NodeId,
        node: &NodeId,
        reference: &NodeId,
    ) -> Result<(), DomError> {
        self.check_insert(*parent, *node)?;
        if node == reference {
            return Ok(());
        }
        if self.parent_of(*reference) != Some(*parent) {
            return Err(DomError::new(format!(
                "{reference} is not a child of {parent}"
            )));
        }
        self.unlink(*node);
        let children = &mut self.nodes[parent.index()].children;
        let at = children
            .iter()
            .position(|c| c == reference)
            .unwrap_or(children.len());
        children.insert(at, *node);
        self.nodes[node.index()].parent = Some(*parent);
        Ok(())
    }

    fn append_child(&mut self, parent: &NodeId, node: &NodeId) -> Result<(), DomError> {
        self.check_insert(*parent, *node)?;
        self.unlink(*node);
        self.nodes[parent.index()].children.push(*node);
        self.nodes[node.index()].parent = Some(*parent);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (ArenaTree, NodeId, NodeId, NodeId) {
        let mut tree = ArenaTree::new("html");
        let body = tree.element(tree.root(), "body");
        let a = tree.element_with_id(body, "div", "a");
        let b = tree.element_with_id(body, "div", "b");
        (tree, body, a, b)
    }

    #[test]
    fn append_moves_existing_node() {
        let (mut tree, body, a, b) = fixture();
        tree.append_child(&b, &a).unwrap();
        assert_eq!(tree.children_of(body), &[b]);
        assert_eq!(tree.children_of(b), &[a]);
        assert_eq!(tree.location(a), Some((b, 0)));
    }

    #[test]
    fn insert_before_reference() {
        let (mut tree, body, a, b) = fixture();
        let c = tree.create_element("span");
        tree.insert_before(&body, &c, &b).unwrap();
        assert_eq!(tree.children_of(body), &[a, c, b]);
    }

    #[test]
    fn insert_before_rejects_foreign_reference() {
        let (mut tree, _body, a, b) = fixture();
        let c = tree.create_element("span");
        assert!(tree.insert_before(&a, &c, &b).is_err());
        assert_eq!(tree.parent_of(c), None);
    }

    #[test]
    fn rejects_cycles_and_void_parents() {
        let (mut tree, body, a, _b) = fixture();
        let inner = tree.element(a, "p");
        assert!(tree.append_child(&inner, &a).is_err());
        assert!(tree.append_child(&a, &a).is_err());
        let img = tree.element(body, "img");
        assert!(tree.append_child(&img, &inner).is_err());
        assert_eq!(tree.location(inner), Some((a, 0)));
    }

    #[test]
    fn detach_is_idempotent() {
        let (mut tree, body, a, b) = fixture();
        tree.detach(&a).unwrap();
        tree.detach(&a).unwrap();
        assert_eq!(tree.children_of(body), &[b]);
        assert_eq!(tree.index_in_parent(&a), None);
    }

    #[test]
    fn descendant_walk() {
        let (mut tree, body, a, b) = fixture();
        let deep = tree.element(a, "ul");
        let leaf = tree.element(deep, "li");
        assert!(tree.is_descendant_of(&leaf, &a));
        assert!(tree.is_descendant_of(&leaf, &body));
        assert!(!tree.is_descendant_of(&leaf, &b));
        assert!(!tree.is_descendant_of(&a, &a));
    }

    #[test]
    fn describe_formats_like_shallow_markup() {
        let (mut tree, body, a, _b) = fixture();
        let img = tree.element(body, "IMG");
        assert_eq!(tree.describe(&a), "<div id=\"a\"></div>");
        assert_eq!(tree.describe(&img), "<img>");
        assert_eq!(tree.element_by_id("b").map(|n| tree.describe(&n)).as_deref(), Some("<div id=\"b\"></div>"));
        assert!(!tree.accepts_children(&img));
    }
}
