#![forbid(unsafe_code)]

//! [`ElementTree`] over the live document.

use domshift_core::{DomError, ElementTree, is_void_element};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// The browser document as an element tree.
#[derive(Debug, Clone)]
pub struct WebDom {
    document: Document,
}

impl WebDom {
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// The document of the global window, if there is one.
    #[must_use]
    pub fn from_window() -> Option<Self> {
        web_sys::window()?.document().map(Self::new)
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }
}

fn js_message(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|err| String::from(err.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}

fn dom_error(value: JsValue) -> DomError {
    DomError::new(js_message(&value))
}

impl ElementTree for WebDom {
    type Node = Element;

    fn parent(&self, node: &Element) -> Option<Element> {
        node.parent_element()
    }

    fn children(&self, node: &Element) -> Vec<Element> {
        let collection = node.children();
        (0..collection.length())
            .filter_map(|i| collection.item(i))
            .collect()
    }

    fn child_count(&self, node: &Element) -> usize {
        node.child_element_count() as usize
    }

    fn child_at(&self, node: &Element, index: usize) -> Option<Element> {
        node.children().item(u32::try_from(index).ok()?)
    }

    fn accepts_children(&self, node: &Element) -> bool {
        let html = node.namespace_uri().as_deref() == Some(HTML_NAMESPACE);
        !(html && is_void_element(&node.local_name()))
    }

    fn describe(&self, node: &Element) -> String {
        node.clone_node()
            .ok()
            .and_then(|shallow| shallow.dyn_into::<Element>().ok())
            .map_or_else(|| format!("<{}>", node.local_name()), |el| el.outer_html())
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn is_descendant_of(&self, node: &Element, ancestor: &Element) -> bool {
        node != ancestor && ancestor.contains(Some(node.as_ref()))
    }

    fn detach(&mut self, node: &Element) -> Result<(), DomError> {
        node.remove();
        Ok(())
    }

    fn insert_before(
        &mut self,
        parent: &Element,
        node: &Element,
        reference: &Element,
    ) -> Result<(), DomError> {
        parent
            .insert_before(node, Some(reference.as_ref()))
            .map(drop)
            .map_err(dom_error)
    }

    fn append_child(&mut self, parent: &Element, node: &Element) -> Result<(), DomError> {
        parent.append_child(node).map(drop).map_err(dom_error)
    }
}
