//! Parsed markup of a published sheet snapshot and the node queries used on it

use crate::error::{Result, SheetError};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Id of the element holding one child container per tab
pub const VIEWPORT_ID: &str = "sheets-viewport";

/// A parsed sheet snapshot with its tab container located
pub struct Document {
    dom: RcDom,
    viewport: Handle,
}

impl Document {
    /// Parse raw markup and locate the tab container.
    ///
    /// Fails when the markup is not a sheet snapshot (an error or login page,
    /// for instance).
    pub fn parse(raw: &str) -> Result<Self> {
        let dom = parse_document(RcDom::default(), Default::default()).one(raw);
        let viewport = find_descendant(&dom.document, &|node| attr(node, "id") == VIEWPORT_ID)
            .ok_or_else(|| {
                SheetError::InvalidDocumentStructure(format!(
                    "no element with id '{}'",
                    VIEWPORT_ID
                ))
            })?;
        Ok(Self { dom, viewport })
    }

    /// Root node of the whole tree
    pub fn root(&self) -> &Handle {
        &self.dom.document
    }

    /// The element whose children are the per-tab containers
    pub fn viewport(&self) -> &Handle {
        &self.viewport
    }
}

/// Tag name of an element, `None` for text and other nodes
pub fn tag_name(node: &Handle) -> Option<&str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(&*name.local),
        _ => None,
    }
}

pub fn is_element(node: &Handle, tag: &str) -> bool {
    tag_name(node) == Some(tag)
}

/// Attribute value, or an empty string when the attribute is absent
pub fn attr(node: &Handle, key: &str) -> String {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| &*a.name.local == key)
            .map(|a| a.value.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// Whether the `class` attribute lists `token`
pub fn has_class(node: &Handle, token: &str) -> bool {
    attr(node, "class").split_whitespace().any(|c| c == token)
}

/// Element children in document order
pub fn child_elements(node: &Handle) -> Vec<Handle> {
    node.children
        .borrow()
        .iter()
        .filter(|child| matches!(child.data, NodeData::Element { .. }))
        .cloned()
        .collect()
}

/// First element child with the given tag
pub fn first_child_element(node: &Handle, tag: &str) -> Option<Handle> {
    node.children
        .borrow()
        .iter()
        .find(|child| is_element(child, tag))
        .cloned()
}

/// First descendant element (depth-first, document order) matching `predicate`
pub fn find_descendant(node: &Handle, predicate: &dyn Fn(&Handle) -> bool) -> Option<Handle> {
    for child in node.children.borrow().iter() {
        if matches!(child.data, NodeData::Element { .. }) && predicate(child) {
            return Some(child.clone());
        }
        if let Some(found) = find_descendant(child, predicate) {
            return Some(found);
        }
    }
    None
}

/// Concatenated text of all descendant text nodes, depth-first
pub fn text_content(node: &Handle) -> String {
    let mut text = String::new();
    collect_text(node, &mut text);
    text
}

fn collect_text(node: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &node.data {
        out.push_str(&contents.borrow());
        return;
    }
    for child in node.children.borrow().iter() {
        collect_text(child, out);
    }
}
