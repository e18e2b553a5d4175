//! HTML document backed by a `scraper` tree.

use crate::document::Document;
use crate::error::HtmlError;
use scraper::node::Element;
use scraper::{ElementRef, Html, Node, Selector};
use std::fmt;

/// Handle to a node of an [`HtmlDocument`].
pub type NodeId = ego_tree::NodeId;

/// A parsed, mutable HTML document.
///
/// Parsing and serialisation are done by html5ever through [`scraper`], so
/// any input is accepted and normalised the way a browser would: the result
/// always has `<html>`, `<head>` and `<body>` elements. Selectors are full
/// CSS selectors.
///
/// # Examples
///
/// ```
/// use formguard_html::{Document, HtmlDocument};
///
/// let mut document = HtmlDocument::parse("<p>Hello</p>");
/// let body = document.query_selector("body").unwrap().unwrap();
/// let note = document.create_element("aside");
/// document.set_attribute(note, "class", "note");
/// document.append_child(body, note);
///
/// assert_eq!(
///     document.to_html(),
///     "<html><head></head><body><p>Hello</p><aside class=\"note\"></aside></body></html>"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    html: Html,
    // Attribute-free HTML element that new elements and attribute names are
    // minted from.
    template: Element,
}

impl Default for HtmlDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlDocument {
    /// A document holding nothing but an empty `<html>` element.
    pub fn new() -> Self {
        let mut document = Self::parse("");
        let root = document.html.root_element().id();
        let implied: Vec<NodeId> = document
            .html
            .tree
            .get(root)
            .map(|html| html.children().map(|child| child.id()).collect())
            .unwrap_or_default();

        for id in implied {
            if let Some(mut node) = document.html.tree.get_mut(id) {
                node.detach();
            }
        }
        document
    }

    /// Parse a complete HTML document.
    pub fn parse(html: &str) -> Self {
        let html = Html::parse_document(html);
        let template = Element::new(html.root_element().value().name.clone(), Vec::new());
        Self { html, template }
    }

    /// The underlying `scraper` tree.
    pub fn as_html(&self) -> &Html {
        &self.html
    }

    /// The outermost element, normally `<html>`.
    pub fn root_element(&self) -> Option<NodeId> {
        self.html
            .tree
            .root()
            .children()
            .find(|child| child.value().is_element())
            .map(|child| child.id())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.html.tree.get(id)?.parent().map(|parent| parent.id())
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.html
            .tree
            .get(id)
            .map(|node| node.children().map(|child| child.id()).collect())
            .unwrap_or_default()
    }

    /// Tag name of an element node, `None` for any other node.
    pub fn element_name(&self, id: NodeId) -> Option<&str> {
        self.html
            .tree
            .get(id)?
            .value()
            .as_element()
            .map(Element::name)
    }

    /// Concatenated text of all text nodes under an element.
    pub fn text_content(&self, id: NodeId) -> String {
        self.html
            .tree
            .get(id)
            .and_then(ElementRef::wrap)
            .map(|element| element.text().collect())
            .unwrap_or_default()
    }

    /// Serialise the document back to HTML.
    pub fn to_html(&self) -> String {
        self.html.html()
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, of: NodeId) -> bool {
        candidate == of
            || self
                .html
                .tree
                .get(of)
                .is_some_and(|node| node.ancestors().any(|ancestor| ancestor.id() == candidate))
    }
}

impl fmt::Display for HtmlDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_html())
    }
}

impl Document for HtmlDocument {
    type Element = NodeId;

    fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, HtmlError> {
        let parsed =
            Selector::parse(selector).map_err(|e| HtmlError::selector(selector, e.to_string()))?;

        // Walk from the document root so detached elements never match.
        Ok(self
            .html
            .tree
            .root()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|element| parsed.matches(element))
            .map(|element| element.id())
            .collect())
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        let mut element = self.template.clone();
        element.name.local = tag.to_ascii_lowercase().as_str().into();
        self.html.tree.orphan(Node::Element(element)).id()
    }

    fn get_attribute(&self, element: NodeId, name: &str) -> Option<&str> {
        self.html
            .tree
            .get(element)?
            .value()
            .as_element()?
            .attr(&name.to_ascii_lowercase())
    }

    fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) {
        let mut key = self.template.name.clone();
        key.prefix = None;
        key.ns = "".into();
        key.local = name.to_ascii_lowercase().as_str().into();

        let Some(mut node) = self.html.tree.get_mut(element) else {
            return;
        };
        if let Node::Element(existing) = node.value() {
            // Rebuild so the cached id and class lists are recomputed.
            let mut attrs = std::mem::take(&mut existing.attrs);
            attrs.insert(key, value.into());

            let mut rebuilt = Element::new(existing.name.clone(), Vec::new());
            rebuilt.attrs = attrs;
            *existing = rebuilt;
        }
    }

    fn insert_child(&mut self, parent: NodeId, child: NodeId, index: usize) {
        if self.element_name(parent).is_none() || self.html.tree.get(child).is_none() {
            return;
        }
        // Refuse to create cycles.
        if self.is_ancestor_or_self(child, parent) {
            return;
        }

        let anchor = self
            .children(parent)
            .into_iter()
            .filter(|id| *id != child)
            .nth(index);

        let tree = &mut self.html.tree;
        match anchor.and_then(|id| tree.get_mut(id)) {
            Some(mut sibling) => {
                sibling.insert_id_before(child);
            }
            None => {
                if let Some(mut parent) = tree.get_mut(parent) {
                    parent.append_id(child);
                }
            }
        }
    }
}
