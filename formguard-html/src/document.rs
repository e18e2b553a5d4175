//! The DOM operations token injection needs.

use crate::error::HtmlError;

/// A mutable HTML document.
///
/// Elements are addressed through lightweight handles issued by the document
/// itself. The protector only ever queries, creates, attributes and inserts
/// elements, so any DOM that can do those things can be protected.
pub trait Document {
    /// Handle to an element of this document
    type Element: Copy + Eq;

    /// All elements matching `selector`, in document order.
    fn query_selector_all(&self, selector: &str) -> Result<Vec<Self::Element>, HtmlError>;

    /// The first element matching `selector`, in document order.
    fn query_selector(&self, selector: &str) -> Result<Option<Self::Element>, HtmlError> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    /// All `<form>` elements, in document order.
    fn forms(&self) -> Result<Vec<Self::Element>, HtmlError> {
        self.query_selector_all("form")
    }

    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> Self::Element;

    fn get_attribute(&self, element: Self::Element, name: &str) -> Option<&str>;

    /// Set an attribute, replacing any previous value.
    fn set_attribute(&mut self, element: Self::Element, name: &str, value: &str);

    /// Insert `child` among the children of `parent` at `index`.
    ///
    /// An index past the end appends. A child that is already attached
    /// elsewhere is moved.
    fn insert_child(&mut self, parent: Self::Element, child: Self::Element, index: usize);

    fn append_child(&mut self, parent: Self::Element, child: Self::Element) {
        self.insert_child(parent, child, usize::MAX);
    }
}

impl<D: Document + ?Sized> Document for &mut D {
    type Element = D::Element;

    fn query_selector_all(&self, selector: &str) -> Result<Vec<Self::Element>, HtmlError> {
        (**self).query_selector_all(selector)
    }

    fn query_selector(&self, selector: &str) -> Result<Option<Self::Element>, HtmlError> {
        (**self).query_selector(selector)
    }

    fn forms(&self) -> Result<Vec<Self::Element>, HtmlError> {
        (**self).forms()
    }

    fn create_element(&mut self, tag: &str) -> Self::Element {
        (**self).create_element(tag)
    }

    fn get_attribute(&self, element: Self::Element, name: &str) -> Option<&str> {
        (**self).get_attribute(element, name)
    }

    fn set_attribute(&mut self, element: Self::Element, name: &str, value: &str) {
        (**self).set_attribute(element, name, value)
    }

    fn insert_child(&mut self, parent: Self::Element, child: Self::Element, index: usize) {
        (**self).insert_child(parent, child, index)
    }

    fn append_child(&mut self, parent: Self::Element, child: Self::Element) {
        (**self).append_child(parent, child)
    }
}
