//! Element Descriptions
//!
//! An element is an immutable description of what one tree position should
//! look like. A fresh element tree is produced on every render; the engine
//! diffs it against the previously committed work-unit tree.
//!
//! # Children
//!
//! Children are a sequence of [`Child`] entries. Only `Child::Element`
//! entries become work units. Text entries are content of the enclosing host
//! node and are applied as its text content during commit; empty entries
//! (from conditional rendering) are skipped.
//!
//! # Example
//!
//! ```rust,ignore
//! let tree = Element::host("div")
//!     .attr("className", "card")
//!     .child(Element::host("h1").child("React"))
//!     .child(Element::host("p").child("is pretty cool"));
//! ```

mod kind;
mod props;

pub use kind::{Component, ComponentClass, ElementKind, FunctionComponent, RenderFn};
pub use props::{format_number, EventHandler, PropValue, Props};

use std::rc::Rc;

use smallvec::SmallVec;

/// Sibling-scoped identity of an element.
pub type Key = Rc<str>;

/// One entry of an element's `children`.
#[derive(Clone, Debug)]
pub enum Child {
    /// A nested element; becomes its own work unit.
    Element(Element),
    /// Primitive text content of the enclosing host node.
    Text(String),
    /// Nothing; produced by conditional rendering.
    Empty,
}

impl From<Element> for Child {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<Option<Element>> for Child {
    fn from(element: Option<Element>) -> Self {
        element.map_or(Self::Empty, Self::Element)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<i32> for Child {
    fn from(n: i32) -> Self {
        Self::Text(n.to_string())
    }
}

impl From<i64> for Child {
    fn from(n: i64) -> Self {
        Self::Text(n.to_string())
    }
}

impl From<f64> for Child {
    fn from(n: f64) -> Self {
        Self::Text(format_number(n))
    }
}

/// Ordered children of an element.
#[derive(Clone, Debug, Default)]
pub struct Children(SmallVec<[Child; 2]>);

impl Children {
    /// No children.
    pub fn new() -> Self {
        Self::default()
    }

    /// Exactly one child.
    pub fn single(child: impl Into<Child>) -> Self {
        let mut children = Self::new();
        children.push(child);
        children
    }

    /// Append a child.
    pub fn push(&mut self, child: impl Into<Child>) {
        self.0.push(child.into());
    }

    /// Number of entries, including text and empty ones.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no entries at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All entries in order.
    pub fn iter(&self) -> impl Iterator<Item = &Child> {
        self.0.iter()
    }

    /// The entries that become work units, in order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.0.iter().filter_map(|child| match child {
            Child::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Concatenated text entries, or `None` when there are none.
    pub fn text_content(&self) -> Option<String> {
        let mut text: Option<String> = None;
        for child in &self.0 {
            if let Child::Text(s) = child {
                text.get_or_insert_with(String::new).push_str(s);
            }
        }
        text
    }
}

impl<C: Into<Child>> FromIterator<C> for Children {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Immutable description of one tree position.
///
/// Cloning is cheap: the attributes are shared.
#[derive(Clone, Debug)]
pub struct Element {
    kind: ElementKind,
    key: Option<Key>,
    props: Rc<Props>,
}

impl Element {
    /// Element of any kind with the given props.
    pub fn new(kind: ElementKind, props: Props) -> Self {
        Self {
            kind,
            key: None,
            props: Rc::new(props),
        }
    }

    /// Host element with the given tag.
    pub fn host(tag: impl Into<Rc<str>>) -> Self {
        Self::new(ElementKind::Host(tag.into()), Props::new())
    }

    /// Function component element.
    pub fn function(render: RenderFn) -> Self {
        Self::new(
            ElementKind::Function(FunctionComponent::new(render)),
            Props::new(),
        )
    }

    /// Class-like component element.
    pub fn stateful<C: Component>() -> Self {
        Self::new(ElementKind::Stateful(ComponentClass::of::<C>()), Props::new())
    }

    /// Fragment wrapping the given children.
    pub fn fragment<I, C>(children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Child>,
    {
        Self::new(ElementKind::Fragment, Props::new()).children(children)
    }

    /// Set the sibling-scoped key.
    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set an attribute.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        Rc::make_mut(&mut self.props).insert(name, value);
        self
    }

    /// Attach an event handler under an event-shaped key such as `onClick`.
    pub fn on<F>(self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn() + 'static,
    {
        self.attr(name, EventHandler::new(handler))
    }

    /// Append one child.
    pub fn child(mut self, child: impl Into<Child>) -> Self {
        Rc::make_mut(&mut self.props).children_mut().push(child);
        self
    }

    /// Append several children.
    pub fn children<I, C>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Child>,
    {
        let props = Rc::make_mut(&mut self.props);
        for child in children {
            props.children_mut().push(child);
        }
        self
    }

    /// What this element describes.
    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    /// Sibling-scoped key, if any.
    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// Attributes.
    pub fn props(&self) -> &Props {
        &self.props
    }

    pub(crate) fn shared_props(&self) -> &Rc<Props> {
        &self.props
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_and_empty_children_are_not_elements() {
        let element = Element::host("p")
            .child("count: ")
            .child(3_i32)
            .child(None::<Element>)
            .child(Element::host("b"));

        let children = element.props().children();
        assert_eq!(children.len(), 4);
        assert_eq!(children.elements().count(), 1);
        assert_eq!(children.text_content().as_deref(), Some("count: 3"));
    }

    #[test]
    fn element_children_have_no_text_content() {
        let element = Element::fragment([Element::host("a"), Element::host("b")]);
        assert_eq!(element.props().children().text_content(), None);
        assert_eq!(element.kind(), &ElementKind::Fragment);
    }

    #[test]
    fn builders_do_not_alias_shared_props() {
        let base = Element::host("div").attr("id", "a");
        let copy = base.clone().attr("id", "b");
        assert_eq!(base.props().str("id"), Some("a"));
        assert_eq!(copy.props().str("id"), Some("b"));
    }

    #[test]
    fn keys_are_preserved() {
        let element = Element::host("li").with_key("row-1");
        assert_eq!(element.key().map(|k| &**k), Some("row-1"));
    }
}
