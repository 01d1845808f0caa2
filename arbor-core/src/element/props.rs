//! Element Attributes
//!
//! `Props` is the attribute map of an element plus its reserved `children`
//! entry. Attribute order is preserved so host operations are issued in the
//! order the element declared them.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::Children;

/// Callback attached to a host node as an event listener.
///
/// Two handlers are equal only if they are the same allocation, so a handler
/// recreated on every render is detached and reattached on every commit.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn()>);

impl EventHandler {
    /// Wrap a closure.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn() + 'static,
    {
        Self(Rc::new(handler))
    }

    /// Invoke the handler.
    pub fn call(&self) {
        (self.0)();
    }

    /// Check whether two handlers are the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler({:p})", Rc::as_ptr(&self.0).cast::<()>())
    }
}

/// A single attribute value.
#[derive(Clone, Debug)]
pub enum PropValue {
    /// Text value.
    Str(String),
    /// Numeric value.
    Number(f64),
    /// Boolean flag.
    Bool(bool),
    /// Event handler; attached as a listener when the key carries the event prefix.
    Handler(EventHandler),
}

impl PropValue {
    /// The handler, if this value is one.
    pub fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            Self::Handler(handler) => Some(handler),
            _ => None,
        }
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Handler(a), Self::Handler(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Handler(_) => f.write_str("[handler]"),
        }
    }
}

/// Render a number the way text content shows it: integral values drop the fraction.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<EventHandler> for PropValue {
    fn from(value: EventHandler) -> Self {
        Self::Handler(value)
    }
}

/// Attributes of an element, including its nested children.
#[derive(Clone, Debug, Default)]
pub struct Props {
    attrs: IndexMap<String, PropValue>,
    children: Children,
}

impl Props {
    /// Empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, replacing any previous value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropValue>) {
        self.attrs.insert(name.into(), value.into());
    }

    /// Look up an attribute.
    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.attrs.get(name)
    }

    /// Look up a text attribute.
    pub fn str(&self, name: &str) -> Option<&str> {
        match self.attrs.get(name) {
            Some(PropValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Look up a numeric attribute.
    pub fn number(&self, name: &str) -> Option<f64> {
        match self.attrs.get(name) {
            Some(PropValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Look up a boolean attribute.
    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.attrs.get(name) {
            Some(PropValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Whether an attribute with this name is set.
    pub fn contains(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// Attributes in declaration order (children excluded).
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of attributes (children excluded).
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// Whether there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Nested children.
    pub fn children(&self) -> &Children {
        &self.children
    }

    /// Mutable access to the nested children.
    pub fn children_mut(&mut self) -> &mut Children {
        &mut self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handlers_compare_by_identity() {
        let a = EventHandler::new(|| {});
        let b = EventHandler::new(|| {});
        assert_eq!(PropValue::Handler(a.clone()), PropValue::Handler(a.clone()));
        assert_ne!(PropValue::Handler(a), PropValue::Handler(b));
    }

    #[test]
    fn numbers_format_like_text_content() {
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(-7.0), "-7");
        assert_eq!(format_number(2.5), "2.5");
    }

    #[test]
    fn attributes_keep_declaration_order() {
        let mut props = Props::new();
        props.insert("id", "main");
        props.insert("title", "hello");
        props.insert("hidden", false);
        props.insert("id", "again");

        let names: Vec<_> = props.attrs().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["id", "title", "hidden"]);
        assert_eq!(props.str("id"), Some("again"));
        assert_eq!(props.bool("hidden"), Some(false));
        assert_eq!(props.number("id"), None);
    }
}
