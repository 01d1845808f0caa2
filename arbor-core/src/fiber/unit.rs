//! Work Units
//!
//! This module defines the nodes that live in the work-unit arena.

use std::fmt;
use std::rc::Rc;

use crate::element::{ComponentClass, Element, ElementKind, FunctionComponent, Key, Props};
use crate::hooks::HookList;

/// Index of a work unit inside one [`FiberTree`](super::FiberTree).
///
/// Ids are only meaningful for the arena that issued them. An `alternate`
/// id points into the previously committed arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(u32);

impl UnitId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }

    /// Position of the unit in its arena.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The effect a unit needs applied during commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EffectTag {
    /// Nothing to do.
    #[default]
    None,
    /// Insert the unit's host node under its host parent.
    Placement,
    /// Patch the attributes of the existing host node.
    Update,
    /// Remove the unit's host nodes (set on units of the committed tree only).
    Deletion,
}

/// Kind of a work unit, resolved once from its element kind.
#[derive(Clone, Debug)]
pub enum UnitKind {
    /// The seeded root; its host node is the caller's container.
    Root,
    /// A host node with this tag.
    Host(Rc<str>),
    /// A function component.
    Function(FunctionComponent),
    /// A class-like component.
    Stateful(ComponentClass),
    /// A transparent grouping.
    Fragment,
}

impl UnitKind {
    /// Whether an element of `kind` renders the same component instance as this unit.
    pub fn matches(&self, kind: &ElementKind) -> bool {
        match (self, kind) {
            (Self::Host(a), ElementKind::Host(b)) => a == b,
            (Self::Function(a), ElementKind::Function(b)) => a == b,
            (Self::Stateful(a), ElementKind::Stateful(b)) => a == b,
            (Self::Fragment, ElementKind::Fragment) => true,
            _ => false,
        }
    }

    /// Short label used in logs.
    pub fn label(&self) -> &str {
        match self {
            Self::Root => "<root>",
            Self::Host(tag) => tag,
            Self::Function(_) => "<function>",
            Self::Stateful(class) => class.name(),
            Self::Fragment => "<fragment>",
        }
    }
}

impl From<&ElementKind> for UnitKind {
    fn from(kind: &ElementKind) -> Self {
        match kind {
            ElementKind::Host(tag) => Self::Host(Rc::clone(tag)),
            ElementKind::Function(f) => Self::Function(*f),
            ElementKind::Stateful(class) => Self::Stateful(*class),
            ElementKind::Fragment => Self::Fragment,
        }
    }
}

/// One rendered tree position.
///
/// Units form a tree through `child` (first child), `sibling` (next unit at
/// the same level) and `parent` links, all of which are arena indices.
pub struct WorkUnit<N> {
    pub(crate) kind: UnitKind,
    pub(crate) key: Option<Key>,
    pub(crate) props: Rc<Props>,
    pub(crate) parent: Option<UnitId>,
    pub(crate) child: Option<UnitId>,
    pub(crate) sibling: Option<UnitId>,
    pub(crate) alternate: Option<UnitId>,
    pub(crate) host: Option<N>,
    pub(crate) effect: EffectTag,
    pub(crate) hooks: HookList,
}

impl<N> WorkUnit<N> {
    fn blank(kind: UnitKind, props: Rc<Props>) -> Self {
        Self {
            kind,
            key: None,
            props,
            parent: None,
            child: None,
            sibling: None,
            alternate: None,
            host: None,
            effect: EffectTag::None,
            hooks: HookList::new(),
        }
    }

    /// Root unit owning the container node.
    pub(crate) fn root(container: N, props: Rc<Props>, alternate: Option<UnitId>) -> Self {
        Self {
            host: Some(container),
            alternate,
            ..Self::blank(UnitKind::Root, props)
        }
    }

    /// A unit for an element with no matching predecessor.
    pub(crate) fn placement(element: &Element, parent: UnitId) -> Self {
        Self {
            key: element.key().cloned(),
            parent: Some(parent),
            effect: EffectTag::Placement,
            ..Self::blank(
                UnitKind::from(element.kind()),
                Rc::clone(element.shared_props()),
            )
        }
    }

    /// A unit that continues `alternate`, reusing its host node.
    pub(crate) fn update(
        element: &Element,
        parent: UnitId,
        alternate: UnitId,
        host: Option<N>,
    ) -> Self {
        Self {
            key: element.key().cloned(),
            parent: Some(parent),
            alternate: Some(alternate),
            host,
            effect: EffectTag::Update,
            ..Self::blank(
                UnitKind::from(element.kind()),
                Rc::clone(element.shared_props()),
            )
        }
    }

    /// Kind of the unit.
    pub fn kind(&self) -> &UnitKind {
        &self.kind
    }

    /// Key copied from the element, if any.
    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// Attributes copied from the element.
    pub fn props(&self) -> &Props {
        &self.props
    }

    /// Owning ancestor.
    pub fn parent(&self) -> Option<UnitId> {
        self.parent
    }

    /// First child.
    pub fn child(&self) -> Option<UnitId> {
        self.child
    }

    /// Next unit at the same level.
    pub fn sibling(&self) -> Option<UnitId> {
        self.sibling
    }

    /// Counterpart in the previously committed tree.
    pub fn alternate(&self) -> Option<UnitId> {
        self.alternate
    }

    /// Host node this unit controls, if it has one of its own.
    pub fn host_node(&self) -> Option<&N> {
        self.host.as_ref()
    }

    /// Pending effect.
    pub fn effect(&self) -> EffectTag {
        self.effect
    }

    /// Number of hook records (function units only).
    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    pub(crate) fn take_effect(&mut self) -> EffectTag {
        std::mem::take(&mut self.effect)
    }
}

impl<N: fmt::Debug> fmt::Debug for WorkUnit<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkUnit")
            .field("kind", &self.kind.label())
            .field("parent", &self.parent)
            .field("child", &self.child)
            .field("sibling", &self.sibling)
            .field("alternate", &self.alternate)
            .field("host", &self.host)
            .field("effect", &self.effect)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_kind_matches_element_kind() {
        let host = UnitKind::from(&ElementKind::Host("div".into()));
        assert!(host.matches(&ElementKind::Host("div".into())));
        assert!(!host.matches(&ElementKind::Host("span".into())));
        assert!(!host.matches(&ElementKind::Fragment));
        assert!(UnitKind::Fragment.matches(&ElementKind::Fragment));
        assert!(!UnitKind::Root.matches(&ElementKind::Fragment));
    }

    #[test]
    fn placement_units_start_without_host_node() {
        let element = Element::host("p").with_key("k");
        let unit: WorkUnit<u32> = WorkUnit::placement(&element, UnitId::from_index(0));
        assert_eq!(unit.effect(), EffectTag::Placement);
        assert!(unit.host_node().is_none());
        assert!(unit.alternate().is_none());
        assert_eq!(unit.key().map(|k| &**k), Some("k"));
    }

    #[test]
    fn update_units_reuse_host_node() {
        let element = Element::host("p");
        let unit = WorkUnit::update(&element, UnitId::from_index(0), UnitId::from_index(4), Some(7_u32));
        assert_eq!(unit.effect(), EffectTag::Update);
        assert_eq!(unit.host_node(), Some(&7));
        assert_eq!(unit.alternate(), Some(UnitId::from_index(4)));
    }

    #[test]
    fn effects_are_consumed_once() {
        let mut unit: WorkUnit<u32> = WorkUnit::placement(&Element::host("p"), UnitId::from_index(0));
        assert_eq!(unit.take_effect(), EffectTag::Placement);
        assert_eq!(unit.take_effect(), EffectTag::None);
    }
}
