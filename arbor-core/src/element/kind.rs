//! Element Kinds
//!
//! The kind of an element decides how its work unit is rendered. It is a
//! closed set of four cases, resolved once when a work unit is built:
//!
//! - `Host`: a host-platform node identified by a tag label
//! - `Function`: a plain function from props (and hooks) to an element
//! - `Stateful`: a component type that is instantiated from props and rendered
//! - `Fragment`: a transparent grouping with no node of its own

use std::any::{type_name, TypeId};
use std::fmt;
use std::rc::Rc;

use super::{Element, Props};
use crate::error::RenderError;
use crate::hooks::Hooks;

/// Signature of a function component.
///
/// The hook context is only handed out by the engine while the component's
/// own work unit is being rendered.
pub type RenderFn = fn(&Props, &mut Hooks<'_>) -> Result<Element, RenderError>;

/// A class-like component: built fresh from props on every render.
///
/// ```rust,ignore
/// struct Greeting { name: String }
///
/// impl Component for Greeting {
///     fn create(props: &Props) -> Self {
///         Self { name: props.str("name").unwrap_or("world").to_string() }
///     }
///
///     fn render(&self) -> Result<Element, RenderError> {
///         Ok(Element::host("p").child(format!("hello {}", self.name)))
///     }
/// }
/// ```
pub trait Component: 'static {
    /// Instantiate the component from its attributes.
    fn create(props: &Props) -> Self
    where
        Self: Sized;

    /// Produce the single child element this component renders to.
    fn render(&self) -> Result<Element, RenderError>;
}

fn construct<C: Component>(props: &Props) -> Box<dyn Component> {
    Box::new(C::create(props))
}

/// Constructor capability for a [`Component`] type.
#[derive(Clone, Copy)]
pub struct ComponentClass {
    type_id: TypeId,
    name: &'static str,
    construct: fn(&Props) -> Box<dyn Component>,
}

impl ComponentClass {
    /// Capture the constructor of `C`.
    pub fn of<C: Component>() -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            name: type_name::<C>(),
            construct: construct::<C>,
        }
    }

    /// Fully qualified type name of the component.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Build a fresh instance from the given props.
    pub fn instantiate(&self, props: &Props) -> Box<dyn Component> {
        (self.construct)(props)
    }
}

impl PartialEq for ComponentClass {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ComponentClass {}

impl fmt::Debug for ComponentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentClass").field(&self.name).finish()
    }
}

/// A function component, compared by function identity.
#[derive(Clone, Copy)]
pub struct FunctionComponent(RenderFn);

impl FunctionComponent {
    /// Wrap a render function.
    pub fn new(render: RenderFn) -> Self {
        Self(render)
    }

    /// The wrapped render function.
    pub fn render_fn(&self) -> RenderFn {
        self.0
    }

    fn addr(&self) -> usize {
        self.0 as usize
    }
}

impl PartialEq for FunctionComponent {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for FunctionComponent {}

impl fmt::Debug for FunctionComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionComponent({:#x})", self.addr())
    }
}

/// What an element describes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementKind {
    /// A host node with the given tag.
    Host(Rc<str>),

    /// A function component.
    Function(FunctionComponent),

    /// A class-like component.
    Stateful(ComponentClass),

    /// A transparent grouping of children.
    Fragment,
}

impl ElementKind {
    /// Short label used in logs.
    pub fn label(&self) -> &str {
        match self {
            Self::Host(tag) => tag,
            Self::Function(_) => "<function>",
            Self::Stateful(class) => class.name(),
            Self::Fragment => "<fragment>",
        }
    }
}
