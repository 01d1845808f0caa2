//! Arbor Core
//!
//! This crate provides the core runtime for the Arbor declarative UI library.
//! It implements:
//!
//! - Element descriptions (host tags, function and class-like components, fragments)
//! - An interruptible, positional reconciler over an arena of work units
//! - A cooperative scheduler driven by host idle periods
//! - A synchronous commit phase against an abstract host
//! - State hooks that persist across renders by tree position
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `element`: the immutable description of what should exist
//! - `fiber`: the work-unit tree and the child reconciler
//! - `hooks`: the per-unit hook store
//! - `engine`: the session object, scheduler, render step and committer
//! - `host`: the host interface and an in-memory host
//! - `error`: error types
//!
//! # Example
//!
//! ```rust,ignore
//! use arbor_core::prelude::*;
//!
//! fn counter(_: &Props, hooks: &mut Hooks<'_>) -> Result<Element, RenderError> {
//!     let (count, set_count) = hooks.use_state(0)?;
//!     Ok(Element::host("button")
//!         .on("onClick", move || set_count.update(|n| n + 1))
//!         .child(count))
//! }
//!
//! let mut host = MemoryHost::new();
//! let container = host.create_container("root");
//! let mut engine = Engine::new(host);
//!
//! engine.render(Element::function(counter), container);
//! engine.flush()?;
//!
//! let button = engine.host().children(container)?[0];
//! engine.host().dispatch(button, "click")?;
//! engine.flush()?;
//! // The button now reads "1".
//! ```

pub mod element;
pub mod engine;
pub mod error;
pub mod fiber;
pub mod hooks;
pub mod host;

pub use element::{Child, Children, Component, Element, ElementKind, PropValue, Props};
pub use engine::{CommitReport, Engine, EngineConfig, LoopStatus, Phase};
pub use error::{EngineError, HookError, HostError, RenderError};
pub use hooks::{Hooks, StateSetter};
pub use host::{Host, MemoryHost, NodeRef};

/// Commonly used items.
pub mod prelude {
    pub use crate::element::{Child, Component, Element, EventHandler, PropValue, Props};
    pub use crate::engine::{
        Deadline, Engine, EngineConfig, FixedSlices, IdleProvider, LoopStatus, TimeBudget,
        UnitBudget, Unbounded,
    };
    pub use crate::error::{EngineError, RenderError};
    pub use crate::hooks::{Hooks, StateSetter};
    pub use crate::host::{Host, MemoryHost, NodeRef};
}
