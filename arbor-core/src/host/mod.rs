//! Host Interface
//!
//! The engine never touches a platform UI tree directly. Everything it needs
//! from the host is expressed by the [`Host`] trait; the committer is the only
//! caller, and it only calls in while committing a finished pass.
//!
//! [`MemoryHost`] is an in-memory implementation that records the node tree
//! it is asked to build. It backs the test suite and headless use.

mod memory;

pub use memory::{HostSnapshot, MemoryHost, NodeRef};

use std::fmt;

use crate::element::{EventHandler, PropValue};
use crate::error::HostError;

/// Operations the engine consumes from the host platform.
///
/// Every operation is fallible. A failure aborts the commit in progress and
/// is returned to the caller of the engine unchanged.
pub trait Host {
    /// Handle to a live host node.
    type Node: Clone + PartialEq + fmt::Debug;

    /// Create a detached node for `tag`.
    fn create_node(&mut self, tag: &str) -> Result<Self::Node, HostError>;

    /// Append `child` as the last child of `parent`.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), HostError>;

    /// Insert `child` under `parent` right before `anchor`.
    fn insert_before(
        &mut self,
        parent: &Self::Node,
        child: &Self::Node,
        anchor: &Self::Node,
    ) -> Result<(), HostError>;

    /// Detach `child` from `parent`.
    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), HostError>;

    /// Set a plain attribute.
    fn set_property(
        &mut self,
        node: &Self::Node,
        name: &str,
        value: &PropValue,
    ) -> Result<(), HostError>;

    /// Clear a plain attribute.
    fn remove_property(&mut self, node: &Self::Node, name: &str) -> Result<(), HostError>;

    /// Attach `handler` for `event` (already stripped of its prefix and lower-cased).
    fn add_event_listener(
        &mut self,
        node: &Self::Node,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError>;

    /// Detach a handler previously attached with [`add_event_listener`](Self::add_event_listener).
    fn remove_event_listener(
        &mut self,
        node: &Self::Node,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError>;

    /// Replace the text content of `node`.
    fn set_text_content(&mut self, node: &Self::Node, text: &str) -> Result<(), HostError>;
}

/// Event name for an attribute key, if the key is event-shaped.
///
/// `onClick` with prefix `on` becomes `click`. A key that is exactly the
/// prefix is not an event.
pub fn event_name(key: &str, prefix: &str) -> Option<String> {
    key.strip_prefix(prefix)
        .filter(|rest| !rest.is_empty())
        .map(str::to_lowercase)
}
