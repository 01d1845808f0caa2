//! In-Memory Host
//!
//! Nodes live in an arena and are addressed by [`NodeRef`]. Nodes are never
//! freed; a removed node simply has no parent any more.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::Host;
use crate::element::{EventHandler, PropValue};
use crate::error::HostError;

/// Handle to a node owned by a [`MemoryHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(u32);

impl NodeRef {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

#[derive(Debug)]
struct MemoryNode {
    tag: String,
    properties: IndexMap<String, PropValue>,
    listeners: IndexMap<String, Vec<EventHandler>>,
    text: String,
    children: Vec<NodeRef>,
    parent: Option<NodeRef>,
}

impl MemoryNode {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            properties: IndexMap::new(),
            listeners: IndexMap::new(),
            text: String::new(),
            children: Vec::new(),
            parent: None,
        }
    }
}

/// Structural copy of a host subtree, for comparison and debugging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostSnapshot {
    /// Node tag.
    pub tag: String,
    /// Plain attributes, rendered as strings.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, String>,
    /// Events with at least one listener attached.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub listeners: Vec<String>,
    /// Text content, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Child nodes in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<HostSnapshot>,
}

impl HostSnapshot {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// A [`Host`] that builds its node tree in memory.
#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: Vec<MemoryNode>,
    mutations: usize,
}

impl MemoryHost {
    /// Empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a root node to render into. Not counted as a mutation.
    pub fn create_container(&mut self, tag: &str) -> NodeRef {
        self.alloc(tag)
    }

    /// Number of mutating host operations performed so far.
    pub fn mutation_count(&self) -> usize {
        self.mutations
    }

    /// Number of nodes ever created, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Tag of a node.
    pub fn tag(&self, node: NodeRef) -> Result<&str, HostError> {
        Ok(&self.node(node)?.tag)
    }

    /// Children of a node, in order.
    pub fn children(&self, node: NodeRef) -> Result<&[NodeRef], HostError> {
        Ok(&self.node(node)?.children)
    }

    /// Parent of a node, if attached.
    pub fn parent(&self, node: NodeRef) -> Result<Option<NodeRef>, HostError> {
        Ok(self.node(node)?.parent)
    }

    /// Current value of a plain attribute.
    pub fn property(&self, node: NodeRef, name: &str) -> Result<Option<&PropValue>, HostError> {
        Ok(self.node(node)?.properties.get(name))
    }

    /// Current text content.
    pub fn text(&self, node: NodeRef) -> Result<&str, HostError> {
        Ok(&self.node(node)?.text)
    }

    /// Number of handlers attached for `event`.
    pub fn listener_count(&self, node: NodeRef, event: &str) -> Result<usize, HostError> {
        Ok(self.node(node)?.listeners.get(event).map_or(0, Vec::len))
    }

    /// Invoke every handler attached to `node` for `event`.
    ///
    /// Returns how many handlers ran.
    pub fn dispatch(&self, node: NodeRef, event: &str) -> Result<usize, HostError> {
        let handlers = self
            .node(node)?
            .listeners
            .get(event)
            .cloned()
            .unwrap_or_default();
        trace!(node = %node, event, handlers = handlers.len(), "dispatch");
        for handler in &handlers {
            handler.call();
        }
        Ok(handlers.len())
    }

    /// Structural copy of the subtree under `node`.
    pub fn snapshot(&self, node: NodeRef) -> Result<HostSnapshot, HostError> {
        let data = self.node(node)?;
        let children = data
            .children
            .iter()
            .map(|&child| self.snapshot(child))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(HostSnapshot {
            tag: data.tag.clone(),
            properties: data
                .properties
                .iter()
                .map(|(name, value)| (name.clone(), value.to_string()))
                .collect(),
            listeners: data
                .listeners
                .iter()
                .filter(|(_, handlers)| !handlers.is_empty())
                .map(|(event, _)| event.clone())
                .collect(),
            text: (!data.text.is_empty()).then(|| data.text.clone()),
            children,
        })
    }

    fn alloc(&mut self, tag: &str) -> NodeRef {
        let node = NodeRef(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(MemoryNode::new(tag));
        node
    }

    fn node(&self, node: NodeRef) -> Result<&MemoryNode, HostError> {
        self.nodes
            .get(node.index())
            .ok_or_else(|| HostError::UnknownNode(node.to_string()))
    }

    fn node_mut(&mut self, node: NodeRef) -> Result<&mut MemoryNode, HostError> {
        self.mutations += 1;
        self.nodes
            .get_mut(node.index())
            .ok_or_else(|| HostError::UnknownNode(node.to_string()))
    }

    fn position(&self, parent: NodeRef, child: NodeRef) -> Result<usize, HostError> {
        self.node(parent)?
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or_else(|| HostError::NotAChild {
                parent: parent.to_string(),
                child: child.to_string(),
            })
    }

    /// Unlink `child` from whatever parent it currently has.
    fn detach(&mut self, child: NodeRef) -> Result<(), HostError> {
        if let Some(old_parent) = self.node(child)?.parent {
            let index = self.position(old_parent, child)?;
            self.nodes[old_parent.index()].children.remove(index);
            self.nodes[child.index()].parent = None;
        }
        Ok(())
    }

    fn insert_at(&mut self, parent: NodeRef, child: NodeRef, index: Option<usize>) -> Result<(), HostError> {
        if parent == child {
            return Err(HostError::Rejected(format!("cannot insert {child} into itself")));
        }
        self.node(parent)?;
        self.detach(child)?;
        let children = &mut self.node_mut(parent)?.children;
        match index {
            Some(index) => children.insert(index, child),
            None => children.push(child),
        }
        self.nodes[child.index()].parent = Some(parent);
        Ok(())
    }
}

impl Host for MemoryHost {
    type Node = NodeRef;

    fn create_node(&mut self, tag: &str) -> Result<NodeRef, HostError> {
        self.mutations += 1;
        let node = self.alloc(tag);
        trace!(node = %node, tag, "create_node");
        Ok(node)
    }

    fn append_child(&mut self, parent: &NodeRef, child: &NodeRef) -> Result<(), HostError> {
        trace!(parent = %parent, child = %child, "append_child");
        self.insert_at(*parent, *child, None)
    }

    fn insert_before(
        &mut self,
        parent: &NodeRef,
        child: &NodeRef,
        anchor: &NodeRef,
    ) -> Result<(), HostError> {
        trace!(parent = %parent, child = %child, anchor = %anchor, "insert_before");
        self.position(*parent, *anchor)?;
        self.node(*child)?;
        self.detach(*child)?;
        // Detaching may have shifted the anchor.
        let index = self.position(*parent, *anchor)?;
        self.insert_at(*parent, *child, Some(index))
    }

    fn remove_child(&mut self, parent: &NodeRef, child: &NodeRef) -> Result<(), HostError> {
        trace!(parent = %parent, child = %child, "remove_child");
        let index = self.position(*parent, *child)?;
        self.node_mut(*parent)?.children.remove(index);
        self.nodes[child.index()].parent = None;
        Ok(())
    }

    fn set_property(&mut self, node: &NodeRef, name: &str, value: &PropValue) -> Result<(), HostError> {
        trace!(node = %node, name, %value, "set_property");
        self.node_mut(*node)?
            .properties
            .insert(name.to_string(), value.clone());
        Ok(())
    }

    fn remove_property(&mut self, node: &NodeRef, name: &str) -> Result<(), HostError> {
        trace!(node = %node, name, "remove_property");
        self.node_mut(*node)?.properties.shift_remove(name);
        Ok(())
    }

    fn add_event_listener(
        &mut self,
        node: &NodeRef,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError> {
        trace!(node = %node, event, "add_event_listener");
        self.node_mut(*node)?
            .listeners
            .entry(event.to_string())
            .or_default()
            .push(handler.clone());
        Ok(())
    }

    fn remove_event_listener(
        &mut self,
        node: &NodeRef,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError> {
        trace!(node = %node, event, "remove_event_listener");
        if let Some(handlers) = self.node_mut(*node)?.listeners.get_mut(event) {
            handlers.retain(|h| !h.ptr_eq(handler));
        }
        Ok(())
    }

    fn set_text_content(&mut self, node: &NodeRef, text: &str) -> Result<(), HostError> {
        trace!(node = %node, text, "set_text_content");
        self.node_mut(*node)?.text = text.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn append_insert_and_remove_keep_order() {
        let mut host = MemoryHost::new();
        let root = host.create_container("root");
        let a = host.create_node("a").unwrap();
        let b = host.create_node("b").unwrap();
        let c = host.create_node("c").unwrap();

        host.append_child(&root, &a).unwrap();
        host.append_child(&root, &c).unwrap();
        host.insert_before(&root, &b, &c).unwrap();
        assert_eq!(host.children(root).unwrap(), &[a, b, c]);

        host.remove_child(&root, &a).unwrap();
        assert_eq!(host.children(root).unwrap(), &[b, c]);
        assert_eq!(host.parent(a).unwrap(), None);
    }

    #[test]
    fn reattaching_moves_the_node() {
        let mut host = MemoryHost::new();
        let root = host.create_container("root");
        let a = host.create_node("a").unwrap();
        let b = host.create_node("b").unwrap();
        host.append_child(&root, &a).unwrap();
        host.append_child(&root, &b).unwrap();

        host.insert_before(&root, &b, &a).unwrap();
        assert_eq!(host.children(root).unwrap(), &[b, a]);
    }

    #[test]
    fn removing_a_stranger_is_an_error() {
        let mut host = MemoryHost::new();
        let root = host.create_container("root");
        let a = host.create_node("a").unwrap();

        let err = host.remove_child(&root, &a).unwrap_err();
        assert!(matches!(err, HostError::NotAChild { .. }));
        assert!(matches!(
            host.append_child(&NodeRef(99), &a),
            Err(HostError::UnknownNode(_))
        ));
    }

    #[test]
    fn dispatch_runs_attached_handlers() {
        let mut host = MemoryHost::new();
        let button = host.create_node("button").unwrap();
        let clicks = Rc::new(Cell::new(0));
        let handler = {
            let clicks = Rc::clone(&clicks);
            EventHandler::new(move || clicks.set(clicks.get() + 1))
        };

        host.add_event_listener(&button, "click", &handler).unwrap();
        assert_eq!(host.dispatch(button, "click").unwrap(), 1);
        assert_eq!(host.dispatch(button, "hover").unwrap(), 0);

        host.remove_event_listener(&button, "click", &handler).unwrap();
        host.dispatch(button, "click").unwrap();
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn snapshot_serializes_structure() {
        let mut host = MemoryHost::new();
        let root = host.create_container("root");
        let p = host.create_node("p").unwrap();
        host.set_property(&p, "id", &PropValue::from("intro")).unwrap();
        host.set_text_content(&p, "hi").unwrap();
        host.append_child(&root, &p).unwrap();

        let snapshot = host.snapshot(root).unwrap();
        assert_eq!(snapshot.children[0].properties["id"], "intro");
        assert_eq!(snapshot.children[0].text.as_deref(), Some("hi"));

        let json: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(json["children"][0]["tag"], "p");
        assert!(json.get("properties").is_none());
    }

    #[test]
    fn mutations_are_counted() {
        let mut host = MemoryHost::new();
        let root = host.create_container("root");
        assert_eq!(host.mutation_count(), 0);

        let p = host.create_node("p").unwrap();
        host.append_child(&root, &p).unwrap();
        assert_eq!(host.mutation_count(), 2);
    }
}
