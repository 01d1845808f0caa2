//! Commit Phase
//!
//! Applies a finished pass to the host in one synchronous walk:
//!
//! 1. Remove the host nodes of every unit recorded for deletion. These units
//!    live in the previously committed tree.
//! 2. Walk the new tree depth-first. Placements get their full attribute set
//!    and are inserted under their host parent; updates get an attribute diff.
//! 3. Promote the state staged by every function unit's render.
//!
//! The new tree then replaces the committed one. If the host rejects an
//! operation, the new tree is dropped and the committed tree stays the
//! baseline for the next pass.

use std::mem;

use serde::Serialize;
use tracing::{debug, trace};

use super::Engine;
use crate::element::{EventHandler, PropValue, Props};
use crate::error::{EngineError, HostError};
use crate::fiber::{EffectTag, FiberTree, UnitId};
use crate::host::{event_name, Host};

/// What one commit did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommitReport {
    /// Units committed with `Placement`.
    pub placements: usize,
    /// Units committed with `Update`.
    pub updates: usize,
    /// Units removed from the committed tree.
    pub deletions: usize,
    /// Host operations issued.
    pub host_ops: usize,
}

impl<H: Host> Engine<H> {
    /// Commit the finished work-in-progress tree.
    pub(super) fn commit_root(&mut self) -> Result<CommitReport, EngineError> {
        let deletions = mem::take(&mut self.deletions);
        self.next_unit = None;
        let Some(mut wip) = self.wip.take() else {
            return Ok(CommitReport::default());
        };

        let mut committer = Committer {
            host: &mut self.host,
            prefix: &self.config.event_prefix,
            report: CommitReport::default(),
        };
        let result = committer.commit(self.current.as_ref(), &mut wip, &deletions);
        let report = committer.report;

        if let Err(err) = result {
            if let Some(current) = self.current.as_mut() {
                for id in deletions {
                    current[id].effect = EffectTag::None;
                }
            }
            return Err(err);
        }

        for id in wip.preorder() {
            for record in &wip[id].hooks {
                record.commit();
            }
        }
        wip.release_alternates();
        self.current = Some(wip);

        debug!(
            placements = report.placements,
            updates = report.updates,
            deletions = report.deletions,
            host_ops = report.host_ops,
            "committed"
        );
        Ok(report)
    }
}

struct Committer<'a, H: Host> {
    host: &'a mut H,
    prefix: &'a str,
    report: CommitReport,
}

impl<H: Host> Committer<'_, H> {
    fn commit(
        &mut self,
        current: Option<&FiberTree<H::Node>>,
        wip: &mut FiberTree<H::Node>,
        deletions: &[UnitId],
    ) -> Result<(), EngineError> {
        if let Some(current) = current {
            for &id in deletions {
                self.delete(current, id)?;
            }
        }

        let order: Vec<UnitId> = wip.preorder().collect();
        for id in order {
            match wip[id].take_effect() {
                EffectTag::Placement => self.place(wip, id)?,
                EffectTag::Update => self.update(current, wip, id)?,
                EffectTag::None | EffectTag::Deletion => {}
            }
        }
        Ok(())
    }

    fn delete(&mut self, current: &FiberTree<H::Node>, id: UnitId) -> Result<(), EngineError> {
        let parent = current
            .host_parent(id)
            .ok_or(EngineError::DetachedUnit(id))?;
        for node in current.top_host_nodes(id) {
            self.op(|host| host.remove_child(parent, node))?;
        }
        trace!(unit = %id, "deleted");
        self.report.deletions += 1;
        Ok(())
    }

    fn place(&mut self, wip: &FiberTree<H::Node>, id: UnitId) -> Result<(), EngineError> {
        self.report.placements += 1;
        let Some(node) = wip[id].host_node() else {
            return Ok(());
        };

        self.diff_props(node, &Props::default(), wip[id].props())?;

        let parent = wip.host_parent(id).ok_or(EngineError::DetachedUnit(id))?;
        match wip.host_sibling(id) {
            Some(anchor) => self.op(|host| host.insert_before(parent, node, anchor))?,
            None => self.op(|host| host.append_child(parent, node))?,
        }
        trace!(unit = %id, "placed");
        Ok(())
    }

    fn update(
        &mut self,
        current: Option<&FiberTree<H::Node>>,
        wip: &FiberTree<H::Node>,
        id: UnitId,
    ) -> Result<(), EngineError> {
        self.report.updates += 1;
        let unit = &wip[id];
        let (Some(node), Some(previous)) = (
            unit.host_node(),
            unit.alternate().zip(current).map(|(alternate, tree)| tree[alternate].props()),
        ) else {
            return Ok(());
        };
        if !std::ptr::eq(previous, unit.props()) {
            self.diff_props(node, previous, unit.props())?;
        }
        Ok(())
    }

    /// Bring `node` from `previous` to `next`, touching only what changed.
    fn diff_props(&mut self, node: &H::Node, previous: &Props, next: &Props) -> Result<(), EngineError> {
        for (name, old) in previous.attrs() {
            let new = next.get(name);
            if let Some((event, handler)) = self.as_event(name, old) {
                if new != Some(old) {
                    self.op(|host| host.remove_event_listener(node, &event, handler))?;
                }
            } else if new.map_or(true, |value| self.as_event(name, value).is_some()) {
                self.op(|host| host.remove_property(node, name))?;
            }
        }

        for (name, value) in next.attrs() {
            if previous.get(name) == Some(value) {
                continue;
            }
            match self.as_event(name, value) {
                Some((event, handler)) => {
                    self.op(|host| host.add_event_listener(node, &event, handler))?
                }
                None => self.op(|host| host.set_property(node, name, value))?,
            }
        }

        let text = next.children().text_content();
        if text != previous.children().text_content() {
            self.op(|host| host.set_text_content(node, text.as_deref().unwrap_or_default()))?;
        }
        Ok(())
    }

    fn as_event<'v>(&self, name: &str, value: &'v PropValue) -> Option<(String, &'v EventHandler)> {
        let handler = value.as_handler()?;
        Some((event_name(name, self.prefix)?, handler))
    }

    fn op<F>(&mut self, f: F) -> Result<(), EngineError>
    where
        F: FnOnce(&mut H) -> Result<(), HostError>,
    {
        self.report.host_ops += 1;
        f(&mut *self.host)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::element::Element;
    use crate::engine::Engine;
    use crate::host::{MemoryHost, NodeRef};

    fn mounted(element: Element) -> (Engine<MemoryHost>, NodeRef) {
        let mut host = MemoryHost::new();
        let root = host.create_container("root");
        let mut engine = Engine::new(host);
        engine.render(element, root);
        engine.flush().unwrap();
        (engine, root)
    }

    fn first_child(engine: &Engine<MemoryHost>, node: NodeRef) -> NodeRef {
        engine.host().children(node).unwrap()[0]
    }

    #[test]
    fn placement_applies_attributes_text_and_listeners() {
        let (engine, root) = mounted(
            Element::host("button")
                .attr("id", "go")
                .on("onClick", || {})
                .child("Go ")
                .child(1_i32),
        );

        let button = first_child(&engine, root);
        let host = engine.host();
        assert_eq!(host.tag(button).unwrap(), "button");
        assert_eq!(host.property(button, "id").unwrap().map(ToString::to_string).as_deref(), Some("go"));
        assert_eq!(host.listener_count(button, "click").unwrap(), 1);
        assert_eq!(host.text(button).unwrap(), "Go 1");
        assert!(host.property(button, "onClick").unwrap().is_none());
    }

    #[test]
    fn update_diffs_attributes() {
        let (mut engine, root) = mounted(Element::host("p").attr("a", 1_i32).attr("b", "x").child("old"));
        let p = first_child(&engine, root);
        let before = engine.host().mutation_count();

        engine.render(Element::host("p").attr("a", 1_i32).attr("c", true).child("new"), root);
        let report = engine.flush().unwrap().unwrap();

        let host = engine.host();
        assert_eq!(first_child(&engine, root), p);
        assert!(host.property(p, "b").unwrap().is_none());
        assert_eq!(host.property(p, "c").unwrap().map(ToString::to_string).as_deref(), Some("true"));
        assert_eq!(host.text(p).unwrap(), "new");
        // remove b, set c, set text
        assert_eq!(host.mutation_count() - before, 3);
        assert_eq!(report.host_ops, 3);
        assert_eq!(report.updates, 1);
    }

    #[test]
    fn changed_handler_is_swapped() {
        let hits = Rc::new(Cell::new(0));
        let (mut engine, root) = mounted(Element::host("button").on("onClick", || {}));
        let button = first_child(&engine, root);

        let counter = Rc::clone(&hits);
        engine.render(
            Element::host("button").on("onClick", move || counter.set(counter.get() + 1)),
            root,
        );
        engine.flush().unwrap();

        assert_eq!(engine.host().listener_count(button, "click").unwrap(), 1);
        engine.host().dispatch(button, "click").unwrap();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn removed_text_is_cleared() {
        let (mut engine, root) = mounted(Element::host("p").child("hello"));
        let p = first_child(&engine, root);

        engine.render(Element::host("p"), root);
        engine.flush().unwrap();
        assert_eq!(engine.host().text(p).unwrap(), "");
    }

    #[test]
    fn replacement_keeps_position_between_siblings() {
        let (mut engine, root) = mounted(Element::fragment([
            Element::host("a"),
            Element::host("b"),
            Element::host("c"),
        ]));

        engine.render(
            Element::fragment([Element::host("a"), Element::host("x"), Element::host("c")]),
            root,
        );
        let report = engine.flush().unwrap().unwrap();
        assert_eq!((report.placements, report.updates, report.deletions), (1, 3, 1));

        let host = engine.host();
        let tags: Vec<&str> = host
            .children(root)
            .unwrap()
            .iter()
            .map(|&n| host.tag(n).unwrap())
            .collect();
        assert_eq!(tags, vec!["a", "x", "c"]);
    }
}
