//! Child Reconciliation
//!
//! Pairs the new child elements of a unit with the children of its alternate
//! strictly by position. At each index:
//!
//! - same kind: continue the old unit (`Update`, host node reused)
//! - new element, no matching old unit: create (`Placement`)
//! - old unit with no matching new element: mark it `Deletion` and record it
//!
//! A kind change at an index produces both a `Placement` and a `Deletion`.
//! Keys are carried along but never used to reorder.

use tracing::trace;

use super::tree::FiberTree;
use super::unit::{EffectTag, UnitId, WorkUnit};
use crate::element::Children;

/// Effects produced by one reconciliation step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// New units tagged `Placement`.
    pub placed: usize,
    /// New units tagged `Update`.
    pub updated: usize,
    /// Old units tagged `Deletion`.
    pub deleted: usize,
}

/// Rebuild the child list of `parent` from `children`.
///
/// `current` is the previously committed tree that `parent`'s alternate lives
/// in. Old units that lose their position are marked there and appended to
/// `deletions`; they are never linked into `wip`.
pub(crate) fn reconcile_children<N: Clone>(
    wip: &mut FiberTree<N>,
    mut current: Option<&mut FiberTree<N>>,
    parent: UnitId,
    children: &Children,
    deletions: &mut Vec<UnitId>,
) -> ReconcileSummary {
    let mut summary = ReconcileSummary::default();

    let mut old = match (wip[parent].alternate, current.as_deref()) {
        (Some(alternate), Some(committed)) => committed[alternate].child,
        _ => None,
    };

    wip[parent].child = None;
    let mut elements = children.elements();
    let mut previous: Option<UnitId> = None;

    loop {
        let element = elements.next();
        if element.is_none() && old.is_none() {
            break;
        }

        let mut next_old = None;
        let mut reused = None;
        if let (Some(old_id), Some(committed)) = (old, current.as_deref()) {
            let old_unit = &committed[old_id];
            next_old = old_unit.sibling;
            if element.is_some_and(|e| old_unit.kind.matches(e.kind())) {
                reused = Some((old_id, old_unit.host.clone()));
            }
        }

        let new_id = element.map(|element| {
            let unit = match reused.take() {
                Some((alternate, host)) => {
                    summary.updated += 1;
                    WorkUnit::update(element, parent, alternate, host)
                }
                None => {
                    summary.placed += 1;
                    WorkUnit::placement(element, parent)
                }
            };
            wip.push(unit)
        });

        let kept_old = new_id.is_some_and(|id| wip[id].effect == EffectTag::Update);
        if !kept_old {
            if let (Some(old_id), Some(committed)) = (old, current.as_deref_mut()) {
                trace!(unit = %old_id, kind = committed[old_id].kind.label(), "deletion");
                committed[old_id].effect = EffectTag::Deletion;
                deletions.push(old_id);
                summary.deleted += 1;
            }
        }

        if let Some(id) = new_id {
            match previous {
                None => wip[parent].child = Some(id),
                Some(prev) => wip[prev].sibling = Some(id),
            }
            previous = Some(id);
        }

        old = next_old;
    }

    trace!(
        parent = %parent,
        placed = summary.placed,
        updated = summary.updated,
        deleted = summary.deleted,
        "reconciled children"
    );
    summary
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::element::{Child, Element, Props};

    fn seeded(children: Children) -> FiberTree<u32> {
        let mut props = Props::new();
        *props.children_mut() = children;
        FiberTree::with_root(0, Rc::new(props), None)
    }

    /// Build a committed tree holding `children` under the root.
    fn committed(children: &[Element]) -> FiberTree<u32> {
        let mut tree = seeded(Children::new());
        let root = tree.root();
        let mut deletions = Vec::new();
        let children: Children = children.iter().cloned().collect();
        reconcile_children(&mut tree, None, root, &children, &mut deletions);
        let ids: Vec<UnitId> = tree.children(root).collect();
        for (n, id) in ids.into_iter().enumerate() {
            tree[id].host = Some(n as u32 + 1);
            tree[id].effect = EffectTag::None;
        }
        tree
    }

    fn next_pass(old: &FiberTree<u32>) -> FiberTree<u32> {
        FiberTree::with_root(0, Rc::new(Props::new()), Some(old.root()))
    }

    #[test]
    fn first_pass_places_every_element() {
        let mut tree = seeded(Children::new());
        let root = tree.root();
        let children: Children = [Element::host("a"), Element::host("b")].into_iter().collect();
        let mut deletions = Vec::new();

        let summary = reconcile_children(&mut tree, None, root, &children, &mut deletions);

        assert_eq!(summary.placed, 2);
        assert!(deletions.is_empty());
        let kids: Vec<UnitId> = tree.children(root).collect();
        assert_eq!(kids.len(), 2);
        assert!(kids.iter().all(|&id| tree[id].effect == EffectTag::Placement));
        assert!(kids.iter().all(|&id| tree[id].parent == Some(root)));
    }

    #[test]
    fn text_children_do_not_become_units() {
        let mut tree = seeded(Children::new());
        let root = tree.root();
        let children: Children = vec![
            Child::from("hello"),
            Child::from(Element::host("b")),
            Child::from(4_i32),
        ]
        .into_iter()
        .collect();
        let mut deletions = Vec::new();

        reconcile_children(&mut tree, None, root, &children, &mut deletions);

        assert_eq!(tree.children(root).count(), 1);
    }

    #[test]
    fn same_kind_at_same_position_updates_and_reuses_host() {
        let mut old = committed(&[Element::host("a"), Element::host("b")]);
        let mut wip = next_pass(&old);
        let root = wip.root();
        let children: Children = [Element::host("a"), Element::host("b")].into_iter().collect();
        let mut deletions = Vec::new();

        let summary = reconcile_children(&mut wip, Some(&mut old), root, &children, &mut deletions);

        assert_eq!(summary, ReconcileSummary { placed: 0, updated: 2, deleted: 0 });
        let hosts: Vec<Option<u32>> = wip.children(root).map(|id| wip[id].host).collect();
        assert_eq!(hosts, vec![Some(1), Some(2)]);
    }

    #[test]
    fn kind_change_places_and_deletes() {
        let mut old = committed(&[Element::host("a"), Element::host("b")]);
        let mut wip = next_pass(&old);
        let root = wip.root();
        let children: Children = [Element::host("a"), Element::host("p")].into_iter().collect();
        let mut deletions = Vec::new();

        let summary = reconcile_children(&mut wip, Some(&mut old), root, &children, &mut deletions);

        assert_eq!(summary, ReconcileSummary { placed: 1, updated: 1, deleted: 1 });
        assert_eq!(deletions.len(), 1);
        assert_eq!(old[deletions[0]].effect, EffectTag::Deletion);
        let second = wip.children(root).nth(1).unwrap();
        assert_eq!(wip[second].effect, EffectTag::Placement);
        assert_eq!(wip[second].host, None);
    }

    #[test]
    fn surplus_old_children_are_deleted() {
        let mut old = committed(&[Element::host("a"), Element::host("b"), Element::host("c")]);
        let mut wip = next_pass(&old);
        let root = wip.root();
        let children = Children::single(Element::host("a"));
        let mut deletions = Vec::new();

        let summary = reconcile_children(&mut wip, Some(&mut old), root, &children, &mut deletions);

        assert_eq!(summary, ReconcileSummary { placed: 0, updated: 1, deleted: 2 });
        let deleted_hosts: Vec<Option<u32>> = deletions.iter().map(|&id| old[id].host).collect();
        assert_eq!(deleted_hosts, vec![Some(2), Some(3)]);
        assert_eq!(wip.children(root).count(), 1);
    }

    #[test]
    fn emptied_children_clear_first_child() {
        let mut old = committed(&[Element::host("a")]);
        let mut wip = next_pass(&old);
        let root = wip.root();
        let mut deletions = Vec::new();

        reconcile_children(&mut wip, Some(&mut old), root, &Children::new(), &mut deletions);

        assert_eq!(wip[root].child, None);
        assert_eq!(deletions.len(), 1);
    }
}
