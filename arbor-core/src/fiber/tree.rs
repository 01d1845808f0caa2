//! Work-Unit Arena
//!
//! A `FiberTree` owns every unit of one render pass. Units refer to each other
//! by [`UnitId`], so the tree has no reference cycles and the whole pass is
//! dropped at once when it is superseded.
//!
//! # Traversal Order
//!
//! ```text
//!     A
//!     ├── B
//!     │   ├── C
//!     │   │   └── D
//!     │   └── E
//!     └── F
//!         └── G
//!
//!     A -> B -> C -> D -> E -> F -> G
//! ```
//!
//! Prefer the first child; otherwise walk up the parent chain and take the
//! first sibling found. The walk ends when it climbs above the root.

use std::ops::{Index, IndexMut};
use std::rc::Rc;

use super::unit::{UnitId, WorkUnit};
use crate::element::Props;

/// Arena of work units for one render pass. The root is always the first unit.
#[derive(Debug)]
pub struct FiberTree<N> {
    units: Vec<WorkUnit<N>>,
}

impl<N> FiberTree<N> {
    /// Seed a pass whose root controls `container`.
    pub(crate) fn with_root(container: N, props: Rc<Props>, alternate: Option<UnitId>) -> Self {
        Self {
            units: vec![WorkUnit::root(container, props, alternate)],
        }
    }

    /// Id of the root unit.
    pub fn root(&self) -> UnitId {
        UnitId::from_index(0)
    }

    /// Look up a unit.
    pub fn get(&self, id: UnitId) -> Option<&WorkUnit<N>> {
        self.units.get(id.index())
    }

    /// Number of units in the arena.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the arena is empty. Never true for a seeded tree.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub(crate) fn push(&mut self, unit: WorkUnit<N>) -> UnitId {
        let id = UnitId::from_index(self.units.len());
        self.units.push(unit);
        id
    }

    /// Ids of the direct children of `id`, in sibling order.
    pub fn children(&self, id: UnitId) -> impl Iterator<Item = UnitId> + '_ {
        std::iter::successors(self[id].child, move |&c| self[c].sibling)
    }

    /// The unit performed after `id` in depth-first-with-siblings order.
    pub fn next_unit(&self, id: UnitId) -> Option<UnitId> {
        if let Some(child) = self[id].child {
            return Some(child);
        }

        let mut cursor = Some(id);
        while let Some(unit) = cursor {
            if let Some(sibling) = self[unit].sibling {
                return Some(sibling);
            }
            cursor = self[unit].parent;
        }
        None
    }

    /// Every unit reachable from the root, in traversal order.
    pub fn preorder(&self) -> impl Iterator<Item = UnitId> + '_ {
        std::iter::successors(Some(self.root()), move |&id| self.next_unit(id))
    }

    /// Host node of the nearest ancestor that has one.
    pub fn host_parent(&self, id: UnitId) -> Option<&N> {
        let mut cursor = self[id].parent;
        while let Some(parent) = cursor {
            if let Some(node) = &self[parent].host {
                return Some(node);
            }
            cursor = self[parent].parent;
        }
        None
    }

    /// The host node a placement of `id` must be inserted before.
    ///
    /// Searches later siblings (climbing through nodeless ancestors, stopping
    /// at the host parent) for the first host node that is already attached.
    /// Subtrees that are themselves being placed are skipped. `None` means
    /// append.
    pub fn host_sibling(&self, id: UnitId) -> Option<&N> {
        use super::EffectTag;

        let mut cursor = id;
        'siblings: loop {
            let sibling = loop {
                if let Some(sibling) = self[cursor].sibling {
                    break sibling;
                }
                let parent = self[cursor].parent?;
                if self[parent].host.is_some() {
                    return None;
                }
                cursor = parent;
            };

            cursor = sibling;
            loop {
                let unit = &self[cursor];
                if unit.effect == EffectTag::Placement {
                    continue 'siblings;
                }
                if let Some(node) = &unit.host {
                    return Some(node);
                }
                match unit.child {
                    Some(child) => cursor = child,
                    None => continue 'siblings,
                }
            }
        }
    }

    /// Outermost host nodes of the subtree rooted at `id`: the unit's own node,
    /// or the nearest node down each child chain for nodeless units.
    pub fn top_host_nodes(&self, id: UnitId) -> Vec<&N> {
        let mut found = Vec::new();
        let mut stack = vec![id];
        while let Some(unit) = stack.pop() {
            match &self[unit].host {
                Some(node) => found.push(node),
                None => {
                    let mut children: Vec<UnitId> = self.children(unit).collect();
                    children.reverse();
                    stack.extend(children);
                }
            }
        }
        found
    }

    /// Drop every `alternate` link; the arena they pointed into is gone.
    pub(crate) fn release_alternates(&mut self) {
        for unit in &mut self.units {
            unit.alternate = None;
        }
    }
}

impl<N> Index<UnitId> for FiberTree<N> {
    type Output = WorkUnit<N>;

    fn index(&self, id: UnitId) -> &Self::Output {
        &self.units[id.index()]
    }
}

impl<N> IndexMut<UnitId> for FiberTree<N> {
    fn index_mut(&mut self, id: UnitId) -> &mut Self::Output {
        &mut self.units[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use crate::fiber::EffectTag;

    /// Link `children` under `parent` in order.
    fn attach(tree: &mut FiberTree<u32>, parent: UnitId, children: &[UnitId]) {
        tree[parent].child = children.first().copied();
        for pair in children.windows(2) {
            tree[pair[0]].sibling = Some(pair[1]);
        }
        for &child in children {
            tree[child].parent = Some(parent);
        }
    }

    fn unit(tree: &mut FiberTree<u32>, tag: &str, host: Option<u32>) -> UnitId {
        let mut unit = WorkUnit::placement(&Element::host(tag), tree.root());
        unit.host = host;
        unit.effect = EffectTag::Update;
        tree.push(unit)
    }

    #[test]
    fn traversal_is_depth_first_with_siblings() {
        let mut tree = FiberTree::with_root(0, Rc::new(Props::new()), None);
        let root = tree.root();
        let b = unit(&mut tree, "b", None);
        let c = unit(&mut tree, "c", None);
        let d = unit(&mut tree, "d", None);
        let e = unit(&mut tree, "e", None);
        let f = unit(&mut tree, "f", None);
        attach(&mut tree, root, &[b, f]);
        attach(&mut tree, b, &[c, e]);
        attach(&mut tree, c, &[d]);

        let order: Vec<UnitId> = tree.preorder().collect();
        assert_eq!(order, vec![root, b, c, d, e, f]);
        assert_eq!(tree.next_unit(f), None);
    }

    #[test]
    fn host_parent_skips_nodeless_ancestors() {
        let mut tree = FiberTree::with_root(100, Rc::new(Props::new()), None);
        let root = tree.root();
        let fragment = unit(&mut tree, "fragment", None);
        let leaf = unit(&mut tree, "p", Some(1));
        attach(&mut tree, root, &[fragment]);
        attach(&mut tree, fragment, &[leaf]);

        assert_eq!(tree.host_parent(leaf), Some(&100));
        assert_eq!(tree.host_parent(root), None);
    }

    #[test]
    fn host_sibling_skips_placements_and_descends_into_nodeless_units() {
        let mut tree = FiberTree::with_root(100, Rc::new(Props::new()), None);
        let root = tree.root();
        let placed = unit(&mut tree, "a", Some(1));
        let fresh = unit(&mut tree, "b", Some(2));
        let wrapper = unit(&mut tree, "wrapper", None);
        let inner = unit(&mut tree, "c", Some(3));
        attach(&mut tree, root, &[placed, fresh, wrapper]);
        attach(&mut tree, wrapper, &[inner]);
        tree[fresh].effect = EffectTag::Placement;

        assert_eq!(tree.host_sibling(placed), Some(&3));
        assert_eq!(tree.host_sibling(inner), None);
    }

    #[test]
    fn top_host_nodes_of_nodeless_subtree() {
        let mut tree = FiberTree::with_root(100, Rc::new(Props::new()), None);
        let root = tree.root();
        let fragment = unit(&mut tree, "fragment", None);
        let x = unit(&mut tree, "x", Some(1));
        let y = unit(&mut tree, "y", Some(2));
        let nested = unit(&mut tree, "nested", Some(3));
        attach(&mut tree, root, &[fragment]);
        attach(&mut tree, fragment, &[x, y]);
        attach(&mut tree, x, &[nested]);

        assert_eq!(tree.top_host_nodes(fragment), vec![&1, &2]);
        assert_eq!(tree.top_host_nodes(x), vec![&1]);
    }
}
