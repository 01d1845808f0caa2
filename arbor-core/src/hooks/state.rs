//! State Hook
//!
//! A state cell persists across renders of one tree position. Updates are
//! queued, folded over the committed value during render, and only drained
//! from the queue once the pass that consumed them commits. A pass that is
//! discarded before commit therefore loses no updates.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::warn;

use super::{HookRecord, RenderRequests};

/// A queued state update.
pub enum StateAction<T> {
    /// Replace the state with this value.
    Replace(T),
    /// Compute the next state from the previous one.
    Update(Rc<dyn Fn(&T) -> T>),
}

impl<T: Clone> StateAction<T> {
    /// Apply this action to `state`.
    pub fn apply(&self, state: T) -> T {
        match self {
            Self::Replace(value) => value.clone(),
            Self::Update(f) => f(&state),
        }
    }
}

impl<T: Clone> Clone for StateAction<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Replace(value) => Self::Replace(value.clone()),
            Self::Update(f) => Self::Update(Rc::clone(f)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for StateAction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace(value) => f.debug_tuple("Replace").field(value).finish(),
            Self::Update(_) => f.write_str("Update(..)"),
        }
    }
}

/// Storage behind one `use_state` call site.
pub(crate) struct StateCell<T> {
    committed: RefCell<T>,
    queue: RefCell<Vec<StateAction<T>>>,
    /// Value computed by the latest render and how many queued actions it consumed.
    staged: RefCell<Option<(T, usize)>>,
}

impl<T: Clone + 'static> StateCell<T> {
    pub(crate) fn new(initial: T) -> Self {
        Self {
            committed: RefCell::new(initial),
            queue: RefCell::new(Vec::new()),
            staged: RefCell::new(None),
        }
    }

    /// Fold pending actions over the committed value and stage the result.
    pub(crate) fn render(&self) -> T {
        let pending: Vec<StateAction<T>> = self.queue.borrow().clone();
        let mut state = self.committed.borrow().clone();
        for action in &pending {
            state = action.apply(state);
        }
        *self.staged.borrow_mut() = Some((state.clone(), pending.len()));
        state
    }

    fn enqueue(&self, action: StateAction<T>) {
        self.queue.borrow_mut().push(action);
    }

    pub(crate) fn pending(&self) -> usize {
        self.queue.borrow().len()
    }
}

impl<T: 'static> HookRecord for StateCell<T> {
    fn commit(&self) {
        if let Some((value, consumed)) = self.staged.borrow_mut().take() {
            *self.committed.borrow_mut() = value;
            let mut queue = self.queue.borrow_mut();
            let consumed = consumed.min(queue.len());
            queue.drain(..consumed);
        }
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// Updater returned by [`Hooks::use_state`](super::Hooks::use_state).
///
/// Every update requests a new render pass seeded from the last committed
/// tree. Setters outlive nothing: once their component is unmounted, updates
/// are dropped.
pub struct StateSetter<T> {
    cell: Weak<StateCell<T>>,
    requests: RenderRequests,
}

impl<T: Clone + 'static> StateSetter<T> {
    pub(crate) fn new(cell: &Rc<StateCell<T>>, requests: RenderRequests) -> Self {
        Self {
            cell: Rc::downgrade(cell),
            requests,
        }
    }

    /// Replace the state.
    pub fn set(&self, value: T) {
        self.dispatch(StateAction::Replace(value));
    }

    /// Derive the next state from the previous one.
    pub fn update<F>(&self, f: F)
    where
        F: Fn(&T) -> T + 'static,
    {
        self.dispatch(StateAction::Update(Rc::new(f)));
    }

    /// Queue an action and request a render.
    ///
    /// Returns `false` when the component is no longer mounted.
    pub fn dispatch(&self, action: StateAction<T>) -> bool {
        match self.cell.upgrade() {
            Some(cell) => {
                cell.enqueue(action);
                self.requests.request();
                true
            }
            None => {
                warn!("state update dropped: component is no longer mounted");
                false
            }
        }
    }
}

impl<T> Clone for StateSetter<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Weak::clone(&self.cell),
            requests: self.requests.clone(),
        }
    }
}

impl<T> fmt::Debug for StateSetter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateSetter")
            .field("mounted", &(self.cell.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_apply_in_arrival_order() {
        let cell = Rc::new(StateCell::new(1));
        let requests = RenderRequests::default();
        let setter = StateSetter::new(&cell, requests.clone());

        setter.update(|n| n * 10);
        setter.set(5);
        setter.update(|n| n + 1);

        assert_eq!(cell.render(), 6);
        assert_eq!(requests.pending(), 3);
    }

    #[test]
    fn commit_drains_only_consumed_actions() {
        let cell = Rc::new(StateCell::new(0));
        let setter = StateSetter::new(&cell, RenderRequests::default());

        setter.update(|n| n + 1);
        assert_eq!(cell.render(), 1);
        setter.update(|n| n + 1);
        cell.commit();

        assert_eq!(cell.pending(), 1);
        assert_eq!(cell.render(), 2);
    }

    #[test]
    fn uncommitted_render_keeps_the_queue() {
        let cell = Rc::new(StateCell::new(0));
        let setter = StateSetter::new(&cell, RenderRequests::default());

        setter.update(|n| n + 1);
        setter.update(|n| n + 1);
        assert_eq!(cell.render(), 2);
        // A second render without a commit in between starts from the same baseline.
        assert_eq!(cell.render(), 2);
        cell.commit();
        assert_eq!(cell.pending(), 0);
        assert_eq!(cell.render(), 2);
    }

    #[test]
    fn setter_after_unmount_is_a_no_op() {
        let cell = Rc::new(StateCell::new(0));
        let requests = RenderRequests::default();
        let setter = StateSetter::new(&cell, requests.clone());
        drop(cell);

        assert!(!setter.dispatch(StateAction::Replace(3)));
        assert_eq!(requests.pending(), 0);
    }
}
