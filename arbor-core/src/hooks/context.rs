//! Hook Context
//!
//! `Hooks` is handed to a function component while its own work unit is being
//! rendered. Hook records are addressed by call order: the n-th hook call of a
//! render picks up the n-th record of the unit's alternate.
//!
//! # Caller Obligation
//!
//! Hook calls must not be skipped conditionally. The engine detects a changed
//! hook kind at a position ([`HookError::KindMismatch`]) and a changed hook
//! count ([`HookError::CountMismatch`]), but it cannot detect two swapped
//! hooks of the same type.

use std::any::type_name;
use std::rc::Rc;

use super::state::{StateCell, StateSetter};
use super::{HookList, HookRecord, RenderRequests};
use crate::error::HookError;

/// Hook store of the function unit currently being rendered.
pub struct Hooks<'a> {
    /// Records of the alternate, in call order; `None` on a unit's first render.
    previous: Option<&'a [Rc<dyn HookRecord>]>,
    /// Records produced by this render, in call order.
    records: HookList,
    requests: &'a RenderRequests,
}

impl<'a> Hooks<'a> {
    pub(crate) fn new(
        previous: Option<&'a [Rc<dyn HookRecord>]>,
        requests: &'a RenderRequests,
    ) -> Self {
        Self {
            previous,
            records: HookList::new(),
            requests,
        }
    }

    /// Position the next hook call will occupy.
    pub fn cursor(&self) -> usize {
        self.records.len()
    }

    /// Number of hooks the previous render of this position called.
    pub fn previous_count(&self) -> usize {
        self.previous.map_or(0, <[_]>::len)
    }

    /// State that persists across renders of this position.
    ///
    /// Returns the current value (pending updates applied in arrival order)
    /// and an updater. `initial` is only used on the first render.
    pub fn use_state<T>(&mut self, initial: T) -> Result<(T, StateSetter<T>), HookError>
    where
        T: Clone + 'static,
    {
        self.use_state_with(move || initial)
    }

    /// Like [`use_state`](Self::use_state), computing the initial value lazily.
    pub fn use_state_with<T, F>(&mut self, init: F) -> Result<(T, StateSetter<T>), HookError>
    where
        T: Clone + 'static,
        F: FnOnce() -> T,
    {
        let index = self.cursor();
        let cell: Rc<StateCell<T>> = match self.previous.and_then(|records| records.get(index)) {
            Some(record) => Rc::clone(record)
                .into_any()
                .downcast::<StateCell<T>>()
                .map_err(|_| HookError::KindMismatch {
                    index,
                    expected: type_name::<T>(),
                })?,
            None => Rc::new(StateCell::new(init())),
        };

        let state = cell.render();
        let setter = StateSetter::new(&cell, self.requests.clone());
        self.records.push(cell);
        Ok((state, setter))
    }

    /// Verify the call count against the previous render.
    pub(crate) fn check_order(&self) -> Result<(), HookError> {
        match self.previous {
            Some(previous) if previous.len() != self.records.len() => {
                Err(HookError::CountMismatch {
                    previous: previous.len(),
                    current: self.records.len(),
                })
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn finish(self) -> HookList {
        self.records
    }
}
