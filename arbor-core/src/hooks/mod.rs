//! Hook Store
//!
//! Function components keep state across re-renders through hooks. Each
//! function unit owns an ordered list of hook records; on the next render of
//! the same position, the records are found again through the unit's
//! `alternate` and matched by call order.
//!
//! # Concepts
//!
//! ## Records
//!
//! A record is shared between the committed unit and the unit rendering its
//! next version. Rendering computes a staged value; committing the pass makes
//! that value the new baseline.
//!
//! ## Render Requests
//!
//! A state update does not re-render anything by itself. It queues the update
//! on its record and raises a [`RenderRequests`] signal; the scheduler picks
//! the signal up at its next opportunity and seeds a fresh pass from the last
//! committed tree.

mod context;
mod state;

pub use context::Hooks;
pub use state::{StateAction, StateSetter};

use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

/// A persisted hook slot.
pub(crate) trait HookRecord {
    /// Promote the value staged by the last render to the committed baseline.
    fn commit(&self);

    /// Recover the concrete record type.
    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

/// Hook records of one function unit, in call order.
pub(crate) type HookList = SmallVec<[Rc<dyn HookRecord>; 2]>;

/// Shared signal through which state updates ask for a new render pass.
#[derive(Clone, Default)]
pub struct RenderRequests(Rc<Cell<usize>>);

impl RenderRequests {
    /// Record one request.
    pub fn request(&self) {
        self.0.set(self.0.get().saturating_add(1));
    }

    /// Requests raised since the last [`take`](Self::take).
    pub fn pending(&self) -> usize {
        self.0.get()
    }

    /// Consume all pending requests; returns how many there were.
    pub(crate) fn take(&self) -> usize {
        self.0.replace(0)
    }
}

impl fmt::Debug for RenderRequests {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RenderRequests").field(&self.0.get()).finish()
    }
}
