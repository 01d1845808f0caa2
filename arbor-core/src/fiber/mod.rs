//! Work-Unit Tree
//!
//! This module implements the traversal structure the engine builds to mirror
//! the element tree, and the positional diff that fills it in.
//!
//! # Overview
//!
//! Every render pass gets its own [`FiberTree`] arena. Each unit records:
//!
//! - its first child, next sibling and parent (arena indices)
//! - its `alternate`: the unit at the same position in the last committed tree
//! - the host node it controls, if any
//! - the effect commit must apply to it
//! - for function units, the hook records produced by its last render
//!
//! # Design Decisions
//!
//! 1. Arenas instead of reference-counted nodes: parent, sibling and
//!    alternate links would otherwise form cycles. Dropping an arena frees a
//!    whole pass at once.
//!
//! 2. The previously committed arena is only written to when marking
//!    deletions; new units never link into it.

mod reconcile;
mod tree;
mod unit;

pub(crate) use reconcile::reconcile_children;
pub use reconcile::ReconcileSummary;
pub use tree::FiberTree;
pub use unit::{EffectTag, UnitId, UnitKind, WorkUnit};
