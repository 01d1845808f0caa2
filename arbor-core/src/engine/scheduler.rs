//! Cooperative Scheduling
//!
//! The work loop never decides on its own how long it may run. The host hands
//! it a [`Deadline`] for every idle period, and the loop performs whole work
//! units for as long as the deadline reports more than the yield threshold.
//!
//! ```text
//!   idle period ──► work_loop ──► unit, unit, unit ──► out of time ──► Yielded
//!        ▲                                                               │
//!        └───────────────────────── next idle period ◄───────────────────┘
//! ```
//!
//! Once the last unit of a pass has been performed the loop commits in the
//! same invocation, whatever time is left.

use std::cell::Cell;
use std::time::{Duration, Instant};

use super::commit::CommitReport;

/// Time-remaining query for one idle period.
pub trait Deadline {
    /// Time left in this idle period.
    fn time_remaining(&self) -> Duration;
}

/// Wall-clock deadline.
#[derive(Debug, Clone, Copy)]
pub struct TimeBudget {
    ends_at: Instant,
}

impl TimeBudget {
    /// Deadline `budget` from now.
    pub fn new(budget: Duration) -> Self {
        Self {
            ends_at: Instant::now() + budget,
        }
    }
}

impl Deadline for TimeBudget {
    fn time_remaining(&self) -> Duration {
        self.ends_at.saturating_duration_since(Instant::now())
    }
}

/// Deterministic deadline that grants a fixed number of work units.
///
/// Every query consumes one unit of budget; the loop queries once before each
/// unit it performs.
#[derive(Debug)]
pub struct UnitBudget {
    remaining: Cell<usize>,
}

impl UnitBudget {
    /// Allow `units` work units.
    pub fn new(units: usize) -> Self {
        Self {
            remaining: Cell::new(units),
        }
    }

    /// Units not yet granted.
    pub fn remaining(&self) -> usize {
        self.remaining.get()
    }
}

impl Deadline for UnitBudget {
    fn time_remaining(&self) -> Duration {
        match self.remaining.get() {
            0 => Duration::ZERO,
            n => {
                self.remaining.set(n - 1);
                Duration::MAX
            }
        }
    }
}

/// A deadline that never runs out.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl Deadline for Unbounded {
    fn time_remaining(&self) -> Duration {
        Duration::MAX
    }
}

/// Source of idle periods, standing in for the host's idle-callback registration.
pub trait IdleProvider {
    /// Deadline type handed out per period.
    type Deadline: Deadline;

    /// Wait for the next idle period. `None` stops the run.
    fn next_idle_period(&mut self) -> Option<Self::Deadline>;
}

/// Idle periods of a fixed number of work units each.
#[derive(Debug, Clone)]
pub struct FixedSlices {
    units: usize,
    slices_left: Option<usize>,
}

impl FixedSlices {
    /// Unlimited slices of `units` work units (at least one).
    pub fn new(units: usize) -> Self {
        Self {
            units: units.max(1),
            slices_left: None,
        }
    }

    /// Stop after `slices` periods.
    pub fn limit(mut self, slices: usize) -> Self {
        self.slices_left = Some(slices);
        self
    }
}

impl IdleProvider for FixedSlices {
    type Deadline = UnitBudget;

    fn next_idle_period(&mut self) -> Option<UnitBudget> {
        if let Some(left) = self.slices_left.as_mut() {
            *left = left.checked_sub(1)?;
        }
        Some(UnitBudget::new(self.units))
    }
}

/// Wall-clock idle periods of a fixed length.
///
/// A slice no longer than the engine's yield threshold never performs any
/// work.
#[derive(Debug, Clone)]
pub struct TimeSlices {
    slice: Duration,
    slices_left: Option<usize>,
}

impl TimeSlices {
    /// Unlimited slices of `slice` each.
    pub fn new(slice: Duration) -> Self {
        Self {
            slice,
            slices_left: None,
        }
    }

    /// Stop after `slices` periods.
    pub fn limit(mut self, slices: usize) -> Self {
        self.slices_left = Some(slices);
        self
    }
}

impl IdleProvider for TimeSlices {
    type Deadline = TimeBudget;

    fn next_idle_period(&mut self) -> Option<TimeBudget> {
        if let Some(left) = self.slices_left.as_mut() {
            *left = left.checked_sub(1)?;
        }
        Some(TimeBudget::new(self.slice))
    }
}

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No pass in flight.
    Idle,
    /// A pass has units left to perform.
    Reconciling,
    /// Every unit has been performed; the pass awaits commit.
    ReadyToCommit,
}

/// Outcome of one [`work_loop`](super::Engine::work_loop) invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopStatus {
    /// There was nothing to do.
    Idle,
    /// The deadline ran out with units left.
    Yielded {
        /// Units performed in this invocation.
        performed: usize,
    },
    /// The pass finished and was committed.
    Committed {
        /// Units performed in this invocation.
        performed: usize,
        /// What the commit did.
        report: CommitReport,
    },
}

/// Totals over one [`run`](super::Engine::run).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Idle periods used.
    pub slices: usize,
    /// Work units performed.
    pub performed: usize,
    /// Passes committed.
    pub commits: usize,
    /// Report of the latest commit.
    pub last_commit: Option<CommitReport>,
}
