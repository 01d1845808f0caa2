//! Reconciliation Engine
//!
//! [`Engine`] is the session object that owns everything a render needs: the
//! host, the last committed tree, the work-in-progress tree with its cursor,
//! the pending deletions, and the signal state setters raise.
//!
//! # Lifecycle
//!
//! ```text
//!   render() / state update
//!            │
//!            ▼
//!   ┌─────────────┐  work_loop   ┌───────────────┐  last unit  ┌────────┐
//!   │    Idle     │ ───────────► │  Reconciling  │ ──────────► │ commit │
//!   └─────────────┘              └───────────────┘             └────────┘
//!          ▲                       │  deadline hit ▲                │
//!          │                       └── Yielded ────┘                │
//!          └────────────────────────────────────────────────────────┘
//! ```
//!
//! Seeding a new pass while one is in flight replaces it. Progress is lost,
//! the committed tree is untouched.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut host = MemoryHost::new();
//! let container = host.create_container("root");
//! let mut engine = Engine::new(host);
//!
//! engine.render(Element::host("h1").child("hello"), container);
//! engine.run(&mut FixedSlices::new(16))?;
//! ```

mod commit;
mod config;
mod render;
mod scheduler;

pub use commit::CommitReport;
pub use config::EngineConfig;
pub use scheduler::{
    Deadline, FixedSlices, IdleProvider, LoopStatus, Phase, RunSummary, TimeBudget, TimeSlices,
    UnitBudget, Unbounded,
};

use std::rc::Rc;

use tracing::debug;

use crate::element::{Children, Element, Props};
use crate::error::Result;
use crate::fiber::{EffectTag, FiberTree, UnitId};
use crate::hooks::RenderRequests;
use crate::host::Host;

/// A render session bound to one host.
pub struct Engine<H: Host> {
    host: H,
    config: EngineConfig,
    /// Last committed tree; the baseline every new pass diffs against.
    current: Option<FiberTree<H::Node>>,
    /// Pass in flight.
    wip: Option<FiberTree<H::Node>>,
    /// Unit the loop performs next.
    next_unit: Option<UnitId>,
    /// Units of `current` to remove on commit.
    deletions: Vec<UnitId>,
    requests: RenderRequests,
}

impl<H: Host> Engine<H> {
    /// Engine with the default configuration.
    pub fn new(host: H) -> Self {
        Self::with_config(host, EngineConfig::default())
    }

    /// Engine with an explicit configuration.
    pub fn with_config(host: H, config: EngineConfig) -> Self {
        Self {
            host,
            config,
            current: None,
            wip: None,
            next_unit: None,
            deletions: Vec::new(),
            requests: RenderRequests::default(),
        }
    }

    /// Seed a pass rendering `element` as the sole child of `container`.
    ///
    /// Replaces any pass in flight. Nothing is performed until the work loop
    /// runs.
    pub fn render(&mut self, element: Element, container: H::Node) {
        let mut props = Props::new();
        *props.children_mut() = Children::single(element);

        let alternate = self
            .current
            .as_ref()
            .filter(|current| current[current.root()].host_node() == Some(&container))
            .map(FiberTree::root);

        // Pending state updates are picked up by this pass.
        self.requests.take();
        self.seed(FiberTree::with_root(container, Rc::new(props), alternate));
    }

    /// Perform units until `deadline` runs out or the pass is complete, and
    /// commit a complete pass.
    ///
    /// A render error aborts the call and leaves the failing unit as the next
    /// unit; seeding a new pass recovers.
    pub fn work_loop(&mut self, deadline: &dyn Deadline) -> Result<LoopStatus> {
        let threshold = self.config.yield_threshold();
        let mut performed = 0;

        loop {
            self.consume_requests();
            let Some(unit) = self.next_unit else {
                break;
            };
            if deadline.time_remaining() <= threshold {
                debug!(performed, next = %unit, "yielding");
                return Ok(LoopStatus::Yielded { performed });
            }
            self.next_unit = self.perform_unit(unit)?;
            performed += 1;
        }

        if self.wip.is_none() {
            return Ok(LoopStatus::Idle);
        }
        let report = self.commit_root()?;
        Ok(LoopStatus::Committed { performed, report })
    }

    /// Drive the loop with idle periods from `provider` until no work is left
    /// or the provider stops.
    pub fn run<P: IdleProvider>(&mut self, provider: &mut P) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        while self.has_pending_work() {
            let Some(deadline) = provider.next_idle_period() else {
                break;
            };
            summary.slices += 1;
            match self.work_loop(&deadline)? {
                LoopStatus::Idle => break,
                LoopStatus::Yielded { performed } => summary.performed += performed,
                LoopStatus::Committed { performed, report } => {
                    summary.performed += performed;
                    summary.commits += 1;
                    summary.last_commit = Some(report);
                }
            }
        }
        Ok(summary)
    }

    /// Run every pending pass to completion without yielding.
    ///
    /// Returns the report of the last commit, if anything was committed.
    pub fn flush(&mut self) -> Result<Option<CommitReport>> {
        let mut last = None;
        while self.has_pending_work() {
            match self.work_loop(&Unbounded)? {
                LoopStatus::Committed { report, .. } => last = Some(report),
                LoopStatus::Idle => break,
                LoopStatus::Yielded { .. } => {}
            }
        }
        Ok(last)
    }

    /// Where the scheduler currently stands.
    pub fn phase(&self) -> Phase {
        match (self.next_unit, &self.wip) {
            (Some(_), _) => Phase::Reconciling,
            (None, Some(_)) => Phase::ReadyToCommit,
            (None, None) => Phase::Idle,
        }
    }

    /// Whether a pass is in flight or a state update awaits a pass.
    pub fn has_pending_work(&self) -> bool {
        self.wip.is_some() || (self.current.is_some() && self.requests.pending() > 0)
    }

    /// The last committed tree.
    pub fn current_tree(&self) -> Option<&FiberTree<H::Node>> {
        self.current.as_ref()
    }

    /// The host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Unit the loop performs next.
    pub fn next_unit(&self) -> Option<UnitId> {
        self.next_unit
    }

    /// Seed a pass from the committed root if a state update asked for one.
    fn consume_requests(&mut self) {
        if self.requests.pending() == 0 {
            return;
        }
        let Some(current) = self.current.as_ref() else {
            return;
        };
        let root = &current[current.root()];
        let (Some(container), props) = (root.host_node().cloned(), Rc::clone(&root.props)) else {
            return;
        };
        let alternate = Some(current.root());

        let count = self.requests.take();
        debug!(requests = count, "state changed, reseeding from committed root");
        self.seed(FiberTree::with_root(container, props, alternate));
    }

    /// Replace the pass in flight with `tree`.
    fn seed(&mut self, tree: FiberTree<H::Node>) {
        if let Some(current) = self.current.as_mut() {
            for &id in &self.deletions {
                current[id].effect = EffectTag::None;
            }
        }
        self.deletions.clear();

        if self.wip.is_some() {
            debug!("discarding unfinished pass");
        }
        let root = tree.root();
        self.wip = Some(tree);
        self.next_unit = Some(root);
        debug!(restored = self.current.is_some(), "seeded pass");
    }
}
