//! Delayed change state machine
//!
//! ```text
//! Created ──initialize──▶ Initialized ──start──▶ Started ──fire…──▶ Completed
//! ```
//!
//! `Created` is a [`Delay`]; initializing consumes it into a [`DelayedChange`]
//! bound to an accessor and node. The mutation queue decides when a change
//! starts and drives it with scheduler tickets until it completes.

use crate::accessor::{Accessor, AccessorKey};
use crate::delay::{CompletionHook, Delay, DelayKind};
use std::fmt;
use std::time::Duration;
use trellis_core::{
    invariant_violation, Bindable, ChangeId, ChangeTicket, Datum, FrameScheduler, HostTree,
    NodeId, Result, TaskId,
};

/// Lifecycle of a change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeState {
    Created,
    Initialized,
    Started,
    Completed,
}

/// A pending mutation of one property of one node
pub struct DelayedChange<A: Accessor> {
    id: ChangeId,
    accessor: A,
    key: AccessorKey,
    node: NodeId,
    from: A::Value,
    to: A::Value,
    state: ChangeState,
    kind: DelayKind<A::Value>,
    hooks: Vec<CompletionHook<A::Value>>,
    started_at: Duration,
    task: Option<TaskId>,
}

impl<A: Accessor> DelayedChange<A> {
    /// Bind a delay to an accessor and node
    ///
    /// An animated delay with a preset target animates towards that target
    /// instead of `to`.
    pub fn initialize(
        delay: Delay<A::Value>,
        accessor: A,
        node: NodeId,
        from: A::Value,
        to: A::Value,
    ) -> Self {
        let to = match &delay.kind {
            DelayKind::Animated(transition) => transition.target.clone().unwrap_or(to),
            _ => to,
        };
        Self {
            id: ChangeId(0),
            key: accessor.key(),
            accessor,
            node,
            from,
            to,
            state: ChangeState::Initialized,
            kind: delay.kind,
            hooks: delay.hooks,
            started_at: Duration::ZERO,
            task: None,
        }
    }

    pub fn id(&self) -> ChangeId {
        self.id
    }

    pub fn accessor(&self) -> &A {
        &self.accessor
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn from(&self) -> &A::Value {
        &self.from
    }

    /// Final value of the change
    pub fn to(&self) -> &A::Value {
        &self.to
    }

    pub fn state(&self) -> ChangeState {
        self.state
    }

    pub fn kind(&self) -> &DelayKind<A::Value> {
        &self.kind
    }

    pub(crate) fn set_id(&mut self, id: ChangeId) {
        self.id = id;
    }

    fn ticket(&self) -> ChangeTicket {
        ChangeTicket::new(self.node, self.id)
    }

    fn apply_final(&mut self, tree: &mut dyn HostTree) -> Result<ChangeState> {
        self.accessor.set(tree, self.node, &self.to)?;
        self.state = ChangeState::Completed;
        Ok(self.state)
    }
}

impl<A: Accessor> fmt::Debug for DelayedChange<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelayedChange")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("node", &self.node)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("state", &self.state)
            .finish()
    }
}

/// Type-erased view of a [`DelayedChange`] held by the mutation queue
pub trait PendingChange {
    fn id(&self) -> ChangeId;

    fn key(&self) -> &AccessorKey;

    fn state(&self) -> ChangeState;

    /// Final value, as a datum
    fn target(&self) -> Datum;

    /// Begin the change. Immediate changes complete right here.
    fn start(&mut self, tree: &mut dyn HostTree, scheduler: &mut FrameScheduler)
        -> Result<ChangeState>;

    /// Handle a scheduler ticket addressed to this change
    fn fire(&mut self, tree: &mut dyn HostTree, scheduler: &mut FrameScheduler)
        -> Result<ChangeState>;

    /// Check that the node's live value equals the final value
    fn target_reached(&self, tree: &dyn HostTree) -> bool;

    /// Drop any scheduler task still registered for this change
    fn cancel_task(&mut self, scheduler: &mut FrameScheduler);

    /// Run completion hooks
    fn finish(&self);
}

impl<A: Accessor> PendingChange for DelayedChange<A> {
    fn id(&self) -> ChangeId {
        self.id
    }

    fn key(&self) -> &AccessorKey {
        &self.key
    }

    fn state(&self) -> ChangeState {
        self.state
    }

    fn target(&self) -> Datum {
        self.to.to_datum()
    }

    fn start(
        &mut self,
        tree: &mut dyn HostTree,
        scheduler: &mut FrameScheduler,
    ) -> Result<ChangeState> {
        if self.state != ChangeState::Initialized {
            invariant_violation("starting a change that is not initialized");
            return Ok(self.state);
        }
        self.state = ChangeState::Started;
        self.started_at = scheduler.now();

        match &self.kind {
            DelayKind::Immediate => return self.apply_final(tree),
            DelayKind::Timed(delay) => {
                self.task = Some(scheduler.schedule_after(*delay, self.ticket()));
            }
            DelayKind::Animated(_) => {
                self.task = Some(scheduler.every_tick(self.ticket()));
            }
        }
        tracing::debug!(node = %self.node, change = %self.id, key = %self.key, "change started");
        Ok(self.state)
    }

    fn fire(
        &mut self,
        tree: &mut dyn HostTree,
        scheduler: &mut FrameScheduler,
    ) -> Result<ChangeState> {
        if self.state != ChangeState::Started {
            invariant_violation("firing a change that is not started");
            return Ok(self.state);
        }

        let transition = match &self.kind {
            DelayKind::Immediate | DelayKind::Timed(_) => {
                self.task = None;
                return self.apply_final(tree);
            }
            DelayKind::Animated(transition) => transition,
        };

        let elapsed = scheduler.now().saturating_sub(self.started_at);
        let coeff = if transition.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / transition.duration.as_secs_f64()).min(1.0) as f32
        };

        if coeff >= 1.0 {
            self.cancel_task(scheduler);
            return self.apply_final(tree);
        }

        let eased = (transition.easing)(coeff);
        let value = transition
            .interpolator
            .interpolate(&self.from, &self.to, eased);
        self.accessor.set(tree, self.node, &value)?;
        Ok(self.state)
    }

    fn target_reached(&self, tree: &dyn HostTree) -> bool {
        self.accessor
            .get(tree, self.node)
            .is_ok_and(|live| live == self.to)
    }

    fn cancel_task(&mut self, scheduler: &mut FrameScheduler) {
        if let Some(task) = self.task.take() {
            scheduler.cancel(task);
        }
    }

    fn finish(&self) {
        for hook in &self.hooks {
            hook(self.node, &self.to);
        }
    }
}
