//! Document - host tree plus the per-node state trellis keeps for it
//!
//! The document owns the host tree, one lazily created
//! [`PropertyMutationQueue`] per node, and the frame scheduler that drives
//! delayed changes. The host reports elapsed time through [`Document::advance`].

use crate::selection::Selection;
use std::collections::HashMap;
use std::time::Duration;
use trellis_core::{
    AnyNode, Bindable, Datum, EngineConfig, Fired, FrameScheduler, HostTree, MemoryTree, NodeId,
    Result,
};
use trellis_motion::{
    Accessor, ChangeOutcome, DelayFactory, DelayedChange, PropertyMutationQueue,
};

/// A host tree together with bound data and in-flight changes
pub struct Document<H: HostTree> {
    tree: H,
    queues: HashMap<NodeId, PropertyMutationQueue>,
    scheduler: FrameScheduler,
    config: EngineConfig,
}

impl<H: HostTree> Document<H> {
    pub fn new(tree: H) -> Self {
        Self::with_config(tree, EngineConfig::default())
    }

    pub fn with_config(tree: H, config: EngineConfig) -> Self {
        Self {
            tree,
            queues: HashMap::new(),
            scheduler: FrameScheduler::new(),
            config,
        }
    }

    pub fn tree(&self) -> &H {
        &self.tree
    }

    /// Direct access to the host tree
    ///
    /// Structural edits made here bypass the mutation queues.
    pub fn tree_mut(&mut self) -> &mut H {
        &mut self.tree
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    /// Current scheduler time
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Selection holding just `node`
    pub fn select(&self, node: NodeId) -> Selection<AnyNode> {
        Selection::from_nodes([node])
    }

    /// Selection holding `nodes` in one parentless group
    pub fn select_nodes(&self, nodes: impl IntoIterator<Item = NodeId>) -> Selection<AnyNode> {
        Selection::from_nodes(nodes)
    }

    pub fn queue(&self, node: NodeId) -> Option<&PropertyMutationQueue> {
        self.queues.get(&node)
    }

    /// The node's queue, created on first use
    pub fn queue_mut(&mut self, node: NodeId) -> &mut PropertyMutationQueue {
        self.queues
            .entry(node)
            .or_insert_with(|| PropertyMutationQueue::new(node))
    }

    pub fn bind_datum(&mut self, node: NodeId, datum: Datum) {
        self.queue_mut(node).bind(datum);
    }

    pub fn datum(&self, node: NodeId) -> Option<&Datum> {
        self.queues.get(&node).and_then(|q| q.datum())
    }

    /// The bound datum viewed as `T`, if its variant describes a `T`
    pub fn datum_as<T: Bindable>(&self, node: NodeId) -> Option<T> {
        self.datum(node).and_then(T::from_datum)
    }

    /// Request a new value for one property of `node`
    ///
    /// See [`PropertyMutationQueue::change_value`].
    pub fn change_value<A: Accessor>(
        &mut self,
        node: NodeId,
        accessor: &A,
        value: A::Value,
        delay: Option<&dyn DelayFactory<A::Value>>,
    ) -> Result<ChangeOutcome> {
        let queue = self
            .queues
            .entry(node)
            .or_insert_with(|| PropertyMutationQueue::new(node));
        queue.change_value(&mut self.tree, &mut self.scheduler, accessor, value, delay)
    }

    /// Attach a standalone, already initialized change
    pub fn register_animation<A: Accessor>(
        &mut self,
        accessor: &A,
        change: DelayedChange<A>,
    ) -> Result<ChangeOutcome> {
        let node = change.node();
        let queue = self
            .queues
            .entry(node)
            .or_insert_with(|| PropertyMutationQueue::new(node));
        queue.register_animation(&mut self.tree, &mut self.scheduler, accessor, change)
    }

    /// Number of changes in flight on `node`
    pub fn pending_changes(&self, node: NodeId) -> usize {
        self.queues.get(&node).map_or(0, |q| q.len())
    }

    /// Let `dt` pass
    ///
    /// Timers fire in due order with the clock set to their due time, then
    /// every per-tick task runs once at the new time.
    pub fn advance(&mut self, dt: Duration) {
        let until = self.scheduler.now() + dt;
        while let Some(fired) = self.scheduler.pop_due(until) {
            self.dispatch(fired);
        }
        self.scheduler.advance_to(until);

        for fired in self.scheduler.tickers() {
            // An earlier ticker may have completed and cancelled this one
            if self.scheduler.is_ticking(fired.task) {
                self.dispatch(fired);
            }
        }
    }

    /// Advance by the configured frame interval
    pub fn next_frame(&mut self) {
        self.advance(self.config.frame_interval());
    }

    /// Drop the state kept for a node the host destroyed
    ///
    /// Changes still in flight are discarded without being applied.
    pub fn release(&mut self, node: NodeId) -> Option<PropertyMutationQueue> {
        self.queues.remove(&node)
    }

    fn dispatch(&mut self, fired: Fired) {
        match self.queues.get_mut(&fired.ticket.node) {
            Some(queue) => queue.fire(fired.ticket.change, &mut self.tree, &mut self.scheduler),
            None => {
                tracing::debug!(node = %fired.ticket.node, "task fired for released node");
                self.scheduler.cancel(fired.task);
            }
        }
    }
}

impl Document<MemoryTree> {
    /// Destroy `node` with its subtree and release their queues
    pub fn destroy(&mut self, node: NodeId) -> Result<()> {
        let mut doomed = vec![node];
        let mut next = 0;
        while let Some(&current) = doomed.get(next) {
            doomed.extend(self.tree.children(current));
            next += 1;
        }
        self.tree.destroy(node)?;
        for node in doomed {
            self.queues.remove(&node);
        }
        Ok(())
    }
}

impl<H: HostTree + Default> Default for Document<H> {
    fn default() -> Self {
        Self::new(H::default())
    }
}
