//! Per-node property mutation queue
//!
//! Every node gets one queue. It owns the node's bound datum and the ordered
//! list of changes still in flight. Changes addressing the same property
//! (equal [`AccessorKey`]) run strictly one after another in the order they
//! were requested; changes to different properties run independently.
//!
//! Repeated requests for the same property accumulate. Nothing is coalesced
//! and a started change always runs to completion.

use crate::accessor::{Accessor, AccessorKey};
use crate::change::{ChangeState, DelayedChange, PendingChange};
use crate::delay::{Delay, DelayFactory};
use trellis_core::{
    invariant_violation, Bindable, ChangeId, Datum, FrameScheduler, HostTree, NodeId, Result,
};

/// What a value change request ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// The property already has (or is going to have) this value
    Unchanged,
    /// The value was written synchronously
    Applied,
    /// A delayed change was created and started
    Started(ChangeId),
    /// A delayed change was created and waits behind earlier ones
    Queued(ChangeId),
}

/// Bound datum and in-flight changes of one node
pub struct PropertyMutationQueue {
    node: NodeId,
    datum: Option<Datum>,
    pending: Vec<Box<dyn PendingChange>>,
    next_change: u64,
}

impl PropertyMutationQueue {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            datum: None,
            pending: Vec::new(),
            next_change: 1,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn datum(&self) -> Option<&Datum> {
        self.datum.as_ref()
    }

    pub fn bind(&mut self, datum: Datum) {
        self.datum = Some(datum);
    }

    pub fn unbind(&mut self) -> Option<Datum> {
        self.datum.take()
    }

    /// Number of changes in flight
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of changes in flight for one property
    pub fn pending_for(&self, key: &AccessorKey) -> usize {
        self.pending.iter().filter(|c| c.key() == key).count()
    }

    /// States of the changes in flight for one property, oldest first
    pub fn states_for(&self, key: &AccessorKey) -> Vec<ChangeState> {
        self.pending
            .iter()
            .filter(|c| c.key() == key)
            .map(|c| c.state())
            .collect()
    }

    /// Request `value` for the property `accessor` addresses
    ///
    /// The value is compared with what the property will hold once every
    /// queued change for it completed; an equal value is a no-op and the
    /// factory is not consulted. Otherwise the factory decides between an
    /// immediate write and a delayed change.
    pub fn change_value<A: Accessor>(
        &mut self,
        tree: &mut dyn HostTree,
        scheduler: &mut FrameScheduler,
        accessor: &A,
        value: A::Value,
        factory: Option<&dyn DelayFactory<A::Value>>,
    ) -> Result<ChangeOutcome> {
        let key = accessor.key();
        let last_pending = self.pending.iter().rev().find(|c| c.key() == &key);
        let expected = match last_pending.map(|c| <A::Value as Bindable>::from_datum(&c.target())) {
            Some(Some(target)) => target,
            Some(None) => {
                invariant_violation("queued change target does not match its accessor type");
                accessor.get(tree, self.node)?
            }
            None => accessor.get(tree, self.node)?,
        };
        let busy = last_pending.is_some();

        if expected == value {
            return Ok(ChangeOutcome::Unchanged);
        }

        let delay = match factory {
            Some(factory) => factory.delay_for(&expected, &value)?,
            None => None,
        };

        let delay = match delay {
            Some(delay) => delay,
            // Writing now would overtake the changes still queued
            None if busy => Delay::immediate(),
            None => {
                accessor.set(tree, self.node, &value)?;
                return Ok(ChangeOutcome::Applied);
            }
        };

        let change = DelayedChange::initialize(delay, accessor.clone(), self.node, expected, value);
        self.enqueue(tree, scheduler, change)
    }

    /// Attach an already initialized change
    ///
    /// Used for animations that are not the result of a value request. The
    /// change starts right away unless another change for the same property
    /// is in flight.
    pub fn register_animation<A: Accessor>(
        &mut self,
        tree: &mut dyn HostTree,
        scheduler: &mut FrameScheduler,
        accessor: &A,
        change: DelayedChange<A>,
    ) -> Result<ChangeOutcome> {
        if change.state() != ChangeState::Initialized {
            invariant_violation("registering a change that is not freshly initialized");
        }
        if !change.accessor().same_property(accessor) {
            invariant_violation("registering a change under a different accessor");
        }
        if change.node() != self.node {
            invariant_violation("registering a change for another node");
        }
        self.enqueue(tree, scheduler, change)
    }

    /// Route a fired scheduler task to its change
    ///
    /// Host failures while applying a value are logged and drop the change;
    /// the node is most likely gone.
    pub fn fire(
        &mut self,
        change: ChangeId,
        tree: &mut dyn HostTree,
        scheduler: &mut FrameScheduler,
    ) {
        let Some(index) = self.index_of(change) else {
            invariant_violation("task fired for a change that was never scheduled");
            return;
        };

        match self.pending[index].fire(tree, scheduler) {
            Ok(ChangeState::Completed) => self.confirm_completion(change, tree, scheduler),
            Ok(_) => {}
            Err(error) => {
                tracing::warn!(node = %self.node, change = %change, %error, "dropping change after host failure");
                self.abandon(index, tree, scheduler);
            }
        }
    }

    /// Retire a completed change and start the next one for its property
    fn confirm_completion(
        &mut self,
        change: ChangeId,
        tree: &mut dyn HostTree,
        scheduler: &mut FrameScheduler,
    ) {
        let Some(index) = self.index_of(change) else {
            invariant_violation("confirming a change that was never scheduled");
            return;
        };
        let completed = self.pending.remove(index);
        if !completed.target_reached(tree) {
            invariant_violation("completed change left a different value behind");
        }
        tracing::debug!(node = %self.node, change = %change, key = %completed.key(), "change completed");
        completed.finish();
        self.start_next(completed.key(), tree, scheduler);
    }

    fn abandon(&mut self, index: usize, tree: &mut dyn HostTree, scheduler: &mut FrameScheduler) {
        let mut dropped = self.pending.remove(index);
        dropped.cancel_task(scheduler);
        self.start_next(dropped.key(), tree, scheduler);
    }

    /// Start the oldest waiting change for `key`, if nothing runs for it
    fn start_next(&mut self, key: &AccessorKey, tree: &mut dyn HostTree, scheduler: &mut FrameScheduler) {
        if self
            .pending
            .iter()
            .any(|c| c.key() == key && c.state() == ChangeState::Started)
        {
            return;
        }
        let Some(index) = self
            .pending
            .iter()
            .position(|c| c.key() == key && c.state() == ChangeState::Initialized)
        else {
            return;
        };

        let id = self.pending[index].id();
        match self.pending[index].start(tree, scheduler) {
            Ok(ChangeState::Completed) => self.confirm_completion(id, tree, scheduler),
            Ok(_) => {}
            Err(error) => {
                tracing::warn!(node = %self.node, change = %id, %error, "dropping change after host failure");
                self.abandon(index, tree, scheduler);
            }
        }
    }

    fn enqueue<A: Accessor>(
        &mut self,
        tree: &mut dyn HostTree,
        scheduler: &mut FrameScheduler,
        mut change: DelayedChange<A>,
    ) -> Result<ChangeOutcome> {
        let id = ChangeId(self.next_change);
        self.next_change += 1;
        change.set_id(id);

        let key = change.accessor().key();
        let busy = self.pending_for(&key) > 0;
        self.pending.push(Box::new(change));

        if busy {
            tracing::debug!(node = %self.node, change = %id, %key, "change queued");
            return Ok(ChangeOutcome::Queued(id));
        }

        // Nothing runs for this property, so the new change is the last entry
        let index = self.pending.len() - 1;
        match self.pending[index].start(tree, scheduler) {
            Ok(ChangeState::Completed) => self.confirm_completion(id, tree, scheduler),
            Ok(_) => {}
            Err(error) => {
                let mut dropped = self.pending.remove(index);
                dropped.cancel_task(scheduler);
                return Err(error);
            }
        }
        Ok(ChangeOutcome::Started(id))
    }

    fn index_of(&self, change: ChangeId) -> Option<usize> {
        self.pending.iter().position(|c| c.id() == change)
    }
}

impl std::fmt::Debug for PropertyMutationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyMutationQueue")
            .field("node", &self.node)
            .field("datum", &self.datum)
            .field("pending", &self.pending.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::{ClassAccessor, IntegerTextAccessor, StyleAccessor};
    use crate::delay::DelayBuilder;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;
    use trellis_core::{Error, MemoryTree};

    /// Writes always fail
    #[derive(Debug, Clone)]
    struct Broken;

    impl Accessor for Broken {
        type Value = i64;

        fn key(&self) -> AccessorKey {
            AccessorKey::Custom {
                kind: "broken",
                param: String::new(),
            }
        }

        fn get(&self, _: &dyn HostTree, _: NodeId) -> Result<i64> {
            Ok(0)
        }

        fn set(&self, _: &mut dyn HostTree, node: NodeId, _: &i64) -> Result<()> {
            Err(Error::NodeNotFound(node))
        }
    }

    /// Accepts writes but keeps reading 0
    #[derive(Debug, Clone)]
    struct Stuck;

    impl Accessor for Stuck {
        type Value = i64;

        fn key(&self) -> AccessorKey {
            AccessorKey::Custom {
                kind: "stuck",
                param: String::new(),
            }
        }

        fn get(&self, _: &dyn HostTree, _: NodeId) -> Result<i64> {
            Ok(0)
        }

        fn set(&self, _: &mut dyn HostTree, _: NodeId, _: &i64) -> Result<()> {
            Ok(())
        }
    }

    fn immediate(_: &i64, _: &i64) -> Option<Delay<i64>> {
        Some(Delay::immediate())
    }

    struct Fixture {
        tree: MemoryTree,
        scheduler: FrameScheduler,
        queue: PropertyMutationQueue,
        node: NodeId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut tree = MemoryTree::new();
            let node = tree.add_text(tree.root(), "label", "0").unwrap();
            Self {
                tree,
                scheduler: FrameScheduler::new(),
                queue: PropertyMutationQueue::new(node),
                node,
            }
        }

        fn change<A: Accessor>(
            &mut self,
            accessor: &A,
            value: A::Value,
            factory: Option<&dyn DelayFactory<A::Value>>,
        ) -> ChangeOutcome {
            self.queue
                .change_value(&mut self.tree, &mut self.scheduler, accessor, value, factory)
                .unwrap()
        }

        /// Minimal frame loop: due timers first, then per-tick tasks
        fn advance(&mut self, ms: u64) {
            let until = self.scheduler.now() + Duration::from_millis(ms);
            while let Some(fired) = self.scheduler.pop_due(until) {
                self.queue
                    .fire(fired.ticket.change, &mut self.tree, &mut self.scheduler);
            }
            self.scheduler.advance_to(until);
            for fired in self.scheduler.tickers() {
                if self.scheduler.is_ticking(fired.task) {
                    self.queue
                        .fire(fired.ticket.change, &mut self.tree, &mut self.scheduler);
                }
            }
        }
    }

    #[test]
    fn test_no_op_change_skips_factory() {
        let mut fx = Fixture::new();
        let active = ClassAccessor::new("active");
        fx.tree.set_class(fx.node, "active", true).unwrap();

        let calls = Rc::new(RefCell::new(0));
        let counter = calls.clone();
        let factory = move |_: &bool, _: &bool| {
            *counter.borrow_mut() += 1;
            Some(Delay::<bool>::timed(Duration::from_millis(10)))
        };

        assert_eq!(fx.change(&active, true, Some(&factory)), ChangeOutcome::Unchanged);
        assert_eq!(*calls.borrow(), 0);
        assert!(fx.queue.is_empty());
    }

    #[test]
    fn test_immediate_without_factory() {
        let mut fx = Fixture::new();
        assert_eq!(fx.change(&IntegerTextAccessor, 7, None), ChangeOutcome::Applied);
        assert_eq!(fx.tree.text(fx.node), Some("7"));
        assert!(fx.queue.is_empty());
    }

    #[test]
    fn test_fifo_per_accessor() {
        let mut fx = Fixture::new();
        let active = ClassAccessor::new("active");
        let delay = DelayBuilder::<bool>::timed(Duration::from_millis(100));

        let first = fx.change(&active, true, Some(&delay));
        let second = fx.change(&active, false, Some(&delay));
        assert!(matches!(first, ChangeOutcome::Started(_)));
        assert!(matches!(second, ChangeOutcome::Queued(_)));
        assert_eq!(
            fx.queue.states_for(&active.key()),
            vec![ChangeState::Started, ChangeState::Initialized]
        );

        fx.advance(100);
        assert!(fx.tree.has_class(fx.node, "active"));
        assert_eq!(fx.queue.states_for(&active.key()), vec![ChangeState::Started]);

        fx.advance(99);
        assert!(fx.tree.has_class(fx.node, "active"));

        fx.advance(1);
        assert!(!fx.tree.has_class(fx.node, "active"));
        assert!(fx.queue.is_empty());
    }

    #[test]
    fn test_expected_value_follows_queue() {
        let mut fx = Fixture::new();
        let active = ClassAccessor::new("active");
        let delay = DelayBuilder::<bool>::timed(Duration::from_millis(50));

        fx.change(&active, true, Some(&delay));
        // Live value is still false, but the queue already heads for true
        assert_eq!(fx.change(&active, true, Some(&delay)), ChangeOutcome::Unchanged);
        assert_eq!(fx.queue.pending_for(&active.key()), 1);
    }

    #[test]
    fn test_immediate_waits_behind_queue() {
        let mut fx = Fixture::new();
        let count = IntegerTextAccessor;
        let delay = DelayBuilder::<i64>::timed(Duration::from_millis(50));

        fx.change(&count, 5, Some(&delay));
        assert!(matches!(fx.change(&count, 9, None), ChangeOutcome::Queued(_)));
        assert_eq!(fx.tree.text(fx.node), Some("0"));

        fx.advance(50);
        assert_eq!(fx.tree.text(fx.node), Some("9"));
        assert!(fx.queue.is_empty());
    }

    #[test]
    fn test_independent_accessors() {
        let mut fx = Fixture::new();
        let active = ClassAccessor::new("active");
        let left = StyleAccessor::new("left");

        fx.change(&active, true, Some(&DelayBuilder::<bool>::timed(Duration::from_millis(100))));
        fx.change(&left, 3.0, Some(&DelayBuilder::<f32>::timed(Duration::from_millis(40))));

        fx.advance(40);
        assert_eq!(fx.tree.style(fx.node, "left"), Some(3.0));
        assert!(!fx.tree.has_class(fx.node, "active"));

        fx.advance(60);
        assert!(fx.tree.has_class(fx.node, "active"));
        assert_eq!(fx.tree.style(fx.node, "left"), Some(3.0));
    }

    #[test]
    fn test_animation_reaches_exact_target() {
        let mut fx = Fixture::new();
        let count = IntegerTextAccessor;
        let animate = DelayBuilder::<i64>::animated(Duration::from_millis(100));

        fx.change(&count, 10, Some(&animate));
        fx.advance(30);
        assert_eq!(fx.tree.text(fx.node), Some("3"));
        fx.advance(30);
        assert_eq!(fx.tree.text(fx.node), Some("6"));
        fx.advance(50);
        assert_eq!(fx.tree.text(fx.node), Some("10"));
        assert!(fx.queue.is_empty());
        assert_eq!(fx.scheduler.pending(), 0);
    }

    #[test]
    fn test_after_complete_hook() {
        let mut fx = Fixture::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let delay = DelayBuilder::<f32>::timed(Duration::from_millis(10))
            .after_complete(move |node, value: &f32| sink.borrow_mut().push((node, *value)));

        fx.change(&StyleAccessor::new("left"), 8.0, Some(&delay));
        fx.advance(10);
        assert_eq!(*seen.borrow(), vec![(fx.node, 8.0)]);
    }

    #[test]
    fn test_register_animation() {
        let mut fx = Fixture::new();
        let left = StyleAccessor::new("left");
        let change = DelayedChange::initialize(
            Delay::animated(Duration::from_millis(20)).unwrap(),
            left.clone(),
            fx.node,
            0.0,
            4.0,
        );
        let outcome = fx
            .queue
            .register_animation(&mut fx.tree, &mut fx.scheduler, &left, change)
            .unwrap();
        assert!(matches!(outcome, ChangeOutcome::Started(_)));

        fx.advance(10);
        assert_eq!(fx.tree.style(fx.node, "left"), Some(2.0));
        fx.advance(10);
        assert_eq!(fx.tree.style(fx.node, "left"), Some(4.0));
        assert!(fx.queue.is_empty());
    }

    #[test]
    fn test_host_failure_drops_change() {
        let mut fx = Fixture::new();
        let count = IntegerTextAccessor;
        fx.change(&count, 3, Some(&DelayBuilder::<i64>::timed(Duration::from_millis(10))));

        fx.tree.destroy(fx.node).unwrap();
        fx.advance(10);
        assert!(fx.queue.is_empty());
    }

    #[test]
    fn test_datum_binding() {
        let mut queue = PropertyMutationQueue::new(NodeId(1));
        assert_eq!(queue.datum(), None);
        queue.bind(Datum::Int(4));
        assert_eq!(queue.datum(), Some(&Datum::Int(4)));
        assert_eq!(queue.unbind(), Some(Datum::Int(4)));
    }

    #[test]
    fn test_synchronous_start_failure_is_returned() {
        let mut fx = Fixture::new();
        let with_delay = fx.queue.change_value(
            &mut fx.tree,
            &mut fx.scheduler,
            &Broken,
            3,
            Some(&immediate),
        );
        assert_eq!(with_delay, Err(Error::NodeNotFound(fx.node)));
        assert!(fx.queue.is_empty());

        let without = fx
            .queue
            .change_value(&mut fx.tree, &mut fx.scheduler, &Broken, 3, None);
        assert_eq!(without, Err(Error::NodeNotFound(fx.node)));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "invariant violated")]
    fn test_register_started_change_panics() {
        let mut fx = Fixture::new();
        let left = StyleAccessor::new("left");
        let mut change = DelayedChange::initialize(
            Delay::timed(Duration::from_millis(10)),
            left.clone(),
            fx.node,
            0.0,
            1.0,
        );
        change.start(&mut fx.tree, &mut fx.scheduler).unwrap();
        let _ = fx
            .queue
            .register_animation(&mut fx.tree, &mut fx.scheduler, &left, change);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "invariant violated")]
    fn test_register_under_other_accessor_panics() {
        let mut fx = Fixture::new();
        let change = DelayedChange::initialize(
            Delay::timed(Duration::from_millis(10)),
            StyleAccessor::new("left"),
            fx.node,
            0.0,
            1.0,
        );
        let _ = fx.queue.register_animation(
            &mut fx.tree,
            &mut fx.scheduler,
            &StyleAccessor::new("top"),
            change,
        );
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "invariant violated")]
    fn test_fire_for_unknown_change_panics() {
        let mut fx = Fixture::new();
        fx.queue.fire(ChangeId(42), &mut fx.tree, &mut fx.scheduler);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "invariant violated")]
    fn test_completion_value_mismatch_panics() {
        let mut fx = Fixture::new();
        fx.change(&Stuck, 5, Some(&immediate));
    }
}
