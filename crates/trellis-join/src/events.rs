//! Event subscriptions for selected nodes
//!
//! The host owns input handling. When an event reaches a node, the host hands
//! it to [`EventRegistry::dispatch`], which invokes every subscription for that
//! node with the node's current datum.

use crate::document::Document;
use crate::selection::Selection;
use trellis_core::{Bindable, Datum, HostTree, NodeId, NodeKind, SubscriptionId};

/// What a subscriber sees when its event fires
#[derive(Debug)]
pub struct EventContext<'a, D, E> {
    pub node: NodeId,
    /// Datum bound at dispatch time
    pub datum: Option<D>,
    /// Position of the node in its group when it subscribed
    pub index: usize,
    pub event: &'a E,
}

type Handler<E> = Box<dyn FnMut(NodeId, Option<&Datum>, usize, &E)>;

struct Subscription<E> {
    id: SubscriptionId,
    node: NodeId,
    index: usize,
    handler: Handler<E>,
}

/// Subscriptions for one event type
pub struct EventRegistry<E> {
    subscriptions: Vec<Subscription<E>>,
    next_id: u64,
}

impl<E> Default for EventRegistry<E> {
    fn default() -> Self {
        Self {
            subscriptions: Vec::new(),
            next_id: 0,
        }
    }
}

impl<E: 'static> EventRegistry<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        node: NodeId,
        index: usize,
        handler: impl FnMut(NodeId, Option<&Datum>, usize, &E) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            node,
            index,
            handler: Box::new(handler),
        });
        id
    }

    /// Returns false when the subscription was already gone
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Drop every subscription of `node`, returning how many there were
    pub fn unsubscribe_node(&mut self, node: NodeId) -> usize {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.node != node);
        before - self.subscriptions.len()
    }

    /// Deliver `event` to the subscribers of `node` in subscription order
    pub fn dispatch<H: HostTree>(&mut self, doc: &Document<H>, node: NodeId, event: &E) -> usize {
        let datum = doc.datum(node);
        let mut delivered = 0;
        for subscription in self.subscriptions.iter_mut().filter(|s| s.node == node) {
            (subscription.handler)(node, datum, subscription.index, event);
            delivered += 1;
        }
        tracing::trace!(%node, delivered, "event dispatched");
        delivered
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

impl<K: NodeKind, D: Bindable, P: Bindable> Selection<K, D, P> {
    /// Subscribe `callback` on every element
    ///
    /// Each element gets its own copy of the callback.
    pub fn on_event<E, F>(&self, registry: &mut EventRegistry<E>, callback: F) -> Vec<SubscriptionId>
    where
        E: 'static,
        F: FnMut(EventContext<'_, D, E>) + Clone + 'static,
    {
        let mut ids = Vec::with_capacity(self.len());
        for group in self.groups() {
            for (index, &node) in group.elements.iter().enumerate() {
                let mut callback = callback.clone();
                ids.push(registry.subscribe(node, index, move |node, datum, index, event| {
                    callback(EventContext {
                        node,
                        datum: datum.and_then(D::from_datum),
                        index,
                        event,
                    })
                }));
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use trellis_core::{AnyNode, MemoryTree};

    #[derive(Debug)]
    struct Click;

    #[test]
    fn test_on_event_delivers_datum_and_index() {
        let mut doc = Document::new(MemoryTree::new());
        let root = doc.tree().root();
        let buttons: Selection<AnyNode, String> = doc
            .select(root)
            .select_children::<AnyNode, _>(&doc, None, None)
            .bind_data(&doc, &["ok".to_string(), "cancel".to_string()])
            .join(&mut doc, |tree, _| Ok(tree.create_element("button")))
            .unwrap()
            .retype();

        let clicks = Rc::new(RefCell::new(Vec::new()));
        let mut registry = EventRegistry::<Click>::new();
        let sink = clicks.clone();
        let ids = buttons.on_event(&mut registry, move |ctx| {
            sink.borrow_mut().push((ctx.datum, ctx.index));
        });
        assert_eq!(ids.len(), 2);

        let cancel = buttons.nodes().nth(1).unwrap();
        assert_eq!(registry.dispatch(&doc, cancel, &Click), 1);
        assert_eq!(*clicks.borrow(), vec![(Some("cancel".to_string()), 1)]);

        assert!(registry.unsubscribe(ids[1]));
        assert!(!registry.unsubscribe(ids[1]));
        assert_eq!(registry.dispatch(&doc, cancel, &Click), 0);
    }

    #[test]
    fn test_datum_read_at_dispatch() {
        let mut doc = Document::new(MemoryTree::new());
        let root = doc.tree().root();
        let seen = Rc::new(RefCell::new(None));
        let sink = seen.clone();

        let mut registry = EventRegistry::<Click>::new();
        registry.subscribe(root, 0, move |_, datum, _, _| {
            *sink.borrow_mut() = datum.cloned();
        });
        doc.bind_datum(root, Datum::Int(7));
        registry.dispatch(&doc, root, &Click);
        assert_eq!(*seen.borrow(), Some(Datum::Int(7)));

        assert_eq!(registry.unsubscribe_node(root), 1);
        assert!(registry.is_empty());
    }
}
