//! Per-element operations on a selection
//!
//! Property writes go through each node's mutation queue, so they line up
//! behind changes already in flight for the same property.

use crate::document::Document;
use crate::selection::{Group, Selection};
use trellis_core::{Bindable, Datum, HostTree, NodeId, NodeKind, Result};
use trellis_motion::{
    Accessor, ClassAccessor, DelayFactory, EnabledAccessor, StyleAccessor, TextAccessor,
};

impl<K: NodeKind, D: Bindable, P: Bindable> Selection<K, D, P> {
    /// Run `f` for every element with its datum and its index in the group
    pub fn call<H, F>(&self, doc: &mut Document<H>, mut f: F) -> Result<&Self>
    where
        H: HostTree,
        F: FnMut(&mut Document<H>, NodeId, Option<D>, usize) -> Result<()>,
    {
        for group in self.groups() {
            for (index, &node) in group.elements.iter().enumerate() {
                let datum = doc.datum_as::<D>(node);
                f(doc, node, datum, index)?;
            }
        }
        Ok(self)
    }

    /// Request a value for `accessor` on every element
    ///
    /// `value` receives the element, its datum and its index in the group.
    pub fn change<A, H, F>(
        &self,
        doc: &mut Document<H>,
        accessor: &A,
        mut value: F,
        delay: Option<&dyn DelayFactory<A::Value>>,
    ) -> Result<&Self>
    where
        A: Accessor,
        H: HostTree,
        F: FnMut(NodeId, Option<D>, usize) -> A::Value,
    {
        for group in self.groups() {
            for (index, &node) in group.elements.iter().enumerate() {
                let target = value(node, doc.datum_as::<D>(node), index);
                doc.change_value(node, accessor, target, delay)?;
            }
        }
        Ok(self)
    }

    /// Switch a class tag on or off on every element
    pub fn classed<H: HostTree>(
        &self,
        doc: &mut Document<H>,
        class: &str,
        enabled: bool,
        delay: Option<&dyn DelayFactory<bool>>,
    ) -> Result<&Self> {
        self.change(doc, &ClassAccessor::new(class), |_, _, _| enabled, delay)
    }

    pub fn add_class<H: HostTree>(&self, doc: &mut Document<H>, class: &str) -> Result<&Self> {
        self.classed(doc, class, true, None)
    }

    /// Enable or disable every element right away
    ///
    /// Goes through the mutation queues, so it waits behind pending
    /// changes of the enabled state.
    pub fn set_enabled<H: HostTree>(&self, doc: &mut Document<H>, enabled: bool) -> Result<&Self> {
        self.change(doc, &EnabledAccessor, |_, _, _| enabled, None)
    }

    /// Set the text content of every element
    pub fn text<H, F>(
        &self,
        doc: &mut Document<H>,
        value: F,
        delay: Option<&dyn DelayFactory<String>>,
    ) -> Result<&Self>
    where
        H: HostTree,
        F: FnMut(NodeId, Option<D>, usize) -> String,
    {
        self.change(doc, &TextAccessor, value, delay)
    }

    /// Set a numeric style property on every element
    pub fn style<H, F>(
        &self,
        doc: &mut Document<H>,
        property: &str,
        value: F,
        delay: Option<&dyn DelayFactory<f32>>,
    ) -> Result<&Self>
    where
        H: HostTree,
        F: FnMut(NodeId, Option<D>, usize) -> f32,
    {
        self.change(doc, &StyleAccessor::new(property), value, delay)
    }

    /// Give every element one new child made by `factory`
    ///
    /// The new children keep the groups of their parents' selection and carry
    /// no datum.
    pub fn append<K2, H, F>(&self, doc: &mut Document<H>, mut factory: F) -> Result<Selection<K2, Datum, P>>
    where
        K2: NodeKind,
        H: HostTree,
        F: FnMut(&mut H) -> Result<NodeId>,
    {
        let mut groups = Vec::with_capacity(self.groups().len());
        for group in self.groups() {
            let mut children = Vec::with_capacity(group.elements.len());
            for &element in &group.elements {
                let child = factory(doc.tree_mut())?;
                doc.tree_mut().append(element, child)?;
                children.push(child);
            }
            groups.push(Group::new(group.parent, children));
        }
        Ok(Selection::from_groups(groups))
    }

    /// Detach every element from its parent
    ///
    /// Detached nodes keep their bound data and pending changes.
    pub fn remove<H: HostTree>(self, doc: &mut Document<H>) -> Result<Selection<K, D, P>> {
        for node in self.nodes() {
            doc.tree_mut().detach(node)?;
        }
        Ok(Selection::empty())
    }
}
