//! Selections - grouped node sets and the data join
//!
//! A [`Selection`] is an ordered list of [`Group`]s. Each group remembers the
//! parent its elements were queried from, so that entering data knows where
//! new nodes go. Three type parameters travel with a selection:
//!
//! - `K` - the [`NodeKind`] every element satisfies
//! - `D` - the datum type bound to elements
//! - `P` - the datum type bound to group parents
//!
//! Binding data partitions each group into update (existing elements whose
//! datum is still wanted), enter (wanted data without an element) and exit
//! (elements whose datum is no longer wanted). [`Selection::join`] turns that
//! partition into tree edits.

use crate::document::Document;
use crate::enter::{EnterGroup, EnterSelection};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::marker::PhantomData;
use trellis_core::{AnyNode, Bindable, Datum, HostTree, NodeId, NodeKind, Result, SubKind};

/// Elements sharing one parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Node the elements were queried from, `None` for ad hoc selections
    pub parent: Option<NodeId>,
    pub elements: Vec<NodeId>,
}

impl Group {
    pub fn new(parent: Option<NodeId>, elements: Vec<NodeId>) -> Self {
        Self { parent, elements }
    }
}

/// A typed, grouped set of nodes
pub struct Selection<K = AnyNode, D = Datum, P = Datum> {
    groups: Vec<Group>,
    enter: EnterSelection<D>,
    exit: Vec<Group>,
    _kind: PhantomData<fn() -> (K, P)>,
}

impl<K: NodeKind, D: Bindable, P: Bindable> Selection<K, D, P> {
    pub(crate) fn from_groups(groups: Vec<Group>) -> Self {
        Self {
            groups,
            enter: EnterSelection::default(),
            exit: Vec::new(),
            _kind: PhantomData,
        }
    }

    /// Selection with no elements
    pub fn empty() -> Self {
        Self::from_groups(Vec::new())
    }

    /// One parentless group holding `nodes`
    pub fn from_nodes(nodes: impl IntoIterator<Item = NodeId>) -> Self {
        Self::from_groups(vec![Group::new(None, nodes.into_iter().collect())])
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// All elements, group by group
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.groups.iter().flat_map(|g| g.elements.iter().copied())
    }

    /// Total number of elements
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.elements.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.elements.is_empty())
    }

    /// Data still waiting for an element after the last bind
    pub fn enter(&self) -> &EnterSelection<D> {
        &self.enter
    }

    /// Elements whose datum was not wanted by the last bind
    pub fn exit(&self) -> Selection<K, D, P> {
        Selection::from_groups(self.exit.clone())
    }

    /// Direct children of every element, filtered by kind, name and class
    ///
    /// Each element becomes the parent of one output group, even when none of
    /// its children match.
    pub fn select_children<K2: NodeKind, H: HostTree>(
        &self,
        doc: &Document<H>,
        name: Option<&str>,
        class: Option<&str>,
    ) -> Selection<K2, Datum, D> {
        let tree = doc.tree();
        let groups = self
            .nodes()
            .map(|node| {
                let elements = tree
                    .children(node)
                    .into_iter()
                    .filter(|&child| {
                        K2::accepts(tree, child)
                            && name.map_or(true, |n| tree.name(child) == Some(n))
                            && class.map_or(true, |c| tree.has_class(child, c))
                    })
                    .collect();
                Group::new(Some(node), elements)
            })
            .collect();
        Selection::from_groups(groups)
    }

    /// Breadth-first search below every element, filtered by kind and name
    ///
    /// The search starts at the element itself, so an element that matches is
    /// part of its own group.
    pub fn find_descendants<K2: NodeKind, H: HostTree>(
        &self,
        doc: &Document<H>,
        name: Option<&str>,
    ) -> Selection<K2, Datum, D> {
        let tree = doc.tree();
        let groups = self
            .nodes()
            .map(|node| {
                let mut elements = Vec::new();
                let mut frontier = VecDeque::from([node]);
                while let Some(current) = frontier.pop_front() {
                    if K2::accepts(tree, current) && name.map_or(true, |n| tree.name(current) == Some(n)) {
                        elements.push(current);
                    }
                    frontier.extend(tree.children(current));
                }
                Group::new(Some(node), elements)
            })
            .collect();
        Selection::from_groups(groups)
    }

    /// Combine with a selection of a narrower kind, group by group
    ///
    /// For every group of `other`, the result has one group with the same
    /// parent holding `other`'s elements followed by this selection's elements
    /// for that parent. Groups of this selection whose parent does not appear
    /// in `other` follow unchanged.
    pub fn merge_from<K2: SubKind<K>>(self, other: Selection<K2, D, P>) -> Selection<K, D, P> {
        let mut index = HashMap::new();
        for (i, group) in self.groups.iter().enumerate() {
            index.entry(group.parent).or_insert(i);
        }
        let mut mine: Vec<Option<Group>> = self.groups.into_iter().map(Some).collect();

        let mut groups = Vec::with_capacity(mine.len() + other.groups.len());
        for theirs in other.groups {
            let mut elements = theirs.elements;
            if let Some(own) = index.get(&theirs.parent).and_then(|&i| mine[i].take()) {
                elements.extend(own.elements);
            }
            groups.push(Group::new(theirs.parent, elements));
        }
        groups.extend(mine.into_iter().flatten());
        Selection::from_groups(groups)
    }

    /// Partition each group against freshly computed data
    ///
    /// `data` is called once per group with the parent's datum and the
    /// group's elements. An element stays in the update set when its bound
    /// datum equals a not yet claimed item; every item is claimed at most
    /// once. Unclaimed items enter, in data order. Unmatched elements exit.
    ///
    /// Entering nodes are not created here; see [`Selection::join`].
    pub fn bind<D2, H, F>(self, doc: &Document<H>, mut data: F) -> Selection<K, D2, P>
    where
        D2: Bindable,
        H: HostTree,
        F: FnMut(Option<P>, &[NodeId]) -> Vec<D2>,
    {
        let mut update = Vec::with_capacity(self.groups.len());
        let mut enter = Vec::with_capacity(self.groups.len());
        let mut exit = Vec::with_capacity(self.groups.len());

        for group in self.groups {
            let parent_datum = group.parent.and_then(|p| doc.datum_as::<P>(p));
            let mut wanted: Vec<Option<D2>> = data(parent_datum, &group.elements)
                .into_iter()
                .map(Some)
                .collect();

            let mut kept = Vec::new();
            let mut dropped = Vec::new();
            for &node in &group.elements {
                let claimed = doc.datum_as::<D2>(node).and_then(|bound| {
                    wanted
                        .iter()
                        .position(|slot| slot.as_ref() == Some(&bound))
                });
                match claimed {
                    Some(i) => {
                        wanted[i] = None;
                        kept.push(node);
                    }
                    None => dropped.push(node),
                }
            }

            let entering: Vec<D2> = wanted.into_iter().flatten().collect();
            tracing::debug!(
                parent = ?group.parent,
                update = kept.len(),
                enter = entering.len(),
                exit = dropped.len(),
                "group bound"
            );
            update.push(Group::new(group.parent, kept));
            enter.push(EnterGroup::new(group.parent, entering));
            exit.push(Group::new(group.parent, dropped));
        }

        Selection {
            groups: update,
            enter: EnterSelection::new(enter),
            exit,
            _kind: PhantomData,
        }
    }

    /// Bind the same data to every group
    pub fn bind_data<D2: Bindable, H: HostTree>(
        self,
        doc: &Document<H>,
        data: &[D2],
    ) -> Selection<K, D2, P> {
        self.bind(doc, |_, _| data.to_vec())
    }

    /// Reconcile the tree with the last bind
    ///
    /// Creates one node per entering datum with `factory`, appends it to its
    /// group's parent and binds the datum to it. Exiting elements are detached.
    /// The result holds the entered nodes followed by the updated ones, per
    /// parent.
    pub fn join<H, F>(self, doc: &mut Document<H>, factory: F) -> Result<Selection<K, D, P>>
    where
        H: HostTree,
        F: FnMut(&mut H, &D) -> Result<NodeId>,
    {
        let Selection {
            groups,
            enter,
            exit,
            ..
        } = self;

        let entered: Selection<K, D, P> = enter.append(doc, factory)?;
        let merged = Selection::<K, D, P>::from_groups(groups).merge_from(entered);

        let mut removed = 0;
        for node in exit.iter().flat_map(|g| g.elements.iter().copied()) {
            if doc.tree_mut().detach(node)?.is_some() {
                removed += 1;
            }
        }
        tracing::debug!(elements = merged.len(), removed, "join complete");
        Ok(merged)
    }

    /// Reorder live elements to follow `order`, keeping them under their parents
    ///
    /// Every element whose datum appears in `order` is detached and then
    /// re-appended to the parent it had, in `order`'s sequence. Elements with
    /// no parent in the tree are left alone. Group order is unchanged.
    pub fn robust_order<H: HostTree>(self, doc: &mut Document<H>, order: &[D]) -> Result<Self> {
        for group in &self.groups {
            let mut bound: Vec<(Option<D>, NodeId)> = group
                .elements
                .iter()
                .map(|&node| (doc.datum_as::<D>(node), node))
                .collect();

            let mut moves = Vec::new();
            for item in order {
                let Some(i) = bound.iter().position(|(d, _)| d.as_ref() == Some(item)) else {
                    continue;
                };
                let (_, node) = bound.remove(i);
                if let Some(parent) = doc.tree_mut().detach(node)? {
                    moves.push((parent, node));
                }
            }
            for (parent, node) in moves {
                doc.tree_mut().append(parent, node)?;
            }
        }
        Ok(self)
    }

    /// Rebuild each group in the order `order` returns for it
    ///
    /// All elements of a group are detached, then the element bound to each
    /// returned datum is appended to the group's parent. Items with no bound
    /// element are skipped. Elements whose datum is not returned stay detached.
    pub fn fragile_order<H, F>(self, doc: &mut Document<H>, mut order: F) -> Result<Self>
    where
        H: HostTree,
        F: FnMut(Option<P>, &[NodeId]) -> Vec<D>,
    {
        let mut groups = Vec::with_capacity(self.groups.len());
        for group in self.groups {
            let parent_datum = group.parent.and_then(|p| doc.datum_as::<P>(p));
            let wanted = order(parent_datum, &group.elements);

            let mut remaining = Vec::with_capacity(group.elements.len());
            for &node in &group.elements {
                doc.tree_mut().detach(node)?;
                remaining.push((doc.datum_as::<D>(node), node));
            }

            let mut sorted = Vec::with_capacity(wanted.len());
            for item in &wanted {
                match remaining.iter().position(|(d, _)| d.as_ref() == Some(item)) {
                    Some(i) => sorted.push(remaining.remove(i).1),
                    None => {
                        tracing::warn!(parent = ?group.parent, datum = ?item, "no element bound to datum, skipped");
                    }
                }
            }

            match group.parent {
                Some(parent) => {
                    for &node in &sorted {
                        doc.tree_mut().append(parent, node)?;
                    }
                }
                None if !sorted.is_empty() => {
                    tracing::warn!(elements = sorted.len(), "ordered group has no parent, elements left detached");
                }
                None => {}
            }
            groups.push(Group::new(group.parent, sorted));
        }
        Ok(Selection::from_groups(groups))
    }

    /// [`Selection::fragile_order`] with one fixed order for every group
    pub fn fragile_order_by<H: HostTree>(self, doc: &mut Document<H>, order: &[D]) -> Result<Self> {
        self.fragile_order(doc, |_, _| order.to_vec())
    }

    /// Keep exactly one child per element, carrying the element's datum
    ///
    /// Children matching `name` and `class` are bound to a single item, the
    /// element's datum, and joined: a missing child is created with `factory`,
    /// a child bound to a stale datum is replaced. Elements without a datum end
    /// up with no matching children.
    pub fn forward_single_data<K2, H, F>(
        &self,
        doc: &mut Document<H>,
        name: Option<&str>,
        class: Option<&str>,
        factory: F,
    ) -> Result<Selection<K2, D, D>>
    where
        K2: NodeKind,
        H: HostTree,
        F: FnMut(&mut H, &D) -> Result<NodeId>,
    {
        self.select_children::<K2, H>(doc, name, class)
            .bind::<D, H, _>(doc, |parent: Option<D>, _| parent.into_iter().collect())
            .join(doc, factory)
    }

    /// Reinterpret the datum types
    ///
    /// Data is stored as [`Datum`]; elements whose datum does not describe the
    /// new type simply read as unbound.
    pub fn retype<D2: Bindable, P2: Bindable>(self) -> Selection<K, D2, P2> {
        Selection::from_groups(self.groups)
    }
}

impl<K, D: Clone, P> Clone for Selection<K, D, P> {
    fn clone(&self) -> Self {
        Self {
            groups: self.groups.clone(),
            enter: self.enter.clone(),
            exit: self.exit.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K, D: fmt::Debug, P> fmt::Debug for Selection<K, D, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("kind", &std::any::type_name::<K>())
            .field("groups", &self.groups)
            .field("enter", &self.enter)
            .field("exit", &self.exit)
            .finish()
    }
}
