//! Enter selections - data waiting for a node

use crate::document::Document;
use crate::selection::{Group, Selection};
use trellis_core::{Bindable, Error, HostTree, NodeId, NodeKind, Result};

/// Entering data sharing one parent
#[derive(Debug, Clone, PartialEq)]
pub struct EnterGroup<D> {
    pub parent: Option<NodeId>,
    /// Items in data order
    pub data: Vec<D>,
}

impl<D> EnterGroup<D> {
    pub fn new(parent: Option<NodeId>, data: Vec<D>) -> Self {
        Self { parent, data }
    }
}

/// Data produced by a bind that no existing element claimed
#[derive(Debug, Clone, PartialEq)]
pub struct EnterSelection<D> {
    groups: Vec<EnterGroup<D>>,
}

impl<D> Default for EnterSelection<D> {
    fn default() -> Self {
        Self { groups: Vec::new() }
    }
}

impl<D: Bindable> EnterSelection<D> {
    pub fn new(groups: Vec<EnterGroup<D>>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[EnterGroup<D>] {
        &self.groups
    }

    /// Number of entering items across all groups
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.data.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.data.is_empty())
    }

    /// Create one node per item, append it to its group's parent and bind it
    ///
    /// Fails with [`Error::MissingParent`] when a group with data has no
    /// parent; groups handled before the failing one keep their new nodes.
    pub fn append<K, P, H, F>(self, doc: &mut Document<H>, mut factory: F) -> Result<Selection<K, D, P>>
    where
        K: NodeKind,
        P: Bindable,
        H: HostTree,
        F: FnMut(&mut H, &D) -> Result<NodeId>,
    {
        let mut groups = Vec::with_capacity(self.groups.len());
        for group in self.groups {
            if group.data.is_empty() {
                groups.push(Group::new(group.parent, Vec::new()));
                continue;
            }
            let parent = group.parent.ok_or(Error::MissingParent)?;

            let mut created = Vec::with_capacity(group.data.len());
            for datum in group.data {
                let node = factory(doc.tree_mut(), &datum)?;
                doc.tree_mut().append(parent, node)?;
                if !K::accepts(doc.tree(), node) {
                    trellis_core::invariant_violation("factory created a node of the wrong kind");
                }
                doc.bind_datum(node, datum.to_datum());
                created.push(node);
            }
            tracing::trace!(%parent, created = created.len(), "entered");
            groups.push(Group::new(Some(parent), created));
        }
        Ok(Selection::from_groups(groups))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::{AnyNode, Datum, MemoryTree, TextNode};

    #[test]
    fn test_append_binds_in_data_order() {
        let mut doc = Document::new(MemoryTree::new());
        let root = doc.tree().root();
        let enter = EnterSelection::new(vec![EnterGroup::new(Some(root), vec![3i64, 1])]);
        assert_eq!(enter.len(), 2);

        let created: Selection<TextNode, i64> = enter
            .append(&mut doc, |tree, n| Ok(tree.create_text("n", n.to_string())))
            .unwrap();
        let nodes: Vec<_> = created.nodes().collect();
        assert_eq!(doc.tree().children(root), nodes);
        assert_eq!(doc.tree().text(nodes[0]), Some("3"));
        assert_eq!(doc.datum(nodes[1]), Some(&Datum::Int(1)));
    }

    #[test]
    fn test_append_empty_group_without_parent() {
        let mut doc = Document::new(MemoryTree::new());
        let enter = EnterSelection::<i64>::new(vec![EnterGroup::new(None, Vec::new())]);
        assert!(enter.is_empty());
        let created: Selection<AnyNode, i64> = enter
            .append(&mut doc, |tree, _| Ok(tree.create_element("x")))
            .unwrap();
        assert_eq!(created.groups().len(), 1);
        assert!(created.is_empty());
    }

    #[test]
    fn test_append_propagates_factory_error() {
        let mut doc = Document::new(MemoryTree::new());
        let root = doc.tree().root();
        let enter = EnterSelection::new(vec![EnterGroup::new(Some(root), vec![1i64])]);
        let result: Result<Selection<AnyNode, i64>> =
            enter.append(&mut doc, |_, _| Err(Error::NodeNotFound(NodeId(99))));
        assert_eq!(result.unwrap_err(), Error::NodeNotFound(NodeId(99)));
        assert!(doc.tree().children(root).is_empty());
    }
}
