//! In-memory host tree
//!
//! A plain [`HostTree`] implementation backed by an `IndexMap`. Hosts with a
//! real widget tree implement the trait themselves; this one drives the tests
//! and the demo.

use crate::{Error, HostTree, NodeId, Result};
use indexmap::{IndexMap, IndexSet};

/// A node stored in a [`MemoryTree`]
#[derive(Debug, Clone)]
pub struct MemoryNode {
    pub id: NodeId,
    pub name: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub classes: IndexSet<String>,
    /// `Some` for text-bearing nodes
    pub text: Option<String>,
    pub styles: IndexMap<String, f32>,
    pub enabled: bool,
}

impl MemoryNode {
    fn new(id: NodeId, name: impl Into<String>, text: Option<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parent: None,
            children: Vec::new(),
            classes: IndexSet::new(),
            text,
            styles: IndexMap::new(),
            enabled: true,
        }
    }
}

/// Tree of nodes kept entirely in memory
#[derive(Debug, Clone)]
pub struct MemoryTree {
    nodes: IndexMap<NodeId, MemoryNode>,
    next_id: u64,
    root: NodeId,
}

impl MemoryTree {
    /// Create a tree holding a single root element named `root`
    pub fn new() -> Self {
        let root = NodeId::new(0);
        let mut nodes = IndexMap::new();
        nodes.insert(root, MemoryNode::new(root, "root", None));
        Self {
            nodes,
            next_id: 1,
            root,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Create a detached element node
    pub fn create_element(&mut self, name: impl Into<String>) -> NodeId {
        self.insert(MemoryNode::new(self.peek_id(), name, None))
    }

    /// Create a detached text-bearing node
    pub fn create_text(&mut self, name: impl Into<String>, text: impl Into<String>) -> NodeId {
        self.insert(MemoryNode::new(self.peek_id(), name, Some(text.into())))
    }

    /// Create an element and append it to `parent` in one step
    pub fn add_element(&mut self, parent: NodeId, name: impl Into<String>) -> Result<NodeId> {
        let node = self.create_element(name);
        self.append(parent, node)?;
        Ok(node)
    }

    /// Create a text node and append it to `parent` in one step
    pub fn add_text(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<NodeId> {
        let node = self.create_text(name, text);
        self.append(parent, node)?;
        Ok(node)
    }

    /// Destroy a node and its whole subtree
    ///
    /// Handles to destroyed nodes become invalid.
    pub fn destroy(&mut self, node: NodeId) -> Result<()> {
        self.detach(node)?;
        let mut pending = vec![node];
        while let Some(id) = pending.pop() {
            if let Some(removed) = self.nodes.shift_remove(&id) {
                pending.extend(removed.children);
            }
        }
        Ok(())
    }

    pub fn get(&self, node: NodeId) -> Option<&MemoryNode> {
        self.nodes.get(&node)
    }

    /// Number of live nodes, detached ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn peek_id(&self) -> NodeId {
        NodeId::new(self.next_id)
    }

    fn insert(&mut self, node: MemoryNode) -> NodeId {
        let id = node.id;
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    fn node_mut(&mut self, node: NodeId) -> Result<&mut MemoryNode> {
        self.nodes.get_mut(&node).ok_or(Error::NodeNotFound(node))
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.parent(id);
        }
        false
    }
}

impl Default for MemoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl HostTree for MemoryTree {
    fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|n| n.parent)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(&node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn append(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if !self.contains(parent) {
            return Err(Error::NodeNotFound(parent));
        }
        let current = self.get(child).ok_or(Error::NodeNotFound(child))?.parent;
        if let Some(existing) = current {
            return Err(Error::AlreadyAttached {
                parent: existing,
                child,
            });
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(Error::CycleDetected(child));
        }
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    fn remove(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let siblings = &mut self.node_mut(parent)?.children;
        let index = siblings
            .iter()
            .position(|&c| c == child)
            .ok_or(Error::NotAChild { parent, child })?;
        siblings.remove(index);
        self.node_mut(child)?.parent = None;
        Ok(())
    }

    fn name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).map(|n| n.name.as_str())
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes
            .get(&node)
            .is_some_and(|n| n.classes.contains(class))
    }

    fn set_class(&mut self, node: NodeId, class: &str, enabled: bool) -> Result<()> {
        let classes = &mut self.node_mut(node)?.classes;
        if enabled {
            classes.insert(class.to_string());
        } else {
            classes.shift_remove(class);
        }
        Ok(())
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).and_then(|n| n.text.as_deref())
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<()> {
        match &mut self.node_mut(node)?.text {
            Some(current) => {
                *current = text.to_string();
                Ok(())
            }
            None => Err(Error::NotTextBearing(node)),
        }
    }

    fn style(&self, node: NodeId, property: &str) -> Option<f32> {
        self.nodes
            .get(&node)
            .and_then(|n| n.styles.get(property).copied())
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: f32) -> Result<()> {
        self.node_mut(node)?
            .styles
            .insert(property.to_string(), value);
        Ok(())
    }

    fn is_enabled(&self, node: NodeId) -> bool {
        self.nodes.get(&node).is_some_and(|n| n.enabled)
    }

    fn set_enabled(&mut self, node: NodeId, enabled: bool) -> Result<()> {
        self.node_mut(node)?.enabled = enabled;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_remove() {
        let mut tree = MemoryTree::new();
        let root = tree.root();
        let a = tree.add_element(root, "a").unwrap();
        let b = tree.add_text(root, "b", "hello").unwrap();

        assert_eq!(tree.children(root), vec![a, b]);
        assert_eq!(tree.parent(a), Some(root));

        tree.remove(root, a).unwrap();
        assert_eq!(tree.children(root), vec![b]);
        assert_eq!(tree.parent(a), None);
        // Detached, not destroyed
        assert!(tree.contains(a));
    }

    #[test]
    fn test_append_rejects_attached_and_cycles() {
        let mut tree = MemoryTree::new();
        let root = tree.root();
        let a = tree.add_element(root, "a").unwrap();
        let b = tree.add_element(a, "b").unwrap();

        assert_eq!(
            tree.append(root, b),
            Err(Error::AlreadyAttached { parent: a, child: b })
        );

        tree.detach(a).unwrap();
        assert_eq!(tree.append(b, a), Err(Error::CycleDetected(a)));
    }

    #[test]
    fn test_remove_requires_child() {
        let mut tree = MemoryTree::new();
        let root = tree.root();
        let a = tree.create_element("a");
        assert_eq!(
            tree.remove(root, a),
            Err(Error::NotAChild { parent: root, child: a })
        );
    }

    #[test]
    fn test_text_and_classes() {
        let mut tree = MemoryTree::new();
        let root = tree.root();
        let label = tree.add_text(root, "label", "0").unwrap();

        tree.set_text(label, "12").unwrap();
        assert_eq!(tree.text(label), Some("12"));
        assert_eq!(tree.set_text(root, "x"), Err(Error::NotTextBearing(root)));

        tree.set_class(label, "active", true).unwrap();
        assert!(tree.has_class(label, "active"));
        tree.set_class(label, "active", false).unwrap();
        assert!(!tree.has_class(label, "active"));

        tree.set_style(label, "left", 4.5).unwrap();
        assert_eq!(tree.style(label, "left"), Some(4.5));

        assert!(tree.is_enabled(label));
        tree.set_enabled(label, false).unwrap();
        assert!(!tree.is_enabled(label));
        assert!(!tree.is_enabled(NodeId(99)));
    }

    #[test]
    fn test_destroy_subtree() {
        let mut tree = MemoryTree::new();
        let root = tree.root();
        let a = tree.add_element(root, "a").unwrap();
        let b = tree.add_element(a, "b").unwrap();

        tree.destroy(a).unwrap();
        assert!(!tree.contains(a));
        assert!(!tree.contains(b));
        assert!(tree.children(root).is_empty());
        assert_eq!(tree.len(), 1);
    }
}
