//! Host tree contract
//!
//! The node tree itself belongs to the host. trellis only reaches it through
//! [`HostTree`], addressing nodes by [`NodeId`].

use crate::{NodeId, Result};

/// Operations trellis needs from the host's node tree
///
/// All reads are infallible and report missing nodes as absent values.
/// Writes fail when a node is unknown or the operation does not apply.
pub trait HostTree {
    /// Check whether the host still knows this node
    fn contains(&self, node: NodeId) -> bool;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Direct children in document order
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Attach a detached `child` as the last child of `parent`
    fn append(&mut self, parent: NodeId, child: NodeId) -> Result<()>;

    /// Detach `child` from `parent`. The node stays alive in the host.
    fn remove(&mut self, parent: NodeId, child: NodeId) -> Result<()>;

    fn name(&self, node: NodeId) -> Option<&str>;

    fn has_class(&self, node: NodeId, class: &str) -> bool;

    /// Add (`enabled == true`) or drop a class tag
    fn set_class(&mut self, node: NodeId, class: &str, enabled: bool) -> Result<()>;

    /// Text content, or `None` for nodes that do not bear text
    fn text(&self, node: NodeId) -> Option<&str>;

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<()>;

    fn style(&self, node: NodeId, property: &str) -> Option<f32>;

    fn set_style(&mut self, node: NodeId, property: &str, value: f32) -> Result<()>;

    /// Whether the node takes part in input and layout
    fn is_enabled(&self, node: NodeId) -> bool;

    fn set_enabled(&mut self, node: NodeId, enabled: bool) -> Result<()>;

    /// Detach `node` from whatever parent it currently has
    ///
    /// Returns the former parent.
    fn detach(&mut self, node: NodeId) -> Result<Option<NodeId>> {
        match self.parent(node) {
            Some(parent) => {
                self.remove(parent, node)?;
                Ok(Some(parent))
            }
            None => Ok(None),
        }
    }
}

/// A capability filter over host nodes
///
/// Selections are typed by the kind of node they hold. Querying with a kind
/// keeps only nodes the kind accepts.
pub trait NodeKind: 'static {
    fn accepts(tree: &dyn HostTree, node: NodeId) -> bool;
}

/// Every node
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyNode;

impl NodeKind for AnyNode {
    fn accepts(tree: &dyn HostTree, node: NodeId) -> bool {
        tree.contains(node)
    }
}

/// Nodes that carry text content
#[derive(Debug, Clone, Copy, Default)]
pub struct TextNode;

impl NodeKind for TextNode {
    fn accepts(tree: &dyn HostTree, node: NodeId) -> bool {
        tree.text(node).is_some()
    }
}

/// `Self` is at least as specific as `Super`
///
/// Every node of kind `Self` is also accepted by `Super`.
pub trait SubKind<Super: NodeKind>: NodeKind {}

impl<K: NodeKind> SubKind<K> for K {}

impl SubKind<AnyNode> for TextNode {}
