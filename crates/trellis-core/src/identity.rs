//! Identity types for nodes, changes, scheduler tasks and subscriptions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a node owned by the host tree
///
/// The handle does not keep the node alive. Using it after the host destroyed
/// the node is a caller error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Create a new node ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node:{}", self.0)
    }
}

/// Identifier of one delayed change inside a node's mutation queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChangeId(pub u64);

impl fmt::Display for ChangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "change:{}", self.0)
    }
}

/// Routing information handed back by the scheduler when a task fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChangeTicket {
    pub node: NodeId,
    pub change: ChangeId,
}

impl ChangeTicket {
    pub fn new(node: NodeId, change: ChangeId) -> Self {
        Self { node, change }
    }
}

/// Handle of a scheduled task, used for cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

/// Handle returned by an event subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);
