//! Error types for trellis

use crate::NodeId;
use thiserror::Error;

/// Workspace-wide error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("{child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("{0} does not carry text content")]
    NotTextBearing(NodeId),

    #[error("{child} is already attached to {parent}")]
    AlreadyAttached { parent: NodeId, child: NodeId },

    #[error("Cannot append {0} below itself or one of its descendants")]
    CycleDetected(NodeId),

    /// Enter data whose group has no parent node to append to
    #[error("Enter group has no parent node to append to")]
    MissingParent,

    /// A type with a single value cannot be interpolated
    #[error("Cannot interpolate empty type {type_name}")]
    EmptyInterpolation { type_name: &'static str },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Report a broken internal invariant.
///
/// Aborts in debug builds. Release builds log the violation and carry on;
/// what happens next is unspecified.
#[track_caller]
pub fn invariant_violation(message: &str) {
    tracing::error!(location = %std::panic::Location::caller(), "invariant violated: {message}");
    debug_assert!(false, "invariant violated: {message}");
}
