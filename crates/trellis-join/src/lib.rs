//! Trellis Join - Hierarchical data joins over a host node tree
//!
//! A [`Selection`] holds nodes grouped by the parent they were queried from.
//! Binding a data sequence to it splits every group three ways:
//!
//! - **update** - existing nodes whose datum is still wanted
//! - **enter** - wanted data that has no node yet
//! - **exit** - nodes whose datum is no longer wanted
//!
//! [`Selection::join`] creates the entering nodes, detaches the exiting ones
//! and returns entered plus updated nodes, ready for property changes that run
//! through each node's mutation queue.
//!
//! # Example
//!
//! ```rust
//! use trellis_core::{AnyNode, HostTree, MemoryTree};
//! use trellis_join::Document;
//!
//! let mut doc = Document::new(MemoryTree::new());
//! let root = doc.tree().root();
//!
//! let rows = doc
//!     .select(root)
//!     .select_children::<AnyNode, _>(&doc, Some("row"), None)
//!     .bind_data(&doc, &[1i64, 2, 3])
//!     .join(&mut doc, |tree, _| Ok(tree.create_element("row")))
//!     .unwrap();
//! assert_eq!(rows.len(), 3);
//! assert_eq!(doc.tree().children(root).len(), 3);
//! ```

mod document;
mod enter;
mod events;
mod modify;
mod selection;

pub use document::Document;
pub use enter::{EnterGroup, EnterSelection};
pub use events::{EventContext, EventRegistry};
pub use selection::{Group, Selection};
