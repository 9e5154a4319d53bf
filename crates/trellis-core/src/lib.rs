//! Trellis Core - Shared building blocks for the trellis data-join engine
//!
//! This crate provides the types every other trellis crate builds on:
//! - Node, change, task and subscription identifiers
//! - Tagged data values (`Datum`) and typed views over them (`Bindable`)
//! - The `HostTree` contract through which the host's node tree is reached
//! - An in-memory host tree (`MemoryTree`)
//! - A deterministic, frame-driven scheduler (`FrameScheduler`)
//! - Engine configuration and the shared error type
//!
//! ## Threading
//!
//! Everything here is single-threaded. The host calls in from one logical
//! thread and drives time explicitly.

mod config;
mod datum;
mod error;
mod identity;
mod memory;
pub mod time;
mod tree;

pub use config::EngineConfig;
pub use datum::{Bindable, Datum, DatumMap};
pub use error::{invariant_violation, Error, Result};
pub use identity::{ChangeId, ChangeTicket, NodeId, SubscriptionId, TaskId};
pub use memory::{MemoryNode, MemoryTree};
pub use time::{FrameScheduler, Fired};
pub use tree::{AnyNode, HostTree, NodeKind, SubKind, TextNode};
