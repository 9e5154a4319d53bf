//! Trellis Motion - Serialized property changes for host nodes
//!
//! This crate turns "set this property to that value" into something that can
//! safely overlap in time:
//!
//! - **Accessors** read and write one logical property and define which
//!   changes compete with each other
//! - **Delays** describe how a change is carried out: immediately, after a
//!   timed delay, or as an animation driven every tick
//! - **Mutation queues** (one per node) serialize changes per property and
//!   start the next one when the previous completes
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use trellis_core::{FrameScheduler, MemoryTree};
//! use trellis_motion::{ChangeOutcome, ClassAccessor, DelayBuilder, PropertyMutationQueue};
//!
//! let mut tree = MemoryTree::new();
//! let node = tree.add_element(tree.root(), "row").unwrap();
//! let mut scheduler = FrameScheduler::new();
//! let mut queue = PropertyMutationQueue::new(node);
//!
//! let highlight = ClassAccessor::new("highlight");
//! let later = DelayBuilder::<bool>::timed(Duration::from_millis(100));
//! let outcome = queue
//!     .change_value(&mut tree, &mut scheduler, &highlight, true, Some(&later))
//!     .unwrap();
//! assert!(matches!(outcome, ChangeOutcome::Started(_)));
//! ```

mod accessor;
mod change;
mod delay;
pub mod interpolation;
mod queue;

pub use accessor::{
    Accessor, AccessorKey, ClassAccessor, EnabledAccessor, IntegerTextAccessor, StyleAccessor,
    TextAccessor,
};
pub use change::{ChangeState, DelayedChange, PendingChange};
pub use delay::{
    CompletionHook, Delay, DelayBuilder, DelayFactory, DelayKind, DelayModifier, Transition,
};
pub use interpolation::{Animatable, Easing, Interpolator, ValueCategory};
pub use queue::{ChangeOutcome, PropertyMutationQueue};
