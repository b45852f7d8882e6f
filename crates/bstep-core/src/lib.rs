#![forbid(unsafe_code)]

//! bstep core
//!
//! Data model shared by every bstep crate: an arena-backed binary search
//! tree with positional node indices, frozen snapshots of it, and the
//! vocabulary of animation events that operations emit.
//!
//! # Key Components
//!
//! - [`Tree`] - arena tree; nodes addressed by [`NodeId`], identified across
//!   copies by [`Position`]
//! - [`Snapshot`] - independent structural copy used for rollback
//! - [`AnimationEvent`] - one visible effect in an operation's step sequence
//! - [`AnimationSink`] - receiver of the event stream, with [`EventLog`] and
//!   [`NullSink`] implementations
//!
//! # Role in bstep
//! `bstep-core` holds no behaviour beyond structural tree edits. The
//! algorithms, their undo/redo and the history controller live in
//! `bstep-runtime`.

pub mod error;
pub mod event;
pub mod sink;
pub mod snapshot;
pub mod tree;

/// Value stored in a tree node.
pub type Value = i64;

pub use error::TreeError;
pub use event::{
    Anchor, AnimationEvent, Beat, CompareSign, Element, Glyph, MarkerId, NodeView,
};
pub use sink::{AnimationSink, EventLog, NullSink};
pub use snapshot::Snapshot;
pub use tree::{NodeId, Order, Position, Side, Tree};
