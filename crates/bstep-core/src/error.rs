#![forbid(unsafe_code)]

//! Errors raised by tree mutations.

use thiserror::Error;

use crate::tree::{NodeId, Side};

/// Failure of a structural tree operation.
///
/// Every fallible tree mutation checks its preconditions before touching
/// any link, so an `Err` always leaves the tree unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreeError {
    /// Attaching the subtree would place a node deeper than the positional
    /// index can address.
    #[error("depth {depth} exceeds the addressable positional index range")]
    DepthExceeded { depth: u32 },
    /// The handle does not name a live node of this tree.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    /// A node cannot be attached below itself.
    #[error("node {node} cannot be attached inside its own subtree")]
    Cycle { node: NodeId },
    /// The requested slot is already taken by another subtree.
    #[error("{side} slot of node {parent} is occupied")]
    Occupied { parent: NodeId, side: Side },
}
