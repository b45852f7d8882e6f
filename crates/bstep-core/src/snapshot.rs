#![forbid(unsafe_code)]

//! Frozen structural copies of a [`Tree`].
//!
//! A [`Snapshot`] owns a compacted copy of the tree behind an [`Arc`], so
//! cloning a snapshot (for caching, or to hand it to another command) never
//! copies nodes. Restoring always produces a *fresh* arena: the live tree
//! and the snapshot never share nodes, so mutating one cannot leak into the
//! other.
//!
//! Node identity across the copy is carried by [`Position`]: the node that
//! was selected at capture time is remembered by its position and
//! re-resolved against whatever tree it is later compared with.

use std::fmt;
use std::sync::Arc;

use crate::Value;
use crate::tree::{NodeId, Position, Tree};

/// Independent copy of a tree plus the selected position at capture time.
#[derive(Clone)]
pub struct Snapshot {
    tree: Arc<Tree>,
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("len", &self.tree.len())
            .field("selected", &self.tree.selected())
            .finish()
    }
}

impl Snapshot {
    /// Copy `tree`, recording `target` (a node of `tree`) as the selection.
    ///
    /// A `target` that is not attached to `tree` records no selection.
    #[must_use]
    pub fn capture(tree: &Tree, target: Option<NodeId>) -> Self {
        let mut copy = tree.compacted();
        let selected = target
            .filter(|id| tree.is_attached(*id))
            .and_then(|id| tree.position(id))
            .and_then(|position| copy.node_at(position));
        copy.select(selected);
        Self {
            tree: Arc::new(copy),
        }
    }

    /// Copy `tree` keeping its own selection marker.
    #[must_use]
    pub fn of(tree: &Tree) -> Self {
        Self {
            tree: Arc::new(tree.compacted()),
        }
    }

    /// Read-only view of the frozen tree.
    #[must_use]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Position of the node selected at capture time.
    #[must_use]
    pub fn selected(&self) -> Option<Position> {
        self.tree.selected()
    }

    /// Value of the node selected at capture time.
    #[must_use]
    pub fn selected_value(&self) -> Option<Value> {
        self.tree
            .selected_node()
            .and_then(|id| self.tree.value(id))
    }

    /// Number of nodes in the frozen tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Whether the frozen tree is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// A fresh, independently owned tree equal to the snapshot.
    #[must_use]
    pub fn restore(&self) -> Tree {
        self.tree.compacted()
    }

    /// Replace `live`'s structure with a fresh copy of the snapshot.
    ///
    /// `live` keeps its current selection marker; only nodes and root are
    /// replaced.
    pub fn restore_into(&self, live: &mut Tree) {
        live.adopt(self.restore());
    }

    /// Whether `tree` has exactly the frozen shape and values.
    #[must_use]
    pub fn matches(&self, tree: &Tree) -> bool {
        self.tree.same_shape(tree)
    }
}
