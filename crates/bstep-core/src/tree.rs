#![forbid(unsafe_code)]

//! Arena-backed binary search tree with positional node indices.
//!
//! Nodes live in a `Vec` arena and refer to each other through [`NodeId`]
//! handles, so parent back-links need no reference counting and a structural
//! copy is a plain walk over the arena.
//!
//! Every attached node also carries a [`Position`]: the root is `0`, the
//! left child of `i` is `2i + 1` and the right child is `2i + 2`. Positions
//! are derived from the root path only. They are the identity that survives
//! copying: a `NodeId` is meaningful for one arena, a `Position` for any
//! tree of the same shape.
//!
//! # Invariants
//!
//! 1. `position(n)` equals the path-derived index of `n` for every node
//!    reachable from the root.
//! 2. `parent(c) == Some(p)` iff `c` is the left or right child of `p`.
//! 3. The root has no parent.
//!
//! BST ordering (left strictly less, right greater-or-equal) is maintained
//! by the algorithms driving the tree, not by the arena itself; see
//! [`Tree::validate`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Value;
use crate::error::TreeError;
use crate::event::NodeView;

/// Largest slot count [`Tree::level_order`] will materialise.
const LEVEL_ORDER_LIMIT: u128 = 1 << 12;

/// Handle of a node slot inside one tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    /// Raw arena slot.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which child slot of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// The other slot.
    #[must_use]
    pub const fn flip(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// Positional node index derived from the root path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position(u128);

impl Position {
    /// Index of the root.
    pub const ROOT: Self = Self(0);

    /// Wrap a raw index.
    #[must_use]
    pub const fn new(raw: u128) -> Self {
        Self(raw)
    }

    /// The raw index value.
    #[must_use]
    pub const fn raw(self) -> u128 {
        self.0
    }

    /// Index of the left child, or `None` past the addressable depth.
    #[must_use]
    pub fn left(self) -> Option<Self> {
        self.0.checked_mul(2)?.checked_add(1).map(Self)
    }

    /// Index of the right child, or `None` past the addressable depth.
    #[must_use]
    pub fn right(self) -> Option<Self> {
        self.0.checked_mul(2)?.checked_add(2).map(Self)
    }

    /// Index of the child on `side`.
    #[must_use]
    pub fn child(self, side: Side) -> Option<Self> {
        match side {
            Side::Left => self.left(),
            Side::Right => self.right(),
        }
    }

    /// Index of the parent; `None` for the root.
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        if self.0 == 0 {
            None
        } else {
            Some(Self((self.0 - 1) / 2))
        }
    }

    /// Which side of its parent this index hangs from.
    #[must_use]
    pub const fn side(self) -> Option<Side> {
        if self.0 == 0 {
            None
        } else if self.0 % 2 == 1 {
            Some(Side::Left)
        } else {
            Some(Side::Right)
        }
    }

    /// Number of edges between the root and this index.
    #[must_use]
    pub fn depth(self) -> u32 {
        let mut depth = 0;
        let mut at = self;
        while let Some(parent) = at.parent() {
            depth += 1;
            at = parent;
        }
        depth
    }

    /// Root-to-node path as a sequence of child sides.
    #[must_use]
    pub fn path(self) -> Vec<Side> {
        let mut path = Vec::with_capacity(self.depth() as usize);
        let mut at = self;
        while let (Some(parent), Some(side)) = (at.parent(), at.side()) {
            path.push(side);
            at = parent;
        }
        path.reverse();
        path
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order in which [`Tree::linearize`] lists a subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Order {
    Pre,
    In,
    Post,
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pre => f.write_str("preorder"),
            Self::In => f.write_str("inorder"),
            Self::Post => f.write_str("postorder"),
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    value: Value,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
    position: Position,
}

impl Node {
    fn new(value: Value) -> Self {
        Self {
            value,
            parent: None,
            left: None,
            right: None,
            position: Position::ROOT,
        }
    }

    fn child(&self, side: Side) -> Option<NodeId> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    fn child_mut(&mut self, side: Side) -> &mut Option<NodeId> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

/// Binary tree of [`Value`]s stored in an arena.
///
/// Freed slots stay as tombstones until the next structural copy
/// ([`Tree::compacted`]), so handles of removed nodes never alias live ones
/// within one arena.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Option<Node>>,
    root: Option<NodeId>,
    /// Transient "operated-on" marker, kept as a position so it can be
    /// re-resolved against any structurally equal tree.
    selected: Option<Position>,
}

impl Tree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree by inserting `values` in order with the right-biased
    /// duplicate rule. Used by tests and scripted sessions.
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Result<Self, TreeError> {
        let mut tree = Self::new();
        for value in values {
            tree.insert(value)?;
        }
        Ok(tree)
    }

    // ====================================================================
    // Node access
    // ====================================================================

    fn node(&self, id: NodeId) -> Result<&Node, TreeError> {
        self.nodes
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or(TreeError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, TreeError> {
        self.nodes
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(TreeError::UnknownNode(id))
    }

    /// Whether `id` names a live (possibly detached) node.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    /// Whether `id` is live and reachable from the root.
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut at = id;
        loop {
            match self.node(at) {
                Ok(node) => match node.parent {
                    Some(parent) => at = parent,
                    None => return self.root == Some(at),
                },
                Err(_) => return false,
            }
        }
    }

    /// Root node, `None` for an empty tree.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Whether the tree has no root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Stored value. Unknown handles read as `None`.
    #[must_use]
    pub fn value(&self, id: NodeId) -> Option<Value> {
        self.node(id).ok().map(|n| n.value)
    }

    /// Left child. Unknown handles read as childless.
    #[must_use]
    pub fn left(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).ok().and_then(|n| n.left)
    }

    /// Right child. Unknown handles read as childless.
    #[must_use]
    pub fn right(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).ok().and_then(|n| n.right)
    }

    /// Child on `side`.
    #[must_use]
    pub fn child(&self, id: NodeId, side: Side) -> Option<NodeId> {
        self.node(id).ok().and_then(|n| n.child(side))
    }

    /// Parent link.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).ok().and_then(|n| n.parent)
    }

    /// Positional index of an attached node.
    #[must_use]
    pub fn position(&self, id: NodeId) -> Option<Position> {
        self.node(id).ok().map(|n| n.position)
    }

    /// Which side of its parent `id` hangs from; `None` for the root or a
    /// detached node.
    #[must_use]
    pub fn side_of(&self, id: NodeId) -> Option<Side> {
        let parent = self.parent(id)?;
        if self.left(parent) == Some(id) {
            Some(Side::Left)
        } else if self.right(parent) == Some(id) {
            Some(Side::Right)
        } else {
            None
        }
    }

    /// Resolve a positional index by walking its root path.
    #[must_use]
    pub fn node_at(&self, position: Position) -> Option<NodeId> {
        let mut at = self.root?;
        for side in position.path() {
            at = self.child(at, side)?;
        }
        Some(at)
    }

    /// Number of nodes reachable from the root.
    #[must_use]
    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            count += 1;
            stack.extend(self.left(id));
            stack.extend(self.right(id));
        }
        count
    }

    /// Edges on the longest root path of the subtree below `from`, or
    /// `None` for an empty subtree.
    #[must_use]
    pub fn height(&self, from: Option<NodeId>) -> Option<u32> {
        let id = from?;
        let left = self.height(self.left(id));
        let right = self.height(self.right(id));
        Some(match (left, right) {
            (None, None) => 0,
            (l, r) => l.max(r).unwrap_or(0) + 1,
        })
    }

    // ====================================================================
    // Selection marker
    // ====================================================================

    /// Mark `id` as the operated-on node (stored by position).
    pub fn select(&mut self, id: Option<NodeId>) {
        self.selected = id.and_then(|id| self.position(id));
    }

    /// Selected position, if any.
    #[must_use]
    pub fn selected(&self) -> Option<Position> {
        self.selected
    }

    /// Selected node resolved against this tree.
    #[must_use]
    pub fn selected_node(&self) -> Option<NodeId> {
        self.selected.and_then(|p| self.node_at(p))
    }

    /// Drop the selection marker.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    // ====================================================================
    // Structural mutation
    // ====================================================================

    /// Allocate a detached node.
    pub fn alloc(&mut self, value: Value) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(Node::new(value)));
        id
    }

    /// Release a node slot. The node must already be detached; its children
    /// (if any) become detached roots of their own.
    pub fn free(&mut self, id: NodeId) -> Result<Value, TreeError> {
        self.detach(id)?;
        for side in [Side::Left, Side::Right] {
            if let Some(child) = self.child(id, side) {
                self.node_mut(child)?.parent = None;
            }
        }
        let node = self.nodes[id.index()]
            .take()
            .ok_or(TreeError::UnknownNode(id))?;
        Ok(node.value)
    }

    /// Make `id` the root (detaching it from any previous parent), or empty
    /// the tree with `None`. The previous root subtree is left detached.
    pub fn set_root(&mut self, id: Option<NodeId>) -> Result<(), TreeError> {
        let Some(id) = id else {
            self.root = None;
            return Ok(());
        };
        self.node(id)?;
        self.check_fits(id, Position::ROOT)?;
        self.detach(id)?;
        self.root = Some(id);
        self.reindex(id, Position::ROOT)
    }

    /// Set the left child of `parent`. See [`Tree::set_child`].
    pub fn set_left(&mut self, parent: NodeId, child: Option<NodeId>) -> Result<(), TreeError> {
        self.set_child(parent, Side::Left, child)
    }

    /// Set the right child of `parent`. See [`Tree::set_child`].
    pub fn set_right(&mut self, parent: NodeId, child: Option<NodeId>) -> Result<(), TreeError> {
        self.set_child(parent, Side::Right, child)
    }

    /// Attach `child` (with its subtree) below `parent`, or clear the slot
    /// with `None`.
    ///
    /// The child is first detached from wherever it hangs, and every
    /// position in its subtree is recomputed. A slot holding a different
    /// subtree must be cleared first.
    pub fn set_child(
        &mut self,
        parent: NodeId,
        side: Side,
        child: Option<NodeId>,
    ) -> Result<(), TreeError> {
        let slot = self.node(parent)?.child(side);
        let Some(child) = child else {
            if let Some(old) = slot {
                self.node_mut(old)?.parent = None;
                *self.node_mut(parent)?.child_mut(side) = None;
            }
            return Ok(());
        };
        self.node(child)?;
        if slot == Some(child) {
            return Ok(());
        }
        if slot.is_some() {
            return Err(TreeError::Occupied { parent, side });
        }
        let mut up = Some(parent);
        while let Some(at) = up {
            if at == child {
                return Err(TreeError::Cycle { node: child });
            }
            up = self.parent(at);
        }
        let parent_position = self.node(parent)?.position;
        let position = parent_position
            .child(side)
            .ok_or(TreeError::DepthExceeded {
                depth: parent_position.depth() + 1,
            })?;
        self.check_fits(child, position)?;

        self.detach(child)?;
        *self.node_mut(parent)?.child_mut(side) = Some(child);
        self.node_mut(child)?.parent = Some(parent);
        self.reindex(child, position)
    }

    /// Unlink `id` from its parent (or from the root slot). The subtree
    /// below `id` stays intact.
    pub fn detach(&mut self, id: NodeId) -> Result<(), TreeError> {
        match self.node(id)?.parent {
            Some(parent) => {
                let parent_node = self.node_mut(parent)?;
                if parent_node.left == Some(id) {
                    parent_node.left = None;
                } else if parent_node.right == Some(id) {
                    parent_node.right = None;
                }
                self.node_mut(id)?.parent = None;
            }
            None => {
                if self.root == Some(id) {
                    self.root = None;
                }
            }
        }
        Ok(())
    }

    /// Splice `replacement` into the slot currently held by `old`.
    ///
    /// `old` ends up detached. When `replacement` is a child of `old` the
    /// rest of `old`'s links are kept, so the caller can free it.
    pub fn replace_child(
        &mut self,
        old: NodeId,
        replacement: Option<NodeId>,
    ) -> Result<(), TreeError> {
        let parent = self.node(old)?.parent;
        let side = self.side_of(old);
        if let Some(new) = replacement {
            self.node(new)?;
            let at = self.node(old)?.position;
            self.check_fits(new, at)?;
        }
        self.detach(old)?;
        match (parent, side) {
            (Some(parent), Some(side)) => self.set_child(parent, side, replacement),
            _ => self.set_root(replacement),
        }
    }

    /// Exchange the tree positions of two nodes.
    ///
    /// Identities move: after the swap `a` occupies `b`'s former slot with
    /// `b`'s former children, and vice versa. Values stay with their nodes.
    /// Handles the case where one node is the parent of the other.
    pub fn swap_nodes(&mut self, a: NodeId, b: NodeId) -> Result<(), TreeError> {
        let na = self.node(a)?.clone();
        let nb = self.node(b)?.clone();
        if a == b {
            return Ok(());
        }
        let swap = |x: Option<NodeId>| {
            x.map(|n| {
                if n == a {
                    b
                } else if n == b {
                    a
                } else {
                    n
                }
            })
        };

        let mut neighbours: Vec<NodeId> = [
            na.parent, na.left, na.right, nb.parent, nb.left, nb.right,
        ]
        .into_iter()
        .flatten()
        .filter(|n| *n != a && *n != b)
        .collect();
        neighbours.sort_unstable();
        neighbours.dedup();

        for n in neighbours {
            let node = self.node_mut(n)?;
            node.parent = swap(node.parent);
            node.left = swap(node.left);
            node.right = swap(node.right);
        }
        {
            let node = self.node_mut(a)?;
            node.parent = swap(nb.parent);
            node.left = swap(nb.left);
            node.right = swap(nb.right);
            node.position = nb.position;
        }
        {
            let node = self.node_mut(b)?;
            node.parent = swap(na.parent);
            node.left = swap(na.left);
            node.right = swap(na.right);
            node.position = na.position;
        }
        self.root = swap(self.root);
        Ok(())
    }

    /// Insert `value` with the right-biased rule and return the new node.
    ///
    /// This is the plain structural insert; the animated variant lives in
    /// the runtime's `Insert` command.
    pub fn insert(&mut self, value: Value) -> Result<NodeId, TreeError> {
        let Some(mut at) = self.root else {
            let id = self.alloc(value);
            self.set_root(Some(id))?;
            return Ok(id);
        };
        loop {
            let current = self.node(at)?.value;
            let side = if value >= current {
                Side::Right
            } else {
                Side::Left
            };
            match self.child(at, side) {
                Some(next) => at = next,
                None => {
                    let parent_position = self.node(at)?.position;
                    if parent_position.child(side).is_none() {
                        return Err(TreeError::DepthExceeded {
                            depth: parent_position.depth() + 1,
                        });
                    }
                    let id = self.alloc(value);
                    self.set_child(at, side, Some(id))?;
                    return Ok(id);
                }
            }
        }
    }

    /// First node holding `value` met on the right-biased descent.
    #[must_use]
    pub fn find_value(&self, value: Value) -> Option<NodeId> {
        let mut at = self.root;
        while let Some(id) = at {
            let current = self.value(id)?;
            at = match value.cmp(&current) {
                std::cmp::Ordering::Equal => return Some(id),
                std::cmp::Ordering::Greater => self.right(id),
                std::cmp::Ordering::Less => self.left(id),
            };
        }
        None
    }

    /// Fail with `DepthExceeded` when the subtree below `id` would not fit
    /// if its root were placed at `at`.
    fn check_fits(&self, id: NodeId, at: Position) -> Result<(), TreeError> {
        let height = self.height(Some(id)).unwrap_or(0);
        // The rightmost index of each level is the largest one.
        let mut probe = at;
        for level in 0..height {
            probe = probe.right().ok_or(TreeError::DepthExceeded {
                depth: at.depth() + level + 1,
            })?;
        }
        Ok(())
    }

    fn reindex(&mut self, id: NodeId, at: Position) -> Result<(), TreeError> {
        let mut stack = vec![(id, at)];
        while let Some((id, position)) = stack.pop() {
            let node = self.node_mut(id)?;
            node.position = position;
            let (left, right) = (node.left, node.right);
            let depth = position.depth() + 1;
            if let Some(left) = left {
                let p = position.left().ok_or(TreeError::DepthExceeded { depth })?;
                stack.push((left, p));
            }
            if let Some(right) = right {
                let p = position.right().ok_or(TreeError::DepthExceeded { depth })?;
                stack.push((right, p));
            }
        }
        Ok(())
    }

    // ====================================================================
    // Linearisation
    // ====================================================================

    /// List the subtree below `from` in the given order.
    #[must_use]
    pub fn linearize(&self, from: Option<NodeId>, order: Order) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.linearize_into(from, order, &mut out);
        out
    }

    fn linearize_into(&self, from: Option<NodeId>, order: Order, out: &mut Vec<NodeId>) {
        let Some(id) = from else {
            return;
        };
        if order == Order::Pre {
            out.push(id);
        }
        self.linearize_into(self.left(id), order, out);
        if order == Order::In {
            out.push(id);
        }
        self.linearize_into(self.right(id), order, out);
        if order == Order::Post {
            out.push(id);
        }
    }

    /// Values of the whole tree in the given order.
    #[must_use]
    pub fn values(&self, order: Order) -> Vec<Value> {
        self.linearize(self.root, order)
            .into_iter()
            .filter_map(|id| self.value(id))
            .collect()
    }

    /// Values laid out by position with `None` for holes, trailing holes
    /// trimmed.
    ///
    /// The output length is the largest position plus one, so this is meant
    /// for shallow trees such as generated ones; positions beyond an
    /// internal cap are omitted.
    #[must_use]
    pub fn level_order(&self) -> Vec<Option<Value>> {
        let mut slots: Vec<Option<Value>> = Vec::new();
        for id in self.linearize(self.root, Order::Pre) {
            let Some(position) = self.position(id) else {
                continue;
            };
            if position.raw() >= LEVEL_ORDER_LIMIT {
                continue;
            }
            let index = position.raw() as usize;
            if slots.len() <= index {
                slots.resize(index + 1, None);
            }
            slots[index] = self.value(id);
        }
        slots
    }

    /// Flat preorder view of all attached nodes, for redraw events.
    #[must_use]
    pub fn view(&self) -> Vec<NodeView> {
        self.linearize(self.root, Order::Pre)
            .into_iter()
            .filter_map(|id| {
                let node = self.node(id).ok()?;
                Some(NodeView {
                    id,
                    position: node.position,
                    value: node.value,
                })
            })
            .collect()
    }

    /// Preorder copy into a fresh arena: same values, same shape, new
    /// handles, selection carried over by position. Detached nodes and
    /// tombstones are dropped.
    #[must_use]
    pub fn compacted(&self) -> Tree {
        let mut copy = Tree {
            nodes: Vec::with_capacity(self.len()),
            root: None,
            selected: self.selected,
        };
        if let Some(root) = self.root {
            let new_root = copy.copy_subtree(self, root, None, Position::ROOT);
            copy.root = Some(new_root);
        }
        copy
    }

    fn copy_subtree(
        &mut self,
        source: &Tree,
        id: NodeId,
        parent: Option<NodeId>,
        position: Position,
    ) -> NodeId {
        let value = source.value(id).unwrap_or_default();
        let new = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(Node {
            value,
            parent,
            left: None,
            right: None,
            position,
        }));
        // Source positions are already valid, so reuse them rather than
        // recomputing (and re-checking) the arithmetic.
        if let Some(left) = source.left(id) {
            let at = source.position(left).unwrap_or(position);
            let copied = self.copy_subtree(source, left, Some(new), at);
            if let Some(node) = self.nodes[new.index()].as_mut() {
                node.left = Some(copied);
            }
        }
        if let Some(right) = source.right(id) {
            let at = source.position(right).unwrap_or(position);
            let copied = self.copy_subtree(source, right, Some(new), at);
            if let Some(node) = self.nodes[new.index()].as_mut() {
                node.right = Some(copied);
            }
        }
        new
    }

    /// Replace this tree's structure with `other`'s, keeping the selection
    /// marker.
    pub fn adopt(&mut self, other: Tree) {
        self.nodes = other.nodes;
        self.root = other.root;
    }

    /// Whether both trees have the same shape and the same value at every
    /// position.
    #[must_use]
    pub fn same_shape(&self, other: &Tree) -> bool {
        let mut mine: Vec<(Position, Value)> = self
            .view()
            .into_iter()
            .map(|v| (v.position, v.value))
            .collect();
        let mut theirs: Vec<(Position, Value)> = other
            .view()
            .into_iter()
            .map(|v| (v.position, v.value))
            .collect();
        mine.sort_unstable();
        theirs.sort_unstable();
        mine == theirs
    }

    /// Check parent links, positions and BST ordering. Returns a list of
    /// violations; empty means the tree is consistent.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let Some(root) = self.root else {
            return errors;
        };
        if self.parent(root).is_some() {
            errors.push(format!("root {root} has a parent"));
        }
        // (node, expected position, exclusive lower bound, upper bound)
        let mut stack = vec![(root, Position::ROOT, None::<Value>, None::<Value>)];
        while let Some((id, expected, lo, hi)) = stack.pop() {
            let Ok(node) = self.node(id) else {
                errors.push(format!("dangling link to {id}"));
                continue;
            };
            if node.position != expected {
                errors.push(format!(
                    "node {id} has index {} but sits at {expected}",
                    node.position
                ));
            }
            if lo.is_some_and(|lo| node.value < lo) {
                errors.push(format!("node {id} value {} below its bound", node.value));
            }
            if hi.is_some_and(|hi| node.value >= hi) {
                errors.push(format!("node {id} value {} not below its bound", node.value));
            }
            for side in [Side::Left, Side::Right] {
                let Some(child) = node.child(side) else {
                    continue;
                };
                if self.parent(child) != Some(id) {
                    errors.push(format!("child {child} does not point back to {id}"));
                }
                let Some(position) = expected.child(side) else {
                    errors.push(format!("child {child} is beyond addressable depth"));
                    continue;
                };
                let (lo, hi) = match side {
                    Side::Left => (lo, Some(node.value)),
                    Side::Right => (Some(node.value), hi),
                };
                stack.push((child, position, lo, hi));
            }
        }
        errors
    }
}
