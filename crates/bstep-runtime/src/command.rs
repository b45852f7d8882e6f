#![forbid(unsafe_code)]

//! Undoable, replayable command infrastructure.
//!
//! Every tree operation is a [`Command`]: it freezes a [`Snapshot`] of the
//! tree when it is constructed, replays its algorithm on [`Command::redo`]
//! (emitting animation events for each observable step), and rolls the tree
//! back to the snapshot on [`Command::undo`].
//!
//! The shared bookkeeping lives in [`CommandCore`], which each concrete
//! command embeds.
//!
//! # Invariants
//!
//! - `redo()` followed by `undo()` restores the construction-time tree
//!   exactly (same shape, same values).
//! - `undo()` never runs algorithm logic and cannot fail.
//! - Each `redo()` call emits exactly one `Start` and, on success, exactly
//!   one `End` for this command; nested commands add their own pairs in
//!   between.
//! - A command's snapshot never changes after construction.
//!
//! # Failure Modes
//!
//! - **Stale target**: the construction-time target position no longer
//!   resolves in the live tree (the tree was edited behind the command's
//!   back). `redo` fails with [`CommandError::StaleTarget`] before emitting
//!   anything.
//! - **Depth overflow**: an insert would go past the addressable depth.
//!   Detected before the tree is touched.

use std::fmt;

use bstep_core::{AnimationEvent, Beat, NodeId, Position, Snapshot, TreeError, Value};
use thiserror::Error;

use crate::stage::Stage;

/// How a command is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecContext {
    /// Top-level step driven by the user or the history controller.
    #[default]
    Standalone,
    /// Sub-step invoked from inside another command's `redo`.
    Nested,
}

impl ExecContext {
    #[must_use]
    pub const fn is_nested(self) -> bool {
        matches!(self, Self::Nested)
    }
}

impl fmt::Display for ExecContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standalone => f.write_str("standalone"),
            Self::Nested => f.write_str("nested"),
        }
    }
}

/// Result of one `redo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Mutating operations.
    Unit,
    /// Queries returning at most one node.
    Node(Option<NodeId>),
    /// Traversals; references into the live tree in visit order.
    Nodes(Vec<NodeId>),
}

impl Outcome {
    /// The single node, for [`Outcome::Node`].
    #[must_use]
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Self::Node(node) => *node,
            _ => None,
        }
    }

    /// The node list, for [`Outcome::Nodes`].
    #[must_use]
    pub fn nodes(&self) -> Option<&[NodeId]> {
        match self {
            Self::Nodes(nodes) => Some(nodes),
            _ => None,
        }
    }
}

/// Errors that can occur while building or running a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error(transparent)]
    Tree(#[from] TreeError),
    /// The target recorded at construction no longer exists in the live tree.
    #[error("target at index {position} no longer exists")]
    StaleTarget { position: Position },
    #[error("invalid range: min {min} exceeds max {max}")]
    InvalidRange { min: Value, max: Value },
    #[error("no node holds value {0}")]
    ValueNotFound(Value),
    #[error("the tree is empty")]
    EmptyTree,
    /// A history index past the recorded entries.
    #[error("history index {index} out of range (length {len})")]
    OutOfHistory { index: usize, len: usize },
}

// ============================================================================
// Listeners
// ============================================================================

/// Callback invoked when a command chain starts or ends.
pub type Listener = Box<dyn FnMut()>;

/// Handle returned when registering a listener, used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Ordered list of listeners.
#[derive(Default)]
pub struct Listeners {
    entries: Vec<(ListenerId, Listener)>,
    next: u64,
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

impl Listeners {
    /// Append a listener; it runs after every previously added one.
    pub fn add(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next);
        self.next += 1;
        self.entries.push((id, listener));
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn fire(&mut self) {
        for (_, listener) in &mut self.entries {
            listener();
        }
    }
}

// ============================================================================
// CommandCore
// ============================================================================

/// State shared by every concrete command: the stage, the frozen snapshot,
/// the invocation counter and the listener lists.
pub struct CommandCore {
    stage: Stage,
    snapshot: Snapshot,
    context: ExecContext,
    redo_calls: u32,
    node: Option<NodeId>,
    start_listeners: Listeners,
    end_listeners: Listeners,
}

impl fmt::Debug for CommandCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandCore")
            .field("snapshot", &self.snapshot)
            .field("context", &self.context)
            .field("redo_calls", &self.redo_calls)
            .field("node", &self.node)
            .field("start_listeners", &self.start_listeners)
            .field("end_listeners", &self.end_listeners)
            .finish()
    }
}

impl CommandCore {
    /// Freeze the live tree with `target` as the selection and reset the
    /// tree's transient selection marker.
    pub fn new(stage: &Stage, target: Option<NodeId>, context: ExecContext) -> Self {
        let snapshot = Snapshot::capture(&stage.tree(), target);
        stage.tree_mut().clear_selection();
        Self {
            stage: stage.clone(),
            snapshot,
            context,
            redo_calls: 0,
            node: None,
            start_listeners: Listeners::default(),
            end_listeners: Listeners::default(),
        }
    }

    /// Like [`CommandCore::new`], but `target` must be a node attached to
    /// the live tree.
    pub fn targeting(
        stage: &Stage,
        target: NodeId,
        context: ExecContext,
    ) -> Result<Self, CommandError> {
        if !stage.tree().is_attached(target) {
            return Err(TreeError::UnknownNode(target).into());
        }
        Ok(Self::new(stage, Some(target), context))
    }

    #[must_use]
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    #[must_use]
    pub fn context(&self) -> ExecContext {
        self.context
    }

    #[must_use]
    pub fn redo_calls(&self) -> u32 {
        self.redo_calls
    }

    /// The construction-time target resolved against the live tree during
    /// the most recent `redo`.
    #[must_use]
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn start_listeners(&mut self) -> &mut Listeners {
        &mut self.start_listeners
    }

    pub fn end_listeners(&mut self) -> &mut Listeners {
        &mut self.end_listeners
    }

    /// Open a redo chain.
    ///
    /// Resolves the target first, so a stale target fails before any event
    /// is emitted. Then bumps the counter, emits `Start`, fires start
    /// listeners and, when standalone, clears stale visuals and brings the
    /// selection highlight onto the target.
    pub fn begin(&mut self) -> Result<Option<NodeId>, CommandError> {
        let node = match self.snapshot.selected() {
            Some(position) => Some(
                self.stage
                    .tree()
                    .node_at(position)
                    .ok_or(CommandError::StaleTarget { position })?,
            ),
            None => None,
        };
        self.node = node;
        self.redo_calls += 1;

        tracing::debug!(
            target: "bstep.command",
            redo_calls = self.redo_calls,
            context = %self.context,
            target_index = ?self.snapshot.selected().map(Position::raw),
            "redo started"
        );

        self.stage.emit(AnimationEvent::Start);
        self.start_listeners.fire();

        if self.context == ExecContext::Standalone {
            self.stage.emit(AnimationEvent::ClearArray);
            match node {
                Some(node) if self.stage.shown_selection() != Some(node) => {
                    self.stage.emit(AnimationEvent::ShowSelect(Some(node)));
                }
                Some(_) => {}
                None => self.stage.emit(AnimationEvent::Select(None)),
            }
            self.stage.set_shown_selection(node);
        }
        self.stage.tree_mut().select(node);
        Ok(node)
    }

    /// Close a redo chain: settle the tree (standalone only), emit `End`
    /// and fire end listeners.
    pub fn finish(&mut self) {
        if self.context == ExecContext::Standalone {
            self.stage.emit(AnimationEvent::ShowTree(Beat::Full));
        }
        self.stage.emit(AnimationEvent::End);
        self.end_listeners.fire();
        tracing::debug!(
            target: "bstep.command",
            redo_calls = self.redo_calls,
            context = %self.context,
            "redo finished"
        );
    }

    /// Put a fresh copy of the snapshot back into the live tree.
    pub fn restore(&mut self) {
        let len = {
            let mut tree = self.stage.tree_mut();
            self.snapshot.restore_into(&mut tree);
            tree.len()
        };
        // Restoring compacts the arena, so any shown handle is stale.
        self.stage.set_shown_selection(None);
        tracing::debug!(
            target: "bstep.command",
            len,
            "tree restored from snapshot"
        );
    }

    /// Value and index of the construction-time target, as
    /// `value: V, index: I`.
    pub fn describe_target(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.snapshot.selected_value(), self.snapshot.selected()) {
            (Some(value), Some(position)) => write!(f, "value: {value}, index: {position}"),
            _ => f.write_str("root"),
        }
    }
}

// ============================================================================
// Command trait
// ============================================================================

/// A replayable, undoable tree operation.
///
/// `Display` gives the stable description shown in history lists, e.g.
/// `delete(value: 15, index: 2)`.
pub trait Command: fmt::Display {
    fn core(&self) -> &CommandCore;

    fn core_mut(&mut self) -> &mut CommandCore;

    /// Execute the operation on the live tree, emitting its events.
    ///
    /// Safe to call repeatedly; each call replays from the current tree.
    fn redo(&mut self) -> Result<Outcome, CommandError>;

    /// Restore the tree to its state at construction.
    fn undo(&mut self) {
        self.core_mut().restore();
    }

    /// Short operation name for logs.
    fn name(&self) -> &'static str;

    fn redo_calls(&self) -> u32 {
        self.core().redo_calls()
    }

    fn context(&self) -> ExecContext {
        self.core().context()
    }

    fn snapshot(&self) -> &Snapshot {
        self.core().snapshot()
    }

    fn add_start_listener(&mut self, listener: Listener) -> ListenerId {
        self.core_mut().start_listeners().add(listener)
    }

    fn add_end_listener(&mut self, listener: Listener) -> ListenerId {
        self.core_mut().end_listeners().add(listener)
    }

    fn remove_start_listener(&mut self, id: ListenerId) -> bool {
        self.core_mut().start_listeners().remove(id)
    }

    fn remove_end_listener(&mut self, id: ListenerId) -> bool {
        self.core_mut().end_listeners().remove(id)
    }
}

impl fmt::Debug for dyn Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.name())
            .field("description", &self.to_string())
            .field("redo_calls", &self.redo_calls())
            .field("context", &self.context())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use bstep_core::{EventLog, Tree};

    #[test]
    fn listeners_run_in_order_and_can_be_removed() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Listeners::default();
        let a = {
            let calls = Rc::clone(&calls);
            listeners.add(Box::new(move || calls.borrow_mut().push("a")))
        };
        {
            let calls = Rc::clone(&calls);
            listeners.add(Box::new(move || calls.borrow_mut().push("b")));
        }
        listeners.fire();
        assert!(listeners.remove(a));
        assert!(!listeners.remove(a));
        listeners.fire();
        assert_eq!(*calls.borrow(), vec!["a", "b", "b"]);
    }

    #[test]
    fn begin_fails_on_stale_target_without_events() {
        let log = Rc::new(RefCell::new(EventLog::new()));
        let stage = Stage::new(log.clone());
        stage.load(Tree::from_values([10, 5]).unwrap());
        let five = stage.tree().find_value(5).unwrap();
        let mut core = CommandCore::targeting(&stage, five, ExecContext::Standalone).unwrap();
        stage.load(Tree::from_values([10]).unwrap());

        assert_eq!(
            core.begin(),
            Err(CommandError::StaleTarget {
                position: Position::new(1)
            })
        );
        assert!(log.borrow().is_empty());
        assert_eq!(core.redo_calls(), 0);
    }

    #[test]
    fn nested_begin_skips_visual_housekeeping() {
        let log = Rc::new(RefCell::new(EventLog::new()));
        let stage = Stage::new(log.clone());
        stage.load(Tree::from_values([10]).unwrap());
        let root = stage.tree().root().unwrap();
        let mut core = CommandCore::targeting(&stage, root, ExecContext::Nested).unwrap();
        core.begin().unwrap();
        core.finish();
        assert_eq!(
            log.borrow().events(),
            &[AnimationEvent::Start, AnimationEvent::End]
        );
    }

    #[test]
    fn targeting_rejects_detached_nodes() {
        let stage = Stage::new(Rc::new(RefCell::new(EventLog::new())));
        let loose = stage.tree_mut().alloc(1);
        assert!(matches!(
            CommandCore::targeting(&stage, loose, ExecContext::Standalone),
            Err(CommandError::Tree(TreeError::UnknownNode(_)))
        ));
    }

    #[test]
    fn outcome_accessors() {
        assert_eq!(Outcome::Unit.node(), None);
        assert_eq!(Outcome::Nodes(Vec::new()).nodes(), Some(&[][..]));
        assert_eq!(Outcome::Unit.nodes(), None);
    }
}
