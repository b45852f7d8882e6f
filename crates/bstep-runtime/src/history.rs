#![forbid(unsafe_code)]

//! History controller for stepping through tree operations.
//!
//! [`History`] builds commands from [`Operation`]s, runs them, and keeps them
//! on two stacks so the session can move backwards and forwards:
//!
//! - **Depth limit**: oldest applied entries are evicted past `max_depth`
//! - **Branch handling**: executing a new operation clears the redo stack
//! - **Navigation**: `jump_to` and `replay` reach any recorded point through
//!   ordinary `undo`/`redo` calls
//!
//! # Invariants
//!
//! 1. `undo_stack.len() <= config.max_depth` after any operation.
//! 2. The redo stack is cleared whenever a new operation is executed.
//! 3. The live tree equals the state after the last entry of the undo stack
//!    (or the initial tree when it is empty).
//! 4. A failed operation leaves both the tree and the stacks unchanged.
//!
//! ```text
//! execute(op5)
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [cmd1, cmd2, cmd3, cmd4, cmd5]    │
//! │ Redo Stack: []                                │
//! └───────────────────────────────────────────────┘
//!
//! undo() x2
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [cmd1, cmd2, cmd3]                │
//! │ Redo Stack: [cmd5, cmd4]                      │
//! └───────────────────────────────────────────────┘
//!
//! execute(op6)  <-- new branch, clears redo
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [cmd1, cmd2, cmd3, cmd6]          │
//! │ Redo Stack: []                                │
//! └───────────────────────────────────────────────┘
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use bstep_core::AnimationSink;

use crate::command::{Command, CommandError, Outcome};
use crate::config::{EngineConfig, HistoryConfig};
use crate::operation::Operation;
use crate::stage::Stage;

/// Ordered, navigable list of executed commands.
pub struct History {
    stage: Stage,
    /// Applied commands (newest at back).
    undo_stack: VecDeque<Box<dyn Command>>,
    /// Undone commands (next to redo at back).
    redo_stack: VecDeque<Box<dyn Command>>,
    config: HistoryConfig,
}

impl fmt::Debug for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field("undo_depth", &self.undo_stack.len())
            .field("redo_depth", &self.redo_stack.len())
            .field("config", &self.config)
            .finish()
    }
}

impl History {
    #[must_use]
    pub fn new(stage: Stage, config: HistoryConfig) -> Self {
        Self {
            stage,
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            config,
        }
    }

    /// Start a session: a fresh stage writing to `sink`, configured from
    /// `config`.
    pub fn with_config(sink: Rc<RefCell<dyn AnimationSink>>, config: &EngineConfig) -> Self {
        Self::new(Stage::with_config(sink, config), config.history.clone())
    }

    #[must_use]
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    // ========================================================================
    // Core Operations
    // ========================================================================

    /// Build and run `operation` against the current tree, then record it.
    ///
    /// Entries past the cursor are discarded. If the command fails after
    /// touching the tree it is rolled back and nothing is recorded.
    pub fn execute(&mut self, operation: Operation) -> Result<Outcome, CommandError> {
        let mut command = operation.build(&self.stage)?;
        let outcome = match command.redo() {
            Ok(outcome) => outcome,
            Err(err) => {
                command.undo();
                tracing::warn!(
                    target: "bstep.history",
                    operation = %operation,
                    error = %err,
                    "operation failed and was rolled back"
                );
                return Err(err);
            }
        };
        self.push(command);
        Ok(outcome)
    }

    /// Record a command that has already been run.
    ///
    /// Clears the redo stack (new branch) and enforces the depth limit.
    pub fn push(&mut self, command: Box<dyn Command>) {
        if !self.redo_stack.is_empty() {
            tracing::debug!(
                target: "bstep.history",
                discarded = self.redo_stack.len(),
                "redo branch discarded"
            );
            self.redo_stack.clear();
        }
        tracing::debug!(
            target: "bstep.history",
            description = %command,
            cursor = self.undo_stack.len() + 1,
            "entry pushed"
        );
        self.undo_stack.push_back(command);
        self.enforce_limits();
    }

    /// Roll back the newest applied entry. Returns its description.
    ///
    /// Emits a `RedrawTree` so the renderer can resynchronise.
    pub fn undo(&mut self) -> Option<String> {
        let description = self.undo_step()?;
        self.stage.redraw();
        Some(description)
    }

    /// Re-run the most recently undone entry.
    ///
    /// On failure the entry is rolled back and stays on the redo stack.
    pub fn redo(&mut self) -> Option<Result<Outcome, CommandError>> {
        let mut command = self.redo_stack.pop_back()?;
        match command.redo() {
            Ok(outcome) => {
                tracing::debug!(
                    target: "bstep.history",
                    description = %command,
                    redo_calls = command.redo_calls(),
                    "entry redone"
                );
                self.undo_stack.push_back(command);
                Some(Ok(outcome))
            }
            Err(err) => {
                command.undo();
                tracing::warn!(
                    target: "bstep.history",
                    description = %command,
                    error = %err,
                    "redo failed"
                );
                self.redo_stack.push_back(command);
                Some(Err(err))
            }
        }
    }

    /// Move the cursor to `cursor` applied entries by undoing or redoing.
    ///
    /// Emits one `RedrawTree` if any entry was undone.
    pub fn jump_to(&mut self, cursor: usize) -> Result<(), CommandError> {
        let len = self.len();
        if cursor > len {
            return Err(CommandError::OutOfHistory { index: cursor, len });
        }
        tracing::debug!(
            target: "bstep.history",
            from = self.cursor(),
            to = cursor,
            "jump"
        );
        let mut undone = false;
        while self.cursor() > cursor {
            if self.undo_step().is_none() {
                break;
            }
            undone = true;
        }
        if undone {
            self.stage.redraw();
        }
        while self.cursor() < cursor {
            match self.redo() {
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err),
                None => break,
            }
        }
        Ok(())
    }

    /// Rewind to just before entry `index` and run it again.
    ///
    /// The entry's events are emitted afresh; entries after it move to the
    /// redo stack.
    pub fn replay(&mut self, index: usize) -> Result<Outcome, CommandError> {
        let len = self.len();
        if index >= len {
            return Err(CommandError::OutOfHistory { index, len });
        }
        self.jump_to(index)?;
        self.redo()
            .unwrap_or(Err(CommandError::OutOfHistory { index, len }))
    }

    /// Check if undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    // ========================================================================
    // Info
    // ========================================================================

    /// Number of applied entries.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of recorded entries, applied or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.undo_stack.len() + self.redo_stack.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Descriptions of all entries in chronological order.
    #[must_use]
    pub fn descriptions(&self) -> Vec<String> {
        self.undo_stack
            .iter()
            .chain(self.redo_stack.iter().rev())
            .map(|c| c.to_string())
            .collect()
    }

    /// Get the description of the next undo command.
    #[must_use]
    pub fn next_undo_description(&self) -> Option<String> {
        self.undo_stack.back().map(|c| c.to_string())
    }

    /// Get the description of the next redo command.
    #[must_use]
    pub fn next_redo_description(&self) -> Option<String> {
        self.redo_stack.back().map(|c| c.to_string())
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Forget all entries. The live tree is left as it is.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn undo_step(&mut self) -> Option<String> {
        let mut command = self.undo_stack.pop_back()?;
        command.undo();
        let description = command.to_string();
        tracing::debug!(
            target: "bstep.history",
            description = %description,
            cursor = self.undo_stack.len(),
            "entry undone"
        );
        self.redo_stack.push_back(command);
        Some(description)
    }

    fn enforce_limits(&mut self) {
        while self.undo_stack.len() > self.config.max_depth {
            if let Some(command) = self.undo_stack.pop_front() {
                tracing::warn!(
                    target: "bstep.history",
                    description = %command,
                    max_depth = self.config.max_depth,
                    "oldest entry evicted"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::testing::session;
    use bstep_core::{AnimationEvent, Order};

    fn history() -> (History, std::rc::Rc<std::cell::RefCell<bstep_core::EventLog>>) {
        let (stage, log) = session();
        (History::new(stage, HistoryConfig::default()), log)
    }

    fn inorder(history: &History) -> Vec<i64> {
        history.stage().tree().values(Order::In)
    }

    fn insert_all(history: &mut History, values: &[i64]) {
        for &value in values {
            history.execute(Operation::Insert { value }).unwrap();
        }
    }

    #[test]
    fn undo_redo_round_trip() {
        let (mut history, _) = history();
        insert_all(&mut history, &[10, 5, 15]);
        assert_eq!(history.undo().as_deref(), Some("insert(value: 15)"));
        assert_eq!(inorder(&history), vec![5, 10]);
        assert!(history.redo().unwrap().is_ok());
        assert_eq!(inorder(&history), vec![5, 10, 15]);
        assert!(history.redo().is_none());
    }

    #[test]
    fn undo_emits_redraw() {
        let (mut history, log) = history();
        insert_all(&mut history, &[1]);
        log.borrow_mut().clear();
        history.undo();
        assert_eq!(
            log.borrow().events(),
            &[AnimationEvent::RedrawTree(Vec::new())]
        );
    }

    #[test]
    fn undo_forgets_shown_selection() {
        let (mut history, log) = history();
        // Arena order 10, 20, 5; a compacted copy lays out 10, 5, 20, so
        // 5 takes over the handle 20 had.
        insert_all(&mut history, &[10, 20, 5]);
        history.execute(Operation::Find { value: 20 }).unwrap();
        assert!(history.stage().shown_selection().is_some());

        history.undo();
        assert_eq!(history.stage().shown_selection(), None);

        log.borrow_mut().clear();
        history.execute(Operation::Delete { value: 5 }).unwrap();
        assert_eq!(log.borrow().count_kind("show_select"), 1);
        assert_eq!(inorder(&history), vec![10, 20]);
    }

    #[test]
    fn new_operation_discards_redo_branch() {
        let (mut history, _) = history();
        insert_all(&mut history, &[10, 5, 15]);
        history.undo();
        history.undo();
        insert_all(&mut history, &[20]);
        assert_eq!(history.len(), 2);
        assert!(!history.can_redo());
        assert_eq!(
            history.descriptions(),
            vec!["insert(value: 10)", "insert(value: 20)"]
        );
    }

    #[test]
    fn failed_operation_is_not_recorded() {
        let (mut history, _) = history();
        insert_all(&mut history, &[10]);
        assert_eq!(
            history.execute(Operation::Delete { value: 99 }),
            Err(CommandError::ValueNotFound(99))
        );
        assert_eq!(history.len(), 1);
        assert_eq!(inorder(&history), vec![10]);
    }

    #[test]
    fn jump_and_replay() {
        let (mut history, log) = history();
        insert_all(&mut history, &[10, 5, 15, 2]);
        history.jump_to(1).unwrap();
        assert_eq!(inorder(&history), vec![10]);
        assert_eq!(history.cursor(), 1);
        history.jump_to(4).unwrap();
        assert_eq!(inorder(&history), vec![2, 5, 10, 15]);

        log.borrow_mut().clear();
        history.replay(2).unwrap();
        assert_eq!(history.cursor(), 3);
        assert_eq!(inorder(&history), vec![5, 10, 15]);
        assert_eq!(log.borrow().chains().len(), 1);

        assert_eq!(
            history.replay(9),
            Err(CommandError::OutOfHistory { index: 9, len: 4 })
        );
        assert!(history.jump_to(5).is_err());
    }

    #[test]
    fn depth_limit_evicts_oldest() {
        let (stage, _) = session();
        let mut history = History::new(stage, HistoryConfig { max_depth: 2 });
        insert_all(&mut history, &[10, 5, 15]);
        assert_eq!(history.len(), 2);
        assert_eq!(
            history.descriptions(),
            vec!["insert(value: 5)", "insert(value: 15)"]
        );
        history.jump_to(0).unwrap();
        assert_eq!(inorder(&history), vec![10]);
    }

    #[test]
    fn queries_are_recorded_too() {
        let (mut history, _) = history();
        insert_all(&mut history, &[10, 5]);
        let found = history.execute(Operation::Find { value: 5 }).unwrap();
        assert_eq!(found.node(), history.stage().tree().find_value(5));
        assert_eq!(history.len(), 3);
        assert_eq!(history.next_undo_description().as_deref(), Some("find(value: 5)"));
    }
}
