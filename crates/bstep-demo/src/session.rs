#![forbid(unsafe_code)]

//! A scripted session: a history controller plus the event log it writes to.

use std::cell::RefCell;
use std::rc::Rc;

use bstep_core::{AnimationEvent, EventLog, Order, Tree, Value};
use bstep_runtime::{CommandError, EngineConfig, History, Outcome};
use serde::Serialize;

use crate::error::{DemoError, Result};
use crate::step::Step;

/// What one step produced.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub step: String,
    /// Human-readable result, when the step has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    pub events: Vec<AnimationEvent>,
}

/// Final state of the session.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub entries: Vec<String>,
    pub cursor: usize,
    pub inorder: Vec<Value>,
    pub level_order: Vec<Option<Value>>,
}

pub struct Session {
    history: History,
    log: Rc<RefCell<EventLog>>,
    steps_run: usize,
}

impl Session {
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        let log = Rc::new(RefCell::new(EventLog::new()));
        let history = History::with_config(log.clone(), config);
        Self {
            history,
            log,
            steps_run: 0,
        }
    }

    /// Load `values` as the starting tree without recording history.
    pub fn preload(&mut self, values: &[Value]) -> Result<()> {
        let tree = Tree::from_values(values.iter().copied())?;
        self.history.stage().load(tree);
        tracing::debug!(target: "bstep.demo", len = values.len(), "tree preloaded");
        Ok(())
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Run one step and drain the events it emitted.
    pub fn run(&mut self, step: Step) -> Result<StepReport> {
        let index = self.steps_run;
        self.steps_run += 1;
        // Leftovers from a failed step.
        self.log.borrow_mut().clear();
        tracing::debug!(target: "bstep.demo", index, step = %step, "step");

        let failed = |source: CommandError| DemoError::Command {
            index,
            step: step.to_string(),
            source,
        };
        let result = match step {
            Step::Run(operation) => {
                let outcome = self.history.execute(operation).map_err(failed)?;
                self.describe(&outcome)
            }
            Step::Undo => Some(match self.history.undo() {
                Some(description) => format!("undid {description}"),
                None => "nothing to undo".to_string(),
            }),
            Step::Redo => match self.history.redo() {
                Some(Ok(outcome)) => self.describe(&outcome),
                Some(Err(source)) => return Err(failed(source)),
                None => Some("nothing to redo".to_string()),
            },
            Step::Jump(cursor) => {
                self.history.jump_to(cursor).map_err(failed)?;
                Some(format!("cursor at {}", self.history.cursor()))
            }
            Step::Replay(entry) => {
                let outcome = self.history.replay(entry).map_err(failed)?;
                self.describe(&outcome)
            }
        };

        Ok(StepReport {
            index,
            step: step.to_string(),
            result,
            events: self.log.borrow_mut().take(),
        })
    }

    #[must_use]
    pub fn summary(&self) -> Summary {
        let tree = self.history.stage().tree();
        Summary {
            entries: self.history.descriptions(),
            cursor: self.history.cursor(),
            inorder: tree.values(Order::In),
            level_order: tree.level_order(),
        }
    }

    fn describe(&self, outcome: &Outcome) -> Option<String> {
        let tree = self.history.stage().tree();
        match outcome {
            Outcome::Unit => None,
            Outcome::Node(None) => Some("none".to_string()),
            Outcome::Node(Some(id)) => Some(match tree.value(*id) {
                Some(value) => format!("{value} at {id}"),
                None => id.to_string(),
            }),
            Outcome::Nodes(ids) => {
                let values: Vec<String> = ids
                    .iter()
                    .filter_map(|id| tree.value(*id))
                    .map(|v| v.to_string())
                    .collect();
                Some(format!("[{}]", values.join(", ")))
            }
        }
    }
}
