#![forbid(unsafe_code)]

use std::fmt;

use bstep_core::{
    Anchor, AnimationEvent, CompareSign, Element, NodeId, Position, Side, TreeError, Value,
};

use crate::command::{Command, CommandCore, CommandError, ExecContext, Outcome};
use crate::stage::Stage;

/// Insert a value, routing equal values to the right.
#[derive(Debug)]
pub struct Insert {
    core: CommandCore,
    value: Value,
    /// Node created by the previous `redo`, removed from the screen when the
    /// command is replayed.
    created: Option<NodeId>,
}

impl Insert {
    pub fn new(stage: &Stage, value: Value, context: ExecContext) -> Self {
        Self {
            core: CommandCore::new(stage, None, context),
            value,
            created: None,
        }
    }

    #[must_use]
    pub fn value(&self) -> Value {
        self.value
    }

    /// Descent path from the root to the empty slot the value belongs in.
    fn plan(&self) -> Result<Vec<(NodeId, Side)>, CommandError> {
        let tree = self.core.stage().tree();
        let mut path = Vec::new();
        let mut at = tree.root();
        while let Some(id) = at {
            let side = match tree.value(id) {
                Some(current) if self.value >= current => Side::Right,
                _ => Side::Left,
            };
            path.push((id, side));
            at = tree.child(id, side);
        }
        if let Some(&(parent, side)) = path.last() {
            let position = tree.position(parent).unwrap_or(Position::ROOT);
            if position.child(side).is_none() {
                return Err(TreeError::DepthExceeded {
                    depth: position.depth() + 1,
                }
                .into());
            }
        }
        Ok(path)
    }
}

impl Command for Insert {
    fn core(&self) -> &CommandCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CommandCore {
        &mut self.core
    }

    fn name(&self) -> &'static str {
        "Insert"
    }

    fn redo(&mut self) -> Result<Outcome, CommandError> {
        let path = self.plan()?;
        self.core.begin()?;
        let stage = self.core.stage().clone();

        if let Some(previous) = self.created.take() {
            stage.emit(AnimationEvent::RemoveElement(Element::Node(previous)));
        }

        let node = stage.tree_mut().alloc(self.value);
        self.created = Some(node);
        let element = Element::Node(node);
        stage.emit(AnimationEvent::ShowElementNextTo {
            element,
            anchor: Anchor::Slot(Position::ROOT),
            value: Some(self.value),
        });

        if path.is_empty() {
            stage.tree_mut().set_root(Some(node))?;
            stage.emit(AnimationEvent::MoveTo {
                element,
                anchor: Anchor::Slot(Position::ROOT),
            });
        }

        for (i, &(at, side)) in path.iter().enumerate() {
            let sign = match side {
                Side::Left => CompareSign::Less,
                Side::Right => CompareSign::GreaterOrEqual,
            };
            stage.emit(AnimationEvent::ShowComparison {
                subject: element,
                node: at,
                sign,
            });
            match path.get(i + 1) {
                Some(&(next, _)) => stage.emit(AnimationEvent::MoveNextTo {
                    element,
                    anchor: Anchor::Node(next),
                }),
                None => {
                    stage.tree_mut().set_child(at, side, Some(node))?;
                    let position = stage.tree().position(node).unwrap_or(Position::ROOT);
                    stage.emit(AnimationEvent::MoveTo {
                        element,
                        anchor: Anchor::Slot(position),
                    });
                    stage.emit(AnimationEvent::AddEdge {
                        child: node,
                        parent: at,
                    });
                }
            }
        }

        stage.select(None);
        self.core.finish();
        Ok(Outcome::Unit)
    }
}

impl fmt::Display for Insert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "insert(value: {})", self.value)
    }
}
