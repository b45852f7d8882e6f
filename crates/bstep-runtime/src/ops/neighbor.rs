#![forbid(unsafe_code)]

//! Inorder predecessor and successor.
//!
//! With a child on the search side the answer is the extreme of that
//! subtree, computed by a nested [`GetMax`]/[`GetMin`]. Otherwise the marker
//! climbs until it arrives at a parent from the opposite side.

use std::fmt;

use bstep_core::{Anchor, AnimationEvent, Element, Glyph, NodeId, Side};

use crate::command::{Command, CommandCore, CommandError, ExecContext, Outcome};
use crate::ops::extreme::{GetMax, GetMin};
use crate::stage::Stage;

/// `side` is `Left` for the predecessor and `Right` for the successor.
fn neighbor(core: &mut CommandCore, side: Side) -> Result<Outcome, CommandError> {
    let node = core.begin()?.ok_or(CommandError::EmptyTree)?;
    let stage = core.stage().clone();
    let (down, arrival) = match side {
        Side::Left => (Glyph::DownLeft, Glyph::UpLeft),
        Side::Right => (Glyph::DownRight, Glyph::UpRight),
    };

    let marker = stage.marker();
    let element = Element::Marker(marker);
    stage.emit(AnimationEvent::ShowElementNextTo {
        element,
        anchor: Anchor::Node(node),
        value: None,
    });

    let child = stage.tree().child(node, side);
    if let Some(child) = child {
        stage.emit(AnimationEvent::ShowMarkerLabel {
            marker,
            glyph: down,
            struck: false,
        });
        stage.emit(AnimationEvent::MoveNextTo {
            element,
            anchor: Anchor::Node(child),
        });
        stage.emit(AnimationEvent::RemoveElement(element));
        let outcome = match side {
            Side::Left => GetMax::new(&stage, child, ExecContext::Nested)?.redo()?,
            Side::Right => GetMin::new(&stage, child, ExecContext::Nested)?.redo()?,
        };
        core.finish();
        return Ok(outcome);
    }

    let mut at = node;
    let found = loop {
        let parent = stage.tree().parent(at);
        let Some(parent) = parent else {
            stage.emit(AnimationEvent::ShowMarkerLabel {
                marker,
                glyph: Glyph::Up,
                struck: false,
            });
            stage.emit(AnimationEvent::ShowMarkerLabel {
                marker,
                glyph: Glyph::Up,
                struck: true,
            });
            stage.emit(AnimationEvent::ShowRemoveElement(element));
            stage.select(None);
            break None;
        };
        stage.emit(AnimationEvent::ShowMarkerLabel {
            marker,
            glyph: Glyph::Up,
            struck: false,
        });
        stage.emit(AnimationEvent::MoveNextTo {
            element,
            anchor: Anchor::Node(parent),
        });
        let came_from = stage.tree().side_of(at);
        if came_from == Some(side.flip()) {
            stage.emit(AnimationEvent::ShowMarkerLabel {
                marker,
                glyph: arrival,
                struck: false,
            });
            stage.emit(AnimationEvent::MoveTo {
                element,
                anchor: Anchor::Node(parent),
            });
            stage.emit(AnimationEvent::RemoveElement(element));
            stage.select(Some(parent));
            break Some(parent);
        }
        stage.emit(AnimationEvent::ShowMarkerLabel {
            marker,
            glyph: arrival,
            struck: true,
        });
        at = parent;
    };

    core.finish();
    Ok(Outcome::Node(found))
}

/// Next-smaller node in inorder.
#[derive(Debug)]
pub struct GetPredecessor {
    core: CommandCore,
}

impl GetPredecessor {
    pub fn new(stage: &Stage, node: NodeId, context: ExecContext) -> Result<Self, CommandError> {
        Ok(Self {
            core: CommandCore::targeting(stage, node, context)?,
        })
    }
}

impl Command for GetPredecessor {
    fn core(&self) -> &CommandCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CommandCore {
        &mut self.core
    }

    fn name(&self) -> &'static str {
        "GetPredecessor"
    }

    fn redo(&mut self) -> Result<Outcome, CommandError> {
        neighbor(&mut self.core, Side::Left)
    }
}

impl fmt::Display for GetPredecessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("get_predecessor(")?;
        self.core.describe_target(f)?;
        f.write_str(")")
    }
}

/// Next-larger node in inorder.
#[derive(Debug)]
pub struct GetSuccessor {
    core: CommandCore,
}

impl GetSuccessor {
    pub fn new(stage: &Stage, node: NodeId, context: ExecContext) -> Result<Self, CommandError> {
        Ok(Self {
            core: CommandCore::targeting(stage, node, context)?,
        })
    }
}

impl Command for GetSuccessor {
    fn core(&self) -> &CommandCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CommandCore {
        &mut self.core
    }

    fn name(&self) -> &'static str {
        "GetSuccessor"
    }

    fn redo(&mut self) -> Result<Outcome, CommandError> {
        neighbor(&mut self.core, Side::Right)
    }
}

impl fmt::Display for GetSuccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("get_successor(")?;
        self.core.describe_target(f)?;
        f.write_str(")")
    }
}
