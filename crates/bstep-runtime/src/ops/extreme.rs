#![forbid(unsafe_code)]

//! Minimum and maximum of a subtree.

use std::fmt;

use bstep_core::{Anchor, AnimationEvent, Element, Glyph, NodeId, Side};

use crate::command::{Command, CommandCore, CommandError, ExecContext, Outcome};
use crate::stage::Stage;

/// Follow the `side` chain from the command's target to its end.
fn walk(core: &mut CommandCore, side: Side) -> Result<Outcome, CommandError> {
    let node = core.begin()?.ok_or(CommandError::EmptyTree)?;
    let stage = core.stage().clone();
    let glyph = match side {
        Side::Left => Glyph::DownLeft,
        Side::Right => Glyph::DownRight,
    };

    let marker = stage.marker();
    stage.emit(AnimationEvent::ShowElementNextTo {
        element: Element::Marker(marker),
        anchor: Anchor::Node(node),
        value: None,
    });

    let mut at = node;
    loop {
        let next = stage.tree().child(at, side);
        let Some(next) = next else {
            break;
        };
        stage.emit(AnimationEvent::ShowMarkerLabel {
            marker,
            glyph,
            struck: false,
        });
        stage.emit(AnimationEvent::MoveNextTo {
            element: Element::Marker(marker),
            anchor: Anchor::Node(next),
        });
        at = next;
    }

    // Try the next step, then show it is blocked.
    stage.emit(AnimationEvent::ShowMarkerLabel {
        marker,
        glyph,
        struck: false,
    });
    stage.emit(AnimationEvent::ShowMarkerLabel {
        marker,
        glyph,
        struck: true,
    });
    stage.emit(AnimationEvent::MoveTo {
        element: Element::Marker(marker),
        anchor: Anchor::Node(at),
    });
    stage.emit(AnimationEvent::RemoveElement(Element::Marker(marker)));
    stage.select(Some(at));

    core.finish();
    Ok(Outcome::Node(Some(at)))
}

/// Smallest value in the subtree rooted at the target.
#[derive(Debug)]
pub struct GetMin {
    core: CommandCore,
}

impl GetMin {
    pub fn new(stage: &Stage, node: NodeId, context: ExecContext) -> Result<Self, CommandError> {
        Ok(Self {
            core: CommandCore::targeting(stage, node, context)?,
        })
    }
}

impl Command for GetMin {
    fn core(&self) -> &CommandCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CommandCore {
        &mut self.core
    }

    fn name(&self) -> &'static str {
        "GetMin"
    }

    fn redo(&mut self) -> Result<Outcome, CommandError> {
        walk(&mut self.core, Side::Left)
    }
}

impl fmt::Display for GetMin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("get_min(")?;
        self.core.describe_target(f)?;
        f.write_str(")")
    }
}

/// Largest value in the subtree rooted at the target.
#[derive(Debug)]
pub struct GetMax {
    core: CommandCore,
}

impl GetMax {
    pub fn new(stage: &Stage, node: NodeId, context: ExecContext) -> Result<Self, CommandError> {
        Ok(Self {
            core: CommandCore::targeting(stage, node, context)?,
        })
    }
}

impl Command for GetMax {
    fn core(&self) -> &CommandCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CommandCore {
        &mut self.core
    }

    fn name(&self) -> &'static str {
        "GetMax"
    }

    fn redo(&mut self) -> Result<Outcome, CommandError> {
        walk(&mut self.core, Side::Right)
    }
}

impl fmt::Display for GetMax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("get_max(")?;
        self.core.describe_target(f)?;
        f.write_str(")")
    }
}
