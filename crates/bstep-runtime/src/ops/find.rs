#![forbid(unsafe_code)]

use std::cmp::Ordering;
use std::fmt;

use bstep_core::{Anchor, AnimationEvent, CompareSign, Element, Side, Value};

use crate::command::{Command, CommandCore, CommandError, ExecContext, Outcome};
use crate::stage::Stage;

/// Search for a value. Pure query: the tree is never changed.
///
/// With duplicates, the first equal node met on the right-biased descent
/// (the shallowest one on the search path) is returned.
#[derive(Debug)]
pub struct Find {
    core: CommandCore,
    value: Value,
}

impl Find {
    pub fn new(stage: &Stage, value: Value, context: ExecContext) -> Self {
        Self {
            core: CommandCore::new(stage, None, context),
            value,
        }
    }

    #[must_use]
    pub fn value(&self) -> Value {
        self.value
    }
}

impl Command for Find {
    fn core(&self) -> &CommandCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CommandCore {
        &mut self.core
    }

    fn name(&self) -> &'static str {
        "Find"
    }

    fn redo(&mut self) -> Result<Outcome, CommandError> {
        self.core.begin()?;
        let stage = self.core.stage().clone();

        let root = stage.tree().root();
        let Some(root) = root else {
            stage.select(None);
            self.core.finish();
            return Ok(Outcome::Node(None));
        };

        let probe = Element::Marker(stage.marker());
        stage.emit(AnimationEvent::ShowElementNextTo {
            element: probe,
            anchor: Anchor::Node(root),
            value: Some(self.value),
        });

        let mut at = root;
        let found = loop {
            let current = stage.tree().value(at).unwrap_or_default();
            let (sign, side) = match self.value.cmp(&current) {
                Ordering::Equal => (CompareSign::Equal, None),
                Ordering::Less => (CompareSign::Less, Some(Side::Left)),
                Ordering::Greater => (CompareSign::Greater, Some(Side::Right)),
            };
            stage.emit(AnimationEvent::ShowComparison {
                subject: probe,
                node: at,
                sign,
            });
            let Some(side) = side else {
                stage.emit(AnimationEvent::MoveTo {
                    element: probe,
                    anchor: Anchor::Node(at),
                });
                stage.emit(AnimationEvent::RemoveElement(probe));
                stage.select(Some(at));
                break Some(at);
            };
            let (next, slot) = {
                let tree = stage.tree();
                let slot = tree.position(at).and_then(|p| p.child(side));
                (tree.child(at, side), slot)
            };
            match next {
                Some(next) => {
                    stage.emit(AnimationEvent::MoveNextTo {
                        element: probe,
                        anchor: Anchor::Node(next),
                    });
                    at = next;
                }
                None => {
                    let anchor = slot.map_or(Anchor::Node(at), Anchor::Slot);
                    stage.emit(AnimationEvent::MoveNextTo {
                        element: probe,
                        anchor,
                    });
                    stage.emit(AnimationEvent::ShowRemoveElement(probe));
                    stage.select(None);
                    break None;
                }
            }
        };

        tracing::trace!(
            target: "bstep.command",
            value = self.value,
            found = found.is_some(),
            "find finished"
        );
        self.core.finish();
        Ok(Outcome::Node(found))
    }
}

impl fmt::Display for Find {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "find(value: {})", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::testing::{session, session_with};
    use bstep_core::Position;

    #[test]
    fn finds_present_value() {
        let (stage, _) = session_with([10, 5, 15, 7]);
        let mut cmd = Find::new(&stage, 7, ExecContext::Standalone);
        let found = cmd.redo().unwrap().node();
        assert_eq!(found, stage.tree().find_value(7));
        assert_eq!(stage.tree().selected(), Some(Position::new(4)));
        assert_eq!(stage.shown_selection(), found);
    }

    #[test]
    fn miss_points_at_empty_slot() {
        let (stage, log) = session_with([10, 5]);
        let mut cmd = Find::new(&stage, 3, ExecContext::Standalone);
        assert_eq!(cmd.redo(), Ok(Outcome::Node(None)));
        let events = log.borrow().events().to_vec();
        assert!(events.iter().any(|e| matches!(
            e,
            AnimationEvent::MoveNextTo {
                anchor: Anchor::Slot(p),
                ..
            } if *p == Position::new(3)
        )));
        assert!(events.iter().any(|e| e.kind() == "show_remove_element"));
    }

    #[test]
    fn empty_tree_finds_nothing() {
        let (stage, log) = session();
        let mut cmd = Find::new(&stage, 1, ExecContext::Standalone);
        assert_eq!(cmd.redo(), Ok(Outcome::Node(None)));
        assert!(log.borrow().is_balanced());
    }

    #[test]
    fn duplicate_returns_shallowest() {
        let (stage, _) = session_with([10, 10, 10]);
        let found = Find::new(&stage, 10, ExecContext::Standalone)
            .redo()
            .unwrap()
            .node();
        assert_eq!(found, stage.tree().root());
    }

    #[test]
    fn find_leaves_tree_alone() {
        let (stage, _) = session_with([10, 5, 15]);
        let before = stage.tree_copy();
        let mut cmd = Find::new(&stage, 15, ExecContext::Standalone);
        cmd.redo().unwrap();
        assert!(stage.tree().same_shape(&before));
        cmd.undo();
        assert!(stage.tree().same_shape(&before));
    }
}
