#![forbid(unsafe_code)]

use std::fmt;

use bstep_core::{AnimationEvent, Element, NodeId, NodeView, Order};

use crate::command::{Command, CommandCore, CommandError, ExecContext, Outcome};
use crate::ops::neighbor::GetSuccessor;
use crate::stage::Stage;

/// Remove the target node.
///
/// A node with two children first trades places with its inorder successor
/// (found by a nested [`GetSuccessor`]). Node identity moves with the
/// swap, so a handle to the successor still names the successor's value
/// afterwards. The node then has at most one child and is spliced out.
#[derive(Debug)]
pub struct Delete {
    core: CommandCore,
}

impl Delete {
    pub fn new(stage: &Stage, node: NodeId, context: ExecContext) -> Result<Self, CommandError> {
        Ok(Self {
            core: CommandCore::targeting(stage, node, context)?,
        })
    }
}

impl Command for Delete {
    fn core(&self) -> &CommandCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CommandCore {
        &mut self.core
    }

    fn name(&self) -> &'static str {
        "Delete"
    }

    fn redo(&mut self) -> Result<Outcome, CommandError> {
        let node = self.core.begin()?.ok_or(CommandError::EmptyTree)?;
        let stage = self.core.stage().clone();

        let (left, right) = {
            let tree = stage.tree();
            (tree.left(node), tree.right(node))
        };
        if left.is_some() && right.is_some() {
            let successor = GetSuccessor::new(&stage, node, ExecContext::Nested)?
                .redo()?
                .node();
            if let Some(successor) = successor {
                stage.tree_mut().swap_nodes(node, successor)?;
                stage.emit(AnimationEvent::SwapNodes {
                    a: node,
                    b: successor,
                });
            }
        }

        let child = {
            let tree = stage.tree();
            tree.left(node).or(tree.right(node))
        };
        match child {
            Some(child) => {
                stage.emit(AnimationEvent::ShowRemoveElement(Element::Node(node)));
                stage.emit(AnimationEvent::RemoveEdge { child });
                stage.tree_mut().replace_child(node, Some(child))?;
                let (moved, parent) = {
                    let tree = stage.tree();
                    let moved: Vec<NodeView> = tree
                        .linearize(Some(child), Order::In)
                        .into_iter()
                        .filter_map(|id| {
                            Some(NodeView {
                                id,
                                position: tree.position(id)?,
                                value: tree.value(id)?,
                            })
                        })
                        .collect();
                    (moved, tree.parent(child))
                };
                stage.emit(AnimationEvent::MoveToPositions(moved));
                if let Some(parent) = parent {
                    stage.emit(AnimationEvent::AddEdge { child, parent });
                }
            }
            None => {
                stage.tree_mut().replace_child(node, None)?;
                stage.emit(AnimationEvent::ShowRemoveElement(Element::Node(node)));
            }
        }

        stage.tree_mut().free(node)?;
        stage.select(None);
        self.core.finish();
        Ok(Outcome::Unit)
    }
}

impl fmt::Display for Delete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("delete(")?;
        self.core.describe_target(f)?;
        f.write_str(")")
    }
}
