#![forbid(unsafe_code)]

//! Depth-first traversals that collect node references into an array.

use std::fmt;

use bstep_core::{
    Anchor, AnimationEvent, Beat, Element, Glyph, MarkerId, NodeId, Order, Position, Side,
};

use crate::command::{Command, CommandCore, CommandError, ExecContext, Outcome};
use crate::stage::Stage;

/// Shared driver: walks the live tree in `order`, narrating every descent,
/// return and visit.
struct Walk<'a> {
    stage: &'a Stage,
    order: Order,
    marker: MarkerId,
    visited: Vec<NodeId>,
}

impl Walk<'_> {
    fn visit(&mut self, node: NodeId) {
        let stage = self.stage;
        let slot = self.visited.len();
        stage.emit(AnimationEvent::SetMarkerLabel {
            marker: self.marker,
            glyph: Glyph::Blank,
        });
        let copy = Element::Marker(stage.marker());
        let value = stage.tree().value(node);
        stage.emit(AnimationEvent::ShowElementAt {
            element: copy,
            anchor: Anchor::Node(node),
            value,
        });
        stage.emit(AnimationEvent::MoveToArray {
            element: copy,
            slot,
        });
        stage.emit(AnimationEvent::ShowTree(Beat::Quarter));
        stage.emit(AnimationEvent::RemoveElement(copy));
        stage.emit(AnimationEvent::InsertIntoArray { node, slot });
        self.visited.push(node);
    }

    fn descend(&mut self, node: NodeId, side: Side) {
        let glyph = match side {
            Side::Left => Glyph::DownLeft,
            Side::Right => Glyph::DownRight,
        };
        let child = self.stage.tree().child(node, side);
        let Some(child) = child else {
            self.stage.emit(AnimationEvent::ShowMarkerLabel {
                marker: self.marker,
                glyph,
                struck: true,
            });
            return;
        };
        self.stage.emit(AnimationEvent::ShowMarkerLabel {
            marker: self.marker,
            glyph,
            struck: false,
        });
        self.stage.emit(AnimationEvent::MoveNextTo {
            element: Element::Marker(self.marker),
            anchor: Anchor::Node(child),
        });
        self.walk(child);
        self.stage.emit(AnimationEvent::ShowMarkerLabel {
            marker: self.marker,
            glyph: Glyph::Up,
            struck: false,
        });
        self.stage.emit(AnimationEvent::MoveNextTo {
            element: Element::Marker(self.marker),
            anchor: Anchor::Node(node),
        });
    }

    fn walk(&mut self, node: NodeId) {
        if self.order == Order::Pre {
            self.visit(node);
        }
        self.descend(node, Side::Left);
        if self.order == Order::In {
            self.visit(node);
        }
        self.descend(node, Side::Right);
        if self.order == Order::Post {
            self.visit(node);
        }
    }
}

fn traverse(core: &mut CommandCore, order: Order) -> Result<Outcome, CommandError> {
    core.begin()?;
    let stage = core.stage().clone();
    let (root, len) = {
        let tree = stage.tree();
        (tree.root(), tree.len())
    };

    stage.emit(AnimationEvent::AddArray(len));
    let marker = stage.marker();
    stage.emit(AnimationEvent::ShowElementAt {
        element: Element::Marker(marker),
        anchor: Anchor::Slot(Position::ROOT),
        value: None,
    });

    let mut walk = Walk {
        stage: &stage,
        order,
        marker,
        visited: Vec::with_capacity(len),
    };
    match root {
        Some(root) => walk.walk(root),
        None => stage.emit(AnimationEvent::ShowMarkerLabel {
            marker,
            glyph: Glyph::Down,
            struck: true,
        }),
    }
    let visited = walk.visited;
    stage.emit(AnimationEvent::RemoveElement(Element::Marker(marker)));

    tracing::trace!(
        target: "bstep.command",
        order = %order,
        len = visited.len(),
        "traversal finished"
    );
    core.finish();
    Ok(Outcome::Nodes(visited))
}

macro_rules! traversal_command {
    ($(#[$meta:meta])* $name:ident, $order:expr, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name {
            core: CommandCore,
        }

        impl $name {
            pub fn new(stage: &Stage, context: ExecContext) -> Self {
                Self {
                    core: CommandCore::new(stage, None, context),
                }
            }
        }

        impl Command for $name {
            fn core(&self) -> &CommandCore {
                &self.core
            }

            fn core_mut(&mut self) -> &mut CommandCore {
                &mut self.core
            }

            fn name(&self) -> &'static str {
                stringify!($name)
            }

            fn redo(&mut self) -> Result<Outcome, CommandError> {
                traverse(&mut self.core, $order)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str($label)
            }
        }
    };
}

traversal_command!(
    /// Node, left subtree, right subtree.
    ToPreorderArray,
    Order::Pre,
    "to_preorder_array()"
);
traversal_command!(
    /// Left subtree, node, right subtree. Yields nodes in ascending order.
    ToInorderArray,
    Order::In,
    "to_inorder_array()"
);
traversal_command!(
    /// Left subtree, right subtree, node.
    ToPostorderArray,
    Order::Post,
    "to_postorder_array()"
);
