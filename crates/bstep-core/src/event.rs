#![forbid(unsafe_code)]

//! Animation event vocabulary.
//!
//! Commands describe everything they do to the tree as an ordered stream of
//! [`AnimationEvent`]s. A renderer replays that stream; the core never
//! schedules or draws anything itself.
//!
//! Every command invocation is bracketed by [`AnimationEvent::Start`] and
//! [`AnimationEvent::End`]. Nested commands produce their own bracketed
//! chain inside their parent's.

use std::fmt;

use serde::Serialize;

use crate::Value;
use crate::tree::{NodeId, Position};

/// Handle of a transient visual element (search arrow, probe, value copy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MarkerId(pub u32);

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

/// Something a renderer can place and move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Node(NodeId),
    Marker(MarkerId),
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(id) => id.fmt(f),
            Self::Marker(id) => id.fmt(f),
        }
    }
}

impl From<NodeId> for Element {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<MarkerId> for Element {
    fn from(id: MarkerId) -> Self {
        Self::Marker(id)
    }
}

/// Where an element is placed: at a node, or at a (possibly empty) slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    Node(NodeId),
    Slot(Position),
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(id) => id.fmt(f),
            Self::Slot(position) => write!(f, "@{position}"),
        }
    }
}

impl From<NodeId> for Anchor {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<Position> for Anchor {
    fn from(position: Position) -> Self {
        Self::Slot(position)
    }
}

/// Direction arrow shown on a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Glyph {
    Blank,
    Up,
    UpLeft,
    UpRight,
    Down,
    DownLeft,
    DownRight,
}

impl Glyph {
    /// Arrow character a renderer should draw.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Blank => "",
            Self::Up => "\u{21D1}",
            Self::UpLeft => "\u{21D6}",
            Self::UpRight => "\u{21D7}",
            Self::Down => "\u{21D3}",
            Self::DownLeft => "\u{21D9}",
            Self::DownRight => "\u{21D8}",
        }
    }
}

/// Outcome of comparing a searched value with a node value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareSign {
    Less,
    Equal,
    Greater,
    GreaterOrEqual,
}

impl CompareSign {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Less => "<",
            Self::Equal => "=",
            Self::Greater => ">",
            Self::GreaterOrEqual => "\u{2265}",
        }
    }
}

/// Length of a tree-settling pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Beat {
    Full,
    Quarter,
}

/// Flat description of one attached node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeView {
    pub id: NodeId,
    pub position: Position,
    pub value: Value,
}

/// One visible effect, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum AnimationEvent {
    /// Opens a command chain.
    Start,
    /// Closes the chain opened by the matching `Start`.
    End,
    /// Drop transient visuals left over from earlier commands.
    ClearArray,
    /// Animate the selection highlight moving to a node (or away).
    ShowSelect(Option<NodeId>),
    /// Set the selection highlight without animation.
    Select(Option<NodeId>),
    /// Let the tree settle into its layout.
    ShowTree(Beat),
    /// Redraw the whole tree from scratch.
    RedrawTree(Vec<NodeView>),
    /// Fade an element in beside an anchor. `value` is the label it carries.
    ShowElementNextTo {
        element: Element,
        anchor: Anchor,
        value: Option<Value>,
    },
    /// Fade an element in on top of an anchor.
    ShowElementAt {
        element: Element,
        anchor: Anchor,
        value: Option<Value>,
    },
    RemoveElement(Element),
    /// Animated removal.
    ShowRemoveElement(Element),
    MoveTo {
        element: Element,
        anchor: Anchor,
    },
    MoveNextTo {
        element: Element,
        anchor: Anchor,
    },
    /// Move an element into slot `slot` of the result array.
    MoveToArray {
        element: Element,
        slot: usize,
    },
    /// Animate a relocated subtree to its new positions.
    MoveToPositions(Vec<NodeView>),
    ShowComparison {
        subject: Element,
        node: NodeId,
        sign: CompareSign,
    },
    AddEdge {
        child: NodeId,
        parent: NodeId,
    },
    RemoveEdge {
        child: NodeId,
    },
    SwapNodes {
        a: NodeId,
        b: NodeId,
    },
    SetMarkerLabel {
        marker: MarkerId,
        glyph: Glyph,
    },
    ShowMarkerLabel {
        marker: MarkerId,
        glyph: Glyph,
        struck: bool,
    },
    /// Create an empty result array with `len` slots.
    AddArray(usize),
    InsertIntoArray {
        node: NodeId,
        slot: usize,
    },
}

impl AnimationEvent {
    /// Stable snake_case name of the variant, matching the serialized tag.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::ClearArray => "clear_array",
            Self::ShowSelect(_) => "show_select",
            Self::Select(_) => "select",
            Self::ShowTree(_) => "show_tree",
            Self::RedrawTree(_) => "redraw_tree",
            Self::ShowElementNextTo { .. } => "show_element_next_to",
            Self::ShowElementAt { .. } => "show_element_at",
            Self::RemoveElement(_) => "remove_element",
            Self::ShowRemoveElement(_) => "show_remove_element",
            Self::MoveTo { .. } => "move_to",
            Self::MoveNextTo { .. } => "move_next_to",
            Self::MoveToArray { .. } => "move_to_array",
            Self::MoveToPositions(_) => "move_to_positions",
            Self::ShowComparison { .. } => "show_comparison",
            Self::AddEdge { .. } => "add_edge",
            Self::RemoveEdge { .. } => "remove_edge",
            Self::SwapNodes { .. } => "swap_nodes",
            Self::SetMarkerLabel { .. } => "set_marker_label",
            Self::ShowMarkerLabel { .. } => "show_marker_label",
            Self::AddArray(_) => "add_array",
            Self::InsertIntoArray { .. } => "insert_into_array",
        }
    }

    /// Whether the event opens or closes a chain.
    #[must_use]
    pub const fn is_bracket(&self) -> bool {
        matches!(self, Self::Start | Self::End)
    }
}

fn opt<T: fmt::Display>(f: &mut fmt::Formatter<'_>, value: Option<T>) -> fmt::Result {
    match value {
        Some(value) => write!(f, "{value}"),
        None => f.write_str("-"),
    }
}

impl fmt::Display for AnimationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())?;
        match self {
            Self::Start | Self::End | Self::ClearArray => Ok(()),
            Self::ShowSelect(node) | Self::Select(node) => {
                f.write_str(" ")?;
                opt(f, *node)
            }
            Self::ShowTree(beat) => write!(f, " {beat:?}"),
            Self::RedrawTree(views) | Self::MoveToPositions(views) => {
                for view in views {
                    write!(f, " {}@{}={}", view.id, view.position, view.value)?;
                }
                Ok(())
            }
            Self::ShowElementNextTo {
                element,
                anchor,
                value,
            }
            | Self::ShowElementAt {
                element,
                anchor,
                value,
            } => {
                write!(f, " {element} {anchor} ")?;
                opt(f, *value)
            }
            Self::RemoveElement(element) | Self::ShowRemoveElement(element) => {
                write!(f, " {element}")
            }
            Self::MoveTo { element, anchor } | Self::MoveNextTo { element, anchor } => {
                write!(f, " {element} -> {anchor}")
            }
            Self::MoveToArray { element, slot } => write!(f, " {element} -> [{slot}]"),
            Self::ShowComparison {
                subject,
                node,
                sign,
            } => write!(f, " {subject} {} {node}", sign.symbol()),
            Self::AddEdge { child, parent } => write!(f, " {parent} -> {child}"),
            Self::RemoveEdge { child } => write!(f, " {child}"),
            Self::SwapNodes { a, b } => write!(f, " {a} <-> {b}"),
            Self::SetMarkerLabel { marker, glyph } => write!(f, " {marker} {glyph:?}"),
            Self::ShowMarkerLabel {
                marker,
                glyph,
                struck,
            } => {
                write!(f, " {marker} {glyph:?}")?;
                if *struck {
                    f.write_str(" struck")?;
                }
                Ok(())
            }
            Self::AddArray(len) => write!(f, " {len}"),
            Self::InsertIntoArray { node, slot } => write!(f, " {node} -> [{slot}]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_serialized_tag() {
        let events = [
            AnimationEvent::Start,
            AnimationEvent::Select(None),
            AnimationEvent::ShowMarkerLabel {
                marker: MarkerId(3),
                glyph: Glyph::DownLeft,
                struck: true,
            },
            AnimationEvent::AddArray(4),
        ];
        for event in events {
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["event"], event.kind());
        }
    }

    #[test]
    fn display_is_compact() {
        let event = AnimationEvent::MoveNextTo {
            element: Element::Marker(MarkerId(2)),
            anchor: Anchor::Slot(Position::new(5)),
        };
        assert_eq!(event.to_string(), "move_next_to m2 -> @5");
        assert_eq!(AnimationEvent::Select(None).to_string(), "select -");
    }

    #[test]
    fn glyph_symbols() {
        assert_eq!(Glyph::DownRight.symbol(), "\u{21D8}");
        assert_eq!(Glyph::UpLeft.symbol(), "\u{21D6}");
        assert_eq!(Glyph::Blank.symbol(), "");
    }
}
