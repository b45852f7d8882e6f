#![forbid(unsafe_code)]

//! User-level operation requests.
//!
//! An [`Operation`] names what the user asked for in terms of values. The
//! controller turns it into a [`Command`] bound to the current tree,
//! resolving values to nodes at that moment.

use std::fmt;

use bstep_core::{NodeId, Value};
use serde::{Deserialize, Serialize};

use crate::command::{Command, CommandError, ExecContext};
use crate::ops::{
    Delete, Find, GetMax, GetMin, GetPredecessor, GetSuccessor, Insert, RandomGenerate,
    ToInorderArray, ToPostorderArray, ToPreorderArray,
};
use crate::stage::Stage;

/// A requested tree operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Insert { value: Value },
    Find { value: Value },
    Delete { value: Value },
    /// Minimum of the subtree holding `value`; the whole tree when `None`.
    Min { value: Option<Value> },
    /// Maximum of the subtree holding `value`; the whole tree when `None`.
    Max { value: Option<Value> },
    Predecessor { value: Value },
    Successor { value: Value },
    Preorder,
    Inorder,
    Postorder,
    /// Random tree over `[min, max]`; configured defaults fill missing bounds.
    Random { min: Option<Value>, max: Option<Value> },
}

impl Operation {
    /// Build the command for the stage's current tree.
    pub fn build(&self, stage: &Stage) -> Result<Box<dyn Command>, CommandError> {
        const CTX: ExecContext = ExecContext::Standalone;
        let command: Box<dyn Command> = match *self {
            Self::Insert { value } => Box::new(Insert::new(stage, value, CTX)),
            Self::Find { value } => Box::new(Find::new(stage, value, CTX)),
            Self::Delete { value } => Box::new(Delete::new(stage, locate(stage, value)?, CTX)?),
            Self::Min { value } => Box::new(GetMin::new(stage, subtree(stage, value)?, CTX)?),
            Self::Max { value } => Box::new(GetMax::new(stage, subtree(stage, value)?, CTX)?),
            Self::Predecessor { value } => {
                Box::new(GetPredecessor::new(stage, locate(stage, value)?, CTX)?)
            }
            Self::Successor { value } => {
                Box::new(GetSuccessor::new(stage, locate(stage, value)?, CTX)?)
            }
            Self::Preorder => Box::new(ToPreorderArray::new(stage, CTX)),
            Self::Inorder => Box::new(ToInorderArray::new(stage, CTX)),
            Self::Postorder => Box::new(ToPostorderArray::new(stage, CTX)),
            Self::Random { min, max } => {
                let defaults = stage.random_config();
                let min = min.unwrap_or(defaults.default_min);
                let max = max.unwrap_or(defaults.default_max);
                Box::new(RandomGenerate::new(stage, min, max, CTX)?)
            }
        };
        Ok(command)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert { value } => write!(f, "insert {value}"),
            Self::Find { value } => write!(f, "find {value}"),
            Self::Delete { value } => write!(f, "delete {value}"),
            Self::Min { value: Some(v) } => write!(f, "min {v}"),
            Self::Min { value: None } => f.write_str("min"),
            Self::Max { value: Some(v) } => write!(f, "max {v}"),
            Self::Max { value: None } => f.write_str("max"),
            Self::Predecessor { value } => write!(f, "predecessor {value}"),
            Self::Successor { value } => write!(f, "successor {value}"),
            Self::Preorder => f.write_str("preorder"),
            Self::Inorder => f.write_str("inorder"),
            Self::Postorder => f.write_str("postorder"),
            Self::Random { min, max } => {
                f.write_str("random")?;
                if let (Some(min), Some(max)) = (min, max) {
                    write!(f, " {min}..{max}")?;
                }
                Ok(())
            }
        }
    }
}

/// Node holding `value` in the live tree.
fn locate(stage: &Stage, value: Value) -> Result<NodeId, CommandError> {
    stage
        .tree()
        .find_value(value)
        .ok_or(CommandError::ValueNotFound(value))
}

/// Node holding `value`, or the root when no value is given.
fn subtree(stage: &Stage, value: Option<Value>) -> Result<NodeId, CommandError> {
    match value {
        Some(value) => locate(stage, value),
        None => stage.tree().root().ok_or(CommandError::EmptyTree),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::testing::{session, session_with};

    #[test]
    fn builds_value_addressed_commands() {
        let (stage, _) = session_with([10, 5, 15]);
        let cmd = Operation::Delete { value: 15 }.build(&stage).unwrap();
        assert_eq!(cmd.to_string(), "delete(value: 15, index: 2)");
        let cmd = Operation::Min { value: None }.build(&stage).unwrap();
        assert_eq!(cmd.to_string(), "get_min(value: 10, index: 0)");
    }

    #[test]
    fn missing_value_is_reported() {
        let (stage, _) = session_with([10]);
        assert_eq!(
            Operation::Successor { value: 3 }.build(&stage).unwrap_err(),
            CommandError::ValueNotFound(3)
        );
    }

    #[test]
    fn empty_tree_has_no_root_target() {
        let (stage, _) = session();
        assert_eq!(
            Operation::Max { value: None }.build(&stage).unwrap_err(),
            CommandError::EmptyTree
        );
    }

    #[test]
    fn random_uses_configured_defaults() {
        let (stage, _) = session();
        let cmd = Operation::Random {
            min: None,
            max: None,
        }
        .build(&stage)
        .unwrap();
        assert_eq!(cmd.to_string(), "random_tree(min: 0, max: 99)");
    }

    #[test]
    fn serde_shape() {
        let op: Operation = serde_json::from_str(r#"{"op":"insert","value":4}"#).unwrap();
        assert_eq!(op, Operation::Insert { value: 4 });
        let op: Operation = serde_json::from_str(r#"{"op":"preorder"}"#).unwrap();
        assert_eq!(op, Operation::Preorder);
        let op: Operation = serde_json::from_str(r#"{"op":"min","value":null}"#).unwrap();
        assert_eq!(op, Operation::Min { value: None });
    }
}
