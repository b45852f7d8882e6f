#![forbid(unsafe_code)]

//! Script steps.
//!
//! A step is written `name` or `name=arg`:
//!
//! | Step | Meaning |
//! |------|---------|
//! | `insert=V`, `find=V`, `delete=V` | value operations |
//! | `min`, `max`, `min=V`, `max=V` | extreme of the whole tree or of `V`'s subtree |
//! | `pred=V`, `succ=V` | inorder neighbours of `V` |
//! | `preorder`, `inorder`, `postorder` | traversals |
//! | `random`, `random=A..B` | random tree over the configured or given range |
//! | `undo`, `redo`, `jump=N`, `replay=N` | history navigation |

use std::fmt;
use std::str::FromStr;

use bstep_core::Value;
use bstep_runtime::Operation;

use crate::error::DemoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Run(Operation),
    Undo,
    Redo,
    Jump(usize),
    Replay(usize),
}

impl FromStr for Step {
    type Err = DemoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, arg) = match s.split_once('=') {
            Some((name, arg)) => (name.trim(), Some(arg.trim())),
            None => (s, None),
        };

        let value = || -> Result<Value, DemoError> {
            let arg = arg.ok_or_else(|| DemoError::parse(s, "expected `=<value>`"))?;
            arg.parse()
                .map_err(|_| DemoError::parse(s, format!("`{arg}` is not an integer")))
        };
        let optional_value = || arg.map(|_| value()).transpose();
        let index = || -> Result<usize, DemoError> {
            let arg = arg.ok_or_else(|| DemoError::parse(s, "expected `=<index>`"))?;
            arg.parse()
                .map_err(|_| DemoError::parse(s, format!("`{arg}` is not an index")))
        };
        let bare = |step: Step| match arg {
            None => Ok(step),
            Some(_) => Err(DemoError::parse(s, "takes no argument")),
        };

        match name {
            "insert" => Ok(Self::Run(Operation::Insert { value: value()? })),
            "find" => Ok(Self::Run(Operation::Find { value: value()? })),
            "delete" => Ok(Self::Run(Operation::Delete { value: value()? })),
            "min" => Ok(Self::Run(Operation::Min {
                value: optional_value()?,
            })),
            "max" => Ok(Self::Run(Operation::Max {
                value: optional_value()?,
            })),
            "pred" | "predecessor" => Ok(Self::Run(Operation::Predecessor { value: value()? })),
            "succ" | "successor" => Ok(Self::Run(Operation::Successor { value: value()? })),
            "preorder" => bare(Self::Run(Operation::Preorder)),
            "inorder" => bare(Self::Run(Operation::Inorder)),
            "postorder" => bare(Self::Run(Operation::Postorder)),
            "random" => {
                let (min, max) = match arg {
                    None => (None, None),
                    Some(range) => {
                        let (min, max) = parse_range(range)
                            .ok_or_else(|| DemoError::parse(s, "expected `=<min>..<max>`"))?;
                        (Some(min), Some(max))
                    }
                };
                Ok(Self::Run(Operation::Random { min, max }))
            }
            "undo" => bare(Self::Undo),
            "redo" => bare(Self::Redo),
            "jump" => Ok(Self::Jump(index()?)),
            "replay" => Ok(Self::Replay(index()?)),
            _ => Err(DemoError::parse(s, "unknown step")),
        }
    }
}

/// `A..B`, where either bound may be negative.
fn parse_range(range: &str) -> Option<(Value, Value)> {
    let (min, max) = range.split_once("..")?;
    Some((min.trim().parse().ok()?, max.trim().parse().ok()?))
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Run(operation) => write!(f, "{operation}"),
            Self::Undo => f.write_str("undo"),
            Self::Redo => f.write_str("redo"),
            Self::Jump(cursor) => write!(f, "jump {cursor}"),
            Self::Replay(index) => write!(f, "replay {index}"),
        }
    }
}
