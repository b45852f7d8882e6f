#![forbid(unsafe_code)]

use std::io;

use bstep_core::TreeError;
use bstep_runtime::{CommandError, ConfigError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DemoError>;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("invalid step `{step}`: {reason}")]
    Parse { step: String, reason: String },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("could not preload tree: {0}")]
    Preload(#[from] TreeError),

    #[error("step {index} (`{step}`) failed: {source}")]
    Command {
        index: usize,
        step: String,
        #[source]
        source: CommandError,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl DemoError {
    pub fn parse(step: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            step: step.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Parse { .. } => 2,
            Self::Config(_) | Self::Preload(_) => 3,
            Self::Command { .. } => 4,
            Self::Json(_) | Self::Io(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_distinguish_failure_kinds() {
        assert_eq!(DemoError::parse("x", "y").exit_code(), 2);
        assert_eq!(
            DemoError::Config(ConfigError::Validation(vec!["bad".into()])).exit_code(),
            3
        );
        let command = DemoError::Command {
            index: 1,
            step: "delete=4".into(),
            source: CommandError::ValueNotFound(4),
        };
        assert_eq!(command.exit_code(), 4);
        assert_eq!(
            command.to_string(),
            "step 1 (`delete=4`) failed: no node holds value 4"
        );
    }
}
