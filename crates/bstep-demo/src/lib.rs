#![forbid(unsafe_code)]

//! Scripted driver for bstep sessions.
//!
//! Parses a list of steps, runs them through a [`bstep_runtime::History`]
//! and prints every animation event the steps emit, as indented text or as
//! one JSON object per step.

pub mod cli;
pub mod error;
pub mod session;
pub mod step;

pub use cli::run_from_env;
pub use error::{DemoError, Result};
pub use session::{Session, StepReport, Summary};
pub use step::Step;
