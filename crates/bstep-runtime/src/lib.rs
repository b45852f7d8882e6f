#![forbid(unsafe_code)]

//! bstep runtime
//!
//! Turns binary search tree algorithms into replayable, undoable steps.
//!
//! # Key Components
//!
//! - [`Stage`] - shared execution context: live tree, animation sink, random
//!   source
//! - [`Command`] - trait every operation implements (`redo`, `undo`,
//!   listeners, description)
//! - [`ops`] - the concrete operations, from [`Insert`] to
//!   [`RandomGenerate`]
//! - [`History`] - controller that records commands and navigates between
//!   them
//! - [`EngineConfig`] - TOML/JSON configuration
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use bstep_core::{EventLog, Order};
//! use bstep_runtime::{EngineConfig, History, Operation};
//!
//! let log = Rc::new(RefCell::new(EventLog::new()));
//! let mut history = History::with_config(log.clone(), &EngineConfig::default());
//! for value in [10, 5, 15] {
//!     history.execute(Operation::Insert { value }).unwrap();
//! }
//! history.execute(Operation::Delete { value: 10 }).unwrap();
//! assert_eq!(history.stage().tree().values(Order::In), vec![5, 15]);
//!
//! history.undo();
//! assert_eq!(history.stage().tree().values(Order::In), vec![5, 10, 15]);
//! assert!(log.borrow().is_balanced());
//! ```
//!
//! # Logging
//!
//! The crate emits `tracing` events under the `bstep.command`,
//! `bstep.history` and `bstep.random` targets and never installs a
//! subscriber itself.

pub mod command;
pub mod config;
pub mod history;
pub mod operation;
pub mod ops;
pub mod stage;

pub use command::{
    Command, CommandCore, CommandError, ExecContext, Listener, ListenerId, Listeners, Outcome,
};
pub use config::{ConfigError, EngineConfig, HistoryConfig, RandomTreeConfig};
pub use history::History;
pub use operation::Operation;
pub use ops::{
    Delete, Find, GetMax, GetMin, GetPredecessor, GetSuccessor, Insert, RandomGenerate,
    ToInorderArray, ToPostorderArray, ToPreorderArray,
};
pub use stage::Stage;
