#![forbid(unsafe_code)]

//! Concrete tree operations.
//!
//! | Command | Target | Outcome |
//! |---------|--------|---------|
//! | [`Insert`] | value | `Unit` |
//! | [`Find`] | value | `Node` |
//! | [`Delete`] | node | `Unit` |
//! | [`GetMin`] / [`GetMax`] | node | `Node` |
//! | [`GetPredecessor`] / [`GetSuccessor`] | node | `Node` |
//! | [`ToPreorderArray`] / [`ToInorderArray`] / [`ToPostorderArray`] | whole tree | `Nodes` |
//! | [`RandomGenerate`] | range | `Unit` |
//!
//! Node-targeted commands fail to construct when the node is not attached to
//! the live tree.

pub mod delete;
pub mod extreme;
pub mod find;
pub mod insert;
pub mod neighbor;
pub mod random;
pub mod traversal;

pub use delete::Delete;
pub use extreme::{GetMax, GetMin};
pub use find::Find;
pub use insert::Insert;
pub use neighbor::{GetPredecessor, GetSuccessor};
pub use random::RandomGenerate;
pub use traversal::{ToInorderArray, ToPostorderArray, ToPreorderArray};

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::rc::Rc;

    use bstep_core::{EventLog, Tree, Value};

    use crate::config::EngineConfig;
    use crate::stage::Stage;

    pub(crate) fn seeded_session(seed: u64) -> (Stage, Rc<RefCell<EventLog>>) {
        let log = Rc::new(RefCell::new(EventLog::new()));
        let config = EngineConfig {
            seed: Some(seed),
            ..EngineConfig::default()
        };
        let stage = Stage::with_config(log.clone(), &config);
        (stage, log)
    }

    pub(crate) fn session() -> (Stage, Rc<RefCell<EventLog>>) {
        seeded_session(0)
    }

    pub(crate) fn session_with(
        values: impl IntoIterator<Item = Value>,
    ) -> (Stage, Rc<RefCell<EventLog>>) {
        let (stage, log) = session();
        stage.load(Tree::from_values(values).expect("shallow test tree"));
        (stage, log)
    }
}
