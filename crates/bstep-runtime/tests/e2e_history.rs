#![forbid(unsafe_code)]

//! End-to-end history sessions.
//!
//! Validates:
//! - Traversal outputs on a fixed tree
//! - Delete splices and position swaps, with undo restoring positions
//! - Cursor navigation with `undo`/`redo`/`jump_to`/`replay`
//! - Branch truncation and depth eviction
//! - Failed operations leave history untouched
//! - Structured warnings on eviction and rollback
//!
//! Run:
//!   cargo test -p bstep-runtime --test e2e_history

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use bstep_core::{AnimationEvent, EventLog, Order, Position, Value};
use bstep_runtime::{CommandError, EngineConfig, History, HistoryConfig, Operation};
use tracing_subscriber::layer::SubscriberExt;

// ============================================================================
// Test Infrastructure
// ============================================================================

fn session(config: &EngineConfig) -> (History, Rc<RefCell<EventLog>>) {
    let log = Rc::new(RefCell::new(EventLog::new()));
    let history = History::with_config(log.clone(), config);
    (history, log)
}

fn seeded() -> EngineConfig {
    EngineConfig {
        seed: Some(42),
        ..EngineConfig::default()
    }
}

fn insert_all(history: &mut History, values: &[Value]) {
    for &value in values {
        history.execute(Operation::Insert { value }).unwrap();
    }
}

fn values_of(history: &History, order: Order) -> Vec<Value> {
    history.stage().tree().values(order)
}

fn value_at(history: &History, raw: u128) -> Option<Value> {
    let tree = history.stage().tree();
    tree.node_at(Position::new(raw)).and_then(|id| tree.value(id))
}

/// A captured log event: level, target and message.
#[derive(Debug, Clone)]
struct Captured {
    level: tracing::Level,
    target: String,
    message: String,
}

struct Capture(Arc<Mutex<Vec<Captured>>>);

struct MessageVisitor(String);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for Capture {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.0.lock().unwrap().push(Captured {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message: visitor.0,
        });
    }
}

fn with_captured<R>(f: impl FnOnce() -> R) -> (R, Vec<Captured>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(Capture(events.clone()));
    let result = tracing::subscriber::with_default(subscriber, f);
    let captured = events.lock().unwrap().clone();
    (result, captured)
}

const SAMPLE: [Value; 6] = [10, 5, 15, 2, 7, 20];

// ============================================================================
// Traversals
// ============================================================================

#[test]
fn traversals_report_nodes_in_order() {
    let (mut history, log) = session(&seeded());
    insert_all(&mut history, &SAMPLE);

    let cases = [
        (Operation::Preorder, vec![10, 5, 2, 7, 15, 20]),
        (Operation::Inorder, vec![2, 5, 7, 10, 15, 20]),
        (Operation::Postorder, vec![2, 7, 5, 20, 15, 10]),
    ];
    for (operation, expected) in cases {
        log.borrow_mut().clear();
        let outcome = history.execute(operation).unwrap();
        let tree = history.stage().tree();
        let values: Vec<Value> = outcome
            .nodes()
            .unwrap()
            .iter()
            .filter_map(|id| tree.value(*id))
            .collect();
        assert_eq!(values, expected, "{operation}");

        let log = log.borrow();
        assert!(log.is_balanced());
        assert_eq!(log.count_kind("add_array"), 1);
        assert_eq!(log.count_kind("insert_into_array"), expected.len());
    }
    // Traversals leave the tree as it was.
    assert_eq!(values_of(&history, Order::Pre), vec![10, 5, 2, 7, 15, 20]);
}

// ============================================================================
// Delete
// ============================================================================

#[test]
fn delete_with_one_child_lifts_the_child() {
    let (mut history, _) = session(&seeded());
    insert_all(&mut history, &SAMPLE);
    assert_eq!(value_at(&history, 6), Some(20));

    history.execute(Operation::Delete { value: 15 }).unwrap();
    assert_eq!(value_at(&history, 2), Some(20));
    assert_eq!(value_at(&history, 6), None);
    assert_eq!(values_of(&history, Order::In), vec![2, 5, 7, 10, 20]);

    history.undo().unwrap();
    assert_eq!(value_at(&history, 2), Some(15));
    assert_eq!(value_at(&history, 6), Some(20));
}

#[test]
fn delete_with_two_children_promotes_successor() {
    let (mut history, log) = session(&seeded());
    insert_all(&mut history, &SAMPLE);
    log.borrow_mut().clear();

    history.execute(Operation::Delete { value: 10 }).unwrap();
    assert_eq!(value_at(&history, 0), Some(15));
    assert_eq!(value_at(&history, 2), Some(20));
    assert_eq!(values_of(&history, Order::In), vec![2, 5, 7, 15, 20]);
    assert!(history.stage().tree().validate().is_empty());

    let log = log.borrow();
    assert!(log.is_balanced());
    assert_eq!(log.chains().len(), 1);
    assert_eq!(log.count_kind("swap_nodes"), 1);
    // Delete, the nested successor search and its nested minimum walk.
    assert_eq!(log.count_kind("start"), 3);
}

// ============================================================================
// Navigation
// ============================================================================

#[test]
fn undo_redo_walk_the_cursor() {
    let (mut history, log) = session(&seeded());
    insert_all(&mut history, &[10, 5, 15]);
    assert_eq!(history.cursor(), 3);
    assert_eq!(
        history.descriptions(),
        vec![
            "insert(value: 10)",
            "insert(value: 5)",
            "insert(value: 15)"
        ]
    );

    log.borrow_mut().clear();
    assert_eq!(history.undo().as_deref(), Some("insert(value: 15)"));
    assert_eq!(values_of(&history, Order::In), vec![5, 10]);
    assert_eq!(log.borrow().count_kind("redraw_tree"), 1);
    assert_eq!(
        history.next_redo_description().as_deref(),
        Some("insert(value: 15)")
    );

    history.redo().unwrap().unwrap();
    assert_eq!(values_of(&history, Order::In), vec![5, 10, 15]);
    assert!(!history.can_redo());
    assert!(history.redo().is_none());
}

#[test]
fn jump_reaches_every_recorded_state() {
    let (mut history, log) = session(&seeded());
    let mut states = vec![history.stage().tree_copy()];
    for value in SAMPLE {
        history.execute(Operation::Insert { value }).unwrap();
        states.push(history.stage().tree_copy());
    }
    history.execute(Operation::Delete { value: 5 }).unwrap();
    states.push(history.stage().tree_copy());

    for target in [0, 7, 3, 5, 1, 6, 2] {
        log.borrow_mut().clear();
        history.jump_to(target).unwrap();
        assert_eq!(history.cursor(), target);
        assert!(
            history.stage().tree().same_shape(&states[target]),
            "state {target}"
        );
        assert!(log.borrow().count_kind("redraw_tree") <= 1);
    }
    assert_eq!(history.len(), 7);
    assert_eq!(
        history.jump_to(8).unwrap_err(),
        CommandError::OutOfHistory { index: 8, len: 7 }
    );
}

#[test]
fn replay_runs_an_entry_again() {
    let (mut history, log) = session(&seeded());
    insert_all(&mut history, &SAMPLE);
    history.execute(Operation::Find { value: 7 }).unwrap();

    log.borrow_mut().clear();
    let outcome = history.replay(6).unwrap();
    let tree = history.stage().tree();
    assert_eq!(outcome.node().and_then(|id| tree.value(id)), Some(7));
    assert_eq!(log.borrow().chains().len(), 1);
    assert_eq!(history.cursor(), 7);

    drop(tree);
    assert_eq!(
        history.replay(7).unwrap_err(),
        CommandError::OutOfHistory { index: 7, len: 7 }
    );
}

#[test]
fn execute_after_undo_discards_redo_branch() {
    let (mut history, _) = session(&seeded());
    insert_all(&mut history, &[10, 5, 15]);
    history.undo();
    history.undo();
    assert_eq!(history.len(), 3);

    history.execute(Operation::Insert { value: 20 }).unwrap();
    assert_eq!(history.len(), 2);
    assert!(!history.can_redo());
    assert_eq!(values_of(&history, Order::In), vec![10, 20]);
}

#[test]
fn random_tree_is_stable_across_navigation() {
    let (mut history, _) = session(&seeded());
    history
        .execute(Operation::Random {
            min: Some(0),
            max: Some(99),
        })
        .unwrap();
    let generated = history.stage().tree_copy();
    insert_all(&mut history, &[50]);

    history.jump_to(0).unwrap();
    assert!(history.stage().tree().is_empty());
    history.jump_to(1).unwrap();
    assert!(history.stage().tree().same_shape(&generated));
    assert!(history.descriptions()[0].starts_with("random_tree("));
}

// ============================================================================
// Failures and limits
// ============================================================================

#[test]
fn failed_operation_is_not_recorded() {
    let (mut history, log) = session(&seeded());
    insert_all(&mut history, &[10, 5]);
    log.borrow_mut().clear();

    assert_eq!(
        history.execute(Operation::Delete { value: 99 }).unwrap_err(),
        CommandError::ValueNotFound(99)
    );
    assert_eq!(
        history
            .execute(Operation::Random {
                min: Some(9),
                max: Some(1)
            })
            .unwrap_err(),
        CommandError::InvalidRange { min: 9, max: 1 }
    );
    assert_eq!(history.len(), 2);
    assert!(log.borrow().is_empty());
    assert_eq!(values_of(&history, Order::In), vec![5, 10]);
}

#[test]
fn depth_limit_evicts_oldest_entries_with_a_warning() {
    let config = EngineConfig {
        seed: Some(1),
        history: HistoryConfig { max_depth: 3 },
        ..EngineConfig::default()
    };
    let (mut history, _) = session(&config);

    let ((), captured) = with_captured(|| insert_all(&mut history, &[4, 2, 6, 1, 3]));
    assert_eq!(history.len(), 3);
    assert_eq!(
        history.descriptions(),
        vec!["insert(value: 6)", "insert(value: 1)", "insert(value: 3)"]
    );

    let warnings: Vec<_> = captured
        .iter()
        .filter(|e| e.level == tracing::Level::WARN)
        .collect();
    assert_eq!(warnings.len(), 2);
    assert!(warnings.iter().all(|e| e.target == "bstep.history"));
    assert!(warnings.iter().all(|e| e.message.contains("evicted")));

    // Evicted entries are gone, but the live tree keeps their effect.
    history.jump_to(0).unwrap();
    assert_eq!(values_of(&history, Order::In), vec![2, 4]);
}

#[test]
fn events_serialize_with_tagged_shape() {
    let (mut history, log) = session(&seeded());
    insert_all(&mut history, &[10, 5]);
    let log = log.borrow();
    let json: Vec<serde_json::Value> = log
        .events()
        .iter()
        .map(|e| serde_json::to_value(e).unwrap())
        .collect();
    assert_eq!(json[0]["event"], "start");
    assert_eq!(json.last().unwrap()["event"], "end");
    assert!(
        log.events()
            .iter()
            .any(|e| matches!(e, AnimationEvent::AddEdge { .. }))
    );
    assert!(json.iter().all(|e| e.get("event").is_some()));
}
