#![forbid(unsafe_code)]

//! The explicit execution context shared by every command of a session.
//!
//! A [`Stage`] bundles the live tree, the animation sink, the random source
//! and a little visual bookkeeping (marker counter, which node the renderer
//! currently shows as selected). Commands receive a `Stage` at construction
//! and keep a clone; clones are handles to the same session.
//!
//! The stage is single-threaded. Borrows of the tree are short: callers take
//! one, read or edit, and drop it before emitting events or running a
//! nested command.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use bstep_core::{AnimationEvent, AnimationSink, MarkerId, NodeId, Tree};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::{EngineConfig, RandomTreeConfig};

struct StageInner {
    tree: RefCell<Tree>,
    sink: Rc<RefCell<dyn AnimationSink>>,
    shown_selection: Cell<Option<NodeId>>,
    next_marker: Cell<u32>,
    rng: RefCell<SmallRng>,
    random: RandomTreeConfig,
}

/// Shared handle to one session's tree, sink and random source.
#[derive(Clone)]
pub struct Stage {
    inner: Rc<StageInner>,
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("tree_len", &self.inner.tree.borrow().len())
            .field("shown_selection", &self.inner.shown_selection.get())
            .field("markers", &self.inner.next_marker.get())
            .finish()
    }
}

impl Stage {
    /// Create a stage with default configuration and an empty tree.
    pub fn new(sink: Rc<RefCell<dyn AnimationSink>>) -> Self {
        Self::with_config(sink, &EngineConfig::default())
    }

    /// Create a stage from `config`. The random source is seeded from
    /// `config.seed`, or from OS entropy when absent.
    pub fn with_config(sink: Rc<RefCell<dyn AnimationSink>>, config: &EngineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Self {
            inner: Rc::new(StageInner {
                tree: RefCell::new(Tree::new()),
                sink,
                shown_selection: Cell::new(None),
                next_marker: Cell::new(0),
                rng: RefCell::new(rng),
                random: config.random.clone(),
            }),
        }
    }

    /// Replace the live tree wholesale (e.g. to load a prepared tree).
    pub fn load(&self, tree: Tree) {
        *self.inner.tree.borrow_mut() = tree;
        self.inner.shown_selection.set(None);
    }

    /// Borrow the live tree.
    ///
    /// # Panics
    ///
    /// Panics if the tree is currently mutably borrowed.
    pub fn tree(&self) -> Ref<'_, Tree> {
        self.inner.tree.borrow()
    }

    /// Mutably borrow the live tree.
    ///
    /// # Panics
    ///
    /// Panics if the tree is currently borrowed.
    pub fn tree_mut(&self) -> RefMut<'_, Tree> {
        self.inner.tree.borrow_mut()
    }

    /// A compacted copy of the live tree.
    #[must_use]
    pub fn tree_copy(&self) -> Tree {
        self.inner.tree.borrow().compacted()
    }

    /// Send one event to the sink.
    pub fn emit(&self, event: AnimationEvent) {
        tracing::trace!(target: "bstep.command", event = %event, "emit");
        self.inner.sink.borrow_mut().emit(event);
    }

    /// Allocate a fresh transient marker handle.
    pub fn marker(&self) -> MarkerId {
        let id = self.inner.next_marker.get();
        self.inner.next_marker.set(id.wrapping_add(1));
        MarkerId(id)
    }

    /// Node the renderer currently highlights.
    #[must_use]
    pub fn shown_selection(&self) -> Option<NodeId> {
        self.inner.shown_selection.get()
    }

    pub(crate) fn set_shown_selection(&self, node: Option<NodeId>) {
        self.inner.shown_selection.set(node);
    }

    /// Mark `node` as the operated-on node, both in the tree and on screen.
    pub fn select(&self, node: Option<NodeId>) {
        self.tree_mut().select(node);
        self.inner.shown_selection.set(node);
        self.emit(AnimationEvent::Select(node));
    }

    /// Emit a full redraw of the live tree.
    pub fn redraw(&self) {
        let view = self.tree().view();
        self.emit(AnimationEvent::RedrawTree(view));
    }

    /// Run `f` with the session's random source.
    pub fn with_rng<R>(&self, f: impl FnOnce(&mut SmallRng) -> R) -> R {
        f(&mut *self.inner.rng.borrow_mut())
    }

    /// Random generation parameters.
    #[must_use]
    pub fn random_config(&self) -> &RandomTreeConfig {
        &self.inner.random
    }

    /// Whether two handles refer to the same session.
    #[must_use]
    pub fn same_session(&self, other: &Stage) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}
