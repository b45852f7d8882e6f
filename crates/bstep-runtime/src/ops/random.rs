#![forbid(unsafe_code)]

//! Random tree generation with cached replay.
//!
//! The first `redo` draws a tree from the stage's random source and caches
//! it; every later `redo` on the same instance restores the cached tree, so
//! stepping back and forth through history always shows the same tree.
//!
//! # Shape
//!
//! The root value is drawn from the middle half of `[min, max]`. Each node
//! then gets children with a level-dependent probability: within the first
//! `full_levels` levels a coin flip (`full_chance`) can force both children,
//! otherwise `level_chances[level - 1]` applies to each child on its own.
//! A left child is drawn from the upper half of `[min, v - 1]`, a right
//! child from the lower half of `[v + 1, max]`, which keeps the generated
//! tree bushy rather than stringy.

use std::fmt;

use bstep_core::{NodeId, Side, Snapshot, Tree, Value};
use rand::Rng;
use rand::rngs::SmallRng;

use crate::command::{Command, CommandCore, CommandError, ExecContext, Outcome};
use crate::config::RandomTreeConfig;
use crate::stage::Stage;

/// Replace the tree with a freshly generated random one.
#[derive(Debug)]
pub struct RandomGenerate {
    core: CommandCore,
    min: Value,
    max: Value,
    generated: Option<Snapshot>,
}

impl RandomGenerate {
    pub fn new(
        stage: &Stage,
        min: Value,
        max: Value,
        context: ExecContext,
    ) -> Result<Self, CommandError> {
        if min > max {
            return Err(CommandError::InvalidRange { min, max });
        }
        Ok(Self {
            core: CommandCore::new(stage, None, context),
            min,
            max,
            generated: None,
        })
    }

    /// The tree produced by the first `redo`, if it has run.
    #[must_use]
    pub fn generated(&self) -> Option<&Tree> {
        self.generated.as_ref().map(Snapshot::tree)
    }
}

impl Command for RandomGenerate {
    fn core(&self) -> &CommandCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut CommandCore {
        &mut self.core
    }

    fn name(&self) -> &'static str {
        "RandomGenerate"
    }

    fn redo(&mut self) -> Result<Outcome, CommandError> {
        self.core.begin()?;
        let stage = self.core.stage().clone();

        let snapshot = match self.generated.clone() {
            Some(snapshot) => snapshot,
            None => {
                let config = stage.random_config().clone();
                let tree = stage.with_rng(|rng| generate(rng, &config, self.min, self.max))?;
                tracing::debug!(
                    target: "bstep.random",
                    min = self.min,
                    max = self.max,
                    len = tree.len(),
                    height = ?tree.height(tree.root()),
                    "random tree generated"
                );
                let snapshot = Snapshot::of(&tree);
                self.generated = Some(snapshot.clone());
                snapshot
            }
        };
        snapshot.restore_into(&mut stage.tree_mut());
        stage.redraw();

        self.core.finish();
        Ok(Outcome::Unit)
    }
}

impl fmt::Display for RandomGenerate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(tree) = self.generated() else {
            return write!(f, "random_tree(min: {}, max: {})", self.min, self.max);
        };
        f.write_str("random_tree(")?;
        for (i, slot) in tree.level_order().into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match slot {
                Some(value) => write!(f, "{value}")?,
                None => f.write_str("n")?,
            }
        }
        f.write_str(")")
    }
}

/// Inclusive uniform draw that tolerates a collapsed range.
fn draw(rng: &mut SmallRng, lo: Value, hi: Value) -> Value {
    if lo >= hi {
        lo
    } else {
        rng.random_range(lo..=hi)
    }
}

/// `from` moved halfway towards `to`, with the half-step rounded up.
fn halfway(from: Value, to: Value) -> Value {
    let span = i128::from(to) - i128::from(from);
    let step = if span >= 0 { (span + 1) / 2 } else { -((-span + 1) / 2) };
    (i128::from(from) + step) as Value
}

/// Draw a whole random tree over `[min, max]`.
pub fn generate(
    rng: &mut SmallRng,
    config: &RandomTreeConfig,
    min: Value,
    max: Value,
) -> Result<Tree, CommandError> {
    if min > max {
        return Err(CommandError::InvalidRange { min, max });
    }
    let epsilon = (max as f64 - min as f64) / 4.0;
    let lo = (min as f64 + epsilon).floor() as Value;
    let hi = (max as f64 - epsilon).ceil() as Value;

    let mut tree = Tree::new();
    let root = tree.alloc(draw(rng, lo, hi));
    tree.set_root(Some(root))?;
    grow(&mut tree, rng, config, root, 1, min, max)?;
    debug_assert!(tree.validate().is_empty());
    Ok(tree)
}

fn grow(
    tree: &mut Tree,
    rng: &mut SmallRng,
    config: &RandomTreeConfig,
    node: NodeId,
    level: u32,
    mut min: Value,
    mut max: Value,
) -> Result<(), CommandError> {
    let v = tree.value(node).unwrap_or_default();
    if min >= v.saturating_sub(1) || v.saturating_add(1) >= max {
        return Ok(());
    }

    let chance = if level <= config.full_levels && rng.random::<f64>() < config.full_chance {
        1.0
    } else {
        config.level_chance(level)
    };

    if chance > rng.random::<f64>() {
        let value = draw(rng, halfway(min, v), v - 1);
        let left = tree.alloc(value);
        tree.set_child(node, Side::Left, Some(left))?;
        if value == min {
            min += 1;
        }
        grow(tree, rng, config, left, level + 1, min, v - 1)?;
    }

    if chance > rng.random::<f64>() {
        let value = draw(rng, v + 1, halfway(max, v));
        let right = tree.alloc(value);
        tree.set_child(node, Side::Right, Some(right))?;
        if value == max {
            max -= 1;
        }
        grow(tree, rng, config, right, level + 1, v + 1, max)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::ops::testing::{seeded_session, session};
    use bstep_core::Order;
    use rand::SeedableRng;

    #[test]
    fn generated_trees_are_valid_and_in_range() {
        let config = RandomTreeConfig::default();
        for seed in 0..50 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let tree = generate(&mut rng, &config, 0, 99).unwrap();
            assert!(tree.validate().is_empty());
            assert!(tree.values(Order::In).iter().all(|v| (0..=99).contains(v)));
            assert!(tree.height(tree.root()).unwrap_or(0) <= 4);
        }
    }

    #[test]
    fn root_drawn_from_middle_half() {
        let config = RandomTreeConfig::default();
        for seed in 0..50 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let tree = generate(&mut rng, &config, 0, 100).unwrap();
            let root = tree.root().and_then(|id| tree.value(id)).unwrap();
            assert!((25..=75).contains(&root), "root {root}");
        }
    }

    #[test]
    fn degenerate_ranges() {
        let config = RandomTreeConfig::default();
        let mut rng = SmallRng::seed_from_u64(1);
        let single = generate(&mut rng, &config, 5, 5).unwrap();
        assert_eq!(single.values(Order::Pre), vec![5]);
        let pair = generate(&mut rng, &config, 5, 6).unwrap();
        assert_eq!(pair.len(), 1);
        assert!(matches!(
            generate(&mut rng, &config, 6, 5),
            Err(CommandError::InvalidRange { min: 6, max: 5 })
        ));
    }

    #[test]
    fn zero_chances_give_a_lone_root() {
        let config = RandomTreeConfig {
            full_chance: 0.0,
            level_chances: Vec::new(),
            ..RandomTreeConfig::default()
        };
        let mut rng = SmallRng::seed_from_u64(3);
        assert_eq!(generate(&mut rng, &config, 0, 99).unwrap().len(), 1);
    }

    #[test]
    fn repeated_redo_restores_cached_tree() {
        let (stage, log) = seeded_session(5);
        let mut cmd = RandomGenerate::new(&stage, 0, 99, ExecContext::Standalone).unwrap();
        assert_eq!(cmd.to_string(), "random_tree(min: 0, max: 99)");
        cmd.redo().unwrap();
        let first = stage.tree_copy();
        cmd.undo();
        assert!(stage.tree().is_empty());
        cmd.redo().unwrap();
        assert!(stage.tree().same_shape(&first));
        assert_eq!(log.borrow().count_kind("redraw_tree"), 2);
        assert!(cmd.to_string().starts_with("random_tree("));
        assert!(!cmd.to_string().contains("min:"));
    }

    #[test]
    fn description_uses_level_order() {
        let (stage, _) = session();
        let mut cmd = RandomGenerate::new(&stage, 0, 99, ExecContext::Standalone).unwrap();
        cmd.redo().unwrap();
        let tree = cmd.generated().unwrap();
        let expected: Vec<String> = tree
            .level_order()
            .into_iter()
            .map(|slot| slot.map_or_else(|| "n".to_string(), |v| v.to_string()))
            .collect();
        assert_eq!(cmd.to_string(), format!("random_tree({})", expected.join(", ")));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let (stage, _) = session();
        assert_eq!(
            RandomGenerate::new(&stage, 10, 1, ExecContext::Standalone).unwrap_err(),
            CommandError::InvalidRange { min: 10, max: 1 }
        );
    }

    #[test]
    fn same_seed_same_tree() {
        let config = EngineConfig {
            seed: Some(17),
            ..EngineConfig::default()
        };
        let mut rng_a = SmallRng::seed_from_u64(config.seed.unwrap());
        let mut rng_b = SmallRng::seed_from_u64(config.seed.unwrap());
        let a = generate(&mut rng_a, &config.random, 0, 99).unwrap();
        let b = generate(&mut rng_b, &config.random, 0, 99).unwrap();
        assert!(a.same_shape(&b));
    }
}
