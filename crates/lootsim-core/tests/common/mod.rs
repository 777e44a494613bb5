//! Table builders shared by the engine integration tests.

#![allow(dead_code)]

use lootsim_types::{
    Entry, EntryId, GuaranteedEntry, ItemId, PityRule, ProgressiveConfig, ReplacementStrategy,
    RollStrategy, TableDefinition, TableId, WeightDistribution,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Weighted entry yielding exactly one item per selection.
pub fn entry(weight: f64) -> Entry {
    ranged_entry(weight, 1, 1)
}

/// Weighted entry with a yield range.
pub fn ranged_entry(weight: f64, min_yield: i64, max_yield: i64) -> Entry {
    Entry {
        id: EntryId::new(),
        item_id: ItemId::new(),
        weight,
        min_yield,
        max_yield,
        replacement_strategy: ReplacementStrategy::Unset,
    }
}

/// Guaranteed entry with a yield range.
pub fn guaranteed(min_yield: i64, max_yield: i64) -> GuaranteedEntry {
    GuaranteedEntry {
        id: EntryId::new(),
        item_id: ItemId::new(),
        min_yield,
        max_yield,
    }
}

/// Static, with-replacement table with a constant roll count.
pub fn table(entries: Vec<Entry>, rolls: i64) -> TableDefinition {
    TableDefinition {
        id: TableId::new(),
        name: "fixture".to_owned(),
        replacement_strategy: ReplacementStrategy::WithReplacement,
        roll_strategy: RollStrategy::Constant { rolls },
        weight_distribution: WeightDistribution::Static,
        pity_rules: Vec::new(),
        progressive_config: None,
        entries,
        guaranteed: Vec::new(),
    }
}

/// A table exercising every strategy, drawn from `seed`.
pub fn random_table(seed: u64) -> TableDefinition {
    let mut rng = SmallRng::seed_from_u64(seed);

    let entry_count = rng.random_range(1..8);
    let entries: Vec<Entry> = (0..entry_count)
        .map(|_| {
            let min_yield = rng.random_range(0..4);
            let mut entry = ranged_entry(
                rng.random_range(0.0..20.0),
                min_yield,
                min_yield + rng.random_range(0..3),
            );
            entry.replacement_strategy = match rng.random_range(0..3) {
                0 => ReplacementStrategy::Unset,
                1 => ReplacementStrategy::WithReplacement,
                _ => ReplacementStrategy::WithoutReplacement,
            };
            entry
        })
        .collect();

    let mut pity_rules = Vec::new();
    for e in &entries {
        if rng.random_bool(0.5) {
            pity_rules.push(PityRule {
                entry_id: e.id,
                max_attempts: rng.random_range(0..5),
                weight_increment: rng.random_range(0.0..5.0),
            });
        }
    }

    let granted = (0..rng.random_range(0..3))
        .map(|_| guaranteed(1, rng.random_range(1..4)))
        .collect();

    TableDefinition {
        id: TableId::new(),
        name: format!("random-{seed}"),
        replacement_strategy: if rng.random_bool(0.5) {
            ReplacementStrategy::WithReplacement
        } else {
            ReplacementStrategy::WithoutReplacement
        },
        roll_strategy: match rng.random_range(0..3) {
            0 => RollStrategy::Constant {
                rolls: rng.random_range(-1..10),
            },
            1 => RollStrategy::Progressive {
                base_rolls: rng.random_range(0..4),
                roll_increment: rng.random_range(0..4),
                max_rolls: rng.random_range(1..8),
            },
            _ => RollStrategy::Random {
                min: rng.random_range(0..3),
                max: rng.random_range(0..9),
            },
        },
        weight_distribution: match rng.random_range(0..3) {
            0 => WeightDistribution::Static,
            1 => WeightDistribution::Pity,
            _ => WeightDistribution::Progressive,
        },
        pity_rules,
        progressive_config: rng.random_bool(0.8).then(|| ProgressiveConfig {
            max_shift: rng.random_range(0.0..4.0),
            shift_factor: rng.random_range(0.0..1.0),
            variance_scaling: rng.random_bool(0.5),
        }),
        entries,
        guaranteed: granted,
    }
}
