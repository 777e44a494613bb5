//! Sharded execution: runs split across threads and merged.
//!
//! Runs are split into contiguous ranges, one per shard, and every shard
//! drives its own generator. Shard `k` is seeded with
//! `seed + k * 0x9E37_79B9` (wrapping), so shard 0 reuses the master seed and
//! a single shard reproduces [`simulate`](crate::simulate::simulate)
//! exactly. For a fixed seed and shard count the merged result is
//! reproducible on any machine; changing the shard count changes the
//! streams and therefore the result.
//!
//! Shards keep global run indices. Merging happens in shard order, with each
//! shard's roll indices shifted past the rolls of the shards before it, so
//! roll and run indices read the same as in a sequential simulation.

use std::ops::Range;
use std::thread;

use lootsim_types::TableDefinition;
use tracing::{debug, info, warn};

use crate::aggregate::Aggregator;
use crate::control::SimulationControl;
use crate::rng::effective_seed;
use crate::run::RunOrchestrator;
use crate::simulate::{ProgressCallback, SimulationOutcome};

/// Golden-ratio stride between shard seeds.
pub const SHARD_SEED_STRIDE: u32 = 0x9E37_79B9;

/// One shard's slice of the simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardPlan {
    /// Position of the shard; merge order.
    pub index: u32,
    /// Global run indices this shard executes.
    pub runs: Range<u64>,
    /// Seed of the shard's generator.
    pub seed: u32,
}

/// What one shard produced.
#[derive(Debug)]
pub struct ShardOutcome {
    /// Statistics over the shard's executed runs.
    pub aggregator: Aggregator,
    /// Whether the shard stopped early on cancellation.
    pub cancelled: bool,
}

/// Split `runs` into at most `shards` contiguous, non-empty ranges.
///
/// Earlier shards take the remainder, one extra run each. A shard count of
/// 0 is treated as 1, and zero runs produce a single empty shard.
pub fn plan_shards(runs: u64, seed: u32, shards: u32) -> Vec<ShardPlan> {
    let requested = u64::from(shards.max(1));
    let count = requested.min(runs).max(1);
    let base = runs.checked_div(count).unwrap_or(0);
    let extra = runs.checked_rem(count).unwrap_or(0);

    let mut plans = Vec::new();
    let mut start: u64 = 0;
    for k in 0..count {
        let len = if k < extra { base.saturating_add(1) } else { base };
        let end = start.saturating_add(len);
        let index = u32::try_from(k).unwrap_or(u32::MAX);
        plans.push(ShardPlan {
            index,
            runs: start..end,
            seed: seed.wrapping_add(index.wrapping_mul(SHARD_SEED_STRIDE)),
        });
        start = end;
    }
    plans
}

/// Execute one shard, checking for cancellation before each run.
pub fn simulate_shard(
    definition: &TableDefinition,
    plan: &ShardPlan,
    control: &SimulationControl,
    progress: &mut dyn ProgressCallback,
) -> ShardOutcome {
    debug!(
        shard = plan.index,
        first_run = plan.runs.start,
        end_run = plan.runs.end,
        seed = plan.seed,
        "Shard starting"
    );

    let mut orchestrator = RunOrchestrator::new(definition, plan.seed);
    let mut cancelled = false;
    for run_index in plan.runs.clone() {
        if control.is_cancel_requested() {
            cancelled = true;
            break;
        }
        let summary = orchestrator.run_once(run_index);
        let completed = control.record_run();
        progress.on_run(&summary, completed, control.total_runs());
    }

    let aggregator = orchestrator.into_aggregator();
    debug!(
        shard = plan.index,
        runs = aggregator.runs_completed(),
        rolls = aggregator.total_rolls(),
        cancelled,
        "Shard finished"
    );
    ShardOutcome {
        aggregator,
        cancelled,
    }
}

/// Fold shard accumulators, in shard order, into one.
///
/// Returns `None` when given no shards.
pub fn merge(shards: impl IntoIterator<Item = Aggregator>) -> Option<Aggregator> {
    let mut shards = shards.into_iter();
    let mut merged = shards.next()?;
    for shard in shards {
        merged.absorb(shard);
    }
    Some(merged)
}

/// Run a simulation across `shards` threads and merge the results.
///
/// `make_progress` builds the progress callback for each shard. A panic in
/// any shard is propagated to the caller once every shard has stopped.
pub fn simulate_sharded<P, F>(
    definition: &TableDefinition,
    runs: u64,
    seed: Option<i64>,
    shards: u32,
    control: &SimulationControl,
    make_progress: F,
) -> SimulationOutcome
where
    P: ProgressCallback,
    F: Fn(&ShardPlan) -> P,
{
    let seed = effective_seed(seed);
    let plans = plan_shards(runs, seed, shards);

    info!(
        table_id = %definition.id,
        runs,
        seed,
        shards = plans.len(),
        "Sharded simulation starting"
    );

    let outcomes: Vec<ShardOutcome> = thread::scope(|scope| {
        let handles: Vec<_> = plans
            .iter()
            .map(|plan| {
                let mut progress = make_progress(plan);
                scope.spawn(move || simulate_shard(definition, plan, control, &mut progress))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|payload| std::panic::resume_unwind(payload)))
            .collect()
    });

    let cancelled = outcomes.iter().any(|outcome| outcome.cancelled);
    let merged = merge(outcomes.into_iter().map(|outcome| outcome.aggregator))
        .unwrap_or_else(|| Aggregator::new(definition));
    let result = merged.finish(definition.id, seed, control.elapsed_ms());

    if cancelled {
        warn!(completed = result.runs, total = runs, "Sharded simulation cancelled");
        return SimulationOutcome::Cancelled {
            completed: result.runs,
            total: runs,
            partial: result,
        };
    }
    info!(
        runs = result.runs,
        total_rolls = result.total_rolls,
        duration_ms = result.duration_ms,
        "Sharded simulation complete"
    );
    SimulationOutcome::Completed(result)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use lootsim_types::{
        Entry, EntryId, GuaranteedEntry, ItemId, ReplacementStrategy, RollStrategy, TableId,
        WeightDistribution,
    };

    use super::*;
    use crate::simulate::{NoOpProgress, simulate};

    fn table() -> TableDefinition {
        let entry = |weight, replacement| Entry {
            id: EntryId::new(),
            item_id: ItemId::new(),
            weight,
            min_yield: 1,
            max_yield: 3,
            replacement_strategy: replacement,
        };
        TableDefinition {
            id: TableId::new(),
            name: "sharded".to_owned(),
            replacement_strategy: ReplacementStrategy::WithReplacement,
            roll_strategy: RollStrategy::Random { min: 0, max: 4 },
            weight_distribution: WeightDistribution::Static,
            pity_rules: Vec::new(),
            progressive_config: None,
            entries: vec![
                entry(10.0, ReplacementStrategy::Unset),
                entry(3.0, ReplacementStrategy::WithoutReplacement),
                entry(0.5, ReplacementStrategy::Unset),
            ],
            guaranteed: vec![GuaranteedEntry {
                id: EntryId::new(),
                item_id: ItemId::new(),
                min_yield: 1,
                max_yield: 2,
            }],
        }
    }

    #[test]
    fn plans_cover_runs_contiguously() {
        let plans = plan_shards(10, 7, 3);
        let ranges: Vec<_> = plans.iter().map(|p| p.runs.clone()).collect();
        assert_eq!(ranges, vec![0..4, 4..7, 7..10]);
        assert_eq!(plans[0].seed, 7);
        assert_eq!(plans[1].seed, 7_u32.wrapping_add(SHARD_SEED_STRIDE));
    }

    #[test]
    fn never_plans_empty_shards() {
        assert_eq!(plan_shards(2, 1, 8).len(), 2);
        let empty = plan_shards(0, 1, 4);
        assert_eq!(empty.len(), 1);
        assert!(empty[0].runs.is_empty());
        assert_eq!(plan_shards(5, 1, 0).len(), 1);
    }

    #[test]
    fn single_shard_matches_sequential() {
        let def = table();
        let control = SimulationControl::new(50);
        let sharded = simulate_sharded(&def, 50, Some(1337), 1, &control, |_| NoOpProgress);
        let mut sequential = simulate(&def, 50, Some(1337));
        let mut sharded = match sharded {
            SimulationOutcome::Completed(result) => result,
            SimulationOutcome::Cancelled { partial, .. } => partial,
        };
        sharded.duration_ms = 0;
        sequential.duration_ms = 0;
        assert_eq!(sharded, sequential);
    }

    #[test]
    fn sharded_result_is_reproducible() {
        let def = table();
        let run = || {
            let control = SimulationControl::new(200);
            let mut result = simulate_sharded(&def, 200, Some(99), 4, &control, |_| NoOpProgress)
                .result()
                .clone();
            result.duration_ms = 0;
            result
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn merged_totals_are_consistent() {
        let def = table();
        let control = SimulationControl::new(120);
        let outcome = simulate_sharded(&def, 120, Some(5), 3, &control, |_| NoOpProgress);
        let result = outcome.result();
        assert!(!outcome.is_cancelled());
        assert_eq!(result.runs, 120);
        assert_eq!(control.completed(), 120);
        assert!(result.total_roll_hits() <= result.total_rolls);

        for entry in &result.entries {
            let mut last = None;
            for event in &entry.timeline {
                if let Some(roll) = event.roll_index {
                    assert!(roll < result.total_rolls);
                    assert!(last.is_none_or(|prev| prev <= roll), "roll indices out of order");
                    last = Some(roll);
                }
            }
        }
        let guaranteed = result.entry(def.guaranteed[0].id).unwrap();
        assert_eq!(guaranteed.bundle_hits, 120);
    }

    #[test]
    fn cancelled_shards_report_partial_runs() {
        let def = table();
        let control = SimulationControl::new(100);
        control.request_cancel();
        let outcome = simulate_sharded(&def, 100, Some(5), 4, &control, |_| NoOpProgress);
        assert!(outcome.is_cancelled());
        assert_eq!(outcome.result().runs, 0);
    }

    #[test]
    fn merge_of_nothing_is_none() {
        assert!(merge(Vec::new()).is_none());
    }
}
