//! Run orchestration: one run from reset to the last weighted draw.
//!
//! A run resets the weight arena, grants guaranteed loot, resolves its roll
//! count, then performs that many weighted draws. Per draw the weight
//! distribution is applied, an entry is selected, its yield is drawn, and
//! the replacement policy may remove it from the pool. Once the pool is
//! empty the remaining draws are skipped, but every resolved roll still
//! occupies a global roll index.

use lootsim_types::{ReplacementStrategy, TableDefinition};

use crate::aggregate::Aggregator;
use crate::guaranteed::inject_guaranteed;
use crate::rng::XorShift32;
use crate::rolls::resolve_roll_count;
use crate::selector::{effective_replacement, select};
use crate::weights::WeightEngine;

/// What a single run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Index of the run within the whole simulation.
    pub run_index: u64,
    /// Resolved roll count.
    pub rolls: u64,
    /// Draws that selected an entry (`<= rolls`).
    pub draws: u64,
}

/// Drives runs of one table over one RNG stream, feeding an [`Aggregator`].
#[derive(Debug)]
pub struct RunOrchestrator<'a> {
    definition: &'a TableDefinition,
    replacement: Vec<ReplacementStrategy>,
    rng: XorShift32,
    weights: WeightEngine,
    aggregator: Aggregator,
}

impl<'a> RunOrchestrator<'a> {
    /// Prepare the arena and accumulator for `definition`, seeded with `seed`.
    pub fn new(definition: &'a TableDefinition, seed: u32) -> Self {
        let replacement = definition
            .entries
            .iter()
            .map(|entry| effective_replacement(entry, definition))
            .collect();
        Self {
            definition,
            replacement,
            rng: XorShift32::new(seed),
            weights: WeightEngine::new(definition),
            aggregator: Aggregator::new(definition),
        }
    }

    /// Statistics accumulated so far.
    pub const fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Execute one run. Run indices must be passed in increasing order.
    pub fn run_once(&mut self, run_index: u64) -> RunSummary {
        self.weights.reset();
        self.aggregator.begin_run();

        inject_guaranteed(
            &self.definition.guaranteed,
            run_index,
            &mut self.rng,
            &mut self.aggregator,
        );

        let rolls = resolve_roll_count(&self.definition.roll_strategy, &mut self.rng);
        let first_roll = self.aggregator.total_rolls();
        self.aggregator.add_rolls(rolls);

        let mut draws: u64 = 0;
        for offset in 0..rolls {
            let roll_index = first_roll.saturating_add(offset);
            self.weights.apply_distribution();
            let Some(slot) = select(&self.weights, &mut self.rng) else {
                break;
            };
            let Some(entry) = self.definition.entries.get(slot) else {
                break;
            };

            let quantity = self.rng.uniform_int(entry.min_yield, entry.max_yield);
            self.aggregator
                .record_roll(slot, roll_index, run_index, quantity);
            self.weights.record_selection(slot);

            if self.replacement.get(slot) == Some(&ReplacementStrategy::WithoutReplacement) {
                self.weights.remove(slot);
                self.aggregator.record_consumed(slot, roll_index, run_index);
            }
            draws = draws.saturating_add(1);
        }

        self.aggregator.end_run();
        RunSummary {
            run_index,
            rolls,
            draws,
        }
    }

    /// Hand over the accumulated statistics.
    pub fn into_aggregator(self) -> Aggregator {
        self.aggregator
    }
}
