//! Cross-run statistics accumulation.
//!
//! The [`Aggregator`] is the only state that survives from one run to the
//! next. It holds one accumulator slot per entry: weighted entries occupy
//! slots `0..n` in definition order and guaranteed entries follow. A per-run
//! seen set, cleared by [`begin_run`](Aggregator::begin_run), limits bundle
//! hits to one per run.
//!
//! Aggregators over disjoint run ranges can be combined with
//! [`absorb`](Aggregator::absorb); statistics are sums and minima, so the
//! merge only has to shift the absorbed side's roll indices past the rolls
//! already counted.

use lootsim_types::{
    EntryId, ItemId, ResultEntry, ResultSource, SimulationResult, TableDefinition, TableId,
    TimelineEvent, TimelineEventKind,
};

/// Running statistics for one entry slot.
#[derive(Debug, Clone, PartialEq)]
struct EntryStats {
    entry_id: EntryId,
    item_id: ItemId,
    source: ResultSource,
    total_drops: i64,
    roll_hits: u64,
    bundle_hits: u64,
    first_appeared_at: Option<u64>,
    first_run: Option<u64>,
    appeared: bool,
    timeline: Vec<TimelineEvent>,
}

impl EntryStats {
    const fn new(entry_id: EntryId, item_id: ItemId, source: ResultSource) -> Self {
        Self {
            entry_id,
            item_id,
            source,
            total_drops: 0,
            roll_hits: 0,
            bundle_hits: 0,
            first_appeared_at: None,
            first_run: None,
            appeared: false,
            timeline: Vec::new(),
        }
    }

    fn finish(self, runs: u64, total_rolls: u64) -> ResultEntry {
        let probability = match self.source {
            ResultSource::Guaranteed => 1.0,
            ResultSource::Weighted => ratio_u64(self.roll_hits, total_rolls),
        };
        let per_run_average = if runs == 0 {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let average = self.total_drops as f64 / runs as f64;
            average
        };
        ResultEntry {
            entry_id: self.entry_id,
            item_id: self.item_id,
            source: self.source,
            total_drops: self.total_drops,
            roll_hits: self.roll_hits,
            bundle_hits: self.bundle_hits,
            first_appeared_at: self.first_appeared_at,
            first_run: self.first_run,
            probability,
            per_run_average,
            timeline: self.timeline,
        }
    }
}

/// Accumulator for a whole simulation (or one shard of it).
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregator {
    stats: Vec<EntryStats>,
    weighted_len: usize,
    seen_this_run: Vec<bool>,
    total_rolls: u64,
    runs_completed: u64,
}

impl Aggregator {
    /// Create an empty accumulator laid out for `definition`.
    pub fn new(definition: &TableDefinition) -> Self {
        let weighted = definition
            .entries
            .iter()
            .map(|e| EntryStats::new(e.id, e.item_id, ResultSource::Weighted));
        let guaranteed = definition
            .guaranteed
            .iter()
            .map(|g| EntryStats::new(g.id, g.item_id, ResultSource::Guaranteed));
        let stats: Vec<EntryStats> = weighted.chain(guaranteed).collect();
        let len = stats.len();
        Self {
            stats,
            weighted_len: definition.entries.len(),
            seen_this_run: vec![false; len],
            total_rolls: 0,
            runs_completed: 0,
        }
    }

    /// Weighted draws counted so far; also the next global roll index.
    pub const fn total_rolls(&self) -> u64 {
        self.total_rolls
    }

    /// Runs closed with [`end_run`](Self::end_run).
    pub const fn runs_completed(&self) -> u64 {
        self.runs_completed
    }

    /// Clear the per-run seen set.
    pub fn begin_run(&mut self) {
        self.seen_this_run.fill(false);
    }

    /// Count a run's resolved roll count toward the global total.
    pub const fn add_rolls(&mut self, rolls: u64) {
        self.total_rolls = self.total_rolls.saturating_add(rolls);
    }

    /// Close the current run.
    pub const fn end_run(&mut self) {
        self.runs_completed = self.runs_completed.saturating_add(1);
    }

    /// Record a weighted selection of `slot` at a global roll index.
    pub fn record_roll(&mut self, slot: usize, roll_index: u64, run_index: u64, quantity: i64) {
        self.mark_appearance(slot, Some(roll_index), run_index);
        if let Some(stats) = self.stats.get_mut(slot) {
            stats.total_drops = stats.total_drops.saturating_add(quantity);
            stats.roll_hits = stats.roll_hits.saturating_add(1);
            stats.timeline.push(TimelineEvent {
                kind: TimelineEventKind::Rolled,
                roll_index: Some(roll_index),
                run_index,
                quantity: Some(quantity),
            });
        }
    }

    /// Record that `slot` was removed from the pool by a without-replacement draw.
    pub fn record_consumed(&mut self, slot: usize, roll_index: u64, run_index: u64) {
        if let Some(stats) = self.stats.get_mut(slot) {
            stats.timeline.push(TimelineEvent {
                kind: TimelineEventKind::Consumed,
                roll_index: Some(roll_index),
                run_index,
                quantity: None,
            });
        }
    }

    /// Record a guaranteed grant for the guaranteed entry at `index`.
    pub fn record_grant(&mut self, index: usize, run_index: u64, quantity: i64) {
        let Some(slot) = self.weighted_len.checked_add(index) else {
            return;
        };
        self.mark_appearance(slot, None, run_index);
        if let Some(stats) = self.stats.get_mut(slot) {
            stats.total_drops = stats.total_drops.saturating_add(quantity);
            stats.timeline.push(TimelineEvent {
                kind: TimelineEventKind::Granted,
                roll_index: None,
                run_index,
                quantity: Some(quantity),
            });
        }
    }

    /// Fold the statistics of a later, disjoint run range into this one.
    ///
    /// `other` must be laid out for the same table and cover runs after the
    /// ones already counted here. Its roll indices are shifted by this
    /// accumulator's total rolls; run indices are kept as recorded.
    pub fn absorb(&mut self, other: Self) {
        let offset = self.total_rolls;
        let shift = |index: Option<u64>| index.map(|i| i.saturating_add(offset));

        for (mine, theirs) in self.stats.iter_mut().zip(other.stats) {
            mine.total_drops = mine.total_drops.saturating_add(theirs.total_drops);
            mine.roll_hits = mine.roll_hits.saturating_add(theirs.roll_hits);
            mine.bundle_hits = mine.bundle_hits.saturating_add(theirs.bundle_hits);
            if !mine.appeared {
                mine.first_appeared_at = shift(theirs.first_appeared_at);
                mine.first_run = theirs.first_run;
            }
            let already_appeared = mine.appeared;
            mine.appeared |= theirs.appeared;
            mine.timeline.extend(
                theirs
                    .timeline
                    .into_iter()
                    .filter(|event| !(already_appeared && event.kind == TimelineEventKind::Appeared))
                    .map(|event| TimelineEvent {
                        roll_index: shift(event.roll_index),
                        ..event
                    }),
            );
        }

        self.total_rolls = self.total_rolls.saturating_add(other.total_rolls);
        self.runs_completed = self.runs_completed.saturating_add(other.runs_completed);
    }

    /// Compute derived statistics and produce the final result.
    ///
    /// Only entries that appeared at least once are listed.
    pub fn finish(self, table_id: TableId, seed: u32, duration_ms: u64) -> SimulationResult {
        let runs = self.runs_completed;
        let total_rolls = self.total_rolls;
        let entries = self
            .stats
            .into_iter()
            .filter(|stats| stats.appeared)
            .map(|stats| stats.finish(runs, total_rolls))
            .collect();
        SimulationResult {
            table_id,
            runs,
            seed,
            duration_ms,
            total_rolls,
            entries,
        }
    }

    fn mark_appearance(&mut self, slot: usize, roll_index: Option<u64>, run_index: u64) {
        let Some(stats) = self.stats.get_mut(slot) else {
            return;
        };
        if let Some(seen) = self.seen_this_run.get_mut(slot) {
            if !*seen {
                *seen = true;
                stats.bundle_hits = stats.bundle_hits.saturating_add(1);
            }
        }
        if !stats.appeared {
            stats.appeared = true;
            stats.first_appeared_at = roll_index;
            stats.first_run = Some(run_index);
            stats.timeline.push(TimelineEvent {
                kind: TimelineEventKind::Appeared,
                roll_index,
                run_index,
                quantity: None,
            });
        }
    }
}

/// `numerator / denominator`, or 0 when the denominator is 0.
fn ratio_u64(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let ratio = numerator as f64 / denominator as f64;
    ratio
}
