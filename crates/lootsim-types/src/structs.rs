//! Table definition and simulation result structs.
//!
//! A [`TableDefinition`] is the validated input handed over by the table
//! editor; a [`SimulationResult`] is what the engine hands back. Both are
//! plain data: the engine never mutates a definition, and a result carries
//! no references back into engine state.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    ReplacementStrategy, ResultSource, RollStrategy, TimelineEventKind, WeightDistribution,
};
use crate::ids::{EntryId, ItemId, TableId};

// ---------------------------------------------------------------------------
// Definition
// ---------------------------------------------------------------------------

/// A weighted candidate drop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Entry {
    /// Identity of this entry within its table.
    pub id: EntryId,
    /// The item this entry drops.
    pub item_id: ItemId,
    /// Base selection weight (non-negative).
    pub weight: f64,
    /// Smallest quantity a selection yields.
    pub min_yield: i64,
    /// Largest quantity a selection yields (inclusive).
    pub max_yield: i64,
    /// Per-entry replacement override; `UNSET` defers to the table.
    #[serde(default)]
    pub replacement_strategy: ReplacementStrategy,
}

/// A drop granted once per run, outside the weighted machinery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct GuaranteedEntry {
    /// Identity of this guaranteed entry within its table.
    pub id: EntryId,
    /// The item granted.
    pub item_id: ItemId,
    /// Smallest quantity granted per run.
    pub min_yield: i64,
    /// Largest quantity granted per run (inclusive).
    pub max_yield: i64,
}

/// Compensatory weight boost for an entry that keeps missing.
///
/// Every `max_attempts` consecutive misses add `weight_increment` to the
/// entry's effective weight until it is selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PityRule {
    /// The weighted entry this rule boosts.
    pub entry_id: EntryId,
    /// Misses per boost step.
    pub max_attempts: u32,
    /// Weight added per completed step.
    pub weight_increment: f64,
}

/// Parameters for the progressive weight distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ProgressiveConfig {
    /// Largest absolute weight change applied to one entry per draw.
    pub max_shift: f64,
    /// Fraction of the distance to the mean covered per draw.
    pub shift_factor: f64,
    /// Scale each shift by the entry's relative distance from the mean.
    #[serde(default)]
    pub variance_scaling: bool,
}

/// A complete, pre-validated loot table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct TableDefinition {
    /// Table identity.
    pub id: TableId,
    /// Human-readable table name, used only in logs.
    #[serde(default)]
    pub name: String,
    /// Table-level replacement policy.
    #[serde(default)]
    pub replacement_strategy: ReplacementStrategy,
    /// How many draws each run performs.
    #[serde(default)]
    pub roll_strategy: RollStrategy,
    /// How weights evolve between draws.
    #[serde(default)]
    pub weight_distribution: WeightDistribution,
    /// Pity rules, consulted only under `PITY`.
    #[serde(default)]
    pub pity_rules: Vec<PityRule>,
    /// Progressive parameters, consulted only under `PROGRESSIVE`.
    #[serde(default)]
    pub progressive_config: Option<ProgressiveConfig>,
    /// Weighted entries in definition order.
    #[serde(default)]
    pub entries: Vec<Entry>,
    /// Guaranteed entries in definition order.
    #[serde(default)]
    pub guaranteed: Vec<GuaranteedEntry>,
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// A discrete event in a result entry's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct TimelineEvent {
    /// What happened.
    pub kind: TimelineEventKind,
    /// Global roll index, absent for guaranteed grants.
    pub roll_index: Option<u64>,
    /// Run in which the event happened.
    pub run_index: u64,
    /// Quantity carried by `ROLLED` and `GRANTED` events.
    pub quantity: Option<i64>,
}

/// Aggregated statistics for one entry across every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ResultEntry {
    /// The entry these statistics belong to.
    pub entry_id: EntryId,
    /// The item the entry drops.
    pub item_id: ItemId,
    /// Whether the drops came from weighted draws or guaranteed loot.
    pub source: ResultSource,
    /// Sum of all quantities yielded.
    pub total_drops: i64,
    /// Number of weighted draws that selected the entry.
    pub roll_hits: u64,
    /// Number of runs in which the entry appeared at least once.
    pub bundle_hits: u64,
    /// First global roll index at which the entry appeared.
    pub first_appeared_at: Option<u64>,
    /// First run in which the entry appeared.
    pub first_run: Option<u64>,
    /// Share of all draws that selected the entry (1.0 for guaranteed loot).
    pub probability: f64,
    /// Average quantity per run.
    pub per_run_average: f64,
    /// Chronological event history.
    pub timeline: Vec<TimelineEvent>,
}

/// Outcome of a whole simulation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct SimulationResult {
    /// The simulated table.
    pub table_id: TableId,
    /// Number of runs the statistics cover.
    pub runs: u64,
    /// Effective 32-bit seed, so the result can be reproduced.
    pub seed: u32,
    /// Wall-clock duration of the simulation in milliseconds.
    pub duration_ms: u64,
    /// Weighted draws executed across all runs.
    pub total_rolls: u64,
    /// Per-entry statistics in definition order (weighted, then guaranteed).
    pub entries: Vec<ResultEntry>,
}

impl SimulationResult {
    /// Find the statistics for an entry, if it was touched at all.
    pub fn entry(&self, id: EntryId) -> Option<&ResultEntry> {
        self.entries.iter().find(|e| e.entry_id == id)
    }

    /// Sum of roll hits over every weighted entry.
    pub fn total_roll_hits(&self) -> u64 {
        self.entries
            .iter()
            .filter(|e| e.source == ResultSource::Weighted)
            .fold(0_u64, |acc, e| acc.saturating_add(e.roll_hits))
    }
}
