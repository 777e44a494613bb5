//! Enumeration types for loot table definitions and simulation results.
//!
//! The wire names are the upper-case tags the table editor stores
//! (`WITH_REPLACEMENT`, `PITY`, `CONSTANT`, ...), so definitions saved by the
//! surrounding application deserialize without translation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Replacement
// ---------------------------------------------------------------------------

/// Whether a selected entry stays in the pool for later draws of the same run.
///
/// Set on the table and optionally overridden per entry. An entry-level
/// [`Unset`](Self::Unset) defers to the table; a table-level `Unset` behaves
/// like [`WithReplacement`](Self::WithReplacement).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum ReplacementStrategy {
    /// No explicit policy; defer to the enclosing level.
    #[default]
    Unset,
    /// The entry remains eligible after being selected.
    WithReplacement,
    /// The entry is removed from the pool for the rest of the run.
    WithoutReplacement,
}

impl ReplacementStrategy {
    /// Resolve an entry-level override against the table-level strategy.
    ///
    /// The result is never [`Unset`](Self::Unset).
    pub const fn resolve(self, table: Self) -> Self {
        match (self, table) {
            (Self::Unset, Self::WithoutReplacement) | (Self::WithoutReplacement, _) => {
                Self::WithoutReplacement
            }
            (Self::Unset | Self::WithReplacement, _) => Self::WithReplacement,
        }
    }
}

// ---------------------------------------------------------------------------
// Weight distribution
// ---------------------------------------------------------------------------

/// How entry weights evolve between draws of a run.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum WeightDistribution {
    /// Weights stay at their base value for the whole run.
    #[default]
    Static,
    /// Entries with a pity rule gain weight after repeated misses.
    Pity,
    /// Weights are pulled toward their mean before every draw.
    Progressive,
}

// ---------------------------------------------------------------------------
// Roll strategy
// ---------------------------------------------------------------------------

/// How many weighted draws a single run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum RollStrategy {
    /// Always the same number of draws.
    Constant {
        /// Draws per run. Negative values are treated as zero.
        rolls: i64,
    },
    /// A base count plus a random bonus, capped.
    #[serde(rename_all = "camelCase")]
    Progressive {
        /// Draws every run performs before the bonus.
        base_rolls: i64,
        /// Upper bound of the uniform bonus added to `base_rolls`.
        roll_increment: i64,
        /// Hard cap on the resolved count.
        max_rolls: i64,
    },
    /// A uniform count in an inclusive range.
    Random {
        /// Inclusive lower bound.
        min: i64,
        /// Inclusive upper bound.
        max: i64,
    },
}

impl Default for RollStrategy {
    fn default() -> Self {
        Self::Constant { rolls: 1 }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Which mechanism produced a result entry's drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum ResultSource {
    /// Selected by weighted draws.
    Weighted,
    /// Granted once per run by the guaranteed list.
    Guaranteed,
}

/// Kind of a timeline event recorded for a result entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum TimelineEventKind {
    /// First time the entry appeared anywhere in the simulation.
    Appeared,
    /// A weighted draw selected the entry.
    Rolled,
    /// The entry was removed from the pool for the rest of its run.
    Consumed,
    /// Guaranteed loot granted the entry.
    Granted,
}
