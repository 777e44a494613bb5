//! Weighted entry selection and replacement policy.

use lootsim_types::{Entry, ReplacementStrategy, TableDefinition};

use crate::rng::XorShift32;
use crate::weights::WeightEngine;

/// Draw one slot among the eligible entries.
///
/// Scans eligible entries in definition order, accumulating weight, and
/// returns the first whose cumulative weight reaches `rng() * total`. If
/// rounding lets the scan run off the end, the last eligible slot is
/// returned. Returns `None` without advancing the generator when nothing is
/// eligible.
pub fn select(engine: &WeightEngine, rng: &mut XorShift32) -> Option<usize> {
    let total: f64 = engine.eligible().map(|(_, weight)| weight).sum();
    if total <= 0.0 || !total.is_finite() {
        return None;
    }

    let threshold = rng.next_f64() * total;
    let mut cumulative = 0.0;
    let mut last = None;
    for (slot, weight) in engine.eligible() {
        cumulative += weight;
        last = Some(slot);
        if cumulative >= threshold {
            return Some(slot);
        }
    }
    last
}

/// Replacement policy in force for an entry, never `UNSET`.
pub const fn effective_replacement(entry: &Entry, table: &TableDefinition) -> ReplacementStrategy {
    entry
        .replacement_strategy
        .resolve(table.replacement_strategy)
}
