//! Guaranteed loot, granted once per run ahead of the weighted draws.

use lootsim_types::GuaranteedEntry;

use crate::aggregate::Aggregator;
use crate::rng::XorShift32;

/// Grant every guaranteed entry once for `run_index`.
///
/// Quantities are drawn in definition order with `uniform_int(min, max)`.
/// Guaranteed entries never touch the weight arena.
pub fn inject_guaranteed(
    guaranteed: &[GuaranteedEntry],
    run_index: u64,
    rng: &mut XorShift32,
    aggregator: &mut Aggregator,
) {
    for (index, entry) in guaranteed.iter().enumerate() {
        let quantity = rng.uniform_int(entry.min_yield, entry.max_yield);
        aggregator.record_grant(index, run_index, quantity);
    }
}
