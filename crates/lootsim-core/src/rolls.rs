//! Roll-count resolution: how many weighted draws one run performs.

use lootsim_types::RollStrategy;

use crate::rng::XorShift32;

/// Resolve the number of weighted draws for a single run.
///
/// `CONSTANT` consumes no entropy. `PROGRESSIVE` draws a bonus in
/// `[0, roll_increment]` and caps the sum at `max_rolls`. `RANDOM` draws
/// uniformly in `[min, max]`. Negative outcomes resolve to zero draws.
pub fn resolve_roll_count(strategy: &RollStrategy, rng: &mut XorShift32) -> u64 {
    let rolls = match *strategy {
        RollStrategy::Constant { rolls } => rolls,
        RollStrategy::Progressive {
            base_rolls,
            roll_increment,
            max_rolls,
        } => base_rolls
            .saturating_add(rng.uniform_int(0, roll_increment))
            .min(max_rolls),
        RollStrategy::Random { min, max } => rng.uniform_int(min, max),
    };
    u64::try_from(rolls).unwrap_or(0)
}
