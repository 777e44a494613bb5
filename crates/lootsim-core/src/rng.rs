//! Deterministic 32-bit xorshift generator.
//!
//! Every random decision the engine makes (roll counts, draw thresholds,
//! yield quantities) comes from one [`XorShift32`] stream, so a simulation is
//! a pure function of its definition, run count, and seed. The update rule
//! and the float conversion are fixed: results saved by one build must be
//! reproducible by any other.

use chrono::Utc;

/// State substituted for a zero seed. Xorshift maps zero to zero forever.
pub const ZERO_SEED_REPLACEMENT: u32 = 0x9E37_79B9;

/// `2^32`, the divisor mapping a `u32` state into `[0, 1)`.
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Seeded xorshift32 pseudo-random number generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    /// Create a generator from a 32-bit seed.
    pub const fn new(seed: u32) -> Self {
        let state = if seed == 0 {
            ZERO_SEED_REPLACEMENT
        } else {
            seed
        };
        Self { state }
    }

    /// Current internal state.
    pub const fn state(&self) -> u32 {
        self.state
    }

    /// Advance the generator and return the new 32-bit state.
    pub const fn next_u32(&mut self) -> u32 {
        let mut s = self.state;
        s ^= s << 13;
        // Logical shift: `s` is u32. Saved seeds replay only with this form.
        s ^= s >> 17;
        s ^= s << 5;
        self.state = s;
        s
    }

    /// Uniform float in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / TWO_POW_32
    }

    /// Uniform integer in the inclusive range `[min, max]`.
    ///
    /// Returns `min` without advancing the generator when `max <= min`.
    pub fn uniform_int(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        // Spans near i64::MAX lose precision in f64; yields and roll counts
        // are nowhere near that range.
        #[allow(clippy::cast_precision_loss)]
        let span = (max as f64) - (min as f64) + 1.0;
        let offset = (self.next_f64() * span).floor();
        #[allow(clippy::cast_possible_truncation)]
        let offset = offset as i64;
        min.saturating_add(offset).min(max)
    }
}

/// Reduce a caller-supplied integer seed to 32 bits.
///
/// Wraps modulo `2^32`, so negative seeds map to their two's-complement
/// low word.
pub const fn reduce_seed(seed: i64) -> u32 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let low = seed as u32;
    low
}

/// Seed derived from the current wall-clock time in milliseconds.
///
/// Two simulations started within the same millisecond share a seed.
pub fn time_seed() -> i64 {
    Utc::now().timestamp_millis()
}

/// Resolve an optional caller seed into the 32-bit seed actually used.
pub fn effective_seed(seed: Option<i64>) -> u32 {
    reduce_seed(seed.unwrap_or_else(time_seed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_reference_sequence() {
        let mut rng = XorShift32::new(1);
        assert_eq!(rng.next_u32(), 270_369);
        assert_eq!(rng.next_u32(), 67_634_689);
        assert_eq!(rng.next_u32(), 2_647_435_461);
    }

    #[test]
    fn float_is_state_over_two_pow_32() {
        let mut rng = XorShift32::new(1337);
        let value = rng.next_f64();
        assert_eq!(rng.state(), 339_970_090);
        assert!((value - 339_970_090.0 / TWO_POW_32).abs() < f64::EPSILON);
    }

    #[test]
    fn floats_stay_in_unit_interval() {
        let mut rng = XorShift32::new(42);
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v), "{v} outside [0, 1)");
        }
    }

    #[test]
    fn same_seed_same_stream() {
        let mut a = XorShift32::new(99);
        let mut b = XorShift32::new(99);
        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn zero_seed_does_not_lock_up() {
        let mut rng = XorShift32::new(0);
        assert_eq!(rng.state(), ZERO_SEED_REPLACEMENT);
        assert_ne!(rng.next_u32(), 0);
    }

    #[test]
    fn uniform_int_degenerate_range_consumes_nothing() {
        let mut rng = XorShift32::new(7);
        let before = rng.state();
        assert_eq!(rng.uniform_int(5, 5), 5);
        assert_eq!(rng.uniform_int(9, 3), 9);
        assert_eq!(rng.state(), before);
    }

    #[test]
    fn uniform_int_covers_inclusive_range() {
        let mut rng = XorShift32::new(2024);
        let mut seen = [false; 4];
        for _ in 0..1_000 {
            let v = rng.uniform_int(-1, 2);
            assert!((-1..=2).contains(&v));
            if let Some(slot) = usize::try_from(v + 1).ok().and_then(|i| seen.get_mut(i)) {
                *slot = true;
            }
        }
        assert!(seen.iter().all(|s| *s), "not every value drawn: {seen:?}");
    }

    #[test]
    fn seeds_wrap_to_low_word() {
        assert_eq!(reduce_seed(1337), 1337);
        assert_eq!(reduce_seed(-1), u32::MAX);
        assert_eq!(reduce_seed(0x1_0000_0005), 5);
    }

    #[test]
    fn explicit_seed_is_used_verbatim() {
        assert_eq!(effective_seed(Some(1337)), 1337);
    }
}
