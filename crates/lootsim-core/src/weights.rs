//! Weight distribution engine and the per-run weight arena.
//!
//! [`WeightEngine`] owns every piece of per-run mutable draw state: the
//! current weight of each entry, the removed flags set by
//! without-replacement draws, and the pity miss counters. The arena is sized
//! once per simulation and [`reset`](WeightEngine::reset) at the start of
//! every run, so nothing leaks from one run into the next and high run counts
//! do not reallocate.
//!
//! # Distributions
//!
//! - **Static** -- weights stay at their base value (subject to removal).
//! - **Pity** -- an entry with a rule gains `weight_increment` for every
//!   `max_attempts` consecutive misses; selection resets it.
//! - **Progressive** -- before each draw every live weight moves toward the
//!   mean live weight, bounded by `max_shift`.

use std::collections::BTreeMap;

use lootsim_types::{EntryId, ProgressiveConfig, TableDefinition, WeightDistribution};
use tracing::debug;

/// Pity parameters resolved onto an entry slot.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PitySlot {
    /// Misses per boost step, at least 1.
    max_attempts: u64,
    /// Weight added per completed step.
    weight_increment: f64,
}

/// The distribution actually applied, after resolving missing configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Distribution {
    Static,
    Pity,
    Progressive(ProgressiveConfig),
}

/// Per-run weight state for every weighted entry of a table.
#[derive(Debug, Clone)]
pub struct WeightEngine {
    distribution: Distribution,
    base: Vec<f64>,
    current: Vec<f64>,
    removed: Vec<bool>,
    misses: Vec<u64>,
    pity: Vec<Option<PitySlot>>,
}

impl WeightEngine {
    /// Build the arena for a table. Call [`reset`](Self::reset) before each run.
    pub fn new(definition: &TableDefinition) -> Self {
        let base: Vec<f64> = definition
            .entries
            .iter()
            .map(|e| sanitize_weight(e.weight))
            .collect();
        let len = base.len();

        let distribution = match definition.weight_distribution {
            WeightDistribution::Static => Distribution::Static,
            WeightDistribution::Pity => Distribution::Pity,
            WeightDistribution::Progressive => definition
                .progressive_config
                .map_or(Distribution::Static, Distribution::Progressive),
        };

        Self {
            distribution,
            current: base.clone(),
            base,
            removed: vec![false; len],
            misses: vec![0; len],
            pity: resolve_pity_rules(definition),
        }
    }

    /// Restore base weights and clear removal flags and miss counters.
    pub fn reset(&mut self) {
        self.current.copy_from_slice(&self.base);
        self.removed.fill(false);
        self.misses.fill(0);
    }

    /// Current effective weight of a slot (0 for unknown slots).
    pub fn weight(&self, slot: usize) -> f64 {
        self.current.get(slot).copied().unwrap_or(0.0)
    }

    /// Whether a slot was removed by a without-replacement draw this run.
    pub fn is_removed(&self, slot: usize) -> bool {
        self.removed.get(slot).copied().unwrap_or(true)
    }

    /// Consecutive pity misses recorded for a slot this run.
    pub fn misses(&self, slot: usize) -> u64 {
        self.misses.get(slot).copied().unwrap_or(0)
    }

    /// Slots that can be drawn right now, in definition order, with their weights.
    pub fn eligible(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.current
            .iter()
            .zip(&self.removed)
            .enumerate()
            .filter(|(_, (weight, removed))| !**removed && **weight > 0.0)
            .map(|(slot, (weight, _))| (slot, *weight))
    }

    /// Recompute effective weights ahead of the next draw.
    pub fn apply_distribution(&mut self) {
        match self.distribution {
            Distribution::Static => {}
            Distribution::Pity => self.apply_pity(),
            Distribution::Progressive(config) => self.apply_progressive(&config),
        }
    }

    /// Update pity bookkeeping after `slot` was selected.
    ///
    /// The selected slot's counter resets and its weight returns to base;
    /// every other live slot records a miss. No-op outside the pity
    /// distribution.
    pub fn record_selection(&mut self, slot: usize) {
        if self.distribution != Distribution::Pity {
            return;
        }
        for (index, (misses, removed)) in self.misses.iter_mut().zip(&self.removed).enumerate() {
            if index == slot {
                *misses = 0;
            } else if !*removed {
                *misses = misses.saturating_add(1);
            }
        }
        if let (Some(current), Some(base)) = (self.current.get_mut(slot), self.base.get(slot)) {
            *current = *base;
        }
    }

    /// Remove a slot from the pool for the rest of the run.
    pub fn remove(&mut self, slot: usize) {
        if let Some(removed) = self.removed.get_mut(slot) {
            *removed = true;
        }
        if let Some(current) = self.current.get_mut(slot) {
            *current = 0.0;
        }
    }

    fn apply_pity(&mut self) {
        let slots = self
            .current
            .iter_mut()
            .zip(&self.base)
            .zip(&self.pity)
            .zip(self.misses.iter().zip(&self.removed));
        for (((current, base), rule), (misses, removed)) in slots {
            if *removed {
                continue;
            }
            let Some(rule) = rule else {
                continue;
            };
            let steps = misses.checked_div(rule.max_attempts).unwrap_or(0);
            #[allow(clippy::cast_precision_loss)]
            let boost = steps as f64 * rule.weight_increment;
            *current = sanitize_weight(base + boost);
        }
    }

    fn apply_progressive(&mut self, config: &ProgressiveConfig) {
        let (sum, count) = self
            .current
            .iter()
            .zip(&self.removed)
            .filter(|(_, removed)| !**removed)
            .fold((0.0_f64, 0_u32), |(sum, count), (weight, _)| {
                (sum + weight, count.saturating_add(1))
            });
        if count == 0 {
            return;
        }
        let mean = sum / f64::from(count);
        let limit = if config.max_shift.is_nan() {
            0.0
        } else {
            config.max_shift.abs()
        };

        for (current, removed) in self.current.iter_mut().zip(&self.removed) {
            if *removed {
                continue;
            }
            let delta = mean - *current;
            let mut shift = delta * config.shift_factor;
            if config.variance_scaling && mean > 0.0 {
                shift *= delta.abs() / mean;
            }
            if shift.is_nan() {
                continue;
            }
            *current = sanitize_weight(*current + shift.clamp(-limit, limit));
        }
    }
}

/// Clamp a weight to a finite, non-negative value.
fn sanitize_weight(weight: f64) -> f64 {
    if weight.is_finite() {
        weight.max(0.0)
    } else if weight > 0.0 {
        f64::MAX
    } else {
        0.0
    }
}

/// Map pity rules onto entry slots. The first rule naming an entry wins.
fn resolve_pity_rules(definition: &TableDefinition) -> Vec<Option<PitySlot>> {
    let slots: BTreeMap<EntryId, usize> = definition
        .entries
        .iter()
        .enumerate()
        .map(|(slot, entry)| (entry.id, slot))
        .rev()
        .collect();

    let mut resolved = vec![None; definition.entries.len()];
    for rule in &definition.pity_rules {
        let Some(target) = slots
            .get(&rule.entry_id)
            .and_then(|slot| resolved.get_mut(*slot))
        else {
            debug!(entry_id = %rule.entry_id, "pity rule for unknown entry ignored");
            continue;
        };
        if target.is_some() {
            debug!(entry_id = %rule.entry_id, "duplicate pity rule ignored");
            continue;
        }
        *target = Some(PitySlot {
            max_attempts: u64::from(rule.max_attempts.max(1)),
            weight_increment: rule.weight_increment,
        });
    }
    resolved
}
