//! Engine-wide properties checked over hand-built and randomized tables.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::float_cmp,
    clippy::cast_precision_loss
)]

mod common;

use std::collections::BTreeMap;

use lootsim_core::control::SimulationControl;
use lootsim_core::run::{RunOrchestrator, RunSummary};
use lootsim_core::simulate;
use lootsim_core::simulate::{ProgressCallback, simulate_with};
use lootsim_types::{
    PityRule, ReplacementStrategy, ResultSource, TimelineEventKind, WeightDistribution,
};

/// Collects every run summary.
#[derive(Default)]
struct Summaries(Vec<RunSummary>);

impl ProgressCallback for Summaries {
    fn on_run(&mut self, summary: &RunSummary, _completed: u64, _total: u64) {
        self.0.push(*summary);
    }
}

#[test]
fn scenario_sixty_rolls_one_run() {
    let definition = common::table(vec![common::entry(10.0), common::entry(1.0)], 60);
    let result = simulate(&definition, 1, Some(1337));
    assert_eq!(result.total_rolls, 60);
    assert_eq!(result.total_roll_hits(), 60);
    let hits: u64 = result.entries.iter().map(|e| e.roll_hits).sum();
    assert_eq!(hits, 60);
    assert_eq!(result.runs, 1);
}

#[test]
fn total_rolls_is_sum_of_resolved_roll_counts() {
    for seed in 0..40 {
        let definition = common::random_table(seed);
        let control = SimulationControl::new(30);
        let mut summaries = Summaries::default();
        let outcome = simulate_with(&definition, 30, Some(11), &control, &mut summaries);
        let resolved: u64 = summaries.0.iter().map(|s| s.rolls).sum();
        assert_eq!(outcome.result().total_rolls, resolved, "table {seed}");

        let draws: u64 = summaries.0.iter().map(|s| s.draws).sum();
        assert_eq!(outcome.result().total_roll_hits(), draws, "table {seed}");
    }
}

#[test]
fn orchestrator_summaries_match_aggregate() {
    let definition = common::random_table(3);
    let mut orchestrator = RunOrchestrator::new(&definition, 5);
    let resolved: u64 = (0..25).map(|run| orchestrator.run_once(run).rolls).sum();
    let result = orchestrator.into_aggregator().finish(definition.id, 5, 0);
    assert_eq!(result.total_rolls, resolved);
}

#[test]
fn guaranteed_probability_is_always_one() {
    for runs in [1, 2, 17, 250] {
        let mut definition = common::table(vec![common::entry(1.0)], 3);
        definition.guaranteed = vec![common::guaranteed(1, 3), common::guaranteed(0, 0)];
        let result = simulate(&definition, runs, Some(8));
        for granted in &definition.guaranteed {
            let entry = result.entry(granted.id).unwrap();
            assert_eq!(entry.source, ResultSource::Guaranteed);
            assert!((entry.probability - 1.0).abs() < f64::EPSILON);
            assert_eq!(entry.bundle_hits, runs);
            assert_eq!(entry.first_appeared_at, None);
        }
    }
}

#[test]
fn pity_never_lowers_total_drops() {
    for seed in [1_i64, 7, 42, 1337, 90_210] {
        let mut baseline = common::table(
            vec![
                common::entry(1.0),
                common::entry(6.0),
                common::entry(3.0),
            ],
            4,
        );
        baseline.weight_distribution = WeightDistribution::Pity;

        let mut boosted = baseline.clone();
        boosted.pity_rules = vec![PityRule {
            entry_id: baseline.entries[0].id,
            max_attempts: 2,
            weight_increment: 2.5,
        }];

        let drops = |definition| {
            simulate(definition, 300, Some(seed))
                .entry(baseline.entries[0].id)
                .map_or(0, |e| e.total_drops)
        };
        let without = drops(&baseline);
        let with = drops(&boosted);
        assert!(with >= without, "seed {seed}: {with} < {without}");
        assert!(with > 0);
    }
}

#[test]
fn without_replacement_entries_hit_at_most_once_per_run() {
    for seed in 0..40 {
        let definition = common::random_table(seed);
        let result = simulate(&definition, 25, Some(3));
        for (slot, entry) in definition.entries.iter().enumerate() {
            let policy = entry
                .replacement_strategy
                .resolve(definition.replacement_strategy);
            if policy != ReplacementStrategy::WithoutReplacement {
                continue;
            }
            let Some(stats) = result.entry(entry.id) else {
                continue;
            };
            assert_eq!(stats.roll_hits, stats.bundle_hits, "table {seed} slot {slot}");

            let mut per_run: BTreeMap<u64, Vec<TimelineEventKind>> = BTreeMap::new();
            for event in &stats.timeline {
                if event.kind != TimelineEventKind::Appeared {
                    per_run.entry(event.run_index).or_default().push(event.kind);
                }
            }
            for kinds in per_run.values() {
                assert_eq!(
                    kinds,
                    &vec![TimelineEventKind::Rolled, TimelineEventKind::Consumed],
                    "table {seed} slot {slot}"
                );
            }
        }
    }
}

#[test]
fn zero_runs_produce_empty_result() {
    for seed in 0..10 {
        let definition = common::random_table(seed);
        let result = simulate(&definition, 0, Some(1));
        assert_eq!(result.total_rolls, 0);
        assert_eq!(result.runs, 0);
        assert!(result.entries.is_empty());
    }
}

#[test]
fn statistics_are_internally_consistent() {
    for seed in 0..40 {
        let definition = common::random_table(seed);
        let runs = 20;
        let result = simulate(&definition, runs, Some(i64::try_from(seed).unwrap()));
        for entry in &result.entries {
            assert!(entry.bundle_hits <= runs);
            assert!((0.0..=1.0).contains(&entry.probability));
            let expected_average = entry.total_drops as f64 / runs as f64;
            assert!((entry.per_run_average - expected_average).abs() < 1e-9);

            let appeared: Vec<_> = entry
                .timeline
                .iter()
                .filter(|e| e.kind == TimelineEventKind::Appeared)
                .collect();
            assert_eq!(appeared.len(), 1);
            assert_eq!(appeared[0].roll_index, entry.first_appeared_at);
            assert_eq!(Some(appeared[0].run_index), entry.first_run);

            if entry.source == ResultSource::Weighted {
                let expected = entry.roll_hits as f64 / result.total_rolls as f64;
                assert!((entry.probability - expected).abs() < 1e-12);
                assert!(entry.bundle_hits <= entry.roll_hits);
            }
        }
    }
}

#[test]
fn negative_constant_rolls_only_grant_guaranteed_loot() {
    let mut definition = common::table(vec![common::entry(1.0)], -5);
    definition.guaranteed = vec![common::guaranteed(2, 2)];
    let result = simulate(&definition, 10, Some(4));
    assert_eq!(result.total_rolls, 0);
    assert_eq!(result.entries.len(), 1);
    assert_eq!(result.entries[0].total_drops, 20);
    assert!((result.entries[0].per_run_average - 2.0).abs() < f64::EPSILON);
}
