//! Single-stream simulation entry points.
//!
//! [`simulate`] is the pure form: definition, run count and seed in, result
//! out, with every random decision taken from one generator. Two calls with
//! the same arguments and an explicit seed produce the same counts and
//! timelines; only `duration_ms` differs.
//!
//! [`simulate_with`] adds the control plane: it checks a
//! [`SimulationControl`] for cancellation between runs and reports each
//! finished run to a [`ProgressCallback`].

use lootsim_types::{SimulationResult, TableDefinition};
use tracing::{info, warn};

use crate::control::SimulationControl;
use crate::rng::effective_seed;
use crate::run::{RunOrchestrator, RunSummary};

/// Callback invoked after each run completes.
///
/// `completed` counts finished runs across the whole simulation, which for
/// a sharded simulation includes runs finished by other shards.
pub trait ProgressCallback: Send {
    /// Called after a run completes.
    fn on_run(&mut self, summary: &RunSummary, completed: u64, total: u64);
}

/// A no-op progress callback.
pub struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_run(&mut self, _summary: &RunSummary, _completed: u64, _total: u64) {}
}

/// How a controlled simulation ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationOutcome {
    /// Every requested run executed.
    Completed(SimulationResult),
    /// Cancellation was observed between runs.
    Cancelled {
        /// Runs that finished before cancellation.
        completed: u64,
        /// Runs requested.
        total: u64,
        /// Result aggregated over the finished runs.
        partial: SimulationResult,
    },
}

impl SimulationOutcome {
    /// The result carried by either variant.
    pub const fn result(&self) -> &SimulationResult {
        match self {
            Self::Completed(result) | Self::Cancelled { partial: result, .. } => result,
        }
    }

    /// Whether the simulation was cut short.
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Run `runs` runs of `definition` and return the aggregated result.
///
/// Without a seed one is derived from the clock and echoed in the result.
pub fn simulate(definition: &TableDefinition, runs: u64, seed: Option<i64>) -> SimulationResult {
    let control = SimulationControl::new(runs);
    match simulate_with(definition, runs, seed, &control, &mut NoOpProgress) {
        SimulationOutcome::Completed(result) | SimulationOutcome::Cancelled { partial: result, .. } => {
            result
        }
    }
}

/// Run a simulation under a control block, reporting progress per run.
///
/// The reported duration is measured from the control block's creation.
/// Cancellation is checked before every run; a run that has started always
/// finishes.
pub fn simulate_with(
    definition: &TableDefinition,
    runs: u64,
    seed: Option<i64>,
    control: &SimulationControl,
    progress: &mut dyn ProgressCallback,
) -> SimulationOutcome {
    let seed = effective_seed(seed);

    info!(
        table_id = %definition.id,
        runs,
        seed,
        entries = definition.entries.len(),
        guaranteed = definition.guaranteed.len(),
        "Simulation starting"
    );

    let mut orchestrator = RunOrchestrator::new(definition, seed);
    for run_index in 0..runs {
        if control.is_cancel_requested() {
            warn!(completed = run_index, total = runs, "Simulation cancelled");
            let partial = orchestrator
                .into_aggregator()
                .finish(definition.id, seed, control.elapsed_ms());
            return SimulationOutcome::Cancelled {
                completed: run_index,
                total: runs,
                partial,
            };
        }
        let summary = orchestrator.run_once(run_index);
        let completed = control.record_run();
        progress.on_run(&summary, completed, runs);
    }

    let result = orchestrator
        .into_aggregator()
        .finish(definition.id, seed, control.elapsed_ms());
    info!(
        runs = result.runs,
        total_rolls = result.total_rolls,
        duration_ms = result.duration_ms,
        "Simulation complete"
    );
    SimulationOutcome::Completed(result)
}
