//! Background simulation runner with a bounded message stream.
//!
//! [`spawn_simulation`] moves a simulation onto tokio's blocking pool and
//! hands back a [`SimulationHandle`]. The handle yields the worker protocol
//! messages in order: zero or more `Progress`, then exactly one terminal
//! `Complete`, `Cancelled` or `Error`.
//!
//! - **Progress** is sent every `progress.every` runs and always after the
//!   last run. The channel is bounded, so a slow reader applies
//!   backpressure to the engine instead of buffering without limit.
//! - **Cancellation** is cooperative: [`SimulationHandle::cancel`] sets the
//!   shared flag and the engine stops before its next run. Dropping the
//!   handle has the same effect.
//! - **Faults**: a panic inside the engine becomes one `Error` message.

use std::sync::Arc;

use lootsim_types::{TableDefinition, WorkerResponse};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::{CancelMode, WorkerConfig};
use crate::control::SimulationControl;
use crate::run::RunSummary;
use crate::shard::simulate_sharded;
use crate::simulate::{ProgressCallback, SimulationOutcome, simulate_with};

/// Errors that can occur while driving a background simulation.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The background task panicked or was aborted.
    #[error("simulation task failed: {source}")]
    Join {
        /// The underlying join error.
        #[from]
        source: tokio::task::JoinError,
    },

    /// The receiving side went away before the terminal message was sent.
    #[error("simulation message channel closed")]
    ChannelClosed,
}

/// A simulation to run in the background.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRequest {
    /// Table to simulate.
    pub definition: TableDefinition,
    /// Number of runs.
    pub runs: u64,
    /// Explicit seed; falls back to the configured default, then the clock.
    pub seed: Option<i64>,
}

/// Settings the background task needs, copied out of [`WorkerConfig`].
#[derive(Debug, Clone, Copy)]
struct RunSettings {
    shards: u32,
    progress_every: u64,
    cancel_mode: CancelMode,
}

/// Caller side of a background simulation.
#[derive(Debug)]
pub struct SimulationHandle {
    events: mpsc::Receiver<WorkerResponse>,
    control: Arc<SimulationControl>,
    task: JoinHandle<Result<(), RunnerError>>,
}

impl SimulationHandle {
    /// Request cancellation. The terminal `Cancelled` message follows.
    pub fn cancel(&self) {
        self.control.request_cancel();
    }

    /// Shared control block of the running simulation.
    pub const fn control(&self) -> &Arc<SimulationControl> {
        &self.control
    }

    /// Next message, or `None` once the terminal message has been consumed.
    pub async fn recv(&mut self) -> Option<WorkerResponse> {
        self.events.recv().await
    }

    /// Wait for the background task to exit.
    ///
    /// Messages not yet received are dropped.
    pub async fn join(self) -> Result<(), RunnerError> {
        drop(self.events);
        self.task.await?
    }
}

/// Start `request` on the blocking pool.
///
/// Must be called from within a tokio runtime.
pub fn spawn_simulation(request: SimulationRequest, config: &WorkerConfig) -> SimulationHandle {
    let (tx, events) = mpsc::channel(config.progress.channel_capacity.max(1));
    let control = Arc::new(SimulationControl::new(request.runs));
    let settings = RunSettings {
        shards: config.simulation.shards.max(1),
        progress_every: config.progress.every.max(1),
        cancel_mode: config.cancellation.mode,
    };
    let seed = request.seed.or(config.simulation.default_seed);

    info!(
        table_id = %request.definition.id,
        runs = request.runs,
        explicit_seed = request.seed.is_some(),
        shards = settings.shards,
        "Spawning simulation"
    );

    let task_control = Arc::clone(&control);
    let task = tokio::spawn(async move {
        let progress_tx = tx.clone();
        let engine = tokio::task::spawn_blocking(move || {
            execute(&request, seed, settings, &task_control, &progress_tx)
        });

        let terminal = match engine.await {
            Ok(message) => message,
            Err(err) => {
                error!(error = %err, "Simulation task failed");
                WorkerResponse::Error {
                    message: format!("simulation failed: {err}"),
                }
            }
        };

        tx.send(terminal).await.map_err(|_closed| {
            warn!("Simulation receiver dropped before completion");
            RunnerError::ChannelClosed
        })
    });

    SimulationHandle {
        events,
        control,
        task,
    }
}

/// Run the engine to completion and build the terminal message.
fn execute(
    request: &SimulationRequest,
    seed: Option<i64>,
    settings: RunSettings,
    control: &Arc<SimulationControl>,
    tx: &mpsc::Sender<WorkerResponse>,
) -> WorkerResponse {
    let outcome = if settings.shards > 1 {
        simulate_sharded(
            &request.definition,
            request.runs,
            seed,
            settings.shards,
            control,
            |_| ChannelProgress::new(tx.clone(), Arc::clone(control), settings.progress_every),
        )
    } else {
        let mut progress =
            ChannelProgress::new(tx.clone(), Arc::clone(control), settings.progress_every);
        simulate_with(&request.definition, request.runs, seed, control, &mut progress)
    };
    terminal_message(outcome, settings.cancel_mode)
}

/// Map an engine outcome to the protocol's terminal message.
fn terminal_message(outcome: SimulationOutcome, mode: CancelMode) -> WorkerResponse {
    match outcome {
        SimulationOutcome::Completed(result) => WorkerResponse::Complete { result },
        SimulationOutcome::Cancelled {
            completed,
            total,
            partial,
        } => WorkerResponse::Cancelled {
            completed,
            total,
            partial: (mode == CancelMode::Partial).then_some(partial),
        },
    }
}

/// Progress callback that forwards to the message channel.
///
/// A closed channel means nobody is listening, so the simulation is
/// cancelled.
struct ChannelProgress {
    tx: mpsc::Sender<WorkerResponse>,
    control: Arc<SimulationControl>,
    every: u64,
}

impl ChannelProgress {
    const fn new(tx: mpsc::Sender<WorkerResponse>, control: Arc<SimulationControl>, every: u64) -> Self {
        Self { tx, control, every }
    }
}

impl ProgressCallback for ChannelProgress {
    fn on_run(&mut self, _summary: &RunSummary, completed: u64, total: u64) {
        let due = completed.checked_rem(self.every).is_none_or(|r| r == 0);
        if !due && completed < total {
            return;
        }
        if self
            .tx
            .blocking_send(WorkerResponse::Progress { completed, total })
            .is_err()
        {
            if !self.control.is_cancel_requested() {
                warn!(completed, total, "Progress receiver dropped, cancelling");
            }
            self.control.request_cancel();
        }
    }
}
