//! Shared control block for a running simulation.
//!
//! [`SimulationControl`] is shared through an [`Arc`](std::sync::Arc)
//! between the task executing runs and whoever launched it. The caller can
//! request cancellation and read progress without locks; the run loop
//! checks the flag between runs and bumps the completed counter after each.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};

/// Cancellation flag and progress counters for one simulation.
#[derive(Debug)]
pub struct SimulationControl {
    /// Whether cancellation has been requested.
    cancel_requested: AtomicBool,

    /// Runs finished so far, across all shards.
    completed: AtomicU64,

    /// Runs requested.
    total_runs: u64,

    /// Wall-clock time when the simulation started.
    started_at: DateTime<Utc>,
}

impl SimulationControl {
    /// Create a control block for a simulation of `total_runs` runs.
    pub fn new(total_runs: u64) -> Self {
        Self {
            cancel_requested: AtomicBool::new(false),
            completed: AtomicU64::new(0),
            total_runs,
            started_at: Utc::now(),
        }
    }

    // -----------------------------------------------------------------------
    // Cancellation
    // -----------------------------------------------------------------------

    /// Ask the run loop to stop before its next run.
    pub fn request_cancel(&self) {
        self.cancel_requested.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancel_requested(&self) -> bool {
        self.cancel_requested.load(Ordering::Acquire)
    }

    // -----------------------------------------------------------------------
    // Progress
    // -----------------------------------------------------------------------

    /// Count one finished run and return the new total.
    pub fn record_run(&self) -> u64 {
        self.completed
            .fetch_add(1, Ordering::AcqRel)
            .saturating_add(1)
    }

    /// Runs finished so far.
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    /// Runs requested.
    pub const fn total_runs(&self) -> u64 {
        self.total_runs
    }

    /// Milliseconds elapsed since the simulation started.
    pub fn elapsed_ms(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_milliseconds();
        // Negative if the clock stepped backwards.
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }
}
