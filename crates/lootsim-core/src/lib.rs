//! Deterministic Monte Carlo simulation of weighted loot tables.
//!
//! A simulation executes many independent runs of one [`TableDefinition`].
//! Each run grants the table's guaranteed loot, resolves how many weighted
//! draws it performs, and draws entries under the table's weight
//! distribution and replacement policy. Per-entry statistics accumulate
//! across runs into a [`SimulationResult`].
//!
//! # Modules
//!
//! - [`rng`] -- The xorshift32 generator every random decision comes from.
//! - [`rolls`] -- Roll-count resolution per run.
//! - [`weights`] -- Per-run weight arena with static, pity and progressive
//!   distributions.
//! - [`selector`] -- Weighted selection and replacement policy.
//! - [`guaranteed`] -- Guaranteed loot injection.
//! - [`run`] -- One run from reset to the last draw.
//! - [`aggregate`] -- Cross-run statistics and the final result.
//! - [`simulate`] -- Single-stream entry points with progress and
//!   cancellation.
//! - [`shard`] -- Runs split across threads and merged.
//! - [`control`] -- Shared cancellation flag and progress counters.
//! - [`runner`] -- Async background runner streaming worker messages.
//! - [`config`] -- Configuration loading from `lootsim-config.yaml`.
//!
//! [`TableDefinition`]: lootsim_types::TableDefinition
//! [`SimulationResult`]: lootsim_types::SimulationResult

pub mod aggregate;
pub mod config;
pub mod control;
pub mod guaranteed;
pub mod rng;
pub mod rolls;
pub mod run;
pub mod runner;
pub mod selector;
pub mod shard;
pub mod simulate;
pub mod weights;

pub use simulate::{SimulationOutcome, simulate, simulate_with};
