//! Shared type definitions for the loot simulation engine.
//!
//! This crate is the single source of truth for every shape that crosses
//! the boundary between the engine and its callers. Types defined here flow
//! downstream to `TypeScript` via `ts-rs` for the table editor front end.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for tables, entries, and items
//! - [`enums`] -- Replacement, roll-count, and weight-distribution strategies
//! - [`structs`] -- Table definitions and simulation results
//! - [`messages`] -- Worker request/response protocol

pub mod enums;
pub mod ids;
pub mod messages;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    ReplacementStrategy, ResultSource, RollStrategy, TimelineEventKind, WeightDistribution,
};
pub use ids::{EntryId, ItemId, TableId};
pub use messages::{WorkerRequest, WorkerResponse};
pub use structs::{
    Entry, GuaranteedEntry, PityRule, ProgressiveConfig, ResultEntry, SimulationResult,
    TableDefinition, TimelineEvent,
};
