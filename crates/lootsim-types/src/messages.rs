//! Request and response messages exchanged with the simulation worker.
//!
//! One `start` request produces zero or more `progress` responses followed
//! by exactly one terminal response (`complete`, `cancelled` or `error`).
//! A request line the worker cannot decode is answered with `rejected`,
//! which belongs to no simulation and never ends one.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::structs::{SimulationResult, TableDefinition};

/// A message sent by the caller to the worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum WorkerRequest {
    /// Start a simulation of `runs` runs over `definition`.
    Start {
        /// The table to simulate.
        definition: TableDefinition,
        /// Number of runs.
        runs: u64,
        /// Optional seed; a time-derived seed is used when absent.
        #[serde(default)]
        seed: Option<i64>,
    },
    /// Cancel the active simulation, if any.
    Cancel,
}

/// A message sent by the worker back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum WorkerResponse {
    /// Runs completed so far.
    Progress {
        /// Completed runs.
        completed: u64,
        /// Requested runs.
        total: u64,
    },
    /// The simulation finished every run.
    Complete {
        /// Aggregated statistics.
        result: SimulationResult,
    },
    /// The simulation stopped before finishing.
    Cancelled {
        /// Runs that completed before the stop.
        completed: u64,
        /// Requested runs.
        total: u64,
        /// Statistics over the completed runs, when partial results are enabled.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        partial: Option<SimulationResult>,
    },
    /// The simulation faulted.
    Error {
        /// Human-readable description of the failure.
        message: String,
    },
    /// A request line could not be decoded; any active simulation continues.
    Rejected {
        /// Why the line was rejected.
        message: String,
    },
}

impl WorkerResponse {
    /// Whether this response ends the stream for its simulation.
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Complete { .. } | Self::Cancelled { .. } | Self::Error { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_message_parses_without_seed() {
        let json = r#"{"type":"start","runs":10,"definition":{"id":"00000000-0000-0000-0000-000000000001"}}"#;
        let parsed: Result<WorkerRequest, _> = serde_json::from_str(json);
        assert!(
            matches!(parsed, Ok(WorkerRequest::Start { runs: 10, seed: None, .. })),
            "{parsed:?}"
        );
    }

    #[test]
    fn cancel_message_parses() {
        let parsed: Result<WorkerRequest, _> = serde_json::from_str(r#"{"type":"cancel"}"#);
        assert!(matches!(parsed, Ok(WorkerRequest::Cancel)));
    }

    #[test]
    fn progress_is_not_terminal() {
        assert!(!WorkerResponse::Progress { completed: 1, total: 2 }.is_terminal());
        assert!(
            WorkerResponse::Error {
                message: String::from("boom"),
            }
            .is_terminal()
        );
    }

    #[test]
    fn rejected_is_not_terminal() {
        let msg = WorkerResponse::Rejected {
            message: String::from("bad line"),
        };
        assert!(!msg.is_terminal());
        let json = serde_json::to_string(&msg).ok();
        assert_eq!(
            json.as_deref(),
            Some(r#"{"type":"rejected","message":"bad line"}"#)
        );
    }

    #[test]
    fn cancelled_without_partial_omits_field() {
        let msg = WorkerResponse::Cancelled {
            completed: 3,
            total: 10,
            partial: None,
        };
        let json = serde_json::to_string(&msg).ok();
        assert_eq!(
            json.as_deref(),
            Some(r#"{"type":"cancelled","completed":3,"total":10}"#)
        );
    }
}
