//! Run outcomes and engine errors

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::args::ResolutionError;
use crate::interaction::InteractionRecord;
use crate::snapshot::{Snapshot, SnapshotError};
use crate::worker::WorkerFailure;

/// How a run (or a resume) ended
///
/// Suspension is a normal outcome, not an error: callers pattern-match and
/// implement their own persistence loop around the suspended arm.
#[derive(Debug)]
pub enum RunOutcome {
    /// Every worker produced an output
    Completed {
        /// Outputs of all workers, keyed by worker name
        outputs: BTreeMap<String, serde_json::Value>,
    },

    /// The run paused awaiting external feedback
    ///
    /// The caller must persist the snapshot and later resume it with
    /// feedback for one of the pending interactions.
    Suspended {
        /// All currently unresolved interactions, oldest first
        interactions: Vec<InteractionRecord>,
        /// Full state of the paused run, safe to persist externally
        snapshot: Snapshot,
    },

    /// A worker failed; the run is dead
    Failed {
        /// The failure that killed the run
        error: ExecutionError,
    },
}

impl RunOutcome {
    /// Whether the run completed
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// Whether the run suspended
    pub fn is_suspended(&self) -> bool {
        matches!(self, Self::Suspended { .. })
    }

    /// Whether the run failed
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// A completed worker's output, if the run completed
    pub fn output_of(&self, worker: &str) -> Option<&serde_json::Value> {
        match self {
            Self::Completed { outputs } => outputs.get(worker),
            _ => None,
        }
    }
}

/// A run-fatal failure surfaced to the caller
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// A worker's own logic failed
    #[error("worker {worker} failed: {failure}")]
    Worker {
        /// Name of the failed worker
        worker: String,
        /// The underlying failure
        failure: WorkerFailure,
    },

    /// A worker's inputs could not be satisfied at dispatch time
    #[error("could not resolve arguments for worker {worker}: {source}")]
    Resolution {
        /// Name of the worker being dispatched
        worker: String,
        /// The resolution failure
        #[source]
        source: ResolutionError,
    },
}

/// Errors from engine bookkeeping
///
/// These are never swallowed; they always surface to the top-level
/// `run`/`resume` caller.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Snapshot could not be encoded or decoded
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// The feedback does not match any pending interaction
    #[error("no pending interaction with id {0}")]
    UnknownInteraction(Uuid),

    /// A worker task panicked or was aborted
    #[error("worker task failed: {0}")]
    TaskJoin(String),

    /// No worker is runnable but the run is not complete
    ///
    /// Cannot happen for a validated definition; kept so scheduling
    /// bookkeeping bugs surface instead of hanging.
    #[error("run stalled with workers still pending: {}", remaining.join(", "))]
    Stalled {
        /// Workers that can never be dispatched
        remaining: Vec<String>,
    },
}
