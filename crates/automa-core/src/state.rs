//! Per-run execution state

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::graph::WorkflowDefinition;
use crate::interaction::InteractionRecord;

/// Run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The run is executing workers
    Running,

    /// The run is paused awaiting external feedback
    Suspended,

    /// Every worker produced an output
    Completed,

    /// A worker failed; the run is dead
    Failed,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Suspended => write!(f, "suspended"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// The mutable record of one run
///
/// Owned exclusively by one scheduler for the lifetime of one run; never
/// shared between concurrent runs. Fully serializable so a suspended run
/// can cross a process boundary inside a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionState {
    /// Unique id of this run
    pub run_id: Uuid,

    /// Name of the workflow this run executes
    pub workflow: String,

    /// Current status
    pub status: RunStatus,

    /// Outputs of completed workers
    pub completed: BTreeMap<String, serde_json::Value>,

    /// Workers that have not produced an output yet
    pub pending: BTreeSet<String>,

    /// Unresolved interaction requests, oldest first
    pub interactions: Vec<InteractionRecord>,

    /// The run's initial invocation arguments
    ///
    /// Kept so a resumed run resolves initial-argument bindings exactly as
    /// the original process would have.
    pub initial_args: BTreeMap<String, serde_json::Value>,
}

impl ExecutionState {
    /// Fresh state for a new run of the given definition
    pub fn new(
        run_id: Uuid,
        definition: &WorkflowDefinition,
        initial_args: BTreeMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            run_id,
            workflow: definition.name().to_string(),
            status: RunStatus::Running,
            completed: BTreeMap::new(),
            pending: definition.worker_names().map(String::from).collect(),
            interactions: Vec::new(),
            initial_args,
        }
    }

    /// Output of a completed worker
    pub fn output(&self, worker: &str) -> Option<&serde_json::Value> {
        self.completed.get(worker)
    }

    /// An initial invocation argument
    pub fn initial_arg(&self, name: &str) -> Option<&serde_json::Value> {
        self.initial_args.get(name)
    }

    /// Whether a worker has completed
    pub fn is_completed(&self, worker: &str) -> bool {
        self.completed.contains_key(worker)
    }

    /// Record a worker's output, moving it out of the pending set
    pub fn record_output(&mut self, worker: &str, output: serde_json::Value) {
        self.pending.remove(worker);
        self.completed.insert(worker.to_string(), output);
    }

    /// Whether every worker has an output
    pub fn all_completed(&self) -> bool {
        self.pending.is_empty()
    }

    /// Queue an unresolved interaction
    pub fn push_interaction(&mut self, record: InteractionRecord) {
        self.interactions.push(record);
    }

    /// Resolve and remove a pending interaction by id
    pub fn resolve_interaction(&mut self, interaction_id: Uuid) -> Option<InteractionRecord> {
        let index = self
            .interactions
            .iter()
            .position(|r| r.interaction_id == interaction_id)?;
        Some(self.interactions.remove(index))
    }

    /// Workers currently awaiting external feedback
    pub fn awaiting_workers(&self) -> BTreeSet<&str> {
        self.interactions.iter().map(|r| r.worker.as_str()).collect()
    }
}
