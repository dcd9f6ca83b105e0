//! # Graph Automation Engine
//!
//! A workflow-automation engine that executes a user-defined dependency
//! graph of asynchronous workers, optionally pausing mid-execution to
//! request input from a human or external system, and optionally persisting
//! its entire in-flight state so execution can resume later — potentially in
//! a different process, after arbitrary real-world delay.
//!
//! ## Features
//!
//! - **Dependency-graph scheduling**: workers with satisfied dependencies run
//!   concurrently; fan-in and fan-out fall out of the readiness computation
//! - **Argument wiring**: a worker's inputs bind to upstream outputs, either
//!   implicitly or via explicit source bindings reaching non-adjacent ancestors
//! - **Human in the loop**: synchronous in-process handlers, or asynchronous
//!   suspend-and-resume across a persistence boundary
//! - **Versioned snapshots**: a suspended run serializes to an opaque byte
//!   payload, safe to persist anywhere and resume later, in any process
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Automa                              │
//! │        (run / resume, event-handler registration)           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Scheduler                             │
//! │  (readiness tracking, concurrent dispatch, suspend/drain)   │
//! └─────────────────────────────────────────────────────────────┘
//!               │                              │
//!               ▼                              ▼
//! ┌───────────────────────────┐  ┌───────────────────────────────┐
//! │    WorkflowDefinition     │  │        SnapshotCodec          │
//! │ (immutable validated DAG) │  │ (versioned state round-trip)  │
//! └───────────────────────────┘  └───────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use automa_core::prelude::*;
//!
//! let definition = WorkflowBuilder::new("reimbursement")
//!     .add_worker(
//!         WorkerNode::new("load_record", load)
//!             .entry_point()
//!             .with_arg(ArgSpec::initial("request_id")),
//!     )
//!     .add_worker(
//!         WorkerNode::new("audit_by_rules", audit)
//!             .with_dependencies(["load_record"])
//!             .with_arg(ArgSpec::implicit("record")),
//!     )
//!     .add_worker(
//!         WorkerNode::new("execute_payment", pay)
//!             .with_dependencies(["audit_by_rules"])
//!             .with_arg(ArgSpec::implicit("result"))
//!             .with_arg(ArgSpec::from_worker("record", "load_record")),
//!     )
//!     .build()?;
//!
//! let automa = Automa::new(definition);
//! match automa.run(initial_args).await? {
//!     RunOutcome::Completed { outputs } => { /* paid */ }
//!     RunOutcome::Suspended { interactions, snapshot } => {
//!         // persist the snapshot; resume days later with the manager's answer
//!     }
//!     RunOutcome::Failed { error } => return Err(error.into()),
//! }
//! ```

pub mod args;
pub mod engine;
pub mod graph;
pub mod interaction;
pub mod snapshot;
pub mod state;
pub mod worker;

/// Prelude for common imports
pub mod prelude {
    pub use crate::args::{resolve_args, ResolutionError};
    pub use crate::engine::{Automa, EngineError, ExecutionError, RunOutcome};
    pub use crate::graph::{
        ArgBinding, ArgSpec, ValidationError, WorkerNode, WorkflowBuilder, WorkflowDefinition,
    };
    pub use crate::interaction::{
        ApprovalDecision, Event, Feedback, FeedbackSender, InteractionFeedback, InteractionRecord,
    };
    pub use crate::snapshot::{Snapshot, SnapshotCodec, SnapshotError, SERIALIZATION_VERSION};
    pub use crate::state::{ExecutionState, RunStatus};
    pub use crate::worker::{
        FnWorker, Worker, WorkerArgs, WorkerContext, WorkerFailure, WorkerOutput,
    };
}

// Re-export key types at crate root
pub use args::{resolve_args, ResolutionError};
pub use engine::{Automa, EngineError, ExecutionError, RunOutcome};
pub use graph::{ArgBinding, ArgSpec, ValidationError, WorkerNode, WorkflowBuilder, WorkflowDefinition};
pub use interaction::{
    ApprovalDecision, Event, Feedback, FeedbackSender, HandlerRegistry, InteractionError,
    InteractionFeedback, InteractionRecord,
};
pub use snapshot::{Snapshot, SnapshotCodec, SnapshotError, SERIALIZATION_VERSION};
pub use state::{ExecutionState, RunStatus};
pub use worker::{FnWorker, Worker, WorkerArgs, WorkerContext, WorkerFailure, WorkerOutput};
