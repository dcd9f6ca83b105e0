//! Execution engine
//!
//! The scheduler drives one run of a workflow definition; the [`Automa`]
//! facade composes the scheduler, the handler registry and the snapshot
//! codec behind `run` and `resume`.

mod automa;
mod outcome;
mod scheduler;

pub use automa::Automa;
pub use outcome::{EngineError, ExecutionError, RunOutcome};
pub(crate) use scheduler::Scheduler;
