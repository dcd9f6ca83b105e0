//! Worker trait and execution context

mod context;
mod definition;

pub use context::WorkerContext;
pub use definition::{FnWorker, Worker, WorkerArgs, WorkerFailure, WorkerOutput};
