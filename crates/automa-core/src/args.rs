//! Argument resolution: wiring worker outputs to downstream inputs
//!
//! Resolution is a pure function of the worker declaration and the current
//! execution state. Each parameter is bound in priority order: an explicit
//! source binding wins, then the implicit single-dependency rule, then the
//! run's initial arguments. The explicit form lets a worker several hops
//! downstream read a non-adjacent ancestor's output without every
//! intermediate worker re-threading it.

use std::collections::BTreeMap;

use crate::graph::{ArgBinding, WorkerNode};
use crate::state::ExecutionState;
use crate::worker::WorkerArgs;

/// Errors from binding a worker's parameters
// Display/Error are hand-written because thiserror's derive treats a field
// named `source` as the error's source(), which requires an Error type;
// here `source` is the name of the source worker.
#[derive(Debug, PartialEq, Eq)]
pub enum ResolutionError {
    /// An explicitly bound source worker has not completed yet
    SourceNotCompleted {
        /// The worker being dispatched
        worker: String,
        /// The parameter being bound
        parameter: String,
        /// The source worker without an output
        source: String,
    },

    /// The implicit rule needs exactly one upstream dependency
    AmbiguousImplicit {
        /// The worker being dispatched
        worker: String,
        /// The parameter being bound
        parameter: String,
        /// How many dependencies the worker declared
        dependency_count: usize,
    },

    /// The parameter must come from the initial arguments, but is absent
    MissingInitialArgument {
        /// The worker being dispatched
        worker: String,
        /// The missing parameter
        parameter: String,
    },
}

impl std::fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceNotCompleted {
                worker,
                parameter,
                source,
            } => write!(
                f,
                "argument {parameter} of worker {worker} reads from {source}, which has not completed"
            ),
            Self::AmbiguousImplicit {
                worker,
                parameter,
                dependency_count,
            } => write!(
                f,
                "argument {parameter} of worker {worker} is implicit but the worker has {dependency_count} dependencies"
            ),
            Self::MissingInitialArgument { worker, parameter } => write!(
                f,
                "argument {parameter} of worker {worker} is missing from the initial arguments"
            ),
        }
    }
}

impl std::error::Error for ResolutionError {}

/// Bind all declared parameters of a worker for one invocation
pub fn resolve_args(node: &WorkerNode, state: &ExecutionState) -> Result<WorkerArgs, ResolutionError> {
    let mut values = BTreeMap::new();

    for arg in &node.args {
        let value = match &arg.binding {
            ArgBinding::Explicit { source } => state.output(source).cloned().ok_or_else(|| {
                ResolutionError::SourceNotCompleted {
                    worker: node.name.clone(),
                    parameter: arg.name.clone(),
                    source: source.clone(),
                }
            })?,

            ArgBinding::Implicit => {
                if node.dependencies.len() != 1 {
                    return Err(ResolutionError::AmbiguousImplicit {
                        worker: node.name.clone(),
                        parameter: arg.name.clone(),
                        dependency_count: node.dependencies.len(),
                    });
                }
                let source = &node.dependencies[0];
                state.output(source).cloned().ok_or_else(|| {
                    ResolutionError::SourceNotCompleted {
                        worker: node.name.clone(),
                        parameter: arg.name.clone(),
                        source: source.clone(),
                    }
                })?
            }

            ArgBinding::Initial => state.initial_arg(&arg.name).cloned().ok_or_else(|| {
                ResolutionError::MissingInitialArgument {
                    worker: node.name.clone(),
                    parameter: arg.name.clone(),
                }
            })?,
        };

        values.insert(arg.name.clone(), value);
    }

    Ok(WorkerArgs::new(values))
}
