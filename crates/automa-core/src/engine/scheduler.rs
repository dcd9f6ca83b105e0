//! Readiness-driven scheduler for one run
//!
//! The scheduler exclusively owns one [`ExecutionState`] and drives it to a
//! terminal outcome: dispatch every worker whose dependencies are complete,
//! collect completions as they land, recompute readiness, repeat. Workers
//! run concurrently on the tokio runtime; suspension points exist only at
//! worker boundaries.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use crate::args::resolve_args;
use crate::graph::WorkflowDefinition;
use crate::interaction::{HandlerRegistry, InteractionRecord};
use crate::snapshot::SnapshotCodec;
use crate::state::{ExecutionState, RunStatus};
use crate::worker::{WorkerContext, WorkerFailure, WorkerOutput};

use super::outcome::{EngineError, ExecutionError, RunOutcome};

type WorkerCompletion = (String, Result<WorkerOutput, WorkerFailure>);

pub(crate) struct Scheduler {
    definition: Arc<WorkflowDefinition>,
    handlers: Arc<HandlerRegistry>,
    state: ExecutionState,
}

impl Scheduler {
    pub(crate) fn new(
        definition: Arc<WorkflowDefinition>,
        handlers: Arc<HandlerRegistry>,
        state: ExecutionState,
    ) -> Self {
        Self {
            definition,
            handlers,
            state,
        }
    }

    /// Drive the run to a terminal outcome
    ///
    /// Once a worker fails or requests input, no new workers are dispatched,
    /// but already-started ones drain so their outputs are not lost. A
    /// domain failure takes precedence over a concurrent interaction
    /// request.
    #[instrument(
        skip(self),
        fields(run_id = %self.state.run_id, workflow = %self.state.workflow)
    )]
    pub(crate) async fn drive(mut self) -> Result<RunOutcome, EngineError> {
        let mut tasks: JoinSet<WorkerCompletion> = JoinSet::new();
        let mut started: BTreeSet<String> = BTreeSet::new();
        let mut failure: Option<ExecutionError> = None;
        let mut suspending = false;

        loop {
            if failure.is_none() && !suspending {
                if let Err(resolution) = self.dispatch_ready(&mut tasks, &mut started) {
                    warn!(error = %resolution, "dispatch halted");
                    failure = Some(resolution);
                }
            }

            let Some(joined) = tasks.join_next().await else {
                break;
            };
            let (worker, result) =
                joined.map_err(|e| EngineError::TaskJoin(e.to_string()))?;

            match result {
                Ok(WorkerOutput::Value(output)) => {
                    debug!(%worker, "worker completed");
                    self.state.record_output(&worker, output);
                }
                Ok(WorkerOutput::AwaitInput(event)) => {
                    info!(%worker, event_type = %event.event_type, "worker awaits external input");
                    self.state
                        .push_interaction(InteractionRecord::new(worker, event));
                    suspending = true;
                }
                Err(worker_failure) => {
                    error!(%worker, error = %worker_failure, "worker failed");
                    if failure.is_none() {
                        failure = Some(ExecutionError::Worker {
                            worker,
                            failure: worker_failure,
                        });
                    }
                }
            }
        }

        self.finish(failure)
    }

    /// Spawn every worker that became ready
    ///
    /// A worker is ready when it is still pending, has not been started in
    /// this drive, is not itself awaiting feedback, and all of its
    /// dependencies have outputs. Entry points qualify immediately; a
    /// validated definition has no other dependency-free workers.
    fn dispatch_ready(
        &self,
        tasks: &mut JoinSet<WorkerCompletion>,
        started: &mut BTreeSet<String>,
    ) -> Result<(), ExecutionError> {
        let awaiting = self.state.awaiting_workers();
        let mut spawns = Vec::new();

        for node in self.definition.workers() {
            if !self.state.pending.contains(&node.name)
                || started.contains(&node.name)
                || awaiting.contains(node.name.as_str())
            {
                continue;
            }
            if !node.dependencies.iter().all(|d| self.state.is_completed(d)) {
                continue;
            }

            let args = resolve_args(node, &self.state).map_err(|source| {
                ExecutionError::Resolution {
                    worker: node.name.clone(),
                    source,
                }
            })?;
            spawns.push((node.name.clone(), node.worker.clone(), args));
        }

        for (name, worker, args) in spawns {
            debug!(worker = %name, "dispatching worker");
            started.insert(name.clone());
            let ctx = WorkerContext::new(self.state.run_id, name.clone(), self.handlers.clone());
            tasks.spawn(async move {
                let result = worker.execute(ctx, args).await;
                (name, result)
            });
        }

        Ok(())
    }

    fn finish(mut self, failure: Option<ExecutionError>) -> Result<RunOutcome, EngineError> {
        if let Some(error) = failure {
            self.state.status = RunStatus::Failed;
            error!(error = %error, "run failed");
            return Ok(RunOutcome::Failed { error });
        }

        if !self.state.interactions.is_empty() {
            self.state.status = RunStatus::Suspended;
            let snapshot = SnapshotCodec::encode(&self.state, &self.definition)?;
            info!(
                pending_interactions = self.state.interactions.len(),
                "run suspended"
            );
            return Ok(RunOutcome::Suspended {
                interactions: self.state.interactions,
                snapshot,
            });
        }

        if self.state.all_completed() {
            self.state.status = RunStatus::Completed;
            info!(workers = self.state.completed.len(), "run completed");
            return Ok(RunOutcome::Completed {
                outputs: self.state.completed,
            });
        }

        Err(EngineError::Stalled {
            remaining: self.state.pending.iter().cloned().collect(),
        })
    }
}
