//! Public facade: run, resume, handler registration

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::graph::WorkflowDefinition;
use crate::interaction::{Event, FeedbackSender, HandlerRegistry, InteractionFeedback};
use crate::snapshot::{Snapshot, SnapshotCodec};
use crate::state::{ExecutionState, RunStatus};

use super::outcome::{EngineError, RunOutcome};
use super::Scheduler;

/// Entry point for executing a workflow definition
///
/// One `Automa` wraps one immutable [`WorkflowDefinition`] plus the event
/// handlers registered on this instance. The definition is shared; the
/// handler registry lives and dies with the instance.
///
/// # Example
///
/// ```ignore
/// let mut automa = Automa::new(definition);
/// automa.register_event_handler("can_run_code", |event, sender| {
///     sender.send(Feedback::text(prompt_user(event)));
/// });
///
/// match automa.run(initial_args).await? {
///     RunOutcome::Completed { outputs } => { /* done */ }
///     RunOutcome::Suspended { interactions, snapshot } => {
///         persist(snapshot); // resume later, possibly elsewhere
///     }
///     RunOutcome::Failed { error } => return Err(error.into()),
/// }
/// ```
pub struct Automa {
    definition: Arc<WorkflowDefinition>,
    handlers: HandlerRegistry,
}

impl Automa {
    /// Create a facade for a validated definition
    pub fn new(definition: Arc<WorkflowDefinition>) -> Self {
        Self {
            definition,
            handlers: HandlerRegistry::new(),
        }
    }

    /// The workflow definition this instance executes
    pub fn definition(&self) -> &Arc<WorkflowDefinition> {
        &self.definition
    }

    /// Register a synchronous handler for an event type
    ///
    /// Handlers are registered before `run`; taking `&mut self` guarantees
    /// the registry is never mutated concurrently with an in-flight run.
    pub fn register_event_handler<F>(&mut self, event_type: impl Into<String>, handler: F)
    where
        F: Fn(&Event, FeedbackSender) + Send + Sync + 'static,
    {
        self.handlers.register(event_type, Arc::new(handler));
    }

    /// Start a fresh run with the given initial arguments
    #[instrument(skip(self, initial_args), fields(workflow = %self.definition.name()))]
    pub async fn run(
        &self,
        initial_args: BTreeMap<String, serde_json::Value>,
    ) -> Result<RunOutcome, EngineError> {
        let run_id = Uuid::now_v7();
        info!(%run_id, "starting run");

        let state = ExecutionState::new(run_id, &self.definition, initial_args);
        self.drive(state).await
    }

    /// Reconstruct a suspended run and continue it with feedback
    ///
    /// The feedback resolves exactly one pending interaction; the awaiting
    /// worker's output becomes the feedback data, exactly as if it had
    /// returned it, and its dependents become eligible.
    ///
    /// The engine does not track snapshot consumption: resuming the same
    /// snapshot twice is allowed and can duplicate side effects. Callers
    /// that need exactly-once resumption must enforce it themselves.
    #[instrument(skip(self, snapshot, feedback), fields(workflow = %self.definition.name()))]
    pub async fn resume(
        &self,
        snapshot: &Snapshot,
        feedback: InteractionFeedback,
    ) -> Result<RunOutcome, EngineError> {
        let mut state = SnapshotCodec::decode(snapshot, &self.definition)?;

        let record = state
            .resolve_interaction(feedback.interaction_id)
            .ok_or(EngineError::UnknownInteraction(feedback.interaction_id))?;

        info!(
            run_id = %state.run_id,
            worker = %record.worker,
            interaction_id = %record.interaction_id,
            "resuming run with feedback"
        );

        state.record_output(&record.worker, feedback.data);
        state.status = RunStatus::Running;

        self.drive(state).await
    }

    async fn drive(&self, state: ExecutionState) -> Result<RunOutcome, EngineError> {
        Scheduler::new(
            self.definition.clone(),
            Arc::new(self.handlers.clone()),
            state,
        )
        .drive()
        .await
    }
}

impl std::fmt::Debug for Automa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Automa")
            .field("workflow", &self.definition.name())
            .field("handlers", &self.handlers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{WorkerNode, WorkflowBuilder};
    use crate::interaction::Feedback;
    use crate::worker::{FnWorker, Worker, WorkerOutput};
    use serde_json::json;

    fn noop() -> Arc<dyn Worker> {
        FnWorker::arc(|_ctx, _args| async { Ok(WorkerOutput::value(json!(null))) })
    }

    fn asker() -> Arc<dyn Worker> {
        FnWorker::arc(|_ctx, _args| async {
            Ok(WorkerOutput::await_input(Event::new("confirm", json!(null))))
        })
    }

    #[test_log::test(tokio::test)]
    async fn test_run_to_completion() {
        let definition = WorkflowBuilder::new("simple")
            .add_worker(WorkerNode::new("only", noop()).entry_point())
            .build()
            .unwrap();

        let automa = Automa::new(definition);
        let outcome = automa.run(BTreeMap::new()).await.unwrap();

        assert!(outcome.is_completed());
    }

    #[test_log::test(tokio::test)]
    async fn test_sync_handler_answers_worker() {
        let definition = WorkflowBuilder::new("sync")
            .add_worker(
                WorkerNode::new(
                    "ask",
                    FnWorker::arc(|ctx: crate::worker::WorkerContext, _args| async move {
                        let feedback =
                            ctx.request_feedback(&Event::new("confirm", json!("ok to run?")))?;
                        Ok(WorkerOutput::Value(feedback.data))
                    }),
                )
                .entry_point(),
            )
            .build()
            .unwrap();

        let mut automa = Automa::new(definition);
        automa.register_event_handler("confirm", |_event, sender| {
            sender.send(Feedback::text("yes"));
        });

        let outcome = automa.run(BTreeMap::new()).await.unwrap();
        assert_eq!(outcome.output_of("ask"), Some(&json!("yes")));
    }

    #[test_log::test(tokio::test)]
    async fn test_resume_with_unknown_interaction_id() {
        let definition = WorkflowBuilder::new("resume-unknown")
            .add_worker(WorkerNode::new("ask", asker()).entry_point())
            .build()
            .unwrap();

        let automa = Automa::new(definition);
        let RunOutcome::Suspended { snapshot, .. } = automa.run(BTreeMap::new()).await.unwrap()
        else {
            panic!("expected Suspended");
        };

        let bogus = InteractionFeedback::text(Uuid::now_v7(), "yes");
        let result = automa.resume(&snapshot, bogus).await;

        assert!(matches!(result, Err(EngineError::UnknownInteraction(_))));
    }

    #[test_log::test(tokio::test)]
    async fn test_resume_feedback_becomes_worker_output() {
        let definition = WorkflowBuilder::new("resume")
            .add_worker(WorkerNode::new("ask", asker()).entry_point())
            .add_worker(
                WorkerNode::new("after", noop()).with_dependencies(["ask"]),
            )
            .build()
            .unwrap();

        let automa = Automa::new(definition);
        let RunOutcome::Suspended {
            interactions,
            snapshot,
        } = automa.run(BTreeMap::new()).await.unwrap()
        else {
            panic!("expected Suspended");
        };

        let feedback = InteractionFeedback::text(interactions[0].interaction_id, "no");
        let outcome = automa.resume(&snapshot, feedback).await.unwrap();

        assert!(outcome.is_completed());
        assert_eq!(outcome.output_of("ask"), Some(&json!("no")));
    }
}
