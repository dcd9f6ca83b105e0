//! Worker execution context

use std::sync::Arc;

use uuid::Uuid;

use crate::interaction::{Event, Feedback, HandlerRegistry, InteractionError};

/// Context provided to workers during execution
///
/// The context identifies the run and exposes synchronous interaction
/// dispatch. It is cheap to clone; every dispatched worker gets its own.
#[derive(Clone)]
pub struct WorkerContext {
    /// Id of the run this invocation belongs to
    pub run_id: Uuid,

    /// Name of the worker being invoked
    pub worker: String,

    handlers: Arc<HandlerRegistry>,
}

impl WorkerContext {
    pub(crate) fn new(run_id: Uuid, worker: impl Into<String>, handlers: Arc<HandlerRegistry>) -> Self {
        Self {
            run_id,
            worker: worker.into(),
            handlers,
        }
    }

    /// Request feedback from a synchronous handler, without suspending the run
    ///
    /// Looks up the handler registered for the event's type and invokes it on
    /// the current task. The handler may block on external input; the
    /// feedback it sends is returned literally. A missing handler is a
    /// configuration gap and surfaces as an error for the worker to propagate.
    pub fn request_feedback(&self, event: &Event) -> Result<Feedback, InteractionError> {
        self.handlers.dispatch(event)
    }

    /// Check whether a synchronous handler exists for an event type
    pub fn has_handler(&self, event_type: &str) -> bool {
        self.handlers.contains(event_type)
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self::new(Uuid::now_v7(), "test", Arc::new(HandlerRegistry::new()))
    }
}

impl std::fmt::Debug for WorkerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerContext")
            .field("run_id", &self.run_id)
            .field("worker", &self.worker)
            .finish()
    }
}
