//! Worker trait definition

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::WorkerContext;
use crate::interaction::{Event, InteractionError};

/// Error type for worker failures
///
/// A worker failure is a domain error: it fails the whole run. It is
/// serializable so that failed-run diagnostics can cross process boundaries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkerFailure {
    /// Error message
    pub message: String,

    /// Error code for programmatic handling
    pub code: Option<String>,

    /// Additional error details (for debugging)
    pub details: Option<serde_json::Value>,
}

impl WorkerFailure {
    /// Create a new worker failure
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            details: None,
        }
    }

    /// Set the error code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Add error details
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl std::fmt::Display for WorkerFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for WorkerFailure {}

impl From<anyhow::Error> for WorkerFailure {
    fn from(err: anyhow::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<InteractionError> for WorkerFailure {
    fn from(err: InteractionError) -> Self {
        let code = match &err {
            InteractionError::NoHandler(_) => "no_handler",
            InteractionError::NoFeedback(_) => "no_feedback",
        };
        Self::new(err.to_string()).with_code(code)
    }
}

/// What a worker invocation produced
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerOutput {
    /// The worker completed with a value
    Value(serde_json::Value),

    /// The worker cannot proceed without external input
    ///
    /// The run suspends; once matching feedback arrives on the resume path,
    /// the feedback data becomes this worker's output exactly as if it had
    /// returned [`WorkerOutput::Value`] with it.
    AwaitInput(Event),
}

impl WorkerOutput {
    /// Complete with a JSON value
    pub fn value(value: serde_json::Value) -> Self {
        Self::Value(value)
    }

    /// Suspend the run until the event is answered externally
    pub fn await_input(event: Event) -> Self {
        Self::AwaitInput(event)
    }
}

/// Resolved arguments for one worker invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkerArgs {
    values: BTreeMap<String, serde_json::Value>,
}

impl WorkerArgs {
    /// Build from a parameter-name to value map
    pub fn new(values: BTreeMap<String, serde_json::Value>) -> Self {
        Self { values }
    }

    /// Get a raw argument value
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.values.get(name)
    }

    /// Get a required argument, failing if absent
    pub fn require(&self, name: &str) -> Result<&serde_json::Value, WorkerFailure> {
        self.values.get(name).ok_or_else(|| {
            WorkerFailure::new(format!("missing argument: {name}")).with_code("missing_argument")
        })
    }

    /// Deserialize a required argument into a concrete type
    pub fn require_as<T: DeserializeOwned>(&self, name: &str) -> Result<T, WorkerFailure> {
        let value = self.require(name)?;
        serde_json::from_value(value.clone()).map_err(|e| {
            WorkerFailure::new(format!("argument {name} has unexpected shape: {e}"))
                .with_code("argument_shape")
        })
    }

    /// Iterate over parameter names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|s| s.as_str())
    }

    /// Number of resolved arguments
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no arguments were resolved
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A worker is a named unit of work in the dependency graph
///
/// Workers are the atomic schedulable tasks. Each invocation receives the
/// arguments wired from upstream outputs (or the run's initial arguments)
/// and either completes with a value, asks for external input, or fails the
/// run.
///
/// # Example
///
/// ```ignore
/// struct AuditWorker;
///
/// #[async_trait]
/// impl Worker for AuditWorker {
///     async fn execute(
///         &self,
///         _ctx: WorkerContext,
///         args: WorkerArgs,
///     ) -> Result<WorkerOutput, WorkerFailure> {
///         let record: Record = args.require_as("record")?;
///         Ok(WorkerOutput::value(json!({ "passed": record.amount <= 2500.0 })))
///     }
/// }
/// ```
#[async_trait]
pub trait Worker: Send + Sync + 'static {
    /// Execute the worker
    ///
    /// The context provides run metadata and synchronous interaction
    /// dispatch. Return [`WorkerOutput::AwaitInput`] to suspend the run
    /// until external feedback arrives.
    async fn execute(
        &self,
        ctx: WorkerContext,
        args: WorkerArgs,
    ) -> Result<WorkerOutput, WorkerFailure>;
}

/// Adapter implementing [`Worker`] for an async closure
pub struct FnWorker<F> {
    f: F,
}

impl<F, Fut> FnWorker<F>
where
    F: Fn(WorkerContext, WorkerArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<WorkerOutput, WorkerFailure>> + Send + 'static,
{
    /// Wrap an async closure as a worker
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Wrap an async closure as a shareable worker handle
    pub fn arc(f: F) -> Arc<dyn Worker> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> Worker for FnWorker<F>
where
    F: Fn(WorkerContext, WorkerArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<WorkerOutput, WorkerFailure>> + Send + 'static,
{
    async fn execute(
        &self,
        ctx: WorkerContext,
        args: WorkerArgs,
    ) -> Result<WorkerOutput, WorkerFailure> {
        (self.f)(ctx, args).await
    }
}
