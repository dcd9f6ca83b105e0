//! Worker declarations

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::worker::Worker;

/// How one worker parameter is bound to a value at dispatch time
///
/// Bindings are evaluated in priority order: an explicit source wins, then
/// the implicit single-dependency rule, then the run's initial arguments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArgBinding {
    /// Take the output of a named worker, adjacent or not
    Explicit {
        /// Name of the worker whose output supplies this parameter
        source: String,
    },

    /// Take the output of the single upstream dependency
    Implicit,

    /// Take the value from the run's initial invocation arguments
    Initial,
}

/// A named worker parameter and its binding strategy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArgSpec {
    /// Parameter name as seen by the worker
    pub name: String,

    /// Where the value comes from
    pub binding: ArgBinding,
}

impl ArgSpec {
    /// Bind a parameter to a named worker's output
    pub fn from_worker(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            binding: ArgBinding::Explicit {
                source: source.into(),
            },
        }
    }

    /// Bind a parameter to the single upstream dependency's output
    pub fn implicit(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            binding: ArgBinding::Implicit,
        }
    }

    /// Bind a parameter to the run's initial arguments
    pub fn initial(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            binding: ArgBinding::Initial,
        }
    }
}

/// One worker declaration in the graph
///
/// Immutable once the containing [`WorkflowDefinition`] is built.
///
/// [`WorkflowDefinition`]: crate::graph::WorkflowDefinition
#[derive(Clone)]
pub struct WorkerNode {
    /// Unique worker name
    pub name: String,

    /// The unit of work to execute
    pub worker: Arc<dyn Worker>,

    /// Names of workers that must complete before this one is dispatched
    pub dependencies: Vec<String>,

    /// Whether this worker is a graph entry point
    pub is_entry: bool,

    /// Declared parameters and their bindings
    pub args: Vec<ArgSpec>,
}

impl WorkerNode {
    /// Declare a worker with no dependencies, no parameters
    pub fn new(name: impl Into<String>, worker: Arc<dyn Worker>) -> Self {
        Self {
            name: name.into(),
            worker,
            dependencies: Vec::new(),
            is_entry: false,
            args: Vec::new(),
        }
    }

    /// Mark this worker as a graph entry point
    pub fn entry_point(mut self) -> Self {
        self.is_entry = true;
        self
    }

    /// Set the dependency list
    pub fn with_dependencies(mut self, dependencies: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    /// Add a parameter declaration
    pub fn with_arg(mut self, arg: ArgSpec) -> Self {
        self.args.push(arg);
        self
    }
}

impl std::fmt::Debug for WorkerNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerNode")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("is_entry", &self.is_entry)
            .field("args", &self.args)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::{FnWorker, WorkerOutput};
    use serde_json::json;

    fn noop() -> Arc<dyn Worker> {
        FnWorker::arc(|_ctx, _args| async { Ok(WorkerOutput::value(json!(null))) })
    }

    #[test]
    fn test_node_builder() {
        let node = WorkerNode::new("audit", noop())
            .with_dependencies(["load"])
            .with_arg(ArgSpec::implicit("record"));

        assert_eq!(node.name, "audit");
        assert_eq!(node.dependencies, vec!["load".to_string()]);
        assert!(!node.is_entry);
        assert_eq!(node.args[0].binding, ArgBinding::Implicit);
    }

    #[test]
    fn test_arg_spec_constructors() {
        assert_eq!(
            ArgSpec::from_worker("record", "load").binding,
            ArgBinding::Explicit {
                source: "load".to_string()
            }
        );
        assert_eq!(ArgSpec::initial("request_id").binding, ArgBinding::Initial);
    }

    #[test]
    fn test_arg_binding_serialization() {
        let binding = ArgBinding::Explicit {
            source: "load".to_string(),
        };

        let encoded = serde_json::to_string(&binding).unwrap();
        assert!(encoded.contains("\"type\":\"explicit\""));

        let parsed: ArgBinding = serde_json::from_str(&encoded).unwrap();
        assert_eq!(binding, parsed);
    }
}
