//! Workflow definition and build-time validation

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

use super::node::{ArgBinding, WorkerNode};

/// Errors from building a workflow definition
///
/// All of these are build-time errors: a definition that validates never
/// produces them again, no matter how many runs share it.
// Display/Error are hand-written because thiserror's derive treats a field
// named `source` as the error's source(), which requires an Error type;
// here `source` is the name of the source worker.
#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// A worker name was declared twice
    DuplicateWorker {
        /// The duplicated worker name
        name: String,
    },

    /// A dependency references an undeclared worker
    UnknownDependency {
        /// The worker declaring the dependency
        worker: String,
        /// The missing dependency name
        dependency: String,
    },

    /// An explicit argument binding references an undeclared worker
    UnknownBindingSource {
        /// The worker declaring the binding
        worker: String,
        /// The bound parameter name
        parameter: String,
        /// The missing source worker
        source: String,
    },

    /// An explicit argument binding references the worker itself
    SelfBinding {
        /// The worker declaring the binding
        worker: String,
        /// The bound parameter name
        parameter: String,
    },

    /// The dependency relation contains a cycle
    Cycle {
        /// One cycle through the graph, first node repeated at the end
        path: Vec<String>,
    },

    /// No worker is flagged as an entry point
    NoEntryPoint,

    /// An entry point declares dependencies
    EntryPointWithDependencies {
        /// The offending entry point
        worker: String,
    },

    /// Workers cannot be reached from any entry point
    Unreachable {
        /// The unreachable worker names, sorted
        workers: Vec<String>,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateWorker { name } => write!(f, "worker declared twice: {name}"),
            Self::UnknownDependency { worker, dependency } => {
                write!(f, "worker {worker} depends on undeclared worker {dependency}")
            }
            Self::UnknownBindingSource {
                worker,
                parameter,
                source,
            } => write!(
                f,
                "worker {worker} binds argument {parameter} to undeclared worker {source}"
            ),
            Self::SelfBinding { worker, parameter } => {
                write!(f, "worker {worker} binds argument {parameter} to its own output")
            }
            Self::Cycle { path } => write!(f, "dependency cycle: {}", path.join(" -> ")),
            Self::NoEntryPoint => write!(f, "workflow has no entry point"),
            Self::EntryPointWithDependencies { worker } => {
                write!(f, "entry point {worker} must not declare dependencies")
            }
            Self::Unreachable { workers } => write!(
                f,
                "workers unreachable from any entry point: {}",
                workers.join(", ")
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// The immutable, validated graph of workers and their dependencies
///
/// Built once via [`WorkflowBuilder`], read-only thereafter, and shared
/// (typically behind an `Arc`) across all executions of the workflow shape.
#[derive(Debug, Clone)]
pub struct WorkflowDefinition {
    name: String,
    workers: BTreeMap<String, WorkerNode>,
    dependents: BTreeMap<String, Vec<String>>,
    entry_points: Vec<String>,
    fingerprint: String,
}

impl WorkflowDefinition {
    /// Workflow name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a worker by name
    pub fn get(&self, name: &str) -> Option<&WorkerNode> {
        self.workers.get(name)
    }

    /// Iterate over all workers, sorted by name
    pub fn workers(&self) -> impl Iterator<Item = &WorkerNode> {
        self.workers.values()
    }

    /// All worker names, sorted
    pub fn worker_names(&self) -> impl Iterator<Item = &str> {
        self.workers.keys().map(|s| s.as_str())
    }

    /// Entry point worker names
    pub fn entry_points(&self) -> &[String] {
        &self.entry_points
    }

    /// Workers that depend on the given worker
    pub fn dependents_of(&self, name: &str) -> &[String] {
        self.dependents.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of workers in the graph
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Stable identifier of the graph shape
    ///
    /// Covers worker names, entry flags and dependency edges. Snapshots
    /// embed it so a resume against a different workflow shape is rejected
    /// instead of silently misbehaving.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// Collects worker declarations and validates them into a definition
///
/// # Example
///
/// ```ignore
/// let definition = WorkflowBuilder::new("reimbursement")
///     .add_worker(WorkerNode::new("load_record", load).entry_point())
///     .add_worker(
///         WorkerNode::new("audit_by_rules", audit)
///             .with_dependencies(["load_record"])
///             .with_arg(ArgSpec::implicit("record")),
///     )
///     .build()?;
/// ```
#[derive(Debug)]
pub struct WorkflowBuilder {
    name: String,
    workers: Vec<WorkerNode>,
}

impl WorkflowBuilder {
    /// Start a builder for a named workflow
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            workers: Vec::new(),
        }
    }

    /// Add a worker declaration
    pub fn add_worker(mut self, node: WorkerNode) -> Self {
        self.workers.push(node);
        self
    }

    /// Validate and freeze the graph
    pub fn build(self) -> Result<Arc<WorkflowDefinition>, ValidationError> {
        let mut workers: BTreeMap<String, WorkerNode> = BTreeMap::new();
        for node in self.workers {
            if workers.contains_key(&node.name) {
                return Err(ValidationError::DuplicateWorker { name: node.name });
            }
            workers.insert(node.name.clone(), node);
        }

        let mut entry_points = Vec::new();
        for node in workers.values() {
            if node.is_entry {
                if !node.dependencies.is_empty() {
                    return Err(ValidationError::EntryPointWithDependencies {
                        worker: node.name.clone(),
                    });
                }
                entry_points.push(node.name.clone());
            }
            for dependency in &node.dependencies {
                if !workers.contains_key(dependency) {
                    return Err(ValidationError::UnknownDependency {
                        worker: node.name.clone(),
                        dependency: dependency.clone(),
                    });
                }
            }
            for arg in &node.args {
                if let ArgBinding::Explicit { source } = &arg.binding {
                    if source == &node.name {
                        return Err(ValidationError::SelfBinding {
                            worker: node.name.clone(),
                            parameter: arg.name.clone(),
                        });
                    }
                    if !workers.contains_key(source) {
                        return Err(ValidationError::UnknownBindingSource {
                            worker: node.name.clone(),
                            parameter: arg.name.clone(),
                            source: source.clone(),
                        });
                    }
                }
            }
        }

        if entry_points.is_empty() {
            return Err(ValidationError::NoEntryPoint);
        }

        detect_cycle(&workers)?;

        let dependents = build_dependents(&workers);
        check_reachability(&workers, &entry_points, &dependents)?;

        let fingerprint = compute_fingerprint(&workers);

        Ok(Arc::new(WorkflowDefinition {
            name: self.name,
            workers,
            dependents,
            entry_points,
            fingerprint,
        }))
    }
}

fn build_dependents(workers: &BTreeMap<String, WorkerNode>) -> BTreeMap<String, Vec<String>> {
    let mut dependents: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for node in workers.values() {
        for dependency in &node.dependencies {
            dependents
                .entry(dependency.clone())
                .or_default()
                .push(node.name.clone());
        }
    }
    dependents
}

/// Depth-first cycle detection over dependency edges, reporting one cycle path
fn detect_cycle(workers: &BTreeMap<String, WorkerNode>) -> Result<(), ValidationError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InProgress,
        Done,
    }

    let mut marks: BTreeMap<&str, Mark> = workers
        .keys()
        .map(|name| (name.as_str(), Mark::Unvisited))
        .collect();

    fn visit<'a>(
        name: &'a str,
        workers: &'a BTreeMap<String, WorkerNode>,
        marks: &mut BTreeMap<&'a str, Mark>,
        stack: &mut Vec<String>,
    ) -> Result<(), ValidationError> {
        match marks[name] {
            Mark::Done => return Ok(()),
            Mark::InProgress => {
                // Trim the stack down to the cycle entry and close the loop.
                let start = stack.iter().position(|n| n == name).unwrap_or(0);
                let mut path: Vec<String> = stack[start..].to_vec();
                path.push(name.to_string());
                return Err(ValidationError::Cycle { path });
            }
            Mark::Unvisited => {}
        }

        marks.insert(name, Mark::InProgress);
        stack.push(name.to_string());

        for dependency in &workers[name].dependencies {
            visit(dependency, workers, marks, stack)?;
        }

        stack.pop();
        marks.insert(name, Mark::Done);
        Ok(())
    }

    let mut stack = Vec::new();
    for name in workers.keys() {
        visit(name, workers, &mut marks, &mut stack)?;
    }
    Ok(())
}

/// Every worker must be reachable from some entry point
///
/// Strict on purpose: an unreachable worker can never be dispatched and
/// would leave the run permanently incomplete.
fn check_reachability(
    workers: &BTreeMap<String, WorkerNode>,
    entry_points: &[String],
    dependents: &BTreeMap<String, Vec<String>>,
) -> Result<(), ValidationError> {
    let mut reached: BTreeSet<&str> = BTreeSet::new();
    let mut queue: VecDeque<&str> = entry_points.iter().map(String::as_str).collect();

    while let Some(name) = queue.pop_front() {
        if !reached.insert(name) {
            continue;
        }
        if let Some(children) = dependents.get(name) {
            for child in children {
                // A dependent is reachable once any of its inputs can flow;
                // its own dispatch still waits for all dependencies.
                queue.push_back(child);
            }
        }
    }

    let unreachable: Vec<String> = workers
        .keys()
        .filter(|name| !reached.contains(name.as_str()))
        .cloned()
        .collect();

    if unreachable.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Unreachable {
            workers: unreachable,
        })
    }
}

fn compute_fingerprint(workers: &BTreeMap<String, WorkerNode>) -> String {
    let mut parts = Vec::with_capacity(workers.len());
    for node in workers.values() {
        let entry = if node.is_entry { "!" } else { "" };
        parts.push(format!("{}{}<-{}", entry, node.name, node.dependencies.join(",")));
    }
    parts.join(";")
}
