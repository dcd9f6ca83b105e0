//! Workflow graph: worker declarations and the validated definition

mod definition;
mod node;

pub use definition::{ValidationError, WorkflowBuilder, WorkflowDefinition};
pub use node::{ArgBinding, ArgSpec, WorkerNode};
