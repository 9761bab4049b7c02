mod execution;
mod registry;

pub use execution::{
    ExecutionSnapshot, ExecutionState, ExecutionStatus, StepOutcome, WorkflowResult,
};
pub use registry::ExecutionRegistry;
