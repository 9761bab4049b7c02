use uuid::Uuid;

use crate::sources::SourceError;

/// Errors raised at the Runner's call boundaries.
///
/// Execution-time failures (transport errors, unresolvable expressions,
/// non-success responses) are not errors here; they surface structurally as
/// failed step outcomes so callers can branch on status.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error(transparent)]
    Document(#[from] arazzo_runner_core::DocumentError),
    #[error("failed to read workflow document '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("unknown workflow: {0}")]
    UnknownWorkflow(String),
    #[error("unknown execution: {0}")]
    UnknownExecution(Uuid),
    #[error("execution {0} was cancelled")]
    Cancelled(Uuid),
}

impl From<arazzo_runner_core::ParseError> for RunnerError {
    fn from(e: arazzo_runner_core::ParseError) -> Self {
        RunnerError::Document(e.into())
    }
}

impl From<arazzo_runner_core::ValidationError> for RunnerError {
    fn from(e: arazzo_runner_core::ValidationError) -> Self {
        RunnerError::Document(e.into())
    }
}
